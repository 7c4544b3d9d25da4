use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use vizij_binding::BindingConfig;

use crate::diagnostics::DiagnosticsCfg;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OrchestratorConfig {
    pub binding: BindingConfig,
    pub diagnostics: DiagnosticsCfg,
    /// Run render-prepare for every target each frame, ignoring
    /// [`crate::RenderTarget::needs_redraw`].
    pub render_every_frame: bool,
}

impl OrchestratorConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("invalid orchestrator config JSON")
    }
}
