use serde::{Deserialize, Serialize};

/// Frame-level diagnostics for the orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DiagnosticsCfg {
    /// Measure phase timings into [`crate::OrchestratorFrame::timings_ms`].
    pub enabled: bool,
    /// Emit a `trace` summary line per frame.
    pub log_frames: bool,
}

impl Default for DiagnosticsCfg {
    fn default() -> Self {
        DiagnosticsCfg {
            enabled: true,
            log_frames: false,
        }
    }
}
