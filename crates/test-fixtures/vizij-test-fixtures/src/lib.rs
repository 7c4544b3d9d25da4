//! Shared JSON fixtures for the binding workspace.
//!
//! Fixture files live under `fixtures/` at the workspace root and are listed in
//! `fixtures/manifest.json`. Crates depend on this one as a dev-dependency and
//! address fixtures by manifest key.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Deserialize;

static MANIFEST: Lazy<Manifest> = Lazy::new(|| {
    let raw = include_str!("../../../../fixtures/manifest.json");
    serde_json::from_str(raw).expect("fixtures manifest should parse")
});

#[derive(Debug, Deserialize)]
struct Manifest {
    #[serde(rename = "view-models")]
    view_models: HashMap<String, String>,
    scenarios: HashMap<String, ScenarioEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ScenarioEntry {
    Path(String),
    Detailed { path: String },
}

impl ScenarioEntry {
    fn as_path(&self) -> &str {
        match self {
            ScenarioEntry::Path(path) => path,
            ScenarioEntry::Detailed { path } => path,
        }
    }
}

fn fixtures_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../fixtures")
}

fn resolve_path(rel: &str) -> PathBuf {
    fixtures_root().join(rel)
}

fn read_to_string(rel: &str) -> Result<String> {
    let path = resolve_path(rel);
    fs::read_to_string(&path)
        .with_context(|| format!("failed to read fixture at {}", path.display()))
}

fn load_json<T: DeserializeOwned>(rel: &str) -> Result<T> {
    let text = read_to_string(rel)?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse JSON fixture {rel}"))
}

fn lookup<'a, T>(map: &'a HashMap<String, T>, kind: &str, name: &str) -> Result<&'a T> {
    map.get(name)
        .ok_or_else(|| anyhow!("unknown {kind} fixture '{name}'"))
}

/// View-model files (`enums` + `viewModels`).
pub mod view_models {
    use super::*;

    pub fn keys() -> Vec<String> {
        MANIFEST.view_models.keys().cloned().collect()
    }

    pub fn json(name: &str) -> Result<String> {
        let rel = lookup(&MANIFEST.view_models, "view-model", name)?;
        read_to_string(rel)
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        let rel = lookup(&MANIFEST.view_models, "view-model", name)?;
        super::load_json(rel)
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        let rel = lookup(&MANIFEST.view_models, "view-model", name)?;
        Ok(resolve_path(rel))
    }
}

/// Frame-by-frame scenarios driving engine-side writes through the orchestrator.
pub mod scenarios {
    use super::*;

    pub fn keys() -> Vec<String> {
        MANIFEST.scenarios.keys().cloned().collect()
    }

    pub fn json(name: &str) -> Result<String> {
        let entry = lookup(&MANIFEST.scenarios, "scenario", name)?;
        read_to_string(entry.as_path())
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        let entry = lookup(&MANIFEST.scenarios, "scenario", name)?;
        super::load_json(entry.as_path())
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        let entry = lookup(&MANIFEST.scenarios, "scenario", name)?;
        Ok(resolve_path(entry.as_path()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_manifest_entry_is_readable() {
        for key in view_models::keys() {
            let value: serde_json::Value = view_models::load(&key).expect("view-model fixture");
            assert!(value.get("viewModels").is_some(), "{key} has viewModels");
        }
        for key in scenarios::keys() {
            scenarios::json(&key).expect("scenario fixture");
        }
    }

    #[test]
    fn unknown_key_is_an_error() {
        assert!(view_models::json("does-not-exist").is_err());
    }
}
