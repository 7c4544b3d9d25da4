use serde::{Deserialize, Serialize};

/// Tuning knobs for a [`crate::BindingContext`]. Every field has a default, so
/// hosts may deserialize partial JSON.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BindingConfig {
    /// Maximum number of memoized path splits. `0` disables the cache.
    pub path_cache_capacity: usize,
    pub diagnostics: DiagnosticsCfg,
}

impl Default for BindingConfig {
    fn default() -> Self {
        Self {
            path_cache_capacity: 256,
            diagnostics: DiagnosticsCfg::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DiagnosticsCfg {
    /// Keep recent binding errors in memory for inspection.
    pub enabled: bool,
    pub capacity: usize,
}

impl Default for DiagnosticsCfg {
    fn default() -> Self {
        Self {
            enabled: true,
            capacity: 64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let cfg: BindingConfig =
            serde_json::from_str(r#"{ "diagnostics": { "capacity": 8 } }"#).unwrap();
        assert_eq!(cfg.path_cache_capacity, 256);
        assert!(cfg.diagnostics.enabled);
        assert_eq!(cfg.diagnostics.capacity, 8);

        let cfg: BindingConfig = serde_json::from_str(r#"{ "pathCacheCapacity": 0 }"#).unwrap();
        assert_eq!(cfg.path_cache_capacity, 0);
    }
}
