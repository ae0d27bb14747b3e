use anyhow::Context;
use matchcore::prelude::{MatchConfig, SearchStrategy, DEFAULT_WINDOW_MS};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkflowConfig {
    #[serde(default = "default_window_ms")]
    pub window_ms: u64,
    pub tolerance_m: f64,
    #[serde(default)]
    pub strategy: SearchStrategy,
    #[serde(default)]
    pub parallel: bool,
}

fn default_window_ms() -> u64 {
    DEFAULT_WINDOW_MS
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn from_args(
        window_ms: u64,
        tolerance_m: f64,
        strategy: SearchStrategy,
        parallel: bool,
    ) -> Self {
        Self {
            window_ms,
            tolerance_m,
            strategy,
            parallel,
        }
    }

    /// Same workflow with the request's window/tolerance applied where given.
    pub fn with_overrides(&self, window_ms: Option<u64>, tolerance_m: Option<f64>) -> Self {
        Self {
            window_ms: window_ms.unwrap_or(self.window_ms),
            tolerance_m: tolerance_m.unwrap_or(self.tolerance_m),
            ..self.clone()
        }
    }

    pub fn to_match_config(&self) -> MatchConfig {
        MatchConfig::new(self.tolerance_m)
            .with_window_ms(self.window_ms)
            .with_strategy(self.strategy)
            .with_parallel(self.parallel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn config_from_args_produces_match_config() {
        let cfg = WorkflowConfig::from_args(250, 20.0, SearchStrategy::Indexed, true);
        let match_config = cfg.to_match_config();
        assert_eq!(match_config.window_ms, 250);
        assert_eq!(match_config.tolerance_m, 20.0);
        assert_eq!(match_config.strategy, SearchStrategy::Indexed);
        assert!(match_config.parallel);
    }

    #[test]
    fn config_load_reads_yaml_with_defaults() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"tolerance_m: 35.5\nstrategy: indexed\n")
            .unwrap();
        let path = temp.into_temp_path();
        let cfg = WorkflowConfig::load(&path).unwrap();
        assert_eq!(cfg.tolerance_m, 35.5);
        assert_eq!(cfg.window_ms, DEFAULT_WINDOW_MS);
        assert_eq!(cfg.strategy, SearchStrategy::Indexed);
        assert!(!cfg.parallel);
    }

    #[test]
    fn config_load_requires_tolerance() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"window_ms: 50\n").unwrap();
        let path = temp.into_temp_path();
        assert!(WorkflowConfig::load(&path).is_err());
    }

    #[test]
    fn demo_workflow_parses() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../demos/workflow.yaml");
        let cfg = WorkflowConfig::load(path).unwrap();
        assert!(cfg.to_match_config().validate().is_ok());
    }

    #[test]
    fn overrides_replace_only_given_fields() {
        let cfg = WorkflowConfig::from_args(100, 20.0, SearchStrategy::Linear, false);
        let overridden = cfg.with_overrides(None, Some(5.0));
        assert_eq!(overridden.window_ms, 100);
        assert_eq!(overridden.tolerance_m, 5.0);
    }
}
