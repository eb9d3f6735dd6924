use crate::errors::ConfigError;
use crate::model::{Assignment, Case};
use serde::Deserialize;
use std::path::Path;

pub const SUPPORTED_CONFIG_VERSION: u32 = 1;

/// Run configuration: a named list of cases to replay.
#[derive(Debug, Clone, Deserialize)]
pub struct RunConfig {
    pub version: u32,
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default)]
    pub cases: Vec<CaseSpec>,
}

fn default_name() -> String {
    "default".to_string()
}

/// One case as written in YAML. The input mapping keeps its document
/// order.
#[derive(Debug, Clone, Deserialize)]
pub struct CaseSpec {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub inputs: serde_yaml::Mapping,
    #[serde(default)]
    pub capture: Vec<String>,
}

pub fn load_config(path: &Path) -> Result<RunConfig, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    let cfg: RunConfig = serde_yaml::from_str(&raw).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })?;
    if cfg.version != SUPPORTED_CONFIG_VERSION {
        return Err(ConfigError::Version {
            found: cfg.version,
            supported: SUPPORTED_CONFIG_VERSION,
        });
    }
    // An empty case list is a legal no-op run, but usually a mistake.
    if cfg.cases.is_empty() {
        tracing::warn!(config = %path.display(), "config has no cases; the run will record nothing");
    }
    Ok(cfg)
}

impl RunConfig {
    /// Materialize the configured cases. Specs without an id get `case-N`
    /// (1-based position).
    pub fn into_cases(self) -> Result<Vec<Case>, ConfigError> {
        let mut cases = Vec::with_capacity(self.cases.len());
        for (idx, spec) in self.cases.into_iter().enumerate() {
            let id = spec.id.unwrap_or_else(|| format!("case-{}", idx + 1));
            let mut inputs = Vec::with_capacity(spec.inputs.len());
            for (key, value) in spec.inputs {
                let name = match key {
                    serde_yaml::Value::String(s) => s,
                    other => {
                        return Err(ConfigError::Case {
                            case: id,
                            reason: format!("input name must be a string, got {:?}", other),
                        })
                    }
                };
                let value = serde_json::to_value(&value).map_err(|e| ConfigError::Case {
                    case: id.clone(),
                    reason: format!("input '{}' is not JSON-representable: {}", name, e),
                })?;
                inputs.push(Assignment::new(name, value));
            }
            cases.push(Case {
                id,
                parent_id: None,
                inputs,
                capture: spec.capture,
                outputs: Vec::new(),
                msg: None,
            });
        }
        Ok(cases)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn write_config(content: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cases.yaml");
        std::fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn parses_cases_and_preserves_input_document_order() {
        let (_dir, path) = write_config(
            "version: 1\nname: smoke\ncases:\n  - id: c1\n    inputs:\n      z: 1\n      a: \"two\"\n    capture: [y]\n",
        );

        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.name, "smoke");
        let cases = cfg.into_cases().unwrap();
        assert_eq!(cases.len(), 1);
        assert_eq!(cases[0].id, "c1");
        let names: Vec<&str> = cases[0].inputs.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["z", "a"]);
        assert_eq!(cases[0].input("a"), Some(&json!("two")));
        assert_eq!(cases[0].capture, vec!["y"]);
    }

    #[test]
    fn missing_ids_default_to_position() {
        let (_dir, path) = write_config(
            "version: 1\ncases:\n  - inputs:\n      x: 1\n  - inputs:\n      x: 2\n",
        );

        let cases = load_config(&path).unwrap().into_cases().unwrap();
        assert_eq!(cases[0].id, "case-1");
        assert_eq!(cases[1].id, "case-2");
    }

    #[test]
    fn unsupported_version_is_rejected() {
        let (_dir, path) = write_config("version: 2\ncases: []\n");
        let err = load_config(&path).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Version {
                found: 2,
                supported: SUPPORTED_CONFIG_VERSION
            }
        ));
    }

    #[test]
    fn empty_case_list_loads_cleanly() {
        let (_dir, path) = write_config("version: 1\ncases: []\n");
        let cfg = load_config(&path).unwrap();
        assert!(cfg.into_cases().unwrap().is_empty());
    }

    #[test]
    fn non_string_input_name_is_rejected() {
        let (_dir, path) = write_config("version: 1\ncases:\n  - id: c1\n    inputs:\n      1: x\n");
        let err = load_config(&path).unwrap().into_cases().unwrap_err();
        assert!(matches!(err, ConfigError::Case { .. }), "got: {err}");
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(&dir.path().join("nope.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
