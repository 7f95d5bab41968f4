use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::args::Args;
use crate::error::{EvalError, Result};
use crate::types::{Backend, BLOCK_RADIUS, IMAGE_HEIGHT, IMAGE_WIDTH};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EvalConfig {
    pub model_path: PathBuf,
    pub backend: Backend,
    pub block_radius: i32,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(EvalConfig::MODEL_PATH),
            backend: Backend::Auto,
            block_radius: BLOCK_RADIUS,
        }
    }
}

impl EvalConfig {
    pub const MODEL_PATH: &'static str = "converted_model.tflite";
    pub const PATH: &'static str = "eval_config.json";

    /// Reads `path` if given, otherwise `eval_config.json` when it exists.
    ///
    /// An explicit path must exist and parse. The implicit file falls back
    /// to defaults on a parse error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let content = fs::read_to_string(path)
                    .map_err(|e| EvalError::io(format!("reading {}", path.display()), e))?;
                let config = serde_json::from_str::<EvalConfig>(&content)
                    .map_err(|e| EvalError::Config(format!("{}: {}", path.display(), e)))?;
                info!("Loaded configuration from {}", path.display());
                Ok(config)
            }
            None if Path::new(Self::PATH).exists() => {
                let content = fs::read_to_string(Self::PATH)
                    .map_err(|e| EvalError::io(format!("reading {}", Self::PATH), e))?;
                match serde_json::from_str::<EvalConfig>(&content) {
                    Ok(config) => {
                        info!("Loaded configuration from {}", Self::PATH);
                        Ok(config)
                    }
                    Err(e) => {
                        warn!("Error parsing {}: {}. Using defaults.", Self::PATH, e);
                        Ok(Self::default())
                    }
                }
            }
            None => Ok(Self::default()),
        }
    }

    /// Command line values win over the file.
    pub fn with_args(mut self, args: &Args) -> Result<Self> {
        if let Some(model) = &args.model {
            self.model_path = model.clone();
        }
        if let Some(backend) = args.backend {
            self.backend = backend;
        }
        if let Some(radius) = args.radius {
            self.block_radius = radius;
        }
        let limit = IMAGE_WIDTH.max(IMAGE_HEIGHT) as i32;
        if !(0..limit).contains(&self.block_radius) {
            return Err(EvalError::Config(format!(
                "block radius must be in 0..{}, got {}",
                limit, self.block_radius
            )));
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_fixed_behavior() {
        let config = EvalConfig::default();
        assert_eq!(config.model_path, PathBuf::from("converted_model.tflite"));
        assert_eq!(config.backend, Backend::Auto);
        assert_eq!(config.block_radius, 2);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: EvalConfig = serde_json::from_str(r#"{ "backend": "onnx" }"#).unwrap();
        assert_eq!(config.backend, Backend::Onnx);
        assert_eq!(config.block_radius, 2);
        assert_eq!(config.model_path, PathBuf::from("converted_model.tflite"));
    }

    #[test]
    fn test_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "model_path": "m.onnx", "block_radius": 3 }}"#).unwrap();

        let config = EvalConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.model_path, PathBuf::from("m.onnx"));
        assert_eq!(config.block_radius, 3);
    }

    #[test]
    fn test_explicit_file_errors() {
        let missing = EvalConfig::load(Some(Path::new("no/such/config.json")));
        assert!(matches!(missing, Err(EvalError::Io { .. })));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let broken = EvalConfig::load(Some(file.path()));
        assert!(matches!(broken, Err(EvalError::Config(_))));
    }

    #[test]
    fn test_args_override_file() {
        let args = Args {
            model: Some(PathBuf::from("other.tflite")),
            radius: Some(1),
            ..Args::default()
        };
        let file = EvalConfig {
            model_path: PathBuf::from("m.onnx"),
            backend: Backend::Onnx,
            block_radius: 3,
        };
        let config = file.with_args(&args).unwrap();
        assert_eq!(config.model_path, PathBuf::from("other.tflite"));
        assert_eq!(config.backend, Backend::Onnx);
        assert_eq!(config.block_radius, 1);
    }

    #[test]
    fn test_negative_radius_rejected() {
        let args = Args {
            radius: Some(-1),
            ..Args::default()
        };
        let result = EvalConfig::default().with_args(&args);
        assert!(matches!(result, Err(EvalError::Config(_))));
    }

    #[test]
    fn test_oversized_radius_rejected() {
        for radius in [28, 1000, i32::MAX] {
            let args = Args {
                radius: Some(radius),
                ..Args::default()
            };
            let result = EvalConfig::default().with_args(&args);
            assert!(matches!(result, Err(EvalError::Config(_))), "radius {radius}");
        }

        let args = Args {
            radius: Some(27),
            ..Args::default()
        };
        assert_eq!(EvalConfig::default().with_args(&args).unwrap().block_radius, 27);
    }

    #[test]
    fn test_oversized_radius_in_file_rejected() {
        let config: EvalConfig = serde_json::from_str(r#"{ "block_radius": 5000 }"#).unwrap();
        let result = config.with_args(&Args::default());
        assert!(matches!(result, Err(EvalError::Config(_))));
    }
}
