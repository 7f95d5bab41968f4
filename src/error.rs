//! Error types for coord-eval.

use std::path::PathBuf;
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum EvalError {
    /// Model file missing, unreadable or not parseable by the backend.
    #[error("Failed to load the model: {}", path.display())]
    ModelLoad {
        path: PathBuf,
        #[source]
        source: BoxError,
    },

    /// The backend could not turn a loaded model into a runnable context.
    #[error("Failed to create interpreter.")]
    ContextBuild {
        #[source]
        source: BoxError,
    },

    #[error("Tensor mismatch: {0}")]
    TensorMismatch(String),

    #[error("Inference failed")]
    Inference(#[source] BoxError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl EvalError {
    pub fn model_load(path: impl Into<PathBuf>, source: impl Into<BoxError>) -> Self {
        Self::ModelLoad {
            path: path.into(),
            source: source.into(),
        }
    }

    pub fn context_build(source: impl Into<BoxError>) -> Self {
        Self::ContextBuild {
            source: source.into(),
        }
    }

    pub fn inference(source: impl Into<BoxError>) -> Self {
        Self::Inference(source.into())
    }

    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, EvalError>;
