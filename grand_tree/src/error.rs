//! Top-level error type for `run()`.

use crate::classifier::ClassifierError;
use crate::config::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// minifb could not open or update the window.
    #[error("window error: {0}")]
    Window(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Classifier(#[from] ClassifierError),

    /// Requested classifier is not compiled into this binary.
    #[error("classifier `{0}` is unavailable; rebuild with `--features {0}`")]
    Unavailable(&'static str),
}
