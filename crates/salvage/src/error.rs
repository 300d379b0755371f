use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SalvageError>;

#[derive(Debug, Error)]
pub enum SalvageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Ui(#[from] salvage_ui::UiError),

    #[error("unknown device profile: {id}")]
    UnknownDevice { id: String },

    #[error("invalid framebuffer size (expected WIDTHxHEIGHT): {value}")]
    InvalidFbSize { value: String },

    #[error("failed to load menu {path}: {source}")]
    MenuLoad {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("menu {path} defines no items")]
    MenuEmpty { path: PathBuf },
}
