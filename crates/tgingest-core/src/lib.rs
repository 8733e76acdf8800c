//! Shared model, configuration, dataset files and cleaning for `tgingest`.

pub mod app_config;
pub mod clean;
pub mod config;
pub mod dataset;
pub mod detection;
pub mod list_literal;
pub mod post;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use clean::clean;
pub use config::{load_app_config, load_app_config_from_env, parse_channels};
pub use dataset::{read_cleaned, read_dataset, write_cleaned, DatasetError, DatasetSink};
pub use detection::DetectionRecord;
pub use list_literal::{encode_list, parse_list, pg_array_literal, ListLiteralError};
pub use post::{post_id, CleanedRow, RawPost, SOURCE_TAG};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
