use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DetectError {
    #[error("detector command is empty")]
    EmptyCommand,

    #[error("failed to run detector {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("detector exited with {status} on {image}: {stderr}")]
    Failed {
        image: PathBuf,
        status: String,
        stderr: String,
    },

    #[error("detector output for {image} is not a detection list: {source}")]
    Decode {
        image: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
