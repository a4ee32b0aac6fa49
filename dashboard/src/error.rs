use std::path::PathBuf;

use thiserror::Error;

use crate::widget::Region;

/// ダッシュボード内で発生するエラー
#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} answered with status {status}")]
    Status {
        endpoint: &'static str,
        status: reqwest::StatusCode,
    },

    #[error("malformed body from {endpoint}: {source}")]
    Decode {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot build {region} widget: {reason}")]
    Widget { region: Region, reason: String },

    #[error("cannot read upload file {path}: {source}")]
    UploadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid server url: {0}")]
    InvalidUrl(String),
}

pub type Result<T> = std::result::Result<T, DashboardError>;
