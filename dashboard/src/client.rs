use async_trait::async_trait;
use log::debug;
use reqwest::{Client, Url, multipart};
use serde::de::DeserializeOwned;
use std::path::Path;

use crate::error::{DashboardError, Result};
use crate::level::Level;
use crate::types::{
    CHARTDATA_ENDPOINT, ChartData, LOGS_ENDPOINT, LogEntry, METRICS_ENDPOINT, MetricsBar,
    SUMMARY_ENDPOINT, SummaryStats, UPLOAD_ENDPOINT, UploadResponse,
};

/// サーバーの読み取り専用エンドポイントとアップロード
#[async_trait]
pub trait DataSource: Send + Sync + 'static {
    /// `level` が `None` なら全レベル。順序はサーバーが決める
    async fn fetch_logs(&self, level: Option<Level>) -> Result<Vec<LogEntry>>;
    async fn fetch_summary(&self) -> Result<SummaryStats>;
    async fn fetch_bar_metrics(&self) -> Result<MetricsBar>;
    async fn fetch_chart_data(&self) -> Result<ChartData>;
    async fn upload(&self, path: &Path) -> Result<UploadResponse>;
}

/// HTTP経由でサーバーに問い合わせる実装
#[derive(Debug, Clone)]
pub struct HttpSource {
    base: Url,
    http: Client,
}

impl HttpSource {
    pub fn new(server: &str) -> Result<Self> {
        Self::with_client(server, Client::new())
    }

    pub fn with_client(server: &str, http: Client) -> Result<Self> {
        let base = Url::parse(server).map_err(|e| DashboardError::InvalidUrl(format!("{server}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(DashboardError::InvalidUrl(server.to_string()));
        }
        Ok(Self { base, http })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    fn url(&self, endpoint: &'static str) -> Result<Url> {
        self.base
            .join(endpoint)
            .map_err(|e| DashboardError::InvalidUrl(format!("{endpoint}: {e}")))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let mut url = self.url(endpoint)?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        debug!("GET {url}");
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|source| DashboardError::Transport { endpoint, source })?;
        decode(endpoint, response).await
    }
}

// ボディはいったんバイト列で受けて、JSON の不正は Decode として区別する
async fn decode<T: DeserializeOwned>(endpoint: &'static str, response: reqwest::Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        return Err(DashboardError::Status { endpoint, status });
    }
    let body = response
        .bytes()
        .await
        .map_err(|source| DashboardError::Transport { endpoint, source })?;
    serde_json::from_slice(&body).map_err(|source| DashboardError::Decode { endpoint, source })
}

#[async_trait]
impl DataSource for HttpSource {
    async fn fetch_logs(&self, level: Option<Level>) -> Result<Vec<LogEntry>> {
        match level {
            Some(level) => self.get_json(LOGS_ENDPOINT, &[("level", level.as_str())]).await,
            None => self.get_json(LOGS_ENDPOINT, &[]).await,
        }
    }

    async fn fetch_summary(&self) -> Result<SummaryStats> {
        self.get_json(SUMMARY_ENDPOINT, &[]).await
    }

    async fn fetch_bar_metrics(&self) -> Result<MetricsBar> {
        self.get_json(METRICS_ENDPOINT, &[]).await
    }

    async fn fetch_chart_data(&self) -> Result<ChartData> {
        self.get_json(CHARTDATA_ENDPOINT, &[]).await
    }

    async fn upload(&self, path: &Path) -> Result<UploadResponse> {
        let endpoint = UPLOAD_ENDPOINT;
        let contents = tokio::fs::read(path)
            .await
            .map_err(|source| DashboardError::UploadFile { path: path.to_path_buf(), source })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.log".to_string());

        // サーバー側は "logfile" という名前のファイルパートを期待している
        let part = multipart::Part::bytes(contents).file_name(file_name);
        let form = multipart::Form::new().part("logfile", part);

        let url = self.url(endpoint)?;
        debug!("POST {url} ({})", path.display());
        let response = self
            .http
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(|source| DashboardError::Transport { endpoint, source })?;
        decode(endpoint, response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_relative_server() {
        assert!(matches!(HttpSource::new("localhost"), Err(DashboardError::InvalidUrl(_))));
    }

    #[test]
    fn joins_endpoints_onto_server_root() {
        let source = HttpSource::new("http://127.0.0.1:5000").unwrap();
        assert_eq!(source.url(LOGS_ENDPOINT).unwrap().as_str(), "http://127.0.0.1:5000/logs");
    }
}
