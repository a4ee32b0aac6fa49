use axum::Router;
use axum::body::Bytes;
use axum::extract::Query;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use serde_json::json;
use std::collections::HashMap;

use log_dashboard::{DashboardError, DataSource, HttpSource, Level};

async fn serve(router: Router) -> HttpSource {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    HttpSource::new(&format!("http://{addr}")).unwrap()
}

async fn logs(Query(params): Query<HashMap<String, String>>) -> impl IntoResponse {
    let all = json!([
        {"timestamp": "2024-01-01 12:00:00,000", "level": "INFO", "message": "boot"},
        {"timestamp": "2024-01-01 12:00:01,000", "level": "ERROR", "message": "disk full"},
    ]);
    let logs: Vec<_> = all
        .as_array()
        .unwrap()
        .iter()
        .filter(|log| params.get("level").is_none_or(|level| log["level"] == level.as_str()))
        .cloned()
        .collect();
    axum::Json(logs)
}

// サーバーと同じく "logfile" パートの "] " を含む行を数える
async fn upload(body: Bytes) -> impl IntoResponse {
    let text = String::from_utf8_lossy(&body);
    if !text.contains("name=\"logfile\"") {
        return (StatusCode::BAD_REQUEST, "No file part".to_string()).into_response();
    }
    let parsed = text.lines().filter(|line| line.contains("] ")).count();
    axum::Json(json!({"status": "success", "parsed_count": parsed})).into_response()
}

fn router() -> Router {
    Router::new()
        .route("/logs", get(logs))
        .route(
            "/summary",
            get(|| async {
                axum::Json(json!({
                    "total_logs": 2,
                    "counts": {"INFO": 1, "ERROR": 1},
                    "errors_last_5min": 0,
                    "most_frequent_message": "boot",
                    "busiest_hour": null
                }))
            }),
        )
        // 順序を確かめるため生の文字列で返す
        .route("/metrics", get(|| async { r#"{"WARNING":2,"INFO":5,"NOTICE":1}"# }))
        .route(
            "/chartdata",
            get(|| async {
                r#"{"logs_by_hour":{"2024-01-01 12:00":2},"errors_by_hour":{"2024-01-01 12:00":1},"pie":{"INFO":1,"ERROR":1}}"#
            }),
        )
        .route("/upload", post(upload))
}

#[tokio::test]
async fn fetches_all_endpoints() {
    let source = serve(router()).await;

    let logs = source.fetch_logs(None).await.unwrap();
    assert_eq!(logs.len(), 2);

    let summary = source.fetch_summary().await.unwrap();
    assert_eq!(summary.total_logs, 2);
    assert_eq!(summary.counts.count_of("WARNING"), 0);
    assert_eq!(summary.busiest_hour, None);

    let metrics = source.fetch_bar_metrics().await.unwrap();
    assert_eq!(metrics.labels(), vec!["WARNING", "INFO", "NOTICE"]);

    let charts = source.fetch_chart_data().await.unwrap();
    assert_eq!(charts.pie.total(), 2);
    assert_eq!(charts.errors_by_hour.count_of("2024-01-01 12:00"), 1);
}

#[tokio::test]
async fn level_filter_is_sent_as_query() {
    let source = serve(router()).await;
    let logs = source.fetch_logs(Some(Level::Error)).await.unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].message, "disk full");
}

#[tokio::test]
async fn uploads_file_as_logfile_part() {
    let source = serve(router()).await;
    let path = std::env::temp_dir().join(format!("log-dashboard-upload-{}.log", std::process::id()));
    std::fs::write(
        &path,
        "2024-01-01 12:00:00,000 [INFO] boot\n2024-01-01 12:00:01,000 [ERROR] disk full\nnoise\n",
    )
    .unwrap();

    let response = source.upload(&path).await.unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(response.parsed_count, 2);
    assert_eq!(response.status.as_deref(), Some("success"));
}

#[tokio::test]
async fn missing_upload_file_is_reported() {
    let source = serve(router()).await;
    let err = source
        .upload(std::path::Path::new("/definitely/not/here.log"))
        .await
        .unwrap_err();
    assert!(matches!(err, DashboardError::UploadFile { .. }));
}

#[tokio::test]
async fn non_success_status_is_an_error() {
    let source = serve(Router::new()).await;
    let err = source.fetch_summary().await.unwrap_err();
    assert!(matches!(
        err,
        DashboardError::Status { endpoint: "/summary", status } if status == StatusCode::NOT_FOUND
    ));
}

#[tokio::test]
async fn malformed_body_is_a_decode_error() {
    let source = serve(Router::new().route("/chartdata", get(|| async { "<html>oops</html>" }))).await;
    let err = source.fetch_chart_data().await.unwrap_err();
    assert!(matches!(err, DashboardError::Decode { endpoint: "/chartdata", .. }));
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    // 一度バインドして閉じたポートには誰もいない
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let source = HttpSource::new(&format!("http://{addr}")).unwrap();
    let err = source.fetch_bar_metrics().await.unwrap_err();
    assert!(matches!(err, DashboardError::Transport { endpoint: "/metrics", .. }));
}
