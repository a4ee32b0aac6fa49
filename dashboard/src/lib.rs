//! ログ監視サーバー用のターミナルダッシュボード。
//!
//! 起動・アップロード完了・フィルタ変更の3つをきっかけに、各エンドポイントを
//! 並行に取得し、届いた順にテーブル・サマリー・4つのグラフを描き直す。

pub mod app;
pub mod client;
pub mod config;
pub mod error;
pub mod level;
pub mod logging;
pub mod render;
pub mod state;
pub mod tui;
pub mod types;
pub mod widget;

pub use app::{App, Completion, Fetched, Orchestrator, Pair};
pub use client::{DataSource, HttpSource};
pub use config::Config;
pub use error::DashboardError;
pub use level::{Level, color_of};
pub use state::{Dashboard, Status};
pub use widget::{ChartWidget, Region, WidgetRegistry};
