use log::warn;

use crate::error::DashboardError;
use crate::level::Level;
use crate::render::{self, SummaryField, TableRow};
use crate::types::{ChartData, LogEntry, MetricsBar, SummaryStats};
use crate::widget::WidgetRegistry;

/// アプリケーションの入力モードの管理用の列挙型
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputMode {
    Normal,
    /// アップロードするファイルのパスを入力中
    Editing,
}

/// ステータス欄に出すメッセージ
#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    Idle,
    Info(String),
    Error(String),
}

impl Status {
    pub fn text(&self) -> &str {
        match self {
            Status::Idle => "",
            Status::Info(text) | Status::Error(text) => text,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Status::Error(_))
    }
}

/// ダッシュボード全体の表示状態。イベントループだけが所有する
#[derive(Debug)]
pub struct Dashboard {
    pub rows: Vec<TableRow>,
    pub summary: Option<Vec<SummaryField>>,
    pub widgets: WidgetRegistry,
    pub level_filter: Option<Level>,
    pub status: Status,
    pub selected_log_index: Option<usize>,
    pub editing_text: String,
    pub input_mode: InputMode,
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new()
    }
}

impl Dashboard {
    pub fn new() -> Self {
        Self {
            rows: Vec::new(),
            summary: None,
            widgets: WidgetRegistry::new(),
            level_filter: None,
            status: Status::Idle,
            selected_log_index: None,
            editing_text: String::new(),
            input_mode: InputMode::Normal,
        }
    }

    /// テーブルは丸ごと置き換える
    pub fn show_logs(&mut self, logs: &[LogEntry]) {
        self.rows = render::render_table(logs);

        if let Some(i) = self.selected_log_index {
            if self.rows.is_empty() {
                self.selected_log_index = None;
            } else if i >= self.rows.len() {
                self.selected_log_index = Some(self.rows.len() - 1);
            }
        }
    }

    pub fn show_summary(&mut self, stats: &SummaryStats) {
        self.summary = Some(render::render_summary(stats));
    }

    pub fn show_metrics(&mut self, metrics: &MetricsBar) -> Result<(), DashboardError> {
        render::render_bar(&mut self.widgets, metrics)
    }

    pub fn show_pie(&mut self, data: &ChartData) -> Result<(), DashboardError> {
        render::render_pie(&mut self.widgets, data)
    }

    pub fn show_line(&mut self, data: &ChartData) -> Result<(), DashboardError> {
        render::render_line(&mut self.widgets, data)
    }

    pub fn show_error_trend(&mut self, data: &ChartData) -> Result<(), DashboardError> {
        render::render_error_trend(&mut self.widgets, data)
    }

    pub fn set_status(&mut self, text: impl Into<String>) {
        self.status = Status::Info(text.into());
    }

    /// 失敗はログに残してステータス欄にも出す
    pub fn report_failure(&mut self, what: &str, err: &DashboardError) {
        warn!("{what} failed: {err}");
        self.status = Status::Error(format!("{what} failed: {err}"));
    }

    pub fn selected_row(&self) -> Option<&TableRow> {
        self.selected_log_index.and_then(|i| self.rows.get(i))
    }

    pub fn select_next_log(&mut self) {
        if self.rows.is_empty() {
            return;
        }

        let i = match self.selected_log_index {
            None => 0,
            Some(i) => {
                if i >= self.rows.len() - 1 {
                    i
                } else {
                    i + 1
                }
            }
        };
        self.selected_log_index = Some(i);
    }

    pub fn select_previous_log(&mut self) {
        if self.rows.is_empty() {
            return;
        }

        if let Some(i) = self.selected_log_index {
            self.selected_log_index = Some(i.saturating_sub(1));
        }
    }

    pub fn unselect_log(&mut self) {
        self.selected_log_index = None;
    }

    pub fn start_editing(&mut self) {
        self.editing_text.clear();
        self.input_mode = InputMode::Editing;
    }

    /// 入力されたパスを返す。空なら何もしない
    pub fn submit_editing(&mut self) -> Option<String> {
        let text = self.editing_text.trim().to_string();
        self.editing_text.clear();
        self.input_mode = InputMode::Normal;
        if text.is_empty() { None } else { Some(text) }
    }

    pub fn cancel_editing(&mut self) {
        self.editing_text.clear();
        self.input_mode = InputMode::Normal;
    }
}
