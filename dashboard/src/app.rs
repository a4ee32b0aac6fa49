use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use base64::{Engine as _, engine::general_purpose};
use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind};
use futures_util::StreamExt;
use log::{debug, info};
use std::io::{Write, stdout};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::time::{self, Interval};

use crate::client::{DataSource, HttpSource};
use crate::config::Config;
use crate::error::DashboardError;
use crate::level::{self, Level};
use crate::state::{Dashboard, InputMode};
use crate::tui;
use crate::types::{ChartData, LogEntry, MetricsBar, SummaryStats, UploadResponse};

/// 取得と描画の組
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pair {
    Summary,
    Logs,
    Metrics,
    Pie,
    Line,
    ErrorTrend,
}

impl Pair {
    pub const ALL: [Pair; 6] = [
        Pair::Summary,
        Pair::Logs,
        Pair::Metrics,
        Pair::Pie,
        Pair::Line,
        Pair::ErrorTrend,
    ];

    pub fn describe(self) -> &'static str {
        match self {
            Pair::Summary => "summary refresh",
            Pair::Logs => "log table refresh",
            Pair::Metrics => "metrics chart refresh",
            Pair::Pie => "pie chart refresh",
            Pair::Line => "line chart refresh",
            Pair::ErrorTrend => "error trend refresh",
        }
    }
}

/// 取得済みのデータ。どの描画に渡すかも兼ねる
#[derive(Debug)]
pub enum Fetched {
    Summary(SummaryStats),
    Logs(Vec<LogEntry>),
    Metrics(MetricsBar),
    Pie(ChartData),
    Line(ChartData),
    ErrorTrend(ChartData),
}

/// 非同期の取得が終わったときにイベントループへ送るメッセージ
#[derive(Debug)]
pub enum Completion {
    Pair {
        pair: Pair,
        result: Result<Fetched, DashboardError>,
    },
    Upload(Result<UploadResponse, DashboardError>),
}

/// 取得処理を並行に投げるだけ。順序付けもキャンセルもしない
pub struct Orchestrator<S> {
    source: Arc<S>,
    tx: UnboundedSender<Completion>,
}

impl<S: DataSource> Orchestrator<S> {
    pub fn new(source: Arc<S>) -> (Self, UnboundedReceiver<Completion>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { source, tx }, rx)
    }

    /// 6つの組をすべて独立に投げる
    pub fn refresh_all(&self, filter: Option<Level>) {
        for pair in Pair::ALL {
            self.spawn_pair(pair, filter);
        }
    }

    pub fn refresh_logs(&self, filter: Option<Level>) {
        self.spawn_pair(Pair::Logs, filter);
    }

    pub fn upload(&self, path: PathBuf) {
        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = source.upload(&path).await;
            // 受信側が閉じている = 終了処理中なので結果は捨てる
            let _ = tx.send(Completion::Upload(result));
        });
    }

    fn spawn_pair(&self, pair: Pair, filter: Option<Level>) {
        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        debug!("issuing {pair:?}");
        tokio::spawn(async move {
            let result = match pair {
                Pair::Summary => source.fetch_summary().await.map(Fetched::Summary),
                Pair::Logs => source.fetch_logs(filter).await.map(Fetched::Logs),
                Pair::Metrics => source.fetch_bar_metrics().await.map(Fetched::Metrics),
                Pair::Pie => source.fetch_chart_data().await.map(Fetched::Pie),
                Pair::Line => source.fetch_chart_data().await.map(Fetched::Line),
                Pair::ErrorTrend => source.fetch_chart_data().await.map(Fetched::ErrorTrend),
            };
            let _ = tx.send(Completion::Pair { pair, result });
        });
    }
}

/// イベントループから呼ばれるトリガーと描画の結び付け
pub struct App<S> {
    pub dashboard: Dashboard,
    orchestrator: Orchestrator<S>,
    should_quit: bool,
}

impl<S: DataSource> App<S> {
    pub fn new(source: Arc<S>) -> (Self, UnboundedReceiver<Completion>) {
        let (orchestrator, completions) = Orchestrator::new(source);
        let app = Self {
            dashboard: Dashboard::new(),
            orchestrator,
            should_quit: false,
        };
        (app, completions)
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// 起動時（と手動・定期更新）
    pub fn on_page_load(&mut self) {
        info!("refreshing all regions");
        self.orchestrator.refresh_all(self.dashboard.level_filter);
    }

    /// フィルタ変更はテーブルだけ取り直す
    pub fn on_filter_change(&mut self, filter: Option<Level>) {
        info!("level filter -> {}", filter.map_or("all", Level::as_str));
        self.dashboard.level_filter = filter;
        self.orchestrator.refresh_logs(filter);
    }

    pub fn on_upload_submit(&mut self, path: PathBuf) {
        info!("uploading {}", path.display());
        self.dashboard.set_status(format!("Uploading {}...", path.display()));
        self.orchestrator.upload(path);
    }

    pub fn on_upload_success(&mut self, response: &UploadResponse) {
        self.dashboard
            .set_status(format!("Uploaded! Parsed {} lines.", response.parsed_count));
        self.on_page_load();
    }

    /// 届いた順に描画する（後から届いたものが勝つ）
    pub fn handle_completion(&mut self, completion: Completion) {
        match completion {
            Completion::Pair { pair, result } => {
                let rendered = result.and_then(|fetched| self.render(fetched));
                if let Err(err) = rendered {
                    self.dashboard.report_failure(pair.describe(), &err);
                }
            }
            Completion::Upload(Ok(response)) => self.on_upload_success(&response),
            Completion::Upload(Err(err)) => self.dashboard.report_failure("upload", &err),
        }
    }

    fn render(&mut self, fetched: Fetched) -> Result<(), DashboardError> {
        match fetched {
            Fetched::Summary(stats) => self.dashboard.show_summary(&stats),
            Fetched::Logs(logs) => self.dashboard.show_logs(&logs),
            Fetched::Metrics(metrics) => self.dashboard.show_metrics(&metrics)?,
            Fetched::Pie(data) => self.dashboard.show_pie(&data)?,
            Fetched::Line(data) => self.dashboard.show_line(&data)?,
            Fetched::ErrorTrend(data) => self.dashboard.show_error_trend(&data)?,
        }
        Ok(())
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        if self.dashboard.input_mode == InputMode::Editing {
            match key.code {
                KeyCode::Enter => {
                    if let Some(path) = self.dashboard.submit_editing() {
                        self.on_upload_submit(PathBuf::from(path));
                    }
                }
                KeyCode::Esc => self.dashboard.cancel_editing(),
                KeyCode::Backspace => {
                    self.dashboard.editing_text.pop();
                }
                KeyCode::Char(c) => self.dashboard.editing_text.push(c),
                _ => {}
            }
            return;
        }

        match key.code {
            // 終了
            KeyCode::Char('q') => self.should_quit = true,
            // 上へスクロール
            KeyCode::Up | KeyCode::Char('k') => self.dashboard.select_previous_log(),
            // 下へスクロール
            KeyCode::Down | KeyCode::Char('j') => self.dashboard.select_next_log(),
            // 選択解除
            KeyCode::Esc => self.dashboard.unselect_log(),
            KeyCode::Char('f') => {
                let next = level::next_filter(self.dashboard.level_filter);
                self.on_filter_change(next);
            }
            KeyCode::Char('F') => {
                let previous = level::previous_filter(self.dashboard.level_filter);
                self.on_filter_change(previous);
            }
            KeyCode::Char('r') => self.on_page_load(),
            KeyCode::Char('u') => self.dashboard.start_editing(),
            // コピー処理
            KeyCode::Char('c') => {
                let Some(message) = self.dashboard.selected_row().map(|row| row.message.clone())
                else {
                    return;
                };
                match copy_to_clipboard(&message) {
                    Ok(()) => self.dashboard.set_status("Copied message to clipboard."),
                    Err(e) => self.dashboard.set_status(format!("Failed to copy to clipboard: {e}")),
                }
            }
            _ => {}
        }
    }
}

async fn next_poll(poll: &mut Option<Interval>) {
    match poll {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

pub async fn run(config: Config) -> Result<()> {
    let source = Arc::new(HttpSource::new(&config.server)?);
    let (mut app, mut completions) = App::new(source);
    app.dashboard.level_filter = config.level;

    // TUIの初期化
    let mut terminal = tui::init()?;

    let app_result = async {
        app.on_page_load();
        if let Some(path) = config.upload.clone() {
            app.on_upload_submit(path);
        }

        let mut tick_rate = time::interval(config.tick());
        let mut poll = config
            .poll()
            .map(|period| time::interval_at(time::Instant::now() + period, period));
        let mut event_stream = EventStream::new();

        loop {
            tokio::select! {
                // 定期的な描画タイミング
                _ = tick_rate.tick() => {
                    terminal.draw(|f| tui::ui(f, &app.dashboard))?;
                }

                // 定期更新（指定された場合のみ）
                _ = next_poll(&mut poll) => {
                    app.on_page_load();
                }

                // キー入力イベントの処理
                Some(Ok(event)) = event_stream.next() => {
                    if let Event::Key(key) = event {
                        app.handle_key(key);
                        if app.should_quit() {
                            break;
                        }
                    }
                }

                // 取得完了の処理
                Some(completion) = completions.recv() => {
                    app.handle_completion(completion);
                }
            }
        }
        Ok::<(), anyhow::Error>(())
    }
    .await;

    // TUIの終了処理
    tui::restore()?;

    app_result
}

fn copy_to_clipboard(text: &str) -> Result<()> {
    // テキストをBase64にエンコード
    let encoded = general_purpose::STANDARD.encode(text);

    // OSC 52 エスケープシーケンス: \x1b]52;c;{Base64文字列}\x07
    let osc052_sequence = format!("\x1b]52;c;{}\x07", encoded);

    let mut out = stdout();
    write!(out, "{}", osc052_sequence)?;
    out.flush()?;

    Ok(())
}
