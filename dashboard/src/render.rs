//! 取得したJSONを画面用のデータに変換する描画処理。
//!
//! テーブルとサマリーは値として作り直し、グラフは [`WidgetRegistry`] を通して
//! 毎回ウィジェットごと作り直す（部分更新はしない）。

use ratatui::style::Color;

use crate::error::Result;
use crate::level::{Level, color_of};
use crate::types::{ChartData, LabelCounts, LogEntry, MetricsBar, SummaryStats};
use crate::widget::{ChartKind, ChartSpec, ChartWidget, Region, WidgetRegistry};

pub const LINE_COLOR: Color = Color::Rgb(0x21, 0x96, 0xF3);
pub const ERROR_TREND_COLOR: Color = Color::Rgb(0xFF, 0x57, 0x22);
pub const BUSIEST_HOUR_PLACEHOLDER: &str = "-";

/// ログテーブルの1行
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub timestamp: String,
    pub level: String,
    /// 既知のレベルだけ色付けする
    pub class: Option<Level>,
    pub message: String,
}

/// 入力順のまま行を作る（並び替えない）
pub fn render_table(entries: &[LogEntry]) -> Vec<TableRow> {
    entries
        .iter()
        .map(|entry| TableRow {
            timestamp: entry.timestamp.clone(),
            level: entry.level.clone(),
            class: Level::from_label(&entry.level),
            message: entry.message.clone(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryField {
    pub label: &'static str,
    pub value: String,
}

/// サマリーパネルは常に8項目
pub fn render_summary(stats: &SummaryStats) -> Vec<SummaryField> {
    let field = |label, value: String| SummaryField { label, value };
    let mut fields = vec![field("Total Logs", stats.total_logs.to_string())];
    for level in Level::ALL {
        fields.push(field(level.as_str(), stats.counts.count_of(level.as_str()).to_string()));
    }
    fields.push(field("Errors (last 5 min)", stats.errors_last_5min.to_string()));
    fields.push(field("Most Frequent", stats.most_frequent_message.clone()));
    fields.push(field("Busiest Hour", busiest_hour_label(stats.busiest_hour)));
    fields
}

pub fn busiest_hour_label(hour: Option<u32>) -> String {
    match hour {
        Some(h) => format!("{h}:00"),
        None => BUSIEST_HOUR_PLACEHOLDER.to_string(),
    }
}

/// ラベルは出現順、色はレベルから
fn level_spec(kind: ChartKind, title: &str, series_label: Option<&str>, counts: &LabelCounts) -> ChartSpec {
    let labels = counts.labels();
    ChartSpec {
        kind,
        title: title.to_string(),
        series_label: series_label.map(str::to_string),
        values: counts.iter().map(|(_, c)| c).collect(),
        colors: labels.iter().map(|l| color_of(l)).collect(),
        labels,
    }
}

/// 時間キーは辞書順に並べ、系列は単色
fn hourly_spec(title: &str, series_label: &str, counts: &LabelCounts, color: Color) -> ChartSpec {
    let (labels, values): (Vec<String>, Vec<u64>) = counts.sorted_by_label().into_iter().unzip();
    ChartSpec {
        kind: ChartKind::Line,
        title: title.to_string(),
        series_label: Some(series_label.to_string()),
        colors: vec![color; labels.len()],
        labels,
        values,
    }
}

fn rebuild(registry: &mut WidgetRegistry, region: Region, spec: ChartSpec) -> Result<()> {
    registry.replace_widget(region, |id| ChartWidget::build(id, region, spec))?;
    Ok(())
}

pub fn render_bar(registry: &mut WidgetRegistry, metrics: &MetricsBar) -> Result<()> {
    let spec = level_spec(ChartKind::Bar, "Log Count by Level", Some("Log Count"), metrics);
    rebuild(registry, Region::Metrics, spec)
}

pub fn render_pie(registry: &mut WidgetRegistry, data: &ChartData) -> Result<()> {
    let spec = level_spec(ChartKind::Pie, "Level Distribution", None, &data.pie);
    rebuild(registry, Region::Pie, spec)
}

pub fn render_line(registry: &mut WidgetRegistry, data: &ChartData) -> Result<()> {
    let spec = hourly_spec("Logs per Hour", "Logs per Hour", &data.logs_by_hour, LINE_COLOR);
    rebuild(registry, Region::Line, spec)
}

pub fn render_error_trend(registry: &mut WidgetRegistry, data: &ChartData) -> Result<()> {
    let spec = hourly_spec(
        "Errors per Hour",
        "Errors per Hour",
        &data.errors_by_hour,
        ERROR_TREND_COLOR,
    );
    rebuild(registry, Region::ErrorTrend, spec)
}
