use anyhow::Result;
use crossterm::{
    ExecutableCommand,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    prelude::*,
    style::{Color, Modifier, Style},
    symbols,
    widgets::{
        Axis, Bar, BarChart, BarGroup, Block, Borders, Cell, Chart, Dataset, GraphType, Paragraph,
        Row, Table, TableState,
    },
};
use std::io::{Stdout, stdout};

use crate::level::level_style;
use crate::render::{SummaryField, TableRow};
use crate::state::{Dashboard, InputMode, Status};
use crate::widget::{ChartWidget, Region, WidgetRegistry};

pub type Tui = Terminal<CrosstermBackend<Stdout>>;

const AXIS_COLOR: Color = Color::Rgb(0xE0, 0xE0, 0xE0);
const BAR_ACCENT: Color = Color::Rgb(0x21, 0x96, 0xF3);

pub fn init() -> Result<Tui> {
    stdout().execute(EnterAlternateScreen)?;
    enable_raw_mode()?;
    let backend = CrosstermBackend::new(stdout());
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

pub fn restore() -> Result<()> {
    stdout().execute(LeaveAlternateScreen)?;
    disable_raw_mode()?;
    Ok(())
}

/// ダッシュボード全体を描画
pub fn ui(f: &mut Frame, state: &Dashboard) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(12),
            Constraint::Length(12),
        ])
        .split(f.area());

    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[0]);
    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(40), Constraint::Length(36)])
        .split(rows[1]);
    let charts_a = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[2]);
    let charts_b = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[3]);

    render_input_pane(f, top[0], state);
    render_status_pane(f, top[1], &state.status);
    render_logs_pane(f, middle[0], state);
    render_summary_pane(f, middle[1], state.summary.as_deref());
    render_chart_region(f, charts_a[0], &state.widgets, Region::Metrics);
    render_chart_region(f, charts_a[1], &state.widgets, Region::Pie);
    render_chart_region(f, charts_b[0], &state.widgets, Region::Line);
    render_chart_region(f, charts_b[1], &state.widgets, Region::ErrorTrend);
}

fn render_input_pane(f: &mut Frame, area: Rect, state: &Dashboard) {
    let (title, text, color) = match state.input_mode {
        InputMode::Editing => (
            "Upload File (Enter: send, Esc: cancel)",
            format!("{}_", state.editing_text),
            Color::Yellow,
        ),
        InputMode::Normal => (
            "Filter",
            format!(
                "Level: {}  [f/F] filter  [u] upload  [r] refresh  [c] copy  [q] quit",
                state.level_filter.map_or("ALL", |l| l.as_str())
            ),
            Color::Cyan,
        ),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(Style::default().fg(color));
    f.render_widget(Paragraph::new(text).block(block), area);
}

fn render_status_pane(f: &mut Frame, area: Rect, status: &Status) {
    let style = if status.is_error() {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::Green)
    };
    let block = Block::default().borders(Borders::ALL).title("Status");
    f.render_widget(Paragraph::new(status.text().to_string()).style(style).block(block), area);
}

fn render_logs_pane(f: &mut Frame, area: Rect, state: &Dashboard) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("Logs ({} items)", state.rows.len()))
        .border_style(Style::default().fg(Color::Blue));

    let rows = state.rows.iter().map(table_row);
    let table = Table::new(
        rows,
        [Constraint::Length(23), Constraint::Length(9), Constraint::Min(10)],
    )
    .header(
        Row::new(vec!["Timestamp", "Level", "Message"])
            .style(Style::default().add_modifier(Modifier::BOLD)),
    )
    .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED))
    .block(block);

    let mut table_state = TableState::default().with_selected(state.selected_log_index);
    f.render_stateful_widget(table, area, &mut table_state);
}

fn table_row(row: &TableRow) -> Row<'_> {
    Row::new(vec![
        Cell::from(row.timestamp.as_str()).style(Style::default().fg(Color::DarkGray)),
        Cell::from(row.level.as_str()).style(level_style(&row.level)),
        Cell::from(row.message.as_str()),
    ])
}

fn render_summary_pane(f: &mut Frame, area: Rect, summary: Option<&[SummaryField]>) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Quick Insights")
        .border_style(Style::default().fg(Color::Magenta));

    let lines: Vec<Line> = match summary {
        Some(fields) => fields
            .iter()
            .map(|field| {
                Line::from(vec![
                    Span::styled(format!("{}: ", field.label), Style::default().add_modifier(Modifier::BOLD)),
                    Span::raw(field.value.as_str()),
                ])
            })
            .collect(),
        None => vec![Line::from("Waiting for summary data...")],
    };
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_chart_region(f: &mut Frame, area: Rect, widgets: &WidgetRegistry, region: Region) {
    match widgets.get(region) {
        Some(widget) => match region {
            Region::Metrics => render_bar_chart(f, area, widget),
            Region::Pie => render_pie_chart(f, area, widget),
            Region::Line | Region::ErrorTrend => render_line_chart(f, area, widget),
        },
        None => {
            let block = Block::default().borders(Borders::ALL).title(region.to_string());
            f.render_widget(Paragraph::new("No data").block(block), area);
        }
    }
}

fn chart_block(widget: &ChartWidget) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .title(widget.spec().title.as_str())
        .border_style(Style::default().fg(BAR_ACCENT))
}

fn render_bar_chart(f: &mut Frame, area: Rect, widget: &ChartWidget) {
    let spec = widget.spec();
    let bars: Vec<Bar> = spec
        .labels
        .iter()
        .zip(&spec.values)
        .zip(&spec.colors)
        .map(|((label, value), color)| {
            Bar::default()
                .value(*value)
                .label(Line::from(label.as_str()))
                .style(Style::default().fg(*color))
                .value_style(Style::default().fg(Color::Black).bg(*color))
        })
        .collect();

    let chart = BarChart::default()
        .block(chart_block(widget))
        .bar_width(7)
        .bar_gap(1)
        .data(BarGroup::default().bars(&bars));
    f.render_widget(chart, area);
}

/// 端末では円を描けないので、割合を横棒で表す
fn render_pie_chart(f: &mut Frame, area: Rect, widget: &ChartWidget) {
    let spec = widget.spec();
    let total: u64 = spec.values.iter().sum();
    let width = area.width.saturating_sub(24).max(1) as u64;

    let lines: Vec<Line> = spec
        .labels
        .iter()
        .zip(&spec.values)
        .zip(&spec.colors)
        .map(|((label, value), color)| {
            let share = if total == 0 { 0.0 } else { *value as f64 / total as f64 };
            let filled = (share * width as f64).round() as usize;
            Line::from(vec![
                Span::styled(format!("{label:<8} "), Style::default().fg(*color)),
                Span::styled("█".repeat(filled), Style::default().fg(*color)),
                Span::raw(format!(" {:>5.1}%", share * 100.0)),
            ])
        })
        .collect();

    f.render_widget(Paragraph::new(lines).block(chart_block(widget)), area);
}

fn render_line_chart(f: &mut Frame, area: Rect, widget: &ChartWidget) {
    let spec = widget.spec();
    let points: Vec<(f64, f64)> = spec
        .values
        .iter()
        .enumerate()
        .map(|(i, v)| (i as f64, *v as f64))
        .collect();
    let color = spec.colors.first().copied().unwrap_or(AXIS_COLOR);
    let y_max = (widget.max_value().max(1) as f64) * 1.1;
    let x_max = (points.len().saturating_sub(1)).max(1) as f64;

    let dataset = Dataset::default()
        .name(spec.series_label.clone().unwrap_or_default())
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(color))
        .data(&points);

    // 横軸は最初と最後の時間キーだけ表示
    let x_labels: Vec<Span> = match (spec.labels.first(), spec.labels.last()) {
        (Some(first), Some(last)) if spec.labels.len() > 1 => {
            vec![Span::raw(first.as_str()), Span::raw(last.as_str())]
        }
        (Some(only), _) => vec![Span::raw(only.as_str())],
        _ => Vec::new(),
    };
    let y_labels = vec![
        Span::raw("0"),
        Span::raw(format!("{}", widget.max_value())),
    ];

    let chart = Chart::new(vec![dataset])
        .block(chart_block(widget))
        .x_axis(
            Axis::default()
                .bounds([0.0, x_max])
                .labels(x_labels)
                .style(Style::default().fg(AXIS_COLOR)),
        )
        .y_axis(
            Axis::default()
                .bounds([0.0, y_max])
                .labels(y_labels)
                .style(Style::default().fg(AXIS_COLOR)),
        );
    f.render_widget(chart, area);
}
