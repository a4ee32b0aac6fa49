use log::debug;
use ratatui::style::Color;
use std::collections::HashMap;
use std::fmt;

use crate::error::{DashboardError, Result};

/// グラフを描画する画面上の領域
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Region {
    Metrics,
    Pie,
    Line,
    ErrorTrend,
}

impl Region {
    pub const ALL: [Region; 4] = [Region::Metrics, Region::Pie, Region::Line, Region::ErrorTrend];

    /// この領域に置けるグラフの種類
    pub fn accepts(self, kind: ChartKind) -> bool {
        matches!(
            (self, kind),
            (Region::Metrics, ChartKind::Bar)
                | (Region::Pie, ChartKind::Pie)
                | (Region::Line, ChartKind::Line)
                | (Region::ErrorTrend, ChartKind::Line)
        )
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Region::Metrics => "metrics",
            Region::Pie => "pie",
            Region::Line => "line",
            Region::ErrorTrend => "error-trend",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Bar,
    Pie,
    Line,
}

/// ウィジェットに渡すデータ。ラベル・値・色は同じ長さでなければならない
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: String,
    pub series_label: Option<String>,
    pub labels: Vec<String>,
    pub values: Vec<u64>,
    pub colors: Vec<Color>,
}

pub type WidgetId = u64;

/// 1つの領域に結び付いたグラフのインスタンス
#[derive(Debug, PartialEq)]
pub struct ChartWidget {
    id: WidgetId,
    region: Region,
    spec: ChartSpec,
}

impl ChartWidget {
    pub fn build(id: WidgetId, region: Region, spec: ChartSpec) -> Result<Self> {
        if !region.accepts(spec.kind) {
            return Err(DashboardError::Widget {
                region,
                reason: format!("{:?} chart cannot be placed here", spec.kind),
            });
        }
        if spec.labels.len() != spec.values.len() || spec.labels.len() != spec.colors.len() {
            return Err(DashboardError::Widget {
                region,
                reason: format!(
                    "{} labels, {} values and {} colors do not line up",
                    spec.labels.len(),
                    spec.values.len(),
                    spec.colors.len()
                ),
            });
        }
        debug!("constructed {region} widget #{id} with {} points", spec.labels.len());
        Ok(Self { id, region, spec })
    }

    pub fn id(&self) -> WidgetId {
        self.id
    }

    pub fn region(&self) -> Region {
        self.region
    }

    pub fn spec(&self) -> &ChartSpec {
        &self.spec
    }

    pub fn max_value(&self) -> u64 {
        self.spec.values.iter().copied().max().unwrap_or(0)
    }

    fn release(self) {
        debug!("released {} widget #{}", self.region, self.id);
    }
}

/// 領域ごとに最大1つのウィジェットを保持するレジストリ
#[derive(Debug, Default)]
pub struct WidgetRegistry {
    slots: HashMap<Region, ChartWidget>,
    next_id: WidgetId,
    released: u64,
}

impl WidgetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 既存のウィジェットを破棄してから新しく作り直す。
    /// 非同期にしないこと: 破棄と登録の間に他の描画が割り込むと空の領域が見えてしまう。
    pub fn replace_widget<F>(&mut self, region: Region, construct: F) -> Result<&ChartWidget>
    where
        F: FnOnce(WidgetId) -> Result<ChartWidget>,
    {
        if let Some(old) = self.slots.remove(&region) {
            old.release();
            self.released += 1;
        }

        self.next_id += 1;
        // 失敗した場合、領域は空のまま
        let widget = construct(self.next_id)?;
        if widget.region() != region {
            let bound = widget.region();
            widget.release();
            self.released += 1;
            return Err(DashboardError::Widget {
                region,
                reason: format!("constructor produced a widget bound to {bound}"),
            });
        }

        Ok(self.slots.entry(region).or_insert(widget))
    }

    pub fn get(&self, region: Region) -> Option<&ChartWidget> {
        self.slots.get(&region)
    }

    /// 現在生きているインスタンスの数
    pub fn live_count(&self) -> usize {
        self.slots.len()
    }

    pub fn released_count(&self) -> u64 {
        self.released
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar_spec(n: usize) -> ChartSpec {
        ChartSpec {
            kind: ChartKind::Bar,
            title: "Log Count".to_string(),
            series_label: None,
            labels: (0..n).map(|i| format!("L{i}")).collect(),
            values: (0..n as u64).collect(),
            colors: vec![Color::Gray; n],
        }
    }

    #[test]
    fn repeated_replace_keeps_one_instance() {
        let mut registry = WidgetRegistry::new();
        for i in 1..=5 {
            let widget = registry
                .replace_widget(Region::Metrics, |id| {
                    ChartWidget::build(id, Region::Metrics, bar_spec(i))
                })
                .unwrap();
            assert_eq!(widget.spec().labels.len(), i);
        }
        assert_eq!(registry.live_count(), 1);
        assert_eq!(registry.released_count(), 4);
        assert_eq!(registry.get(Region::Metrics).unwrap().id(), 5);
    }

    #[test]
    fn regions_are_independent() {
        let mut registry = WidgetRegistry::new();
        registry
            .replace_widget(Region::Metrics, |id| ChartWidget::build(id, Region::Metrics, bar_spec(2)))
            .unwrap();
        let mut line = bar_spec(3);
        line.kind = ChartKind::Line;
        registry
            .replace_widget(Region::Line, |id| ChartWidget::build(id, Region::Line, line))
            .unwrap();
        assert_eq!(registry.live_count(), 2);
        assert_eq!(registry.released_count(), 0);
    }

    #[test]
    fn failed_constructor_leaves_slot_empty() {
        let mut registry = WidgetRegistry::new();
        registry
            .replace_widget(Region::Pie, |id| {
                let mut spec = bar_spec(1);
                spec.kind = ChartKind::Pie;
                ChartWidget::build(id, Region::Pie, spec)
            })
            .unwrap();

        let err = registry
            .replace_widget(Region::Pie, |id| ChartWidget::build(id, Region::Pie, bar_spec(1)))
            .unwrap_err();
        assert!(matches!(err, DashboardError::Widget { region: Region::Pie, .. }));
        assert!(registry.get(Region::Pie).is_none());
        assert_eq!(registry.live_count(), 0);
        assert_eq!(registry.released_count(), 1);
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let mut spec = bar_spec(3);
        spec.colors.pop();
        assert!(ChartWidget::build(1, Region::Metrics, spec).is_err());
    }

    #[test]
    fn widget_for_another_region_is_rejected() {
        let mut registry = WidgetRegistry::new();
        let err = registry
            .replace_widget(Region::ErrorTrend, |id| {
                ChartWidget::build(id, Region::Metrics, bar_spec(1))
            })
            .unwrap_err();
        assert!(err.to_string().contains("error-trend"));
        assert_eq!(registry.live_count(), 0);
    }

    #[test]
    fn releasing_an_empty_slot_is_a_no_op() {
        let mut registry = WidgetRegistry::new();
        registry
            .replace_widget(Region::Metrics, |id| ChartWidget::build(id, Region::Metrics, bar_spec(0)))
            .unwrap();
        assert_eq!(registry.released_count(), 0);
        assert_eq!(registry.get(Region::Metrics).unwrap().max_value(), 0);
    }
}
