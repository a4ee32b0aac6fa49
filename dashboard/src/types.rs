use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

// サーバーのエンドポイント
pub const UPLOAD_ENDPOINT: &str = "/upload";
pub const LOGS_ENDPOINT: &str = "/logs";
pub const SUMMARY_ENDPOINT: &str = "/summary";
pub const METRICS_ENDPOINT: &str = "/metrics";
pub const CHARTDATA_ENDPOINT: &str = "/chartdata";

// 生ログ（レベルは未知のラベルも受け付けるため文字列のまま保持）
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub timestamp: String,
    pub level: String,
    pub message: String,
}

/// ラベル -> 件数 のマップ。JSONに現れた順序をそのまま保持する。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabelCounts(Vec<(String, u64)>);

impl LabelCounts {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// 既存ラベルは上書き（位置は最初に現れた位置のまま）
    pub fn insert(&mut self, label: impl Into<String>, count: u64) {
        let label = label.into();
        match self.0.iter_mut().find(|(l, _)| *l == label) {
            Some(slot) => slot.1 = count,
            None => self.0.push((label, count)),
        }
    }

    pub fn get(&self, label: &str) -> Option<u64> {
        self.0.iter().find(|(l, _)| l == label).map(|(_, c)| *c)
    }

    /// 欠けているラベルは0として扱う
    pub fn count_of(&self, label: &str) -> u64 {
        self.get(label).unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.0.iter().map(|(l, c)| (l.as_str(), *c))
    }

    pub fn labels(&self) -> Vec<String> {
        self.0.iter().map(|(l, _)| l.clone()).collect()
    }

    /// 時間キーは辞書順 = 時系列順という前提でソートしたもの
    pub fn sorted_by_label(&self) -> Vec<(String, u64)> {
        let mut pairs = self.0.clone();
        pairs.sort_by(|a, b| a.0.cmp(&b.0));
        pairs
    }

    pub fn total(&self) -> u64 {
        self.0.iter().map(|(_, c)| c).sum()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<L: Into<String>> FromIterator<(L, u64)> for LabelCounts {
    fn from_iter<I: IntoIterator<Item = (L, u64)>>(iter: I) -> Self {
        let mut counts = LabelCounts::new();
        for (label, count) in iter {
            counts.insert(label, count);
        }
        counts
    }
}

impl Serialize for LabelCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (label, count) in &self.0 {
            map.serialize_entry(label, count)?;
        }
        map.end()
    }
}

struct LabelCountsVisitor;

impl<'de> Visitor<'de> for LabelCountsVisitor {
    type Value = LabelCounts;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map of label to non-negative count")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut counts = LabelCounts(Vec::with_capacity(access.size_hint().unwrap_or(0)));
        while let Some((label, count)) = access.next_entry::<String, u64>()? {
            counts.insert(label, count);
        }
        Ok(counts)
    }
}

impl<'de> Deserialize<'de> for LabelCounts {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(LabelCountsVisitor)
    }
}

// /summary の集計結果
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct SummaryStats {
    #[serde(default)]
    pub total_logs: u64,
    #[serde(default)]
    pub counts: LabelCounts,
    #[serde(default)]
    pub errors_last_5min: u64,
    #[serde(default)]
    pub most_frequent_message: String,
    #[serde(default)]
    pub busiest_hour: Option<u32>, // ログが0件の場合はnull
}

// /metrics はレベルごとの件数だけ
pub type MetricsBar = LabelCounts;

// /chartdata （円グラフ・折れ線・エラー推移の3つで共有）
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ChartData {
    #[serde(default)]
    pub pie: LabelCounts,
    #[serde(default)]
    pub logs_by_hour: LabelCounts,
    #[serde(default)]
    pub errors_by_hour: LabelCounts,
}

// /upload の応答
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct UploadResponse {
    #[serde(default)]
    pub status: Option<String>,
    pub parsed_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_counts_keep_encounter_order() {
        let counts: LabelCounts =
            serde_json::from_str(r#"{"WARNING":2,"INFO":7,"TRACE":1,"ERROR":3}"#).unwrap();
        assert_eq!(counts.labels(), vec!["WARNING", "INFO", "TRACE", "ERROR"]);
        assert_eq!(counts.total(), 13);
    }

    #[test]
    fn label_counts_missing_label_is_zero() {
        let counts: LabelCounts = [("INFO", 7)].into_iter().collect();
        assert_eq!(counts.count_of("INFO"), 7);
        assert_eq!(counts.count_of("DEBUG"), 0);
        assert_eq!(counts.get("DEBUG"), None);
    }

    #[test]
    fn label_counts_reject_negative_counts() {
        assert!(serde_json::from_str::<LabelCounts>(r#"{"INFO":-1}"#).is_err());
    }

    #[test]
    fn hour_keys_sort_lexicographically() {
        let counts: LabelCounts = [("2024-01-02T09", 4), ("2024-01-01T23", 2)]
            .into_iter()
            .collect();
        let sorted: Vec<String> = counts.sorted_by_label().into_iter().map(|(l, _)| l).collect();
        assert_eq!(sorted, vec!["2024-01-01T23", "2024-01-02T09"]);
    }

    #[test]
    fn summary_tolerates_missing_fields() {
        let stats: SummaryStats =
            serde_json::from_str(r#"{"counts":{"INFO":1},"busiest_hour":null}"#).unwrap();
        assert_eq!(stats.total_logs, 0);
        assert_eq!(stats.errors_last_5min, 0);
        assert_eq!(stats.most_frequent_message, "");
        assert_eq!(stats.busiest_hour, None);
    }

    #[test]
    fn upload_response_ignores_status_when_absent() {
        let resp: UploadResponse = serde_json::from_str(r#"{"parsed_count":42}"#).unwrap();
        assert_eq!(resp.parsed_count, 42);
        assert_eq!(resp.status, None);
    }
}
