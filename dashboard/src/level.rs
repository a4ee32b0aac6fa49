use ratatui::style::{Color, Style};
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

pub const INFO_COLOR: Color = Color::Rgb(0x4C, 0xAF, 0x50);
pub const WARNING_COLOR: Color = Color::Rgb(0xFF, 0xC1, 0x07);
pub const ERROR_COLOR: Color = Color::Rgb(0xF4, 0x43, 0x36);
pub const DEBUG_COLOR: Color = Color::Rgb(0x03, 0xA9, 0xF4);
/// 未知のラベル用
pub const FALLBACK_COLOR: Color = Color::Rgb(0x88, 0x88, 0x88);

/// 既知のログレベル
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    Info,
    Warning,
    Error,
    Debug,
}

impl Level {
    pub const ALL: [Level; 4] = [Level::Info, Level::Warning, Level::Error, Level::Debug];

    pub fn as_str(self) -> &'static str {
        match self {
            Level::Info => "INFO",
            Level::Warning => "WARNING",
            Level::Error => "ERROR",
            Level::Debug => "DEBUG",
        }
    }

    /// 完全一致のみ。大文字小文字の揺れはサーバー側で正規化されている前提
    pub fn from_label(label: &str) -> Option<Level> {
        Level::ALL.into_iter().find(|l| l.as_str() == label)
    }

    pub fn color(self) -> Color {
        match self {
            Level::Info => INFO_COLOR,
            Level::Warning => WARNING_COLOR,
            Level::Error => ERROR_COLOR,
            Level::Debug => DEBUG_COLOR,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("unknown log level '{0}' (expected INFO, WARNING, ERROR or DEBUG)")]
pub struct ParseLevelError(String);

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Level::from_label(&s.to_ascii_uppercase()).ok_or_else(|| ParseLevelError(s.to_string()))
    }
}

/// どんな文字列でも色を返す
pub fn color_of(label: &str) -> Color {
    Level::from_label(label).map_or(FALLBACK_COLOR, Level::color)
}

/// テーブルのレベル列のスタイル。未知のレベルは装飾なし
pub fn level_style(label: &str) -> Style {
    match Level::from_label(label) {
        Some(level) => Style::default().fg(level.color()),
        None => Style::default(),
    }
}

/// フィルタの切り替え順: 全件 -> INFO -> WARNING -> ERROR -> DEBUG -> 全件
pub fn next_filter(current: Option<Level>) -> Option<Level> {
    match current {
        None => Some(Level::Info),
        Some(Level::Info) => Some(Level::Warning),
        Some(Level::Warning) => Some(Level::Error),
        Some(Level::Error) => Some(Level::Debug),
        Some(Level::Debug) => None,
    }
}

pub fn previous_filter(current: Option<Level>) -> Option<Level> {
    match current {
        None => Some(Level::Debug),
        Some(Level::Debug) => Some(Level::Error),
        Some(Level::Error) => Some(Level::Warning),
        Some(Level::Warning) => Some(Level::Info),
        Some(Level::Info) => None,
    }
}
