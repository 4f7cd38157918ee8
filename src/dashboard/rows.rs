use std::cmp::Reverse;
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

const DISPLAY_TITLE_CHARS: usize = 35;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRow {
    pub page_path: String,
    pub screen_page_views: u64,
    pub active_users: u64,
    #[serde(default)]
    pub avg_duration: f64,
    #[serde(default)]
    pub engagement_rate: f64,
    #[serde(default)]
    pub page_title: Option<String>,
}

impl PageRow {
    /// Number used for "latest" ordering: the first run of digits in the path, or 0.
    pub fn article_id(&self) -> u64 {
        self.page_path
            .split(|c: char| !c.is_ascii_digit())
            .find(|run| !run.is_empty())
            .and_then(|run| run.parse().ok())
            .unwrap_or(0)
    }

    /// Title cut at the site separator and shortened for the table; the path when untitled.
    pub fn display_title(&self) -> String {
        let Some(title) = self.page_title.as_deref() else {
            return self.page_path.clone();
        };
        let head = title.split('|').next().unwrap_or_default().trim();
        if head.chars().count() > DISPLAY_TITLE_CHARS {
            let cut: String = head.chars().take(DISPLAY_TITLE_CHARS).collect();
            format!("{cut}...")
        } else {
            head.to_string()
        }
    }

    pub fn matches(&self, needle_lower: &str) -> bool {
        self.page_path.to_lowercase().contains(needle_lower)
            || self
                .page_title
                .as_deref()
                .is_some_and(|t| t.to_lowercase().contains(needle_lower))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortMode {
    #[default]
    ViewsDesc,
    ViewsAsc,
    Latest,
}

impl FromStr for SortMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "views-desc" => Ok(SortMode::ViewsDesc),
            "views-asc" => Ok(SortMode::ViewsAsc),
            "latest" => Ok(SortMode::Latest),
            other => Err(format!("unknown sort mode {other:?} (views-desc, views-asc, latest)")),
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SortMode::ViewsDesc => "views-desc",
            SortMode::ViewsAsc => "views-asc",
            SortMode::Latest => "latest",
        })
    }
}

/// Rows whose path or title contains `term`, ignoring case. Empty term keeps all.
pub fn search<'a>(rows: &'a [PageRow], term: &str) -> Vec<&'a PageRow> {
    let needle = term.trim().to_lowercase();
    rows.iter().filter(|r| needle.is_empty() || r.matches(&needle)).collect()
}

pub fn sort_rows(rows: &mut [&PageRow], mode: SortMode) {
    match mode {
        SortMode::ViewsDesc => rows.sort_by_key(|r| Reverse(r.screen_page_views)),
        SortMode::ViewsAsc => rows.sort_by_key(|r| r.screen_page_views),
        SortMode::Latest => rows.sort_by_key(|r| Reverse(r.article_id())),
    }
}

pub fn visible_rows<'a>(rows: &'a [PageRow], term: &str, mode: SortMode) -> Vec<&'a PageRow> {
    let mut shown = search(rows, term);
    sort_rows(&mut shown, mode);
    shown
}
