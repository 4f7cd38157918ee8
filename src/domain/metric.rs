use serde::{Serialize, Serializer};

/// Per-page counters for the reporting window.
///
/// Only the raw counters are stored. Average duration and engagement rate are
/// derived on every read, so they can never drift from the counters.
#[derive(Debug, Clone, PartialEq)]
pub struct PageMetric {
    pub page_path: String,
    pub screen_page_views: u64,
    pub active_users: u64,
    /// Total engagement time across all users, in seconds.
    pub engagement_seconds: f64,
    pub page_title: Option<String>,
}

impl PageMetric {
    pub fn new(page_path: impl Into<String>, views: u64, users: u64, engagement_seconds: f64) -> Self {
        Self {
            page_path: page_path.into(),
            screen_page_views: views,
            active_users: users,
            engagement_seconds,
            page_title: None,
        }
    }

    pub fn with_title(mut self, title: Option<String>) -> Self {
        self.page_title = title;
        self
    }

    /// Seconds of engagement per active user, one decimal place.
    pub fn avg_duration(&self) -> f64 {
        if self.active_users == 0 {
            return 0.0;
        }
        round_to(self.engagement_seconds / self.active_users as f64, 1)
    }

    /// Views per active user, two decimal places.
    pub fn engagement_rate(&self) -> f64 {
        if self.active_users == 0 {
            return 0.0;
        }
        round_to(self.screen_page_views as f64 / self.active_users as f64, 2)
    }
}

pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PageMetricView<'a> {
    page_path: &'a str,
    screen_page_views: u64,
    active_users: u64,
    avg_duration: f64,
    engagement_rate: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    page_title: Option<&'a str>,
}

impl Serialize for PageMetric {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        PageMetricView {
            page_path: &self.page_path,
            screen_page_views: self.screen_page_views,
            active_users: self.active_users,
            avg_duration: self.avg_duration(),
            engagement_rate: self.engagement_rate(),
            page_title: self.page_title.as_deref(),
        }
        .serialize(serializer)
    }
}
