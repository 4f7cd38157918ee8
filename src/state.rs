use crate::services::analytics::AnalyticsService;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub analytics: Arc<AnalyticsService>,
}

impl AppState {
    pub fn new(analytics: AnalyticsService) -> Self {
        Self { analytics: Arc::new(analytics) }
    }
}
