use crate::dashboard::rows::PageRow;
use crate::domain::metric::round_to;

/// Sitewide totals shown above the table.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Summary {
    pub total_views: u64,
    pub total_users: u64,
    /// Views per user, two decimals; 0 with no users.
    pub views_per_user: f64,
}

impl Summary {
    pub fn from_rows<'a, I>(rows: I) -> Self
    where
        I: IntoIterator<Item = &'a PageRow>,
    {
        let (total_views, total_users) = rows
            .into_iter()
            .fold((0u64, 0u64), |(v, u), r| (v + r.screen_page_views, u + r.active_users));
        let views_per_user = if total_users > 0 {
            round_to(total_views as f64 / total_users as f64, 2)
        } else {
            0.0
        };
        Self { total_views, total_users, views_per_user }
    }
}
