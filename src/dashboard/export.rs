use std::fmt::Write as _;

use html_escape::encode_text;
use time::{macros::format_description, OffsetDateTime};

use crate::dashboard::rows::PageRow;
use crate::dashboard::summary::Summary;

const STYLE: &str = "body{font-family:Helvetica,Arial,sans-serif;margin:2rem;color:#1e1e1e}\
h1{color:#e6513a;font-size:1.6rem;margin-bottom:.25rem}\
.meta{color:#646464;font-size:.85rem;margin:0}\
table{border-collapse:collapse;width:100%;margin:1rem 0 2rem}\
th{color:#fff;text-align:left;padding:.5rem}\
td{padding:.4rem .5rem;border-bottom:1px solid #ddd}\
.summary th{background:#e6513a}.detail th{background:#1e1e1e}\
.num{text-align:right}.path{font-family:monospace;font-size:.8rem;color:#646464}\
@media print{body{margin:0}}";

pub struct Report<'a> {
    pub generated_at: OffsetDateTime,
    pub window_days: u32,
    pub summary: Summary,
    pub rows: Vec<&'a PageRow>,
}

impl<'a> Report<'a> {
    pub fn new(summary: Summary, rows: Vec<&'a PageRow>, window_days: u32) -> Self {
        Self { generated_at: OffsetDateTime::now_utc(), window_days, summary, rows }
    }

    /// `report-YYYY-MM-DD.html`
    pub fn file_name(&self) -> String {
        let date = self
            .generated_at
            .format(format_description!("[year]-[month]-[day]"))
            .unwrap_or_else(|_| "undated".into());
        format!("report-{date}.html")
    }

    pub fn render_html(&self) -> String {
        let stamp = self
            .generated_at
            .format(format_description!("[year]-[month]-[day] [hour]:[minute] UTC"))
            .unwrap_or_default();

        let mut out = String::with_capacity(4096 + self.rows.len() * 256);
        out.push_str("<!doctype html>\n<html><head><meta charset=\"utf-8\"><title>Page metrics report</title>");
        let _ = write!(out, "<style>{STYLE}</style></head>\n<body>\n");
        out.push_str("<h1>PAGE METRICS REPORT</h1>\n");
        let _ = writeln!(out, "<p class=\"meta\">Generated: {}</p>", encode_text(&stamp));
        let _ = writeln!(out, "<p class=\"meta\">Range: Last {} days</p>", self.window_days);

        out.push_str("<h2>Summary</h2>\n<table class=\"summary\"><thead><tr><th>Metric</th><th>Value</th></tr></thead><tbody>\n");
        let _ = writeln!(out, "<tr><td>Total views</td><td class=\"num\">{}</td></tr>", group_thousands(self.summary.total_views));
        let _ = writeln!(out, "<tr><td>Unique readers</td><td class=\"num\">{}</td></tr>", group_thousands(self.summary.total_users));
        let _ = writeln!(out, "<tr><td>Pages per reader</td><td class=\"num\">{:.2}</td></tr>", self.summary.views_per_user);
        out.push_str("</tbody></table>\n");

        out.push_str("<h2>Detail by page</h2>\n<table class=\"detail\"><thead><tr><th>Page</th><th>Views</th><th>Readers</th><th>Avg. read time</th></tr></thead><tbody>\n");
        for row in &self.rows {
            let _ = writeln!(
                out,
                "<tr><td>{}<div class=\"path\">{}</div></td><td class=\"num\">{}</td><td class=\"num\">{}</td><td class=\"num\">{}s</td></tr>",
                encode_text(&row.display_title()),
                encode_text(&row.page_path),
                group_thousands(row.screen_page_views),
                group_thousands(row.active_users),
                row.avg_duration,
            );
        }
        out.push_str("</tbody></table>\n</body></html>\n");
        out
    }
}

/// `1234567` -> `1,234,567`
pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::rows::tests::row;
    use time::macros::datetime;

    #[test]
    fn thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(1234567), "1,234,567");
    }

    #[test]
    fn renders_summary_and_escaped_rows() {
        let mut first = row("/noticia-1", 1500, 300, Some("Taxes <up> & rates | Site"));
        first.avg_duration = 42.5;
        let rows = vec![first, row("/noticia-2", 20, 10, None)];
        let summary = Summary::from_rows(&rows);
        let mut report = Report::new(summary, rows.iter().collect(), 30);
        report.generated_at = datetime!(2026-03-05 14:30 UTC);

        let html = report.render_html();
        assert!(html.contains("Generated: 2026-03-05 14:30 UTC"));
        assert!(html.contains("Range: Last 30 days"));
        assert!(html.contains("<td class=\"num\">1,520</td>"));
        assert!(html.contains("<td class=\"num\">4.90</td>"));
        assert!(html.contains("Taxes &lt;up&gt; &amp; rates"));
        assert!(html.contains("42.5s"));
        assert!(html.contains("<div class=\"path\">/noticia-2</div>"));
        assert_eq!(report.file_name(), "report-2026-03-05.html");
    }
}
