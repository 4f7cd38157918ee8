use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use news_pulse::dashboard::client::DashboardClient;
use news_pulse::dashboard::export::{group_thousands, Report};
use news_pulse::dashboard::rows::{visible_rows, SortMode};
use news_pulse::dashboard::summary::Summary;

#[derive(Parser)]
#[command(name = "report")]
#[command(about = "Export the page metrics dashboard as an HTML report")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Backend base URL
    #[arg(long, default_value = "http://localhost:3000")]
    api_url: String,

    /// Only pages whose path or title contains this text (case-insensitive)
    #[arg(short, long, default_value = "")]
    search: String,

    /// views-desc, views-asc or latest
    #[arg(long, default_value_t = SortMode::ViewsDesc)]
    sort: SortMode,

    /// Output file or directory (defaults to report-YYYY-MM-DD.html here)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Reporting window shown in the header, in days
    #[arg(long, default_value_t = 30)]
    window_days: u32,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    news_pulse::telemetry::init();
    let cli = Cli::parse();

    let client = DashboardClient::new(&cli.api_url)?;
    let pages = client.fetch_pages().await?;
    let summary = Summary::from_rows(&pages);
    let shown = visible_rows(&pages, &cli.search, cli.sort);

    println!("Total views:      {}", group_thousands(summary.total_views));
    println!("Unique readers:   {}", group_thousands(summary.total_users));
    println!("Pages per reader: {:.2}", summary.views_per_user);
    println!();
    println!("{:<40} {:>10} {:>10} {:>10}", "PAGE", "VIEWS", "READERS", "AVG READ");
    for (i, row) in shown.iter().enumerate() {
        let marker = if i == 0 { " [top]" } else { "" };
        println!(
            "{:<40} {:>10} {:>10} {:>9}s{marker}",
            row.display_title(),
            group_thousands(row.screen_page_views),
            group_thousands(row.active_users),
            row.avg_duration,
        );
    }

    let report = Report::new(summary, shown, cli.window_days);
    let target = match cli.out {
        Some(p) if p.is_dir() => p.join(report.file_name()),
        Some(p) => p,
        None => PathBuf::from(report.file_name()),
    };
    tokio::fs::write(&target, report.render_html())
        .await
        .with_context(|| format!("writing {}", target.display()))?;
    info!(path = %target.display(), rows = report.rows.len(), "report written");
    Ok(())
}
