//! Command line front of the Memento client.
//!
//! `mementoweb <url> [datetime]` looks the URL up in every known archive and
//! prints the Mementos found, one per line. Without a URL the lookup endpoint
//! is served on the configured address instead.
//!
//! Settings are read from `mementoweb.toml` (or the file named by
//! `MEMENTO_SETTINGS`) and `MEMENTO_*` environment variables. Logging is
//! controlled with `RUST_LOG`.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use mementoweb::aggregator::ArchiveAggregator;
use mementoweb::datetime::TemporalValue;
use mementoweb::server::router;
use mementoweb::settings::Settings;
use mementoweb::urls::fix_url;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings_file = std::env::var("MEMENTO_SETTINGS").ok();
    let settings = Settings::load(settings_file.as_deref())?;
    let aggregator = ArchiveAggregator::new(&settings).await?;

    let mut args = std::env::args().skip(1);
    match args.next() {
        Some(url) => {
            let datetime = match args.next() {
                Some(datetime) => TemporalValue::parse_rfc1123(&datetime)?,
                None => TemporalValue::now(),
            };
            let display = settings.display_format()?;
            let mut timeline = aggregator.lookup_at(&fix_url(&url), datetime.clone()).await;
            for memento in timeline.iter() {
                println!("{}\t{}", memento.datetime().format_date_time(&display), memento.url());
            }
            if let Some(closest) = timeline.closest(&datetime) {
                println!("closest: {}", closest);
            }
            for (year, count) in timeline.year_counts() {
                let months: Vec<String> = timeline
                    .month_counts(year)
                    .iter()
                    .map(|(month, count)| format!("{month} {count}"))
                    .collect();
                println!("{year}: {count} ({})", months.join(", "));
            }
        }
        None => {
            let listener = TcpListener::bind(&settings.bind).await?;
            info!(bind = %settings.bind, archives = aggregator.endpoints().len(), "serving lookups");
            axum::serve(listener, router(Arc::new(aggregator))).await?;
        }
    }
    Ok(())
}
