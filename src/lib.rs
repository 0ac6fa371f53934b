//! Mementoweb – a Memento (RFC 7089) client for finding archived copies of web pages.
//!
//! A *Memento* is a snapshot of a URL as an archive captured it at some point
//! in time. Archives expose their Mementos through two kinds of endpoints:
//! * A *TimeGate* negotiates on the `Accept-Datetime` header and redirects to
//!   the Memento closest to the requested datetime.
//! * A *TimeMap* lists every Memento an archive holds for a URL, possibly
//!   spread over several pages that point at each other.
//!
//! Both speak the `Link` header format, e.g.
//! `<http://web.archive.org/web/20010724154504/http://example.com/>;rel="first memento";datetime="Tue, 24 Jul 2001 15:45:04 GMT"`.
//!
//! ## Modules
//! * [`link`] – Parsing of `Link` headers into [`link::LinkEntry`] values with
//!   their relation types evaluated once into a [`link::RelationSet`].
//! * [`datetime`] – [`datetime::TemporalValue`], RFC 1123 parsing and
//!   formatting, and the [`datetime::DisplayFormat`] used when showing dates.
//! * [`relation`] – The records a link can describe: [`relation::Memento`],
//!   [`relation::TimeMapDescriptor`] and [`relation::TimeBundleDescriptor`].
//! * [`timeline`] – [`timeline::MementoTimeline`], the ordered Mementos of a
//!   URL with year and month indexes and a browsing cursor.
//! * [`timegate`] – [`timegate::TimeGateClient`], negotiation with a single
//!   TimeGate including TimeMap pagination.
//! * [`aggregator`] – [`aggregator::ArchiveAggregator`], the same lookup
//!   against every archive in the [`registry`] at once, merged into one timeline.
//! * [`settings`] – Layered configuration and the shared HTTP transport.
//! * [`server`] – A small JSON endpoint in front of the aggregator.
//!
//! ## Quick Start
//! ```no_run
//! use mementoweb::{aggregator::ArchiveAggregator, settings::Settings};
//! # async fn run() -> mementoweb::Result<()> {
//! let settings = Settings::load(None)?;
//! let aggregator = ArchiveAggregator::new(&settings).await?;
//! let timeline = aggregator.lookup("http://www.bl.uk/").await;
//! for (year, count) in timeline.year_counts() {
//!     println!("{year}: {count}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Errors
//! Lookups do not fail. A [`timegate::TimeGateClient`] keeps an error message
//! for the last round, and the aggregator logs a failing archive and carries
//! on with the others. [`MementoError`] is what the fallible setup steps return.

pub mod error;
pub mod datetime;
pub mod link;
pub mod relation;
pub mod timeline;
pub mod timegate;
pub mod registry;
pub mod aggregator;
pub mod urls;
pub mod settings;
pub mod server;

pub use error::{MementoError, Result};
