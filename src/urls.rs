//! Small helpers for the URLs users type and the archive URLs they browse.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // archive host prefix and the pattern that strips the archive part of a URL
    static ref ARCHIVE_PATTERNS: Vec<(&'static str, Regex)> = vec![
        ("http://web.archive.org", Regex::new(r"^http://web\.archive\.org/web/\d+.*?/").unwrap()),
        (
            "http://api.wayback.archive.org/memento",
            Regex::new(r"^http://api\.wayback\.archive\.org/memento/\d+/").unwrap(),
        ),
        (
            "http://api.wayback.archive.org/web",
            Regex::new(r"^http://api\.wayback\.archive\.org/web/\d+/").unwrap(),
        ),
        (
            "http://wayback.archive-it",
            Regex::new(r"^http://wayback\.archive-it\.org/all/\d+/").unwrap(),
        ),
        (
            "http://webarchive.nationalarchives.gov.uk",
            Regex::new(r"^http://webarchive\.nationalarchives\.gov\.uk/\d+/").unwrap(),
        ),
    ];
}

fn has_scheme(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

/// The original URL behind an archive URL, e.g.
/// `http://web.archive.org/web/20071222090517/http://www.foo.org/` gives
/// `http://www.foo.org/`. Other URLs come back unchanged, apart from a
/// missing scheme being added.
pub fn url_from_archive_url(archive_url: &str) -> String {
    let url = ARCHIVE_PATTERNS
        .iter()
        .find(|(prefix, _)| archive_url.starts_with(prefix))
        .map(|(_, pattern)| pattern.replace(archive_url, "").into_owned())
        .unwrap_or_else(|| archive_url.to_owned());
    if has_scheme(&url) {
        url
    } else {
        format!("http://{}", url)
    }
}

pub fn is_archive_url(url: &str) -> bool {
    url.starts_with("http://web.archive.org")
        || url.starts_with("http://api.wayback.archive")
        || url.starts_with("http://wayback.archive-it")
}

/// Adds a missing scheme and a missing root path: `foo.org` becomes
/// `http://foo.org/`.
pub fn fix_url(url: &str) -> String {
    let mut url = if has_scheme(url) {
        url.to_owned()
    } else {
        format!("http://{}", url)
    };
    // two of the slashes belong to the scheme
    if url.matches('/').count() < 3 {
        url.push('/');
    }
    url
}

/// Only checks for a scheme and something after it, archive URLs would not
/// survive anything stricter.
pub fn is_valid_url(url: &str) -> bool {
    !url.is_empty() && url != "http://" && url != "https://" && has_scheme(url)
}
