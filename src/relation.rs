// custom made ordering for mementos
use std::cmp::Ordering;

// used to print out readable forms of a record
use std::fmt;

use crate::datetime::TemporalValue;
use crate::link::{LinkEntry, RelationSet};

pub const TYPE_CSV: &str = "text/csv";
pub const TYPE_LINK_FORMAT: &str = "application/link-format";

// ------------- Memento -------------
/// An archived snapshot of a URL, ordered by its datetime.
#[derive(Clone, Debug)]
pub struct Memento {
    url: String,
    rel: String,
    relations: RelationSet,
    datetime: TemporalValue,
}

impl Memento {
    /// Only entries with a memento relation and a datetime make a Memento.
    pub fn from_link(link: &LinkEntry) -> Option<Self> {
        if !link.relations().is_memento() {
            return None;
        }
        let datetime = link.datetime()?.clone();
        Some(Self {
            url: link.url().to_owned(),
            rel: link.rel().to_owned(),
            relations: link.relations(),
            datetime,
        })
    }
    pub fn url(&self) -> &str {
        &self.url
    }
    pub fn rel(&self) -> &str {
        &self.rel
    }
    pub fn relations(&self) -> RelationSet {
        self.relations
    }
    pub fn datetime(&self) -> &TemporalValue {
        &self.datetime
    }
    /// The long RFC 1123 form of the datetime.
    pub fn datetime_string(&self) -> String {
        self.datetime.to_rfc1123()
    }
    pub fn is_first(&self) -> bool {
        self.relations.contains(RelationSet::FIRST)
    }
    pub fn is_last(&self) -> bool {
        self.relations.contains(RelationSet::LAST)
    }
}
impl Ord for Memento {
    fn cmp(&self, other: &Self) -> Ordering {
        self.datetime.cmp(&other.datetime)
    }
}
impl PartialOrd for Memento {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl PartialEq for Memento {
    fn eq(&self, other: &Self) -> bool {
        self.datetime == other.datetime
    }
}
impl Eq for Memento {}
impl fmt::Display for Memento {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Memento: url=[{}] rel=[{}] datetime=[{}]",
            self.url, self.rel, self.datetime
        )
    }
}

// ------------- TimeMapDescriptor -------------
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimeMapDescriptor {
    url: String,
    mime_type: Option<String>,
    downloaded: bool,
}

impl TimeMapDescriptor {
    pub fn from_link(link: &LinkEntry) -> Option<Self> {
        if !link.relations().contains(RelationSet::TIMEMAP) {
            return None;
        }
        Some(Self {
            url: link.url().to_owned(),
            mime_type: link.mime_type().map(str::to_owned),
            downloaded: false,
        })
    }
    pub fn url(&self) -> &str {
        &self.url
    }
    pub fn mime_type(&self) -> Option<&str> {
        self.mime_type.as_deref()
    }
    /// Link format is what TimeMaps must use, CSV is accepted for older servers.
    pub fn is_supported_format(&self) -> bool {
        match self.mime_type.as_deref() {
            Some(t) => t.eq_ignore_ascii_case(TYPE_CSV) || t.eq_ignore_ascii_case(TYPE_LINK_FORMAT),
            None => false,
        }
    }
    pub fn downloaded(&self) -> bool {
        self.downloaded
    }
    pub fn set_downloaded(&mut self, downloaded: bool) {
        self.downloaded = downloaded;
    }
}
impl fmt::Display for TimeMapDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "TimeMap: url=[{}] type=[{}] downloaded=[{}]",
            self.url,
            self.mime_type.as_deref().unwrap_or("?"),
            self.downloaded
        )
    }
}

// ------------- TimeBundleDescriptor -------------
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimeBundleDescriptor {
    url: String,
    rel: String,
}

impl TimeBundleDescriptor {
    pub fn from_link(link: &LinkEntry) -> Option<Self> {
        if !link.relations().contains(RelationSet::TIMEBUNDLE) {
            return None;
        }
        Some(Self {
            url: link.url().to_owned(),
            rel: link.rel().to_owned(),
        })
    }
    pub fn url(&self) -> &str {
        &self.url
    }
    pub fn rel(&self) -> &str {
        &self.rel
    }
}
impl fmt::Display for TimeBundleDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "TimeBundle: url=[{}] rel=[{}]", self.url, self.rel)
    }
}
