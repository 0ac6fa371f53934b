//! Parsing of Memento `Link` headers and link-format TimeMaps.
//!
//! A header is a comma separated list of entries shaped like
//! `<URL>;rel="...";datetime="...";type="..."`. Only the parameters Memento
//! uses are understood: `rel`, `type`, `datetime`, `from` and `until`.

use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;
use tracing::warn;

use crate::datetime::TemporalValue;
use crate::error::{MementoError, Result};

lazy_static! {
    // a closing quote followed by a comma ends an entry
    static ref ENTRY_SEPARATOR: Regex = Regex::new(r#""\s*,"#).unwrap();
    static ref PARAMETER_SEPARATOR: Regex = Regex::new(r"\s*;\s*").unwrap();
    // get rid of potential spaces before and after the equal sign
    static ref PARAMETER_NAME: Regex = Regex::new(r"^(\w+)\s*=\s*").unwrap();
    static ref VALUE_TAIL: Regex = Regex::new(r#""?,?$"#).unwrap();
}

// ------------- RelationSet -------------
/// The relation types of a link, evaluated once when the entry is parsed.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RelationSet(u16);

impl RelationSet {
    pub const MEMENTO: RelationSet = RelationSet(1);
    pub const FIRST: RelationSet = RelationSet(1 << 1);
    pub const LAST: RelationSet = RelationSet(1 << 2);
    pub const PREV: RelationSet = RelationSet(1 << 3);
    pub const NEXT: RelationSet = RelationSet(1 << 4);
    pub const TIMEMAP: RelationSet = RelationSet(1 << 5);
    pub const TIMEGATE: RelationSet = RelationSet(1 << 6);
    pub const TIMEBUNDLE: RelationSet = RelationSet(1 << 7);
    pub const ORIGINAL: RelationSet = RelationSet(1 << 8);
    pub const SELF: RelationSet = RelationSet(1 << 9);

    pub fn contains(&self, other: RelationSet) -> bool {
        other.0 != 0 && self.0 & other.0 == other.0
    }
    pub fn insert(&mut self, other: RelationSet) {
        self.0 |= other.0;
    }
    pub fn is_memento(&self) -> bool {
        self.contains(Self::MEMENTO)
    }
    /// Flags for the tokens of a memento relation such as `first last memento`.
    fn from_memento_tokens(rel: &str) -> Self {
        let mut set = Self::MEMENTO;
        for token in rel.split_whitespace() {
            let token = token.to_lowercase();
            if token.contains("first") {
                set.insert(Self::FIRST);
            }
            if token.contains("last") {
                set.insert(Self::LAST);
            }
            if token.contains("prev") {
                set.insert(Self::PREV);
            }
            if token.contains("next") {
                set.insert(Self::NEXT);
            }
        }
        set
    }
}
impl std::ops::BitOr for RelationSet {
    type Output = RelationSet;
    fn bitor(self, other: RelationSet) -> RelationSet {
        RelationSet(self.0 | other.0)
    }
}
impl fmt::Debug for RelationSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let names = [
            (Self::MEMENTO, "memento"),
            (Self::FIRST, "first"),
            (Self::LAST, "last"),
            (Self::PREV, "prev"),
            (Self::NEXT, "next"),
            (Self::TIMEMAP, "timemap"),
            (Self::TIMEGATE, "timegate"),
            (Self::TIMEBUNDLE, "timebundle"),
            (Self::ORIGINAL, "original"),
            (Self::SELF, "self"),
        ];
        let present: Vec<&str> = names
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();
        write!(f, "RelationSet({})", present.join("|"))
    }
}

// ------------- LinkDefect -------------
/// A required field missing for the declared relation. The entry is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkDefect {
    MissingDatetime,
    MissingType,
}

// ------------- LinkEntry -------------
#[derive(Debug, Clone)]
pub struct LinkEntry {
    url: String,
    rel: String,
    relations: RelationSet,
    mime_type: Option<String>,
    datetime: Option<TemporalValue>,
    from: Option<String>,
    until: Option<String>,
}

impl LinkEntry {
    /// Parses a single entry, e.g.
    /// `<http://web.archive.org/web/20010910203350/www.harding.edu/fmccown/>;rel="memento";datetime="Mon, 10 Sep 2001 20:33:50 GMT"`
    pub fn parse(link: &str) -> Result<Self> {
        let link = link.trim();
        let end = link
            .find(">;")
            .ok_or_else(|| MementoError::parse(format!("Unable to find >; in [{}]", link)))?;
        let start = match link.find('<') {
            Some(i) if i < end => i + 1,
            _ => 0,
        };
        let url = link[start..end].trim().to_owned();
        let remainder = &link[end + 2..];

        let mut rel = None;
        let mut mime_type = None;
        let mut datetime = None;
        let mut from = None;
        let mut until = None;
        for part in PARAMETER_SEPARATOR.split(remainder) {
            let part = PARAMETER_NAME.replace(part.trim(), "$1=");
            if part.is_empty() {
                continue;
            }
            if let Some(value) = part.strip_prefix("rel=") {
                rel = Some(parse_rel(&unquote(value))?);
            } else if let Some(value) = part.strip_prefix("datetime=") {
                let value = unquote(value);
                match TemporalValue::parse_rfc1123(&value) {
                    Ok(parsed) => datetime = Some(parsed),
                    Err(e) => warn!(%e, link, "unreadable datetime"),
                }
            } else if let Some(value) = part.strip_prefix("type=") {
                mime_type = Some(unquote(value));
            } else if let Some(value) = part.strip_prefix("from=") {
                from = Some(unquote(value));
            } else if let Some(value) = part.strip_prefix("until=") {
                until = Some(unquote(value));
            } else {
                return Err(MementoError::parse(format!(
                    "Unexpected value: [{}] when looking for rel, datetime, or type",
                    part
                )));
            }
        }

        let (rel, relations) = rel
            .ok_or_else(|| MementoError::parse(format!("Missing rel in: [{}]", link)))?;
        let entry = Self {
            url,
            rel,
            relations,
            mime_type,
            datetime,
            from,
            until,
        };
        match entry.defect() {
            Some(LinkDefect::MissingDatetime) => warn!(link, "missing datetime for memento"),
            Some(LinkDefect::MissingType) => warn!(link, "missing type for timemap"),
            None => (),
        }
        Ok(entry)
    }
    pub fn url(&self) -> &str {
        &self.url
    }
    /// The relation as written for mementos (`first last memento`), otherwise
    /// the single recognised relation type.
    pub fn rel(&self) -> &str {
        &self.rel
    }
    pub fn tokens(&self) -> Vec<&str> {
        self.rel.split_whitespace().collect()
    }
    pub fn relations(&self) -> RelationSet {
        self.relations
    }
    pub fn mime_type(&self) -> Option<&str> {
        self.mime_type.as_deref()
    }
    pub fn datetime(&self) -> Option<&TemporalValue> {
        self.datetime.as_ref()
    }
    // TODO: use from and until to skip TimeMap pages outside the requested range
    pub fn from(&self) -> Option<&str> {
        self.from.as_deref()
    }
    pub fn until(&self) -> Option<&str> {
        self.until.as_deref()
    }
    pub fn defect(&self) -> Option<LinkDefect> {
        if self.relations.is_memento() && self.datetime.is_none() {
            Some(LinkDefect::MissingDatetime)
        } else if self.relations.contains(RelationSet::TIMEMAP) && self.mime_type.is_none() {
            Some(LinkDefect::MissingType)
        } else {
            None
        }
    }
}
impl fmt::Display for LinkEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "<{}>;rel=\"{}\"", self.url, self.rel)?;
        if let Some(mime_type) = &self.mime_type {
            write!(f, ";type=\"{}\"", mime_type)?;
        }
        if let Some(datetime) = &self.datetime {
            write!(f, ";datetime=\"{}\"", datetime)?;
        }
        Ok(())
    }
}

fn unquote(value: &str) -> String {
    let value = value.trim();
    let value = value.strip_prefix('"').unwrap_or(value);
    VALUE_TAIL.replace(value, "").into_owned()
}

fn parse_rel(rel: &str) -> Result<(String, RelationSet)> {
    let kinds = [
        ("timebundle", RelationSet::TIMEBUNDLE),
        ("timemap", RelationSet::TIMEMAP),
        ("timegate", RelationSet::TIMEGATE),
        ("original", RelationSet::ORIGINAL),
        // used only on timemaps
        ("self", RelationSet::SELF),
    ];
    for (name, kind) in kinds {
        if rel.contains(name) {
            return Ok((name.to_owned(), kind));
        }
    }
    if rel.contains("memento") {
        // any combination of first, last, prev and next with memento
        return Ok((rel.to_owned(), RelationSet::from_memento_tokens(rel)));
    }
    Err(MementoError::parse(format!("Undefined rel: [{}]", rel)))
}

/// Splits a whole header (or link-format TimeMap body) into entries.
///
/// Entries are cut at a closing quote followed by a comma, and the quote
/// swallowed by the cut is put back. A quoted value that itself contains
/// `",` will be split in the wrong place; servers are not known to send one.
pub fn split_link_header(links: &str) -> Vec<String> {
    ENTRY_SEPARATOR
        .split(links)
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
        .map(|fragment| {
            if fragment.ends_with('"') {
                fragment.to_owned()
            } else {
                format!("{}\"", fragment)
            }
        })
        .collect()
}

/// Parses every entry of a header, dropping (and logging) the malformed ones.
pub fn parse_link_header(links: &str) -> Vec<LinkEntry> {
    let mut entries = Vec::new();
    for fragment in split_link_header(links) {
        match LinkEntry::parse(&fragment) {
            Ok(entry) => entries.push(entry),
            Err(e) => warn!(%e, "dropping link entry"),
        }
    }
    entries
}
