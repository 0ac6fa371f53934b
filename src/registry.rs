//! The list of web archives the aggregator queries.
//!
//! The list is published as XML, one `<link>` per archive:
//!
//! ```xml
//! <links>
//!   <link id="ia" longname="Internet Archive">
//!     <timegate uri="http://web.archive.org/web/"/>
//!     <timemap uri="http://web.archive.org/web/timemap/link/"/>
//!     <icon uri="http://www.archive.org/favicon.ico"/>
//!   </link>
//! </links>
//! ```
//!
//! A JSON array of `{timegate, timemap, icon}` objects is read as well.

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{MementoError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveEndpoint {
    pub timegate: String,
    #[serde(default)]
    pub timemap: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
}

impl ArchiveEndpoint {
    pub fn new(timegate: &str, timemap: Option<&str>) -> Self {
        Self {
            timegate: timegate.to_owned(),
            timemap: timemap.map(str::to_owned),
            icon: None,
        }
    }
    /// The archive's URL space, the TimeGate without a trailing `timegate/`.
    pub fn archive_prefix(&self) -> &str {
        self.timegate
            .strip_suffix("timegate/")
            .filter(|prefix| prefix.ends_with('/'))
            .unwrap_or(&self.timegate)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RegistryJson {
    List(Vec<ArchiveEndpoint>),
    Wrapped { links: Vec<ArchiveEndpoint> },
}

/// Archives used when the registry cannot be had.
pub fn default_endpoints() -> Vec<ArchiveEndpoint> {
    [
        (
            "http://www.webarchive.org.uk/wayback/archive/",
            "http://www.webarchive.org.uk/wayback/archive/timemap/link/",
        ),
        ("http://archive.today/timegate/", "http://archive.today/timemap/"),
        (
            "http://wayback.archive-it.org/all/",
            "http://wayback.archive-it.org/all/timemap/link/",
        ),
        (
            "http://wayback.vefsafn.is/wayback/",
            "http://wayback.vefsafn.is/wayback/timemap/link/",
        ),
        ("http://web.archive.org/web/", "http://web.archive.org/web/timemap/link/"),
        (
            "http://webarchive.proni.gov.uk/timegate/",
            "http://webarchive.proni.gov.uk/timemap/",
        ),
        ("https://swap.stanford.edu/", "https://swap.stanford.edu/timemap/link/"),
        (
            "http://webarchive.nationalarchives.gov.uk/timegate/",
            "http://webarchive.nationalarchives.gov.uk/timemap/",
        ),
        (
            "http://webarchive.parliament.uk/timegate/",
            "http://webarchive.parliament.uk/timemap/",
        ),
    ]
    .iter()
    .map(|(timegate, timemap)| ArchiveEndpoint::new(timegate, Some(timemap)))
    .collect()
}

pub fn parse_registry(document: &str) -> Result<Vec<ArchiveEndpoint>> {
    let trimmed = document.trim_start();
    if trimmed.starts_with('[') || trimmed.starts_with('{') {
        let endpoints = match serde_json::from_str::<RegistryJson>(trimmed)? {
            RegistryJson::List(endpoints) => endpoints,
            RegistryJson::Wrapped { links } => links,
        };
        return Ok(endpoints);
    }
    parse_registry_xml(document)
}

#[derive(Default)]
struct PendingLink {
    timegate: Option<String>,
    timemap: Option<String>,
    icon: Option<String>,
}
impl PendingLink {
    fn finish(self, endpoints: &mut Vec<ArchiveEndpoint>) {
        match self.timegate {
            Some(timegate) if !timegate.is_empty() => {
                debug!(%timegate, timemap = ?self.timemap, "registry archive");
                endpoints.push(ArchiveEndpoint {
                    timegate,
                    timemap: self.timemap,
                    icon: self.icon,
                });
            }
            _ => debug!(timemap = ?self.timemap, "registry archive without timegate"),
        }
    }
}

fn parse_registry_xml(document: &str) -> Result<Vec<ArchiveEndpoint>> {
    let mut reader = Reader::from_str(document);
    reader.config_mut().trim_text(true);
    let mut endpoints = Vec::new();
    let mut pending: Option<PendingLink> = None;
    loop {
        match reader.read_event()? {
            Event::Start(element) if element.local_name().as_ref() == b"link" => {
                pending = Some(PendingLink::default());
            }
            Event::Empty(element) if element.local_name().as_ref() == b"link" => {
                PendingLink::default().finish(&mut endpoints);
            }
            Event::Start(element) | Event::Empty(element) => {
                if let Some(link) = pending.as_mut() {
                    // only the first of each kind counts
                    match element.local_name().as_ref() {
                        b"timegate" if link.timegate.is_none() => {
                            link.timegate = uri_attribute(&element)?;
                        }
                        b"timemap" if link.timemap.is_none() => {
                            link.timemap = uri_attribute(&element)?;
                        }
                        b"icon" if link.icon.is_none() => {
                            link.icon = uri_attribute(&element)?;
                        }
                        _ => (),
                    }
                }
            }
            Event::End(element) if element.local_name().as_ref() == b"link" => {
                if let Some(link) = pending.take() {
                    link.finish(&mut endpoints);
                }
            }
            Event::Eof => break,
            _ => (),
        }
    }
    Ok(endpoints)
}

fn uri_attribute(element: &BytesStart) -> Result<Option<String>> {
    for attribute in element.attributes() {
        let attribute = attribute.map_err(|e| MementoError::Registry(e.to_string()))?;
        if attribute.key.as_ref() == b"uri" {
            let value = attribute
                .unescape_value()
                .map_err(|e| MementoError::Registry(e.to_string()))?;
            let value = value.trim();
            return Ok((!value.is_empty()).then(|| value.to_owned()));
        }
    }
    Ok(None)
}

pub async fn fetch_registry(client: &reqwest::Client, uri: &str) -> Result<Vec<ArchiveEndpoint>> {
    let response = client.get(uri).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(MementoError::Registry(format!(
            "Registry {} answered {}",
            uri, status
        )));
    }
    let body = response.text().await?;
    let endpoints = parse_registry(&body)?;
    if endpoints.is_empty() {
        return Err(MementoError::Registry(format!(
            "Registry {} lists no archives",
            uri
        )));
    }
    info!(count = endpoints.len(), uri, "loaded archive registry");
    Ok(endpoints)
}
