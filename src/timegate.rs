//! Datetime negotiation against a single TimeGate.
//!
//! A round starts with [`TimeGateClient::set_target_uri`]: the TimeGate is
//! asked for the target URL with an `Accept-Datetime` header, and the answer
//! decides what happens next.
//!
//! | Status | Meaning                          | Headers read        |
//! |--------|----------------------------------|---------------------|
//! | 300    | multiple candidates, only logged |                     |
//! | 302    | resolved Memento                 | `Location`, `Link`  |
//! | 404    | no Mementos                      |                     |
//! | 406    | outside the archived range       | `Link` (first/last) |
//!
//! TimeMaps announced in a `Link` header are then fetched one after another
//! until every distinct TimeMap URL has been downloaded once, so a TimeMap
//! pointing back at itself ends the pagination instead of looping.
//!
//! Errors never leave the client. A failed round leaves an error message
//! behind that a user interface can show, see [`TimeGateClient::error_message`].

// used to remember which timemaps have been seen during a round
use seahash::SeaHasher;
use std::collections::HashSet;
use std::hash::BuildHasherDefault;

use reqwest::header::{HeaderMap, CONTENT_TYPE, LINK, LOCATION, USER_AGENT};
use tracing::{debug, error, info, warn};

use crate::datetime::TemporalValue;
use crate::error::{
    MementoError, Result, NO_MEMENTOS_FOR_URL_MESSAGE, NO_MEMENTOS_USER_MESSAGE,
    RETRIEVAL_USER_MESSAGE, TIMEMAP_USER_MESSAGE, UNAVAILABLE_USER_MESSAGE,
};
use crate::link::parse_link_header;
use crate::relation::{Memento, TimeBundleDescriptor, TimeMapDescriptor};
use crate::settings::Settings;
use crate::timeline::MementoTimeline;
use crate::urls::url_from_archive_url;

pub const ACCEPT_DATETIME: &str = "Accept-Datetime";

// short listings come straight from a TimeGate and are rarely in order
const SORT_BELOW: usize = 5;

type SeenUrls = HashSet<String, BuildHasherDefault<SeaHasher>>;

fn header_value(headers: &HeaderMap, name: reqwest::header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
}

// ------------- TimeGateClient -------------
pub struct TimeGateClient {
    timegate_uri: String,
    client: reqwest::Client,
    user_agent: String,
    accept_datetime: TemporalValue,
    time_bundle: Option<TimeBundleDescriptor>,
    time_maps: Vec<TimeMapDescriptor>,
    seen_time_maps: SeenUrls,
    first: Option<Memento>,
    last: Option<Memento>,
    location: Option<String>,
    mementos: MementoTimeline,
    error_message: Option<String>,
}

impl TimeGateClient {
    /// A client with its own transport built from the settings.
    pub fn new(timegate_uri: &str, settings: &Settings) -> Result<Self> {
        Ok(Self::with_client(
            timegate_uri,
            settings.http_client()?,
            &settings.user_agent,
        ))
    }
    /// A client sharing an existing transport. The transport is expected not
    /// to follow redirects, a 302 is read by the client itself.
    pub fn with_client(timegate_uri: &str, client: reqwest::Client, user_agent: &str) -> Self {
        Self {
            timegate_uri: timegate_uri.to_owned(),
            client,
            user_agent: user_agent.to_owned(),
            accept_datetime: TemporalValue::now(),
            time_bundle: None,
            time_maps: Vec::new(),
            seen_time_maps: SeenUrls::default(),
            first: None,
            last: None,
            location: None,
            mementos: MementoTimeline::new(),
            error_message: None,
        }
    }
    pub fn timegate_uri(&self) -> &str {
        &self.timegate_uri
    }
    pub fn set_timegate_uri(&mut self, timegate_uri: &str) {
        self.timegate_uri = timegate_uri.to_owned();
    }
    pub fn accept_datetime(&self) -> &TemporalValue {
        &self.accept_datetime
    }
    pub fn set_accept_datetime(&mut self, datetime: TemporalValue) {
        self.accept_datetime = datetime;
    }

    /// Runs one negotiation round for the URL. An archive URL is unwrapped to
    /// the URL it archives first.
    pub async fn set_target_uri(&mut self, target: &str) {
        let target = url_from_archive_url(target);
        debug!(target = %target, timegate = %self.timegate_uri, "looking for mementos");
        self.error_message = None;
        if let Err(e) = self.negotiate(&target).await {
            error!(%e, target = %target, timegate = %self.timegate_uri, "negotiation failed");
            self.error_message = Some(e.user_message());
        }
    }
    /// Runs a round and hands back the resulting timeline.
    pub async fn lookup(&mut self, url: &str) -> &MementoTimeline {
        self.set_target_uri(url).await;
        &self.mementos
    }
    pub fn mementos(&self) -> &MementoTimeline {
        &self.mementos
    }
    pub fn into_mementos(self) -> MementoTimeline {
        self.mementos
    }
    /// `None` if the last round went well.
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }
    pub fn first_memento(&self) -> Option<&Memento> {
        self.first.as_ref()
    }
    pub fn last_memento(&self) -> Option<&Memento> {
        self.last.as_ref()
    }
    /// The Memento a 302 pointed at.
    pub fn resolved_location(&self) -> Option<&str> {
        self.location.as_deref()
    }
    pub fn time_bundle(&self) -> Option<&TimeBundleDescriptor> {
        self.time_bundle.as_ref()
    }
    pub fn time_maps(&self) -> &[TimeMapDescriptor] {
        &self.time_maps
    }

    // ------------- negotiation -------------
    fn accept_datetime_header(&self) -> String {
        match &self.first {
            // asking for the first memento's date at midnight would fall out of range
            Some(first) if first.datetime() == &self.accept_datetime => {
                debug!("changing chosen time to 23:59 since datetime matches first memento");
                let mut adjusted = self.accept_datetime.clone();
                adjusted.set_to_end_of_day();
                adjusted.to_rfc1123()
            }
            _ => self.accept_datetime.to_rfc1123(),
        }
    }
    async fn negotiate(&mut self, target: &str) -> Result<()> {
        let url = format!("{}{}", self.timegate_uri, target);
        // the previous round is only consulted for this header
        let accept_datetime = self.accept_datetime_header();
        self.start_round();
        debug!(%url, %accept_datetime, "requesting timegate");
        let response = self
            .client
            .get(&url)
            .header(ACCEPT_DATETIME, accept_datetime.as_str())
            .header(USER_AGENT, self.user_agent.as_str())
            .send()
            .await?;
        let status = response.status().as_u16();
        debug!(%url, status, "timegate responded");
        let location = header_value(response.headers(), LOCATION);
        let link = header_value(response.headers(), LINK);
        match status {
            300 => {
                // no known timegate answers with a list of candidates
                debug!(%url, "multiple choices are not supported");
                Ok(())
            }
            302 => self.on_found(location, link).await,
            404 => Err(MementoError::NoMementos(NO_MEMENTOS_USER_MESSAGE.to_string())),
            406 => self.on_not_acceptable(link).await,
            _ => Err(MementoError::protocol(
                format!("Unexpected response code {} from {}", status, url),
                Some(status),
            )),
        }
    }
    async fn on_found(&mut self, location: Option<String>, link: Option<String>) -> Result<()> {
        let location = location.ok_or_else(|| {
            MementoError::protocol("Location header not found in response headers", Some(302))
        })?;
        let link = link.ok_or_else(|| {
            MementoError::protocol_with_hint(
                "Link header not found in response headers",
                Some(302),
                UNAVAILABLE_USER_MESSAGE,
            )
        })?;
        debug!(%location, "timegate resolved memento");
        self.location = Some(location);
        let announced = self.parse_links(&link, false);
        if self.time_maps.is_empty() {
            self.keep_announced(announced);
            return Ok(());
        }
        self.fetch_time_maps().await.map_err(|e| match e {
            no_mementos @ MementoError::NoMementos(_) => no_mementos,
            other => MementoError::protocol_with_hint(other.to_string(), None, TIMEMAP_USER_MESSAGE),
        })
    }
    async fn on_not_acceptable(&mut self, link: Option<String>) -> Result<()> {
        // some timegates answer 406 where they mean 404
        let link = link.ok_or_else(|| {
            MementoError::protocol_with_hint(
                "Link header not found in 406 response headers",
                Some(406),
                NO_MEMENTOS_FOR_URL_MESSAGE,
            )
        })?;
        let announced = self.parse_links(&link, false);
        if self.time_maps.is_empty() {
            self.keep_announced(announced);
        } else if let Err(e) = self.fetch_time_maps().await {
            warn!(%e, "timemap of a 406 response could not be read");
        }
        match (&self.first, &self.last) {
            (None, None) => Err(MementoError::protocol_with_hint(
                "Could not find first or last Memento in 406 response",
                Some(406),
                RETRIEVAL_USER_MESSAGE,
            )),
            (first, last) => {
                info!(
                    first = ?first.as_ref().map(Memento::datetime_string),
                    last = ?last.as_ref().map(Memento::datetime_string),
                    "not available in this date range"
                );
                Ok(())
            }
        }
    }
    fn start_round(&mut self) {
        self.first = None;
        self.last = None;
        self.location = None;
        self.time_maps.clear();
        self.seen_time_maps.clear();
        self.time_bundle = None;
        self.mementos.clear();
    }
    // without a timemap the mementos of the timegate's own header are all there is
    fn keep_announced(&mut self, announced: Vec<Memento>) {
        self.mementos.extend(announced);
        if self.mementos.len() < SORT_BELOW {
            self.mementos.sort();
        }
        self.fall_back_to_timeline_bounds();
    }
    fn fall_back_to_timeline_bounds(&mut self) {
        if self.first.is_none() {
            self.first = self.mementos.first().cloned();
        }
        if self.last.is_none() {
            self.last = self.mementos.last().cloned();
        }
    }

    /// Reads a `Link` header or a link-format TimeMap body. First and last
    /// Mementos are taken from the relation tokens, new TimeMaps in a
    /// supported format are queued and a TimeBundle is remembered.
    /// Returns the Mementos that were not added to the timeline.
    fn parse_links(&mut self, links: &str, add_to_timeline: bool) -> Vec<Memento> {
        self.first = None;
        self.last = None;
        let entries = parse_link_header(links);
        debug!(count = entries.len(), "start parsing links");
        let mut found = Vec::new();
        for entry in &entries {
            if let Some(memento) = Memento::from_link(entry) {
                if memento.is_first() {
                    self.first = Some(memento.clone());
                }
                if memento.is_last() {
                    self.last = Some(memento.clone());
                }
                found.push(memento);
            } else if let Some(time_map) = TimeMapDescriptor::from_link(entry) {
                if !time_map.is_supported_format() {
                    debug!(%time_map, "skipping timemap in unsupported format");
                } else if !self.seen_time_maps.insert(time_map.url().to_owned()) {
                    debug!(%time_map, "ignoring duplicate timemap");
                } else {
                    debug!(%time_map, "adding new timemap");
                    self.time_maps.push(time_map);
                }
            } else if let Some(time_bundle) = TimeBundleDescriptor::from_link(entry) {
                self.time_bundle = Some(time_bundle);
            }
        }
        debug!(count = found.len(), "finished parsing memento links");
        if add_to_timeline {
            self.mementos.extend(found.drain(..));
            // a timemap is listed in order already, sorting thousands would be wasted
            if self.mementos.len() < SORT_BELOW {
                self.mementos.sort();
            }
            debug!(total = self.mementos.len(), "mementos in timeline");
        }
        // if these aren't set then this is likely a timemap
        self.fall_back_to_timeline_bounds();
        found
    }

    // ------------- timemaps -------------
    async fn fetch_time_maps(&mut self) -> Result<()> {
        while let Some(next) = self.time_maps.iter().position(|tm| !tm.downloaded()) {
            // marked before fetching, a failed page is not retried
            self.time_maps[next].set_downloaded(true);
            let time_map = self.time_maps[next].clone();
            let body = self.fetch_time_map(&time_map).await?;
            self.parse_links(&body, true);
        }
        Ok(())
    }
    async fn fetch_time_map(&self, time_map: &TimeMapDescriptor) -> Result<String> {
        let url = time_map.url();
        debug!(url, "accessing timemap");
        let response = self
            .client
            .get(url)
            .header(USER_AGENT, self.user_agent.as_str())
            .send()
            .await?;
        let status = response.status().as_u16();
        match status {
            200 => {
                let declared = time_map.mime_type().unwrap_or_default().to_lowercase();
                match header_value(response.headers(), CONTENT_TYPE) {
                    None => warn!(url, "could not find the Content-Type of timemap"),
                    Some(content_type) if !content_type.to_lowercase().contains(&declared) => {
                        warn!(url, %content_type, %declared, "timemap Content-Type differs from its type")
                    }
                    Some(_) => (),
                }
                Ok(response.text().await?)
            }
            404 => {
                debug!(url, "timemap not found, no mementos");
                Err(MementoError::NoMementos(NO_MEMENTOS_USER_MESSAGE.to_string()))
            }
            _ => Err(MementoError::protocol(
                format!("Unexpected response code {} for TimeMap {}", status, url),
                Some(status),
            )),
        }
    }
}
