//! Fan-out of one lookup to every known archive.
//!
//! Each archive gets its own [`TimeGateClient`] on a tokio task. The tasks
//! share the pooled transport and nothing else; their Mementos travel over a
//! channel to a single collector, which merges them by their long datetime
//! string. Two archives reporting the same second keep whichever arrived last.

use std::collections::HashMap;
use std::time::Instant;

// icons are matched against archive prefixes in registry order
use indexmap::IndexMap;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::datetime::TemporalValue;
use crate::error::Result;
use crate::registry::{default_endpoints, fetch_registry, ArchiveEndpoint};
use crate::relation::Memento;
use crate::settings::Settings;
use crate::timegate::TimeGateClient;
use crate::timeline::MementoTimeline;

// what one archive contributed to a lookup
struct Contribution {
    timegate: String,
    mementos: Vec<Memento>,
}

// ------------- ArchiveAggregator -------------
pub struct ArchiveAggregator {
    client: reqwest::Client,
    user_agent: String,
    endpoints: Vec<ArchiveEndpoint>,
    icons: IndexMap<String, String>,
}

impl ArchiveAggregator {
    /// Archives come from the settings when listed there, otherwise from the
    /// registry, otherwise from the built-in list.
    pub async fn new(settings: &Settings) -> Result<Self> {
        let client = settings.http_client()?;
        let endpoints = if !settings.endpoints.is_empty() {
            settings.endpoints.clone()
        } else {
            match fetch_registry(&client, &settings.registry_uri).await {
                Ok(endpoints) => endpoints,
                Err(e) => {
                    warn!(%e, registry = %settings.registry_uri, "using built-in archive list");
                    default_endpoints()
                }
            }
        };
        Ok(Self::with_endpoints(client, &settings.user_agent, endpoints))
    }
    pub fn with_endpoints(
        client: reqwest::Client,
        user_agent: &str,
        endpoints: Vec<ArchiveEndpoint>,
    ) -> Self {
        let mut icons = IndexMap::new();
        for endpoint in &endpoints {
            if let Some(icon) = &endpoint.icon {
                debug!(prefix = endpoint.archive_prefix(), %icon, "archive icon");
                icons
                    .entry(endpoint.archive_prefix().to_owned())
                    .or_insert_with(|| icon.clone());
            }
        }
        for endpoint in &endpoints {
            info!(timegate = %endpoint.timegate, "archive");
        }
        Self {
            client,
            user_agent: user_agent.to_owned(),
            endpoints,
            icons,
        }
    }
    pub fn endpoints(&self) -> &[ArchiveEndpoint] {
        &self.endpoints
    }
    /// Icon of the archive holding the Memento, if the registry named one.
    pub fn icon_for(&self, memento: &Memento) -> Option<&str> {
        self.icons
            .iter()
            .find(|(prefix, _)| memento.url().starts_with(prefix.as_str()))
            .map(|(_, icon)| icon.as_str())
    }
    pub async fn lookup(&self, url: &str) -> MementoTimeline {
        self.lookup_at(url, TemporalValue::now()).await
    }
    /// Asks every archive for the URL at the datetime and merges the answers.
    /// An archive that fails contributes nothing, the others are unaffected.
    pub async fn lookup_at(&self, url: &str, datetime: TemporalValue) -> MementoTimeline {
        let started = Instant::now();
        let (tx, mut rx) = mpsc::unbounded_channel::<Contribution>();
        let mut workers = Vec::with_capacity(self.endpoints.len());
        for endpoint in &self.endpoints {
            let mut client =
                TimeGateClient::with_client(&endpoint.timegate, self.client.clone(), &self.user_agent);
            client.set_accept_datetime(datetime.clone());
            let tx = tx.clone();
            let url = url.to_owned();
            workers.push(tokio::spawn(async move {
                let started = Instant::now();
                client.set_target_uri(&url).await;
                if let Some(message) = client.error_message() {
                    warn!(timegate = client.timegate_uri(), %url, error = message, "archive contributed nothing");
                }
                debug!(
                    timegate = client.timegate_uri(),
                    %url,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    count = client.mementos().len(),
                    "archive done"
                );
                let timegate = client.timegate_uri().to_owned();
                let mementos = client.into_mementos().iter().cloned().collect();
                // the collector only goes away when the lookup itself is dropped
                let _ = tx.send(Contribution { timegate, mementos });
            }));
        }
        // the channel closes once every worker has finished
        drop(tx);

        let mut merged: HashMap<String, Memento> = HashMap::new();
        while let Some(contribution) = rx.recv().await {
            for memento in contribution.mementos {
                debug!(timegate = %contribution.timegate, url = memento.url(), "memento");
                merged.insert(memento.datetime_string(), memento);
            }
        }
        for worker in workers {
            if let Err(e) = worker.await {
                warn!(%e, "archive worker failed");
            }
        }

        let mut mementos: Vec<Memento> = merged.into_values().collect();
        mementos.sort_by_key(|m| m.datetime().instant());
        info!(
            %url,
            archives = self.endpoints.len(),
            count = mementos.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "lookup complete"
        );
        mementos.into_iter().collect()
    }
}
