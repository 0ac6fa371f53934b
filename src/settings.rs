//! Layered configuration: built-in defaults, an optional settings file and
//! `MEMENTO_*` environment variables, in that order of precedence.

use std::time::Duration;

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::datetime::DisplayFormat;
use crate::error::Result;
use crate::registry::ArchiveEndpoint;

pub const DEFAULT_SETTINGS_FILE: &str = "mementoweb";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// TimeGate used by a lone client, defaults to the LANL aggregator.
    pub timegate_uri: String,
    pub user_agent: String,
    /// Remote list of archives the aggregator fans out to.
    pub registry_uri: String,
    pub connect_timeout_secs: u64,
    pub read_timeout_secs: u64,
    pub max_idle_per_host: usize,
    pub date_format: String,
    pub time_format: String,
    pub bind: String,
    /// When non-empty the registry is not consulted.
    pub endpoints: Vec<ArchiveEndpoint>,
}

impl Default for Settings {
    fn default() -> Self {
        let display = DisplayFormat::default();
        Self {
            timegate_uri: "http://timetravel.mementoweb.org/timegate/".to_string(),
            user_agent: format!("mementoweb/{}", env!("CARGO_PKG_VERSION")),
            registry_uri: "http://labs.mementoweb.org/aggregator_config/archivelist.xml"
                .to_string(),
            connect_timeout_secs: 15,
            read_timeout_secs: 15,
            max_idle_per_host: 20,
            date_format: display.date_pattern().to_string(),
            time_format: display.time_pattern().to_string(),
            bind: "127.0.0.1:8089".to_string(),
            endpoints: Vec::new(),
        }
    }
}

impl Settings {
    /// Reads `path` (any format the config crate knows, extension optional)
    /// if it exists, then the environment.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::with_name(path.unwrap_or(DEFAULT_SETTINGS_FILE)).required(false))
            .add_source(Environment::with_prefix("MEMENTO"))
            .build()?
            .try_deserialize::<Settings>()?;
        Ok(settings)
    }
    pub fn display_format(&self) -> Result<DisplayFormat> {
        DisplayFormat::new(&self.date_format, &self.time_format)
    }
    /// The one transport shared by every client: redirects are interpreted by
    /// the caller and every request is bounded by the two timeouts.
    pub fn http_client(&self) -> Result<reqwest::Client> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .connect_timeout(Duration::from_secs(self.connect_timeout_secs))
            .timeout(Duration::from_secs(
                self.connect_timeout_secs + self.read_timeout_secs,
            ))
            .read_timeout(Duration::from_secs(self.read_timeout_secs))
            .pool_max_idle_per_host(self.max_idle_per_host)
            .user_agent(self.user_agent.clone())
            .build()?;
        Ok(client)
    }
}
