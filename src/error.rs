use thiserror::Error;

pub const DEFAULT_USER_MESSAGE: &str = "Sorry, but there was an unexpected error that will \
    prevent the Memento from being displayed. Try again in 5 minutes.";
pub const NETWORK_USER_MESSAGE: &str =
    "Sorry, we are having problems contacting the server. Please try again later.";
pub const NO_MEMENTOS_USER_MESSAGE: &str = "Sorry, there are no Mementos for this web page.";
pub const NO_MEMENTOS_FOR_URL_MESSAGE: &str = "Sorry, but there are no Mementos for this URL.";
pub const UNAVAILABLE_USER_MESSAGE: &str =
    "Sorry, but the Memento could not be accessed. Try again in 5 minutes.";
pub const RETRIEVAL_USER_MESSAGE: &str =
    "Sorry, but there was an error in retrieving this Memento.";
pub const TIMEMAP_USER_MESSAGE: &str =
    "There were problems accessing the Memento's TimeMap. Please try again later.";

#[derive(Error, Debug)]
pub enum MementoError {
    #[error("Config error: {0}")]
    Config(String),
    #[error("Parse error: {message}")]
    Parse { message: String },
    #[error("Protocol error: {message}")]
    Protocol {
        message: String,
        status: Option<u16>,
        // what the user gets to see, the message is for the log
        hint: &'static str,
    },
    #[error("Network error: {0}")]
    Network(String),
    #[error("No Mementos: {0}")]
    NoMementos(String),
    #[error("Registry error: {0}")]
    Registry(String),
}

pub type Result<T> = std::result::Result<T, MementoError>;

impl MementoError {
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }
    pub fn protocol(message: impl Into<String>, status: Option<u16>) -> Self {
        Self::Protocol {
            message: message.into(),
            status,
            hint: DEFAULT_USER_MESSAGE,
        }
    }
    pub fn protocol_with_hint(
        message: impl Into<String>,
        status: Option<u16>,
        hint: &'static str,
    ) -> Self {
        Self::Protocol {
            message: message.into(),
            status,
            hint,
        }
    }
    /// The text a user interface should display for this error.
    pub fn user_message(&self) -> String {
        match self {
            Self::Protocol { hint, .. } => hint.to_string(),
            Self::Network(_) => NETWORK_USER_MESSAGE.to_string(),
            Self::NoMementos(message) => message.clone(),
            _ => DEFAULT_USER_MESSAGE.to_string(),
        }
    }
}

// Helper conversions
impl From<reqwest::Error> for MementoError {
    fn from(e: reqwest::Error) -> Self { Self::Network(e.to_string()) }
}
impl From<config::ConfigError> for MementoError {
    fn from(e: config::ConfigError) -> Self { Self::Config(e.to_string()) }
}
impl From<serde_json::Error> for MementoError {
    fn from(e: serde_json::Error) -> Self { Self::Registry(e.to_string()) }
}
impl From<quick_xml::Error> for MementoError {
    fn from(e: quick_xml::Error) -> Self { Self::Registry(e.to_string()) }
}
