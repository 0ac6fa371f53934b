// A scripted archive: answers by path prefix and records what it was asked.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use tokio::net::TcpListener;

#[derive(Clone)]
pub struct Scripted {
    status: u16,
    headers: Vec<(&'static str, String)>,
    body: String,
}

impl Scripted {
    pub fn status(status: u16) -> Self {
        Self { status, headers: Vec::new(), body: String::new() }
    }
    pub fn header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }
}

#[derive(Clone, Debug)]
pub struct Recorded {
    pub path: String,
    pub accept_datetime: Option<String>,
    pub user_agent: Option<String>,
}

struct Script {
    routes: Vec<(String, Scripted)>,
    requests: Mutex<Vec<Recorded>>,
}

pub struct MockArchive {
    pub base: String,
    script: Arc<Script>,
}

impl MockArchive {
    /// Binds first so the routes can mention the archive's own address.
    pub async fn start(routes: impl FnOnce(&str) -> Vec<(String, Scripted)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let script = Arc::new(Script { routes: routes(&base), requests: Mutex::new(Vec::new()) });
        let app = Router::new().fallback(respond).with_state(Arc::clone(&script));
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Self { base, script }
    }
    pub fn timegate(&self) -> String {
        format!("{}/timegate/", self.base)
    }
    pub fn requests(&self) -> Vec<Recorded> {
        self.script.requests.lock().unwrap().clone()
    }
    pub fn hits(&self, prefix: &str) -> usize {
        self.requests().iter().filter(|r| r.path.starts_with(prefix)).count()
    }
}

async fn respond(State(script): State<Arc<Script>>, uri: Uri, headers: HeaderMap) -> Response {
    let path = uri.path().to_string();
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok()).map(str::to_owned);
    script.requests.lock().unwrap().push(Recorded {
        path: path.clone(),
        accept_datetime: header("accept-datetime"),
        user_agent: header("user-agent"),
    });
    let Some((_, scripted)) = script.routes.iter().find(|(prefix, _)| path.starts_with(prefix.as_str())) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let mut response_headers = HeaderMap::new();
    for (name, value) in &scripted.headers {
        response_headers.insert(
            HeaderName::from_bytes(name.as_bytes()).unwrap(),
            HeaderValue::from_str(value).unwrap(),
        );
    }
    (
        StatusCode::from_u16(scripted.status).unwrap(),
        response_headers,
        scripted.body.clone(),
    )
        .into_response()
}

/// An address nothing listens on.
pub async fn closed_address() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", address)
}

pub fn link(url: &str, rel: &str, datetime: Option<&str>) -> String {
    match datetime {
        Some(datetime) => format!("<{}>;rel=\"{}\";datetime=\"{}\"", url, rel, datetime),
        None => format!("<{}>;rel=\"{}\"", url, rel),
    }
}

pub fn timemap_link(url: &str, mime_type: &str) -> String {
    format!("<{}>;rel=\"timemap\";type=\"{}\"", url, mime_type)
}
