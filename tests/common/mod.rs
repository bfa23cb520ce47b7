#![allow(dead_code)]
use http_client::{HttpClient, Request, Response};
use http_types::{StatusCode, Url};
use record_scrobbler::{ClientConfig, RetryConfig};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

/// A request as seen by [`ScriptedClient`].
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub url: Url,
    pub user_agent: Option<String>,
    pub content_type: Option<String>,
    pub body: String,
}

impl RecordedRequest {
    pub fn query(&self, name: &str) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
    }

    /// Decoded `application/x-www-form-urlencoded` body.
    pub fn form(&self) -> HashMap<String, String> {
        self.body
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .map(|(k, v)| {
                (
                    urlencoding::decode(k).unwrap().into_owned(),
                    urlencoding::decode(v).unwrap().into_owned(),
                )
            })
            .collect()
    }
}

#[derive(Debug, Clone)]
struct ScriptedResponse {
    status: u16,
    body: String,
    headers: Vec<(String, String)>,
}

#[derive(Debug, Default)]
struct Script {
    routes: HashMap<String, ScriptedResponse>,
    queue: VecDeque<ScriptedResponse>,
    requests: Vec<RecordedRequest>,
}

/// In-memory [`HttpClient`] that answers from a script instead of the network.
///
/// Requests whose path has a route get that route's response every time;
/// anything else pops the next queued response.
#[derive(Debug, Clone, Default)]
pub struct ScriptedClient {
    script: Arc<Mutex<Script>>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, status: u16, body: &str) -> &Self {
        self.push_with_headers(status, body, &[])
    }

    pub fn push_with_headers(&self, status: u16, body: &str, headers: &[(&str, &str)]) -> &Self {
        self.script.lock().unwrap().queue.push_back(ScriptedResponse {
            status,
            body: body.to_string(),
            headers: headers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        });
        self
    }

    pub fn route(&self, path: &str, status: u16, body: &str) -> &Self {
        self.script.lock().unwrap().routes.insert(
            path.to_string(),
            ScriptedResponse {
                status,
                body: body.to_string(),
                headers: Vec::new(),
            },
        );
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.script.lock().unwrap().requests.clone()
    }

    pub fn request_count(&self) -> usize {
        self.script.lock().unwrap().requests.len()
    }
}

#[async_trait::async_trait]
impl HttpClient for ScriptedClient {
    async fn send(&self, mut req: Request) -> Result<Response, http_types::Error> {
        let body = req.body_string().await.unwrap_or_default();
        let header = |name: &str| req.header(name).map(|v| v.last().as_str().to_string());

        let recorded = RecordedRequest {
            method: req.method().to_string(),
            url: req.url().clone(),
            user_agent: header("User-Agent"),
            content_type: header("Content-Type"),
            body,
        };

        let scripted = {
            let mut script = self.script.lock().unwrap();
            let path = recorded.url.path().to_string();
            script.requests.push(recorded);
            match script.routes.get(&path) {
                Some(response) => Some(response.clone()),
                None => script.queue.pop_front(),
            }
        };

        let Some(scripted) = scripted else {
            return Err(http_types::Error::from_str(
                StatusCode::InternalServerError,
                "no scripted response left",
            ));
        };

        let mut response = Response::new(StatusCode::try_from(scripted.status)?);
        for (name, value) in &scripted.headers {
            let _ = response.insert_header(name.as_str(), value.as_str());
        }
        response.set_body(scripted.body);
        Ok(response)
    }
}

/// Config pointing both clients at fake hosts, with instant retries.
pub fn test_config() -> ClientConfig {
    ClientConfig::new()
        .with_discogs_token("discogs-test-token")
        .with_lastfm_keys("lastfm-test-key", "lastfm-test-secret")
        .with_discogs_base_url("http://discogs.test")
        .with_lastfm_base_url("http://lastfm.test/2.0/")
        .with_retry_config(RetryConfig::with_delays(0, 0))
}

pub const SESSION_KEY: &str = "d580d57f32848f5dcf574d1ce18d78b2";

pub const RELEASE_JSON: &str = r#"{
    "id": 249504,
    "title": "Ege Bamyasi",
    "year": 1972,
    "artists": [{"name": "Can (2)", "id": 27953}],
    "tracklist": [
        {"position": "", "type_": "heading", "title": "Side One", "duration": ""},
        {"position": "A1", "type_": "track", "title": "Pinch", "duration": "9:28"},
        {"position": "A2", "type_": "track", "title": "Sing Swan Song", "duration": "4:48"},
        {"position": "B1", "type_": "track", "title": "Vitamin C", "duration": "3:32"},
        {"position": "B2", "type_": "track", "title": "Spoon", "duration": ""}
    ],
    "images": []
}"#;
