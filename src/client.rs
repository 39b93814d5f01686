//! # WorldTides API Client
//!
//! This module handles all network operations against the WorldTides v3 API.
//! A single generic [`Worldtides::request`] primitive does the work; typed
//! operations such as [`Worldtides::get_stations`] are thin wrappers that
//! pick the query and deserialize the result.
//!
//! ## Request Lifecycle
//! 1. **Session**: reuse the caller's `reqwest::Client`, or lazily create one
//!    owned by this client
//! 2. **URL**: `{base_url}/api/v3?{params}&{operation}=&key={api_key}`
//! 3. **Send**: one GET, no retries, bounded by the request timeout
//! 4. **Check**: the `Content-Type` must contain `application/json`
//! 5. **Decode**: JSON into `serde_json::Value`, then into the typed model
//!
//! ## Session Ownership
//! A `reqwest::Client` is a handle to a shared connection pool. A session
//! supplied through [`Worldtides::with_session`] is never released by this
//! client; the caller's handle keeps working after [`Worldtides::close`]. A
//! session the client created itself is released on `close()` or when the
//! client is dropped, whichever comes first. Dropping covers every exit path,
//! including a request that failed halfway.
//!
//! ## Concurrency
//! All request methods take `&self`, so one client can be shared (e.g. behind
//! an `Arc`) by concurrent tasks. The session lock is held only long enough
//! to clone the pool handle and never across an `.await`. Ordering between
//! concurrent calls is unspecified.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use chrono::Utc;
use reqwest::header::{ACCEPT, CONTENT_TYPE, USER_AGENT};
use reqwest::Url;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::WorldtidesConfig;
use crate::credit_usage::CreditUsage;
use crate::error::WorldtidesError;
use crate::models::StationResponse;

/// Host serving the public API
pub const API_HOST: &str = "www.worldtides.info";

pub(crate) const DEFAULT_BASE_URL: &str = "https://www.worldtides.info";
pub(crate) const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

const API_PATH: &str = "/api/v3";
const JSON_CONTENT_TYPE: &str = "application/json";
pub(crate) const CLIENT_USER_AGENT: &str = concat!("RustWorldtides/", env!("CARGO_PKG_VERSION"));
pub(crate) const ACCEPTED_CONTENT: &str = "application/json, text/plain, */*";

#[derive(Clone, Debug)]
enum Session {
    /// Created lazily by the client; released on close
    Owned(reqwest::Client),
    /// Supplied by the caller; never released here
    Shared(reqwest::Client),
}

impl Session {
    fn http(&self) -> &reqwest::Client {
        match self {
            Session::Owned(http) | Session::Shared(http) => http,
        }
    }
}

/// Async client for the WorldTides v3 API.
///
/// # Example
/// ```no_run
/// use worldtides::Worldtides;
///
/// # async fn run() -> Result<(), worldtides::WorldtidesError> {
/// let mut worldtides = Worldtides::new();
/// worldtides.authenticate("your-api-key");
///
/// let response = worldtides.get_stations(33.768321, -118.195617, 50).await?;
/// for station in &response.stations {
///     println!("{} ({})", station.name, station.timezone);
/// }
///
/// worldtides.close();
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Worldtides {
    session: Mutex<Option<Session>>,
    api_key: Option<String>,
    request_timeout: Duration,
    base_url: String,
    credit_usage: Mutex<CreditUsage>,
}

impl Default for Worldtides {
    fn default() -> Self {
        Self::new()
    }
}

impl Worldtides {
    /// Client with no session yet; one is created on the first request.
    pub fn new() -> Self {
        Self {
            session: Mutex::new(None),
            api_key: None,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            base_url: DEFAULT_BASE_URL.to_string(),
            credit_usage: Mutex::new(CreditUsage::default()),
        }
    }

    /// Client that sends every request through the caller's `reqwest::Client`.
    pub fn with_session(http: reqwest::Client) -> Self {
        let client = Self::new();
        *client.session.lock().unwrap_or_else(PoisonError::into_inner) =
            Some(Session::Shared(http));
        client
    }

    /// Build a client from loaded configuration.
    ///
    /// Fails with a configuration error if `base_url` is not a usable
    /// http(s) URL.
    pub fn from_config(config: &WorldtidesConfig) -> Result<Self, WorldtidesError> {
        parse_base_url(&config.base_url)?;

        let mut client = Self::new()
            .with_request_timeout(config.request_timeout())
            .with_base_url(config.base_url.clone());
        if let Some(key) = &config.api_key {
            client.authenticate(key.clone());
        }
        Ok(client)
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Point the client at another origin (a proxy, or a stub in tests).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the API key sent with every subsequent request.
    pub fn authenticate(&mut self, api_key: impl Into<String>) {
        self.api_key = Some(api_key.into());
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Whether a session is currently held, owned or shared.
    pub fn has_session(&self) -> bool {
        self.lock_session().is_some()
    }

    /// Whether the held session was created by this client.
    pub fn owns_session(&self) -> bool {
        matches!(*self.lock_session(), Some(Session::Owned(_)))
    }

    /// Snapshot of the credits spent through this client.
    pub fn credit_usage(&self) -> CreditUsage {
        self.credit_usage
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Build the full request URL for `operation` with `params`.
    ///
    /// The operation is sent as a query key with an empty value, after the
    /// caller's params; `key` follows when the client is authenticated.
    /// Params already naming either key are left as given. The result only
    /// depends on the inputs and the client's settings.
    pub fn build_url(&self, operation: &str, params: &[(&str, String)]) -> Result<Url, WorldtidesError> {
        let mut url = parse_base_url(&self.base_url)?;
        let prefix = url.path().trim_end_matches('/').to_string();
        url.set_path(&format!("{prefix}{API_PATH}"));

        let supplied = |name: &str| params.iter().any(|(key, _)| *key == name);
        {
            let mut query = url.query_pairs_mut();
            query.clear();
            for (name, value) in params {
                query.append_pair(name, value);
            }
            if !supplied(operation) {
                query.append_pair(operation, "");
            }
            if let Some(key) = self.api_key.as_deref().filter(|_| !supplied("key")) {
                query.append_pair("key", key);
            }
        }
        Ok(url)
    }

    /// Send one GET for `operation` and return the decoded JSON body.
    ///
    /// # Errors
    /// - Connection kind: timeout, transport failure or non-2xx status
    /// - Service kind: the response is not `application/json`
    /// - Validation kind: the body is not valid JSON
    pub async fn request(&self, operation: &str, params: &[(&str, String)]) -> Result<Value, WorldtidesError> {
        let http = self.session()?;
        let url = self.build_url(operation, params)?;

        debug!(operation, timeout = ?self.request_timeout, "sending Worldtides request");

        let exchange = async {
            let response = http
                .get(url)
                .header(USER_AGENT, CLIENT_USER_AGENT)
                .header(ACCEPT, ACCEPTED_CONTENT)
                .send()
                .await?
                .error_for_status()?;

            let content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|value| value.to_str().ok())
                .unwrap_or_default()
                .to_string();
            let body = response.text().await?;
            Ok::<_, reqwest::Error>((content_type, body))
        };

        let (content_type, body) = match tokio::time::timeout(self.request_timeout, exchange).await {
            Ok(Ok(exchanged)) => exchanged,
            Ok(Err(source)) => {
                warn!(operation, error = %source, "Worldtides request failed");
                return Err(WorldtidesError::Connection(source));
            }
            Err(source) => {
                warn!(operation, timeout = ?self.request_timeout, "Worldtides request timed out");
                return Err(WorldtidesError::Timeout {
                    after: self.request_timeout,
                    source,
                });
            }
        };

        if !content_type.contains(JSON_CONTENT_TYPE) {
            warn!(operation, content_type = %content_type, "unexpected Worldtides response");
            return Err(WorldtidesError::UnexpectedResponse { content_type, body });
        }

        serde_json::from_str(&body).map_err(WorldtidesError::MalformedJson)
    }

    /// Find tide stations within `station_distance` km of a point.
    ///
    /// Coordinates are passed through unchecked; the server decides what it
    /// accepts. The credits reported by the response are added to
    /// [`Worldtides::credit_usage`].
    pub async fn get_stations(
        &self,
        latitude: f64,
        longitude: f64,
        station_distance: u32,
    ) -> Result<StationResponse, WorldtidesError> {
        let params = [
            ("lat", latitude.to_string()),
            ("lon", longitude.to_string()),
            ("stationDistance", station_distance.to_string()),
        ];
        let data = self.request("stations", &params).await?;

        let response: StationResponse =
            serde_json::from_value(data).map_err(WorldtidesError::Validation)?;

        self.credit_usage
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .record(Utc::now(), response.call_count);

        Ok(response)
    }

    /// Release the session if this client created it.
    ///
    /// A no-op for a caller-supplied session or when nothing is held. Safe to
    /// call repeatedly; a later request starts a fresh owned session.
    pub fn close(&self) {
        let mut slot = self.lock_session();
        if matches!(*slot, Some(Session::Owned(_))) {
            *slot = None;
            debug!("released owned Worldtides session");
        }
    }

    fn lock_session(&self) -> std::sync::MutexGuard<'_, Option<Session>> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current pool handle, creating an owned session on first use.
    fn session(&self) -> Result<reqwest::Client, WorldtidesError> {
        let mut slot = self.lock_session();
        if let Some(session) = slot.as_ref() {
            return Ok(session.http().clone());
        }

        let http = reqwest::Client::builder()
            .build()
            .map_err(WorldtidesError::Connection)?;
        *slot = Some(Session::Owned(http.clone()));
        debug!("created owned Worldtides session");
        Ok(http)
    }
}

fn parse_base_url(raw: &str) -> Result<Url, WorldtidesError> {
    let url = Url::parse(raw)
        .map_err(|e| WorldtidesError::Configuration(format!("invalid base URL {raw:?}: {e}")))?;

    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(WorldtidesError::Configuration(format!(
            "base URL {raw:?} must be an http(s) origin"
        )));
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn station_params() -> [(&'static str, String); 3] {
        [
            ("lat", 33.768321_f64.to_string()),
            ("lon", (-118.195617_f64).to_string()),
            ("stationDistance", 50_u32.to_string()),
        ]
    }

    #[test]
    fn builds_station_query() {
        let mut client = Worldtides::new();
        client.authenticate("abc");

        let url = client.build_url("stations", &station_params()).unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.worldtides.info/api/v3?lat=33.768321&lon=-118.195617&stationDistance=50&stations=&key=abc"
        );
        assert_eq!(url.host_str(), Some(API_HOST));
    }

    #[test]
    fn build_url_is_deterministic() {
        let mut client = Worldtides::new();
        client.authenticate("abc");

        let first = client.build_url("stations", &station_params()).unwrap();
        let second = client.build_url("stations", &station_params()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn omits_key_when_unauthenticated() {
        let url = Worldtides::new().build_url("stations", &[]).unwrap();
        assert_eq!(url.query(), Some("stations="));
    }

    #[test]
    fn caller_params_win_over_defaults() {
        let mut client = Worldtides::new();
        client.authenticate("abc");

        let params = [("key", "override".to_string()), ("stations", "1".to_string())];
        let url = client.build_url("stations", &params).unwrap();
        assert_eq!(url.query(), Some("key=override&stations=1"));
    }

    #[test]
    fn base_url_prefix_is_kept() {
        let client = Worldtides::new().with_base_url("http://127.0.0.1:8080/proxy/");
        let url = client.build_url("stations", &[]).unwrap();
        assert_eq!(url.path(), "/proxy/api/v3");
    }

    #[test]
    fn rejects_unusable_base_url() {
        let client = Worldtides::new().with_base_url("not a url");
        let err = client.build_url("stations", &[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);

        let config = WorldtidesConfig {
            base_url: "mailto:tides@example.com".to_string(),
            ..WorldtidesConfig::default()
        };
        let err = Worldtides::from_config(&config).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn from_config_applies_settings() {
        let config = WorldtidesConfig {
            api_key: Some("abc".to_string()),
            request_timeout_secs: 3,
            base_url: "http://localhost:9000".to_string(),
        };
        let client = Worldtides::from_config(&config).unwrap();

        assert_eq!(client.request_timeout(), Duration::from_secs(3));
        assert_eq!(client.base_url(), "http://localhost:9000");
        let url = client.build_url("stations", &[]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:9000/api/v3?stations=&key=abc");
    }

    #[test]
    fn new_client_has_defaults_and_no_session() {
        let client = Worldtides::new();
        assert_eq!(client.request_timeout(), Duration::from_secs(10));
        assert!(!client.has_session());
        assert!(!client.owns_session());
        assert!(client.credit_usage().is_empty());
    }

    #[test]
    fn supplied_session_is_not_owned() {
        let client = Worldtides::with_session(reqwest::Client::new());
        assert!(client.has_session());
        assert!(!client.owns_session());

        client.close();
        client.close();
        assert!(client.has_session());
    }

    #[test]
    fn user_agent_carries_version() {
        assert!(CLIENT_USER_AGENT.starts_with("RustWorldtides/"));
        assert!(CLIENT_USER_AGENT.ends_with(env!("CARGO_PKG_VERSION")));
    }
}
