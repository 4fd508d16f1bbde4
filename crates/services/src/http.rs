use std::future::Future;
use std::pin::Pin;

use reqwest::header::ACCEPT;

use crate::error::LookupError;

/// Type alias for a boxed future that can be sent between threads.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub query: Vec<(String, String)>,
    pub accept: &'static str,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            query: Vec::new(),
            accept: "application/json",
        }
    }

    pub fn query(mut self, key: &str, value: impl Into<String>) -> Self {
        self.query.push((key.to_string(), value.into()));
        self
    }

    pub fn accept(mut self, accept: &'static str) -> Self {
        self.accept = accept;
        self
    }

    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    /// 429 maps to `RateLimited`; any other non-2xx to `Failed`.
    pub fn check(&self, service: &'static str) -> Result<(), LookupError> {
        match self.status {
            429 => Err(LookupError::RateLimited),
            200..=299 => Ok(()),
            status => Err(LookupError::Failed { service, status }),
        }
    }

    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, LookupError> {
        serde_json::from_str(&self.body).map_err(|e| LookupError::Decode(e.to_string()))
    }
}

/// Minimal GET-only HTTP seam.
///
/// Implementations must be `Send + Sync` for use across async tasks.
/// Dropping the returned future cancels the request.
pub trait HttpClient: Send + Sync {
    fn get(&self, request: HttpRequest) -> BoxFuture<'_, Result<HttpResponse, LookupError>>;
}

/// `reqwest`-backed client that identifies itself with a `User-Agent`, as
/// the public Nominatim usage policy requires.
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    pub fn new(user_agent: &str) -> Result<Self, LookupError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| LookupError::Network(e.to_string()))?;
        Ok(Self { client })
    }
}

impl HttpClient for ReqwestClient {
    fn get(&self, request: HttpRequest) -> BoxFuture<'_, Result<HttpResponse, LookupError>> {
        Box::pin(async move {
            let resp = self
                .client
                .get(&request.url)
                .query(&request.query)
                .header(ACCEPT, request.accept)
                .send()
                .await
                .map_err(|e| LookupError::Network(e.to_string()))?;

            let status = resp.status().as_u16();
            let body = resp
                .text()
                .await
                .map_err(|e| LookupError::Network(e.to_string()))?;

            Ok(HttpResponse { status, body })
        })
    }
}
