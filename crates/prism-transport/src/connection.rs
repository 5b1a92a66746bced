//! Connection adapter used by the git transport and the secret-store client.
//!
//! A connection walks `Idle -> BodyBuffered -> Executed -> Closed`. The
//! request is sent lazily by the first response getter, exactly once, and
//! `close` always drains whatever response is left so the pooled socket is
//! handed back.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, Response, StatusCode, Url};
use tracing::{debug, warn};

use crate::buffer::SpillBuffer;
use crate::error::{Result, TransportError};

/// Lifecycle state of a [`ProxyAwareConnection`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Idle,
    BodyBuffered,
    Executed,
    Closed,
}

impl ConnectionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::BodyBuffered => "body-buffered",
            Self::Executed => "executed",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Response metadata kept after execution.
#[derive(Debug)]
struct ExecutedResponse {
    status: StatusCode,
    headers: HeaderMap,
    /// Unread body; `None` once read or drained.
    pending: Option<Response>,
    body: Option<Vec<u8>>,
}

/// A single-shot HTTP exchange on top of a shared [`Client`].
pub struct ProxyAwareConnection {
    url: Url,
    client: Client,
    method: Method,
    headers: HeaderMap,
    timeout: Option<Duration>,
    basic_auth: Option<(String, String)>,
    body: Option<SpillBuffer>,
    response: Option<ExecutedResponse>,
    state: ConnectionState,
    releases: Arc<AtomicUsize>,
}

impl ProxyAwareConnection {
    pub(crate) fn new(client: Client, url: Url, releases: Arc<AtomicUsize>) -> Self {
        Self {
            url,
            client,
            method: Method::GET,
            headers: HeaderMap::new(),
            timeout: None,
            basic_auth: None,
            body: None,
            response: None,
            state: ConnectionState::Idle,
            releases,
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn request_method(&self) -> &Method {
        &self.method
    }

    /// Selects the request method. Only allowed before anything else happened.
    pub fn set_request_method(&mut self, method: &str) -> Result<()> {
        if self.state != ConnectionState::Idle {
            return Err(TransportError::invalid_state("set request method", self.state.as_str()));
        }
        self.method = match method.to_ascii_uppercase().as_str() {
            "GET" => Method::GET,
            "HEAD" => Method::HEAD,
            "PUT" => Method::PUT,
            "POST" => Method::POST,
            _ => return Err(TransportError::UnsupportedMethod(method.to_string())),
        };
        Ok(())
    }

    /// Sets a request header, replacing any previous value.
    pub fn set_request_property(&mut self, key: &str, value: &str) -> Result<()> {
        self.ensure_unsent("set request property")?;
        let name =
            HeaderName::from_bytes(key.as_bytes()).map_err(|e| TransportError::invalid_header(key, e))?;
        let value = HeaderValue::from_str(value).map_err(|e| TransportError::invalid_header(key, e))?;
        self.headers.insert(name, value);
        Ok(())
    }

    pub fn request_property(&self, key: &str) -> Option<&str> {
        self.headers.get(key).and_then(|v| v.to_str().ok())
    }

    /// Authenticates against the target (not the proxy) with HTTP basic auth.
    pub fn set_basic_auth(&mut self, username: &str, password: &str) -> Result<()> {
        self.ensure_unsent("set basic auth")?;
        self.basic_auth = Some((username.to_string(), password.to_string()));
        Ok(())
    }

    /// Bounds the whole exchange, from connect to the end of the body.
    pub fn set_read_timeout(&mut self, timeout: Duration) -> Result<()> {
        self.ensure_unsent("set read timeout")?;
        self.timeout = Some(timeout);
        Ok(())
    }

    /// Opens the request body for writing.
    pub fn output_stream(&mut self) -> Result<&mut SpillBuffer> {
        self.ensure_unsent("open output stream")?;
        self.state = ConnectionState::BodyBuffered;
        Ok(self.body.get_or_insert_with(SpillBuffer::new))
    }

    /// Streaming mode is always buffered here; the chunk length is ignored.
    pub fn set_chunked_streaming_mode(&mut self, _chunk_len: usize) -> Result<()> {
        self.output_stream().map(|_| ())
    }

    pub async fn status_code(&mut self) -> Result<u16> {
        Ok(self.executed().await?.status.as_u16())
    }

    pub async fn reason_phrase(&mut self) -> Result<String> {
        let status = self.executed().await?.status;
        Ok(status.canonical_reason().unwrap_or_default().to_string())
    }

    pub async fn headers(&mut self) -> Result<&HeaderMap> {
        Ok(&self.executed().await?.headers)
    }

    pub async fn header(&mut self, name: &str) -> Result<Option<String>> {
        let headers = &self.executed().await?.headers;
        Ok(headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string))
    }

    pub async fn content_type(&mut self) -> Result<Option<String>> {
        self.header(CONTENT_TYPE.as_str()).await
    }

    /// Declared response length, or -1 when the server did not send one.
    pub async fn content_length(&mut self) -> Result<i64> {
        Ok(self
            .header(CONTENT_LENGTH.as_str())
            .await?
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(-1))
    }

    /// Reads the full response body. Later calls return the same bytes.
    pub async fn body(&mut self) -> Result<&[u8]> {
        let url = self.url.to_string();
        let response = self.executed().await?;
        if let Some(pending) = response.pending.take() {
            let bytes = pending
                .bytes()
                .await
                .map_err(|source| TransportError::request(url, source))?;
            response.body = Some(bytes.to_vec());
        }
        Ok(response.body.as_deref().unwrap_or_default())
    }

    /// Drains any unread body and releases the connection. Safe to repeat.
    pub async fn close(&mut self) {
        if self.state == ConnectionState::Closed {
            return;
        }
        if let Some(mut pending) = self.response.as_mut().and_then(|r| r.pending.take()) {
            loop {
                match pending.chunk().await {
                    Ok(Some(_)) => continue,
                    Ok(None) => break,
                    Err(e) => {
                        warn!(url = %self.url, error = %e, "Failed to drain response body");
                        break;
                    },
                }
            }
        }
        self.release();
    }

    /// Sends the request unless that already happened.
    pub async fn execute(&mut self) -> Result<()> {
        match self.state {
            ConnectionState::Executed => return Ok(()),
            ConnectionState::Closed => {
                return Err(TransportError::invalid_state("execute", self.state.as_str()));
            },
            ConnectionState::Idle | ConnectionState::BodyBuffered => {},
        }

        let mut request = self
            .client
            .request(self.method.clone(), self.url.clone())
            .headers(self.headers.clone());
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }
        if let Some((username, password)) = &self.basic_auth {
            request = request.basic_auth(username, Some(password));
        }

        // The buffer is moved into the request and gone once send returns.
        if let Some(buffer) = self.body.take() {
            let (body, len) = match buffer.into_body() {
                Ok(body) => body,
                Err(e) => {
                    self.release();
                    return Err(TransportError::Buffer(e));
                },
            };
            request = request.header(CONTENT_LENGTH, len).body(body);
        }

        debug!(method = %self.method, url = %self.url, "Executing request");
        match request.send().await {
            Ok(response) => {
                self.response = Some(ExecutedResponse {
                    status: response.status(),
                    headers: response.headers().clone(),
                    pending: Some(response),
                    body: None,
                });
                self.state = ConnectionState::Executed;
                Ok(())
            },
            Err(source) => {
                self.release();
                Err(TransportError::request(self.url.as_str(), source))
            },
        }
    }

    async fn executed(&mut self) -> Result<&mut ExecutedResponse> {
        self.execute().await?;
        self.response
            .as_mut()
            .ok_or_else(|| TransportError::invalid_state("read response", self.state.as_str()))
    }

    fn ensure_unsent(&self, operation: &'static str) -> Result<()> {
        match self.state {
            ConnectionState::Idle | ConnectionState::BodyBuffered => Ok(()),
            state => Err(TransportError::invalid_state(operation, state.as_str())),
        }
    }

    fn release(&mut self) {
        self.body = None;
        if let Some(response) = self.response.as_mut() {
            response.pending = None;
        }
        self.state = ConnectionState::Closed;
        self.releases.fetch_add(1, Ordering::SeqCst);
        debug!(url = %self.url, "Connection released");
    }
}

impl fmt::Debug for ProxyAwareConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyAwareConnection")
            .field("url", &self.url.as_str())
            .field("method", &self.method)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
