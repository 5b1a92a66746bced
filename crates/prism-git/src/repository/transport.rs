//! Smart-HTTP client for gix on top of the proxy-aware connection factory.
//!
//! gix drives the Git protocol and asks an [`Http`] implementation for raw
//! GET and POST exchanges. [`ProxiedHttp`] answers them with connections from
//! the backend's [`ProxyAwareConnectionFactory`], so clones and fetches take the
//! same proxy route, credentials and release accounting as every other
//! outbound request of the backend.
//!
//! gix is blocking; the exchanges are bridged onto the async connection with
//! the runtime handle captured before entering the blocking pool.

use std::fmt;
use std::io::{self, BufRead, Cursor, Read, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use gix::protocol::transport::client::http::{
    Error as HttpError, GetResponse, Http, PostBodyDataKind, PostResponse,
};
use parking_lot::Mutex;
use prism_transport::{ProxyAwareConnectionFactory, SharedConnection, TransportError};
use tokio::runtime::Handle;
use tracing::debug;

fn detail(error: impl fmt::Display) -> HttpError {
    HttpError::Detail {
        description: error.to_string(),
    }
}

/// Answers gix's HTTP requests through a [`ProxyAwareConnectionFactory`].
pub(crate) struct ProxiedHttp {
    factory: Arc<ProxyAwareConnectionFactory>,
    runtime: Handle,
    credentials: Option<(String, String)>,
    timeout: Duration,
    interrupt: Arc<AtomicBool>,
}

impl ProxiedHttp {
    pub(crate) fn new(
        factory: Arc<ProxyAwareConnectionFactory>,
        runtime: Handle,
        credentials: Option<(String, String)>,
        timeout: Duration,
        interrupt: Arc<AtomicBool>,
    ) -> Self {
        Self {
            factory,
            runtime,
            credentials,
            timeout,
            interrupt,
        }
    }

    fn open(
        &self,
        method: &str,
        url: &str,
        headers: impl IntoIterator<Item = impl AsRef<str>>,
    ) -> Result<Arc<Mutex<Exchange>>, HttpError> {
        if self.interrupt.load(Ordering::SeqCst) {
            return Err(detail("fetch interrupted"));
        }

        debug!(method, url, "Opening git transport exchange");
        let connection = self.runtime.block_on(self.factory.open(url)).map_err(detail)?;
        {
            let mut request = connection.blocking_lock();
            request.set_request_method(method).map_err(detail)?;
            for header in headers {
                if let Some((name, value)) = header.as_ref().split_once(':') {
                    request
                        .set_request_property(name.trim(), value.trim())
                        .map_err(detail)?;
                }
            }
            request.set_read_timeout(self.timeout).map_err(detail)?;
            if let Some((username, password)) = &self.credentials {
                request.set_basic_auth(username, password).map_err(detail)?;
            }
        }

        Ok(Arc::new(Mutex::new(Exchange {
            url: url.to_string(),
            connection,
            runtime: self.runtime.clone(),
            outcome: Outcome::Pending,
        })))
    }
}

impl Http for ProxiedHttp {
    type Headers = ResponsePart;
    type ResponseBody = ResponsePart;
    type PostBody = RequestBody;

    fn get(
        &mut self,
        url: &str,
        _base_url: &str,
        headers: impl IntoIterator<Item = impl AsRef<str>>,
    ) -> Result<GetResponse<Self::Headers, Self::ResponseBody>, HttpError> {
        let exchange = self.open("GET", url, headers)?;
        exchange.lock().complete().map_err(detail)?;

        Ok(GetResponse {
            headers: ResponsePart::headers(exchange.clone()),
            body: ResponsePart::body(exchange),
        })
    }

    fn post(
        &mut self,
        url: &str,
        _base_url: &str,
        headers: impl IntoIterator<Item = impl AsRef<str>>,
        _body: PostBodyDataKind,
    ) -> Result<PostResponse<Self::Headers, Self::ResponseBody, Self::PostBody>, HttpError> {
        let exchange = self.open("POST", url, headers)?;

        Ok(PostResponse {
            post_body: RequestBody {
                exchange: exchange.clone(),
            },
            headers: ResponsePart::headers(exchange.clone()),
            body: ResponsePart::body(exchange),
        })
    }

    /// Proxy, timeout and credentials come from the factory and settings;
    /// gix's own http options are not used.
    fn configure(
        &mut self,
        _config: &dyn std::any::Any,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
        Ok(())
    }
}

#[derive(Debug)]
enum Outcome {
    Pending,
    Complete {
        headers: Option<Vec<u8>>,
        body: Option<Vec<u8>>,
    },
    Failed(String),
}

/// One request/response pair. The request is sent by the first read of
/// either response part, after gix wrote the request body.
pub(crate) struct Exchange {
    url: String,
    connection: SharedConnection,
    runtime: Handle,
    outcome: Outcome,
}

impl Exchange {
    fn write_body(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut connection = self.connection.blocking_lock();
        connection
            .output_stream()
            .map_err(io::Error::other)?
            .write(buf)
    }

    /// Sends the request unless that already happened.
    fn complete(&mut self) -> io::Result<()> {
        if let Outcome::Pending = self.outcome {
            let connection = self.connection.clone();
            let received = self.runtime.block_on(async move {
                let mut connection = connection.lock().await;
                let status = connection.status_code().await?;
                let mut headers = Vec::new();
                for (name, value) in connection.headers().await? {
                    headers.extend_from_slice(name.as_str().as_bytes());
                    headers.extend_from_slice(b": ");
                    headers.extend_from_slice(value.as_bytes());
                    headers.push(b'\n');
                }
                let body = connection.body().await?.to_vec();
                Ok::<_, TransportError>((status, headers, body))
            });

            self.outcome = match received {
                Ok((status, headers, body)) if (200..300).contains(&status) => Outcome::Complete {
                    headers: Some(headers),
                    body: Some(body),
                },
                // PermissionDenied would hand gix over to the system credential helpers.
                Ok((status, ..)) => Outcome::Failed(format!("{} answered HTTP {}", self.url, status)),
                Err(e) => Outcome::Failed(e.to_string()),
            };
        }

        match &self.outcome {
            Outcome::Failed(message) => Err(io::Error::other(message.clone())),
            _ => Ok(()),
        }
    }

    fn take(&mut self, part: Part) -> io::Result<Vec<u8>> {
        self.complete()?;
        let Outcome::Complete { headers, body } = &mut self.outcome else {
            return Ok(Vec::new());
        };
        let taken = match part {
            Part::Headers => headers.take(),
            Part::Body => body.take(),
        };
        Ok(taken.unwrap_or_default())
    }
}

/// Receives the request body gix writes for a POST.
pub(crate) struct RequestBody {
    exchange: Arc<Mutex<Exchange>>,
}

impl Write for RequestBody {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.exchange.lock().write_body(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
enum Part {
    Headers,
    Body,
}

/// Header lines or body of a response, read on first use.
pub(crate) struct ResponsePart {
    exchange: Arc<Mutex<Exchange>>,
    part: Part,
    buffer: Option<Cursor<Vec<u8>>>,
}

impl ResponsePart {
    fn headers(exchange: Arc<Mutex<Exchange>>) -> Self {
        Self {
            exchange,
            part: Part::Headers,
            buffer: None,
        }
    }

    fn body(exchange: Arc<Mutex<Exchange>>) -> Self {
        Self {
            exchange,
            part: Part::Body,
            buffer: None,
        }
    }

    fn buffer(&mut self) -> io::Result<&mut Cursor<Vec<u8>>> {
        if self.buffer.is_none() {
            let bytes = self.exchange.lock().take(self.part)?;
            self.buffer = Some(Cursor::new(bytes));
        }
        self.buffer
            .as_mut()
            .ok_or_else(|| io::Error::other("response part unavailable"))
    }
}

impl Read for ResponsePart {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.buffer()?.read(buf)
    }
}

impl BufRead for ResponsePart {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        self.buffer()?.fill_buf()
    }

    fn consume(&mut self, amt: usize) {
        if let Some(buffer) = self.buffer.as_mut() {
            buffer.consume(amt);
        }
    }
}

