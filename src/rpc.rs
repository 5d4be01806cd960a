use crate::{
    error::Error,
    types::{Request, Response},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use hyper::ext::ReasonPhrase;
use reqwest::{
    blocking::{Client as HttpClient, Response as HttpResponse},
    header::{AUTHORIZATION, CONTENT_TYPE},
    StatusCode,
};
use serde::{de::DeserializeOwned, Serialize};
use std::{error::Error as StdError, io, sync::LazyLock};
use tracing::{debug, warn};
use url::Url;

pub const DEFAULT_HOST: &str = "http://localhost:8232";

static DEFAULT_CLIENT: LazyLock<Client> = LazyLock::new(|| {
    Client::new(Url::parse(DEFAULT_HOST).expect("default host is a valid URL"))
});

/// Blocking JSON-RPC client for a single HTTP endpoint.
///
/// Holds no per-call state, so one instance can be shared across threads.
#[derive(Debug, Clone)]
pub struct Client {
    url: Url,
    user: Option<String>,
    pass: Option<String>,
    http: HttpClient,
}

impl Client {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            user: None,
            pass: None,
            http: HttpClient::new(),
        }
    }

    pub fn parse(url: &str) -> Result<Self, url::ParseError> {
        Ok(Self::new(Url::parse(url)?))
    }

    pub fn with_credentials(mut self, user: impl Into<String>, pass: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self.pass = Some(pass.into());
        self
    }

    /// Swaps the underlying transport, e.g. for one built with timeouts.
    pub fn with_http_client(mut self, http: HttpClient) -> Self {
        self.http = http;
        self
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    fn authorization(&self) -> Option<String> {
        let user = self.user.as_deref().filter(|user| !user.is_empty())?;
        let pass = self.pass.as_deref().unwrap_or_default();
        Some(format!("Basic {}", STANDARD.encode(format!("{user}:{pass}"))))
    }

    /// Sends `request` and decodes the reply into `response`.
    ///
    /// `Ok(())` means the call was transported and decoded. The remote side may
    /// still have reported a failure, which lands in `response.error`.
    pub fn execute<P, T>(&self, request: &Request<P>, response: &mut Response<T>) -> Result<(), Error>
    where
        P: Serialize,
        T: DeserializeOwned,
    {
        if request.method.is_empty() {
            return Err(Error::EmptyMethod);
        }

        let body = serde_json::to_vec(request).map_err(Error::Serialize)?;
        debug!(method = %request.method, id = request.id, url = %self.url, "Sending RPC request");

        let mut builder = self
            .http
            .post(self.url.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(body);
        if let Some(credentials) = self.authorization() {
            builder = builder.header(AUTHORIZATION, credentials);
        }

        let reply = builder.send().map_err(|e| {
            if is_connection_refused(&e) {
                warn!(url = %self.url, "Connection refused");
                Error::Connection(e)
            } else {
                Error::Transport(e)
            }
        })?;

        let status = reply.status();
        if status != StatusCode::OK {
            let status_line = status_line(&reply);
            let body = match reply.bytes() {
                Ok(body) => body.to_vec(),
                Err(source) => {
                    return Err(Error::HttpBody {
                        status,
                        status_line,
                        source,
                    })
                }
            };
            warn!(%status_line, method = %request.method, "RPC request rejected");
            return Err(Error::Http {
                status,
                status_line,
                body,
            });
        }

        let bytes = reply.bytes()?;
        response.decode_into(&bytes)?;
        debug!(
            method = %request.method,
            id = request.id,
            remote_error = response.is_error(),
            "Decoded RPC response"
        );

        Ok(())
    }

    pub fn call<P, T>(&self, request: &Request<P>) -> Result<Response<T>, Error>
    where
        P: Serialize,
        T: DeserializeOwned,
    {
        let mut response = Response::new();
        self.execute(request, &mut response)?;
        Ok(response)
    }
}

/// The shared client for `http://localhost:8232` without credentials.
pub fn default_client() -> &'static Client {
    &DEFAULT_CLIENT
}

pub fn execute<P, T>(request: &Request<P>, response: &mut Response<T>) -> Result<(), Error>
where
    P: Serialize,
    T: DeserializeOwned,
{
    default_client().execute(request, response)
}

pub fn call<P, T>(request: &Request<P>) -> Result<Response<T>, Error>
where
    P: Serialize,
    T: DeserializeOwned,
{
    default_client().call(request)
}

/// Code and reason phrase as sent by the server. hyper only records the
/// phrase when it differs from the canonical one.
fn status_line(reply: &HttpResponse) -> String {
    let status = reply.status();
    let reason = reply
        .extensions()
        .get::<ReasonPhrase>()
        .map(|reason| String::from_utf8_lossy(reason.as_bytes()).into_owned())
        .or_else(|| status.canonical_reason().map(str::to_string));

    match reason {
        Some(reason) => format!("{} {}", status.as_str(), reason),
        None => status.as_str().to_string(),
    }
}

// Best effort: not every transport surfaces the io error kind, so fall back
// to the message text.
fn is_connection_refused(error: &reqwest::Error) -> bool {
    let mut source: Option<&(dyn StdError + 'static)> = Some(error);
    while let Some(err) = source {
        if let Some(io_err) = err.downcast_ref::<io::Error>() {
            if io_err.kind() == io::ErrorKind::ConnectionRefused {
                return true;
            }
        }
        if err.to_string().to_lowercase().contains("connection refused") {
            return true;
        }
        source = err.source();
    }
    false
}
