use std::time::Duration;

use http::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::blocking::Client as ReqwestClient;
use tracing::debug;

use crate::request::Body;
use crate::response::normalize;
use crate::{Authorizer, Error, RawResponse, Request, Result, TransportError, DEFAULT_TIMEOUT};

/// Response format marker the remote API expects on every call.
pub const FORMAT_HEADER: &str = "x-api-format";
pub const FORMAT_JSON: &str = "json";
const CONTENT_TYPE_JSON: &str = "application/json";
const CONTENT_TYPE_FORM: &str = "application/x-www-form-urlencoded";

/// Blocking HTTP transport shared by the OAuth contexts and the facade.
#[derive(Debug, Clone)]
pub struct Transport {
    inner: ReqwestClient,
    timeout: Duration,
}

impl Default for Transport {
    fn default() -> Self {
        Transport::new()
    }
}

impl From<ReqwestClient> for Transport {
    fn from(client: ReqwestClient) -> Self {
        Transport::new_with_client(client)
    }
}

impl Transport {
    /// Constructs a new `Transport`.
    ///
    /// This method calls reqwest::blocking::Client::new() internally.
    pub fn new() -> Self {
        Transport::new_with_client(ReqwestClient::new())
    }

    /// Constructs a new `Transport` with specifying inner `reqwest::blocking::Client`.
    pub fn new_with_client(client: ReqwestClient) -> Self {
        Transport {
            inner: client,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Timeout used for requests that do not carry their own.
    pub fn timeout(self, timeout: Duration) -> Self {
        Transport { timeout, ..self }
    }

    pub fn get_timeout(&self) -> Duration {
        self.timeout
    }

    /// Sends a request to the resource API.
    ///
    /// The format marker and content type are always set, overriding any
    /// caller value, and the request is authorized by `authorizer`. A non-2xx
    /// answer fails with a `ProtocolError` when its body is a recognisable
    /// error payload and with `TransportError::Status` otherwise.
    pub fn send<A>(&self, request: Request, authorizer: &A) -> Result<RawResponse>
    where
        A: Authorizer + ?Sized,
    {
        let request = with_api_headers(request);
        // logged before credentials are attached
        debug!(method = %request.method(), url = %request.url(), "sending API request");
        let request = authorizer.authorize(request)?;
        let response = self.execute(request)?;
        check_status(response)
    }

    /// Sends `request` as is and returns the response whatever its status.
    pub fn execute(&self, request: Request) -> Result<RawResponse> {
        let timeout = request.get_timeout().unwrap_or(self.timeout);
        let mut headers = request.headers().clone();
        let mut builder = self
            .inner
            .request(request.method().clone(), request.url().clone())
            .timeout(timeout);
        match request.body() {
            Some(Body::Json(text)) => {
                set_default(&mut headers, CONTENT_TYPE, CONTENT_TYPE_JSON);
                builder = builder.body(text.clone());
            }
            Some(Body::Form(text)) => {
                set_default(&mut headers, CONTENT_TYPE, CONTENT_TYPE_FORM);
                builder = builder.body(text.clone());
            }
            None => {}
        }

        let response = builder
            .headers(headers)
            .send()
            .map_err(TransportError::from_reqwest)?;
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().map_err(TransportError::from_reqwest)?;
        debug!(status, bytes = body.len(), "received response");
        Ok(RawResponse::new(status, content_type, body.to_vec()))
    }
}

fn set_default(headers: &mut HeaderMap, name: HeaderName, value: &'static str) {
    if !headers.contains_key(&name) {
        headers.insert(name, HeaderValue::from_static(value));
    }
}

/// Merges the mandatory API headers into the caller's headers.
pub(crate) fn with_api_headers(mut request: Request) -> Request {
    request.insert_header(
        HeaderName::from_static(FORMAT_HEADER),
        HeaderValue::from_static(FORMAT_JSON),
    );
    request.insert_header(CONTENT_TYPE, HeaderValue::from_static(CONTENT_TYPE_JSON));
    request
}

/// Passes 2xx responses through and classifies everything else.
pub(crate) fn check_status(response: RawResponse) -> Result<RawResponse> {
    if response.is_success() {
        return Ok(response);
    }
    let status = response.status();
    match normalize(status, response.body(), response.content_kind()) {
        Err(Error::Protocol(err)) => Err(Error::Protocol(err)),
        _ => Err(TransportError::Status {
            status,
            body: response.text(),
        }
        .into()),
    }
}
