use std::convert::TryFrom;

use serde_json::{Map, Value};
use tracing::warn;

use crate::xml::Element;
use crate::{Error, ParseError, ProtocolError, Result};

/// Declared format of a response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Json,
    Xml,
}

impl ContentKind {
    /// Picks the format from a `Content-Type` value, sniffing the body when
    /// the header is absent or names neither format.
    pub fn detect(content_type: Option<&str>, body: &[u8]) -> Self {
        if let Some(content_type) = content_type {
            let content_type = content_type.to_ascii_lowercase();
            if content_type.contains("json") {
                return ContentKind::Json;
            }
            if content_type.contains("xml") {
                return ContentKind::Xml;
            }
        }
        match body.iter().find(|b| !b.is_ascii_whitespace()) {
            Some(b'<') => ContentKind::Xml,
            _ => ContentKind::Json,
        }
    }
}

/// Undecoded response as returned by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    status: u16,
    content_type: Option<String>,
    body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: u16, content_type: Option<String>, body: Vec<u8>) -> Self {
        RawResponse {
            status,
            content_type,
            body,
        }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn content_kind(&self) -> ContentKind {
        ContentKind::detect(self.content_type(), &self.body)
    }

    /// Decodes the body according to its declared format.
    pub fn payload(&self) -> Result<Payload> {
        normalize(self.status, &self.body, self.content_kind())
    }

    /// Decodes the body as JSON; an empty body yields `Value::Null`.
    pub fn json(&self) -> Result<Value> {
        self.payload()?.into_json()
    }
}

/// A decoded response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Empty,
    Json(Value),
    Xml(Element),
}

impl Payload {
    fn describe(&self) -> &'static str {
        match self {
            Payload::Empty => "empty",
            Payload::Json(_) => "json",
            Payload::Xml(_) => "xml",
        }
    }

    pub fn into_json(self) -> Result<Value> {
        match self {
            Payload::Empty => Ok(Value::Null),
            Payload::Json(value) => Ok(value),
            other => Err(ParseError::UnexpectedFormat {
                expected: "json",
                found: other.describe(),
            }
            .into()),
        }
    }

    pub fn into_xml(self) -> Result<Element> {
        match self {
            Payload::Xml(element) => Ok(element),
            other => Err(ParseError::UnexpectedFormat {
                expected: "xml",
                found: other.describe(),
            }
            .into()),
        }
    }
}

/// Decodes `body` and turns an error payload into a `ProtocolError`.
pub fn normalize(http_status: u16, body: &[u8], kind: ContentKind) -> Result<Payload> {
    if body.iter().all(|b| b.is_ascii_whitespace()) {
        return Ok(Payload::Empty);
    }
    let payload = match kind {
        ContentKind::Json => Payload::Json(serde_json::from_slice(body).map_err(ParseError::from)?),
        ContentKind::Xml => Payload::Xml(Element::parse(&String::from_utf8_lossy(body))?),
    };
    match protocol_error(http_status, &payload) {
        Some(err) => {
            warn!(status = http_status, code = %err.code, "remote API reported an error");
            Err(Error::Protocol(err))
        }
        None => Ok(payload),
    }
}

/// Recognises the error shapes of the remote API:
/// `{error, error_description}`, `{errorCode, message, status}` and
/// `<error><status/><error-code/><message/></error>`.
pub(crate) fn protocol_error(http_status: u16, payload: &Payload) -> Option<ProtocolError> {
    match payload {
        Payload::Json(Value::Object(map)) => json_error(http_status, map),
        Payload::Xml(root) if root.name() == "error" => Some(ProtocolError::new(
            http_status,
            root.child_text("status").and_then(|s| s.trim().parse().ok()),
            root.child_text("error-code").unwrap_or_default(),
            root.child_text("message").unwrap_or_default(),
        )),
        _ => None,
    }
}

fn json_error(http_status: u16, map: &Map<String, Value>) -> Option<ProtocolError> {
    if let Some(code) = map.get("error") {
        let message = map
            .get("error_description")
            .or_else(|| map.get("message"))
            .map(scalar_text)
            .unwrap_or_default();
        return Some(ProtocolError::new(
            http_status,
            status_field(map),
            scalar_text(code),
            message,
        ));
    }
    if let Some(code) = map.get("errorCode") {
        let message = map.get("message").map(scalar_text).unwrap_or_default();
        return Some(ProtocolError::new(
            http_status,
            status_field(map),
            scalar_text(code),
            message,
        ));
    }
    None
}

fn status_field(map: &Map<String, Value>) -> Option<u16> {
    match map.get("status")? {
        Value::Number(n) => n.as_u64().and_then(|n| u16::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
