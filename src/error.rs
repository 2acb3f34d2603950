use std::fmt;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;
pub type ParseResult<T> = std::result::Result<T, ParseError>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("precondition failed : {0}")]
    Precondition(#[from] PreconditionError),
    #[error("transport failed : {0}")]
    Transport(#[from] TransportError),
    #[error("remote API reported an error : {0}")]
    Protocol(#[from] ProtocolError),
    #[error("response could not be parsed : {0}")]
    Parse(#[from] ParseError),
}

/// The caller invoked an operation before the state it needs was established.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PreconditionError {
    #[error("no authorization code has been received yet")]
    MissingAuthorizationCode,
    #[error("no access token is available, the token exchange has not completed")]
    MissingAccessToken,
    #[error("request token is absent")]
    MissingRequestToken,
    #[error("request token secret is absent")]
    MissingRequestTokenSecret,
    #[error("oauth verifier is absent")]
    MissingVerifier,
    #[error("either a member id or an email must be given for a recipient")]
    IncompleteRecipient,
}

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("request timed out : {0}")]
    Timeout(#[source] reqwest::Error),
    #[error("connection failed : {0}")]
    Connection(#[source] reqwest::Error),
    #[error("unexpected status {status} : {body}")]
    Status { status: u16, body: String },
    #[error("invalid url {url} : {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("invalid header value for {0}")]
    InvalidHeader(&'static str),
}

impl TransportError {
    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout(err)
        } else {
            TransportError::Connection(err)
        }
    }

    /// Whether the failure came from the caller-supplied timeout elapsing.
    pub fn is_timeout(&self) -> bool {
        matches!(self, TransportError::Timeout(_))
    }
}

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("malformed json : {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed xml : {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("malformed xml : {0}")]
    XmlStructure(String),
    #[error("response has malformed format: not found {0} in {1}")]
    KeyNotFound(&'static str, String),
    #[error("expected a {expected} payload but received {found}")]
    UnexpectedFormat {
        expected: &'static str,
        found: &'static str,
    },
}

/// Classification of an application-level failure reported by the remote API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolErrorKind {
    BadRequest,
    Unauthorized,
    PaymentRequired,
    Forbidden,
    NotFound,
    Conflict,
    InternalService,
    Generic,
}

impl ProtocolErrorKind {
    pub fn from_status(status: u16) -> Self {
        match status {
            400 => ProtocolErrorKind::BadRequest,
            401 => ProtocolErrorKind::Unauthorized,
            402 => ProtocolErrorKind::PaymentRequired,
            403 => ProtocolErrorKind::Forbidden,
            404 => ProtocolErrorKind::NotFound,
            409 => ProtocolErrorKind::Conflict,
            500 => ProtocolErrorKind::InternalService,
            _ => ProtocolErrorKind::Generic,
        }
    }
}

impl fmt::Display for ProtocolErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProtocolErrorKind::BadRequest => "bad request",
            ProtocolErrorKind::Unauthorized => "unauthorized",
            ProtocolErrorKind::PaymentRequired => "payment required",
            ProtocolErrorKind::Forbidden => "forbidden",
            ProtocolErrorKind::NotFound => "not found",
            ProtocolErrorKind::Conflict => "conflict",
            ProtocolErrorKind::InternalService => "internal service error",
            ProtocolErrorKind::Generic => "error",
        };
        f.write_str(name)
    }
}

/// A response that made it through transport but that the remote API marks
/// as a logical failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} ({code}) : {message}")]
pub struct ProtocolError {
    pub kind: ProtocolErrorKind,
    /// HTTP status of the response carrying the error payload.
    pub http_status: u16,
    /// `status` field of the payload, when present.
    pub status: Option<u16>,
    /// Provider error code (`error` or `errorCode` / `error-code`).
    pub code: String,
    /// Provider message (`error_description` or `message`).
    pub message: String,
}

impl ProtocolError {
    pub(crate) fn new(
        http_status: u16,
        status: Option<u16>,
        code: String,
        message: String,
    ) -> Self {
        let kind = match status {
            Some(status) => ProtocolErrorKind::from_status(status),
            None if !(200..300).contains(&http_status) => {
                ProtocolErrorKind::from_status(http_status)
            }
            None => ProtocolErrorKind::Generic,
        };
        ProtocolError {
            kind,
            http_status,
            status,
            code,
            message,
        }
    }
}
