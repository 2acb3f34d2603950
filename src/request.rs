use std::time::Duration;

use http::header::{HeaderMap, HeaderName, HeaderValue};
use http::Method;
use serde::Serialize;
use url::Url;

use crate::{Result, TransportError};

/// Body of an outgoing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    Json(String),
    Form(String),
}

/// A request under construction.
///
/// Query parameters are written into the URL as soon as they are added so
/// that the URL seen by the OAuth signer is the one that is sent.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    url: Url,
    headers: HeaderMap,
    body: Option<Body>,
    timeout: Option<Duration>,
}

impl Request {
    pub fn new(method: Method, url: &str) -> Result<Self> {
        let url = Url::parse(url).map_err(|source| TransportError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;
        Ok(Request {
            method,
            url,
            headers: HeaderMap::new(),
            body: None,
            timeout: None,
        })
    }

    pub fn get(url: &str) -> Result<Self> {
        Request::new(Method::GET, url)
    }

    pub fn post(url: &str) -> Result<Self> {
        Request::new(Method::POST, url)
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> Option<&Body> {
        self.body.as_ref()
    }

    pub fn get_timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Modify the query string of the URL.
    ///
    /// This method appends and does not overwrite. Calling
    /// `.query(&[("foo", "a"), ("foo", "b")])` gives `"foo=a&foo=b"`.
    pub fn query<T: Serialize + ?Sized>(mut self, query: &T) -> Self {
        {
            let mut pairs = self.url.query_pairs_mut();
            let serializer = serde_urlencoded::Serializer::new(&mut pairs);
            let _ = query.serialize(serializer);
        }
        // cleanup
        if let Some("") = self.url.query() {
            self.url.set_query(None);
        }
        self
    }

    /// Add a `Header` to this Request, replacing any previous value.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Merge a set of headers; values in `headers` replace existing ones.
    pub fn headers_merged(mut self, headers: &HeaderMap) -> Self {
        for (name, value) in headers {
            self.headers.insert(name.clone(), value.clone());
        }
        self
    }

    pub(crate) fn insert_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.insert(name, value);
    }

    /// Send a JSON document as the body.
    pub fn json<T: Serialize + ?Sized>(mut self, json: &T) -> Result<Self> {
        let text = serde_json::to_string(json).map_err(crate::ParseError::from)?;
        self.body = Some(Body::Json(text));
        Ok(self)
    }

    /// Send a form body.
    pub fn form<T: Serialize + ?Sized>(mut self, form: &T) -> Self {
        if let Ok(body) = serde_urlencoded::to_string(form) {
            self.body = Some(Body::Form(body));
        }
        self
    }

    /// Enables a request timeout.
    ///
    /// The timeout is applied from the when the request starts connecting
    /// until the response body has finished.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_get_query() {
        let req = Request::get("https://photos.example.net/photos")
            .unwrap()
            .query(&[("file", "vacation.jpg"), ("size", "original")]);
        assert_eq!(req.url().query(), Some("file=vacation.jpg&size=original"));
    }

    #[test]
    fn query_appends() {
        let req = Request::get("https://api.example.com/v1/companies?email-domain=example.com")
            .unwrap()
            .query(&[("type", "SHAR"), ("type", "CONN")]);
        assert_eq!(
            req.url().query(),
            Some("email-domain=example.com&type=SHAR&type=CONN")
        );
    }

    #[test]
    fn empty_query_is_dropped() {
        let empty: [(&str, &str); 0] = [];
        let req = Request::get("https://api.example.com/v1/people/~")
            .unwrap()
            .query(&empty);
        assert_eq!(req.url().query(), None);
        assert_eq!(req.url().as_str(), "https://api.example.com/v1/people/~");
    }

    #[test]
    fn selector_path_survives_parsing() {
        let req = Request::get("https://api.example.com/v1/people/~:(id,first-name)").unwrap();
        assert_eq!(req.url().path(), "/v1/people/~:(id,first-name)");
    }

    #[test]
    fn capture_form_body() {
        let req = Request::post("https://api.example.com/v1/posts/1/comments")
            .unwrap()
            .form(&[
                ("include_entities", "true"),
                (
                    "status",
                    "Hello Ladies + Gentlemen, a signed OAuth request!",
                ),
            ]);
        assert_eq!(
            req.body(),
            Some(&Body::Form(
                "include_entities=true&status=Hello+Ladies+%2B+Gentlemen%2C+a+signed+OAuth+request%21"
                    .to_string()
            ))
        );
    }

    #[test]
    fn json_body() {
        let req = Request::post("https://api.example.com/v1/posts/1/comments")
            .unwrap()
            .json(&serde_json::json!({"text": "hi"}))
            .unwrap();
        assert_eq!(req.body(), Some(&Body::Json(r#"{"text":"hi"}"#.to_string())));
    }

    #[test]
    fn invalid_url() {
        assert!(matches!(
            Request::get("not a url"),
            Err(crate::Error::Transport(TransportError::InvalidUrl { .. }))
        ));
    }
}
