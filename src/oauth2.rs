use std::time::Duration;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::authorizer::{token_param, Authorizer};
use crate::permission::scope_string;
use crate::transport::check_status;
use crate::{
    AccessToken, Endpoints, Error, ParseError, Permission, PreconditionError, Request, Result,
    Transport,
};

/// Progress of the OAuth 2.0 authorization-code flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthenticationState {
    New,
    AuthorizationUrlIssued,
    CodeReceived,
    TokenObtained,
}

#[derive(Deserialize)]
struct TokenEndpointResponse {
    access_token: Option<String>,
    expires_in: Option<u64>,
}

/// Session state of the OAuth 2.0 redirect flow.
///
/// One context per logical session; it is mutated in place as the flow
/// advances and must not be shared between concurrent callers.
#[derive(Debug, Clone)]
pub struct Authentication {
    key: String,
    secret: String,
    redirect_uri: String,
    permissions: Vec<Permission>,
    state: Option<String>,
    authorization_code: Option<String>,
    token: Option<AccessToken>,
    last_error: Option<String>,
    endpoints: Endpoints,
    transport: Transport,
}

impl Authentication {
    pub fn new<K, S, R>(key: K, secret: S, redirect_uri: R, permissions: Vec<Permission>) -> Self
    where
        K: Into<String>,
        S: Into<String>,
        R: Into<String>,
    {
        Authentication {
            key: key.into(),
            secret: secret.into(),
            redirect_uri: redirect_uri.into(),
            permissions,
            state: None,
            authorization_code: None,
            token: None,
            last_error: None,
            endpoints: Endpoints::default(),
            transport: Transport::default(),
        }
    }

    /// A context that already holds an access token obtained elsewhere.
    pub fn with_token<T: Into<String>>(access_token: T) -> Self {
        let mut auth = Authentication::new("", "", "", Vec::new());
        auth.token = Some(AccessToken::new(access_token, None));
        auth
    }

    pub fn endpoints(self, endpoints: Endpoints) -> Self {
        Authentication { endpoints, ..self }
    }

    pub fn transport(self, transport: Transport) -> Self {
        Authentication { transport, ..self }
    }

    pub fn state(&self) -> AuthenticationState {
        if self.token.is_some() {
            AuthenticationState::TokenObtained
        } else if self.authorization_code.is_some() {
            AuthenticationState::CodeReceived
        } else if self.state.is_some() {
            AuthenticationState::AuthorizationUrlIssued
        } else {
            AuthenticationState::New
        }
    }

    /// The CSRF nonce sent with the last authorization URL.
    pub fn csrf_state(&self) -> Option<&str> {
        self.state.as_deref()
    }

    pub fn authorization_code(&self) -> Option<&str> {
        self.authorization_code.as_deref()
    }

    pub fn token(&self) -> Option<&AccessToken> {
        self.token.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Stores the `code` delivered to the redirect URI.
    pub fn set_authorization_code<T: Into<String>>(&mut self, code: T) {
        debug!("authorization code received");
        self.authorization_code = Some(code.into());
    }

    /// Builds the provider authorization URL, drawing a new `state` nonce on
    /// every call.
    ///
    /// Components are percent-encoded one by one so that spaces in the scope
    /// become `%20` rather than `+`.
    pub fn authorization_url(&mut self) -> String {
        let state = self.make_new_state();
        self.state = Some(state.clone());
        let scope = scope_string(&self.permissions);
        let query = [
            ("response_type", "code"),
            ("client_id", self.key.as_str()),
            ("scope", scope.trim()),
            ("state", state.as_str()),
            ("redirect_uri", self.redirect_uri.as_str()),
        ]
        .iter()
        .map(|(k, v)| format!("{}={}", quote(k), quote(v)))
        .collect::<Vec<_>>()
        .join("&");
        format!("{}?{}", self.endpoints.get_authorization_url(), query)
    }

    fn make_new_state(&self) -> String {
        let nonce: u128 = rand::random();
        format!("{:x}", md5::compute(format!("{}{}", nonce, self.secret)))
    }

    /// Exchanges the stored authorization code for an access token.
    pub fn exchange_token(&mut self, timeout: Option<Duration>) -> Result<AccessToken> {
        let code = self
            .authorization_code
            .clone()
            .ok_or(PreconditionError::MissingAuthorizationCode)?;
        let form = [
            ("grant_type", "authorization_code"),
            ("code", code.as_str()),
            ("redirect_uri", self.redirect_uri.as_str()),
            ("client_id", self.key.as_str()),
            ("client_secret", self.secret.as_str()),
        ];
        let mut request = Request::post(self.endpoints.get_access_token_url())?.form(&form);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }
        debug!(url = %request.url(), "exchanging authorization code");

        let response = self
            .transport
            .execute(request)
            .and_then(check_status)
            .and_then(|response| response.json());
        let body = match response {
            Ok(body) => body,
            Err(err) => {
                self.last_error = Some(err.to_string());
                return Err(err);
            }
        };
        let parsed: TokenEndpointResponse =
            serde_json::from_value(body.clone()).map_err(ParseError::from)?;
        let access_token = parsed
            .access_token
            .ok_or_else(|| Error::from(ParseError::KeyNotFound("access_token", body.to_string())))?;

        let token = AccessToken::new(access_token, parsed.expires_in);
        self.token = Some(token.clone());
        self.last_error = None;
        debug!(expires_in = ?token.expires_in, "access token obtained");
        Ok(token)
    }
}

impl Authorizer for Authentication {
    fn authorize(&self, request: Request) -> Result<Request> {
        let token = self
            .token
            .as_ref()
            .ok_or(PreconditionError::MissingAccessToken)?;
        Ok(token_param(request, &token.access_token))
    }
}

// everything except unreserved characters and '/'
const QUOTE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'/');

fn quote(component: &str) -> String {
    utf8_percent_encode(component, QUOTE_SET).to_string()
}

/// Parses the query of a redirect URL and returns the `code` and `state`
/// parameters it carries.
pub fn parse_redirect(redirect: &str) -> Option<(String, Option<String>)> {
    let url = Url::parse(redirect).ok()?;
    let mut code = None;
    let mut state = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            _ => {}
        }
    }
    code.map(|code| (code, state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ProtocolErrorKind;
    use httpmock::prelude::*;
    use std::collections::HashMap;

    fn auth() -> Authentication {
        Authentication::new(
            "K",
            "S",
            "http://localhost/cb",
            vec![Permission::BasicProfile, Permission::Network],
        )
    }

    fn query_of(url: &str) -> HashMap<String, String> {
        url.splitn(2, '?')
            .nth(1)
            .unwrap()
            .split('&')
            .map(|pair| {
                let mut kv = pair.splitn(2, '=');
                (
                    kv.next().unwrap().to_string(),
                    kv.next().unwrap_or_default().to_string(),
                )
            })
            .collect()
    }

    #[test]
    fn authorization_url_components() {
        let mut auth = auth();
        let url = auth.authorization_url();
        assert!(url.starts_with(crate::endpoint::DEFAULT_AUTHORIZATION_URL));
        let query = query_of(&url);
        assert_eq!(query["response_type"], "code");
        assert_eq!(query["client_id"], "K");
        assert_eq!(query["scope"], "r_basicprofile%20r_network");
        assert_eq!(query["redirect_uri"], "http%3A//localhost/cb");
        assert_eq!(query["state"].len(), 32);
        assert_eq!(auth.csrf_state(), Some(query["state"].as_str()));
        assert!(!url.contains('+'));
    }

    #[test]
    fn state_changes_every_call() {
        let mut auth = auth();
        let first = query_of(&auth.authorization_url())["state"].clone();
        let second = query_of(&auth.authorization_url())["state"].clone();
        assert_ne!(first, second);
        assert_eq!(auth.csrf_state(), Some(second.as_str()));
    }

    #[test]
    fn state_machine_progress() {
        let mut auth = auth();
        assert_eq!(auth.state(), AuthenticationState::New);
        auth.authorization_url();
        assert_eq!(auth.state(), AuthenticationState::AuthorizationUrlIssued);
        auth.set_authorization_code("abc");
        assert_eq!(auth.state(), AuthenticationState::CodeReceived);
        assert_eq!(
            Authentication::with_token("t").state(),
            AuthenticationState::TokenObtained
        );
    }

    #[test]
    fn exchange_without_code_makes_no_call() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.any_request();
            then.status(200).body("{}");
        });
        let mut auth = auth().endpoints(Endpoints::rooted_at(server.base_url()));
        match auth.exchange_token(None) {
            Err(Error::Precondition(PreconditionError::MissingAuthorizationCode)) => {}
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(mock.hits(), 0);
        assert!(auth.token().is_none());
    }

    #[test]
    fn exchange_stores_token() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/uas/oauth2/accessToken")
                .header("content-type", "application/x-www-form-urlencoded")
                .body_contains("grant_type=authorization_code")
                .body_contains("code=the-code")
                .body_contains("redirect_uri=http%3A%2F%2Flocalhost%2Fcb")
                .body_contains("client_id=K")
                .body_contains("client_secret=S");
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"{"access_token":"AQX","expires_in":5184000}"#);
        });
        let mut auth = auth().endpoints(Endpoints::rooted_at(server.base_url()));
        auth.set_authorization_code("the-code");
        let token = auth.exchange_token(Some(Duration::from_secs(5))).unwrap();
        mock.assert();
        assert_eq!(token, AccessToken::new("AQX", Some(5_184_000)));
        assert_eq!(auth.token(), Some(&token));
        assert_eq!(auth.state(), AuthenticationState::TokenObtained);
    }

    #[test]
    fn error_body_on_success_status() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/uas/oauth2/accessToken");
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"{"error":"invalid_request","error_description":"bad code"}"#);
        });
        let mut auth = auth().endpoints(Endpoints::rooted_at(server.base_url()));
        auth.set_authorization_code("stale");
        match auth.exchange_token(None) {
            Err(Error::Protocol(err)) => {
                assert_eq!(err.code, "invalid_request");
                assert_eq!(err.message, "bad code");
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(auth.token().is_none());
        assert!(auth.last_error().unwrap().contains("bad code"));
    }

    #[test]
    fn error_body_on_failure_status() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/uas/oauth2/accessToken");
            then.status(400)
                .header("content-type", "application/json")
                .body(r#"{"error":"invalid_grant","error_description":"expired"}"#);
        });
        let mut auth = auth().endpoints(Endpoints::rooted_at(server.base_url()));
        auth.set_authorization_code("stale");
        match auth.exchange_token(None) {
            Err(Error::Protocol(err)) => {
                assert_eq!(err.kind, ProtocolErrorKind::BadRequest);
                assert_eq!(err.code, "invalid_grant");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn failure_without_body_is_transport_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/uas/oauth2/accessToken");
            then.status(503);
        });
        let mut auth = auth().endpoints(Endpoints::rooted_at(server.base_url()));
        auth.set_authorization_code("code");
        assert!(matches!(
            auth.exchange_token(None),
            Err(Error::Transport(crate::TransportError::Status { status: 503, .. }))
        ));
    }

    #[test]
    fn missing_access_token_field() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/uas/oauth2/accessToken");
            then.status(200).body(r#"{"expires_in":10}"#);
        });
        let mut auth = auth().endpoints(Endpoints::rooted_at(server.base_url()));
        auth.set_authorization_code("code");
        assert!(matches!(
            auth.exchange_token(None),
            Err(Error::Parse(ParseError::KeyNotFound("access_token", _)))
        ));
    }

    #[test]
    fn authorize_requires_token() {
        let request = Request::get("https://api.example.com/v1/people/~").unwrap();
        assert!(matches!(
            auth().authorize(request),
            Err(Error::Precondition(PreconditionError::MissingAccessToken))
        ));
    }

    #[test]
    fn authorize_adds_query_param_only() {
        let request = Request::get("https://api.example.com/v1/people/~").unwrap();
        let request = Authentication::with_token("tok").authorize(request).unwrap();
        assert_eq!(request.url().query(), Some("oauth2_access_token=tok"));
        assert!(request.headers().get(http::header::AUTHORIZATION).is_none());
    }

    #[test]
    fn redirect_parsing() {
        let parsed = parse_redirect("http://localhost/cb?code=abc&state=xyz");
        assert_eq!(parsed, Some(("abc".to_string(), Some("xyz".to_string()))));
        assert_eq!(parse_redirect("http://localhost/cb?error=denied"), None);
    }
}
