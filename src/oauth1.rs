use http::Method;
use tracing::{debug, warn};

use crate::authorizer::{sign, Authorizer};
use crate::signer::OAuthParameters;
use crate::token_reader::{read_token_reply, TokenReply};
use crate::transport::check_status;
use crate::{
    Endpoints, Error, Permission, PreconditionError, RawResponse, Request, Result, Secrets,
    SecretsProvider, Transport,
};

/// Four long-lived OAuth 1.0a credentials issued to a developer.
///
/// There is no redirect step: the context is always ready to sign.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeveloperAuthentication {
    secrets: Secrets,
    redirect_uri: Option<String>,
    permissions: Vec<Permission>,
}

impl DeveloperAuthentication {
    pub fn new<CK, CS, UT, US>(
        consumer_key: CK,
        consumer_secret: CS,
        user_token: UT,
        user_secret: US,
    ) -> Self
    where
        CK: Into<String>,
        CS: Into<String>,
        UT: Into<String>,
        US: Into<String>,
    {
        DeveloperAuthentication {
            secrets: Secrets::new(consumer_key, consumer_secret).token(user_token, user_secret),
            redirect_uri: None,
            permissions: Vec::new(),
        }
    }

    pub fn redirect_uri<T: Into<String>>(self, redirect_uri: T) -> Self {
        DeveloperAuthentication {
            redirect_uri: Some(redirect_uri.into()),
            ..self
        }
    }

    pub fn permissions(self, permissions: Vec<Permission>) -> Self {
        DeveloperAuthentication {
            permissions,
            ..self
        }
    }

    pub fn get_redirect_uri(&self) -> Option<&str> {
        self.redirect_uri.as_deref()
    }

    pub fn get_permissions(&self) -> &[Permission] {
        &self.permissions
    }
}

impl SecretsProvider for DeveloperAuthentication {
    fn get_consumer_key_pair<'a>(&'a self) -> (&'a str, &'a str) {
        self.secrets.get_consumer_key_pair()
    }

    fn get_token_pair_option<'a>(&'a self) -> Option<(&'a str, &'a str)> {
        self.secrets.get_token_pair_option()
    }
}

impl Authorizer for DeveloperAuthentication {
    fn authorize(&self, request: Request) -> Result<Request> {
        sign(self, OAuthParameters::new(), request)
    }
}

/// Progress of the three-legged OAuth 1.0a flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegacyState {
    Cleared,
    RequestTokenObtained,
    Verified,
    AccessTokenObtained,
}

/// Three-legged OAuth 1.0a flow.
///
/// `request_token` reports failure as `false` and records the reason in
/// [`last_error`](LegacyAuthentication::last_error) instead of returning an
/// error; `exchange_access_token` only does so for an `oauth_problem` answer.
#[derive(Debug, Clone)]
pub struct LegacyAuthentication {
    consumer: Secrets,
    callback: String,
    request_token: Option<(String, String)>,
    verifier: Option<String>,
    access_token: Option<(String, String)>,
    last_error: Option<String>,
    endpoints: Endpoints,
    transport: Transport,
}

impl LegacyAuthentication {
    pub fn new<K, S, C>(consumer_key: K, consumer_secret: S, callback: C) -> Self
    where
        K: Into<String>,
        S: Into<String>,
        C: Into<String>,
    {
        LegacyAuthentication {
            consumer: Secrets::new(consumer_key, consumer_secret),
            callback: callback.into(),
            request_token: None,
            verifier: None,
            access_token: None,
            last_error: None,
            endpoints: Endpoints::default(),
            transport: Transport::default(),
        }
    }

    pub fn endpoints(self, endpoints: Endpoints) -> Self {
        LegacyAuthentication { endpoints, ..self }
    }

    pub fn transport(self, transport: Transport) -> Self {
        LegacyAuthentication { transport, ..self }
    }

    pub fn state(&self) -> LegacyState {
        match (&self.access_token, &self.request_token, &self.verifier) {
            (Some(_), _, _) => LegacyState::AccessTokenObtained,
            (None, Some(_), Some(_)) => LegacyState::Verified,
            (None, Some(_), None) => LegacyState::RequestTokenObtained,
            (None, None, _) => LegacyState::Cleared,
        }
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn request_token_pair(&self) -> Option<(&str, &str)> {
        self.request_token
            .as_ref()
            .map(|(t, s)| (t.as_str(), s.as_str()))
    }

    pub fn access_token_pair(&self) -> Option<(&str, &str)> {
        self.access_token
            .as_ref()
            .map(|(t, s)| (t.as_str(), s.as_str()))
    }

    /// Forgets every token and the verifier.
    pub fn clear(&mut self) {
        debug!("oauth1 flow cleared");
        self.request_token = None;
        self.verifier = None;
        self.access_token = None;
        self.last_error = None;
    }

    /// Stores the `oauth_verifier` delivered to the callback.
    pub fn set_verifier<T: Into<String>>(&mut self, verifier: T) {
        self.verifier = Some(verifier.into());
    }

    fn parameters(&self) -> OAuthParameters<'_> {
        OAuthParameters::new().realm(self.endpoints.get_api_base_url())
    }

    fn record(&mut self, error: String) -> bool {
        warn!(error = %error, "oauth1 token request failed");
        self.last_error = Some(error);
        false
    }

    /// Obtains a request token; returns `false` on any failure.
    pub fn request_token(&mut self) -> bool {
        let response = Request::get(self.endpoints.get_request_token_url())
            .and_then(|request| {
                let parameters = self.parameters().callback(self.callback.as_str());
                sign(&self.consumer, parameters, request)
            })
            .and_then(|request| {
                debug!(url = %request.url(), "requesting oauth1 request token");
                self.transport.execute(request)
            });
        let response = match response {
            Ok(response) => response,
            Err(err) => return self.record(err.to_string()),
        };

        match read_token_reply(&response.text()) {
            Ok(TokenReply::Problem(problem)) => self.record(problem),
            Ok(TokenReply::Granted(token)) if response.is_success() => {
                debug!("request token obtained");
                self.request_token = Some((token.oauth_token, token.oauth_token_secret));
                self.verifier = None;
                self.access_token = None;
                self.last_error = None;
                true
            }
            Ok(TokenReply::Granted(_)) => {
                self.record(format!("unexpected HTTP status {}", response.status()))
            }
            Err(err) => self.record(err.to_string()),
        }
    }

    /// URL the user must visit to authorize the request token.
    pub fn authorize_url(&self) -> Result<String> {
        let (token, _) = self
            .request_token_pair()
            .ok_or(PreconditionError::MissingRequestToken)?;
        let request =
            Request::get(self.endpoints.get_authorize_url())?.query(&[("oauth_token", token)]);
        Ok(request.url().to_string())
    }

    /// Exchanges the request token and verifier for an access token.
    ///
    /// Arguments left as `None` fall back to the values stored by
    /// [`request_token`](LegacyAuthentication::request_token) and
    /// [`set_verifier`](LegacyAuthentication::set_verifier).
    pub fn exchange_access_token(
        &mut self,
        request_token: Option<&str>,
        request_token_secret: Option<&str>,
        verifier: Option<&str>,
    ) -> Result<bool> {
        let stored = self.request_token.clone();
        let request_token = request_token
            .map(str::to_string)
            .or_else(|| stored.as_ref().map(|(t, _)| t.clone()))
            .ok_or(PreconditionError::MissingRequestToken)?;
        let request_token_secret = request_token_secret
            .map(str::to_string)
            .or_else(|| stored.as_ref().map(|(_, s)| s.clone()))
            .ok_or(PreconditionError::MissingRequestTokenSecret)?;
        let verifier = verifier
            .map(str::to_string)
            .or_else(|| self.verifier.clone())
            .ok_or(PreconditionError::MissingVerifier)?;

        let secrets = self
            .consumer
            .clone()
            .token(request_token.as_str(), request_token_secret.as_str());
        let parameters = self.parameters().verifier(verifier.as_str());
        let request = sign(
            &secrets,
            parameters,
            Request::new(Method::POST, self.endpoints.get_oauth1_access_token_url())?,
        )?;
        debug!(url = %request.url(), "exchanging oauth1 request token");
        let response = self.transport.execute(request)?;

        match read_token_reply(&response.text()) {
            Ok(TokenReply::Problem(problem)) => Ok(self.record(problem)),
            Ok(TokenReply::Granted(token)) => {
                check_status(response)?;
                debug!("oauth1 access token obtained");
                self.request_token = Some((request_token, request_token_secret));
                self.verifier = Some(verifier);
                self.access_token = Some((token.oauth_token, token.oauth_token_secret));
                self.last_error = None;
                Ok(true)
            }
            Err(err) => {
                let response: RawResponse = check_status(response)?;
                debug!(status = response.status(), "unreadable token reply");
                Err(Error::Parse(err))
            }
        }
    }
}

impl Authorizer for LegacyAuthentication {
    fn authorize(&self, request: Request) -> Result<Request> {
        let (token, secret) = self
            .access_token_pair()
            .ok_or(PreconditionError::MissingAccessToken)?;
        let secrets = self.consumer.clone().token(token, secret);
        sign(&secrets, self.parameters(), request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header::AUTHORIZATION;
    use httpmock::prelude::*;

    fn authorization(request: &Request) -> String {
        request
            .headers()
            .get(AUTHORIZATION)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string()
    }

    fn legacy(server: &MockServer) -> LegacyAuthentication {
        LegacyAuthentication::new("ck", "cs", "http://localhost/cb")
            .endpoints(Endpoints::rooted_at(server.base_url()))
    }

    #[test]
    fn developer_signs_with_user_token() {
        let auth = DeveloperAuthentication::new("ck", "cs", "ut", "us");
        let request = Request::get("https://api.example.com/v1/people/~")
            .unwrap()
            .query(&[("format", "json")]);
        let request = auth.authorize(request).unwrap();
        let header = authorization(&request);
        assert!(header.starts_with("OAuth "));
        assert!(!header.contains("realm="));
        assert!(header.contains("oauth_consumer_key=\"ck\""));
        assert!(header.contains("oauth_token=\"ut\""));
        assert!(header.contains("oauth_signature_method=\"HMAC-SHA1\""));
        assert_eq!(request.url().query(), Some("format=json"));
    }

    #[test]
    fn developer_builders() {
        let auth = DeveloperAuthentication::new("ck", "cs", "ut", "us")
            .redirect_uri("http://localhost/cb")
            .permissions(vec![Permission::BasicProfile]);
        assert_eq!(auth.get_redirect_uri(), Some("http://localhost/cb"));
        assert_eq!(auth.get_permissions(), &[Permission::BasicProfile]);
        assert_eq!(auth.get_token_pair_option(), Some(("ut", "us")));
    }

    #[test]
    fn request_token_success() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/uas/oauth/requestToken")
                .header_exists("authorization");
            then.status(200).body(
                "oauth_token=rt&oauth_token_secret=rts&oauth_callback_confirmed=true",
            );
        });
        let mut auth = legacy(&server);
        assert_eq!(auth.state(), LegacyState::Cleared);
        assert!(auth.request_token());
        mock.assert();
        assert_eq!(auth.request_token_pair(), Some(("rt", "rts")));
        assert_eq!(auth.state(), LegacyState::RequestTokenObtained);
        assert_eq!(auth.last_error(), None);

        let url = auth.authorize_url().unwrap();
        assert_eq!(
            url,
            format!("{}/uas/oauth/authenticate?oauth_token=rt", server.base_url())
        );
    }

    #[test]
    fn request_token_problem_is_recorded() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/uas/oauth/requestToken");
            then.status(401)
                .body("oauth_problem=signature_invalid&debug_sbs=GET%26x");
        });
        let mut auth = legacy(&server);
        assert!(!auth.request_token());
        assert_eq!(auth.last_error(), Some("signature_invalid"));
        assert_eq!(auth.state(), LegacyState::Cleared);
    }

    #[test]
    fn request_token_connection_failure_is_recorded() {
        let mut auth = LegacyAuthentication::new("ck", "cs", "oob")
            .endpoints(Endpoints::rooted_at("http://127.0.0.1:9"));
        assert!(!auth.request_token());
        assert!(auth.last_error().is_some());
    }

    #[test]
    fn authorize_url_needs_request_token() {
        let auth = LegacyAuthentication::new("ck", "cs", "oob");
        assert!(matches!(
            auth.authorize_url(),
            Err(Error::Precondition(PreconditionError::MissingRequestToken))
        ));
    }

    #[test]
    fn exchange_checks_each_precondition() {
        let mut auth = LegacyAuthentication::new("ck", "cs", "oob");
        let cases = [
            (
                (None, Some("s"), Some("v")),
                PreconditionError::MissingRequestToken,
            ),
            (
                (Some("t"), None, Some("v")),
                PreconditionError::MissingRequestTokenSecret,
            ),
            ((Some("t"), Some("s"), None), PreconditionError::MissingVerifier),
        ];
        for ((token, secret, verifier), expected) in cases.iter().cloned() {
            match auth.exchange_access_token(token, secret, verifier) {
                Err(Error::Precondition(err)) => assert_eq!(err, expected),
                other => panic!("unexpected {:?}", other),
            }
        }
    }

    #[test]
    fn exchange_success_stores_access_token() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/uas/oauth/accessToken")
                .header_exists("authorization");
            then.status(200)
                .body("oauth_token=at&oauth_token_secret=ats&oauth_expires_in=5183999");
        });
        let mut auth = legacy(&server);
        auth.set_verifier("12345");
        assert!(auth
            .exchange_access_token(Some("rt"), Some("rts"), None)
            .unwrap());
        mock.assert();
        assert_eq!(auth.access_token_pair(), Some(("at", "ats")));
        assert_eq!(auth.state(), LegacyState::AccessTokenObtained);

        let request = Request::get(&server.url("/v1/people/~")).unwrap();
        let header = authorization(&auth.authorize(request).unwrap());
        assert!(header.starts_with(&format!("OAuth realm=\"{}\",", server.base_url())));
        assert!(header.contains("oauth_token=\"at\""));

        auth.clear();
        assert_eq!(auth.state(), LegacyState::Cleared);
        assert_eq!(auth.access_token_pair(), None);
    }

    #[test]
    fn exchange_problem_returns_false() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/uas/oauth/accessToken");
            then.status(401).body("oauth_problem=token_rejected");
        });
        let mut auth = legacy(&server);
        let exchanged = auth
            .exchange_access_token(Some("rt"), Some("rts"), Some("v"))
            .unwrap();
        assert!(!exchanged);
        assert_eq!(auth.last_error(), Some("token_rejected"));
        assert_eq!(auth.access_token_pair(), None);
    }

    #[test]
    fn exchange_failure_status_is_an_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/uas/oauth/accessToken");
            then.status(500).body("internal");
        });
        let mut auth = legacy(&server);
        assert!(matches!(
            auth.exchange_access_token(Some("rt"), Some("rts"), Some("v")),
            Err(Error::Transport(crate::TransportError::Status { status: 500, .. }))
        ));
    }

    #[test]
    fn legacy_authorize_requires_access_token() {
        let auth = LegacyAuthentication::new("ck", "cs", "oob");
        let request = Request::get("https://api.example.com/v1/people/~").unwrap();
        assert!(matches!(
            auth.authorize(request),
            Err(Error::Precondition(PreconditionError::MissingAccessToken))
        ));
    }
}
