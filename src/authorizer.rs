use http::header::{HeaderValue, AUTHORIZATION};

use crate::signer::{OAuthParameters, Signer};
use crate::{Request, Result, SecretsProvider, TransportError};

/// Query parameter carrying the OAuth 2.0 access token.
pub const OAUTH2_ACCESS_TOKEN_KEY: &str = "oauth2_access_token";

/// Attaches credentials to an outgoing API request.
///
/// Implemented by the OAuth 2.0 context, which adds the
/// `oauth2_access_token` query parameter, and by the OAuth 1.0a contexts,
/// which add a signed `Authorization` header. A request never gets both.
// this trait is sealed
pub trait Authorizer: private::Sealed {
    fn authorize(&self, request: Request) -> Result<Request>;
}

pub(crate) fn token_param(request: Request, access_token: &str) -> Request {
    request.query(&[(OAUTH2_ACCESS_TOKEN_KEY, access_token)])
}

pub(crate) fn sign<T: SecretsProvider>(
    secrets: &T,
    parameters: OAuthParameters<'_>,
    mut request: Request,
) -> Result<Request> {
    let header = Signer::new(secrets, parameters).generate_signature(request.method(), request.url());
    let value = HeaderValue::from_str(&header)
        .map_err(|_| TransportError::InvalidHeader("authorization"))?;
    request.insert_header(AUTHORIZATION, value);
    Ok(request)
}

pub(crate) mod private {
    pub trait Sealed {}
    impl Sealed for crate::Authentication {}
    impl Sealed for crate::DeveloperAuthentication {}
    impl Sealed for crate::LegacyAuthentication {}
}
