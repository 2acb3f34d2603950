/*!
social-api-client: a blocking client for a social-network REST API.

# Overview

This library wraps the remote API's OAuth 2.0 authorization-code flow, its
OAuth 1.0a developer and three-legged flows, and one method per resource
(profiles, connections, groups, companies, jobs, shares, invitations). HTTP is
done with [reqwest](https://crates.io/crates/reqwest)'s blocking client and
OAuth 1.0a signatures with [oauth1-request](https://crates.io/crates/oauth1-request).

# How to use

## Basic usecase 1 - OAuth 2.0 redirect flow

```rust,ignore
use social_api_client::{Application, Authentication, Member, Permission, RequestOptions, Selector};

let mut auth = Authentication::new(
    "[CLIENT_KEY]",
    "[CLIENT_SECRET]",
    "http://localhost:8000/",
    vec![Permission::BasicProfile, Permission::Network],
);

// step 1. send the user to the provider
println!("please access to: {}", auth.authorization_url());

// step 2. the redirect listener hands over the `code` query parameter
auth.set_authorization_code("[CODE]");

// step 3. exchange it for an access token
let token = auth.exchange_token(None)?;
println!("token: {}, expires in: {:?}", token.access_token, token.expires_in);

let app = Application::new(auth);
let selector = Selector::list(vec!["id", "first-name", "last-name"]);
let profile = app.get_profile(&Member::Current, Some(&selector), &RequestOptions::new())?;
```

## Basic usecase 2 - developer credentials

```rust,ignore
use social_api_client::{Application, DeveloperAuthentication, RequestOptions};

let auth = DeveloperAuthentication::new(
    "[CONSUMER_KEY]",
    "[CONSUMER_SECRET]",
    "[USER_TOKEN]",
    "[USER_SECRET]",
);
let app = Application::new(auth);
let status = app.get_network_status(&RequestOptions::new())?;
```

## Basic usecase 3 - three-legged OAuth 1.0a

```rust,ignore
use social_api_client::LegacyAuthentication;

let mut auth = LegacyAuthentication::new("[CONSUMER_KEY]", "[CONSUMER_SECRET]", "oob");
if !auth.request_token() {
    panic!("request token refused: {:?}", auth.last_error());
}
println!("please access to: {}", auth.authorize_url()?);
auth.set_verifier("[PIN]");
auth.exchange_access_token(None, None, None)?;
```
*/
mod application;
mod authorizer;
mod endpoint;
mod error;
mod model;
mod oauth1;
mod oauth2;
mod permission;
mod profile;
mod request;
mod response;
mod secrets;
mod selector;
mod signer;
mod token_reader;
mod transport;
mod xml;

// exposed to external program
pub use application::{Application, Member, RequestOptions};
pub use authorizer::{Authorizer, OAUTH2_ACCESS_TOKEN_KEY};
pub use endpoint::{Endpoints, NetworkUpdate, Resource, DEFAULT_TIMEOUT};
pub use error::{
    Error, ParseError, ParseResult, PreconditionError, ProtocolError, ProtocolErrorKind, Result,
    TransportError,
};
pub use model::{
    AccessToken, GroupPost, GroupPostContent, Invitation, Recipient, Share, ShareContent,
    Visibility,
};
pub use oauth1::{DeveloperAuthentication, LegacyAuthentication, LegacyState};
pub use oauth2::{parse_redirect, Authentication, AuthenticationState};
pub use permission::Permission;
pub use profile::{Education, Position, Profile};
pub use request::{Body, Request};
pub use response::{normalize, ContentKind, Payload, RawResponse};
pub use secrets::{Secrets, SecretsProvider};
pub use selector::Selector;
pub use signer::{OAuthParameters, Signer};
pub use token_reader::{TokenReply, TokenResponse};
pub use transport::{Transport, FORMAT_HEADER, FORMAT_JSON};
pub use xml::{Element, Node};

// exposed constant variables
/// Represents `realm`.
pub const REALM_KEY: &str = "realm";
