use std::collections::HashMap;

use serde::Deserialize;

use crate::{ParseError, ParseResult};

const OAUTH_TOKEN_KEY: &str = "oauth_token";
const OAUTH_TOKEN_SECRET_KEY: &str = "oauth_token_secret";
const OAUTH_PROBLEM_KEY: &str = "oauth_problem";

/// Represents response of token acquisition.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TokenResponse {
    /// OAuth Token
    pub oauth_token: String,
    /// OAuth Token Secret
    pub oauth_token_secret: String,
    /// Other contents
    #[serde(flatten)]
    pub remain: HashMap<String, String>,
}

/// Outcome of an OAuth 1.0a token endpoint call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenReply {
    Granted(TokenResponse),
    /// The provider answered with `oauth_problem=...`.
    Problem(String),
}

pub(crate) fn read_token_reply(text: &str) -> ParseResult<TokenReply> {
    let mut destructured = destructure(text);
    if let Some(problem) = destructured.remove(OAUTH_PROBLEM_KEY) {
        return Ok(TokenReply::Problem(problem));
    }
    let oauth_token = destructured.remove(OAUTH_TOKEN_KEY);
    let oauth_token_secret = destructured.remove(OAUTH_TOKEN_SECRET_KEY);
    match (oauth_token, oauth_token_secret) {
        (Some(t), Some(s)) => Ok(TokenReply::Granted(TokenResponse {
            oauth_token: t,
            oauth_token_secret: s,
            remain: destructured,
        })),
        (None, _) => Err(ParseError::KeyNotFound(OAUTH_TOKEN_KEY, text.to_string())),
        (_, _) => Err(ParseError::KeyNotFound(
            OAUTH_TOKEN_SECRET_KEY,
            text.to_string(),
        )),
    }
}

fn destructure(text: &str) -> HashMap<String, String> {
    text.trim()
        .split('&')
        .map(|e| e.splitn(2, '='))
        .map(|mut iter| {
            (
                decode(iter.next().unwrap_or_default()),
                decode(iter.next().unwrap_or_default()),
            )
        })
        .collect()
}

fn decode(component: &str) -> String {
    // a raw '=' inside the value would otherwise start a new pair
    let escaped = component.replace('=', "%3D");
    url::form_urlencoded::parse(escaped.as_bytes())
        .next()
        .map(|(k, _)| k.into_owned())
        .unwrap_or_default()
}
