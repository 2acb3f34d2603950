use std::borrow::Cow;
use std::time::{SystemTime, UNIX_EPOCH};

use http::Method;
use oauth1_request::signer::Signer as OAuthSigner;
use oauth1_request::{HmacSha1, Options};
use rand::distributions::Alphanumeric;
use rand::Rng;
use url::Url;

use crate::SecretsProvider;

const OAUTH_IDENTIFIER: &str = "oauth_";
const AUTHORIZATION_SCHEME: &str = "OAuth ";
const NONCE_LENGTH: usize = 32;

/// Computes the OAuth 1.0a `Authorization` header for a single request.
///
/// The signature base string is made of the uppercase method, the URL without
/// its query and every query parameter plus the `oauth_*` parameters sorted by
/// key. It is signed with HMAC-SHA1 keyed by
/// `encode(consumer_secret)&encode(token_secret)`.
#[derive(Debug, Clone)]
pub struct Signer<'a, TSecretsProvider>
where
    TSecretsProvider: SecretsProvider,
{
    secrets: &'a TSecretsProvider,
    parameters: OAuthParameters<'a>,
}

impl<'a, TSecretsProvider> Signer<'a, TSecretsProvider>
where
    TSecretsProvider: SecretsProvider,
{
    pub fn new(secrets: &'a TSecretsProvider, parameters: OAuthParameters<'a>) -> Self {
        Signer {
            secrets,
            parameters,
        }
    }

    pub fn generate_signature(&self, method: &Method, url: &Url) -> String {
        let (consumer_key, consumer_secret) = self.secrets.get_consumer_key_pair();
        let (token, token_secret) = self.secrets.get_token_option_pair();

        // a fresh nonce and timestamp per request unless pinned by the caller
        let nonce = match self.parameters.nonce {
            Some(ref nonce) => nonce.clone(),
            None => Cow::Owned(generate_nonce()),
        };
        let timestamp = self.parameters.timestamp.unwrap_or_else(current_timestamp);
        let options = self.parameters.build_options(&nonce, timestamp, token);

        let mut pure_url = url.clone();
        pure_url.set_query(None);
        pure_url.set_fragment(None);

        // destructure query and sort by alphabetical order
        let parsed_query: Vec<(Cow<str>, Cow<str>)> = url.query_pairs().collect();
        let oauth_identifier = vec![(Cow::from(OAUTH_IDENTIFIER), Cow::from(""))];
        let mut sorted_query = [parsed_query, oauth_identifier].concat();
        sorted_query.sort();

        // divide key-value items by the element has "oauth_" key
        let mut divided = sorted_query.splitn(2, |(k, _)| k == &OAUTH_IDENTIFIER);
        let query_before_oauth = divided.next().unwrap_or_default();
        let query_after_oauth = divided.next().unwrap_or_default();

        let mut signer = OAuthSigner::with_signature_method(
            HmacSha1,
            method.as_str(),
            pure_url,
            consumer_secret,
            token_secret,
        );

        // Step 1. key [a ~ oauth_)
        for (key, value) in query_before_oauth {
            if !key.starts_with(OAUTH_IDENTIFIER) {
                signer.parameter(key, value);
            }
        }
        // Step 2. add oauth_* parameters
        let mut signer = signer.oauth_parameters(consumer_key, &options);
        // Step 3. key (oauth_ ~ z]
        for (key, value) in query_after_oauth {
            if !key.starts_with(OAUTH_IDENTIFIER) {
                signer.parameter(key, value);
            }
        }

        let sign = signer.finish().authorization;

        match self.parameters.realm {
            // OAuth realm="realm",oauth_...
            Some(ref realm) => {
                let params = sign.strip_prefix(AUTHORIZATION_SCHEME).unwrap_or(&sign);
                format!(
                    "{}{}=\"{}\",{}",
                    AUTHORIZATION_SCHEME,
                    crate::REALM_KEY,
                    realm,
                    params
                )
            }
            // OAuth oauth_...
            None => sign,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct OAuthParameters<'a> {
    callback: Option<Cow<'a, str>>,
    nonce: Option<Cow<'a, str>>,
    realm: Option<Cow<'a, str>>,
    timestamp: Option<u64>,
    verifier: Option<Cow<'a, str>>,
    version: bool,
}

impl<'a> OAuthParameters<'a> {
    pub fn new() -> Self {
        Default::default()
    }

    /// set the oauth_callback value
    pub fn callback<T>(self, callback: T) -> Self
    where
        T: Into<Cow<'a, str>>,
    {
        OAuthParameters {
            callback: Some(callback.into()),
            ..self
        }
    }

    /// set the oauth_nonce value
    ///
    /// A random nonce is generated for every signature when this is not set.
    pub fn nonce<T>(self, nonce: T) -> Self
    where
        T: Into<Cow<'a, str>>,
    {
        OAuthParameters {
            nonce: Some(nonce.into()),
            ..self
        }
    }

    /// set the realm value
    pub fn realm<T>(self, realm: T) -> Self
    where
        T: Into<Cow<'a, str>>,
    {
        OAuthParameters {
            realm: Some(realm.into()),
            ..self
        }
    }

    /// set the oauth_timestamp value
    ///
    /// The current epoch seconds are used when this is not set.
    pub fn timestamp<T>(self, timestamp: T) -> Self
    where
        T: Into<u64>,
    {
        OAuthParameters {
            timestamp: Some(timestamp.into()),
            ..self
        }
    }

    /// set the oauth_verifier value
    pub fn verifier<T>(self, verifier: T) -> Self
    where
        T: Into<Cow<'a, str>>,
    {
        OAuthParameters {
            verifier: Some(verifier.into()),
            ..self
        }
    }

    /// set the oauth_version value (boolean)
    ///
    /// # Note
    /// When the version has value `true`, oauth_version will be set with "1.0".
    /// Otherwise, oauth_version will not be included in your request.
    pub fn version<T>(self, version: T) -> Self
    where
        T: Into<bool>,
    {
        OAuthParameters {
            version: version.into(),
            ..self
        }
    }

    fn build_options<'b>(
        &'b self,
        nonce: &'b str,
        timestamp: u64,
        token: Option<&'b str>,
    ) -> Options<'b> {
        let mut opt = Options::new();

        // NOTE: items must be added by alphabetical order

        if let Some(ref callback) = self.callback {
            opt.callback(callback.as_ref());
        }
        opt.nonce(nonce);
        opt.timestamp(timestamp);
        if let Some(token) = token {
            opt.token(token);
        }
        if let Some(ref verifier) = self.verifier {
            opt.verifier(verifier.as_ref());
        }
        opt.version(self.version);

        opt
    }
}

pub(crate) fn generate_nonce() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(NONCE_LENGTH)
        .map(char::from)
        .collect()
}

fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Secrets;

    fn extract_param(auth_header: &str, name: &str) -> Option<String> {
        let content = auth_header.strip_prefix("OAuth ")?;
        content
            .split(',')
            .map(|item| item.splitn(2, '=').collect::<Vec<&str>>())
            .filter(|v| v.len() == 2)
            .find(|v| v[0].trim() == name)
            .map(|v| {
                percent_encoding::percent_decode_str(v[1])
                    .decode_utf8_lossy()
                    .trim_matches('"')
                    .to_string()
            })
    }

    #[test]
    fn sign_request_token_rfc5849() {
        // https://tools.ietf.org/html/rfc5849
        let url = Url::parse("https://photos.example.net/initiate").unwrap();
        let secrets = Secrets::new("dpf43f3p2l4k3l03", "kd94hf93k423kf44");
        let params = OAuthParameters::new()
            .nonce("wIjqoS")
            .timestamp(137_131_200u64)
            .callback("http://printer.example.com/ready")
            .realm("photos");

        let header = Signer::new(&secrets, params).generate_signature(&Method::POST, &url);
        assert_eq!(
            extract_param(&header, "oauth_signature").unwrap(),
            "74KNZJeDHnMBp0EMJ9ZHt/XKycU="
        );
    }

    #[test]
    fn sign_get_query_rfc5849() {
        // https://tools.ietf.org/html/rfc5849
        let url =
            Url::parse("http://photos.example.net/photos?file=vacation.jpg&size=original")
                .unwrap();
        let secrets = Secrets::new("dpf43f3p2l4k3l03", "kd94hf93k423kf44")
            .token("nnch734d00sl2jdk", "pfkkdhi9sl3r4s00");
        let params = OAuthParameters::new()
            .nonce("chapoH")
            .timestamp(137_131_202u64)
            .realm("Photos");

        let header = Signer::new(&secrets, params).generate_signature(&Method::GET, &url);
        assert_eq!(
            extract_param(&header, "oauth_signature").unwrap(),
            "MdpQcU8iPSUjWoN/UDMsK2sui9I="
        );
    }

    #[test]
    fn realm_leads_the_header() {
        let url = Url::parse("https://api.example.com/v1/people/~").unwrap();
        let secrets = Secrets::new("key", "secret").token("token", "token-secret");
        let params = OAuthParameters::new().realm("https://api.example.com");

        let header = Signer::new(&secrets, params).generate_signature(&Method::GET, &url);
        assert!(header.starts_with("OAuth realm=\"https://api.example.com\",oauth_"));
        assert_eq!(extract_param(&header, "oauth_token").unwrap(), "token");
        assert_eq!(extract_param(&header, "oauth_consumer_key").unwrap(), "key");
    }

    #[test]
    fn oauth_keys_are_sorted() {
        let url = Url::parse("https://api.example.com/v1/people/~?format=json").unwrap();
        let secrets = Secrets::new("key", "secret").token("token", "token-secret");

        let header =
            Signer::new(&secrets, OAuthParameters::new()).generate_signature(&Method::GET, &url);
        let keys: Vec<&str> = header
            .strip_prefix("OAuth ")
            .unwrap()
            .split(',')
            .filter_map(|item| item.split('=').next())
            .filter(|key| *key != "oauth_signature")
            .collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
    }

    #[test]
    fn nonce_and_timestamp_are_generated() {
        let url = Url::parse("https://api.example.com/v1/people/~").unwrap();
        let secrets = Secrets::new("key", "secret");
        let signer = Signer::new(&secrets, OAuthParameters::new());

        let first = signer.generate_signature(&Method::GET, &url);
        let second = signer.generate_signature(&Method::GET, &url);
        let first_nonce = extract_param(&first, "oauth_nonce").unwrap();
        assert_eq!(first_nonce.len(), NONCE_LENGTH);
        assert_ne!(first_nonce, extract_param(&second, "oauth_nonce").unwrap());
        let timestamp: u64 = extract_param(&first, "oauth_timestamp")
            .unwrap()
            .parse()
            .unwrap();
        assert!(timestamp > 1_500_000_000);
    }
}
