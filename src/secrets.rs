/// Source of the OAuth 1.0a credentials used to sign a request.
pub trait SecretsProvider {
    fn get_consumer_key_pair<'a>(&'a self) -> (&'a str, &'a str);

    fn get_token_pair_option<'a>(&'a self) -> Option<(&'a str, &'a str)>;

    fn get_token_option_pair<'a>(&'a self) -> (Option<&'a str>, Option<&'a str>) {
        self.get_token_pair_option()
            .map(|s| (Some(s.0), Some(s.1)))
            .unwrap_or_else(|| (None, None))
    }
}

/// Consumer credentials with an optional token pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Secrets {
    consumer_key: String,
    consumer_secret: String,
    token: Option<(String, String)>,
}

impl Secrets {
    pub fn new<TKey, TSecret>(consumer_key: TKey, consumer_secret: TSecret) -> Self
    where
        TKey: Into<String>,
        TSecret: Into<String>,
    {
        Secrets {
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
            token: None,
        }
    }

    pub fn token<TKey, TSecret>(self, token: TKey, token_secret: TSecret) -> Self
    where
        TKey: Into<String>,
        TSecret: Into<String>,
    {
        Secrets {
            token: Some((token.into(), token_secret.into())),
            ..self
        }
    }

    pub fn without_token(self) -> Self {
        Secrets {
            token: None,
            ..self
        }
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }
}

impl SecretsProvider for Secrets {
    fn get_consumer_key_pair<'a>(&'a self) -> (&'a str, &'a str) {
        (&self.consumer_key, &self.consumer_secret)
    }

    fn get_token_pair_option<'a>(&'a self) -> Option<(&'a str, &'a str)> {
        self.token.as_ref().map(|(t, s)| (t.as_str(), s.as_str()))
    }
}
