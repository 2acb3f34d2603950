use std::borrow::Cow;
use std::fmt;
use std::time::Duration;

/// Timeout applied to a request when the caller does not pick one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

pub const DEFAULT_API_BASE_URL: &str = "https://api.example.com";
pub const DEFAULT_AUTHORIZATION_URL: &str = "https://www.example.com/uas/oauth2/authorization";
pub const DEFAULT_ACCESS_TOKEN_URL: &str = "https://www.example.com/uas/oauth2/accessToken";
pub const DEFAULT_REQUEST_TOKEN_URL: &str = "https://api.example.com/uas/oauth/requestToken";
pub const DEFAULT_AUTHORIZE_URL: &str = "https://www.example.com/uas/oauth/authenticate";
pub const DEFAULT_OAUTH1_ACCESS_TOKEN_URL: &str = "https://api.example.com/uas/oauth/accessToken";

/// Resource collections exposed by the remote API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    People,
    PeopleSearch,
    Groups,
    Posts,
    Companies,
    CompanySearch,
    Jobs,
    JobSearch,
}

impl Resource {
    pub const ALL: [Resource; 8] = [
        Resource::People,
        Resource::PeopleSearch,
        Resource::Groups,
        Resource::Posts,
        Resource::Companies,
        Resource::CompanySearch,
        Resource::Jobs,
        Resource::JobSearch,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Resource::People => "/v1/people",
            Resource::PeopleSearch => "/v1/people-search",
            Resource::Groups => "/v1/groups",
            Resource::Posts => "/v1/posts",
            Resource::Companies => "/v1/companies",
            Resource::CompanySearch => "/v1/company-search",
            Resource::Jobs => "/v1/jobs",
            Resource::JobSearch => "/v1/job-search",
        }
    }
}

/// Kinds of network update accepted by the `type` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NetworkUpdate {
    Application,
    Company,
    Connection,
    Job,
    Group,
    Picture,
    ExtendedProfile,
    ChangedProfile,
    Shared,
    Viral,
}

impl NetworkUpdate {
    pub fn code(self) -> &'static str {
        match self {
            NetworkUpdate::Application => "APPS",
            NetworkUpdate::Company => "CMPY",
            NetworkUpdate::Connection => "CONN",
            NetworkUpdate::Job => "JOBS",
            NetworkUpdate::Group => "JGRP",
            NetworkUpdate::Picture => "PICT",
            NetworkUpdate::ExtendedProfile => "PRFX",
            NetworkUpdate::ChangedProfile => "PRFU",
            NetworkUpdate::Shared => "SHAR",
            NetworkUpdate::Viral => "VIRL",
        }
    }
}

impl fmt::Display for NetworkUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Locations of the remote API and of the OAuth endpoints.
#[derive(Debug, Clone)]
pub struct Endpoints {
    api_base_url: Cow<'static, str>,
    authorization_url: Cow<'static, str>,
    access_token_url: Cow<'static, str>,
    request_token_url: Cow<'static, str>,
    authorize_url: Cow<'static, str>,
    oauth1_access_token_url: Cow<'static, str>,
}

impl Default for Endpoints {
    fn default() -> Self {
        Endpoints {
            api_base_url: Cow::Borrowed(DEFAULT_API_BASE_URL),
            authorization_url: Cow::Borrowed(DEFAULT_AUTHORIZATION_URL),
            access_token_url: Cow::Borrowed(DEFAULT_ACCESS_TOKEN_URL),
            request_token_url: Cow::Borrowed(DEFAULT_REQUEST_TOKEN_URL),
            authorize_url: Cow::Borrowed(DEFAULT_AUTHORIZE_URL),
            oauth1_access_token_url: Cow::Borrowed(DEFAULT_OAUTH1_ACCESS_TOKEN_URL),
        }
    }
}

impl Endpoints {
    pub fn new() -> Self {
        Default::default()
    }

    /// Points every endpoint at `base`, keeping the default paths.
    ///
    /// Meant for staging deployments and local mock servers.
    pub fn rooted_at<T: AsRef<str>>(base: T) -> Self {
        let base = base.as_ref().trim_end_matches('/');
        Endpoints {
            api_base_url: Cow::Owned(base.to_string()),
            authorization_url: Cow::Owned(format!("{}/uas/oauth2/authorization", base)),
            access_token_url: Cow::Owned(format!("{}/uas/oauth2/accessToken", base)),
            request_token_url: Cow::Owned(format!("{}/uas/oauth/requestToken", base)),
            authorize_url: Cow::Owned(format!("{}/uas/oauth/authenticate", base)),
            oauth1_access_token_url: Cow::Owned(format!("{}/uas/oauth/accessToken", base)),
        }
    }

    /// set the base URL of the resource API
    pub fn api_base_url<T>(self, url: T) -> Self
    where
        T: Into<Cow<'static, str>>,
    {
        Endpoints {
            api_base_url: url.into(),
            ..self
        }
    }

    /// set the OAuth 2.0 authorization endpoint
    pub fn authorization_url<T>(self, url: T) -> Self
    where
        T: Into<Cow<'static, str>>,
    {
        Endpoints {
            authorization_url: url.into(),
            ..self
        }
    }

    /// set the OAuth 2.0 token endpoint
    pub fn access_token_url<T>(self, url: T) -> Self
    where
        T: Into<Cow<'static, str>>,
    {
        Endpoints {
            access_token_url: url.into(),
            ..self
        }
    }

    /// set the OAuth 1.0a request token endpoint
    pub fn request_token_url<T>(self, url: T) -> Self
    where
        T: Into<Cow<'static, str>>,
    {
        Endpoints {
            request_token_url: url.into(),
            ..self
        }
    }

    /// set the OAuth 1.0a user authorization endpoint
    pub fn authorize_url<T>(self, url: T) -> Self
    where
        T: Into<Cow<'static, str>>,
    {
        Endpoints {
            authorize_url: url.into(),
            ..self
        }
    }

    /// set the OAuth 1.0a access token endpoint
    pub fn oauth1_access_token_url<T>(self, url: T) -> Self
    where
        T: Into<Cow<'static, str>>,
    {
        Endpoints {
            oauth1_access_token_url: url.into(),
            ..self
        }
    }

    pub fn resource(&self, resource: Resource) -> String {
        format!("{}{}", self.api_base_url.trim_end_matches('/'), resource.path())
    }

    pub fn get_api_base_url(&self) -> &str {
        &self.api_base_url
    }

    pub fn get_authorization_url(&self) -> &str {
        &self.authorization_url
    }

    pub fn get_access_token_url(&self) -> &str {
        &self.access_token_url
    }

    pub fn get_request_token_url(&self) -> &str {
        &self.request_token_url
    }

    pub fn get_authorize_url(&self) -> &str {
        &self.authorize_url
    }

    pub fn get_oauth1_access_token_url(&self) -> &str {
        &self.oauth1_access_token_url
    }
}
