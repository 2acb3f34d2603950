use std::time::Duration;

use http::header::{HeaderMap, HeaderName, HeaderValue};
use http::Method;
use serde::Serialize;
use serde_json::{json, Value};
use url::form_urlencoded;

use crate::{
    Authentication, Authorizer, Endpoints, GroupPost, Invitation, NetworkUpdate, RawResponse,
    Request, Resource, Result, Selector, Share, Transport,
};

/// The member a people resource is addressed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Member {
    /// The authenticated member, `~`.
    Current,
    Id(String),
    /// A public profile URL.
    Url(String),
}

impl Member {
    pub fn id<T: Into<String>>(id: T) -> Self {
        Member::Id(id.into())
    }

    pub fn url<T: Into<String>>(url: T) -> Self {
        Member::Url(url.into())
    }

    /// Path segment naming the member: `~`, `id=<id>` or `url=<quoted url>`.
    pub fn path_segment(&self) -> String {
        match self {
            Member::Current => "~".to_string(),
            Member::Id(id) => format!("id={}", id),
            Member::Url(url) => format!("url={}", quote_plus(url)),
        }
    }
}

impl Default for Member {
    fn default() -> Self {
        Member::Current
    }
}

/// Extra query parameters, headers and timeout for a single call.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    params: Vec<(String, String)>,
    headers: HeaderMap,
    timeout: Option<Duration>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn param<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn timeout(self, timeout: Duration) -> Self {
        RequestOptions {
            timeout: Some(timeout),
            ..self
        }
    }
}

/// One method per remote resource, authorized by a single credential.
///
/// Reads return the decoded JSON document. Mutations return `true` once the
/// transport reports a 2xx answer.
#[derive(Debug, Clone)]
pub struct Application<A: Authorizer> {
    authentication: A,
    endpoints: Endpoints,
    transport: Transport,
}

impl Application<Authentication> {
    /// Uses an access token obtained elsewhere; its expiry is unknown.
    pub fn with_token<T: Into<String>>(access_token: T) -> Self {
        Application::new(Authentication::with_token(access_token))
    }
}

impl<A: Authorizer> Application<A> {
    pub fn new(authentication: A) -> Self {
        Application {
            authentication,
            endpoints: Endpoints::default(),
            transport: Transport::default(),
        }
    }

    pub fn endpoints(self, endpoints: Endpoints) -> Self {
        Application { endpoints, ..self }
    }

    pub fn transport(self, transport: Transport) -> Self {
        Application { transport, ..self }
    }

    pub fn authentication(&self) -> &A {
        &self.authentication
    }

    pub fn authentication_mut(&mut self) -> &mut A {
        &mut self.authentication
    }

    fn resource_url(&self, resource: Resource, suffix: &str) -> String {
        format!("{}{}", self.endpoints.resource(resource), suffix)
    }

    fn member_url(&self, member: &Member, suffix: &str) -> String {
        self.resource_url(
            Resource::People,
            &format!("/{}{}", member.path_segment(), suffix),
        )
    }

    fn make_request<B>(
        &self,
        method: Method,
        url: &str,
        body: Option<&B>,
        options: &RequestOptions,
    ) -> Result<RawResponse>
    where
        B: Serialize + ?Sized,
    {
        let mut request = Request::new(method, url)?
            .query(&options.params)
            .headers_merged(&options.headers);
        if let Some(body) = body {
            request = request.json(body)?;
        }
        if let Some(timeout) = options.timeout {
            request = request.timeout(timeout);
        }
        self.transport.send(request, &self.authentication)
    }

    fn read(&self, url: &str, options: &RequestOptions) -> Result<Value> {
        self.make_request::<Value>(Method::GET, url, None, options)?
            .json()
    }

    fn mutate<B>(&self, method: Method, url: &str, body: Option<&B>) -> Result<bool>
    where
        B: Serialize + ?Sized,
    {
        self.make_request(method, url, body, &RequestOptions::default())?;
        Ok(true)
    }

    pub fn get_profile(
        &self,
        member: &Member,
        selector: Option<&Selector>,
        options: &RequestOptions,
    ) -> Result<Value> {
        let url = with_selector(self.member_url(member, ""), selector);
        self.read(&url, options)
    }

    pub fn search_profile(
        &self,
        selector: Option<&Selector>,
        options: &RequestOptions,
    ) -> Result<Value> {
        let url = with_selector(self.resource_url(Resource::PeopleSearch, ""), selector);
        self.read(&url, options)
    }

    pub fn get_picture_urls(&self, member: &Member, options: &RequestOptions) -> Result<Value> {
        let url = self.member_url(member, "/picture-urls::(original)");
        self.read(&url, options)
    }

    pub fn get_connections(
        &self,
        member: &Member,
        selector: Option<&Selector>,
        options: &RequestOptions,
    ) -> Result<Value> {
        let url = with_selector(self.member_url(member, "/connections"), selector);
        self.read(&url, options)
    }

    pub fn get_memberships(
        &self,
        member: &Member,
        group_id: Option<&str>,
        selector: Option<&Selector>,
        options: &RequestOptions,
    ) -> Result<Value> {
        let mut url = self.member_url(member, "/group-memberships");
        if let Some(group_id) = group_id {
            url = format!("{}/{}", url, group_id);
        }
        self.read(&with_selector(url, selector), options)
    }

    pub fn get_group(
        &self,
        group_id: &str,
        selector: Option<&Selector>,
        options: &RequestOptions,
    ) -> Result<Value> {
        let url = with_selector(
            self.resource_url(Resource::Groups, &format!("/{}", group_id)),
            selector,
        );
        self.read(&url, options)
    }

    pub fn get_posts(
        &self,
        group_id: &str,
        post_ids: &[&str],
        selector: Option<&Selector>,
        options: &RequestOptions,
    ) -> Result<Value> {
        let mut url = self.resource_url(Resource::Groups, &format!("/{}/posts", group_id));
        if !post_ids.is_empty() {
            url = format!("{}::({})", url, post_ids.join(","));
        }
        self.read(&with_selector(url, selector), options)
    }

    pub fn join_group(&self, group_id: &str) -> Result<bool> {
        let url = self.member_url(&Member::Current, &format!("/group-memberships/{}", group_id));
        let body = json!({"membershipState": {"code": "member"}});
        self.mutate(Method::PUT, &url, Some(&body))
    }

    pub fn leave_group(&self, group_id: &str) -> Result<bool> {
        let url = self.member_url(&Member::Current, &format!("/group-memberships/{}", group_id));
        self.mutate::<Value>(Method::DELETE, &url, None)
    }

    pub fn submit_group_post(&self, group_id: &str, post: &GroupPost) -> Result<bool> {
        let url = self.resource_url(Resource::Groups, &format!("/{}/posts", group_id));
        self.mutate(Method::POST, &url, Some(post))
    }

    pub fn like_post(&self, post_id: &str, is_liked: bool) -> Result<bool> {
        let url = self.resource_url(
            Resource::Posts,
            &format!("/{}/relation-to-viewer/is-liked", post_id),
        );
        self.mutate(Method::PUT, &url, Some(&is_liked))
    }

    pub fn comment_post(&self, post_id: &str, comment: &str) -> Result<bool> {
        let url = self.resource_url(Resource::Posts, &format!("/{}/comments", post_id));
        self.mutate(Method::POST, &url, Some(&json!({ "text": comment })))
    }

    pub fn get_company_by_email_domain(
        &self,
        email_domain: &str,
        options: &RequestOptions,
    ) -> Result<Value> {
        let url = format!(
            "{}?email-domain={}",
            self.resource_url(Resource::Companies, ""),
            quote_plus(email_domain)
        );
        self.read(&url, options)
    }

    /// Looks companies up by numeric id and by universal name in one call.
    pub fn get_companies(
        &self,
        company_ids: &[&str],
        universal_names: &[&str],
        selector: Option<&Selector>,
        options: &RequestOptions,
    ) -> Result<Value> {
        let identifiers: Vec<String> = company_ids
            .iter()
            .map(|id| id.to_string())
            .chain(
                universal_names
                    .iter()
                    .map(|name| format!("universal-name={}", name)),
            )
            .collect();
        let mut url = self.resource_url(Resource::Companies, "");
        if !identifiers.is_empty() {
            url = format!("{}::({})", url, identifiers.join(","));
        }
        self.read(&with_selector(url, selector), options)
    }

    pub fn get_company_updates(&self, company_id: &str, options: &RequestOptions) -> Result<Value> {
        let url = self.resource_url(Resource::Companies, &format!("/{}/updates", company_id));
        self.read(&url, options)
    }

    pub fn get_company_products(
        &self,
        company_id: &str,
        selector: Option<&Selector>,
        options: &RequestOptions,
    ) -> Result<Value> {
        let url = with_selector(
            self.resource_url(Resource::Companies, &format!("/{}/products", company_id)),
            selector,
        );
        self.read(&url, options)
    }

    pub fn follow_company(&self, company_id: &str) -> Result<bool> {
        let url = self.member_url(&Member::Current, "/following/companies");
        self.mutate(Method::POST, &url, Some(&json!({ "id": id_value(company_id) })))
    }

    pub fn unfollow_company(&self, company_id: &str) -> Result<bool> {
        let url = self.member_url(
            &Member::Current,
            &format!("/following/companies/id={}", company_id),
        );
        self.mutate::<Value>(Method::DELETE, &url, None)
    }

    pub fn search_company(
        &self,
        selector: Option<&Selector>,
        options: &RequestOptions,
    ) -> Result<Value> {
        let url = with_selector(self.resource_url(Resource::CompanySearch, ""), selector);
        self.read(&url, options)
    }

    pub fn get_job(
        &self,
        job_id: &str,
        selector: Option<&Selector>,
        options: &RequestOptions,
    ) -> Result<Value> {
        let url = with_selector(
            self.resource_url(Resource::Jobs, &format!("/{}", job_id)),
            selector,
        );
        self.read(&url, options)
    }

    pub fn get_job_bookmarks(
        &self,
        selector: Option<&Selector>,
        options: &RequestOptions,
    ) -> Result<Value> {
        let url = with_selector(self.member_url(&Member::Current, "/job-bookmarks"), selector);
        self.read(&url, options)
    }

    pub fn search_job(&self, selector: Option<&Selector>, options: &RequestOptions) -> Result<Value> {
        let url = with_selector(self.resource_url(Resource::JobSearch, ""), selector);
        self.read(&url, options)
    }

    /// Posts a share and returns the API's answer, which carries the update key.
    pub fn submit_share(&self, share: &Share) -> Result<Value> {
        let url = self.member_url(&Member::Current, "/shares");
        self.make_request(Method::POST, &url, Some(share), &RequestOptions::default())?
            .json()
    }

    /// Reads the network update stream, filtered by update type.
    ///
    /// Each type becomes its own `type` parameter; `self_scope` limits the
    /// stream to the member's own updates.
    pub fn get_network_updates(
        &self,
        types: &[NetworkUpdate],
        member: &Member,
        self_scope: bool,
        options: &RequestOptions,
    ) -> Result<Value> {
        let url = self.member_url(member, "/network/updates");
        let mut options = options.clone();
        for update in types {
            options = options.param("type", update.code());
        }
        if self_scope {
            options = options.param("scope", "self");
        }
        self.read(&url, &options)
    }

    pub fn get_network_status(&self, options: &RequestOptions) -> Result<Value> {
        let url = self.member_url(&Member::Current, "/network/network-stats");
        self.read(&url, options)
    }

    pub fn send_invitation(&self, invitation: &Invitation) -> Result<bool> {
        let url = self.member_url(&Member::Current, "/mailbox");
        self.mutate(Method::POST, &url, Some(&invitation.to_json()))
    }

    pub fn comment_on_update(&self, update_key: &str, comment: &str) -> Result<bool> {
        let url = self.member_url(
            &Member::Current,
            &format!("/network/updates/key={}/update-comments", update_key),
        );
        self.mutate(Method::POST, &url, Some(&json!({ "comment": comment })))
    }

    pub fn like_update(&self, update_key: &str, is_liked: bool) -> Result<bool> {
        let url = self.member_url(
            &Member::Current,
            &format!("/network/updates/key={}/is-liked", update_key),
        );
        self.mutate(Method::PUT, &url, Some(&is_liked))
    }
}

fn with_selector(url: String, selector: Option<&Selector>) -> String {
    match selector {
        Some(selector) => selector.apply_to(&url),
        None => url,
    }
}

fn quote_plus(text: &str) -> String {
    form_urlencoded::byte_serialize(text.as_bytes()).collect()
}

// numeric ids go out as JSON numbers
fn id_value(id: &str) -> Value {
    id.parse::<u64>()
        .map(Value::from)
        .unwrap_or_else(|_| Value::from(id))
}
