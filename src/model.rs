use serde::{Deserialize, Serialize};

use crate::PreconditionError;

/// Credential returned by the OAuth 2.0 token exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    /// Lifetime in seconds, unknown for tokens supplied by the caller.
    pub expires_in: Option<u64>,
}

impl AccessToken {
    pub fn new<T: Into<String>>(access_token: T, expires_in: Option<u64>) -> Self {
        AccessToken {
            access_token: access_token.into(),
            expires_in,
        }
    }
}

/// Addressee of an invitation, identified by member id or by email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
    member_id: Option<String>,
    email: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
}

#[derive(Serialize)]
struct RecipientBody<'a> {
    person: Person<'a>,
}

#[derive(Serialize)]
struct Person<'a> {
    #[serde(rename = "_path")]
    path: String,
    #[serde(rename = "first-name", skip_serializing_if = "Option::is_none")]
    first_name: Option<&'a str>,
    #[serde(rename = "last-name", skip_serializing_if = "Option::is_none")]
    last_name: Option<&'a str>,
}

impl Recipient {
    pub fn new<T: Into<String>>(
        member_id: Option<T>,
        email: Option<T>,
        first_name: Option<T>,
        last_name: Option<T>,
    ) -> Result<Self, PreconditionError> {
        let member_id = non_empty(member_id);
        let email = non_empty(email);
        if member_id.is_none() && email.is_none() {
            return Err(PreconditionError::IncompleteRecipient);
        }
        Ok(Recipient {
            member_id,
            email,
            first_name: non_empty(first_name),
            last_name: non_empty(last_name),
        })
    }

    pub fn member<T: Into<String>>(member_id: T) -> Self {
        Recipient {
            member_id: Some(member_id.into()),
            email: None,
            first_name: None,
            last_name: None,
        }
    }

    pub fn email<T: Into<String>>(email: T, first_name: T, last_name: T) -> Self {
        Recipient {
            member_id: None,
            email: Some(email.into()),
            first_name: Some(first_name.into()),
            last_name: Some(last_name.into()),
        }
    }

    pub fn member_id(&self) -> Option<&str> {
        self.member_id.as_deref()
    }

    fn path(&self) -> String {
        match (&self.member_id, &self.email) {
            (Some(id), _) => format!("/people/id={}", id),
            (None, Some(email)) => format!("/people/email={}", email),
            (None, None) => String::new(),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        let body = RecipientBody {
            person: Person {
                path: self.path(),
                first_name: self.first_name.as_deref(),
                last_name: self.last_name.as_deref(),
            },
        };
        serde_json::to_value(body).unwrap_or(serde_json::Value::Null)
    }
}

fn non_empty<T: Into<String>>(value: Option<T>) -> Option<String> {
    value.map(Into::into).filter(|v| !v.is_empty())
}

/// Connection invitation sent through the member mailbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invitation {
    pub subject: String,
    pub body: String,
    pub recipients: Vec<Recipient>,
    pub connect_type: String,
    pub auth_name: Option<String>,
    pub auth_value: Option<String>,
}

impl Invitation {
    pub fn new<T: Into<String>>(
        subject: T,
        body: T,
        recipients: Vec<Recipient>,
        connect_type: T,
    ) -> Self {
        Invitation {
            subject: subject.into(),
            body: body.into(),
            recipients,
            connect_type: connect_type.into(),
            auth_name: None,
            auth_value: None,
        }
    }

    /// Attaches the out-of-network authorization token.
    pub fn authorization<T: Into<String>>(self, name: T, value: T) -> Self {
        Invitation {
            auth_name: Some(name.into()),
            auth_value: Some(value.into()),
            ..self
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        let mut request = serde_json::json!({ "connect-type": self.connect_type });
        if let (Some(name), Some(value)) = (&self.auth_name, &self.auth_value) {
            if !name.is_empty() && !value.is_empty() {
                request["authorization"] = serde_json::json!({ "name": name, "value": value });
            }
        }
        serde_json::json!({
            "recipients": {
                "values": self.recipients.iter().map(Recipient::to_json).collect::<Vec<_>>(),
            },
            "subject": self.subject,
            "body": self.body,
            "item-content": {
                "invitation-request": request,
            },
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Visibility {
    pub code: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ShareContent {
    pub title: String,
    #[serde(rename = "submitted-url")]
    pub submitted_url: String,
    #[serde(rename = "submitted-image-url")]
    pub submitted_image_url: Option<String>,
    pub description: Option<String>,
}

/// Status update posted to the member's own feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Share {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<ShareContent>,
    pub visibility: Visibility,
}

impl Default for Share {
    fn default() -> Self {
        Share {
            comment: None,
            content: None,
            visibility: Visibility {
                code: "anyone".to_string(),
            },
        }
    }
}

impl Share {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn comment<T: Into<String>>(self, comment: T) -> Self {
        Share {
            comment: Some(comment.into()),
            ..self
        }
    }

    /// Attaches link content. The API ignores content without both a title
    /// and a submitted URL, so both are required here.
    pub fn content(self, content: ShareContent) -> Self {
        Share {
            content: Some(content),
            ..self
        }
    }

    pub fn visibility<T: Into<String>>(self, code: T) -> Self {
        Share {
            visibility: Visibility { code: code.into() },
            ..self
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GroupPostContent {
    #[serde(rename = "submitted-url")]
    pub submitted_url: String,
    #[serde(rename = "submitted-image-url")]
    pub submitted_image_url: String,
    pub title: String,
    pub description: String,
}

/// Discussion post submitted to a group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GroupPost {
    pub title: String,
    pub summary: String,
    pub content: GroupPostContent,
}
