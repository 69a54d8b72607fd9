//! Users of the backend, and the directory that resolves them to the email their tasks are filed under

use std::collections::HashMap;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Identifier of a user. The backend sends it either as a string or as an integer.
///
/// A missing or `null` ID is read as an empty one: such a user is listed, but cannot be resolved to tasks.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub struct UserId(String);

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for UserId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Used to support serde
impl<'de> Deserialize<'de> for UserId {
    fn deserialize<D>(deserializer: D) -> Result<UserId, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Number(i64),
            Missing(()),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(s) => UserId(s),
            RawId::Number(n) => UserId(n.to_string()),
            RawId::Missing(()) => UserId::default(),
        })
    }
}


/// A user, as returned by `GET /api/users`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "ID", default)]
    id: UserId,
    #[serde(rename = "XML_ID", default, deserialize_with = "lenient_text")]
    xml_id: Option<String>,
    #[serde(rename = "NAME", default, deserialize_with = "lenient_text")]
    name: Option<String>,
    #[serde(rename = "LAST_NAME", default, deserialize_with = "lenient_text")]
    last_name: Option<String>,
    #[serde(rename = "EMAIL", default, deserialize_with = "lenient_text")]
    email: Option<String>,
}

/// Text fields of the user list may hold numbers, `false` or anything else. Numbers are kept as text, the rest is dropped.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

impl User {
    pub fn new<S: Into<UserId>>(id: S, name: Option<String>, last_name: Option<String>, email: Option<String>) -> Self {
        Self { id: id.into(), xml_id: None, name, last_name, email }
    }

    pub fn id(&self) -> &UserId               { &self.id }
    pub fn xml_id(&self) -> Option<&str>      { self.xml_id.as_deref() }
    pub fn name(&self) -> Option<&str>        { self.name.as_deref() }
    pub fn last_name(&self) -> Option<&str>   { self.last_name.as_deref() }
    pub fn email(&self) -> Option<&str>       { self.email.as_deref() }

    /// The label shown when picking a user: "Name Last-name", or the email, or `ID:<id>`
    pub fn display_name(&self) -> String {
        let full_name = [self.name(), self.last_name()]
            .iter()
            .filter_map(|part| *part)
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if !full_name.is_empty() {
            return full_name;
        }

        match self.email().map(str::trim) {
            Some(email) if !email.is_empty() => email.to_string(),
            _ => format!("ID:{}", self.id),
        }
    }
}


/// Maps a user to the (lowercased) email its tasks are keyed by
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UserDirectory {
    emails: HashMap<UserId, String>,
}

impl UserDirectory {
    pub fn email_of(&self, id: &UserId) -> Option<&str> {
        self.emails.get(id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.emails.len()
    }

    pub fn is_empty(&self) -> bool {
        self.emails.is_empty()
    }
}

/// Index users by their ID.
///
/// Users that lack an ID or an email cannot be resolved to tasks. They are skipped, since partial directories are expected.
pub fn build_user_index(users: &[User]) -> UserDirectory {
    let mut emails = HashMap::new();
    for user in users {
        let email = match user.email().map(str::trim) {
            Some(email) if !email.is_empty() && !user.id().is_empty() => email,
            _ => {
                log::debug!("User {:?} has no usable ID or email, it will not be listed in the directory", user.display_name());
                continue;
            },
        };
        emails.insert(user.id().clone(), email.to_lowercase());
    }
    UserDirectory { emails }
}
