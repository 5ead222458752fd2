//! Credentials carried by login and registration requests.

use std::fmt;

use serde_json::{Map, Value};

/// A username/password pair as submitted by a client.
///
/// Both fields are optional: a field that is missing, `null` or not a
/// string is `None`, and `None` never matches a configured account.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            password: Some(password.into()),
        }
    }

    /// Pick `username` and `password` out of a JSON object, ignoring
    /// anything that is not a string.
    pub fn from_json_object(object: &Map<String, Value>) -> Self {
        let field = |name: &str| object.get(name).and_then(Value::as_str).map(str::to_owned);
        Self {
            username: field("username"),
            password: field("password"),
        }
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }
}

// Keep passwords out of logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
