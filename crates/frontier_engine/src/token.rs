use std::fmt;

use chrono::{DateTime, Utc};

/// Bearer credential sent as `X-Auth-Token` on every request.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken {
    value: String,
    obtained_at: DateTime<Utc>,
}

impl AuthToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            obtained_at: Utc::now(),
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn obtained_at(&self) -> DateTime<Utc> {
        self.obtained_at
    }
}

// Keep the credential out of logs.
impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthToken")
            .field("value", &"<redacted>")
            .field("obtained_at", &self.obtained_at.to_rfc3339())
            .finish()
    }
}
