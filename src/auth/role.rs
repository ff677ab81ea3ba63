//! Role and authentication state.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Access role carried by a credential row and by the session token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular member of the root audience.
    User,
    /// May use the interviewer subtenant.
    Interviewer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Interviewer => "interviewer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "interviewer" => Ok(Role::Interviewer),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

/// Already-resolved authentication for one request.
///
/// A token that fails to decode, verify or is expired produces
/// [`AuthState::anonymous`], never an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct AuthState {
    pub authenticated: bool,
    pub role: Option<Role>,
}

impl AuthState {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn signed_in(role: Option<Role>) -> Self {
        Self {
            authenticated: true,
            role,
        }
    }

    /// True only for an authenticated caller holding the interviewer role.
    pub fn is_interviewer(&self) -> bool {
        self.authenticated && self.role == Some(Role::Interviewer)
    }
}
