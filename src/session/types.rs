//! Session data model.
//!
//! DESIGN
//! ======
//! The backend has historically emitted both `admin` and `administrator`
//! for the same role, with arbitrary casing. `Role` normalizes at the
//! parse boundary so no comparison elsewhere ever touches the raw string,
//! and always serializes back out as the short lowercase form.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Canonical user role. Anything the parser does not recognize becomes
/// `Student`, the least-privileged role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Role {
    Admin,
    #[default]
    Student,
}

impl Role {
    /// Parse a raw role string, case-insensitively. Accepts both observed
    /// admin spellings (`admin`, `administrator`).
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "admin" | "administrator" => Self::Admin,
            _ => Self::Student,
        }
    }

    #[must_use]
    pub fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Student => "student",
        }
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

/// Identity snapshot cached from the backend. Never trusted for real
/// authorization; the backend re-checks the role on every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
}

/// The full session triple. Constructed whole at login and replaced or
/// cleared whole; the store never holds a token without its user.
///
/// The serialized shape (`accessToken`/`refreshToken`/`user`) is the
/// contract shared by the storage blob and the cookie mirror.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub user: SessionUser,
}

// =============================================================================
// TEST HELPERS
// =============================================================================


#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
