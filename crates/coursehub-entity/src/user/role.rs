//! User role enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Marketplace roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    /// Registered account with no purchases.
    User,
    /// Has bought at least one course.
    Student,
    /// Publishes courses and receives the tutor share.
    Tutor,
    /// Platform administrator.
    Admin,
}

impl UserRole {
    /// Only plain users are promoted on purchase; other roles are never changed.
    pub fn promotes_to_student(&self) -> bool {
        matches!(self, Self::User)
    }

    /// Return the role as an upper-case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Student => "STUDENT",
            Self::Tutor => "TUTOR",
            Self::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = coursehub_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "USER" => Ok(Self::User),
            "STUDENT" => Ok(Self::Student),
            "TUTOR" => Ok(Self::Tutor),
            "ADMIN" => Ok(Self::Admin),
            _ => Err(coursehub_core::AppError::validation(format!(
                "Invalid user role: '{s}'. Expected one of: USER, STUDENT, TUTOR, ADMIN"
            ))),
        }
    }
}
