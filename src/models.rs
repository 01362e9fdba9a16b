use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::{fmt, str::FromStr};
use thiserror::Error;
use ts_rs::TS;
use utoipa::ToSchema;

// --- Roles ---

/// Role
///
/// Coarse permission tier attached to every user. Stored as TEXT (`'Admin'` / `'Member'`)
/// and serialized to JSON with the same spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub enum Role {
    Admin,
    #[default]
    Member,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Member => "Member",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Admin" => Ok(Role::Admin),
            "Member" => Ok(Role::Member),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = UnknownRole;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

// --- Rows (Mapped to Database) ---

/// User
///
/// A row of the `users` table. `organisation_id` is the employee relation: a user works for
/// at most one organisation, and is cleared when that organisation is deleted.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Default)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
    #[sqlx(try_from = "String")]
    pub role: Role,
    pub organisation_id: Option<i32>,
}

/// Post
///
/// A row of the `posts` table. Every post has exactly one author.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Default)]
pub struct Post {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub author_id: i32,
}

/// A post joined with its author's display name.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Default)]
pub struct PostWithAuthor {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub author_id: i32,
    pub author_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Default)]
pub struct Organisation {
    pub id: i32,
    pub name: String,
    pub logo_id: Option<i32>,
}

/// OrganisationSummary
///
/// Listing row: an organisation plus the number of users employed by it (a `COUNT` join).
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Default)]
pub struct OrganisationSummary {
    pub id: i32,
    pub name: String,
    pub logo_id: Option<i32>,
    pub employees_count: i64,
}

// --- Write Models (Repository Inputs) ---

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub role: Role,
}

/// Partial user update. `None` leaves the column as it is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub author_id: i32,
}

/// Partial post update. `None` leaves the column as it is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostChanges {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl PostChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrganisation {
    pub name: String,
    pub logo_id: Option<i32>,
}

/// Partial organisation update. `None` leaves the column as it is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrganisationChanges {
    pub name: Option<String>,
    pub logo_id: Option<i32>,
}
