use crate::id::PersonId;
use serde::{Deserialize, Serialize};

/// Platform role of a person.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Coordinates one or more ministries.
    Coordinator,
    /// Serves in ministry volunteer groups.
    Volunteer,
    /// Platform administrator.
    Admin,
    /// Regular parish member.
    Parishioner,
    /// Co-parent attached to a family record.
    Coparent,
}

impl Role {
    /// String representation used in configuration files.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Coordinator => "coordinator",
            Self::Volunteer => "volunteer",
            Self::Admin => "admin",
            Self::Parishioner => "parishioner",
            Self::Coparent => "coparent",
        }
    }

    /// Roles that make up the platform-wide volunteer pool.
    #[must_use]
    pub const fn serves_events(self) -> bool {
        matches!(self, Self::Coordinator | Self::Volunteer | Self::Admin)
    }
}

/// A person as seen by the roster. Ministry affiliation lives in the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    /// Directory identifier.
    pub id: PersonId,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Platform role.
    pub role: Role,
}

impl Person {
    /// Build a person record.
    pub fn new(
        id: PersonId,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        role: Role,
    ) -> Self {
        Self {
            id,
            first_name: first_name.into(),
            last_name: last_name.into(),
            role,
        }
    }

    /// "First Last", trimmed when either half is blank.
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_owned()
    }
}

/// The person asking for candidates or mutating a roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Requester {
    /// Directory identifier of the requester.
    pub id: PersonId,
    /// Role the requester acts under.
    pub role: Role,
}

impl From<&Person> for Requester {
    fn from(person: &Person) -> Self {
        Self {
            id: person.id,
            role: person.role,
        }
    }
}
