use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Generate a fresh identifier.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Whether this is the nil UUID, which stands in for "no id" at the edges.
            #[must_use]
            pub const fn is_nil(&self) -> bool {
                self.0.is_nil()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }

        impl Serialize for $name {
            fn serialize<S>(&self, s: S) -> Result<S::Ok, S::Error>
            where
                S: Serializer,
            {
                s.serialize_str(&self.to_string())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(d: D) -> Result<Self, D::Error>
            where
                D: Deserializer<'de>,
            {
                let s = String::deserialize(d)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

uuid_id!(
    /// Identifier of a person known to the parish directory.
    PersonId
);
uuid_id!(
    /// Identifier of a scheduled event.
    EventId
);
uuid_id!(
    /// Identifier of a ministry.
    MinistryId
);
uuid_id!(
    /// Identifier of a single assignment record (UUID v7).
    AssignmentId
);

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used)]

    use super::*;

    #[test]
    fn assignment_id_uses_uuid_v7() {
        let id = AssignmentId::new();
        assert_eq!(id.0.get_version_num(), 7);
    }

    #[test]
    fn person_id_roundtrip() {
        let uuid = Uuid::now_v7();
        let parsed: PersonId = uuid.to_string().parse().expect("must parse person id");
        assert_eq!(parsed.0, uuid);
    }

    #[test]
    fn rejects_malformed_ids() {
        assert!("".parse::<EventId>().is_err());
        assert!("not-a-uuid".parse::<MinistryId>().is_err());
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = PersonId::new();
        let json = serde_json::to_string(&id).expect("serialize id");
        assert_eq!(json, format!("\"{id}\""));
        let back: PersonId = serde_json::from_str(&json).expect("deserialize id");
        assert_eq!(back, id);
    }

    #[test]
    fn default_id_is_nil() {
        assert!(PersonId::default().is_nil());
        assert!(!PersonId::new().is_nil());
    }
}
