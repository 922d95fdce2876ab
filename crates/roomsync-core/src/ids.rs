//! Stable identifiers for rooms and users.
//!
//! Identifiers are opaque strings assigned by the homeserver. The only
//! structural rule enforced here is that an identifier is never empty: an
//! empty id would make a [`crate::RoomSummary`] impossible to key.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::IdError;

macro_rules! identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Create an identifier, rejecting the empty string.
            pub fn new(value: impl Into<String>) -> Result<Self, IdError> {
                let value = value.into();
                if value.is_empty() {
                    return Err(IdError::Empty);
                }
                Ok(Self(value))
            }

            /// Identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = IdError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

identifier!(
    /// Room identifier (e.g. `!abc:example.org`).
    RoomId
);

identifier!(
    /// User identifier (e.g. `@alice:example.org`).
    UserId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_identifiers_are_rejected() {
        assert_eq!(RoomId::new(""), Err(IdError::Empty));
        assert_eq!(UserId::new(String::new()), Err(IdError::Empty));
    }

    #[test]
    fn parse_and_display_agree() {
        let id: RoomId = "!room:example.org".parse().unwrap();
        assert_eq!(id.to_string(), "!room:example.org");
        assert_eq!(id.as_str(), "!room:example.org");
    }

    #[test]
    fn deserialize_validates() {
        let ok: Result<UserId, _> = serde_json::from_str("\"@alice:example.org\"");
        assert_eq!(ok.unwrap().as_str(), "@alice:example.org");

        let empty: Result<UserId, _> = serde_json::from_str("\"\"");
        assert!(empty.is_err());
    }
}
