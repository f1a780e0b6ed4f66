//! NewType wrappers for the identifiers that flow through the gateway.
//!
//! Keeping these distinct stops a username from being passed where a user
//! identity is expected, or a book ID where an operation name is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Macro to generate a NewType wrapper with standard trait implementations.
macro_rules! newtype_string {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new instance.
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Get the inner value as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume and return the inner String.
            pub fn into_inner(self) -> String {
                self.0
            }

            /// Whether the wrapped string is empty.
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

newtype_string!(
    /// Server-generated identity of a registered user (a UUID v4 string).
    ///
    /// This is the `sub` claim of every issued token and the key of the
    /// session table. It is distinct from the user-chosen `Username`.
    UserId
);

newtype_string!(
    /// Login name chosen at signup. Unique across the credential store.
    Username
);

newtype_string!(
    /// Identifier of a book in the resource store, assigned on create.
    BookId
);

newtype_string!(
    /// Fully-qualified operation name, e.g. "/BookStore/CreateBook".
    ///
    /// The gateway's policy table is keyed by this value.
    OperationName
);

impl UserId {
    /// Allocate a fresh random identity.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl BookId {
    /// Allocate a fresh random book ID.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

/// An unset ID; the store assigns the real one on create.
impl Default for BookId {
    fn default() -> Self {
        Self(String::new())
    }
}
