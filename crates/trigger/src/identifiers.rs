//! Newtype domain identifiers.
//!
//! Every domain concept that has an identity is represented as a distinct newtype
//! wrapping a primitive. This prevents accidentally interchanging, for example, an
//! [`IssueKey`] with a [`JobName`] even though both are strings under the hood.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new(), as_str(), Display.
// `new()` returns Option<Self> and rejects empty values unless the identifier
// is declared `free_text`, in which case any string is kept as given.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        string_id!(@base $(#[$attr])* $name);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.is_empty() { None } else { Some(Self(v)) }
            }
        }
    };
    (
        $(#[$attr:meta])*
        free_text $name:ident
    ) => {
        string_id!(@base $(#[$attr])* $name);

        impl $name {
            /// Creates a new identifier. Empty values are kept as given.
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }
        }
    };
    (
        @base
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Identifiers: String-backed
// ---------------------------------------------------------------------------

string_id! {
    /// Identifies a job hosted by the execution host (e.g. `"deploy-service"`).
    ///
    /// Job names are unique per registry and appear in the trigger URL
    /// `/job/{name}/jji/build`.
    JobName
}

string_id! {
    /// The key of the issue that caused a trigger (e.g. `"ABC-123"`).
    ///
    /// Opaque to this system; no project/number structure is assumed. A key
    /// the caller sent as `""` is still a key.
    free_text IssueKey
}

string_id! {
    /// The browsable URL of the issue that caused a trigger.
    free_text IssueUrl
}

string_id! {
    /// The issue-tracker user on whose behalf a trigger was sent (`by` field).
    free_text UserName
}

// ---------------------------------------------------------------------------
// Identifiers: UUID-backed (internally generated)
// ---------------------------------------------------------------------------

/// Identifies one queued execution handed to the execution host.
///
/// Generated fresh for every accepted trigger; propagated through spans so the
/// intake and the eventual run can be correlated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExecutionId(Uuid);

impl ExecutionId {
    /// Generates a new random execution identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an [`ExecutionId`] from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Returns the underlying [`Uuid`].
    pub fn as_uuid(self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for ExecutionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
