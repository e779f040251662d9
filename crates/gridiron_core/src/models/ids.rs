use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_id!(
    /// Team identifier as issued by the ingestion collaborator.
    TeamId
);
string_id!(
    /// Game identifier; also the idempotency key for season merges.
    GameId
);
string_id!(PlayId);

/// Game period. 1-4 are regulation quarters, 5 and above are overtime periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quarter(pub u8);

impl Quarter {
    pub const FIRST: Quarter = Quarter(1);
    pub const FOURTH: Quarter = Quarter(4);

    pub fn is_overtime(self) -> bool {
        self.0 > 4
    }

    pub fn next(self) -> Quarter {
        Quarter(self.0.saturating_add(1))
    }
}

impl Default for Quarter {
    fn default() -> Self {
        Quarter::FIRST
    }
}

impl fmt::Display for Quarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_overtime() {
            write!(f, "OT{}", self.0 - 4)
        } else {
            write!(f, "Q{}", self.0)
        }
    }
}
