//! Identifier types
//!
//! Identifiers are opaque strings issued by the record store. They are kept
//! as distinct newtypes so a webhook id can never be passed where an
//! instance id is expected.

use serde::{Deserialize, Serialize};

use crate::TypesError;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Parse an identifier, rejecting the empty string
            pub fn parse(s: &str) -> Result<Self, TypesError> {
                if s.is_empty() {
                    return Err(TypesError::EmptyId($label));
                }
                Ok(Self(s.to_string()))
            }

            /// Borrow the identifier as a string slice
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(
    /// Tenant (client organization) identifier
    TenantId,
    "tenant id"
);

string_id!(
    /// Webhook identifier
    WebhookId,
    "webhook id"
);

string_id!(
    /// Identifier of one deployed, URL-addressable webhook instance
    InstanceId,
    "instance id"
);
