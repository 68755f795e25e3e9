//! Opaque identifiers handed out by a document host
//!
//! Ids are only stable within one document session. Nothing in the engine
//! compares ids across theme catalogs; cross-catalog matching always goes
//! through names.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.pad(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

opaque_id!(
    /// Handle to a node in the document tree
    NodeId
);
opaque_id!(
    /// Handle to a variable (local or imported from a library)
    VariableId
);
opaque_id!(
    /// Handle to a variable collection
    CollectionId
);
opaque_id!(
    /// Mode id within a variable collection
    ModeId
);
opaque_id!(
    /// Handle to a component definition
    ComponentId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_serialize_as_plain_strings() {
        let id = VariableId::new("VariableID:1:2");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"VariableID:1:2\"");

        let back: VariableId = serde_json::from_str("\"VariableID:1:2\"").unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn ids_display_their_raw_value() {
        assert_eq!(NodeId::from("12:34").to_string(), "12:34");
    }
}
