//! Opaque ID newtypes for netlist entities.

use crate::arena::ArenaId;
use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
        pub struct $name(u32);

        impl $name {
            /// Creates an ID from a raw `u32` index.
            pub fn from_raw(index: u32) -> Self {
                Self(index)
            }

            /// Returns the raw `u32` index.
            pub fn as_raw(self) -> u32 {
                self.0
            }
        }

        impl ArenaId for $name {
            fn from_raw(index: u32) -> Self {
                Self(index)
            }

            fn as_raw(self) -> u32 {
                self.0
            }
        }
    };
}

define_id!(
    /// Identifies a [`Scope`](crate::Scope) in the design.
    ScopeId
);

define_id!(
    /// Identifies a [`Signal`](crate::Signal) in the design.
    SignalId
);

define_id!(
    /// Identifies a named [`Event`](crate::Event) in the design.
    EventId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_roundtrip() {
        let id = ScopeId::from_raw(7);
        assert_eq!(id.as_raw(), 7);
        assert_ne!(SignalId::from_raw(1), SignalId::from_raw(2));
    }

    #[test]
    fn serde_roundtrip() {
        let id = EventId::from_raw(12);
        let json = serde_json::to_string(&id).unwrap();
        let back: EventId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }
}
