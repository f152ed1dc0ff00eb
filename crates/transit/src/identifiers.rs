//! Type-safe identifiers for transit entities.
//!
//! Backed by `Arc<str>` so clones are cheap; vehicle identifiers in
//! particular are cloned on every poll cycle.

use std::fmt;
use std::sync::Arc;

macro_rules! identifier {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "serde", serde(transparent))]
        pub struct $name(Arc<str>);

        impl $name {
            pub fn new(s: impl AsRef<str>) -> Self {
                Self(s.as_ref().into())
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
            fn from(s: &str) -> Self {
                Self::new(s)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self::new(s)
            }
        }
    };
}

identifier! {
    /// A bus line, as named by the upstream data provider.
    LineIdentifier
}

identifier! {
    /// A single vehicle within a line's realtime feed. Only meaningful for
    /// the lifetime of the feed session; never persisted.
    VehicleIdentifier
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn equality_and_hashing() {
        let a = VehicleIdentifier::new("bus-741");
        let b = VehicleIdentifier::from("bus-741");
        assert_eq!(a, b);

        let mut map = HashMap::new();
        map.insert(a.clone(), 1);
        assert_eq!(map.get(&b), Some(&1));
    }

    #[test]
    fn display_round_trip() {
        let id = LineIdentifier::from(String::from("12A"));
        assert_eq!(id.to_string(), "12A");
        assert_eq!(id.as_str(), "12A");
    }
}
