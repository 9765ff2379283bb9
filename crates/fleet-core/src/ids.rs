//! Strongly typed identifier wrappers.
//!
//! The Simulator names everything with strings (`"trk12"`, `"Prk1"`,
//! `"-13963"`), so the wrappers hold a `String`.  Keeping four distinct types
//! stops a resource id from being passed where an edge id is expected, which
//! is easy to do when both come out of the same mission record.

use std::borrow::Borrow;
use std::fmt;

/// Generate a typed ID wrapper around a `String`.
macro_rules! named_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident;) => {
        $(#[$attr])*
        #[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "serde", serde(transparent))]
        $vis struct $name(pub String);

        impl $name {
            /// Wrap anything string-like.
            #[inline]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            #[inline]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// `true` for the empty string, which the Simulator never issues.
            #[inline]
            pub fn is_empty(&self) -> bool {
                self.0.trim().is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            #[inline]
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }

        impl From<String> for $name {
            #[inline]
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl Borrow<str> for $name {
            #[inline]
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            #[inline]
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

named_id! {
    /// A vehicle known to the Simulator: fleet trucks and background traffic alike.
    pub struct VehicleId;
}

named_id! {
    /// A capacity-bounded stop location (parking area or loading bay).
    pub struct ResourceId;
}

named_id! {
    /// A directed road-network edge.
    pub struct EdgeId;
}

named_id! {
    /// A lane on an edge (`"<edge>_<index>"` in SUMO naming).
    pub struct LaneId;
}

impl LaneId {
    /// The first lane of `edge`.
    pub fn first_of(edge: &EdgeId) -> Self {
        Self(format!("{}_0", edge.0))
    }

    /// The edge this lane belongs to, derived from the `<edge>_<index>` form.
    ///
    /// Returns `None` if the id has no `_<index>` suffix.
    pub fn edge(&self) -> Option<EdgeId> {
        let (edge, index) = self.0.rsplit_once('_')?;
        index.parse::<u32>().ok()?;
        Some(EdgeId::new(edge))
    }
}
