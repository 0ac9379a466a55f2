//! Stable identifiers for scene items and datasets

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ITEM_ID: AtomicU64 = AtomicU64::new(1);
static NEXT_DATA_SET_ID: AtomicU64 = AtomicU64::new(1);

macro_rules! stable_id {
    ($(#[$meta:meta])* $name:ident, $counter:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// Allocate a new unique id
            pub fn new() -> Self {
                Self($counter.fetch_add(1, Ordering::Relaxed))
            }

            /// Create an id from a raw value (for deserialization/testing)
            pub fn from_raw(id: u64) -> Self {
                Self(id)
            }

            /// Get the raw u64 value
            pub fn raw(&self) -> u64 {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

stable_id!(
    /// Identifier of an item in the object model.
    ///
    /// The same id names the item's renderable actor inside every view it is
    /// attached to, so views never need a back-reference to the item.
    ItemId,
    NEXT_ITEM_ID
);

stable_id!(
    /// Identifier of a point cloud or mesh dataset
    DataSetId,
    NEXT_DATA_SET_ID
);
