//! Stable handles for level entities

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! index_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub(crate) usize);

        impl $name {
            pub fn index(self) -> usize {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }
    };
}

index_id!(
    /// Handle of a heat source (generator)
    SourceId,
    "source"
);
index_id!(
    /// Handle of a material transition group
    GroupId,
    "group"
);
index_id!(
    /// Handle of a downstream sink (ship engine)
    SinkId,
    "sink"
);

/// One of the two independent conduit trees
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TreeId {
    Left,
    Right,
}

impl TreeId {
    pub const BOTH: [TreeId; 2] = [TreeId::Left, TreeId::Right];

    pub fn name(self) -> &'static str {
        match self {
            TreeId::Left => "left",
            TreeId::Right => "right",
        }
    }
}

impl fmt::Display for TreeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
