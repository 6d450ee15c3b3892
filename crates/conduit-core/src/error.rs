//! Error types for wiring and handle misuse
//!
//! Domain rejections (heating a busy node, a transition while one is running)
//! are not errors; they come back as outcome enums.

use thiserror::Error;

use crate::ids::{GroupId, SinkId, SourceId};
use crate::network::NodeId;

#[derive(Debug, Error, PartialEq)]
pub enum ConductionError {
    #[error("unknown node {0:?}")]
    UnknownNode(NodeId),

    #[error("unknown source {0}")]
    UnknownSource(SourceId),

    #[error("unknown transition group {0}")]
    UnknownGroup(GroupId),

    #[error("unknown sink {0}")]
    UnknownSink(SinkId),

    #[error("group {group} has {members} members but {glows} glow channels")]
    GlowCountMismatch {
        group: GroupId,
        members: usize,
        glows: usize,
    },

    #[error("layout references unknown node name '{0}'")]
    UnknownNodeName(String),

    #[error("layout references unknown sink name '{0}'")]
    UnknownSinkName(String),

    #[error("layout declares '{0}' more than once")]
    DuplicateName(String),

    #[error("layout is missing the {0} tree")]
    MissingTree(&'static str),

    #[error("layout wiring contains a cycle")]
    CyclicWiring,
}

pub type Result<T> = std::result::Result<T, ConductionError>;
