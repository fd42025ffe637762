//! References to any graph object that can carry traits.

use serde::{Deserialize, Serialize};

use super::{InterfaceId, LinkId, NodeId};

/// A node, graph interface or link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectRef {
    Node(NodeId),
    Interface(InterfaceId),
    Link(LinkId),
}

impl ObjectRef {
    pub fn as_node(&self) -> Option<NodeId> {
        match self {
            ObjectRef::Node(id) => Some(*id),
            _ => None,
        }
    }
}

impl From<NodeId> for ObjectRef {
    fn from(id: NodeId) -> Self {
        ObjectRef::Node(id)
    }
}

impl From<InterfaceId> for ObjectRef {
    fn from(id: InterfaceId) -> Self {
        ObjectRef::Interface(id)
    }
}

impl From<LinkId> for ObjectRef {
    fn from(id: LinkId) -> Self {
        ObjectRef::Link(id)
    }
}

impl std::fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ObjectRef::Node(id) => write!(f, "node {id}"),
            ObjectRef::Interface(id) => write!(f, "{id}"),
            ObjectRef::Link(id) => write!(f, "{id}"),
        }
    }
}
