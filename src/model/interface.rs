//! Graph interfaces: the atomic vertices of the connectivity graph.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use super::{LinkId, NodeId};
use crate::traits::TraitRegistry;

/// Opaque graph-interface identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InterfaceId(pub u32);

impl std::fmt::Display for InterfaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "gif{}", self.0)
    }
}

/// What a graph interface stands for on its owning node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InterfaceKind {
    /// "This node". Exactly one per node.
    SelfRef,
    /// Hierarchy endpoint: `is_parent == true` is the node's pointer up to
    /// its parent, `false` is the endpoint its children attach to.
    Hierarchical { is_parent: bool },
    /// Joins abstract and concrete versions of the same interface/module.
    ModuleSibling,
    /// Endpoint of electrical/logical connections between module interfaces.
    ModuleConnection,
}

impl InterfaceKind {
    pub fn label(&self) -> &'static str {
        match self {
            InterfaceKind::SelfRef => "self",
            InterfaceKind::Hierarchical { is_parent: true } => "parent",
            InterfaceKind::Hierarchical { is_parent: false } => "children",
            InterfaceKind::ModuleSibling => "specialized",
            InterfaceKind::ModuleConnection => "connected",
        }
    }
}

/// One named port in the connectivity graph.
///
/// The owning node is fixed at creation. `direct` caches, for every
/// interface joined to this one by a link, the link that joins them; it is
/// kept in sync with `links` by [`Graph`](crate::graph::Graph) and answers
/// adjacency queries without scanning the link list.
#[derive(Debug)]
pub struct GraphInterface {
    pub id: InterfaceId,
    pub kind: InterfaceKind,
    pub name: String,
    node: NodeId,
    pub(crate) links: Vec<LinkId>,
    pub(crate) direct: HashMap<InterfaceId, LinkId>,
    pub(crate) traits: TraitRegistry,
}

impl GraphInterface {
    pub(crate) fn new(id: InterfaceId, node: NodeId, kind: InterfaceKind, name: impl Into<String>) -> Self {
        Self {
            id,
            kind,
            name: name.into(),
            node,
            links: Vec::new(),
            direct: HashMap::new(),
            traits: TraitRegistry::default(),
        }
    }

    /// The node this interface belongs to.
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Links attached to this interface, in creation order.
    pub fn links(&self) -> &[LinkId] {
        &self.links
    }

    /// The link directly joining this interface to `other`, if any.
    pub fn link_to(&self, other: InterfaceId) -> Option<LinkId> {
        self.direct.get(&other).copied()
    }

    /// Interfaces directly adjacent to this one.
    pub fn direct_connections(&self) -> impl Iterator<Item = InterfaceId> + '_ {
        self.direct.keys().copied()
    }

    pub fn traits(&self) -> &TraitRegistry {
        &self.traits
    }
}
