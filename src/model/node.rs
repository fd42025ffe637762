//! Nodes and their declared types.

use serde::{Deserialize, Serialize};

use super::{InterfaceId, Parameter};
use crate::graph::Graph;
use crate::traits::TraitRegistry;
use crate::Result;

/// Opaque node identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Role of a node in a circuit description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    /// Composable circuit block.
    Module,
    /// Typed connection port taking part in connection propagation.
    ModuleInterface,
    /// Hierarchy-only node.
    Plain,
}

/// Builds a freshly allocated node's children and parameters.
pub type InitFn = fn(&mut Graph, NodeId) -> Result<()>;

/// Runs after every new `connected` link between two interfaces of
/// matching shape, at any depth of propagation. The more derived type's
/// hook is the one that runs.
pub type ConnectHook = fn(&mut Graph, NodeId, NodeId) -> Result<()>;

/// Static descriptor of a node type.
///
/// `base` is the explicitly declared ancestry used for every structural
/// match (descend/ascend pairing, shallow filters, type queries). `init`
/// hooks run base-first when a node is created through
/// [`Graph::create`](crate::graph::Graph::create).
#[derive(Debug)]
pub struct NodeType {
    pub name: &'static str,
    pub kind: NodeKind,
    pub base: Option<&'static NodeType>,
    pub init: Option<InitFn>,
    pub on_connect: Option<ConnectHook>,
}

impl NodeType {
    pub const fn new(name: &'static str, kind: NodeKind) -> Self {
        Self {
            name,
            kind,
            base: None,
            init: None,
            on_connect: None,
        }
    }

    /// Derive from `base`. The kind is inherited.
    pub const fn extending(name: &'static str, base: &'static NodeType) -> Self {
        Self {
            name,
            kind: base.kind,
            base: Some(base),
            init: None,
            on_connect: None,
        }
    }

    pub const fn with_init(mut self, init: InitFn) -> Self {
        self.init = Some(init);
        self
    }

    pub const fn with_on_connect(mut self, hook: ConnectHook) -> Self {
        self.on_connect = Some(hook);
        self
    }

    /// `self` is `other` or declares it somewhere in its base chain.
    pub fn is_subtype_of(&self, other: &NodeType) -> bool {
        let mut current = Some(self);
        while let Some(ty) = current {
            if std::ptr::eq(ty, other) {
                return true;
            }
            current = ty.base;
        }
        false
    }

    /// Either type derives from the other.
    pub fn matches_shape(&self, other: &NodeType) -> bool {
        self.is_subtype_of(other) || other.is_subtype_of(self)
    }

    /// Base chain from the root type down to `self`.
    pub fn lineage(&'static self) -> Vec<&'static NodeType> {
        let mut chain = Vec::new();
        let mut current = Some(self);
        while let Some(ty) = current {
            chain.push(ty);
            current = ty.base;
        }
        chain.reverse();
        chain
    }

    /// The first `on_connect` hook found walking from `self` to the root.
    pub fn connect_hook(&self) -> Option<ConnectHook> {
        let mut current = Some(self);
        while let Some(ty) = current {
            if ty.on_connect.is_some() {
                return ty.on_connect;
            }
            current = ty.base;
        }
        None
    }
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name)
    }
}

/// A node in the circuit graph.
///
/// Hierarchy lives in the graph itself: the child's name is carried by the
/// parent link between `children` and the child's `parent` interface.
#[derive(Debug)]
pub struct Node {
    pub id: NodeId,
    pub node_type: &'static NodeType,
    pub self_gif: InterfaceId,
    pub children_gif: InterfaceId,
    pub parent_gif: InterfaceId,
    /// `ModuleConnection` interface; module interfaces only.
    pub connected_gif: Option<InterfaceId>,
    /// `ModuleSibling` interface; modules and module interfaces.
    pub specialized_gif: Option<InterfaceId>,
    pub(crate) parameters: Vec<(String, Parameter)>,
    pub(crate) traits: TraitRegistry,
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        self.node_type.kind
    }

    pub fn is_module(&self) -> bool {
        self.kind() == NodeKind::Module
    }

    pub fn is_interface(&self) -> bool {
        self.kind() == NodeKind::ModuleInterface
    }

    pub fn is_a(&self, ty: &NodeType) -> bool {
        self.node_type.is_subtype_of(ty)
    }

    /// All graph interfaces owned by this node, `self` first.
    pub fn gifs(&self) -> Vec<InterfaceId> {
        let mut gifs = vec![self.self_gif, self.children_gif, self.parent_gif];
        gifs.extend(self.connected_gif);
        gifs.extend(self.specialized_gif);
        gifs
    }

    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|(n, _)| n == name).map(|(_, p)| p)
    }

    pub fn parameters(&self) -> &[(String, Parameter)] {
        &self.parameters
    }

    pub fn traits(&self) -> &TraitRegistry {
        &self.traits
    }
}
