//! Links: typed edges between graph interfaces.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::{InterfaceId, NodeType};
use crate::graph::Graph;
use crate::traits::TraitRegistry;
use crate::{Error, Result};

/// Opaque link identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LinkId(pub u32);

impl std::fmt::Display for LinkId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "link{}", self.0)
    }
}

/// Predicate deciding whether a shallow link may touch an interface.
///
/// Two filters are the same link type when they are built from the same
/// node type (`Below`) or carry the same name (`Custom`).
#[derive(Clone, Copy)]
pub enum ShallowFilter {
    /// Rejects interfaces whose node has a proper ancestor of this type.
    Below(&'static NodeType),
    /// Caller-supplied predicate, identified by `name`.
    Custom {
        name: &'static str,
        accepts: fn(&Graph, InterfaceId) -> bool,
    },
}

impl ShallowFilter {
    pub fn name(&self) -> &'static str {
        match self {
            ShallowFilter::Below(ty) => ty.name,
            ShallowFilter::Custom { name, .. } => name,
        }
    }

    /// Whether a shallow link may be attached to `gif`.
    pub fn accepts(&self, graph: &Graph, gif: InterfaceId) -> bool {
        match self {
            ShallowFilter::Below(ty) => {
                let Ok(interface) = graph.interface(gif) else {
                    return false;
                };
                !graph
                    .ancestors(interface.node())
                    .into_iter()
                    .any(|(ancestor, _)| {
                        graph
                            .node(ancestor)
                            .map(|n| n.node_type.is_subtype_of(ty))
                            .unwrap_or(false)
                    })
            }
            ShallowFilter::Custom { accepts, .. } => accepts(graph, gif),
        }
    }
}

impl PartialEq for ShallowFilter {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ShallowFilter::Below(a), ShallowFilter::Below(b)) => std::ptr::eq(*a, *b),
            (ShallowFilter::Custom { name: a, .. }, ShallowFilter::Custom { name: b, .. }) => a == b,
            _ => false,
        }
    }
}

impl Eq for ShallowFilter {}

impl std::fmt::Debug for ShallowFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShallowFilter::Below(ty) => write!(f, "Below({})", ty.name),
            ShallowFilter::Custom { name, .. } => write!(f, "Custom({name})"),
        }
    }
}

/// The link types that compete in connection resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkType {
    Direct,
    DirectShallow(ShallowFilter),
}

impl LinkType {
    pub fn shallow_below(ty: &'static NodeType) -> Self {
        LinkType::DirectShallow(ShallowFilter::Below(ty))
    }

    pub fn is_shallow(&self) -> bool {
        matches!(self, LinkType::DirectShallow(_))
    }
}

impl std::fmt::Display for LinkType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LinkType::Direct => write!(f, "LinkDirect"),
            LinkType::DirectShallow(filter) => write!(f, "LinkDirectShallow({})", filter.name()),
        }
    }
}

/// Every kind of edge in the graph.
///
/// `Sibling` and `Parent` are structural and never take part in
/// [`resolve_link`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkKind {
    Direct,
    DirectShallow(ShallowFilter),
    /// Node-internal wiring from the `self` interface to another interface
    /// of the same node.
    Sibling,
    /// Parent `children` -> child `parent`, carrying the child's name.
    Parent { name: String },
}

impl LinkKind {
    pub fn link_type(&self) -> Option<LinkType> {
        match self {
            LinkKind::Direct => Some(LinkType::Direct),
            LinkKind::DirectShallow(filter) => Some(LinkType::DirectShallow(*filter)),
            LinkKind::Sibling | LinkKind::Parent { .. } => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LinkKind::Direct => "direct",
            LinkKind::DirectShallow(_) => "direct-shallow",
            LinkKind::Sibling => "sibling",
            LinkKind::Parent { .. } => "parent",
        }
    }
}

impl From<LinkType> for LinkKind {
    fn from(link_type: LinkType) -> Self {
        match link_type {
            LinkType::Direct => LinkKind::Direct,
            LinkType::DirectShallow(filter) => LinkKind::DirectShallow(filter),
        }
    }
}

/// An edge joining graph interfaces.
#[derive(Debug)]
pub struct Link {
    pub id: LinkId,
    pub kind: LinkKind,
    interfaces: SmallVec<[InterfaceId; 2]>,
    pub(crate) traits: TraitRegistry,
}

impl Link {
    pub(crate) fn new(id: LinkId, kind: LinkKind, interfaces: SmallVec<[InterfaceId; 2]>) -> Self {
        Self {
            id,
            kind,
            interfaces,
            traits: TraitRegistry::default(),
        }
    }

    /// All interfaces joined by this link.
    pub fn connections(&self) -> &[InterfaceId] {
        &self.interfaces
    }

    /// The other end of a two-ended link, seen from `from`.
    pub fn other(&self, from: InterfaceId) -> Option<InterfaceId> {
        match self.interfaces.as_slice() {
            [a, b] if *a == from => Some(*b),
            [a, b] if *b == from => Some(*a),
            _ => None,
        }
    }

    pub fn link_type(&self) -> Option<LinkType> {
        self.kind.link_type()
    }

    /// Child name carried by a parent link.
    pub fn parent_name(&self) -> Option<&str> {
        match &self.kind {
            LinkKind::Parent { name } => Some(name),
            _ => None,
        }
    }

    pub fn traits(&self) -> &TraitRegistry {
        &self.traits
    }
}

/// Pick the link type to use when several candidates meet.
///
/// All equal resolves to that type. A mix of plain direct links and one
/// shallow type resolves to the shallow type. Anything else is unsupported.
pub fn resolve_link(candidates: &[LinkType]) -> Result<LinkType> {
    let mut unique: SmallVec<[LinkType; 3]> = SmallVec::new();
    for candidate in candidates {
        if !unique.contains(candidate) {
            unique.push(*candidate);
        }
    }

    match unique.as_slice() {
        [only] => Ok(*only),
        [LinkType::Direct, shallow @ LinkType::DirectShallow(_)]
        | [shallow @ LinkType::DirectShallow(_), LinkType::Direct] => Ok(*shallow),
        [] => Err(Error::NotImplemented("resolving an empty set of links".into())),
        _ => Err(Error::NotImplemented(format!(
            "resolving links {}",
            unique.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
        ))),
    }
}
