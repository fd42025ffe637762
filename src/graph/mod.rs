//! # Circuit Graph
//!
//! The arena owning every node, graph interface and link, and the single
//! place where cross-object invariants are maintained:
//!
//! - every link appears in the `links` list of each interface it joins,
//! - the direct-adjacency caches of both ends agree with those lists,
//! - a node's graph interfaces are wired to its `self` interface by
//!   sibling links,
//! - a node has at most one parent.
//!
//! Objects refer to each other by handle ([`NodeId`], [`InterfaceId`],
//! [`LinkId`]); nothing holds a pointer into the arena, so the naturally
//! cyclic structure (interfaces know their node, nodes know their
//! interfaces, links know both ends) needs no manual cycle breaking.
//!
//! The implementation is spread over several files, one `impl Graph` block
//! each:
//!
//! | File | Concern |
//! |------|---------|
//! | `mod.rs` | storage, lookup, graph-interface linking |
//! | `hierarchy.rs` | node creation, parent/child wiring, names |
//! | `objects.rs` | trait attachment and lookup, parameters |
//! | `connect.rs` | connection propagation engine |
//! | `specialize.rs` | specialization of interfaces and modules |
//! | `traverse.rs` | materialization and enumeration queries |

mod connect;
mod hierarchy;
mod objects;
mod specialize;
mod traverse;

pub use traverse::FlatGraph;

use smallvec::{SmallVec, smallvec};

use crate::config::GraphConfig;
use crate::library::SingleEndPartner;
use crate::model::*;
use crate::{Error, Result};

// ============================================================================
// Graph
// ============================================================================

/// A circuit description under elaboration.
#[derive(Debug, Default)]
pub struct Graph {
    config: GraphConfig,
    nodes: Vec<Node>,
    interfaces: Vec<GraphInterface>,
    links: Vec<Link>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: GraphConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    pub fn node(&self, id: NodeId) -> Result<&Node> {
        self.nodes
            .get(id.0 as usize)
            .ok_or_else(|| Error::NotFound(format!("node {id}")))
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.nodes
            .get_mut(id.0 as usize)
            .ok_or_else(|| Error::NotFound(format!("node {id}")))
    }

    pub fn interface(&self, id: InterfaceId) -> Result<&GraphInterface> {
        self.interfaces
            .get(id.0 as usize)
            .ok_or_else(|| Error::NotFound(format!("graph interface {id}")))
    }

    pub(crate) fn interface_mut(&mut self, id: InterfaceId) -> Result<&mut GraphInterface> {
        self.interfaces
            .get_mut(id.0 as usize)
            .ok_or_else(|| Error::NotFound(format!("graph interface {id}")))
    }

    pub fn link(&self, id: LinkId) -> Result<&Link> {
        self.links
            .get(id.0 as usize)
            .ok_or_else(|| Error::NotFound(format!("link {id}")))
    }

    pub(crate) fn link_mut(&mut self, id: LinkId) -> Result<&mut Link> {
        self.links
            .get_mut(id.0 as usize)
            .ok_or_else(|| Error::NotFound(format!("link {id}")))
    }

    /// All nodes in creation order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn interface_count(&self) -> usize {
        self.interfaces.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// The type a node was created with.
    pub fn node_type(&self, id: NodeId) -> Result<&'static NodeType> {
        Ok(self.node(id)?.node_type)
    }

    /// The `connected` graph interface of a module interface.
    pub fn connected_gif(&self, id: NodeId) -> Result<InterfaceId> {
        let node = self.node(id)?;
        node.connected_gif.ok_or_else(|| Error::TypeMismatch {
            expected: "module interface".into(),
            got: node.node_type.name.into(),
        })
    }

    /// The `specialized` graph interface of a module or module interface.
    pub fn specialized_gif(&self, id: NodeId) -> Result<InterfaceId> {
        let node = self.node(id)?;
        node.specialized_gif.ok_or_else(|| Error::TypeMismatch {
            expected: "module or module interface".into(),
            got: node.node_type.name.into(),
        })
    }

    // ========================================================================
    // Graph-interface linking
    // ========================================================================

    /// Join two graph interfaces with a new link of `kind`.
    ///
    /// Fails with [`Error::DuplicateLink`] when the pair is already directly
    /// linked, and with [`Error::LinkFiltered`] when a shallow filter rejects
    /// either end. Callers of the connection engine never see the latter.
    pub fn connect_interfaces(&mut self, a: InterfaceId, b: InterfaceId, kind: LinkKind) -> Result<LinkId> {
        if a == b {
            return Err(Error::SelfConnection(a));
        }
        let (a_kind, b_kind) = (self.interface(a)?.kind, self.interface(b)?.kind);
        if self.is_interface_connected(a, b) {
            return Err(Error::DuplicateLink(a, b));
        }

        match &kind {
            LinkKind::Direct | LinkKind::DirectShallow(_) => {
                if a_kind != b_kind {
                    return Err(Error::TypeMismatch {
                        expected: a_kind.label().into(),
                        got: b_kind.label().into(),
                    });
                }
                if let LinkKind::DirectShallow(filter) = &kind {
                    for end in [a, b] {
                        if !filter.accepts(self, end) {
                            return Err(Error::LinkFiltered {
                                filter: filter.name(),
                                interface: end,
                            });
                        }
                    }
                }
            }
            LinkKind::Sibling => {
                if self.interface(a)?.node() != self.interface(b)?.node()
                    || a_kind != InterfaceKind::SelfRef
                {
                    return Err(Error::Hierarchy(format!(
                        "sibling links join a node's self interface to its own interfaces, not {a} and {b}"
                    )));
                }
            }
            LinkKind::Parent { .. } => {
                if a_kind != (InterfaceKind::Hierarchical { is_parent: false })
                    || b_kind != (InterfaceKind::Hierarchical { is_parent: true })
                {
                    return Err(Error::TypeMismatch {
                        expected: "children -> parent".into(),
                        got: format!("{} -> {}", a_kind.label(), b_kind.label()),
                    });
                }
            }
        }

        let two_ended_direct = kind.link_type().is_some();
        let id = self.push_link(kind, smallvec![a, b]);
        if two_ended_direct && self.config.single_end_partner {
            self.link_mut(id)?
                .traits
                .attach(Box::new(SingleEndPartner::new(a, b)));
        }
        Ok(id)
    }

    /// Whether `a` and `b` are joined by a link, checked from both ends.
    pub fn is_interface_connected(&self, a: InterfaceId, b: InterfaceId) -> bool {
        let seen_from = |from: InterfaceId, to: InterfaceId| {
            self.interface(from)
                .map(|gif| gif.link_to(to).is_some())
                .unwrap_or(false)
        };
        seen_from(a, b) || seen_from(b, a)
    }

    /// Interfaces directly adjacent to `gif`, in link order.
    pub fn direct_connections(&self, gif: InterfaceId) -> Result<Vec<InterfaceId>> {
        let interface = self.interface(gif)?;
        let mut out = Vec::with_capacity(interface.links.len());
        for link in &interface.links {
            for other in self.link(*link)?.connections() {
                if *other != gif && !out.contains(other) {
                    out.push(*other);
                }
            }
        }
        Ok(out)
    }

    /// Interfaces joined to `gif` by direct or shallow links, each with the
    /// link type joining them, in link order.
    pub(crate) fn direct_links(&self, gif: InterfaceId) -> Result<Vec<(InterfaceId, LinkType)>> {
        let interface = self.interface(gif)?;
        let mut out = Vec::new();
        for link_id in &interface.links {
            let link = self.link(*link_id)?;
            let (Some(link_type), Some(other)) = (link.link_type(), link.other(gif)) else {
                continue;
            };
            out.push((other, link_type));
        }
        Ok(out)
    }

    /// Record a link whose ends were validated by the caller.
    fn push_link(&mut self, kind: LinkKind, ends: SmallVec<[InterfaceId; 2]>) -> LinkId {
        let id = LinkId(self.links.len() as u32);
        for (i, end) in ends.iter().enumerate() {
            let interface = &mut self.interfaces[end.0 as usize];
            interface.links.push(id);
            for (j, other) in ends.iter().enumerate() {
                if i != j {
                    interface.direct.insert(*other, id);
                }
            }
        }
        tracing::trace!(link = %id, kind = kind.label(), ends = ?ends.as_slice(), "link created");
        self.links.push(Link::new(id, kind, ends));
        id
    }

    fn push_interface(&mut self, node: NodeId, kind: InterfaceKind) -> InterfaceId {
        let id = InterfaceId(self.interfaces.len() as u32);
        self.interfaces
            .push(GraphInterface::new(id, node, kind, kind.label()));
        id
    }
}
