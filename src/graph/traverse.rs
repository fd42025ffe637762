//! Materialization and enumeration queries.

use std::collections::VecDeque;

use hashbrown::HashSet;
use serde::Serialize;

use super::Graph;
use crate::Result;
use crate::model::{InterfaceId, LinkId, NodeId, NodeType};

/// Every graph interface and link reachable from a set of roots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FlatGraph {
    /// Discovery order.
    pub interfaces: Vec<InterfaceId>,
    pub links: Vec<LinkId>,
    /// Owners of `interfaces`, first-seen order.
    pub nodes: Vec<NodeId>,
}

impl FlatGraph {
    pub fn contains_interface(&self, gif: InterfaceId) -> bool {
        self.interfaces.contains(&gif)
    }

    pub fn contains_node(&self, node: NodeId) -> bool {
        self.nodes.contains(&node)
    }
}

impl Graph {
    /// Breadth-first collection of everything reachable from the `self`
    /// interfaces of `roots` over any kind of link.
    pub fn materialize(&self, roots: &[NodeId]) -> Result<FlatGraph> {
        let mut flat = FlatGraph::default();
        let mut seen_gifs: HashSet<InterfaceId> = HashSet::new();
        let mut seen_links: HashSet<LinkId> = HashSet::new();
        let mut seen_nodes: HashSet<NodeId> = HashSet::new();
        let mut queue = VecDeque::new();

        for root in roots {
            let start = self.node(*root)?.self_gif;
            if seen_gifs.insert(start) {
                queue.push_back(start);
            }
        }

        while let Some(gif) = queue.pop_front() {
            let interface = self.interface(gif)?;
            flat.interfaces.push(gif);
            if seen_nodes.insert(interface.node()) {
                flat.nodes.push(interface.node());
            }
            for link_id in interface.links() {
                if !seen_links.insert(*link_id) {
                    continue;
                }
                flat.links.push(*link_id);
                for next in self.link(*link_id)?.connections() {
                    if seen_gifs.insert(*next) {
                        queue.push_back(*next);
                    }
                }
            }
        }

        tracing::debug!(
            roots = roots.len(),
            interfaces = flat.interfaces.len(),
            links = flat.links.len(),
            "graph materialized"
        );
        Ok(flat)
    }

    /// Module interfaces transitively connected to `node`, excluding
    /// `node` itself, in breadth-first order.
    pub fn connected_interfaces(&self, node: NodeId) -> Result<Vec<NodeId>> {
        let start = self.connected_gif(node)?;
        let mut seen: HashSet<InterfaceId> = HashSet::new();
        seen.insert(start);
        let mut queue = VecDeque::from([start]);
        let mut out = Vec::new();

        while let Some(gif) = queue.pop_front() {
            for (next, _) in self.direct_links(gif)? {
                if seen.insert(next) {
                    out.push(self.interface(next)?.node());
                    queue.push_back(next);
                }
            }
        }
        Ok(out)
    }

    /// Every node below `root` in the child tree, depth-first pre-order,
    /// excluding `root`.
    pub fn descendants(&self, root: NodeId) -> Result<Vec<NodeId>> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(root)?.into_iter().rev().map(|(_, c)| c).collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.children(node)?.into_iter().rev().map(|(_, c)| c));
        }
        Ok(out)
    }

    /// Descendants of `root` whose type derives from `ty`.
    pub fn nodes_of_type(&self, root: NodeId, ty: &NodeType) -> Result<Vec<NodeId>> {
        let mut out = Vec::new();
        for node in self.descendants(root)? {
            if self.node(node)?.is_a(ty) {
                out.push(node);
            }
        }
        Ok(out)
    }

    /// Descendants of `root` matching any type of `order`, grouped by the
    /// first type they match. Depth-first order holds within a group.
    pub fn nodes_of_type_prioritized(&self, root: NodeId, order: &[&NodeType]) -> Result<Vec<NodeId>> {
        let mut ranked = Vec::new();
        for node in self.descendants(root)? {
            let ty = self.node(node)?.node_type;
            if let Some(rank) = order.iter().position(|wanted| ty.is_subtype_of(wanted)) {
                ranked.push((rank, node));
            }
        }
        ranked.sort_by_key(|(rank, _)| *rank);
        Ok(ranked.into_iter().map(|(_, node)| node).collect())
    }
}
