//! Node creation and the parent/child tree.

use smallvec::smallvec;

use super::Graph;
use crate::model::*;
use crate::traits::TraitRegistry;
use crate::{Error, Result};

impl Graph {
    // ========================================================================
    // Creation
    // ========================================================================

    /// Allocate a bare node of `ty` with its graph interfaces, without
    /// running any `init` hook.
    pub fn add_node(&mut self, ty: &'static NodeType) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);

        let self_gif = self.push_interface(id, InterfaceKind::SelfRef);
        let children_gif = self.push_interface(id, InterfaceKind::Hierarchical { is_parent: false });
        let parent_gif = self.push_interface(id, InterfaceKind::Hierarchical { is_parent: true });
        let (connected_gif, specialized_gif) = match ty.kind {
            NodeKind::ModuleInterface => (
                Some(self.push_interface(id, InterfaceKind::ModuleConnection)),
                Some(self.push_interface(id, InterfaceKind::ModuleSibling)),
            ),
            NodeKind::Module => (None, Some(self.push_interface(id, InterfaceKind::ModuleSibling))),
            NodeKind::Plain => (None, None),
        };

        let node = Node {
            id,
            node_type: ty,
            self_gif,
            children_gif,
            parent_gif,
            connected_gif,
            specialized_gif,
            parameters: Vec::new(),
            traits: TraitRegistry::default(),
        };
        for gif in node.gifs().into_iter().skip(1) {
            self.push_link(LinkKind::Sibling, smallvec![self_gif, gif]);
        }
        self.nodes.push(node);

        tracing::trace!(node = %id, ty = ty.name, "node allocated");
        id
    }

    /// Allocate a node of `ty` and run the `init` hooks of its lineage,
    /// base type first.
    pub fn create(&mut self, ty: &'static NodeType) -> Result<NodeId> {
        let id = self.add_node(ty);
        for ancestor in ty.lineage() {
            if let Some(init) = ancestor.init {
                init(self, id)?;
            }
        }
        tracing::debug!(node = %id, ty = ty.name, "node created");
        Ok(id)
    }

    /// [`create`](Self::create) a node and register it under `parent`.
    pub fn create_child(&mut self, parent: NodeId, name: impl Into<String>, ty: &'static NodeType) -> Result<NodeId> {
        let child = self.create(ty)?;
        self.add_child(parent, child, name)?;
        Ok(child)
    }

    /// Register `child` under `parent` as `name`.
    ///
    /// A node is parented at most once, names are unique per parent and the
    /// tree stays acyclic.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        if parent == child {
            return Err(Error::Hierarchy(format!("node {child} cannot be its own child")));
        }
        if let Some((current, current_name)) = self.parent(child)? {
            return Err(Error::Hierarchy(format!(
                "node {child} is already child `{current_name}` of node {current}"
            )));
        }
        if self.children(parent)?.iter().any(|(existing, _)| *existing == name) {
            return Err(Error::Hierarchy(format!("node {parent} already has a child named `{name}`")));
        }
        if self.ancestors(parent).iter().any(|(ancestor, _)| *ancestor == child) {
            return Err(Error::Hierarchy(format!("node {child} is an ancestor of node {parent}")));
        }

        let children_gif = self.node(parent)?.children_gif;
        let parent_gif = self.node(child)?.parent_gif;
        self.connect_interfaces(children_gif, parent_gif, LinkKind::Parent { name })?;
        Ok(())
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    /// The parent of `node` and the name `node` is registered under.
    pub fn parent(&self, node: NodeId) -> Result<Option<(NodeId, String)>> {
        let parent_gif = self.interface(self.node(node)?.parent_gif)?;
        for link_id in parent_gif.links() {
            let link = self.link(*link_id)?;
            let (Some(name), Some(other)) = (link.parent_name(), link.other(parent_gif.id)) else {
                continue;
            };
            return Ok(Some((self.interface(other)?.node(), name.to_string())));
        }
        Ok(None)
    }

    /// Named children of `node` in registration order.
    pub fn children(&self, node: NodeId) -> Result<Vec<(String, NodeId)>> {
        let children_gif = self.interface(self.node(node)?.children_gif)?;
        let mut out = Vec::new();
        for link_id in children_gif.links() {
            let link = self.link(*link_id)?;
            let (Some(name), Some(other)) = (link.parent_name(), link.other(children_gif.id)) else {
                continue;
            };
            out.push((name.to_string(), self.interface(other)?.node()));
        }
        Ok(out)
    }

    pub fn child(&self, node: NodeId, name: &str) -> Result<NodeId> {
        self.children(node)?
            .into_iter()
            .find(|(child_name, _)| child_name == name)
            .map(|(_, child)| child)
            .ok_or_else(|| Error::NotFound(format!("child `{name}` of {}", self.full_name(node))))
    }

    /// Follow a dotted path of child names, e.g. `"reference.hv"`.
    pub fn descendant(&self, node: NodeId, path: &str) -> Result<NodeId> {
        path.split('.')
            .filter(|segment| !segment.is_empty())
            .try_fold(node, |current, segment| self.child(current, segment))
    }

    /// Proper ancestors of `node`, nearest first, each paired with the name
    /// under which the path continues below it.
    pub fn ancestors(&self, node: NodeId) -> Vec<(NodeId, String)> {
        let mut out = Vec::new();
        let mut current = node;
        while let Ok(Some((parent, name))) = self.parent(current) {
            out.push((parent, name));
            current = parent;
        }
        out
    }

    /// The local name of `node`; roots are named `*<id>`.
    pub fn name(&self, node: NodeId) -> String {
        match self.parent(node) {
            Ok(Some((_, name))) => name,
            _ => format!("*{node}"),
        }
    }

    /// Dotted path from the root, e.g. `*0.power.hv`.
    pub fn full_name(&self, node: NodeId) -> String {
        let ancestors = self.ancestors(node);
        let root = ancestors.last().map(|(root, _)| *root).unwrap_or(node);
        let mut name = format!("*{root}");
        for (_, segment) in ancestors.iter().rev() {
            name.push('.');
            name.push_str(segment);
        }
        name
    }

    /// Child module interfaces of `node` in registration order.
    pub fn interfaces_of(&self, node: NodeId) -> Result<Vec<NodeId>> {
        self.children_of_kind(node, NodeKind::ModuleInterface)
    }

    /// Child modules of `node` in registration order.
    pub fn submodules_of(&self, node: NodeId) -> Result<Vec<NodeId>> {
        self.children_of_kind(node, NodeKind::Module)
    }

    /// Named child module interfaces, for pairing by name.
    pub(crate) fn named_interfaces(&self, node: NodeId) -> Result<Vec<(String, NodeId)>> {
        let mut out = Vec::new();
        for (name, child) in self.children(node)? {
            if self.node(child)?.is_interface() {
                out.push((name, child));
            }
        }
        Ok(out)
    }

    fn children_of_kind(&self, node: NodeId, kind: NodeKind) -> Result<Vec<NodeId>> {
        let mut out = Vec::new();
        for (_, child) in self.children(node)? {
            if self.node(child)?.kind() == kind {
                out.push(child);
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static WIRE: NodeType = NodeType::new("Wire", NodeKind::ModuleInterface);
    static PAIR: NodeType = NodeType::new("Pair", NodeKind::ModuleInterface).with_init(init_pair);
    static TWISTED_PAIR: NodeType = NodeType::extending("TwistedPair", &PAIR).with_init(init_twisted);
    static BOARD: NodeType = NodeType::new("Board", NodeKind::Module);

    fn init_pair(g: &mut Graph, id: NodeId) -> Result<()> {
        g.create_child(id, "a", &WIRE)?;
        g.create_child(id, "b", &WIRE)?;
        Ok(())
    }

    fn init_twisted(g: &mut Graph, id: NodeId) -> Result<()> {
        g.create_child(id, "shield", &WIRE)?;
        Ok(())
    }

    #[test]
    fn test_node_gifs_wired_to_self() {
        let mut g = Graph::new();
        let wire = g.add_node(&WIRE);
        let node = g.node(wire).unwrap();
        assert_eq!(node.gifs().len(), 5);
        for gif in node.gifs().into_iter().skip(1) {
            assert!(g.is_interface_connected(node.self_gif, gif));
        }
        assert_eq!(g.interface(node.parent_gif).unwrap().node(), wire);
    }

    #[test]
    fn test_init_runs_base_first() {
        let mut g = Graph::new();
        let pair = g.create(&TWISTED_PAIR).unwrap();
        let names: Vec<String> = g.children(pair).unwrap().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["a", "b", "shield"]);
    }

    #[test]
    fn test_names_and_paths() {
        let mut g = Graph::new();
        let board = g.create(&BOARD).unwrap();
        let pair = g.create_child(board, "diff", &PAIR).unwrap();
        let b = g.descendant(board, "diff.b").unwrap();

        assert_eq!(g.full_name(b), format!("*{board}.diff.b"));
        assert_eq!(g.name(b), "b");
        assert_eq!(g.name(board), format!("*{board}"));
        assert_eq!(g.parent(b).unwrap(), Some((pair, "b".to_string())));
        assert_eq!(
            g.ancestors(b),
            vec![(pair, "b".to_string()), (board, "diff".to_string())]
        );
        assert_eq!(g.interfaces_of(board).unwrap(), vec![pair]);
        assert!(g.submodules_of(board).unwrap().is_empty());
    }

    #[test]
    fn test_reparenting_rejected() {
        let mut g = Graph::new();
        let one = g.create(&BOARD).unwrap();
        let two = g.create(&BOARD).unwrap();
        let wire = g.create_child(one, "w", &WIRE).unwrap();
        assert!(matches!(g.add_child(two, wire, "w"), Err(Error::Hierarchy(_))));
    }

    #[test]
    fn test_duplicate_child_name_rejected() {
        let mut g = Graph::new();
        let board = g.create(&BOARD).unwrap();
        g.create_child(board, "w", &WIRE).unwrap();
        let other = g.create(&WIRE).unwrap();
        assert!(matches!(g.add_child(board, other, "w"), Err(Error::Hierarchy(_))));
    }

    #[test]
    fn test_cycle_rejected() {
        let mut g = Graph::new();
        let outer = g.create(&BOARD).unwrap();
        let inner = g.create_child(outer, "inner", &BOARD).unwrap();
        assert!(matches!(g.add_child(inner, outer, "loop"), Err(Error::Hierarchy(_))));
    }

    #[test]
    fn test_missing_child_is_not_found() {
        let mut g = Graph::new();
        let pair = g.create(&PAIR).unwrap();
        assert!(matches!(g.descendant(pair, "c"), Err(Error::NotFound(_))));
    }
}
