//! # Connection Propagation
//!
//! Connecting two module interfaces connects everything already wired to
//! either end, descends into matching sub-interfaces and ascends to the
//! parents once all of their sub-interfaces are connected pairwise.
//!
//! ```text
//! connect_with(a, b, link)
//!   └─ siblings_and_connections(a, b)          no-op if already connected
//!        ├─ across_hierarchies(a, b)           link `connected` interfaces
//!        │    ├─ on_connect hook
//!        │    ├─ connect_down: matching children by name ─┐
//!        │    └─ connect_up: parents, all children linked ─┤ recurse
//!        ├─ cross-connect connection groups of a and b   ─┘
//!        └─ cross-connect specialization groups of a and b
//! ```
//!
//! Every recursive step either adds a link or stops at the idempotence
//! check, so recursion is bounded by the number of interface pairs. `depth`
//! only feeds the log records.

use super::Graph;
use crate::library::CanBridge;
use crate::model::{LinkType, NodeId, resolve_link};
use crate::{Error, Result};

/// Which per-node graph interface a group is collected from.
#[derive(Debug, Clone, Copy)]
enum GroupOf {
    Connections,
    Specializations,
}

impl Graph {
    // ========================================================================
    // Public entry points
    // ========================================================================

    /// Connect two module interfaces with a plain direct link.
    pub fn connect(&mut self, a: NodeId, b: NodeId) -> Result<()> {
        self.connect_with(a, b, LinkType::Direct)
    }

    /// Connect two module interfaces without letting the connection reach
    /// anything nested inside an interface of `a`'s type.
    pub fn connect_shallow(&mut self, a: NodeId, b: NodeId) -> Result<()> {
        let link = LinkType::shallow_below(self.node_type(a)?);
        self.connect_with(a, b, link)
    }

    /// Connect two module interfaces with an explicit link type.
    ///
    /// Both ends must be of matching shape: one type a subtype of the other.
    pub fn connect_with(&mut self, a: NodeId, b: NodeId, link: LinkType) -> Result<()> {
        self.connected_gif(a)?;
        self.connected_gif(b)?;
        let (ty_a, ty_b) = (self.node_type(a)?, self.node_type(b)?);
        if !ty_a.matches_shape(ty_b) {
            return Err(Error::TypeMismatch {
                expected: ty_a.name.into(),
                got: ty_b.name.into(),
            });
        }
        self.connect_siblings_and_connections(a, b, link, 0)
    }

    /// Chain `from` through each bridge's in/out interfaces, then to `to`.
    pub fn connect_via(&mut self, from: NodeId, bridges: &[NodeId], to: Option<NodeId>) -> Result<()> {
        let mut end = from;
        for bridge in bridges {
            let (input, output) = {
                let can_bridge = self.get_trait::<dyn CanBridge>(*bridge)?;
                (can_bridge.input(), can_bridge.output())
            };
            tracing::debug!(from = %end, bridge = %bridge, "bridging");
            self.connect(end, input)?;
            end = output;
        }
        if let Some(to) = to {
            self.connect(end, to)?;
        }
        Ok(())
    }

    /// Whether `a` and `b` are transitively connected. Reflexive and
    /// symmetric; `false` for anything that is not a module interface.
    pub fn is_connected_to(&self, a: NodeId, b: NodeId) -> bool {
        self.connected_interfaces(a)
            .map(|class| a == b || class.contains(&b))
            .unwrap_or(false)
    }

    // ========================================================================
    // Engine
    // ========================================================================

    fn connect_siblings_and_connections(&mut self, a: NodeId, b: NodeId, link: LinkType, depth: usize) -> Result<()> {
        if a == b || self.is_connected_to(a, b) {
            return Ok(());
        }

        // Groups as they were before `a` and `b` meet.
        let mut groups = Vec::with_capacity(2);
        for of in [GroupOf::Connections, GroupOf::Specializations] {
            groups.push((of, self.group(a, link, of)?, self.group(b, link, of)?));
        }

        self.connect_across_hierarchies(a, b, link, depth)?;
        if !self.is_interface_connected(self.connected_gif(a)?, self.connected_gif(b)?) {
            tracing::trace!(depth, a = %a, b = %b, "not connected at this level, stopping");
            return Ok(());
        }

        for (group, sources, targets) in &groups {
            for (s, s_link) in sources {
                for (d, d_link) in targets {
                    if s == d {
                        continue;
                    }
                    let resolved = resolve_link(&[*s_link, *d_link, link])?;
                    tracing::trace!(depth, s = %s, d = %d, ?group, link = %resolved, "cross-connect");
                    self.connect_across_hierarchies(*s, *d, resolved, depth + 1)?;
                }
            }
        }
        Ok(())
    }

    /// Link the `connected` interfaces of `a` and `b`, then propagate down
    /// and up the interface hierarchy.
    fn connect_across_hierarchies(&mut self, a: NodeId, b: NodeId, link: LinkType, depth: usize) -> Result<()> {
        if a == b {
            return Ok(());
        }
        let (gif_a, gif_b) = (self.connected_gif(a)?, self.connected_gif(b)?);

        if let Some(existing) = self.interface(gif_a)?.link_to(gif_b) {
            let Some(existing) = self.link(existing)?.link_type() else {
                return Err(Error::NotImplemented(format!(
                    "connecting {a} and {b} over a structural link"
                )));
            };
            // Any existing link compatible with the request satisfies it.
            // Shallow stays shallow, and a direct link already covers a
            // shallow request.
            return match resolve_link(&[existing, link]) {
                Ok(_) => Ok(()),
                Err(_) => Err(Error::NotImplemented(format!(
                    "overriding existing {existing} between {a} and {b} with {link}"
                ))),
            };
        }

        match self.connect_interfaces(gif_a, gif_b, link.into()) {
            Ok(_) => {}
            Err(Error::LinkFiltered { filter, interface }) => {
                tracing::trace!(depth, a = %a, b = %b, filter, rejected = %interface, "link filtered");
                return Ok(());
            }
            Err(e) => return Err(e),
        }
        tracing::debug!(depth, a = %a, b = %b, link = %link, "interfaces connected");

        self.run_connect_hook(a, b)?;
        self.try_connect_down(a, b, link, depth)?;
        self.try_connect_up(a, b, depth)?;
        Ok(())
    }

    fn run_connect_hook(&mut self, a: NodeId, b: NodeId) -> Result<()> {
        let (ty_a, ty_b) = (self.node_type(a)?, self.node_type(b)?);
        if !ty_a.matches_shape(ty_b) {
            return Ok(());
        }
        let derived = if ty_a.is_subtype_of(ty_b) { ty_a } else { ty_b };
        match derived.connect_hook() {
            Some(hook) => hook(self, a, b),
            None => Ok(()),
        }
    }

    /// Connect same-named sub-interfaces of two interfaces of matching shape.
    fn try_connect_down(&mut self, a: NodeId, b: NodeId, link: LinkType, depth: usize) -> Result<()> {
        if !self.node_type(a)?.matches_shape(self.node_type(b)?) {
            return Ok(());
        }
        let targets = self.named_interfaces(b)?;
        for (name, child_a) in self.named_interfaces(a)? {
            let Some((_, child_b)) = targets.iter().find(|(n, _)| *n == name) else {
                continue;
            };
            tracing::trace!(depth, child = %name, a = %child_a, b = %child_b, "descend");
            self.connect_siblings_and_connections(child_a, *child_b, link, depth + 1)?;
        }
        Ok(())
    }

    /// Connect the parents of `a` and `b` once every pair of their
    /// same-named sub-interfaces is directly linked.
    ///
    /// Partial matches connect nothing.
    fn try_connect_up(&mut self, a: NodeId, b: NodeId, depth: usize) -> Result<()> {
        if !self.config.auto_ascend {
            return Ok(());
        }
        let (Some((parent_a, _)), Some((parent_b, _))) = (self.parent(a)?, self.parent(b)?) else {
            return Ok(());
        };
        if parent_a == parent_b {
            return Ok(());
        }
        let (node_a, node_b) = (self.node(parent_a)?, self.node(parent_b)?);
        if !node_a.is_interface() || !node_b.is_interface() {
            return Ok(());
        }
        if !node_a.node_type.matches_shape(node_b.node_type) {
            return Ok(());
        }
        if self.is_interface_connected(self.connected_gif(parent_a)?, self.connected_gif(parent_b)?) {
            return Ok(());
        }

        let children_a = self.named_interfaces(parent_a)?;
        let children_b = self.named_interfaces(parent_b)?;
        if children_a.len() != children_b.len() {
            return Ok(());
        }

        let mut link_types = Vec::with_capacity(children_a.len());
        for (name, child_a) in &children_a {
            let Some((_, child_b)) = children_b.iter().find(|(n, _)| n == name) else {
                return Ok(());
            };
            let gif_a = self.interface(self.connected_gif(*child_a)?)?;
            let Some(link_id) = gif_a.link_to(self.connected_gif(*child_b)?) else {
                return Ok(());
            };
            match self.link(link_id)?.link_type() {
                Some(link_type) => link_types.push(link_type),
                None => return Ok(()),
            }
        }
        if link_types.is_empty() {
            return Ok(());
        }

        let link = match resolve_link(&link_types) {
            Ok(link) => link,
            Err(e) => {
                tracing::trace!(depth, a = %parent_a, b = %parent_b, error = %e, "ascend skipped");
                return Ok(());
            }
        };
        tracing::debug!(depth, a = %parent_a, b = %parent_b, link = %link, "ascend");
        self.connect_siblings_and_connections(parent_a, parent_b, link, depth + 1)
    }

    /// `node` with `link`, followed by every interface directly joined to
    /// it through the chosen graph interface and the type of that link.
    fn group(&self, node: NodeId, link: LinkType, of: GroupOf) -> Result<Vec<(NodeId, LinkType)>> {
        let gif = match of {
            GroupOf::Connections => self.connected_gif(node)?,
            GroupOf::Specializations => self.specialized_gif(node)?,
        };
        let mut group = vec![(node, link)];
        for (other, link_type) in self.direct_links(gif)? {
            let other = self.interface(other)?.node();
            if other == node || group.iter().any(|(seen, _)| *seen == other) {
                continue;
            }
            if self.node(other)?.is_interface() {
                group.push((other, link_type));
            }
        }
        Ok(group)
    }
}
