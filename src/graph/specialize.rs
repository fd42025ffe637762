//! Replacing abstract interfaces and modules by concrete equivalents.
//!
//! The general and the special object stay distinct; their `specialized`
//! graph interfaces are linked so each can be found from the other, and
//! the special one takes over everything wired to the general one.

use super::Graph;
use crate::model::{LinkKind, NodeId};
use crate::traits::TraitImpl;
use crate::{Error, Result};

impl Graph {
    /// Make `special` stand in for `general`.
    ///
    /// `special` must be of `general`'s type or derived from it.
    pub fn specialize_interface(&mut self, general: NodeId, special: NodeId) -> Result<()> {
        let (general_ty, special_ty) = (self.node_type(general)?, self.node_type(special)?);
        if !special_ty.is_subtype_of(general_ty) {
            return Err(Error::TypeMismatch {
                expected: general_ty.name.into(),
                got: special_ty.name.into(),
            });
        }

        self.connect(general, special)?;
        self.link_specializations(general, special)?;
        tracing::debug!(general = %general, special = %special, ty = special_ty.name, "interface specialized");
        Ok(())
    }

    /// Make module `special` stand in for module `general`.
    ///
    /// Interfaces are paired by `matrix` when given, by child name
    /// otherwise. Parameters of `general` are merged into `special`, and its
    /// traits are copied unless `special` already has a comparable one.
    pub fn specialize_module(
        &mut self,
        general: NodeId,
        special: NodeId,
        matrix: Option<&[(NodeId, NodeId)]>,
    ) -> Result<()> {
        for module in [general, special] {
            let node = self.node(module)?;
            if !node.is_module() {
                return Err(Error::TypeMismatch {
                    expected: "module".into(),
                    got: node.node_type.name.into(),
                });
            }
        }

        let pairs = match matrix {
            Some(matrix) => self.checked_matrix(general, special, matrix)?,
            None => self.pairs_by_name(general, special)?,
        };
        for (general_if, special_if) in pairs {
            self.specialize_interface(general_if, special_if)?;
        }

        let parameters = self.node(general)?.parameters().to_vec();
        for (name, value) in &parameters {
            self.merge_parameter(special, name, value)?;
        }

        let copies: Vec<Box<dyn TraitImpl>> = {
            let target = self.traits(special)?;
            self.traits(general)?
                .iter()
                .filter(|entry| !target.has_comparable(entry.family()))
                .map(|entry| entry.implementation().clone_impl())
                .collect()
        };
        for imp in copies {
            self.add_trait_boxed(special.into(), imp)?;
        }

        self.link_specializations(general, special)?;
        tracing::debug!(general = %general, special = %special, "module specialized");
        Ok(())
    }

    /// Objects linked to `node` through its `specialized` interface.
    pub fn specializations_of(&self, node: NodeId) -> Result<Vec<NodeId>> {
        let gif = self.specialized_gif(node)?;
        let mut out = Vec::new();
        for (other, _) in self.direct_links(gif)? {
            out.push(self.interface(other)?.node());
        }
        Ok(out)
    }

    fn link_specializations(&mut self, general: NodeId, special: NodeId) -> Result<()> {
        let (a, b) = (self.specialized_gif(general)?, self.specialized_gif(special)?);
        if !self.is_interface_connected(a, b) {
            self.connect_interfaces(a, b, LinkKind::Direct)?;
        }
        Ok(())
    }

    fn pairs_by_name(&self, general: NodeId, special: NodeId) -> Result<Vec<(NodeId, NodeId)>> {
        let targets = self.named_interfaces(special)?;
        let mut pairs = Vec::new();
        for (name, general_if) in self.named_interfaces(general)? {
            let Some((_, special_if)) = targets.iter().find(|(n, _)| *n == name) else {
                return Err(Error::MissingCounterpart(format!(
                    "`{name}` of {} has no counterpart in {}",
                    self.full_name(general),
                    self.full_name(special)
                )));
            };
            pairs.push((general_if, *special_if));
        }
        Ok(pairs)
    }

    fn checked_matrix(
        &self,
        general: NodeId,
        special: NodeId,
        matrix: &[(NodeId, NodeId)],
    ) -> Result<Vec<(NodeId, NodeId)>> {
        let (general_ifs, special_ifs) = (self.interfaces_of(general)?, self.interfaces_of(special)?);
        for (general_if, special_if) in matrix {
            for (interface, module, members) in [
                (general_if, general, &general_ifs),
                (special_if, special, &special_ifs),
            ] {
                if !members.contains(interface) {
                    return Err(Error::MissingCounterpart(format!(
                        "{} is not an interface of {}",
                        self.full_name(*interface),
                        self.full_name(module)
                    )));
                }
            }
        }
        Ok(matrix.to_vec())
    }
}
