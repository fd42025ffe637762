//! Trait attachment and node parameters.

use super::Graph;
use crate::model::{NodeId, ObjectRef, Parameter};
use crate::traits::{AttachOutcome, Family, TraitImpl, TraitRegistry};
use crate::{Error, Result};

impl Graph {
    // ========================================================================
    // Trait registry access
    // ========================================================================

    pub fn traits(&self, obj: impl Into<ObjectRef>) -> Result<&TraitRegistry> {
        Ok(match obj.into() {
            ObjectRef::Node(id) => &self.node(id)?.traits,
            ObjectRef::Interface(id) => &self.interface(id)?.traits,
            ObjectRef::Link(id) => &self.link(id)?.traits,
        })
    }

    fn traits_mut(&mut self, obj: ObjectRef) -> Result<&mut TraitRegistry> {
        Ok(match obj {
            ObjectRef::Node(id) => &mut self.node_mut(id)?.traits,
            ObjectRef::Interface(id) => &mut self.interface_mut(id)?.traits,
            ObjectRef::Link(id) => &mut self.link_mut(id)?.traits,
        })
    }

    /// Attach `imp` to `obj`, keeping the more specific of any comparable
    /// pair.
    ///
    /// The implementation is moved into the graph, so it is bound to exactly
    /// one object for as long as it lives.
    pub fn add_trait<T: TraitImpl>(&mut self, obj: impl Into<ObjectRef>, imp: T) -> Result<AttachOutcome> {
        self.add_trait_boxed(obj.into(), Box::new(imp))
    }

    pub fn add_trait_boxed(&mut self, obj: ObjectRef, imp: Box<dyn TraitImpl>) -> Result<AttachOutcome> {
        let family = imp.family();
        let outcome = self.traits_mut(obj)?.attach(imp);
        match &outcome {
            AttachOutcome::Appended => {
                tracing::trace!(object = %obj, family = family.name, "trait attached");
            }
            AttachOutcome::Replaced(previous) => {
                tracing::debug!(
                    object = %obj,
                    family = family.name,
                    replaced = previous.family().name,
                    "trait replaced by more specific implementation"
                );
            }
            AttachOutcome::Rejected(_) => {
                tracing::debug!(object = %obj, family = family.name, "trait rejected, more specific attached");
            }
        }
        Ok(outcome)
    }

    /// Whether `obj` has a currently implemented trait of family `F`.
    pub fn has_trait<F: Family + ?Sized>(&self, obj: impl Into<ObjectRef>) -> bool {
        let obj = obj.into();
        self.traits(obj)
            .map(|registry| {
                registry
                    .matching(F::info())
                    .any(|entry| entry.implementation().is_implemented(self, obj))
            })
            .unwrap_or(false)
    }

    /// The single currently implemented trait of family `F` on `obj`.
    ///
    /// No candidate is [`Error::TraitNotFound`]; several are
    /// [`Error::TraitAmbiguous`].
    pub fn get_trait<F: Family + ?Sized>(&self, obj: impl Into<ObjectRef>) -> Result<&F> {
        let obj = obj.into();
        let family = F::info();
        let mut candidates = self
            .traits(obj)?
            .matching(family)
            .filter(|entry| entry.implementation().is_implemented(self, obj))
            .filter_map(|entry| entry.cast::<F>());

        let Some(found) = candidates.next() else {
            return Err(Error::TraitNotFound {
                family: family.name,
                object: obj,
            });
        };
        let extra = candidates.count();
        if extra > 0 {
            return Err(Error::TraitAmbiguous {
                family: family.name,
                object: obj,
                count: extra + 1,
            });
        }
        Ok(found)
    }

    /// Detach one implementation of family `F`; `None` when there is none.
    pub fn del_trait<F: Family + ?Sized>(&mut self, obj: impl Into<ObjectRef>) -> Result<Option<Box<dyn TraitImpl>>> {
        let obj = obj.into();
        let removed = self.traits_mut(obj)?.remove(F::info());
        if let Some(imp) = &removed {
            tracing::trace!(object = %obj, family = imp.family().name, "trait detached");
        }
        Ok(removed)
    }

    // ========================================================================
    // Parameters
    // ========================================================================

    /// Current value of a node parameter; unset parameters are `Tbd`.
    pub fn parameter(&self, node: NodeId, name: &str) -> Result<Parameter> {
        Ok(self.node(node)?.parameter(name).cloned().unwrap_or_default())
    }

    /// Overwrite a node parameter.
    pub fn set_parameter(&mut self, node: NodeId, name: &str, value: impl Into<Parameter>) -> Result<()> {
        let value = value.into();
        let parameters = &mut self.node_mut(node)?.parameters;
        match parameters.iter_mut().find(|(n, _)| n == name) {
            Some((_, slot)) => *slot = value,
            None => parameters.push((name.to_string(), value)),
        }
        Ok(())
    }

    /// Narrow a node parameter with `other` and store the result.
    pub fn merge_parameter(&mut self, node: NodeId, name: &str, other: &Parameter) -> Result<Parameter> {
        let merged = self.parameter(node, name)?.resolve(other)?;
        self.set_parameter(node, name, merged.clone())?;
        Ok(merged)
    }
}
