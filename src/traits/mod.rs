//! # Trait System
//!
//! Runtime capability lookup for graph objects. A *family* is an abstract
//! capability (say "has a footprint") and an *implementation* is a concrete
//! value providing it, attached to exactly one node, interface or link.
//!
//! ## Shape
//!
//! | Piece | Role |
//! |-------|------|
//! | [`FamilyInfo`] | static descriptor with explicit parent family |
//! | [`Family`] | ties a capability `dyn Trait` to its descriptor |
//! | [`Provides`] | how an implementation exposes one capability |
//! | [`TraitImpl`] | object-safe contract every implementation fulfils |
//! | [`TraitRegistry`] | per-object slot list with specificity resolution |
//!
//! Families form a tree. Attaching an implementation whose family is
//! comparable (same, ancestor or descendant) to an attached one keeps only
//! the more specific of the two. Lookups by family `F` see implementations
//! of `F` and of every sub-family.
//!
//! ## Declaring a family
//!
//! ```rust
//! use circuit_graph::traits::{Casts, Family, FamilyInfo, TraitImpl};
//! use circuit_graph::provides;
//!
//! pub trait HasColor {
//!     fn color(&self) -> &str;
//! }
//!
//! pub static HAS_COLOR: FamilyInfo = FamilyInfo::root("has_color");
//!
//! impl Family for dyn HasColor {
//!     fn info() -> &'static FamilyInfo {
//!         &HAS_COLOR
//!     }
//! }
//!
//! #[derive(Debug, Clone)]
//! pub struct Red;
//!
//! impl HasColor for Red {
//!     fn color(&self) -> &str { "red" }
//! }
//!
//! provides!(Red => HasColor);
//!
//! impl TraitImpl for Red {
//!     fn family(&self) -> &'static FamilyInfo { &HAS_COLOR }
//!     fn casts(&self) -> Casts { Casts::new().with::<dyn HasColor, Self>() }
//! }
//! ```

pub mod registry;

use std::any::{Any, TypeId};
use std::fmt;

use smallvec::SmallVec;

use crate::graph::Graph;
use crate::model::ObjectRef;

pub use registry::{AttachOutcome, TraitEntry, TraitRegistry};

// ============================================================================
// Families
// ============================================================================

/// Static descriptor of a trait family.
///
/// Declare families as `static` items: identity is the descriptor's address.
#[derive(Debug)]
pub struct FamilyInfo {
    pub name: &'static str,
    pub parent: Option<&'static FamilyInfo>,
}

impl FamilyInfo {
    pub const fn root(name: &'static str) -> Self {
        Self { name, parent: None }
    }

    pub const fn child(name: &'static str, parent: &'static FamilyInfo) -> Self {
        Self {
            name,
            parent: Some(parent),
        }
    }

    /// `self` is `other` or one of its descendants.
    pub fn is_subfamily_of(&self, other: &FamilyInfo) -> bool {
        let mut current = Some(self);
        while let Some(family) = current {
            if std::ptr::eq(family, other) {
                return true;
            }
            current = family.parent;
        }
        false
    }

    /// One family contains the other.
    pub fn is_comparable(&self, other: &FamilyInfo) -> bool {
        self.is_subfamily_of(other) || other.is_subfamily_of(self)
    }

    /// Number of ancestors; deeper is more specific.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut current = self.parent;
        while let Some(family) = current {
            depth += 1;
            current = family.parent;
        }
        depth
    }
}

impl fmt::Display for FamilyInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Implemented for the `dyn Capability` type of each family.
pub trait Family: 'static {
    fn info() -> &'static FamilyInfo;
}

/// An implementation exposing capability `F`.
pub trait Provides<F: Family + ?Sized> {
    fn provide(&self) -> &F;
}

/// Implement [`Provides`] for each listed capability trait by unsizing.
#[macro_export]
macro_rules! provides {
    ($imp:ty => $($family:ident),+ $(,)?) => {
        $(
            impl $crate::traits::Provides<dyn $family> for $imp {
                fn provide(&self) -> &(dyn $family + 'static) {
                    self
                }
            }
        )+
    };
}

// ============================================================================
// Cast table
// ============================================================================

type Caster<F> = for<'a> fn(&'a (dyn Any + 'static)) -> Option<&'a F>;

fn cast_to<'a, F, I>(any: &'a (dyn Any + 'static)) -> Option<&'a F>
where
    F: Family + ?Sized,
    I: Provides<F> + 'static,
{
    any.downcast_ref::<I>().map(|imp| imp.provide())
}

/// The capabilities one implementation type exposes, keyed by family.
#[derive(Default)]
pub struct Casts {
    entries: SmallVec<[(TypeId, Box<dyn Any + Send + Sync>); 2]>,
}

impl Casts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expose `I` as capability `F`.
    pub fn with<F, I>(mut self) -> Self
    where
        F: Family + ?Sized,
        I: Provides<F> + 'static,
    {
        let caster: Caster<F> = cast_to::<F, I>;
        self.entries.push((TypeId::of::<F>(), Box::new(caster)));
        self
    }

    pub fn provides<F: Family + ?Sized>(&self) -> bool {
        self.entries.iter().any(|(id, _)| *id == TypeId::of::<F>())
    }

    /// View the concrete implementation `imp` as capability `F`.
    pub fn cast<'a, F: Family + ?Sized>(&self, imp: &'a (dyn Any + 'static)) -> Option<&'a F> {
        let (_, boxed) = self.entries.iter().find(|(id, _)| *id == TypeId::of::<F>())?;
        let erased: &(dyn Any + Send + Sync) = &**boxed;
        let caster = erased.downcast_ref::<Caster<F>>()?;
        caster(imp)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for Casts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Casts").field("capabilities", &self.entries.len()).finish()
    }
}

// ============================================================================
// Implementations
// ============================================================================

/// Contract of every trait implementation.
///
/// Implementations must be `Clone` (see [`TraitImplBase`]) so that
/// specialization can copy them onto another object.
pub trait TraitImpl: TraitImplBase + Send + Sync + fmt::Debug + 'static {
    /// The most specific family this implementation declares.
    fn family(&self) -> &'static FamilyInfo;

    /// Capabilities exposed to typed lookups.
    fn casts(&self) -> Casts;

    /// Conditional availability. Lookups skip implementations reporting
    /// `false`; attachment and removal ignore it.
    fn is_implemented(&self, _graph: &Graph, _owner: ObjectRef) -> bool {
        true
    }
}

/// Object-safe helpers, blanket-implemented for every `Clone` implementation.
pub trait TraitImplBase {
    fn as_any(&self) -> &dyn Any;
    fn clone_impl(&self) -> Box<dyn TraitImpl>;
}

impl<T: TraitImpl + Clone> TraitImplBase for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn clone_impl(&self) -> Box<dyn TraitImpl> {
        Box::new(self.clone())
    }
}

impl dyn TraitImpl {
    /// Downcast to a concrete implementation type.
    pub fn downcast_ref<T: TraitImpl>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn is<T: TraitImpl>(&self) -> bool {
        self.as_any().is::<T>()
    }
}
