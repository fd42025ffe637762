//! # circuit-graph: Typed Circuit Description Graph
//!
//! Describe an electronic circuit as a hierarchical graph of modules,
//! interfaces and parameters, let connections propagate through nested
//! interfaces, and flatten the result into a netlist.
//!
//! ## Design Principles
//!
//! 1. **Handles, not pointers**: [`Graph`] owns every node, graph interface
//!    and link; everything else refers to them by `Copy` id
//! 2. **Declared shape**: node types carry explicit ancestry, and structural
//!    matching never relies on reflection
//! 3. **Capabilities by family**: behaviour is attached to objects as trait
//!    implementations and looked up by family, most specific wins
//! 4. **Errors are values**: every inconsistency in a circuit description
//!    surfaces as an [`Error`] returned to the elaboration code
//!
//! ## Quick Start
//!
//! ```rust
//! use circuit_graph::Graph;
//! use circuit_graph::library::{ELECTRICAL, RESISTOR};
//!
//! # fn main() -> circuit_graph::Result<()> {
//! let mut graph = Graph::new();
//! let input = graph.create(&ELECTRICAL)?;
//! let output = graph.create(&ELECTRICAL)?;
//! let resistor = graph.create(&RESISTOR)?;
//!
//! // Series insertion through the resistor's `can_bridge` trait.
//! graph.connect_via(input, &[resistor], Some(output))?;
//!
//! assert!(graph.is_connected_to(input, graph.child(resistor, "unnamed[0]")?));
//! assert!(!graph.is_connected_to(input, output));
//! # Ok(())
//! # }
//! ```
//!
//! ## Layers
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`model`] | ids, node types, graph interfaces, links, parameters |
//! | [`traits`] | trait families and the per-object registry |
//! | [`graph`] | the arena, connection engine, specialization, traversal |
//! | [`library`] | standard node types, trait families, nets, designators |
//! | [`export`] | netlist model and writers |

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod traits;
pub mod graph;
pub mod config;
pub mod library;
pub mod export;

// ============================================================================
// Re-exports
// ============================================================================

pub use model::{
    InterfaceId, LinkId, LinkType, Node, NodeId, NodeKind, NodeType, ObjectRef, Parameter,
    ResolutionError,
};
pub use graph::{FlatGraph, Graph};
pub use config::GraphConfig;
pub use traits::{AttachOutcome, Family, FamilyInfo, TraitImpl};
pub use export::{Netlist, build_netlist, export_netlist_dump, export_netlist_json};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Trait not found: no implemented `{family}` on {object}")]
    TraitNotFound { family: &'static str, object: ObjectRef },

    #[error("Trait ambiguous: {count} implementations of `{family}` on {object}")]
    TraitAmbiguous {
        family: &'static str,
        object: ObjectRef,
        count: usize,
    },

    #[error("Cannot connect {0} to itself")]
    SelfConnection(InterfaceId),

    #[error("Link already exists between {0} and {1}")]
    DuplicateLink(InterfaceId, InterfaceId),

    #[error("Link filtered: `{filter}` rejects {interface}")]
    LinkFiltered {
        filter: &'static str,
        interface: InterfaceId,
    },

    #[error("Type error: expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Hierarchy error: {0}")]
    Hierarchy(String),

    #[error("Missing counterpart: {0}")]
    MissingCounterpart(String),

    #[error("Not implemented: {0}")]
    NotImplemented(String),

    #[error("Resolution error: {0}")]
    Resolution(#[from] ResolutionError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
