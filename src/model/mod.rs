//! # Circuit Graph Model
//!
//! The vertices, edges and values of the circuit graph: nodes and their
//! declared types, graph interfaces, links and parameters.
//!
//! Design rule: data and local invariants only. Mutation that must keep
//! several objects consistent (adjacency caches, hierarchy) goes through
//! [`Graph`](crate::graph::Graph).

pub mod node;
pub mod interface;
pub mod link;
pub mod object;
pub mod parameter;

pub use node::{Node, NodeId, NodeKind, NodeType, InitFn, ConnectHook};
pub use interface::{GraphInterface, InterfaceId, InterfaceKind};
pub use link::{Link, LinkId, LinkKind, LinkType, ShallowFilter, resolve_link};
pub use object::ObjectRef;
pub use parameter::{Parameter, ResolutionError, resolve_all};
