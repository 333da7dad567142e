//! Reference `Visitor` implementations, using dynamic dispatch over the
//! trait object rather than monomorphizing per consumer, for consumers
//! that drive a [`si_core::Visitor`] over a decoded
//! [`si_core::CompactImage`] without rasterizing anything.
//!
//! A real renderer implements `Visitor` itself and turns `path`/`text`/
//! `image` events into draw calls — that backend is explicitly out of
//! scope here. What this crate ships instead are the
//! lightweight consumers every such backend also needs somewhere in its
//! stack: a document-space bounds pass, a human-readable structure dump,
//! and a group-balance sanity checker.

pub mod bounds;
pub mod check;
pub mod dump;

pub use bounds::{DocumentBounds, DocumentBoundsVisitor};
pub use check::{StructuralChecker, StructuralStats};
pub use dump::DumpVisitor;
