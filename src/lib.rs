//! irscope: inspect a nested IR tree and run a pass pipeline over it.
//!
//! The building blocks live in `irscope-ir` (node model, resolver,
//! printer) and `irscope-passes` (pipeline). This crate adds the
//! child enumeration report and the end-to-end inspection [`Session`].

pub mod children;
pub mod sample;
pub mod session;

pub use children::{ChildReport, ChildSymbol, enumerate_children};
pub use session::{InspectionReport, Session};
