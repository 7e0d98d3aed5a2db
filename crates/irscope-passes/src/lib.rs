//! Pass pipeline for irscope IR.
//!
//! A [`PassManager`] runs an ordered list of [`Pass`]es over a root
//! operation, stopping at the first failure. Passes can be scoped to every
//! operation of one kind below the root with
//! [`PassManager::add_nested_pass`].

pub mod canonicalize;
pub mod dce;
pub mod manager;
pub mod pass;
pub mod verify;

pub use canonicalize::{Canonicalize, CanonicalizeConfig};
pub use dce::{Dce, DceConfig, DceResult};
pub use manager::{Nested, PassManager, PipelineError};
pub use pass::{FnPass, Pass, PassFailure, pass_fn};
pub use verify::{StructureViolation, VerifyStructure};
