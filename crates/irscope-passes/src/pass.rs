//! The pass contract.

use derive_more::Display;
use irscope_ir::{IrContext, OpRef};

/// Why a pass could not complete.
#[derive(Clone, Debug, Display, PartialEq, Eq)]
#[display("{message}")]
pub struct PassFailure {
    message: String,
}

impl PassFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::error::Error for PassFailure {}

/// A transformation over the tree rooted at one operation.
///
/// A pass may mutate anything below `op`, but `op` itself stays the root.
pub trait Pass {
    /// Name used in logs and in [`PipelineError`](crate::PipelineError).
    fn name(&self) -> &str;

    fn run(&mut self, ctx: &mut IrContext, op: OpRef) -> Result<(), PassFailure>;
}

/// A pass backed by a closure. See [`pass_fn`].
pub struct FnPass<F> {
    name: String,
    f: F,
}

/// Wrap a closure as a named pass.
pub fn pass_fn<F>(name: impl Into<String>, f: F) -> FnPass<F>
where
    F: FnMut(&mut IrContext, OpRef) -> Result<(), PassFailure>,
{
    FnPass {
        name: name.into(),
        f,
    }
}

impl<F> Pass for FnPass<F>
where
    F: FnMut(&mut IrContext, OpRef) -> Result<(), PassFailure>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&mut self, ctx: &mut IrContext, op: OpRef) -> Result<(), PassFailure> {
        (self.f)(ctx, op)
    }
}
