//! Sequential, fail-fast pass pipeline.

use std::marker::PhantomData;

use derive_more::Display;
use irscope_ir::walk::collect_nested;
use irscope_ir::{DialectOp, IrContext, OpRef};
use tracing::{debug, info, warn};

use crate::pass::{Pass, PassFailure};

/// The pipeline stopped because a pass failed.
#[derive(Debug, Display)]
#[display("pass #{index} `{pass}` failed: {failure}")]
pub struct PipelineError {
    /// Position of the failing pass in the pipeline.
    pub index: usize,
    pub pass: String,
    pub failure: PassFailure,
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.failure)
    }
}

/// Ordered list of passes run against one root operation.
#[derive(Default)]
pub struct PassManager {
    passes: Vec<Box<dyn Pass>>,
}

impl PassManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a pass that runs on the root operation.
    pub fn add_pass(&mut self, pass: impl Pass + 'static) -> &mut Self {
        self.passes.push(Box::new(pass));
        self
    }

    /// Append a pass that runs on every `K` operation below the root.
    pub fn add_nested_pass<K>(&mut self, pass: impl Pass + 'static) -> &mut Self
    where
        K: DialectOp + 'static,
    {
        self.add_pass(Nested::<K, _>::new(pass))
    }

    pub fn len(&self) -> usize {
        self.passes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    /// Run every pass in order. The first failure aborts the pipeline;
    /// changes made by earlier passes are kept.
    pub fn run(&mut self, ctx: &mut IrContext, root: OpRef) -> Result<(), PipelineError> {
        info!(%root, passes = self.passes.len(), "running pass pipeline");
        for (index, pass) in self.passes.iter_mut().enumerate() {
            debug!(index, pass = pass.name(), "running pass");
            if let Err(failure) = pass.run(ctx, root) {
                warn!(index, pass = pass.name(), %failure, "pass failed");
                return Err(PipelineError {
                    index,
                    pass: pass.name().to_owned(),
                    failure,
                });
            }
        }
        Ok(())
    }
}

/// Runs `P` on each operation of kind `K` nested below the root.
///
/// Matched operations are not searched for further `K`s.
pub struct Nested<K, P> {
    pass: P,
    name: String,
    _kind: PhantomData<fn() -> K>,
}

impl<K: DialectOp, P: Pass> Nested<K, P> {
    pub fn new(pass: P) -> Self {
        let name = format!("{}({})", K::FULL_NAME, pass.name());
        Self {
            pass,
            name,
            _kind: PhantomData,
        }
    }
}

impl<K: DialectOp, P: Pass> Pass for Nested<K, P> {
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&mut self, ctx: &mut IrContext, op: OpRef) -> Result<(), PassFailure> {
        let targets = collect_nested::<K>(ctx, op);
        debug!(pass = %self.name, targets = targets.len(), "running nested pass");
        for target in targets {
            self.pass.run(ctx, target.op_ref())?;
        }
        Ok(())
    }
}
