//! End-to-end inspection: dump, enumerate, run the pipeline, dump again.

use std::fmt;

use irscope_ir::dialect::builtin::Func;
use irscope_ir::{IrContext, OpRef, print_structure};
use irscope_passes::{Canonicalize, PassManager, PipelineError};
use tracing::{error, info};

use crate::children::{ChildReport, enumerate_children};

const STRUCTURE_BEGIN: &str = "----------print IR Structure begin----------";
const STRUCTURE_END: &str = "----------print IR Structure end----------";
const PIPELINE_BEGIN: &str = "==========test PassManager begin==============";
const PIPELINE_END: &str = "==========test PassManager end==============";
const PIPELINE_OK: &str = "PassManager run succeeded.";
const PIPELINE_FAILED: &str = "PassManager run failed";

/// One inspection run over a root operation.
pub struct Session<'a> {
    ctx: &'a mut IrContext,
    root: OpRef,
    pipeline: PassManager,
}

impl<'a> Session<'a> {
    /// A session with the default pipeline: canonicalize every `func`.
    pub fn new(ctx: &'a mut IrContext, root: OpRef) -> Self {
        Self {
            ctx,
            root,
            pipeline: default_pipeline(),
        }
    }

    pub fn with_pipeline(mut self, pipeline: PassManager) -> Self {
        self.pipeline = pipeline;
        self
    }

    pub fn run(mut self) -> InspectionReport {
        let structure_before = print_structure(self.ctx, self.root);
        let children = enumerate_children(self.ctx, self.root);

        let outcome = self.pipeline.run(self.ctx, self.root);
        match &outcome {
            Ok(()) => info!(root = %self.root, "pipeline succeeded"),
            Err(err) => error!(root = %self.root, %err, "pipeline failed"),
        }

        InspectionReport {
            structure_before,
            children,
            outcome,
            structure_after: print_structure(self.ctx, self.root),
        }
    }
}

/// The pipeline run by [`Session::new`].
pub fn default_pipeline() -> PassManager {
    let mut pm = PassManager::new();
    pm.add_nested_pass::<Func>(Canonicalize::new());
    pm
}

/// Everything a [`Session`] produced.
#[derive(Debug)]
pub struct InspectionReport {
    pub structure_before: String,
    pub children: Vec<ChildReport>,
    pub outcome: Result<(), PipelineError>,
    pub structure_after: String,
}

impl InspectionReport {
    pub fn succeeded(&self) -> bool {
        self.outcome.is_ok()
    }
}

impl fmt::Display for InspectionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{STRUCTURE_BEGIN}")?;
        f.write_str(&self.structure_before)?;
        writeln!(f, "{STRUCTURE_END}")?;
        for child in &self.children {
            writeln!(f, "{child}")?;
        }
        writeln!(f)?;
        writeln!(f)?;
        writeln!(f, "{PIPELINE_BEGIN}")?;
        match &self.outcome {
            Ok(()) => writeln!(f, "{PIPELINE_OK}")?,
            Err(_) => writeln!(f, "{PIPELINE_FAILED}")?,
        }
        f.write_str(&self.structure_after)?;
        writeln!(f, "{PIPELINE_END}")
    }
}
