//! Structural verification.
//!
//! Checks that back-links agree with containment and that control-flow
//! edges stay inside their region. Broken structure can only come from
//! direct edits through [`IrContext::op_mut`], so this pass is mainly a
//! guard after custom passes.

use derive_more::Display;
use irscope_ir::{BlockRef, IrContext, OpRef, RegionRef};
use tracing::debug;

use crate::pass::{Pass, PassFailure};

/// One broken structural rule.
#[derive(Clone, Debug, Display, PartialEq, Eq)]
pub enum StructureViolation {
    #[display("{region} is listed under {op} but records parent {recorded:?}")]
    RegionParent {
        op: OpRef,
        region: RegionRef,
        recorded: Option<OpRef>,
    },
    #[display("{block} is listed under {region} but records parent {recorded:?}")]
    BlockParent {
        region: RegionRef,
        block: BlockRef,
        recorded: Option<RegionRef>,
    },
    #[display("{op} is listed under {block} but records parent {recorded:?}")]
    OpParent {
        block: BlockRef,
        op: OpRef,
        recorded: Option<BlockRef>,
    },
    #[display("{op} has successors but is not the last operation of {block}")]
    SuccessorsBeforeEnd { block: BlockRef, op: OpRef },
    #[display("{op} branches to {target}, which is not in {region}")]
    SuccessorOutsideRegion {
        op: OpRef,
        target: BlockRef,
        region: RegionRef,
    },
}

/// Collect every structural violation below `root`.
pub fn verify_structure(ctx: &IrContext, root: OpRef) -> Vec<StructureViolation> {
    let mut violations = Vec::new();
    verify_op(ctx, root, &mut violations);
    violations
}

fn verify_op(ctx: &IrContext, op: OpRef, out: &mut Vec<StructureViolation>) {
    for &region in &ctx.op(op).regions {
        let recorded = ctx.region(region).parent_op;
        if recorded != Some(op) {
            out.push(StructureViolation::RegionParent {
                op,
                region,
                recorded,
            });
        }
        verify_region(ctx, region, out);
    }
}

fn verify_region(ctx: &IrContext, region: RegionRef, out: &mut Vec<StructureViolation>) {
    let blocks = &ctx.region(region).blocks;
    for &block in blocks {
        let recorded = ctx.block(block).parent_region;
        if recorded != Some(region) {
            out.push(StructureViolation::BlockParent {
                region,
                block,
                recorded,
            });
        }

        let ops = &ctx.block(block).ops;
        for (index, &op) in ops.iter().enumerate() {
            let data = ctx.op(op);
            if data.parent_block != Some(block) {
                out.push(StructureViolation::OpParent {
                    block,
                    op,
                    recorded: data.parent_block,
                });
            }
            if !data.successors.is_empty() && index + 1 != ops.len() {
                out.push(StructureViolation::SuccessorsBeforeEnd { block, op });
            }
            for &target in &data.successors {
                if !blocks.contains(&target) {
                    out.push(StructureViolation::SuccessorOutsideRegion { op, target, region });
                }
            }
            verify_op(ctx, op, out);
        }
    }
}

/// Fails when [`verify_structure`] finds anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct VerifyStructure;

impl Pass for VerifyStructure {
    fn name(&self) -> &str {
        "verify-structure"
    }

    fn run(&mut self, ctx: &mut IrContext, op: OpRef) -> Result<(), PassFailure> {
        let violations = verify_structure(ctx, op);
        if violations.is_empty() {
            return Ok(());
        }
        for violation in &violations {
            debug!(%violation, "structure violation");
        }
        let listed: Vec<String> = violations.iter().map(ToString::to_string).collect();
        Err(PassFailure::new(format!(
            "{} structure violation(s): {}",
            violations.len(),
            listed.join("; ")
        )))
    }
}
