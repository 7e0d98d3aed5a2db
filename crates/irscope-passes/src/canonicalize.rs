//! Canonicalization: local rewrite patterns applied to a fixpoint.
//!
//! Patterns are tried on every operation below the root, inner regions
//! first. An iteration that changes nothing ends the pass. Running out of
//! iterations before that is a failure.

use irscope_ir::dialect::arith::{self, AddI, Constant};
use irscope_ir::dialect::builtin;
use irscope_ir::{BlockRef, DialectOp, IrContext, OpRef, RegionRef, ValueDef, ValueRef};
use tracing::{debug, trace};

use crate::dce::is_dead;
use crate::pass::{Pass, PassFailure};

/// Configuration for [`Canonicalize`].
#[derive(Debug, Clone)]
pub struct CanonicalizeConfig {
    /// Maximum fixpoint iterations. Default: 10.
    pub max_iterations: usize,
}

impl Default for CanonicalizeConfig {
    fn default() -> Self {
        Self { max_iterations: 10 }
    }
}

/// A local rewrite. Returns `true` when `op` was changed or erased.
pub trait CanonicalizePattern {
    fn name(&self) -> &'static str;

    fn match_and_rewrite(&self, ctx: &mut IrContext, block: BlockRef, op: OpRef) -> bool;
}

/// `arith.addi` of two integer constants becomes one constant.
pub struct FoldConstantAdd;

impl CanonicalizePattern for FoldConstantAdd {
    fn name(&self) -> &'static str {
        "fold-constant-add"
    }

    fn match_and_rewrite(&self, ctx: &mut IrContext, block: BlockRef, op: OpRef) -> bool {
        let Ok(add) = AddI::from_op(ctx, op) else {
            return false;
        };
        let (Some((lhs, rhs)), Some(old)) = (add.operands(ctx), add.result(ctx)) else {
            return false;
        };
        let (Some(lhs), Some(rhs)) = (const_int(ctx, lhs), const_int(ctx, rhs)) else {
            return false;
        };
        let ty = ctx.value_ty(old);
        let Some(width) = builtin::int_width(ctx, ty) else {
            return false;
        };

        let folded = arith::constant(ctx, ty, wrap_to_width(lhs.wrapping_add(rhs), width));
        ctx.insert_op_before(block, op, folded.op_ref());
        let new = folded.result(ctx);
        ctx.replace_all_uses(old, new);
        ctx.remove_op_from_block(block, op);
        ctx.remove_op(op);
        true
    }
}

/// Sign-extend the low `width` bits of `value`.
fn wrap_to_width(value: i64, width: u32) -> i64 {
    let shift = 64 - width;
    (value << shift) >> shift
}

fn const_int(ctx: &IrContext, value: ValueRef) -> Option<i64> {
    match ctx.value_def(value) {
        ValueDef::OpResult(op, 0) => Constant::from_op(ctx, op).ok()?.int_value(ctx),
        _ => None,
    }
}

/// Pure operations without users are erased.
pub struct EraseDeadPure;

impl CanonicalizePattern for EraseDeadPure {
    fn name(&self) -> &'static str {
        "erase-dead-pure"
    }

    fn match_and_rewrite(&self, ctx: &mut IrContext, block: BlockRef, op: OpRef) -> bool {
        if !is_dead(ctx, op) {
            return false;
        }
        ctx.remove_op_from_block(block, op);
        ctx.remove_op(op);
        true
    }
}

/// Canonicalization as a pipeline pass.
pub struct Canonicalize {
    config: CanonicalizeConfig,
    patterns: Vec<Box<dyn CanonicalizePattern>>,
}

impl Canonicalize {
    pub fn new() -> Self {
        Self::with_config(CanonicalizeConfig::default())
    }

    /// Canonicalizer with the built-in patterns.
    pub fn with_config(config: CanonicalizeConfig) -> Self {
        Self {
            config,
            patterns: vec![],
        }
        .add_pattern(FoldConstantAdd)
        .add_pattern(EraseDeadPure)
    }

    pub fn add_pattern(mut self, pattern: impl CanonicalizePattern + 'static) -> Self {
        self.patterns.push(Box::new(pattern));
        self
    }

    fn run_one_iteration(&self, ctx: &mut IrContext, root: OpRef) -> usize {
        let regions: Vec<RegionRef> = ctx.op(root).regions.to_vec();
        regions
            .into_iter()
            .map(|region| self.visit_region(ctx, region))
            .sum()
    }

    fn visit_region(&self, ctx: &mut IrContext, region: RegionRef) -> usize {
        let blocks: Vec<BlockRef> = ctx.region(region).blocks.to_vec();
        blocks
            .into_iter()
            .map(|block| self.visit_block(ctx, block))
            .sum()
    }

    fn visit_block(&self, ctx: &mut IrContext, block: BlockRef) -> usize {
        let mut changes = 0;
        let ops: Vec<OpRef> = ctx.block(block).ops.to_vec();
        for op in ops {
            // erased earlier in this iteration
            if ctx.op(op).parent_block != Some(block) {
                continue;
            }
            let regions: Vec<RegionRef> = ctx.op(op).regions.to_vec();
            for region in regions {
                changes += self.visit_region(ctx, region);
            }
            for pattern in &self.patterns {
                if pattern.match_and_rewrite(ctx, block, op) {
                    trace!(%op, pattern = pattern.name(), "applied");
                    changes += 1;
                    break;
                }
            }
        }
        changes
    }
}

impl Default for Canonicalize {
    fn default() -> Self {
        Self::new()
    }
}

impl Pass for Canonicalize {
    fn name(&self) -> &str {
        "canonicalize"
    }

    fn run(&mut self, ctx: &mut IrContext, op: OpRef) -> Result<(), PassFailure> {
        let mut total_changes = 0;
        for iteration in 1..=self.config.max_iterations {
            let changes = self.run_one_iteration(ctx, op);
            total_changes += changes;
            if changes == 0 {
                debug!(%op, iterations = iteration, total_changes, "canonicalize reached fixpoint");
                return Ok(());
            }
        }
        Err(PassFailure::new(format!(
            "canonicalize did not converge within {} iterations",
            self.config.max_iterations
        )))
    }
}
