//! End-to-end inspection sessions.

mod common;

use std::cell::Cell;
use std::rc::Rc;

use insta::assert_snapshot;
use irscope::Session;
use irscope::sample::sample_module;
use irscope_ir::dialect::{self, arith, builtin};
use irscope_ir::{
    BlockData, DialectOp, IrContext, OpName, OperationDataBuilder, RegionData, Symbol,
    print_structure,
};
use irscope_passes::{PassFailure, PassManager, VerifyStructure, pass_fn};

#[test]
fn sample_module_report() {
    let mut ctx = IrContext::new();
    let root = sample_module(&mut ctx);

    let report = Session::new(&mut ctx, root).run();
    assert!(report.succeeded());
    assert_eq!(report.structure_before, report.structure_after);
    assert_snapshot!(report.to_string(), @r"
    ----------print IR Structure begin----------
    op: 'module' with 0 operands, 0 results, 0 attributes, 1 regions, 0 successors
    1 nested regions:
        Region with 1 blocks:
            Block with 0 arguments, 0 successors, 1 operations
                op: 'func@main' with 0 operands, 0 results, 0 attributes, 1 regions, 0 successors
                1 nested regions:
                    Region with 0 blocks:
    ----------print IR Structure end----------
    func, namespace: null
    func_op: main


    ==========test PassManager begin==============
    PassManager run succeeded.
    op: 'module' with 0 operands, 0 results, 0 attributes, 1 regions, 0 successors
    1 nested regions:
        Region with 1 blocks:
            Block with 0 arguments, 0 successors, 1 operations
                op: 'func@main' with 0 operands, 0 results, 0 attributes, 1 regions, 0 successors
                1 nested regions:
                    Region with 0 blocks:
    ==========test PassManager end==============
    ");
}

#[test]
fn default_pipeline_folds_constants_inside_funcs() {
    let mut ctx = IrContext::new();
    let root = common::sum_module(&mut ctx);

    let report = Session::new(&mut ctx, root).run();
    assert!(report.succeeded());
    assert_snapshot!(report.structure_after, @r"
    op: 'module@calc' with 0 operands, 0 results, 0 attributes, 1 regions, 0 successors
    1 nested regions:
        Region with 1 blocks:
            Block with 0 arguments, 0 successors, 1 operations
                op: 'func@sum' with 0 operands, 0 results, 0 attributes, 1 regions, 0 successors
                1 nested regions:
                    Region with 1 blocks:
                        Block with 0 arguments, 0 successors, 2 operations
                            op: 'arith.constant' with 0 operands, 1 results, 1 attributes, 0 regions, 0 successors
                            1 attributes:
                                - {value : 5}
                            op: 'return' with 1 operands, 0 results, 0 attributes, 0 regions, 0 successors
    ");
}

#[test]
fn failing_pipeline_is_reported_and_stops() {
    let mut ctx = IrContext::new();
    let root = common::sum_module(&mut ctx);
    let before = print_structure(&ctx, root);
    let after_failure_ran = Rc::new(Cell::new(false));

    let flag = Rc::clone(&after_failure_ran);
    let mut pipeline = PassManager::new();
    pipeline
        .add_pass(VerifyStructure)
        .add_pass(pass_fn("reject", |_: &mut IrContext, _| {
            Err(PassFailure::new("rejected on purpose"))
        }))
        .add_pass(pass_fn("never", move |_: &mut IrContext, _| {
            flag.set(true);
            Ok(())
        }));

    let report = Session::new(&mut ctx, root).with_pipeline(pipeline).run();

    let err = report.outcome.as_ref().unwrap_err();
    assert_eq!(err.index, 1);
    assert_eq!(err.pass, "reject");
    assert!(!after_failure_ran.get());
    assert_eq!(report.structure_after, before);

    let text = report.to_string();
    assert!(text.contains("PassManager run failed\n"));
    assert!(!text.contains("PassManager run succeeded."));
    assert!(text.ends_with("==========test PassManager end==============\n"));
}

#[test]
fn children_report_symbol_capability() {
    let mut ctx = IrContext::new();
    let root = common::sum_module(&mut ctx);

    let report = Session::new(&mut ctx, root)
        .with_pipeline(PassManager::new())
        .run();
    let lines: Vec<String> = report.children.iter().map(ToString::to_string).collect();
    assert_eq!(lines, ["func, namespace: null\nfunc_op: sum"]);
}

#[test]
fn default_pipeline_tolerates_malformed_addi() {
    let mut ctx = IrContext::new();
    dialect::register_all(&mut ctx.dialects);
    let i32_ty = builtin::int_type(&mut ctx, 32);

    let entry = ctx.create_block(BlockData::new([]));
    let two = arith::constant(&mut ctx, i32_ty, 2i64);
    ctx.push_op(entry, two.op_ref());
    let v = two.result(&ctx);
    let data = OperationDataBuilder::new(OpName::new("arith", "addi"))
        .operand(v)
        .result(i32_ty)
        .build(&mut ctx);
    let add = ctx.create_op(data);
    ctx.push_op(entry, add);
    let sum = ctx.op_result(add, 0);
    let ret = builtin::r#return(&mut ctx, [sum]);
    ctx.push_op(entry, ret.op_ref());

    let body = ctx.create_region(RegionData::new([entry]));
    let func = builtin::func(&mut ctx, Symbol::new("bad"), body);
    let top = ctx.create_block(BlockData::new([]));
    ctx.push_op(top, func.op_ref());
    let region = ctx.create_region(RegionData::new([top]));
    let root = builtin::module(&mut ctx, None, region).op_ref();

    let report = Session::new(&mut ctx, root).run();
    assert!(report.succeeded());
    assert_eq!(report.structure_after, report.structure_before);
}
