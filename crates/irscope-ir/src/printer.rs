//! Indented structural dump of an operation tree.
//!
//! The dump is produced as a stream of [`StructureLine`]s by
//! [`structure_lines`], which walks the tree depth-first with an explicit
//! work stack. Each operation prints a summary line, then its attributes and
//! nested regions one level deeper:
//!
//! ```text
//! op: 'module' with 0 operands, 0 results, 0 attributes, 1 regions, 0 successors
//! 1 nested regions:
//!     Region with 1 blocks:
//!         Block with 0 arguments, 0 successors, 1 operations
//!             op: 'func@main' with 0 operands, 0 results, 0 attributes, 1 regions, 0 successors
//!             1 nested regions:
//!                 Region with 0 blocks:
//! ```

use std::fmt::{self, Write};

use crate::context::IrContext;
use crate::refs::{BlockRef, OpRef, RegionRef};
use crate::resolve::describe_op;
use crate::symbol::Symbol;

/// One indentation level.
pub const INDENT_UNIT: &str = "    ";

/// A single line of the structural dump.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StructureLine {
    Op {
        indent: usize,
        /// Qualified name, with `@symbol` appended when resolved.
        label: String,
        operands: usize,
        results: usize,
        attributes: usize,
        regions: usize,
        successors: usize,
    },
    AttributesHeader {
        indent: usize,
        count: usize,
    },
    Attribute {
        indent: usize,
        key: Symbol,
        value: String,
    },
    RegionsHeader {
        indent: usize,
        count: usize,
    },
    Region {
        indent: usize,
        blocks: usize,
    },
    Block {
        indent: usize,
        arguments: usize,
        successors: usize,
        operations: usize,
    },
}

impl StructureLine {
    pub fn indent(&self) -> usize {
        match *self {
            StructureLine::Op { indent, .. }
            | StructureLine::AttributesHeader { indent, .. }
            | StructureLine::Attribute { indent, .. }
            | StructureLine::RegionsHeader { indent, .. }
            | StructureLine::Region { indent, .. }
            | StructureLine::Block { indent, .. } => indent,
        }
    }
}

impl fmt::Display for StructureLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for _ in 0..self.indent() {
            f.write_str(INDENT_UNIT)?;
        }
        match self {
            StructureLine::Op {
                label,
                operands,
                results,
                attributes,
                regions,
                successors,
                ..
            } => write!(
                f,
                "op: '{label}' with {operands} operands, {results} results, \
                 {attributes} attributes, {regions} regions, {successors} successors"
            ),
            StructureLine::AttributesHeader { count, .. } => write!(f, "{count} attributes:"),
            StructureLine::Attribute { key, value, .. } => write!(f, "- {{{key} : {value}}}"),
            StructureLine::RegionsHeader { count, .. } => write!(f, "{count} nested regions:"),
            StructureLine::Region { blocks, .. } => write!(f, "Region with {blocks} blocks:"),
            StructureLine::Block {
                arguments,
                successors,
                operations,
                ..
            } => write!(
                f,
                "Block with {arguments} arguments, {successors} successors, {operations} operations"
            ),
        }
    }
}

enum Work {
    Op(OpRef, usize),
    Region(RegionRef, usize),
    Block(BlockRef, usize),
    Line(StructureLine),
}

/// Lazy depth-first iterator over the dump of one operation tree.
pub struct StructureLines<'a> {
    ctx: &'a IrContext,
    stack: Vec<Work>,
}

/// Iterate the dump of `op`, with its summary line at `indent` levels.
pub fn structure_lines(ctx: &IrContext, op: OpRef, indent: usize) -> StructureLines<'_> {
    StructureLines {
        ctx,
        stack: vec![Work::Op(op, indent)],
    }
}

impl StructureLines<'_> {
    fn expand_op(&mut self, op: OpRef, indent: usize) -> StructureLine {
        let ctx = self.ctx;
        let data = ctx.op(op);
        let desc = describe_op(ctx, op);

        // Pushed in reverse: attributes come out before regions.
        for &region in data.regions.iter().rev() {
            self.stack.push(Work::Region(region, indent + 1));
        }
        if !data.regions.is_empty() {
            self.stack.push(Work::Line(StructureLine::RegionsHeader {
                indent,
                count: data.regions.len(),
            }));
        }
        let attributes = desc.attributes.len();
        let label = desc.label();
        for attr in desc.attributes.into_iter().rev() {
            self.stack.push(Work::Line(StructureLine::Attribute {
                indent: indent + 1,
                key: attr.key,
                value: attr.value,
            }));
        }
        if attributes > 0 {
            self.stack.push(Work::Line(StructureLine::AttributesHeader {
                indent,
                count: attributes,
            }));
        }

        StructureLine::Op {
            indent,
            label,
            operands: ctx.op_operands(op).len(),
            results: ctx.op_results(op).len(),
            attributes,
            regions: data.regions.len(),
            successors: data.successors.len(),
        }
    }

    fn expand_region(&mut self, region: RegionRef, indent: usize) -> StructureLine {
        let ctx = self.ctx;
        let blocks = &ctx.region(region).blocks;
        self.stack
            .extend(blocks.iter().rev().map(|&b| Work::Block(b, indent + 1)));
        StructureLine::Region {
            indent,
            blocks: blocks.len(),
        }
    }

    fn expand_block(&mut self, block: BlockRef, indent: usize) -> StructureLine {
        let ctx = self.ctx;
        let data = ctx.block(block);
        self.stack
            .extend(data.ops.iter().rev().map(|&op| Work::Op(op, indent + 1)));
        StructureLine::Block {
            indent,
            arguments: ctx.block_args(block).len(),
            successors: ctx.block_successors(block).len(),
            operations: data.ops.len(),
        }
    }
}

impl Iterator for StructureLines<'_> {
    type Item = StructureLine;

    fn next(&mut self) -> Option<StructureLine> {
        let line = match self.stack.pop()? {
            Work::Op(op, indent) => self.expand_op(op, indent),
            Work::Region(region, indent) => self.expand_region(region, indent),
            Work::Block(block, indent) => self.expand_block(block, indent),
            Work::Line(line) => line,
        };
        Some(line)
    }
}

/// Write the dump of `op` to `out`, one line per [`StructureLine`].
pub fn write_structure(
    ctx: &IrContext,
    op: OpRef,
    indent: usize,
    out: &mut impl Write,
) -> fmt::Result {
    for line in structure_lines(ctx, op, indent) {
        writeln!(out, "{line}")?;
    }
    Ok(())
}

/// Render the dump of `op` starting at indent level zero.
pub fn print_structure(ctx: &IrContext, op: OpRef) -> String {
    let mut out = String::new();
    write_structure(ctx, op, 0, &mut out).expect("fmt::Write to String never fails");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{BlockData, OperationDataBuilder, RegionData};
    use crate::dialect::{self, arith, builtin, cf};
    use crate::ops::DialectOp;
    use crate::types::{Attribute, OpName};
    use insta::assert_snapshot;

    /// `module { func @main() {} }` with an empty function body region.
    fn main_module(ctx: &mut IrContext) -> OpRef {
        let func_body = ctx.create_region(RegionData::new([]));
        let main = builtin::func(ctx, Symbol::new("main"), func_body);
        let block = ctx.create_block(BlockData::new([]));
        ctx.push_op(block, main.op_ref());
        let body = ctx.create_region(RegionData::new([block]));
        builtin::module(ctx, None, body).op_ref()
    }

    #[test]
    fn prints_module_with_main() {
        let mut ctx = IrContext::new();
        let module = main_module(&mut ctx);

        assert_snapshot!(print_structure(&ctx, module), @r"
        op: 'module' with 0 operands, 0 results, 0 attributes, 1 regions, 0 successors
        1 nested regions:
            Region with 1 blocks:
                Block with 0 arguments, 0 successors, 1 operations
                    op: 'func@main' with 0 operands, 0 results, 0 attributes, 1 regions, 0 successors
                    1 nested regions:
                        Region with 0 blocks:
        ");
    }

    #[test]
    fn prints_attributes_and_successors() {
        let mut ctx = IrContext::new();
        dialect::register_all(&mut ctx.dialects);
        let i32_ty = builtin::int_type(&mut ctx, 32);

        let exit = ctx.create_block(BlockData::new([i32_ty]));
        let arg = ctx.block_arg(exit, 0);
        let ret = builtin::r#return(&mut ctx, [arg]);
        ctx.push_op(exit, ret.op_ref());

        let entry = ctx.create_block(BlockData::new([]));
        let c = arith::constant(&mut ctx, i32_ty, 7i64);
        ctx.push_op(entry, c.op_ref());
        let v = c.result(&ctx);
        let br = cf::br(&mut ctx, exit, [v]);
        ctx.push_op(entry, br.op_ref());

        let body = ctx.create_region(RegionData::new([entry, exit]));
        let f = builtin::func(&mut ctx, Symbol::new("seven"), body);

        assert_snapshot!(print_structure(&ctx, f.op_ref()), @r"
        op: 'func@seven' with 0 operands, 0 results, 0 attributes, 1 regions, 0 successors
        1 nested regions:
            Region with 2 blocks:
                Block with 0 arguments, 1 successors, 2 operations
                    op: 'arith.constant' with 0 operands, 1 results, 1 attributes, 0 regions, 0 successors
                    1 attributes:
                        - {value : 7}
                    op: 'cf.br' with 1 operands, 0 results, 0 attributes, 0 regions, 1 successors
                Block with 1 arguments, 0 successors, 1 operations
                    op: 'return' with 1 operands, 0 results, 0 attributes, 0 regions, 0 successors
        ");
    }

    #[test]
    fn printing_is_deterministic() {
        let mut ctx = IrContext::new();
        let module = main_module(&mut ctx);
        assert_eq!(print_structure(&ctx, module), print_structure(&ctx, module));
    }

    #[test]
    fn no_regions_header_without_regions() {
        let mut ctx = IrContext::new();
        let data = OperationDataBuilder::new(OpName::new("test", "leaf")).build(&mut ctx);
        let op = ctx.create_op(data);

        let out = print_structure(&ctx, op);
        assert!(!out.contains("nested regions"));
        assert_eq!(out.lines().count(), 1);
    }

    #[test]
    fn empty_block_prints_only_header() {
        let mut ctx = IrContext::new();
        let block = ctx.create_block(BlockData::new([]));
        let region = ctx.create_region(RegionData::new([block]));
        let m = builtin::module(&mut ctx, Some(Symbol::new("m")), region);

        let lines: Vec<_> = structure_lines(&ctx, m.op_ref(), 0).collect();
        assert_eq!(
            lines.last(),
            Some(&StructureLine::Block {
                indent: 2,
                arguments: 0,
                successors: 0,
                operations: 0,
            })
        );
    }

    #[test]
    fn indent_grows_one_unit_per_level() {
        let mut ctx = IrContext::new();
        let module = main_module(&mut ctx);

        let lines: Vec<_> = structure_lines(&ctx, module, 1).collect();
        let depth_of = |pred: fn(&StructureLine) -> bool| {
            lines.iter().filter(|l| pred(l)).map(|l| l.indent()).collect::<Vec<_>>()
        };
        assert_eq!(depth_of(|l| matches!(l, StructureLine::Op { .. })), [1, 4]);
        assert_eq!(depth_of(|l| matches!(l, StructureLine::Region { .. })), [2, 5]);
        assert_eq!(depth_of(|l| matches!(l, StructureLine::Block { .. })), [3]);

        for line in &lines {
            let text = line.to_string();
            let expected = INDENT_UNIT.repeat(line.indent());
            assert!(text.starts_with(&expected));
            assert!(!text[expected.len()..].starts_with(' '));
        }
    }

    #[test]
    fn attribute_count_matches_listed_attributes() {
        let mut ctx = IrContext::new();
        let data = OperationDataBuilder::new(OpName::new("test", "attrs"))
            .attr("b", true)
            .attr("s", "x")
            .attr("l", vec![Attribute::Int(1), Attribute::Int(2)])
            .build(&mut ctx);
        let op = ctx.create_op(data);

        let lines: Vec<_> = structure_lines(&ctx, op, 0).collect();
        let StructureLine::Op { attributes, .. } = &lines[0] else {
            panic!("first line must be the op summary");
        };
        let listed = lines
            .iter()
            .filter(|l| matches!(l, StructureLine::Attribute { .. }))
            .count();
        assert_eq!(*attributes, 3);
        assert_eq!(listed, 3);
        assert_eq!(lines[1], StructureLine::AttributesHeader { indent: 0, count: 3 });
        assert_eq!(lines[4].to_string(), "    - {l : [1, 2]}");
    }

    #[test]
    fn unrenderable_attribute_prints_type_tag() {
        let mut ctx = IrContext::new();
        let data = OperationDataBuilder::new(OpName::new("llvm", "thing"))
            .attr("blob", dialect::test::opaque(b"x"))
            .build(&mut ctx);
        let op = ctx.create_op(data);

        let out = print_structure(&ctx, op);
        assert!(out.contains("- {blob : #test.opaque}"), "{out}");
    }

    #[test]
    fn reprint_sees_mutation() {
        let mut ctx = IrContext::new();
        let module = main_module(&mut ctx);
        let before = print_structure(&ctx, module);

        let block = ctx.region(ctx.op(module).regions[0]).blocks[0];
        let extra = dialect::test::op(&mut ctx);
        ctx.push_op(block, extra.op_ref());

        let after = print_structure(&ctx, module);
        assert_ne!(before, after);
        assert!(after.contains("Block with 0 arguments, 0 successors, 2 operations"));
    }
}
