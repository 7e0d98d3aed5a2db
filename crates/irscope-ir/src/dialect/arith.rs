//! Integer arithmetic dialect.

use crate::context::{IrContext, OperationDataBuilder};
use crate::ops::DialectOp;
use crate::refs::{TypeRef, ValueRef};
use crate::registry::DialectRegistry;
use crate::types::{Attribute, OpName};

pub const NAMESPACE: &str = "arith";

crate::symbols! {
    ATTR_VALUE => "value",
}

crate::define_op! {
    /// Constant with a `value` attribute and one result.
    pub struct Constant => "arith"."constant";
}

crate::define_op! {
    /// Integer addition.
    pub struct AddI => "arith"."addi";
}

pub fn register(registry: &mut DialectRegistry) {
    registry.insert(NAMESPACE);
}

pub fn constant(ctx: &mut IrContext, ty: TypeRef, value: impl Into<Attribute>) -> Constant {
    let data = OperationDataBuilder::new(OpName::new(NAMESPACE, Constant::OP_NAME))
        .result(ty)
        .attr(ATTR_VALUE(), value)
        .build(ctx);
    Constant(ctx.create_op(data))
}

pub fn addi(ctx: &mut IrContext, lhs: ValueRef, rhs: ValueRef, ty: TypeRef) -> AddI {
    let data = OperationDataBuilder::new(OpName::new(NAMESPACE, AddI::OP_NAME))
        .operand(lhs)
        .operand(rhs)
        .result(ty)
        .build(ctx);
    AddI(ctx.create_op(data))
}

impl Constant {
    pub fn value(self, ctx: &IrContext) -> Option<&Attribute> {
        ctx.op(self.0).attributes.get(&ATTR_VALUE())
    }

    /// The constant's value when it is an integer.
    pub fn int_value(self, ctx: &IrContext) -> Option<i64> {
        match self.value(ctx) {
            Some(Attribute::Int(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn result(self, ctx: &IrContext) -> ValueRef {
        ctx.op_result(self.0, 0)
    }
}

// `from_op` only checks the name; a malformed `addi` yields `None` here.
impl AddI {
    /// `(lhs, rhs)` when the op has exactly two operands.
    pub fn operands(self, ctx: &IrContext) -> Option<(ValueRef, ValueRef)> {
        match *ctx.op_operands(self.0) {
            [lhs, rhs] => Some((lhs, rhs)),
            _ => None,
        }
    }

    /// The result when the op has exactly one.
    pub fn result(self, ctx: &IrContext) -> Option<ValueRef> {
        match *ctx.op_results(self.0) {
            [result] => Some(result),
            _ => None,
        }
    }
}

/// Whether `op` is free of side effects.
pub fn is_pure(ctx: &IrContext, op: crate::OpRef) -> bool {
    Constant::matches(ctx, op) || AddI::matches(ctx, op)
}
