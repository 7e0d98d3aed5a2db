//! Typed operation wrappers.
//!
//! A dialect op wrapper is a `Copy` newtype over [`OpRef`] that is only
//! constructed after checking the operation's name, so holding one proves the
//! kind of the underlying operation.

use derive_more::Display;

use crate::context::IrContext;
use crate::refs::OpRef;

/// Error returned when an operation is not of the requested kind.
#[derive(Clone, Debug, Display, PartialEq, Eq)]
pub enum ConversionError {
    #[display("expected `{expected}`, found `{actual}`")]
    WrongOperation { expected: &'static str, actual: String },
}

impl std::error::Error for ConversionError {}

/// Trait for typed dialect operation wrappers.
pub trait DialectOp: Sized + Copy {
    /// Dialect prefix, or `None` for bare operation names.
    const DIALECT_NAME: Option<&'static str>;
    const OP_NAME: &'static str;
    /// Name as written in IR (`dialect.op` or bare `op`).
    const FULL_NAME: &'static str;

    fn from_op(ctx: &IrContext, op: OpRef) -> Result<Self, ConversionError>;
    fn op_ref(&self) -> OpRef;

    fn matches(ctx: &IrContext, op: OpRef) -> bool {
        ctx.op(op).name.is(Self::DIALECT_NAME, Self::OP_NAME)
    }
}

/// Define a typed wrapper for one operation kind.
///
/// ```
/// irscope_ir::define_op! {
///     /// `test.print`
///     pub struct Print => "test"."print";
/// }
/// irscope_ir::define_op! {
///     pub struct Yield => "yield";
/// }
/// use irscope_ir::DialectOp;
/// assert_eq!(Print::FULL_NAME, "test.print");
/// assert_eq!(Yield::DIALECT_NAME, None);
/// ```
#[macro_export]
macro_rules! define_op {
    (@impl $(#[$meta:meta])* $vis:vis $ty:ident, $dialect:expr, $op:literal, $full:expr) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        $vis struct $ty($crate::OpRef);

        impl $crate::DialectOp for $ty {
            const DIALECT_NAME: Option<&'static str> = $dialect;
            const OP_NAME: &'static str = $op;
            const FULL_NAME: &'static str = $full;

            fn from_op(
                ctx: &$crate::IrContext,
                op: $crate::OpRef,
            ) -> Result<Self, $crate::ConversionError> {
                if <Self as $crate::DialectOp>::matches(ctx, op) {
                    Ok(Self(op))
                } else {
                    Err($crate::ConversionError::WrongOperation {
                        expected: $full,
                        actual: ctx.op(op).name.to_string(),
                    })
                }
            }

            fn op_ref(&self) -> $crate::OpRef {
                self.0
            }
        }
    };
    ($(#[$meta:meta])* $vis:vis struct $ty:ident => $dialect:literal . $op:literal;) => {
        $crate::define_op!(@impl $(#[$meta])* $vis $ty, Some($dialect), $op, concat!($dialect, ".", $op));
    };
    ($(#[$meta:meta])* $vis:vis struct $ty:ident => $op:literal;) => {
        $crate::define_op!(@impl $(#[$meta])* $vis $ty, None, $op, $op);
    };
}
