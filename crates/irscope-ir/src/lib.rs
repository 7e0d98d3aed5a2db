//! Core IR for the irscope inspector.
//!
//! Operations nest regions, regions nest blocks, blocks nest operations.
//! Everything lives in an [`IrContext`] arena and is addressed by `Copy`
//! refs. On top of the node model this crate provides name and attribute
//! resolution, dialect namespace lookup and the indented structure printer.

// === Node model ===
pub mod context;
pub mod refs;
pub mod symbol;
pub mod types;

// === Dialects ===
pub mod dialect;
pub mod interfaces;
pub mod ops;
pub mod registry;

// === Inspection ===
pub mod namespace;
pub mod printer;
pub mod resolve;
pub mod walk;

pub use context::{
    BlockData, IrContext, OperationData, OperationDataBuilder, RegionData, Use, ValueData,
};
pub use interfaces::{SymbolKind, SymbolOp, resolve_symbol_kind, symbol_name};
pub use namespace::{NULL_NAMESPACE, namespace_of};
pub use ops::{ConversionError, DialectOp};
pub use printer::{StructureLine, StructureLines, print_structure, structure_lines, write_structure};
pub use refs::{BlockRef, OpRef, RegionRef, TypeRef, ValueDef, ValueRef};
pub use registry::{DialectInfo, DialectRegistry, OpaqueAttrPrinter};
pub use resolve::{OpDescription, RenderError, RenderedAttribute, ResolveIssue, describe_op};
pub use symbol::Symbol;
pub use types::{Attribute, OpName, TypeData, TypeDataBuilder, TypeInterner};
pub use walk::WalkAction;
