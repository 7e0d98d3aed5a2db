//! Attribute and name resolution for a single operation.
//!
//! Resolution never fails as a whole. Problems are collected as
//! [`ResolveIssue`]s on the returned [`OpDescription`] and the affected
//! piece falls back to a placeholder.

use std::fmt::{self, Write};

use derive_more::{Display, From};
use tracing::debug;

use crate::context::IrContext;
use crate::interfaces::{SymbolKind, symbol_name};
use crate::namespace::namespace_of;
use crate::refs::{OpRef, TypeRef};
use crate::symbol::Symbol;
use crate::types::Attribute;

/// Why an attribute value could not be rendered.
#[derive(Clone, Debug, Display, From, PartialEq, Eq)]
pub enum RenderError {
    #[display("type {_0} is not interned in this context")]
    #[from(ignore)]
    UnknownType(TypeRef),
    #[display("dialect `{_0}` is not registered")]
    #[from(ignore)]
    UnregisteredDialect(Symbol),
    #[display("dialect `{_0}` has no printer for opaque attributes")]
    #[from(ignore)]
    NoOpaquePrinter(Symbol),
    #[display("dialect `{_0}` rejected the attribute payload")]
    #[from(ignore)]
    RejectedPayload(Symbol),
    #[display("{_0}")]
    Fmt(fmt::Error),
}

impl std::error::Error for RenderError {}

/// Non-fatal problem found while describing an operation.
#[derive(Clone, Debug, Display, PartialEq, Eq)]
pub enum ResolveIssue {
    #[display("{op}: {kind} op has no symbol name")]
    UnresolvedSymbol { op: OpRef, kind: SymbolKind },
    #[display("attribute `{key}` rendered as `{tag}`: {reason}")]
    UnrenderableAttribute {
        key: Symbol,
        tag: String,
        reason: RenderError,
    },
}

/// One attribute with its rendered value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedAttribute {
    pub key: Symbol,
    pub value: String,
}

/// Everything the printer needs to know about one operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OpDescription {
    /// `dialect.op` or bare `op`, exactly as the op is named.
    pub qualified_name: String,
    pub namespace: String,
    /// Symbol name, when the op is symbol-capable and carries one.
    pub display_name: Option<Symbol>,
    pub attributes: Vec<RenderedAttribute>,
    pub issues: Vec<ResolveIssue>,
}

impl OpDescription {
    /// `<qualified_name>` with `@<display_name>` appended when present.
    pub fn label(&self) -> String {
        match self.display_name {
            Some(name) => format!("{}@{name}", self.qualified_name),
            None => self.qualified_name.clone(),
        }
    }
}

/// Resolve names and render attributes of `op`.
pub fn describe_op(ctx: &IrContext, op: OpRef) -> OpDescription {
    let data = ctx.op(op);
    let mut issues = Vec::new();

    let display_name = match symbol_name(ctx, op) {
        Some((_, Some(name))) => Some(name),
        Some((kind, None)) => {
            issues.push(ResolveIssue::UnresolvedSymbol { op, kind });
            None
        }
        None => None,
    };

    let attributes = data
        .attributes
        .iter()
        .map(|(&key, attr)| {
            let value = match render_attribute(ctx, attr) {
                Ok(text) => text,
                Err(reason) => {
                    let tag = attr.type_tag();
                    issues.push(ResolveIssue::UnrenderableAttribute {
                        key,
                        tag: tag.clone(),
                        reason,
                    });
                    tag
                }
            };
            RenderedAttribute { key, value }
        })
        .collect();

    for issue in &issues {
        debug!(%op, %issue, "resolve issue");
    }

    OpDescription {
        qualified_name: data.name.to_string(),
        namespace: namespace_of(ctx, op),
        display_name,
        attributes,
        issues,
    }
}

/// Render an attribute value to text.
pub fn render_attribute(ctx: &IrContext, attr: &Attribute) -> Result<String, RenderError> {
    let mut out = String::new();
    write_attribute(ctx, &mut out, attr)?;
    Ok(out)
}

fn write_attribute(ctx: &IrContext, f: &mut String, attr: &Attribute) -> Result<(), RenderError> {
    match attr {
        Attribute::Unit => f.write_str("unit")?,
        Attribute::Bool(b) => write!(f, "{b}")?,
        Attribute::Int(v) => write!(f, "{v}")?,
        Attribute::FloatBits(bits) => {
            let v = f64::from_bits(*bits);
            let s = format!("{v}");
            f.write_str(&s)?;
            // inf/NaN stay as they are
            if v.is_finite() && !s.contains(['.', 'e', 'E']) {
                f.write_str(".0")?;
            }
        }
        Attribute::String(s) => {
            f.write_char('"')?;
            write_escaped_string(f, s)?;
            f.write_char('"')?;
        }
        Attribute::Symbol(sym) => write_symbol(f, *sym)?,
        Attribute::Type(ty) => write_type(ctx, f, *ty)?,
        Attribute::List(list) => {
            f.write_char('[')?;
            for (i, item) in list.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write_attribute(ctx, f, item)?;
            }
            f.write_char(']')?;
        }
        Attribute::Opaque { dialect, data } => {
            let info = ctx
                .dialects
                .get(*dialect)
                .ok_or(RenderError::UnregisteredDialect(*dialect))?;
            let printer = info
                .opaque_printer
                .ok_or(RenderError::NoOpaquePrinter(*dialect))?;
            let text = printer(data).ok_or(RenderError::RejectedPayload(*dialect))?;
            f.write_str(&text)?;
        }
    }
    Ok(())
}

fn write_type(ctx: &IrContext, f: &mut String, ty: TypeRef) -> Result<(), RenderError> {
    let data = ctx.types.try_get(ty).ok_or(RenderError::UnknownType(ty))?;
    write!(f, "{}.{}", data.dialect, data.name)?;
    if !data.params.is_empty() {
        f.write_char('(')?;
        for (i, &param) in data.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write_type(ctx, f, param)?;
        }
        f.write_char(')')?;
    }
    Ok(())
}

fn write_escaped_string(f: &mut impl Write, s: &str) -> fmt::Result {
    for ch in s.chars() {
        match ch {
            '\\' => f.write_str("\\\\")?,
            '"' => f.write_str("\\\"")?,
            '\n' => f.write_str("\\n")?,
            '\t' => f.write_str("\\t")?,
            '\r' => f.write_str("\\r")?,
            c if c.is_control() => write!(f, "\\x{:02x}", c as u32)?,
            c => f.write_char(c)?,
        }
    }
    Ok(())
}

fn write_symbol(f: &mut impl Write, sym: Symbol) -> fmt::Result {
    sym.with_str(|s| {
        let bare = !s.is_empty() && s.chars().all(|c| c.is_alphanumeric() || c == '_');
        if bare {
            write!(f, "@{s}")
        } else {
            f.write_str("@\"")?;
            write_escaped_string(f, s)?;
            f.write_char('"')
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{OperationDataBuilder, RegionData};
    use crate::dialect::{self, builtin, test as test_dialect};
    use crate::types::{OpName, TypeDataBuilder};
    use cranelift_entity::EntityRef;
    use crate::ops::DialectOp;

    fn ctx_with_dialects() -> IrContext {
        let mut ctx = IrContext::new();
        dialect::register_all(&mut ctx.dialects);
        ctx
    }

    #[test]
    fn renders_scalar_attributes() {
        let ctx = IrContext::new();
        let cases = [
            (Attribute::Unit, "unit"),
            (Attribute::Bool(true), "true"),
            (Attribute::Int(-3), "-3"),
            (Attribute::from(2.0f64), "2.0"),
            (Attribute::from(0.5f64), "0.5"),
            (Attribute::from("a\"b\n"), r#""a\"b\n""#),
            (Attribute::Symbol(Symbol::new("main")), "@main"),
            (Attribute::Symbol(Symbol::new("a b")), r#"@"a b""#),
        ];
        for (attr, expected) in cases {
            assert_eq!(render_attribute(&ctx, &attr).unwrap(), expected);
        }
    }

    #[test]
    fn renders_types_and_lists() {
        let mut ctx = IrContext::new();
        let i32_ty = builtin::int_type(&mut ctx, 32);
        let ptr = ctx
            .types
            .intern(TypeDataBuilder::new("core", "ptr").param(i32_ty).build());
        let attr = Attribute::List(vec![Attribute::Type(ptr), Attribute::Int(1)]);
        assert_eq!(render_attribute(&ctx, &attr).unwrap(), "[core.ptr(core.i32), 1]");
    }

    #[test]
    fn opaque_attributes_need_a_printer() {
        let ctx = ctx_with_dialects();
        assert_eq!(
            render_attribute(&ctx, &test_dialect::opaque(b"hello")).unwrap(),
            "#test<hello>"
        );
        assert_eq!(
            render_attribute(&ctx, &test_dialect::opaque(&[0xff])),
            Err(RenderError::RejectedPayload(Symbol::new("test")))
        );

        let arith_opaque = Attribute::Opaque {
            dialect: Symbol::new("arith"),
            data: Default::default(),
        };
        assert_eq!(
            render_attribute(&ctx, &arith_opaque),
            Err(RenderError::NoOpaquePrinter(Symbol::new("arith")))
        );

        let unknown = Attribute::Opaque {
            dialect: Symbol::new("llvm"),
            data: Default::default(),
        };
        assert_eq!(
            render_attribute(&ctx, &unknown),
            Err(RenderError::UnregisteredDialect(Symbol::new("llvm")))
        );
    }

    #[test]
    fn failed_attribute_falls_back_to_type_tag() {
        let mut ctx = ctx_with_dialects();
        let data = OperationDataBuilder::new(OpName::new("test", "op"))
            .attr("ok", 1i64)
            .attr("bad", test_dialect::opaque(&[0xff]))
            .attr("ty", TypeRef::new(99))
            .build(&mut ctx);
        let op = ctx.create_op(data);

        let desc = describe_op(&ctx, op);
        let values: Vec<_> = desc.attributes.iter().map(|a| a.value.as_str()).collect();
        assert_eq!(values, ["1", "#test.opaque", "type"]);
        assert_eq!(desc.issues.len(), 2);
        assert_eq!(
            desc.issues[0].to_string(),
            "attribute `bad` rendered as `#test.opaque`: dialect `test` rejected the attribute payload"
        );
        assert_eq!(desc.namespace, "test");
        assert_eq!(desc.label(), "test.op");
    }

    #[test]
    fn symbol_capable_ops_get_display_name() {
        let mut ctx = ctx_with_dialects();
        let r1 = ctx.create_region(RegionData::new([]));
        let f = builtin::func(&mut ctx, Symbol::new("main"), r1);
        let r2 = ctx.create_region(RegionData::new([]));
        let m = builtin::module(&mut ctx, None, r2);

        let func_desc = describe_op(&ctx, f.op_ref());
        assert_eq!(func_desc.label(), "func@main");
        assert_eq!(func_desc.namespace, "null");
        assert!(func_desc.issues.is_empty());

        let module_desc = describe_op(&ctx, m.op_ref());
        assert_eq!(module_desc.display_name, None);
        assert_eq!(module_desc.label(), "module");
        assert!(matches!(
            module_desc.issues.as_slice(),
            [ResolveIssue::UnresolvedSymbol { kind: SymbolKind::Module, .. }]
        ));
    }
}
