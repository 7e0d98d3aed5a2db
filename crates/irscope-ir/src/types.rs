//! Operation names, attribute values and type interning.

use std::collections::HashMap;
use std::fmt;

use cranelift_entity::PrimaryMap;
use smallvec::SmallVec;

use crate::refs::TypeRef;
use crate::symbol::Symbol;

// ============================================================================
// OpName
// ============================================================================

/// Qualified operation name: `dialect.op`, or a bare `op` when the name
/// carries no dialect prefix.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct OpName {
    pub dialect: Option<Symbol>,
    pub name: Symbol,
}

impl OpName {
    pub fn new(dialect: impl Into<Symbol>, name: impl Into<Symbol>) -> Self {
        Self {
            dialect: Some(dialect.into()),
            name: name.into(),
        }
    }

    /// A name without a dialect prefix (e.g. `module`, `func`).
    pub fn bare(name: impl Into<Symbol>) -> Self {
        Self {
            dialect: None,
            name: name.into(),
        }
    }

    /// Split `text` at the first `.` into dialect prefix and op name.
    ///
    /// A leading or trailing dot does not count as a prefix separator.
    pub fn parse(text: &str) -> Self {
        match text.split_once('.') {
            Some((dialect, name)) if !dialect.is_empty() && !name.is_empty() => Self {
                dialect: Some(Symbol::from_dynamic(dialect)),
                name: Symbol::from_dynamic(name),
            },
            _ => Self::bare(Symbol::from_dynamic(text)),
        }
    }

    /// Check whether this is `dialect.name` (or bare `name` when `dialect`
    /// is `None`).
    pub fn is(&self, dialect: Option<&str>, name: &str) -> bool {
        let dialect_matches = match (self.dialect, dialect) {
            (None, None) => true,
            (Some(d), Some(expected)) => d == expected,
            _ => false,
        };
        dialect_matches && self.name == name
    }
}

impl fmt::Display for OpName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.dialect {
            Some(dialect) => write!(f, "{dialect}.{}", self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

// ============================================================================
// Attribute
// ============================================================================

/// Attribute values attached to operations.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Attribute {
    /// Unit/nil value.
    Unit,
    Bool(bool),
    Int(i64),
    /// Float constant stored as raw bits.
    FloatBits(u64),
    String(String),
    /// Reference to a named symbol (`@name`).
    Symbol(Symbol),
    Type(TypeRef),
    List(Vec<Attribute>),
    /// Dialect-specific payload. Only the owning dialect knows how to
    /// render it; see [`DialectRegistry`](crate::DialectRegistry).
    Opaque {
        dialect: Symbol,
        data: SmallVec<[u8; 16]>,
    },
}

impl Attribute {
    /// Short name of the attribute's value kind.
    ///
    /// Used as the rendered form when the value itself cannot be rendered.
    pub fn type_tag(&self) -> String {
        match self {
            Attribute::Unit => "unit".to_owned(),
            Attribute::Bool(_) => "bool".to_owned(),
            Attribute::Int(_) => "int".to_owned(),
            Attribute::FloatBits(_) => "float".to_owned(),
            Attribute::String(_) => "string".to_owned(),
            Attribute::Symbol(_) => "symbol".to_owned(),
            Attribute::Type(_) => "type".to_owned(),
            Attribute::List(_) => "list".to_owned(),
            Attribute::Opaque { dialect, .. } => format!("#{dialect}.opaque"),
        }
    }
}

impl From<i64> for Attribute {
    fn from(value: i64) -> Self {
        Attribute::Int(value)
    }
}

impl From<bool> for Attribute {
    fn from(value: bool) -> Self {
        Attribute::Bool(value)
    }
}

impl From<f64> for Attribute {
    fn from(value: f64) -> Self {
        Attribute::FloatBits(value.to_bits())
    }
}

impl From<Vec<Attribute>> for Attribute {
    fn from(value: Vec<Attribute>) -> Self {
        Attribute::List(value)
    }
}

impl From<Symbol> for Attribute {
    fn from(value: Symbol) -> Self {
        Attribute::Symbol(value)
    }
}

impl From<String> for Attribute {
    fn from(value: String) -> Self {
        Attribute::String(value)
    }
}

impl From<&str> for Attribute {
    fn from(value: &str) -> Self {
        Attribute::String(value.to_string())
    }
}

impl From<TypeRef> for Attribute {
    fn from(value: TypeRef) -> Self {
        Attribute::Type(value)
    }
}

// ============================================================================
// TypeData
// ============================================================================

/// Data for a single interned type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeData {
    pub dialect: Symbol,
    pub name: Symbol,
    pub params: SmallVec<[TypeRef; 4]>,
}

/// Builder for constructing `TypeData` with a fluent API.
pub struct TypeDataBuilder {
    dialect: Symbol,
    name: Symbol,
    params: SmallVec<[TypeRef; 4]>,
}

impl TypeDataBuilder {
    pub fn new(dialect: impl Into<Symbol>, name: impl Into<Symbol>) -> Self {
        Self {
            dialect: dialect.into(),
            name: name.into(),
            params: SmallVec::new(),
        }
    }

    pub fn param(mut self, ty: TypeRef) -> Self {
        self.params.push(ty);
        self
    }

    pub fn params(mut self, tys: impl IntoIterator<Item = TypeRef>) -> Self {
        self.params.extend(tys);
        self
    }

    pub fn build(self) -> TypeData {
        TypeData {
            dialect: self.dialect,
            name: self.name,
            params: self.params,
        }
    }
}

// ============================================================================
// TypeInterner
// ============================================================================

/// Deduplicating type interner. Same `TypeData` always yields the same `TypeRef`.
pub struct TypeInterner {
    types: PrimaryMap<TypeRef, TypeData>,
    dedup: HashMap<TypeData, TypeRef>,
}

impl TypeInterner {
    pub fn new() -> Self {
        Self {
            types: PrimaryMap::new(),
            dedup: HashMap::default(),
        }
    }

    /// Intern a type, returning an existing ref if the data matches.
    pub fn intern(&mut self, data: TypeData) -> TypeRef {
        if let Some(&existing) = self.dedup.get(&data) {
            return existing;
        }
        let r = self.types.push(data.clone());
        self.dedup.insert(data, r);
        r
    }

    /// Look up type data by reference.
    pub fn get(&self, r: TypeRef) -> &TypeData {
        &self.types[r]
    }

    /// Look up type data, returning `None` for refs this interner never issued.
    pub fn try_get(&self, r: TypeRef) -> Option<&TypeData> {
        self.types.get(r)
    }

    /// Check if this type matches the given dialect and name.
    pub fn is_dialect(&self, r: TypeRef, dialect: Symbol, name: Symbol) -> bool {
        let data = &self.types[r];
        data.dialect == dialect && data.name == name
    }
}

impl Default for TypeInterner {
    fn default() -> Self {
        Self::new()
    }
}
