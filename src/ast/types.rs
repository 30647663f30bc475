use std::{borrow::Cow, fmt::Display, rc::Rc};

use super::ast::retrieve_name;

/// Size and alignment of pointers and function values, in bytes.
pub const POINTER_SIZE: u64 = 8;

#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Void,
    Integer(u8),
    UnsignedInteger(u8),
    Float(u8),
    Pointer(Box<Type>),
    Array { inner: Box<Type>, length: u64 },
    Struct(Rc<StructType>),
    Union(Rc<UnionType>),
    Function(Rc<FunctionType>),
    /// A type referred to by name before (or without) being resolved.
    Anonymous(AnonymousType),
    /// An imported module used as a value; only valid left of a dot.
    Module(String),
    /// Not known yet: an inferred declaration before analysis, or the result
    /// of an expression that failed to check.
    Todo,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub ty: Type,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Field {
            name: name.into(),
            ty,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructType {
    /// Qualified name of the declaration.
    pub name: String,
    pub fields: Vec<Field>,
    /// Build-unique id. Two structs are the same type iff their ids match.
    pub id: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnionType {
    pub name: String,
    pub fields: Vec<Field>,
    pub id: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionType {
    /// Qualified function name, empty for function types written inline.
    pub name: String,
    pub parameters: Vec<Type>,
    pub names: Vec<String>,
    pub return_type: Type,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnonymousType {
    /// Qualified name the type was referred to by.
    pub name: String,
    /// Qualified aliases of the modules the name is looked up through,
    /// outermost first. Empty for local names.
    pub modules: Vec<String>,
}

impl AnonymousType {
    pub fn new(name: impl Into<String>) -> Self {
        AnonymousType {
            name: name.into(),
            modules: vec![],
        }
    }
}

/// Resolves named forward references into concrete types.
pub trait TypeResolver {
    fn resolve_anonymous(&self, anonymous: &AnonymousType) -> Option<Type>;
}

/// A resolver that knows no names, for comparing fully concrete types.
pub struct NoResolver;

impl TypeResolver for NoResolver {
    fn resolve_anonymous(&self, _anonymous: &AnonymousType) -> Option<Type> {
        None
    }
}

/// Result of the C struct layout walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub size: u64,
    pub alignment: u64,
    pub offsets: Vec<u64>,
}

/// Lays out fields given as `(size, alignment)` pairs in declaration order.
///
/// Every field is padded to its own alignment and the total is padded to
/// the largest field alignment. An alignment of zero needs no padding.
pub fn layout(fields: impl IntoIterator<Item = (u64, u64)>) -> Layout {
    let mut cursor = 0;
    let mut alignment = 0;
    let mut offsets = vec![];

    for (size, align) in fields {
        cursor += padding(cursor, align);
        offsets.push(cursor);
        cursor += size;
        alignment = alignment.max(align);
    }

    cursor += padding(cursor, alignment);

    Layout {
        size: cursor,
        alignment,
        offsets,
    }
}

fn padding(cursor: u64, align: u64) -> u64 {
    if align == 0 {
        0
    } else {
        (align - cursor % align) % align
    }
}

impl StructType {
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn layout(&self) -> Layout {
        layout(
            self.fields
                .iter()
                .map(|field| (field.ty.size_of(), field.ty.alignment_of())),
        )
    }

    pub fn offsets(&self) -> Vec<u64> {
        self.layout().offsets
    }
}

impl UnionType {
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn layout(&self) -> Layout {
        let alignment = self
            .fields
            .iter()
            .map(|field| field.ty.alignment_of())
            .max()
            .unwrap_or(0);
        let largest = self
            .fields
            .iter()
            .map(|field| field.ty.size_of())
            .max()
            .unwrap_or(0);

        Layout {
            size: largest + padding(largest, alignment),
            alignment,
            offsets: vec![0; self.fields.len()],
        }
    }
}

impl Type {
    /// Looks up a builtin primitive type by its source name.
    pub fn from_primitive(name: &str) -> Option<Type> {
        let ty = match name {
            "void" => Type::Void,
            "bool" | "i1" => Type::Integer(1),
            "i8" => Type::Integer(8),
            "i16" => Type::Integer(16),
            "i32" => Type::Integer(32),
            "i64" => Type::Integer(64),
            "u8" => Type::UnsignedInteger(8),
            "u16" => Type::UnsignedInteger(16),
            "u32" => Type::UnsignedInteger(32),
            "u64" => Type::UnsignedInteger(64),
            "f32" => Type::Float(32),
            "f64" => Type::Float(64),
            _ => return None,
        };

        Some(ty)
    }

    pub fn boolean() -> Type {
        Type::Integer(1)
    }

    pub fn pointer(inner: Type) -> Type {
        Type::Pointer(Box::new(inner))
    }

    pub fn array(inner: Type, length: u64) -> Type {
        Type::Array {
            inner: Box::new(inner),
            length,
        }
    }

    pub fn anonymous(name: impl Into<String>) -> Type {
        Type::Anonymous(AnonymousType::new(name))
    }

    /// Size in bytes.
    ///
    /// # Panics
    ///
    /// On types that have not been resolved. The analyzer resolves every
    /// type whose layout can be queried.
    pub fn size_of(&self) -> u64 {
        match self {
            Type::Void => 0,
            Type::Integer(bits) | Type::UnsignedInteger(bits) => bytes(*bits),
            Type::Float(bits) => bytes(*bits),
            Type::Pointer(_) | Type::Function(_) => POINTER_SIZE,
            Type::Array { inner, length } => inner.size_of() * length,
            Type::Struct(structure) => structure.layout().size,
            Type::Union(union) => union.layout().size,
            Type::Anonymous(_) | Type::Module(_) | Type::Todo => {
                panic!("size of unresolved type {}", self)
            }
        }
    }

    /// Alignment in bytes. Panics on unresolved types like [`Type::size_of`].
    pub fn alignment_of(&self) -> u64 {
        match self {
            Type::Void => 0,
            Type::Integer(bits) | Type::UnsignedInteger(bits) => bytes(*bits),
            Type::Float(bits) => bytes(*bits),
            Type::Pointer(_) | Type::Function(_) => POINTER_SIZE,
            Type::Array { inner, .. } => inner.alignment_of(),
            Type::Struct(structure) => structure.layout().alignment,
            Type::Union(union) => union.layout().alignment,
            Type::Anonymous(_) | Type::Module(_) | Type::Todo => {
                panic!("alignment of unresolved type {}", self)
            }
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Type::Integer(_) | Type::UnsignedInteger(_) | Type::Float(_)
        )
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, Type::Integer(_) | Type::UnsignedInteger(_))
    }

    pub fn is_pointer(&self) -> bool {
        matches!(self, Type::Pointer(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Type::Array { .. })
    }

    pub fn is_todo(&self) -> bool {
        matches!(self, Type::Todo)
    }

    /// Follows anonymous references until a concrete type or an unknown
    /// name is reached.
    pub fn unwrap_anonymous<'a>(&'a self, resolver: &dyn TypeResolver) -> Cow<'a, Type> {
        let mut current = Cow::Borrowed(self);

        while let Type::Anonymous(anonymous) = current.as_ref() {
            match resolver.resolve_anonymous(anonymous) {
                Some(resolved) if resolved != *current => current = Cow::Owned(resolved),
                _ => break,
            }
        }

        current
    }

    /// Structural equality after resolving anonymous references on both sides.
    ///
    /// Structs and unions are nominal through their ids. `Todo` is equal to
    /// everything so that one failed expression reports a single error.
    pub fn equals(&self, other: &Type, resolver: &dyn TypeResolver) -> bool {
        let first = self.unwrap_anonymous(resolver);
        let second = other.unwrap_anonymous(resolver);

        match (first.as_ref(), second.as_ref()) {
            (Type::Todo, _) | (_, Type::Todo) => true,
            (Type::Void, Type::Void) => true,
            (Type::Integer(a), Type::Integer(b)) => a == b,
            (Type::UnsignedInteger(a), Type::UnsignedInteger(b)) => a == b,
            (Type::Float(a), Type::Float(b)) => a == b,
            (Type::Pointer(a), Type::Pointer(b)) => a.equals(b, resolver),
            (
                Type::Array {
                    inner: a,
                    length: a_length,
                },
                Type::Array {
                    inner: b,
                    length: b_length,
                },
            ) => a_length == b_length && a.equals(b, resolver),
            (Type::Struct(a), Type::Struct(b)) => a.id == b.id,
            (Type::Union(a), Type::Union(b)) => a.id == b.id,
            (Type::Function(a), Type::Function(b)) => {
                a.parameters.len() == b.parameters.len()
                    && a
                        .parameters
                        .iter()
                        .zip(b.parameters.iter())
                        .all(|(a, b)| a.equals(b, resolver))
                    && a.return_type.equals(&b.return_type, resolver)
            }
            (Type::Anonymous(a), Type::Anonymous(b)) => a == b,
            (Type::Module(a), Type::Module(b)) => a == b,
            _ => false,
        }
    }
}

fn bytes(bits: u8) -> u64 {
    (bits as u64).div_ceil(8).max(1)
}

impl Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Type::Void => write!(f, "void"),
            Type::Integer(bits) => write!(f, "i{}", bits),
            Type::UnsignedInteger(bits) => write!(f, "u{}", bits),
            Type::Float(bits) => write!(f, "f{}", bits),
            Type::Pointer(inner) => write!(f, "*{}", inner),
            Type::Array { inner, length } => write!(f, "[{}]{}", length, inner),
            Type::Struct(structure) => write!(f, "{}", retrieve_name(&structure.name)),
            Type::Union(union) => write!(f, "{}", retrieve_name(&union.name)),
            Type::Function(function) => {
                let parameters = function
                    .parameters
                    .iter()
                    .map(|p| p.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "func({})", parameters)?;
                if function.return_type != Type::Void {
                    write!(f, " {}", function.return_type)?;
                }
                Ok(())
            }
            Type::Anonymous(anonymous) => {
                for module in &anonymous.modules {
                    write!(f, "{}.", retrieve_name(module))?;
                }
                write!(f, "{}", retrieve_name(&anonymous.name))
            }
            Type::Module(alias) => write!(f, "module {}", retrieve_name(alias)),
            Type::Todo => write!(f, "<TODO>"),
        }
    }
}
