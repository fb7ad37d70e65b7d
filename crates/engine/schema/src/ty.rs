use crate::{EnumDefinition, ScalarDefinition, Schema, TypeDefinitionId};

/// A possibly wrapped reference to a named type, `[Cheese!]` is `List(NonNull(Named(Cheese)))`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Named(TypeDefinitionId),
    List(Box<Type>),
    NonNull(Box<Type>),
}

impl Type {
    pub fn non_null(self) -> Type {
        match self {
            Type::NonNull(_) => self,
            ty => Type::NonNull(Box::new(ty)),
        }
    }

    pub fn list(self) -> Type {
        Type::List(Box::new(self))
    }

    pub fn is_non_null(&self) -> bool {
        matches!(self, Type::NonNull(_))
    }

    pub fn is_nullable(&self) -> bool {
        !self.is_non_null()
    }

    /// The type without its outermost non-null wrapper.
    pub fn nullable(&self) -> &Type {
        match self {
            Type::NonNull(inner) => inner,
            ty => ty,
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self.nullable(), Type::List(_))
    }

    pub fn named_type(&self) -> TypeDefinitionId {
        match self {
            Type::Named(id) => *id,
            Type::List(inner) | Type::NonNull(inner) => inner.named_type(),
        }
    }
}

/// Output kind of a type, one variant per resolution strategy.
#[derive(Debug, Clone, Copy)]
pub enum TypeKind<'a> {
    Scalar(&'a ScalarDefinition),
    Enum(&'a EnumDefinition),
    List(&'a Type),
    NonNull(&'a Type),
    Object(TypeDefinitionId),
    Interface(TypeDefinitionId),
    Union(TypeDefinitionId),
}

pub struct DisplayType<'a> {
    pub(crate) schema: &'a Schema,
    pub(crate) ty: &'a Type,
}

impl std::fmt::Display for DisplayType<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.ty {
            Type::Named(id) => f.write_str(self.schema.type_name(*id)),
            Type::List(inner) => write!(f, "[{}]", self.schema.display_type(inner)),
            Type::NonNull(inner) => write!(f, "{}!", self.schema.display_type(inner)),
        }
    }
}
