use crate::{FieldDefinition, Schema, TypeDefinition};

macro_rules! id_newtypes {
    ($($name:ident => $field:ident[$output:ty],)*) => {
        $(
            #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
            pub struct $name(u32);

            impl From<usize> for $name {
                fn from(index: usize) -> Self {
                    Self(index as u32)
                }
            }

            impl From<$name> for usize {
                fn from(id: $name) -> usize {
                    id.0 as usize
                }
            }

            impl std::fmt::Debug for $name {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    write!(f, "{}#{}", stringify!($name), self.0)
                }
            }

            impl std::ops::Index<$name> for Schema {
                type Output = $output;

                fn index(&self, id: $name) -> &Self::Output {
                    &self.$field[usize::from(id)]
                }
            }
        )*
    };
}

id_newtypes! {
    TypeDefinitionId => types[TypeDefinition],
    FieldDefinitionId => fields[FieldDefinition],
}
