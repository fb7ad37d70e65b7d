mod error;

use async_graphql_parser::{
    Positioned,
    types::{self as ast, BaseType, ServiceDocument, TypeSystemDefinition},
};
use async_graphql_value::Name;
use fxhash::FxHashMap;
use strum::IntoEnumIterator;

pub use error::BuildError;

use crate::*;

pub(crate) fn build(sdl: &str) -> Result<Schema, BuildError> {
    let document = async_graphql_parser::parse_schema(sdl).map_err(|err| BuildError::Parsing(err.to_string()))?;

    let mut builder = SchemaBuilder::default();
    builder.ingest_builtin_scalars();
    builder.ingest_type_names(&document)?;
    builder.ingest_type_contents(&document)?;
    builder.compute_possible_types();
    let schema = builder.finalize(&document)?;

    tracing::debug!(
        types = schema.types.len(),
        fields = schema.fields.len(),
        "Schema built from SDL"
    );
    Ok(schema)
}

#[derive(Default)]
struct SchemaBuilder {
    types: Vec<TypeDefinition>,
    fields: Vec<FieldDefinition>,
    type_by_name: FxHashMap<String, TypeDefinitionId>,
}

impl SchemaBuilder {
    fn push_type(&mut self, definition: TypeDefinition) -> Result<TypeDefinitionId, BuildError> {
        let name = definition.name();
        if self.type_by_name.contains_key(name) {
            return Err(BuildError::DuplicateType { name: name.to_string() });
        }
        let id = TypeDefinitionId::from(self.types.len());
        self.type_by_name.insert(name.to_string(), id);
        self.types.push(definition);
        Ok(id)
    }

    fn ingest_builtin_scalars(&mut self) {
        for builtin in BuiltinScalar::iter() {
            let id = TypeDefinitionId::from(self.types.len());
            self.type_by_name.insert(builtin.to_string(), id);
            self.types.push(TypeDefinition::Scalar(ScalarDefinition {
                name: builtin.to_string(),
                description: None,
                builtin: Some(builtin),
            }));
        }
    }

    fn ingest_type_names(&mut self, document: &ServiceDocument) -> Result<(), BuildError> {
        for definition in &document.definitions {
            let TypeSystemDefinition::Type(definition) = definition else {
                continue;
            };
            let definition = &definition.node;
            if definition.extend {
                continue;
            }
            let name = definition.name.node.to_string();
            let description = definition.description.as_ref().map(|desc| desc.node.clone());
            let record = match &definition.kind {
                ast::TypeKind::Scalar => {
                    // Re-declaring a built-in scalar keeps the built-in coercion.
                    if name.parse::<BuiltinScalar>().is_ok() {
                        continue;
                    }
                    TypeDefinition::Scalar(ScalarDefinition {
                        name,
                        description,
                        builtin: None,
                    })
                }
                ast::TypeKind::Object(_) => TypeDefinition::Object(ObjectDefinition {
                    id: TypeDefinitionId::from(self.types.len()),
                    name,
                    description,
                    interfaces: Vec::new(),
                    fields: Vec::new(),
                }),
                ast::TypeKind::Interface(_) => TypeDefinition::Interface(InterfaceDefinition {
                    name,
                    description,
                    interfaces: Vec::new(),
                    fields: Vec::new(),
                    possible_types: Vec::new(),
                }),
                ast::TypeKind::Union(_) => TypeDefinition::Union(UnionDefinition {
                    name,
                    description,
                    possible_types: Vec::new(),
                }),
                ast::TypeKind::Enum(_) => TypeDefinition::Enum(EnumDefinition {
                    name,
                    description,
                    values: Vec::new(),
                }),
                ast::TypeKind::InputObject(_) => TypeDefinition::InputObject(InputObjectDefinition {
                    name,
                    description,
                    fields: Vec::new(),
                }),
            };
            self.push_type(record)?;
        }
        Ok(())
    }

    fn ingest_type_contents(&mut self, document: &ServiceDocument) -> Result<(), BuildError> {
        for definition in &document.definitions {
            let TypeSystemDefinition::Type(definition) = definition else {
                continue;
            };
            let definition = &definition.node;
            let name = definition.name.node.as_str();
            let Some(id) = self
                .type_by_name
                .get(name)
                .copied()
                .filter(|id| same_kind(&definition.kind, &self.types[usize::from(*id)]))
            else {
                return Err(BuildError::InvalidExtension {
                    name: name.to_string(),
                    kind: kind_name(&definition.kind),
                });
            };

            match &definition.kind {
                ast::TypeKind::Scalar => {}
                ast::TypeKind::Object(object) => {
                    let interfaces = self.interfaces(name, &object.implements)?;
                    let fields = self.ingest_fields(id, &object.fields)?;
                    if let TypeDefinition::Object(def) = &mut self.types[usize::from(id)] {
                        def.interfaces.extend(interfaces);
                        def.fields.extend(fields);
                    }
                }
                ast::TypeKind::Interface(interface) => {
                    let interfaces = self.interfaces(name, &interface.implements)?;
                    let fields = self.ingest_fields(id, &interface.fields)?;
                    if let TypeDefinition::Interface(def) = &mut self.types[usize::from(id)] {
                        def.interfaces.extend(interfaces);
                        def.fields.extend(fields);
                    }
                }
                ast::TypeKind::Union(union) => {
                    let members = self.union_members(name, &union.members)?;
                    if let TypeDefinition::Union(def) = &mut self.types[usize::from(id)] {
                        def.possible_types.extend(members);
                    }
                }
                ast::TypeKind::Enum(enum_type) => {
                    let values = enum_type.values.iter().map(|value| value.node.value.node.to_string());
                    if let TypeDefinition::Enum(def) = &mut self.types[usize::from(id)] {
                        def.values.extend(values);
                    }
                }
                ast::TypeKind::InputObject(input_object) => {
                    let fields = input_object
                        .fields
                        .iter()
                        .map(|field| self.input_value(name, &field.node))
                        .collect::<Result<Vec<_>, _>>()?;
                    if let TypeDefinition::InputObject(def) = &mut self.types[usize::from(id)] {
                        def.fields.extend(fields);
                    }
                }
            }
        }
        Ok(())
    }

    fn ingest_fields(
        &mut self,
        parent: TypeDefinitionId,
        fields: &[Positioned<ast::FieldDefinition>],
    ) -> Result<Vec<FieldDefinitionId>, BuildError> {
        let parent_name = self.types[usize::from(parent)].name().to_string();
        let existing = self.types[usize::from(parent)].field_ids().to_vec();
        let mut ids = Vec::with_capacity(fields.len());

        for field in fields {
            let field = &field.node;
            let name = field.name.node.as_str();
            if existing.iter().chain(&ids).any(|id| self.fields[usize::from(*id)].name == name) {
                return Err(BuildError::DuplicateField {
                    ty: parent_name,
                    name: name.to_string(),
                });
            }

            let location = format!("{parent_name}.{name}");
            let ty = self.convert_type(&field.ty.node, &location)?;
            if let TypeDefinition::InputObject(input_object) = &self.types[usize::from(ty.named_type())] {
                return Err(BuildError::NotAnOutputType {
                    location,
                    ty: input_object.name.clone(),
                });
            }
            let arguments = field
                .arguments
                .iter()
                .map(|argument| self.input_value(&location, &argument.node))
                .collect::<Result<Vec<_>, _>>()?;

            ids.push(FieldDefinitionId::from(self.fields.len()));
            self.fields.push(FieldDefinition {
                name: name.to_string(),
                description: field.description.as_ref().map(|desc| desc.node.clone()),
                parent,
                ty,
                arguments,
            });
        }

        Ok(ids)
    }

    fn input_value(&self, parent: &str, value: &ast::InputValueDefinition) -> Result<InputValueDefinition, BuildError> {
        let location = format!("{parent}({}:)", value.name.node);
        let ty = self.convert_type(&value.ty.node, &location)?;
        let named = &self.types[usize::from(ty.named_type())];
        if !named.is_input() {
            return Err(BuildError::NotAnInputType {
                location,
                ty: named.name().to_string(),
            });
        }
        let default_value = value
            .default_value
            .as_ref()
            .map(|default| default.node.clone().into_json())
            .transpose()
            .map_err(|err| BuildError::InvalidDefaultValue {
                location,
                err: err.to_string(),
            })?;

        Ok(InputValueDefinition {
            name: value.name.node.to_string(),
            ty,
            default_value,
        })
    }

    fn convert_type(&self, ty: &ast::Type, location: &str) -> Result<Type, BuildError> {
        let base = match &ty.base {
            BaseType::Named(name) => Type::Named(self.type_by_name.get(name.as_str()).copied().ok_or_else(|| {
                BuildError::UnknownType {
                    name: name.to_string(),
                    location: location.to_string(),
                }
            })?),
            BaseType::List(inner) => self.convert_type(inner, location)?.list(),
        };
        Ok(if ty.nullable { base } else { base.non_null() })
    }

    fn interfaces(&self, name: &str, implements: &[Positioned<Name>]) -> Result<Vec<TypeDefinitionId>, BuildError> {
        implements
            .iter()
            .map(|interface| {
                let interface = interface.node.as_str();
                match self.type_by_name.get(interface) {
                    Some(id) if matches!(self.types[usize::from(*id)], TypeDefinition::Interface(_)) => Ok(*id),
                    Some(_) => Err(BuildError::NotAnInterface {
                        name: name.to_string(),
                        interface: interface.to_string(),
                    }),
                    None => Err(BuildError::UnknownType {
                        name: interface.to_string(),
                        location: name.to_string(),
                    }),
                }
            })
            .collect()
    }

    fn union_members(&self, name: &str, members: &[Positioned<Name>]) -> Result<Vec<TypeDefinitionId>, BuildError> {
        members
            .iter()
            .map(|member| {
                let member = member.node.as_str();
                match self.type_by_name.get(member) {
                    Some(id) if matches!(self.types[usize::from(*id)], TypeDefinition::Object(_)) => Ok(*id),
                    Some(_) => Err(BuildError::InvalidUnionMember {
                        name: name.to_string(),
                        member: member.to_string(),
                    }),
                    None => Err(BuildError::UnknownType {
                        name: member.to_string(),
                        location: name.to_string(),
                    }),
                }
            })
            .collect()
    }

    fn compute_possible_types(&mut self) {
        let implementations = self
            .types
            .iter()
            .filter_map(|definition| match definition {
                TypeDefinition::Object(object) => Some(object),
                _ => None,
            })
            .flat_map(|object| object.interfaces.iter().map(|interface| (*interface, object.id)))
            .collect::<Vec<_>>();

        for (interface_id, object_id) in implementations {
            if let TypeDefinition::Interface(interface) = &mut self.types[usize::from(interface_id)] {
                interface.possible_types.push(object_id);
            }
        }
    }

    fn finalize(self, document: &ServiceDocument) -> Result<Schema, BuildError> {
        let schema_definition = document.definitions.iter().find_map(|definition| match definition {
            TypeSystemDefinition::Schema(schema) => Some(&schema.node),
            _ => None,
        });

        let [query, mutation, subscription] = match schema_definition {
            Some(schema) => [&schema.query, &schema.mutation, &schema.subscription]
                .map(|name| name.as_ref().map(|name| name.node.to_string())),
            None => ["Query", "Mutation", "Subscription"]
                .map(|name| self.type_by_name.contains_key(name).then(|| name.to_string())),
        };

        let query_type = self.root("query", query)?.ok_or(BuildError::MissingQueryType)?;
        let mutation_type = self.root("mutation", mutation)?;
        let subscription_type = self.root("subscription", subscription)?;

        Ok(Schema {
            types: self.types,
            fields: self.fields,
            type_by_name: self.type_by_name,
            query_type,
            mutation_type,
            subscription_type,
        })
    }

    fn root(&self, operation: &'static str, name: Option<String>) -> Result<Option<TypeDefinitionId>, BuildError> {
        let Some(name) = name else {
            return Ok(None);
        };
        match self.type_by_name.get(&name) {
            Some(id) if matches!(self.types[usize::from(*id)], TypeDefinition::Object(_)) => Ok(Some(*id)),
            Some(_) => Err(BuildError::InvalidRootType { operation, name }),
            None => Err(BuildError::UnknownType {
                name,
                location: format!("the schema {operation} root"),
            }),
        }
    }
}

fn same_kind(kind: &ast::TypeKind, definition: &TypeDefinition) -> bool {
    matches!(
        (kind, definition),
        (ast::TypeKind::Scalar, TypeDefinition::Scalar(_))
            | (ast::TypeKind::Object(_), TypeDefinition::Object(_))
            | (ast::TypeKind::Interface(_), TypeDefinition::Interface(_))
            | (ast::TypeKind::Union(_), TypeDefinition::Union(_))
            | (ast::TypeKind::Enum(_), TypeDefinition::Enum(_))
            | (ast::TypeKind::InputObject(_), TypeDefinition::InputObject(_))
    )
}

fn kind_name(kind: &ast::TypeKind) -> &'static str {
    match kind {
        ast::TypeKind::Scalar => "scalar",
        ast::TypeKind::Object(_) => "object",
        ast::TypeKind::Interface(_) => "interface",
        ast::TypeKind::Union(_) => "union",
        ast::TypeKind::Enum(_) => "enum",
        ast::TypeKind::InputObject(_) => "input object",
    }
}
