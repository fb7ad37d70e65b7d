use itertools::Itertools;

#[derive(thiserror::Error, Debug)]
pub(crate) enum BindError {
    #[error("Unknown type named '{name}'")]
    UnknownType { name: String },
    #[error("The field `{field_name}` does not have an argument named `{argument_name}`")]
    UnknownArgument { field_name: String, argument_name: String },
    #[error("{container} does not have a field named '{name}'")]
    UnknownField { container: String, name: String },
    #[error("Unknown fragment named '{name}'")]
    UnknownFragment { name: String },
    #[error("Fragment cycle detected: {}", .cycle.iter().join(", "))]
    FragmentCycle { cycle: Vec<String> },
    #[error(
        "Field '{name}' does not exists on {ty}, it's a union. Only interfaces and objects have fields, consider using a fragment with a type condition."
    )]
    UnionHaveNoFields { name: String, ty: String },
    #[error("Field '{name}' cannot have a selection set, it's a {ty}. Only interfaces, unions and objects can.")]
    CannotHaveSelectionSet { name: String, ty: String },
    #[error("Field '{name}' of type {ty} must have a selection of subfields.")]
    MissingSelectionSet { name: String, ty: String },
    #[error("Fields '{key}' conflict because '{first}' and '{second}' are different fields.")]
    ConflictingFields { key: String, first: String, second: String },
    #[error("Type conditions cannot be declared on '{name}', only on unions, interfaces or objects.")]
    InvalidTypeConditionTargetType { name: String },
    #[error("Type condition on '{name}' cannot be used in a '{parent}' selection_set")]
    DisjointTypeCondition { parent: String, name: String },
    #[error("Mutations are not defined on this schema.")]
    NoMutationDefined,
    #[error("Subscriptions are not defined on this schema.")]
    NoSubscriptionDefined,
    #[error(
        "Variable named '${name}' does not have a valid input type. Can only be a scalar, enum or input object. Found: '{ty}'."
    )]
    InvalidVariableType { name: String, ty: String },
    #[error("There can only be one variable named '${name}'")]
    DuplicateVariable { name: String },
    #[error("Missing argument named '{name}' for directive '{directive}'")]
    MissingDirectiveArgument { name: &'static str, directive: String },
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum VariableError {
    #[error("Variable ${name} is missing")]
    MissingVariable { name: String },
    #[error("Variable ${name} got invalid value null, expected a non-null {ty}")]
    UnexpectedNull { name: String, ty: String },
}
