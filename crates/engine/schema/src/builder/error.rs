#[derive(thiserror::Error, Debug, PartialEq)]
pub enum BuildError {
    #[error("Could not parse the schema: {0}")]
    Parsing(String),
    #[error("Type '{name}' is defined more than once")]
    DuplicateType { name: String },
    #[error("Unknown type named '{name}' at {location}")]
    UnknownType { name: String, location: String },
    #[error("Cannot extend '{name}', no {kind} with that name is defined")]
    InvalidExtension { name: String, kind: &'static str },
    #[error("Field {location} cannot return the input type '{ty}'")]
    NotAnOutputType { location: String, ty: String },
    #[error("Argument {location} must be a scalar, enum or input object but is '{ty}'")]
    NotAnInputType { location: String, ty: String },
    #[error("Type '{name}' declares '{interface}' as an interface but it is not one")]
    NotAnInterface { name: String, interface: String },
    #[error("Union '{name}' can only contain object types, '{member}' is not one")]
    InvalidUnionMember { name: String, member: String },
    #[error("Field '{name}' is defined more than once on '{ty}'")]
    DuplicateField { ty: String, name: String },
    #[error("Invalid default value for {location}: {err}")]
    InvalidDefaultValue { location: String, err: String },
    #[error("The root {operation} type '{name}' must be an object type")]
    InvalidRootType { operation: &'static str, name: String },
    #[error("The schema does not define a query root type")]
    MissingQueryType,
}
