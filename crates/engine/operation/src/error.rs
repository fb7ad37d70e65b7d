use std::borrow::Cow;

use crate::Location;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum ErrorKind {
    Parsing,
    Validation,
    Variable,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct Error {
    kind: ErrorKind,
    message: Cow<'static, str>,
    locations: Vec<Location>,
}

impl Error {
    pub(crate) fn parsing(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Parsing, message)
    }

    pub(crate) fn validation(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    pub(crate) fn variable(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Variable, message)
    }

    fn new(kind: ErrorKind, message: impl Into<Cow<'static, str>>) -> Self {
        Error {
            kind,
            message: message.into(),
            locations: Vec::new(),
        }
    }

    pub(crate) fn with_location(mut self, location: Location) -> Self {
        self.locations.push(location);
        self
    }

    pub(crate) fn with_locations(mut self, locations: impl IntoIterator<Item = Location>) -> Self {
        self.locations.extend(locations);
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn locations(&self) -> &[Location] {
        &self.locations
    }
}
