use crate::model::{ProtocolKind, SecurityKind, TransportKind};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single rejected field value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{field}: {reason}{}", offending_suffix(.offending_value))]
pub struct ValidationError {
    pub field: String,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offending_value: Option<String>,
}

fn offending_suffix(value: &Option<String>) -> String {
    match value {
        Some(v) => format!(" (got {:?})", v),
        None => String::new(),
    }
}

impl ValidationError {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
            offending_value: None,
        }
    }

    pub fn with_value(mut self, value: impl ToString) -> Self {
        self.offending_value = Some(value.to_string());
        self
    }

    /// Prefixes the field path, e.g. `port` -> `inbounds[2].port`.
    pub fn scoped(mut self, prefix: &str) -> Self {
        if !prefix.is_empty() {
            self.field = format!("{}.{}", prefix, self.field);
        }
        self
    }
}

/// Raised by the catalog for a protocol/transport/security triple outside
/// the supported matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{protocol} over {transport} with {security} security is not supported")]
pub struct UnsupportedCombination {
    pub protocol: ProtocolKind,
    pub transport: TransportKind,
    pub security: SecurityKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionKind {
    Port,
    Tag,
}

impl fmt::Display for CollisionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Port => f.write_str("port"),
            Self::Tag => f.write_str("tag"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollisionMember {
    pub index: usize,
    pub tag: String,
}

/// Two or more inbounds claim the same port or tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{kind} {value} is claimed by {}", describe_members(.members))]
pub struct CollisionError {
    pub kind: CollisionKind,
    pub value: String,
    pub members: Vec<CollisionMember>,
}

fn describe_members(members: &[CollisionMember]) -> String {
    members
        .iter()
        .map(|m| format!("inbounds[{}] ({})", m.index, m.tag))
        .collect::<Vec<_>>()
        .join(", ")
}

impl CollisionError {
    pub fn tags(&self) -> Vec<&str> {
        self.members.iter().map(|m| m.tag.as_str()).collect()
    }

    pub fn involves(&self, tag: &str) -> bool {
        self.members.iter().any(|m| m.tag == tag)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SynthError {
    #[error(transparent)]
    Field(ValidationError),

    #[error("inbounds[{index}] ({tag}): {combination}")]
    UnsupportedCombination {
        index: usize,
        tag: String,
        combination: UnsupportedCombination,
    },

    #[error(transparent)]
    Collision(CollisionError),
}

impl From<ValidationError> for SynthError {
    fn from(e: ValidationError) -> Self {
        Self::Field(e)
    }
}

impl From<CollisionError> for SynthError {
    fn from(e: CollisionError) -> Self {
        Self::Collision(e)
    }
}

/// Everything that went wrong in one synthesis run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(transparent)]
#[error("inbound synthesis failed with {} error(s)", .0.len())]
pub struct ErrorList(Vec<SynthError>);

impl ErrorList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, e: impl Into<SynthError>) {
        self.0.push(e.into());
    }

    pub fn extend(&mut self, errors: impl IntoIterator<Item = SynthError>) {
        self.0.extend(errors);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SynthError> {
        self.0.iter()
    }

    pub fn into_vec(self) -> Vec<SynthError> {
        self.0
    }

    pub fn field_errors(&self) -> impl Iterator<Item = &ValidationError> {
        self.0.iter().filter_map(|e| match e {
            SynthError::Field(v) => Some(v),
            _ => None,
        })
    }

    pub fn collisions(&self) -> impl Iterator<Item = &CollisionError> {
        self.0.iter().filter_map(|e| match e {
            SynthError::Collision(c) => Some(c),
            _ => None,
        })
    }

    pub fn has_unsupported(&self) -> bool {
        self.0
            .iter()
            .any(|e| matches!(e, SynthError::UnsupportedCombination { .. }))
    }

    /// `Ok(())` when empty, otherwise the list itself as the error.
    pub fn into_result(self) -> Result<(), ErrorList> {
        if self.0.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl From<Vec<SynthError>> for ErrorList {
    fn from(errors: Vec<SynthError>) -> Self {
        Self(errors)
    }
}

impl<'a> IntoIterator for &'a ErrorList {
    type Item = &'a SynthError;
    type IntoIter = std::slice::Iter<'a, SynthError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for ErrorList {
    type Item = SynthError;
    type IntoIter = std::vec::IntoIter<SynthError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
