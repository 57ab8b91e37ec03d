//! Declared shape of the persisted studio document.

use serde_json::Value;

use crate::utils::json_kind;

/// JSON container a top-level field must hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    Array,
    Object,
}

impl ContainerKind {
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            ContainerKind::Array => value.is_array(),
            ContainerKind::Object => value.is_object(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ContainerKind::Array => "array",
            ContainerKind::Object => "object",
        }
    }
}

/// Outcome of checking a value against a `DocumentSchema`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    Valid,
    Invalid { reason: String },
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        matches!(self, Validation::Valid)
    }

    pub fn into_result(self) -> Result<(), String> {
        match self {
            Validation::Valid => Ok(()),
            Validation::Invalid { reason } => Err(reason),
        }
    }
}

/// Table of required top-level fields and their container kinds.
#[derive(Debug, Clone, Copy)]
pub struct DocumentSchema {
    pub fields: &'static [(&'static str, ContainerKind)],
}

pub const STUDIO_DOCUMENT_SCHEMA: DocumentSchema = DocumentSchema {
    fields: &[
        ("banners", ContainerKind::Array),
        ("categories", ContainerKind::Array),
        ("occasions", ContainerKind::Array),
        ("advertisements", ContainerKind::Array),
    ],
};

impl DocumentSchema {
    /// Check the first failing field, in declaration order.
    pub fn validate(&self, value: &Value) -> Validation {
        let Some(object) = value.as_object() else {
            return Validation::Invalid {
                reason: format!("document must be an object, found {}", json_kind(value)),
            };
        };

        for (field, kind) in self.fields {
            match object.get(*field) {
                None => {
                    return Validation::Invalid {
                        reason: format!("missing field `{}`", field),
                    }
                }
                Some(found) if !kind.matches(found) => {
                    return Validation::Invalid {
                        reason: format!(
                            "field `{}` must be an {}, found {}",
                            field,
                            kind.name(),
                            json_kind(found)
                        ),
                    }
                }
                Some(_) => {}
            }
        }
        Validation::Valid
    }
}
