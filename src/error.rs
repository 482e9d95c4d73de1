//! Error types for the validation pipeline and its collaborators.
//!
//! - [`CollaboratorError`]: failure of an outbound call (timeout, transport,
//!   interruption). Never crosses the pipeline boundary.
//! - [`ValidationError`]: one rejected aspect of an update request, with
//!   structured fields. Rendered to the end-user message via `Display`.
//! - [`ErrorKind`]: the category a validation error falls into.

use crate::model::{AxisCategory, Iri};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use strum::AsRefStr;

// =============================================================================
// COLLABORATOR ERRORS
// =============================================================================

/// Failure of a call to an external collaborator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CollaboratorError {
    #[error("{operation} timed out after {}s", .timeout.as_secs_f64())]
    Timeout {
        operation: &'static str,
        timeout: Duration,
    },
    #[error("{0}")]
    Transport(String),
    #[error("{operation} was interrupted: {reason}")]
    Interrupted {
        operation: &'static str,
        reason: String,
    },
}

impl CollaboratorError {
    pub fn transport(message: impl Into<String>) -> Self {
        CollaboratorError::Transport(message.into())
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, CollaboratorError::Timeout { .. })
    }
}

pub type CollaboratorResult<T> = Result<T, CollaboratorError>;

// =============================================================================
// ERROR KINDS
// =============================================================================

/// Category of a validation error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The two payloads of the request disagree on the entity.
    StructuralMismatch,
    /// An axis is not available for the entity's type.
    PermissionViolation,
    /// A scale value is missing or sits outside its axis hierarchy.
    ReferentialIntegrity,
    /// A custom scale axis is not allowed or required by any view.
    ConsistencyViolation,
    /// A collaborator could not answer.
    InfrastructureFailure,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

// =============================================================================
// VALIDATION ERRORS
// =============================================================================

/// One reason an entity update is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationError {
    /// The scale payload and the specification payload name different entities
    EntityIriMismatch {
        scale_values_iri: String,
        specification_iri: String,
    },
    /// A specification list references an axis the entity type does not offer
    AxisNotAllowedForEntityType { axis: String, category: AxisCategory },
    /// A custom scale references an axis the entity type does not offer
    CustomScaleAxisNotAllowedForEntityType {
        axis: String,
        entity_types: Vec<String>,
    },
    /// The entity type lookup failed
    EntityTypeLookupFailed { cause: String },
    /// A scale value is unknown to the project
    ScaleValueDoesNotExist { iri: Iri },
    /// The existence check failed
    ExistenceCheckFailed { cause: String },
    /// A custom scale axis is neither allowed nor required by any view
    AxisNotInSpecification { axis: String },
    /// A scale value is not a descendant of its axis's top class
    ScaleValueOutsideHierarchy { iri: Iri, axis: String, top_class: Iri },
    /// The hierarchy membership check failed
    HierarchyCheckFailed { cause: String },
}

impl ValidationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ValidationError::EntityIriMismatch { .. } => ErrorKind::StructuralMismatch,
            ValidationError::AxisNotAllowedForEntityType { .. }
            | ValidationError::CustomScaleAxisNotAllowedForEntityType { .. } => {
                ErrorKind::PermissionViolation
            }
            ValidationError::ScaleValueDoesNotExist { .. }
            | ValidationError::ScaleValueOutsideHierarchy { .. } => ErrorKind::ReferentialIntegrity,
            ValidationError::AxisNotInSpecification { .. } => ErrorKind::ConsistencyViolation,
            ValidationError::EntityTypeLookupFailed { .. }
            | ValidationError::ExistenceCheckFailed { .. }
            | ValidationError::HierarchyCheckFailed { .. } => ErrorKind::InfrastructureFailure,
        }
    }

    /// Fatal errors stop the pipeline before any other check runs.
    pub fn is_fatal(&self) -> bool {
        self.kind() == ErrorKind::StructuralMismatch
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EntityIriMismatch {
                scale_values_iri,
                specification_iri,
            } => write!(
                f,
                "Entity IRI mismatch: entityCustomScaleValues.whoficEntityIri ({}) differs from entitySpecification.whoficEntityIri ({})",
                scale_values_iri, specification_iri
            ),
            ValidationError::AxisNotAllowedForEntityType { axis, category } => write!(
                f,
                "Axis '{}' from {} is not allowed for the entity's entityType",
                axis, category
            ),
            ValidationError::CustomScaleAxisNotAllowedForEntityType { axis, entity_types } => {
                write!(
                    f,
                    "Axis '{}' from entityCustomScaleValues is not allowed for entityType(s): [{}]",
                    axis,
                    entity_types.join(", ")
                )
            }
            ValidationError::EntityTypeLookupFailed { cause } => {
                write!(f, "Error fetching entity types: {}", cause)
            }
            ValidationError::ScaleValueDoesNotExist { iri } => {
                write!(f, "Scale value IRI '{}' does not exist in project", iri)
            }
            ValidationError::ExistenceCheckFailed { cause } => {
                write!(f, "Error validating scale values existence: {}", cause)
            }
            ValidationError::AxisNotInSpecification { axis } => write!(
                f,
                "Axis '{}' from entityCustomScaleValues is not present in allowedAxes or requiredAxes of any PostCoordinationSpecification",
                axis
            ),
            ValidationError::ScaleValueOutsideHierarchy {
                iri,
                axis,
                top_class,
            } => write!(
                f,
                "Scale value IRI '{}' does not belong to axis '{}' hierarchy (top class: {})",
                iri, axis, top_class
            ),
            ValidationError::HierarchyCheckFailed { cause } => write!(
                f,
                "Error validating scale values belong to axis hierarchy: {}",
                cause
            ),
        }
    }
}

impl std::error::Error for ValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn custom_scale_permission_message_lists_types() {
        let error = ValidationError::CustomScaleAxisNotAllowedForEntityType {
            axis: "Severity".to_string(),
            entity_types: vec!["ICD".to_string(), "Extension".to_string()],
        };
        assert_eq!(
            error.to_string(),
            "Axis 'Severity' from entityCustomScaleValues is not allowed for entityType(s): [ICD, Extension]"
        );
        assert_eq!(error.kind(), ErrorKind::PermissionViolation);
    }

    #[test]
    fn specification_permission_message_names_list() {
        let error = ValidationError::AxisNotAllowedForEntityType {
            axis: "InvalidAxis".to_string(),
            category: AxisCategory::NotAllowed,
        };
        assert_eq!(
            error.to_string(),
            "Axis 'InvalidAxis' from notAllowedAxes is not allowed for the entity's entityType"
        );
    }

    #[test]
    fn only_iri_mismatch_is_fatal() {
        let mismatch = ValidationError::EntityIriMismatch {
            scale_values_iri: "a".to_string(),
            specification_iri: "b".to_string(),
        };
        let lookup = ValidationError::EntityTypeLookupFailed {
            cause: "boom".to_string(),
        };
        assert!(mismatch.is_fatal());
        assert!(!lookup.is_fatal());
        assert_eq!(lookup.kind(), ErrorKind::InfrastructureFailure);
    }

    #[test]
    fn timeout_renders_operation_and_budget() {
        let error = CollaboratorError::Timeout {
            operation: "entity type lookup",
            timeout: Duration::from_secs(15),
        };
        assert!(error.is_timeout());
        assert_eq!(error.to_string(), "entity type lookup timed out after 15s");
    }

    #[test]
    fn hierarchy_message_names_axis_and_root() {
        let error = ValidationError::ScaleValueOutsideHierarchy {
            iri: Iri::new("http://x/left"),
            axis: "Course".to_string(),
            top_class: Iri::new("http://x/CourseTop"),
        };
        assert_eq!(
            error.to_string(),
            "Scale value IRI 'http://x/left' does not belong to axis 'Course' hierarchy (top class: http://x/CourseTop)"
        );
        assert_eq!(error.kind(), ErrorKind::ReferentialIntegrity);
    }
}
