//! Hierarchy membership check.
//!
//! Scale values are grouped under the top class their axis maps to and
//! sent to the [`HierarchyValidator`] in a single call. Values on axes
//! without a mapping are skipped.

use super::ValidateEntityUpdateRequest;
use crate::catalog::{self, ScaleMappingRepository};
use crate::collaborators::{HierarchyValidator, ValidateHierarchyRequest, bounded_call};
use crate::error::ValidationError;
use crate::model::Iri;
use indexmap::{IndexMap, IndexSet};
use std::time::Duration;

const OPERATION: &str = "hierarchy membership check";

/// Axis name reported when no mapping points back at a returned root.
const UNKNOWN_AXIS: &str = "Unknown";

pub async fn check(
    validator: &dyn HierarchyValidator,
    scale_mappings: &dyn ScaleMappingRepository,
    request: &ValidateEntityUpdateRequest,
    timeout: Duration,
) -> Vec<ValidationError> {
    let mappings = scale_mappings.axis_to_scale_mappings();
    let top_classes = catalog::axis_to_top_class(&mappings);

    let mut candidates: IndexMap<Iri, IndexSet<Iri>> = IndexMap::new();
    for (axis, customization) in request.entity_custom_scale_values.with_axis() {
        let Some(root) = top_classes.get(axis) else {
            tracing::warn!(axis = axis, "no scale mapping for axis, skipping hierarchy check");
            continue;
        };
        let values: Vec<Iri> = customization.value_iris().collect();
        if values.is_empty() {
            continue;
        }
        candidates.entry(root.clone()).or_default().extend(values);
    }
    if candidates.is_empty() {
        return Vec::new();
    }

    let lookup = ValidateHierarchyRequest {
        project_id: request.project_id.clone(),
        hierarchy_roots_to_entities: candidates
            .into_iter()
            .map(|(root, values)| (root, values.into_iter().collect()))
            .collect(),
    };
    let response = match bounded_call(OPERATION, timeout, validator.validate_hierarchy_membership(lookup)).await {
        Ok(response) => response,
        Err(error) => {
            return vec![ValidationError::HierarchyCheckFailed {
                cause: error.to_string(),
            }];
        }
    };

    let mut errors = Vec::new();
    for (root, invalid) in response.invalid_entities_by_root {
        let axis = catalog::axis_for_top_class(&mappings, &root).unwrap_or(UNKNOWN_AXIS);
        let invalid: IndexSet<Iri> = invalid.into_iter().collect();
        errors.extend(invalid.into_iter().map(|iri| ValidationError::ScaleValueOutsideHierarchy {
            iri,
            axis: axis.to_string(),
            top_class: root.clone(),
        }));
    }
    errors
}
