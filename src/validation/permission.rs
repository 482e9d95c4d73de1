//! Axis permission check.
//!
//! The entity's type(s) are resolved through the [`EntityTypeResolver`] and
//! turned into an allowed-axis set via the [`AxisConfigRepository`]. Every
//! axis named in a specification list, and every custom scale axis, must be
//! in that set. Matching is exact.

use super::ValidateEntityUpdateRequest;
use crate::catalog::{self, AxisConfigRepository};
use crate::collaborators::{EntityTypeResolver, ResolveEntityTypeRequest, bounded_call};
use crate::error::ValidationError;
use crate::model::{AxisCategory, Iri};
use std::time::Duration;
use strum::IntoEnumIterator;

const OPERATION: &str = "entity type lookup";

pub async fn check(
    resolver: &dyn EntityTypeResolver,
    axis_configs: &dyn AxisConfigRepository,
    request: &ValidateEntityUpdateRequest,
    timeout: Duration,
) -> Vec<ValidationError> {
    let lookup = ResolveEntityTypeRequest {
        project_id: request.project_id.clone(),
        entity_iri: Iri::new(request.entity_specification.whofic_entity_iri.as_str()),
    };
    let entity_types = match bounded_call(OPERATION, timeout, resolver.resolve_entity_type(lookup)).await {
        Ok(response) => response.types,
        Err(error) => {
            return vec![ValidationError::EntityTypeLookupFailed {
                cause: error.to_string(),
            }];
        }
    };
    tracing::info!(entity_types = ?entity_types, "resolved entity types");

    let configs = axis_configs.axes_for_entity_types(&entity_types);
    let allowed = catalog::allowed_axes(&configs, &entity_types);

    let mut errors = Vec::new();
    for specification in &request.entity_specification.postcoordination_specifications {
        for category in AxisCategory::iter() {
            errors.extend(
                specification
                    .axes(category)
                    .iter()
                    .filter(|axis| !allowed.contains(axis.as_str()))
                    .map(|axis| ValidationError::AxisNotAllowedForEntityType {
                        axis: axis.clone(),
                        category,
                    }),
            );
        }
    }

    errors.extend(
        request
            .entity_custom_scale_values
            .with_axis()
            .filter(|(axis, _)| !allowed.contains(*axis))
            .map(|(axis, _)| ValidationError::CustomScaleAxisNotAllowedForEntityType {
                axis: axis.to_string(),
                entity_types: entity_types.clone(),
            }),
    );
    errors
}
