//! Validation of entity post-coordination updates.
//!
//! An update carries the entity's per-view specification and its custom
//! scale values. [`EntityUpdateValidator`] checks it against:
//!
//! 1. [`identity`]: both payloads name the same entity (fatal on mismatch)
//! 2. [`permission`]: every referenced axis is offered by the entity's type
//! 3. [`existence`]: every scale value exists in the project
//! 4. [`consistency`]: every custom scale axis is allowed or required by a view
//! 5. [`hierarchy`]: every scale value descends from its axis's top class
//!
//! Checks 2-5 always run and their errors are concatenated in that order.
//! Collaborator failures become errors of the check that hit them; the
//! pipeline itself never fails.

pub mod consistency;
pub mod existence;
pub mod hierarchy;
pub mod identity;
pub mod permission;

use crate::catalog::{AxisCatalog, AxisConfigRepository, ScaleMappingRepository};
use crate::collaborators::{EntityTypeResolver, HierarchyValidator, InMemoryCollaborators, IriExistenceChecker};
use crate::error::ValidationError;
use crate::model::{ProjectId, WhoficCustomScalesValues, WhoficEntityPostCoordinationSpecification};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;

pub const DEFAULT_COLLABORATOR_TIMEOUT: Duration = Duration::from_secs(15);

// =============================================================================
// Request / response
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateEntityUpdateRequest {
    pub project_id: ProjectId,
    pub entity_custom_scale_values: WhoficCustomScalesValues,
    pub entity_specification: WhoficEntityPostCoordinationSpecification,
}

impl ValidateEntityUpdateRequest {
    pub const CHANNEL: &'static str = "webprotege.postcoordination.ValidateEntityUpdate";

    pub fn new(
        project_id: ProjectId,
        entity_custom_scale_values: WhoficCustomScalesValues,
        entity_specification: WhoficEntityPostCoordinationSpecification,
    ) -> Self {
        Self {
            project_id,
            entity_custom_scale_values,
            entity_specification,
        }
    }
}

/// The boundary form of a [`ValidationReport`]: rendered messages only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateEntityUpdateResponse {
    #[serde(default)]
    pub error_messages: Vec<String>,
}

impl ValidateEntityUpdateResponse {
    pub fn is_valid(&self) -> bool {
        self.error_messages.is_empty()
    }
}

// =============================================================================
// Report
// =============================================================================

/// Errors found in one update request, in check order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub errors: Vec<ValidationError>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn push(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn extend(&mut self, errors: impl IntoIterator<Item = ValidationError>) {
        self.errors.extend(errors);
    }

    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }

    pub fn into_response(self) -> ValidateEntityUpdateResponse {
        ValidateEntityUpdateResponse {
            error_messages: self.messages(),
        }
    }
}

// =============================================================================
// Validator
// =============================================================================

/// Tuning of the validation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationSettings {
    /// Wait budget of each collaborator call.
    pub collaborator_timeout: Duration,
    /// Run the three collaborator-backed checks concurrently.
    pub concurrent_checks: bool,
}

impl Default for ValidationSettings {
    fn default() -> Self {
        Self {
            collaborator_timeout: DEFAULT_COLLABORATOR_TIMEOUT,
            concurrent_checks: true,
        }
    }
}

/// Sources of truth the pipeline consults.
#[derive(Clone)]
pub struct ValidatorDependencies {
    pub entity_types: Arc<dyn EntityTypeResolver>,
    pub axis_configs: Arc<dyn AxisConfigRepository>,
    pub existence: Arc<dyn IriExistenceChecker>,
    pub hierarchy: Arc<dyn HierarchyValidator>,
    pub scale_mappings: Arc<dyn ScaleMappingRepository>,
}

impl ValidatorDependencies {
    /// Wires a catalog and a set of in-memory collaborators.
    pub fn in_memory(catalog: Arc<AxisCatalog>, collaborators: Arc<InMemoryCollaborators>) -> Self {
        Self {
            entity_types: collaborators.clone(),
            axis_configs: catalog.clone(),
            existence: collaborators.clone(),
            hierarchy: collaborators,
            scale_mappings: catalog,
        }
    }
}

/// Runs the validation pipeline over update requests.
#[derive(Clone)]
pub struct EntityUpdateValidator {
    dependencies: ValidatorDependencies,
    settings: ValidationSettings,
}

impl EntityUpdateValidator {
    pub fn new(dependencies: ValidatorDependencies, settings: ValidationSettings) -> Self {
        Self {
            dependencies,
            settings,
        }
    }

    pub fn settings(&self) -> ValidationSettings {
        self.settings
    }

    /// Validates `request` and renders the outcome for the caller.
    pub async fn handle_request(&self, request: &ValidateEntityUpdateRequest) -> ValidateEntityUpdateResponse {
        self.validate(request).await.into_response()
    }

    /// Validates `request`; an empty report means the update may proceed.
    pub async fn validate(&self, request: &ValidateEntityUpdateRequest) -> ValidationReport {
        let span = tracing::info_span!(
            "validate_entity_update",
            project = %request.project_id,
            entity = %request.entity_specification.whofic_entity_iri,
        );
        self.run_checks(request).instrument(span).await
    }

    async fn run_checks(&self, request: &ValidateEntityUpdateRequest) -> ValidationReport {
        let mut report = ValidationReport::new();

        if let Some(mismatch) = identity::check(request) {
            tracing::warn!(error = %mismatch, "rejecting update before running checks");
            report.push(mismatch);
            return report;
        }

        let timeout = self.settings.collaborator_timeout;
        let deps = &self.dependencies;
        let permission = permission::check(
            deps.entity_types.as_ref(),
            deps.axis_configs.as_ref(),
            request,
            timeout,
        );
        let existence = existence::check(deps.existence.as_ref(), request, timeout);
        let hierarchy = hierarchy::check(
            deps.hierarchy.as_ref(),
            deps.scale_mappings.as_ref(),
            request,
            timeout,
        );

        let (permission_errors, existence_errors, hierarchy_errors) = if self.settings.concurrent_checks {
            tokio::join!(permission, existence, hierarchy)
        } else {
            (permission.await, existence.await, hierarchy.await)
        };

        report.extend(permission_errors);
        report.extend(existence_errors);
        report.extend(consistency::check(request));
        report.extend(hierarchy_errors);

        tracing::info!(
            error_count = report.errors.len(),
            valid = report.is_valid(),
            "entity update validated"
        );
        report
    }
}
