//! Scale value existence check.

use super::ValidateEntityUpdateRequest;
use crate::collaborators::{CheckIrisExistRequest, IriExistenceChecker, bounded_call};
use crate::error::ValidationError;
use crate::model::Iri;
use std::collections::BTreeSet;
use std::time::Duration;

const OPERATION: &str = "scale value existence check";

/// Every non-empty scale value of every customization, with or without an
/// axis, must exist in the project. No call is made when there are none.
pub async fn check(
    checker: &dyn IriExistenceChecker,
    request: &ValidateEntityUpdateRequest,
    timeout: Duration,
) -> Vec<ValidationError> {
    let iris: BTreeSet<Iri> = request
        .entity_custom_scale_values
        .scale_customizations
        .iter()
        .flat_map(|customization| customization.value_iris())
        .collect();
    if iris.is_empty() {
        return Vec::new();
    }

    let lookup = CheckIrisExistRequest {
        project_id: request.project_id.clone(),
        iris,
    };
    match bounded_call(OPERATION, timeout, checker.check_iris_exist(lookup)).await {
        Ok(response) => response
            .non_existent_iris
            .into_iter()
            .map(|iri| ValidationError::ScaleValueDoesNotExist { iri })
            .collect(),
        Err(error) => vec![ValidationError::ExistenceCheckFailed {
            cause: error.to_string(),
        }],
    }
}
