//! Entity identity check.

use super::ValidateEntityUpdateRequest;
use crate::error::ValidationError;

/// Both payloads must name the same entity; the comparison is exact.
pub fn check(request: &ValidateEntityUpdateRequest) -> Option<ValidationError> {
    let scale_values_iri = &request.entity_custom_scale_values.whofic_entity_iri;
    let specification_iri = &request.entity_specification.whofic_entity_iri;
    if scale_values_iri == specification_iri {
        return None;
    }
    Some(ValidationError::EntityIriMismatch {
        scale_values_iri: scale_values_iri.clone(),
        specification_iri: specification_iri.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ProjectId, WhoficCustomScalesValues, WhoficEntityPostCoordinationSpecification};
    use assert_matches::assert_matches;

    fn request(scales_iri: &str, spec_iri: &str) -> ValidateEntityUpdateRequest {
        ValidateEntityUpdateRequest::new(
            ProjectId::new("p"),
            WhoficCustomScalesValues::new(scales_iri, vec![]),
            WhoficEntityPostCoordinationSpecification::new(spec_iri, "ICD", vec![]),
        )
    }

    #[test]
    fn matching_iris_pass() {
        assert_eq!(check(&request("E1", "E1")), None);
    }

    #[test]
    fn comparison_is_case_sensitive() {
        assert_matches!(
            check(&request("http://x/E1", "http://x/e1")),
            Some(ValidationError::EntityIriMismatch { scale_values_iri, specification_iri })
                if scale_values_iri == "http://x/E1" && specification_iri == "http://x/e1"
        );
    }
}
