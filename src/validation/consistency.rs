//! Consistency between custom scales and the specification.

use super::ValidateEntityUpdateRequest;
use crate::error::ValidationError;
use crate::model::AxisCategory;
use indexmap::IndexSet;
use std::collections::HashSet;

/// Each custom scale axis must appear in the allowed or required list of at
/// least one view. An offending axis is reported once.
pub fn check(request: &ValidateEntityUpdateRequest) -> Vec<ValidationError> {
    let declared: HashSet<&str> = request
        .entity_specification
        .postcoordination_specifications
        .iter()
        .flat_map(|specification| {
            specification
                .axes(AxisCategory::Allowed)
                .iter()
                .chain(specification.axes(AxisCategory::Required))
        })
        .map(String::as_str)
        .collect();

    let offending: IndexSet<&str> = request
        .entity_custom_scale_values
        .with_axis()
        .map(|(axis, _)| axis)
        .filter(|axis| !declared.contains(axis))
        .collect();

    offending
        .into_iter()
        .map(|axis| ValidationError::AxisNotInSpecification {
            axis: axis.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        PostCoordinationSpecification, ProjectId, ScaleCustomization, WhoficCustomScalesValues,
        WhoficEntityPostCoordinationSpecification,
    };

    fn request(customizations: Vec<ScaleCustomization>) -> ValidateEntityUpdateRequest {
        ValidateEntityUpdateRequest::new(
            ProjectId::new("p"),
            WhoficCustomScalesValues::new("E1", customizations),
            WhoficEntityPostCoordinationSpecification::new(
                "E1",
                "ICD",
                vec![
                    PostCoordinationSpecification::new("MMS")
                        .with_axes(AxisCategory::Allowed, ["Course"])
                        .with_axes(AxisCategory::Default, ["Severity"]),
                    PostCoordinationSpecification::new("Research")
                        .with_axes(AxisCategory::Required, ["Laterality"]),
                ],
            ),
        )
    }

    #[test]
    fn axes_from_any_view_count() {
        let errors = check(&request(vec![
            ScaleCustomization::new("Course", ["a"]),
            ScaleCustomization::new("Laterality", ["b"]),
        ]));
        assert!(errors.is_empty());
    }

    #[test]
    fn default_and_not_allowed_lists_do_not_count() {
        let errors = check(&request(vec![
            ScaleCustomization::new("Severity", ["a"]),
            ScaleCustomization::new("Severity", ["b"]),
            ScaleCustomization::new("Temporality", ["c"]),
        ]));
        assert_eq!(
            errors,
            vec![
                ValidationError::AxisNotInSpecification {
                    axis: "Severity".to_string()
                },
                ValidationError::AxisNotInSpecification {
                    axis: "Temporality".to_string()
                },
            ]
        );
    }
}
