//! Domain events describing changes to post-coordination data.

use crate::model::AxisCategory;
use serde::{Deserialize, Serialize};

/// An axis joined one of the four lists of a linearization view.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "eventType", rename_all_fields = "camelCase")]
pub enum SpecificationEvent {
    AddToAllowedAxis {
        post_coordination_axis: String,
        linearization_view: String,
    },
    AddToDefaultAxis {
        post_coordination_axis: String,
        linearization_view: String,
    },
    AddToNotAllowedAxis {
        post_coordination_axis: String,
        linearization_view: String,
    },
    AddToRequiredAxis {
        post_coordination_axis: String,
        linearization_view: String,
    },
}

impl SpecificationEvent {
    /// The event recording that `axis` was added to `category` of `view`.
    pub fn added(category: AxisCategory, axis: impl Into<String>, view: impl Into<String>) -> Self {
        let post_coordination_axis = axis.into();
        let linearization_view = view.into();
        match category {
            AxisCategory::Allowed => SpecificationEvent::AddToAllowedAxis {
                post_coordination_axis,
                linearization_view,
            },
            AxisCategory::Default => SpecificationEvent::AddToDefaultAxis {
                post_coordination_axis,
                linearization_view,
            },
            AxisCategory::NotAllowed => SpecificationEvent::AddToNotAllowedAxis {
                post_coordination_axis,
                linearization_view,
            },
            AxisCategory::Required => SpecificationEvent::AddToRequiredAxis {
                post_coordination_axis,
                linearization_view,
            },
        }
    }

    pub fn category(&self) -> AxisCategory {
        match self {
            SpecificationEvent::AddToAllowedAxis { .. } => AxisCategory::Allowed,
            SpecificationEvent::AddToDefaultAxis { .. } => AxisCategory::Default,
            SpecificationEvent::AddToNotAllowedAxis { .. } => AxisCategory::NotAllowed,
            SpecificationEvent::AddToRequiredAxis { .. } => AxisCategory::Required,
        }
    }

    pub fn axis(&self) -> &str {
        match self {
            SpecificationEvent::AddToAllowedAxis {
                post_coordination_axis,
                ..
            }
            | SpecificationEvent::AddToDefaultAxis {
                post_coordination_axis,
                ..
            }
            | SpecificationEvent::AddToNotAllowedAxis {
                post_coordination_axis,
                ..
            }
            | SpecificationEvent::AddToRequiredAxis {
                post_coordination_axis,
                ..
            } => post_coordination_axis,
        }
    }

    pub fn linearization_view(&self) -> &str {
        match self {
            SpecificationEvent::AddToAllowedAxis {
                linearization_view, ..
            }
            | SpecificationEvent::AddToDefaultAxis {
                linearization_view, ..
            }
            | SpecificationEvent::AddToNotAllowedAxis {
                linearization_view, ..
            }
            | SpecificationEvent::AddToRequiredAxis {
                linearization_view, ..
            } => linearization_view,
        }
    }
}

/// The specification events of one linearization view.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewEvents {
    pub linearization_view: String,
    pub events: Vec<SpecificationEvent>,
}

/// A scale value was assigned to, or withdrawn from, an axis.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "eventType", rename_all_fields = "camelCase")]
pub enum ScaleValueEvent {
    AddCustomScaleValue {
        post_coordination_axis: String,
        post_coordination_scale_value: String,
    },
    RemoveCustomScaleValue {
        post_coordination_axis: String,
        post_coordination_scale_value: String,
    },
}

impl ScaleValueEvent {
    pub fn add(axis: impl Into<String>, value: impl Into<String>) -> Self {
        ScaleValueEvent::AddCustomScaleValue {
            post_coordination_axis: axis.into(),
            post_coordination_scale_value: value.into(),
        }
    }

    pub fn remove(axis: impl Into<String>, value: impl Into<String>) -> Self {
        ScaleValueEvent::RemoveCustomScaleValue {
            post_coordination_axis: axis.into(),
            post_coordination_scale_value: value.into(),
        }
    }

    pub fn axis(&self) -> &str {
        match self {
            ScaleValueEvent::AddCustomScaleValue {
                post_coordination_axis,
                ..
            }
            | ScaleValueEvent::RemoveCustomScaleValue {
                post_coordination_axis,
                ..
            } => post_coordination_axis,
        }
    }

    pub fn scale_value(&self) -> &str {
        match self {
            ScaleValueEvent::AddCustomScaleValue {
                post_coordination_scale_value,
                ..
            }
            | ScaleValueEvent::RemoveCustomScaleValue {
                post_coordination_scale_value,
                ..
            } => post_coordination_scale_value,
        }
    }

    pub fn is_addition(&self) -> bool {
        matches!(self, ScaleValueEvent::AddCustomScaleValue { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn added_maps_every_category() {
        for category in AxisCategory::iter() {
            let event = SpecificationEvent::added(category, "Course", "MMS");
            assert_eq!(event.category(), category);
            assert_eq!(event.axis(), "Course");
            assert_eq!(event.linearization_view(), "MMS");
        }
    }

    #[test]
    fn events_serialize_with_type_tag() {
        let json = serde_json::to_value(ScaleValueEvent::add("Course", "v1")).unwrap();
        assert_eq!(json["eventType"], "AddCustomScaleValue");
        assert_eq!(json["postCoordinationAxis"], "Course");
        assert_eq!(json["postCoordinationScaleValue"], "v1");

        let json = serde_json::to_value(SpecificationEvent::added(
            AxisCategory::NotAllowed,
            "Severity",
            "MMS",
        ))
        .unwrap();
        assert_eq!(json["eventType"], "AddToNotAllowedAxis");
        assert_eq!(json["linearizationView"], "MMS");
    }

    #[test]
    fn events_compare_by_value() {
        assert_eq!(ScaleValueEvent::add("Course", "v1"), ScaleValueEvent::add("Course", "v1"));
        assert_ne!(ScaleValueEvent::add("Course", "v1"), ScaleValueEvent::remove("Course", "v1"));
    }
}
