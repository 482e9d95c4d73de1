//! Read-only axis configuration.
//!
//! Two lookups back the validation pipeline: which axes each entity type
//! may use ([`AxisConfigRepository`]) and which hierarchy each axis draws
//! its scale values from ([`ScaleMappingRepository`]). [`AxisCatalog`]
//! serves both from memory.

use crate::model::Iri;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// An axis that groups sub-axes; each sub-axis is usable on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositeAxis {
    pub post_coordination_axis: String,
    #[serde(default)]
    pub sub_axis: Vec<String>,
}

impl CompositeAxis {
    pub fn new<I, S>(axis: impl Into<String>, sub_axes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            post_coordination_axis: axis.into(),
            sub_axis: sub_axes.into_iter().map(Into::into).collect(),
        }
    }
}

/// Axes available to one entity type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityTypeAxisConfig {
    pub entity_type: String,
    #[serde(default)]
    pub post_coordination_axes: Vec<String>,
    #[serde(default)]
    pub composite_post_coordination_axes: Vec<CompositeAxis>,
}

impl EntityTypeAxisConfig {
    pub fn new<I, S>(entity_type: impl Into<String>, axes: I, composites: Vec<CompositeAxis>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entity_type: entity_type.into(),
            post_coordination_axes: axes.into_iter().map(Into::into).collect(),
            composite_post_coordination_axes: composites,
        }
    }

    /// Simple axes followed by every sub-axis of every composite axis.
    pub fn usable_axes(&self) -> impl Iterator<Item = &str> {
        self.post_coordination_axes.iter().map(String::as_str).chain(
            self.composite_post_coordination_axes
                .iter()
                .flat_map(|composite| composite.sub_axis.iter().map(String::as_str)),
        )
    }
}

/// The hierarchy an axis draws its scale values from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisToScaleMapping {
    pub postcoordination_axis: String,
    pub generic_postcoordination_scale_top_class: Iri,
    #[serde(default)]
    pub allow_multi_value: bool,
}

impl AxisToScaleMapping {
    pub fn new(axis: impl Into<String>, top_class: impl Into<Iri>, allow_multi_value: bool) -> Self {
        Self {
            postcoordination_axis: axis.into(),
            generic_postcoordination_scale_top_class: top_class.into(),
            allow_multi_value,
        }
    }
}

/// Lookup of axis configuration by entity type.
pub trait AxisConfigRepository: Send + Sync {
    fn axes_for_entity_types(&self, entity_types: &[String]) -> Vec<EntityTypeAxisConfig>;
}

/// Lookup of the axis to top-class mapping.
pub trait ScaleMappingRepository: Send + Sync {
    fn axis_to_scale_mappings(&self) -> Vec<AxisToScaleMapping>;
}

/// Union of usable axes over configs whose entity type is in `entity_types`.
pub fn allowed_axes(configs: &[EntityTypeAxisConfig], entity_types: &[String]) -> BTreeSet<String> {
    configs
        .iter()
        .filter(|config| entity_types.contains(&config.entity_type))
        .flat_map(EntityTypeAxisConfig::usable_axes)
        .map(str::to_string)
        .collect()
}

/// Axis to top class, keeping the first mapping listed for each axis.
pub fn axis_to_top_class(mappings: &[AxisToScaleMapping]) -> IndexMap<String, Iri> {
    let mut by_axis = IndexMap::with_capacity(mappings.len());
    for mapping in mappings {
        by_axis
            .entry(mapping.postcoordination_axis.clone())
            .or_insert_with(|| mapping.generic_postcoordination_scale_top_class.clone());
    }
    by_axis
}

/// The first axis (in mapping order) whose top class is `top_class`.
pub fn axis_for_top_class<'a>(mappings: &'a [AxisToScaleMapping], top_class: &Iri) -> Option<&'a str> {
    mappings
        .iter()
        .find(|mapping| &mapping.generic_postcoordination_scale_top_class == top_class)
        .map(|mapping| mapping.postcoordination_axis.as_str())
}

/// In-memory axis configuration, typically loaded from a fixture file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisCatalog {
    #[serde(default)]
    pub table_configurations: Vec<EntityTypeAxisConfig>,
    #[serde(default)]
    pub axis_to_scale_mappings: Vec<AxisToScaleMapping>,
}

impl AxisCatalog {
    pub fn new(
        table_configurations: Vec<EntityTypeAxisConfig>,
        axis_to_scale_mappings: Vec<AxisToScaleMapping>,
    ) -> Self {
        Self {
            table_configurations,
            axis_to_scale_mappings,
        }
    }

    /// Allowed axes for `entity_types` according to this catalog.
    pub fn allowed_axes_for(&self, entity_types: &[String]) -> BTreeSet<String> {
        allowed_axes(&self.axes_for_entity_types(entity_types), entity_types)
    }
}

impl AxisConfigRepository for AxisCatalog {
    fn axes_for_entity_types(&self, entity_types: &[String]) -> Vec<EntityTypeAxisConfig> {
        self.table_configurations
            .iter()
            .filter(|config| entity_types.contains(&config.entity_type))
            .cloned()
            .collect()
    }
}

impl ScaleMappingRepository for AxisCatalog {
    fn axis_to_scale_mappings(&self) -> Vec<AxisToScaleMapping> {
        self.axis_to_scale_mappings.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> AxisCatalog {
        AxisCatalog::new(
            vec![
                EntityTypeAxisConfig::new(
                    "ICD",
                    ["Course", "Laterality"],
                    vec![CompositeAxis::new("Anatomy", ["SpecificAnatomy", "Distribution"])],
                ),
                EntityTypeAxisConfig::new("Extension", ["Severity"], vec![]),
            ],
            vec![
                AxisToScaleMapping::new("Course", "http://x/CourseTop", true),
                AxisToScaleMapping::new("Temporality", "http://x/CourseTop", false),
                AxisToScaleMapping::new("Course", "http://x/Shadowed", false),
            ],
        )
    }

    #[test]
    fn allowed_axes_include_composite_sub_axes() {
        let allowed = catalog().allowed_axes_for(&["ICD".to_string()]);
        let expected: BTreeSet<String> = ["Course", "Laterality", "SpecificAnatomy", "Distribution"]
            .into_iter()
            .map(str::to_string)
            .collect();
        assert_eq!(allowed, expected);
        assert!(!allowed.contains("Anatomy"));
    }

    #[test]
    fn allowed_axes_union_over_types() {
        let allowed = catalog().allowed_axes_for(&["ICD".to_string(), "Extension".to_string()]);
        assert!(allowed.contains("Severity"));
        assert!(allowed.contains("Course"));
    }

    #[test]
    fn unknown_type_allows_nothing() {
        assert!(catalog().allowed_axes_for(&["Chapter".to_string()]).is_empty());
    }

    #[test]
    fn configs_for_other_types_are_ignored() {
        let configs = vec![EntityTypeAxisConfig::new("Extension", ["Severity"], vec![])];
        assert!(allowed_axes(&configs, &["ICD".to_string()]).is_empty());
    }

    #[test]
    fn first_mapping_wins_per_axis() {
        let catalog = catalog();
        let by_axis = axis_to_top_class(&catalog.axis_to_scale_mappings);
        assert_eq!(by_axis.get("Course"), Some(&Iri::new("http://x/CourseTop")));
        assert_eq!(by_axis.len(), 2);
    }

    #[test]
    fn reverse_lookup_takes_first_axis_with_root() {
        let catalog = catalog();
        let root = Iri::new("http://x/CourseTop");
        assert_eq!(axis_for_top_class(&catalog.axis_to_scale_mappings, &root), Some("Course"));
        assert_eq!(
            axis_for_top_class(&catalog.axis_to_scale_mappings, &Iri::new("http://x/none")),
            None
        );
    }
}
