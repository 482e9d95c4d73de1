//! Entity-level post-coordination data model.
//!
//! The JSON shapes follow the wire contract of the post-coordination
//! service: camelCase field names, `null` lists accepted as empty, and
//! `null` entries inside axis or value lists dropped on the way in.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use strum::{AsRefStr, EnumIter};

// ============================================================================
// Identifiers
// ============================================================================

/// Identifier of the project an entity belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(String);

impl ProjectId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An IRI naming an ontology entity, a scale value, or a hierarchy root.
///
/// Comparison is byte-for-byte; no normalization is applied.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Iri(String);

impl Iri {
    pub fn new(iri: impl Into<String>) -> Self {
        Self(iri.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

}

impl fmt::Display for Iri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Iri {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Iri {
    fn from(value: String) -> Self {
        Self(value)
    }
}

// ============================================================================
// Specification
// ============================================================================

/// The four per-view axis lists of a specification.
///
/// The string form is the list's wire name, which is also how the list is
/// named in validation messages. Declaration order is the order in which
/// lists are visited by checks and mappers.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, AsRefStr, EnumIter, Serialize, Deserialize,
)]
pub enum AxisCategory {
    #[strum(serialize = "allowedAxes")]
    Allowed,
    #[strum(serialize = "defaultAxes")]
    Default,
    #[strum(serialize = "notAllowedAxes")]
    NotAllowed,
    #[strum(serialize = "requiredAxes")]
    Required,
}

impl fmt::Display for AxisCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

/// Axis permissions of one entity under one linearization view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostCoordinationSpecification {
    pub linearization_view: String,
    #[serde(default, deserialize_with = "non_null_entries")]
    pub allowed_axes: Vec<String>,
    #[serde(default, deserialize_with = "non_null_entries")]
    pub default_axes: Vec<String>,
    #[serde(default, deserialize_with = "non_null_entries")]
    pub not_allowed_axes: Vec<String>,
    #[serde(default, deserialize_with = "non_null_entries")]
    pub required_axes: Vec<String>,
}

impl PostCoordinationSpecification {
    pub fn new(linearization_view: impl Into<String>) -> Self {
        Self {
            linearization_view: linearization_view.into(),
            ..Self::default()
        }
    }

    pub fn with_axes<I, S>(mut self, category: AxisCategory, axes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.axes_mut(category).extend(axes.into_iter().map(Into::into));
        self
    }

    pub fn axes(&self, category: AxisCategory) -> &[String] {
        match category {
            AxisCategory::Allowed => &self.allowed_axes,
            AxisCategory::Default => &self.default_axes,
            AxisCategory::Required => &self.required_axes,
            AxisCategory::NotAllowed => &self.not_allowed_axes,
        }
    }

    fn axes_mut(&mut self, category: AxisCategory) -> &mut Vec<String> {
        match category {
            AxisCategory::Allowed => &mut self.allowed_axes,
            AxisCategory::Default => &mut self.default_axes,
            AxisCategory::Required => &mut self.required_axes,
            AxisCategory::NotAllowed => &mut self.not_allowed_axes,
        }
    }
}

/// All per-view specifications of one entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhoficEntityPostCoordinationSpecification {
    pub whofic_entity_iri: String,
    #[serde(default)]
    pub entity_type: Option<String>,
    #[serde(default, deserialize_with = "non_null_entries")]
    pub postcoordination_specifications: Vec<PostCoordinationSpecification>,
}

impl WhoficEntityPostCoordinationSpecification {
    pub fn new(
        whofic_entity_iri: impl Into<String>,
        entity_type: impl Into<String>,
        specifications: Vec<PostCoordinationSpecification>,
    ) -> Self {
        Self {
            whofic_entity_iri: whofic_entity_iri.into(),
            entity_type: Some(entity_type.into()),
            postcoordination_specifications: specifications,
        }
    }

    /// The first view whose name matches `view`, ignoring case (Unicode aware).
    pub fn view(&self, view: &str) -> Option<&PostCoordinationSpecification> {
        let wanted = view.to_lowercase();
        self.postcoordination_specifications
            .iter()
            .find(|spec| spec.linearization_view.to_lowercase() == wanted)
    }
}

// ============================================================================
// Custom scale values
// ============================================================================

/// Scale values assigned to one axis of an entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaleCustomization {
    #[serde(default, deserialize_with = "non_null_entries")]
    pub postcoordination_scale_values: Vec<String>,
    #[serde(default)]
    pub postcoordination_axis: Option<String>,
}

impl ScaleCustomization {
    pub fn new<I, S>(axis: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            postcoordination_scale_values: values.into_iter().map(Into::into).collect(),
            postcoordination_axis: Some(axis.into()),
        }
    }

    pub fn axis(&self) -> Option<&str> {
        self.postcoordination_axis.as_deref()
    }

    /// Values that can name an IRI: empty strings are skipped.
    pub fn value_iris(&self) -> impl Iterator<Item = Iri> + '_ {
        self.postcoordination_scale_values
            .iter()
            .filter(|value| !value.is_empty())
            .map(|value| Iri::new(value.as_str()))
    }
}

/// All scale customizations of one entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhoficCustomScalesValues {
    pub whofic_entity_iri: String,
    #[serde(default, deserialize_with = "non_null_entries")]
    pub scale_customizations: Vec<ScaleCustomization>,
}

impl WhoficCustomScalesValues {
    pub fn new(whofic_entity_iri: impl Into<String>, customizations: Vec<ScaleCustomization>) -> Self {
        Self {
            whofic_entity_iri: whofic_entity_iri.into(),
            scale_customizations: customizations,
        }
    }

    /// Customizations that name an axis, paired with that axis.
    pub fn with_axis(&self) -> impl Iterator<Item = (&str, &ScaleCustomization)> {
        self.scale_customizations
            .iter()
            .filter_map(|customization| customization.axis().map(|axis| (axis, customization)))
    }
}

/// Accepts a missing or `null` list as empty and drops `null` entries.
fn non_null_entries<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let entries = Option::<Vec<Option<T>>>::deserialize(deserializer)?;
    Ok(entries.unwrap_or_default().into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_lists_and_entries_are_dropped() {
        let json = r#"{
            "linearizationView": "MMS",
            "allowedAxes": ["Course", null, "Laterality"],
            "defaultAxes": null
        }"#;
        let spec: PostCoordinationSpecification = serde_json::from_str(json).unwrap();

        assert_eq!(spec.allowed_axes, vec!["Course", "Laterality"]);
        assert!(spec.default_axes.is_empty());
        assert!(spec.required_axes.is_empty());
        assert!(spec.not_allowed_axes.is_empty());
    }

    #[test]
    fn customization_without_axis_is_kept_but_unnamed() {
        let json = r#"{
            "whoficEntityIri": "E1",
            "scaleCustomizations": [
                {"postcoordinationAxis": null, "postcoordinationScaleValues": ["v1"]},
                {"postcoordinationAxis": "Course", "postcoordinationScaleValues": null}
            ]
        }"#;
        let scales: WhoficCustomScalesValues = serde_json::from_str(json).unwrap();

        assert_eq!(scales.scale_customizations.len(), 2);
        let named: Vec<_> = scales.with_axis().map(|(axis, _)| axis).collect();
        assert_eq!(named, vec!["Course"]);
        assert!(scales.scale_customizations[1].postcoordination_scale_values.is_empty());
    }

    #[test]
    fn value_iris_skip_empty_strings() {
        let customization = ScaleCustomization::new("Course", ["", "http://x/a"]);
        let iris: Vec<_> = customization.value_iris().collect();
        assert_eq!(iris, vec![Iri::new("http://x/a")]);
    }

    #[test]
    fn category_names_match_wire_names() {
        assert_eq!(AxisCategory::Allowed.to_string(), "allowedAxes");
        assert_eq!(AxisCategory::NotAllowed.as_ref(), "notAllowedAxes");
    }

    #[test]
    fn view_lookup_ignores_case() {
        let entity = WhoficEntityPostCoordinationSpecification::new(
            "E1",
            "ICD",
            vec![PostCoordinationSpecification::new("http://id.who.int/icd/release/11/mms")],
        );
        assert!(entity.view("HTTP://ID.WHO.INT/ICD/RELEASE/11/MMS").is_some());
        assert!(entity.view("other").is_none());
    }

    #[test]
    fn view_lookup_folds_non_ascii_letters() {
        let entity = WhoficEntityPostCoordinationSpecification::new(
            "E1",
            "ICD",
            vec![PostCoordinationSpecification::new("Ärzte")],
        );
        assert_eq!(entity.view("ärzte").map(|spec| spec.linearization_view.as_str()), Some("Ärzte"));
        assert!(entity.view("ÄRZTE").is_some());
        assert!(entity.view("arzte").is_none());
    }
}
