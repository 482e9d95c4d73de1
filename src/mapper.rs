//! Translation of post-coordination snapshots into domain events.
//!
//! All functions are pure. Specification diffs only ever report additions;
//! scale value diffs report both additions and removals.

use crate::events::{ScaleValueEvent, SpecificationEvent, ViewEvents};
use crate::model::{
    AxisCategory, PostCoordinationSpecification, WhoficCustomScalesValues,
    WhoficEntityPostCoordinationSpecification,
};
use indexmap::{IndexMap, IndexSet};
use std::collections::{BTreeMap, BTreeSet};
use strum::IntoEnumIterator;

/// Import events for one view, keeping only axes in `allowed_axes`.
pub fn events_from_specification(
    specification: &PostCoordinationSpecification,
    allowed_axes: &BTreeSet<String>,
) -> Vec<SpecificationEvent> {
    let view = &specification.linearization_view;
    let mut events = IndexSet::new();
    for category in AxisCategory::iter() {
        events.extend(
            specification
                .axes(category)
                .iter()
                .filter(|axis| allowed_axes.contains(axis.as_str()))
                .map(|axis| SpecificationEvent::added(category, axis.as_str(), view.as_str())),
        );
    }
    events.into_iter().collect()
}

/// Import events for every value of every customization that names an axis.
pub fn scale_events_for_first_import(scales: &WhoficCustomScalesValues) -> BTreeSet<ScaleValueEvent> {
    scales
        .with_axis()
        .flat_map(|(axis, customization)| {
            customization
                .postcoordination_scale_values
                .iter()
                .map(move |value| ScaleValueEvent::add(axis, value.as_str()))
        })
        .collect()
}

/// Axis additions that turn `existing` into `updated`, grouped by view.
///
/// Views of `updated` are matched to views of `existing` by name, ignoring
/// case. A view with no counterpart contributes every one of its axes.
/// Views without any addition are left out.
pub fn specification_events_from_diff(
    existing: &WhoficEntityPostCoordinationSpecification,
    updated: &WhoficEntityPostCoordinationSpecification,
) -> Vec<ViewEvents> {
    let mut grouped: Vec<ViewEvents> = Vec::new();
    for specification in &updated.postcoordination_specifications {
        let view = specification.linearization_view.as_str();
        let previous = existing.view(view);

        let mut events = IndexSet::new();
        for category in AxisCategory::iter() {
            let before: &[String] = previous.map(|spec| spec.axes(category)).unwrap_or_default();
            events.extend(
                specification
                    .axes(category)
                    .iter()
                    .filter(|axis| !before.contains(*axis))
                    .map(|axis| SpecificationEvent::added(category, axis.as_str(), view)),
            );
        }

        if events.is_empty() {
            continue;
        }
        let view_events = ViewEvents {
            linearization_view: view.to_string(),
            events: events.into_iter().collect(),
        };
        if !grouped.contains(&view_events) {
            grouped.push(view_events);
        }
    }
    grouped
}

/// Scale value events that turn `old` into `new`.
///
/// Axis names are matched ignoring case and values are compared as sets.
/// A missing snapshot is treated as one without customizations.
pub fn scale_events_from_diff(
    old: Option<&WhoficCustomScalesValues>,
    new: Option<&WhoficCustomScalesValues>,
) -> BTreeSet<ScaleValueEvent> {
    let old_index = old.map(ScaleValueIndex::from_scales).unwrap_or_default();
    let new_index = new.map(ScaleValueIndex::from_scales).unwrap_or_default();

    let axes: BTreeSet<&String> = old_index.values.keys().chain(new_index.values.keys()).collect();
    let empty = BTreeSet::new();
    let mut events = BTreeSet::new();

    for key in axes {
        let axis = new_index
            .spellings
            .get(key)
            .or_else(|| old_index.spellings.get(key))
            .map(String::as_str)
            .unwrap_or(key.as_str());
        let before = old_index.values.get(key).unwrap_or(&empty);
        let after = new_index.values.get(key).unwrap_or(&empty);

        events.extend(after.difference(before).map(|value| ScaleValueEvent::add(axis, value.as_str())));
        events.extend(before.difference(after).map(|value| ScaleValueEvent::remove(axis, value.as_str())));
    }
    events
}

/// Groups events by their axis, keeping input order within each group.
pub fn group_scale_events_by_axis<'a, I>(events: I) -> IndexMap<String, Vec<ScaleValueEvent>>
where
    I: IntoIterator<Item = &'a ScaleValueEvent>,
{
    let mut grouped: IndexMap<String, Vec<ScaleValueEvent>> = IndexMap::new();
    for event in events {
        grouped
            .entry(event.axis().to_string())
            .or_default()
            .push(event.clone());
    }
    grouped
}

/// Scale values keyed by lower-cased axis name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScaleValueIndex {
    values: BTreeMap<String, BTreeSet<String>>,
    spellings: BTreeMap<String, String>,
}

impl ScaleValueIndex {
    pub fn from_scales(scales: &WhoficCustomScalesValues) -> Self {
        let mut index = Self::default();
        for (axis, customization) in scales.with_axis() {
            let key = index.key_for(axis);
            index
                .values
                .entry(key)
                .or_default()
                .extend(customization.postcoordination_scale_values.iter().cloned());
        }
        index
    }

    /// Values recorded for `axis`, matched ignoring case.
    pub fn values(&self, axis: &str) -> Option<&BTreeSet<String>> {
        self.values.get(&axis.to_lowercase())
    }

    /// Axes that currently hold at least one value.
    pub fn non_empty_axes(&self) -> impl Iterator<Item = &str> {
        self.values
            .iter()
            .filter(|(_, values)| !values.is_empty())
            .map(|(key, _)| self.spellings.get(key).map(String::as_str).unwrap_or(key.as_str()))
    }

    /// Replays `events` on top of this index.
    pub fn apply<'a, I>(&mut self, events: I)
    where
        I: IntoIterator<Item = &'a ScaleValueEvent>,
    {
        for event in events {
            let key = self.key_for(event.axis());
            let values = self.values.entry(key).or_default();
            if event.is_addition() {
                values.insert(event.scale_value().to_string());
            } else {
                values.remove(event.scale_value());
            }
        }
    }

    /// True when both indexes hold the same non-empty value sets.
    pub fn same_values(&self, other: &ScaleValueIndex) -> bool {
        let populated = |index: &ScaleValueIndex| -> BTreeMap<String, BTreeSet<String>> {
            index
                .values
                .iter()
                .filter(|(_, values)| !values.is_empty())
                .map(|(key, values)| (key.clone(), values.clone()))
                .collect()
        };
        populated(self) == populated(other)
    }

    fn key_for(&mut self, axis: &str) -> String {
        let key = axis.to_lowercase();
        self.spellings
            .entry(key.clone())
            .or_insert_with(|| axis.to_string());
        key
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ScaleCustomization;

    fn scales(customizations: Vec<ScaleCustomization>) -> WhoficCustomScalesValues {
        WhoficCustomScalesValues::new("E1", customizations)
    }

    #[test]
    fn index_accumulates_same_axis_across_cases() {
        let index = ScaleValueIndex::from_scales(&scales(vec![
            ScaleCustomization::new("Course", ["v1"]),
            ScaleCustomization::new("COURSE", ["v2", "v1"]),
        ]));
        let values = index.values("course").unwrap();
        assert_eq!(values.len(), 2);
        assert_eq!(index.non_empty_axes().collect::<Vec<_>>(), vec!["Course"]);
    }

    #[test]
    fn apply_adds_and_removes() {
        let mut index = ScaleValueIndex::from_scales(&scales(vec![ScaleCustomization::new(
            "Course",
            ["v1"],
        )]));
        index.apply(&[ScaleValueEvent::add("course", "v2"), ScaleValueEvent::remove("Course", "v1")]);

        let values = index.values("Course").unwrap();
        assert_eq!(values.iter().collect::<Vec<_>>(), vec!["v2"]);
    }

    #[test]
    fn same_values_ignores_emptied_axes() {
        let mut index = ScaleValueIndex::from_scales(&scales(vec![ScaleCustomization::new(
            "Course",
            ["v1"],
        )]));
        index.apply(&[ScaleValueEvent::remove("Course", "v1")]);
        assert!(index.same_values(&ScaleValueIndex::default()));
    }

    #[test]
    fn customizations_without_axis_are_ignored() {
        let mut anonymous = ScaleCustomization::new("x", ["v1"]);
        anonymous.postcoordination_axis = None;
        let snapshot = scales(vec![anonymous]);

        assert!(scale_events_for_first_import(&snapshot).is_empty());
        assert!(scale_events_from_diff(None, Some(&snapshot)).is_empty());
    }
}
