//! Field change detection.
//!
//! Each desired value is tagged with its semantic kind ([`Desired`]); the
//! kind decides how it is compared with the value currently stored on the
//! item. [`FieldStager`] stages the desired value onto the item only when the
//! comparison reports a change, and remembers which fields it touched.
//!
//! An absent current value is *unset*, which is distinct from a stored empty
//! value. A desired value of `None` clears a stored value under
//! [`WritePolicy::Overwrite`]; group lists are the exception and never clear.

use chrono::{DateTime, Utc};

use repost_core::{
    AudienceGroup, FieldDescriptor, FieldValue, ListItem, TaxonomyTerm, TermCollection, UrlValue,
};

/// Whether a field that already holds a value may be overwritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WritePolicy {
    Overwrite,
    /// Only ever fill an unset field.
    SetOnce,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Timestamp,
    TermList,
    GroupList,
    Url,
    Scalar,
}

/// A desired field value, tagged by semantic kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Desired<'a> {
    /// Compared at one-second resolution in UTC.
    Timestamp(Option<DateTime<Utc>>),
    /// Compared by sorted label sequence.
    TermList(&'a [TaxonomyTerm]),
    /// Compared by sorted id sequence. An empty list never clears a stored one.
    GroupList(&'a [AudienceGroup]),
    /// Compared on both url and description.
    Url(Option<UrlValue>),
    /// Compared by string representation.
    Scalar(Option<FieldValue>),
}

impl Desired<'_> {
    pub fn kind(&self) -> FieldKind {
        match self {
            Desired::Timestamp(_) => FieldKind::Timestamp,
            Desired::TermList(_) => FieldKind::TermList,
            Desired::GroupList(_) => FieldKind::GroupList,
            Desired::Url(_) => FieldKind::Url,
            Desired::Scalar(_) => FieldKind::Scalar,
        }
    }

    /// `true` when `current` must be replaced by this value.
    pub fn differs_from(&self, current: Option<&FieldValue>, policy: WritePolicy) -> bool {
        let overwrite = policy == WritePolicy::Overwrite;
        match self {
            Desired::Timestamp(desired) => match (desired, current) {
                (None, None) => false,
                (None, Some(_)) => overwrite,
                (Some(_), None) => true,
                (Some(desired), Some(current)) => {
                    overwrite
                        && current.as_datetime().map(|c| c.timestamp())
                            != Some(desired.timestamp())
                }
            },
            Desired::TermList(desired) => {
                let mut desired_labels: Vec<&str> =
                    desired.iter().map(|t| t.name.as_str()).collect();
                desired_labels.sort_unstable();
                match current {
                    None => !desired_labels.is_empty(),
                    Some(current) => {
                        overwrite
                            && current.as_terms().map(TermCollection::sorted_labels)
                                != Some(desired_labels)
                    }
                }
            }
            Desired::GroupList(desired) => {
                if desired.is_empty() {
                    return false;
                }
                match current {
                    None => true,
                    Some(current) => {
                        let mut desired_ids: Vec<i64> = desired.iter().map(|g| g.id).collect();
                        desired_ids.sort_unstable();
                        let current_ids = current.as_principals().map(|ids| {
                            let mut ids = ids.to_vec();
                            ids.sort_unstable();
                            ids
                        });
                        overwrite && current_ids != Some(desired_ids)
                    }
                }
            }
            Desired::Url(desired) => match (desired, current) {
                (None, None) => false,
                (None, Some(_)) => overwrite,
                (Some(_), None) => true,
                (Some(desired), Some(current)) => overwrite && current.as_url() != Some(desired),
            },
            Desired::Scalar(desired) => match (desired, current) {
                (None, None) => false,
                (None, Some(_)) => overwrite,
                (Some(_), None) => true,
                (Some(desired), Some(current)) => {
                    overwrite && current.to_string() != desired.to_string()
                }
            },
        }
    }

    /// Value to store. Term lists need a descriptor and are built by
    /// [`FieldStager::stage_terms`] instead.
    fn into_value(self) -> Option<FieldValue> {
        match self {
            Desired::Timestamp(dt) => dt.map(FieldValue::DateTime),
            Desired::GroupList(groups) => {
                Some(FieldValue::Principals(groups.iter().map(|g| g.id).collect()))
            }
            Desired::Url(url) => url.map(FieldValue::Url),
            Desired::Scalar(value) => value,
            Desired::TermList(_) => None,
        }
    }
}

/// Stages changed values onto a list item.
#[derive(Debug)]
pub struct FieldStager<'i> {
    item: &'i mut ListItem,
    changed: Vec<String>,
}

impl<'i> FieldStager<'i> {
    pub fn new(item: &'i mut ListItem) -> Self {
        Self {
            item,
            changed: Vec::new(),
        }
    }

    /// Compare and, on change, stage `desired` into `name`. Returns whether it changed.
    pub fn stage(&mut self, name: &str, desired: Desired<'_>, policy: WritePolicy) -> bool {
        debug_assert!(
            desired.kind() != FieldKind::TermList,
            "term lists are staged with stage_terms"
        );
        if !desired.differs_from(self.item.get(name), policy) {
            return false;
        }
        match desired.into_value() {
            Some(value) => self.record(name, value),
            None => self.clear(name),
        }
        true
    }

    /// Term-list variant of [`stage`](Self::stage). `descriptor` is only
    /// called when the terms changed.
    pub fn stage_terms<E, F>(
        &mut self,
        name: &str,
        terms: &[TaxonomyTerm],
        policy: WritePolicy,
        descriptor: F,
    ) -> Result<bool, E>
    where
        F: FnOnce(&str) -> Result<FieldDescriptor, E>,
    {
        if !Desired::TermList(terms).differs_from(self.item.get(name), policy) {
            return Ok(false);
        }
        let descriptor = descriptor(name)?;
        self.record(
            name,
            FieldValue::Terms(TermCollection::from_terms(&descriptor, terms)),
        );
        Ok(true)
    }

    pub fn has_changes(&self) -> bool {
        !self.changed.is_empty()
    }

    /// Names of the fields staged so far, in staging order.
    pub fn into_changed(self) -> Vec<String> {
        self.changed
    }

    fn record(&mut self, name: &str, value: FieldValue) {
        tracing::debug!(field = name, "field changed");
        self.item.set(name, value);
        self.changed.push(name.to_string());
    }

    fn clear(&mut self, name: &str) {
        tracing::debug!(field = name, "field cleared");
        self.item.clear(name);
        self.changed.push(name.to_string());
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t(h: u32, m: u32, s: u32, ms: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, h, m, s).unwrap() + Duration::milliseconds(ms)
    }

    fn group(id: i64) -> AudienceGroup {
        AudienceGroup {
            id,
            name: format!("g{id}"),
        }
    }

    fn term(label: &str) -> TaxonomyTerm {
        TaxonomyTerm {
            id: format!("id-{label}"),
            name: label.to_string(),
        }
    }

    fn terms_value(labels: &[&str]) -> FieldValue {
        FieldValue::Terms(TermCollection {
            field_id: "f".to_string(),
            terms: labels
                .iter()
                .map(|l| repost_core::TermValue {
                    label: l.to_string(),
                    id: format!("id-{l}"),
                })
                .collect(),
        })
    }

    fn url(u: &str, d: &str) -> UrlValue {
        UrlValue {
            url: u.to_string(),
            description: d.to_string(),
        }
    }

    // -- timestamps --------------------------------------------------------

    #[test]
    fn set_once_timestamp_fills_unset_field() {
        let desired = Desired::Timestamp(Some(t(9, 0, 0, 0)));
        assert!(desired.differs_from(None, WritePolicy::SetOnce));
    }

    #[test]
    fn set_once_timestamp_never_moves() {
        let current = FieldValue::DateTime(t(9, 0, 0, 0));
        let desired = Desired::Timestamp(Some(t(10, 0, 0, 0)));
        assert!(!desired.differs_from(Some(&current), WritePolicy::SetOnce));
    }

    #[test]
    fn sub_second_difference_is_not_a_change() {
        let current = FieldValue::DateTime(t(9, 0, 0, 100));
        let desired = Desired::Timestamp(Some(t(9, 0, 0, 500)));
        assert!(!desired.differs_from(Some(&current), WritePolicy::Overwrite));
    }

    #[test]
    fn one_and_a_half_seconds_is_a_change() {
        let current = FieldValue::DateTime(t(9, 0, 0, 0));
        let desired = Desired::Timestamp(Some(t(9, 0, 1, 500)));
        assert!(desired.differs_from(Some(&current), WritePolicy::Overwrite));
    }

    #[test]
    fn missing_desired_timestamp_on_unset_field_is_not_a_change() {
        assert!(!Desired::Timestamp(None).differs_from(None, WritePolicy::Overwrite));
    }

    #[test]
    fn missing_desired_timestamp_clears_unless_set_once() {
        let current = FieldValue::DateTime(t(9, 0, 0, 0));
        assert!(Desired::Timestamp(None).differs_from(Some(&current), WritePolicy::Overwrite));
        assert!(!Desired::Timestamp(None).differs_from(Some(&current), WritePolicy::SetOnce));
    }

    #[test]
    fn non_timestamp_current_value_is_replaced() {
        let current = FieldValue::from("2024-03-01");
        let desired = Desired::Timestamp(Some(t(9, 0, 0, 0)));
        assert!(desired.differs_from(Some(&current), WritePolicy::Overwrite));
    }

    // -- term lists --------------------------------------------------------

    #[test]
    fn term_order_does_not_matter() {
        let current = terms_value(&["Engineering", "Careers"]);
        let desired = [term("Careers"), term("Engineering")];
        assert!(!Desired::TermList(&desired).differs_from(Some(&current), WritePolicy::Overwrite));
    }

    #[test]
    fn term_subset_is_a_change() {
        let current = terms_value(&["Careers", "Engineering"]);
        let desired = [term("Careers")];
        assert!(Desired::TermList(&desired).differs_from(Some(&current), WritePolicy::Overwrite));
    }

    #[test]
    fn empty_terms_on_unset_field_is_not_a_change() {
        assert!(!Desired::TermList(&[]).differs_from(None, WritePolicy::Overwrite));
    }

    #[test]
    fn empty_terms_clear_stored_terms() {
        let current = terms_value(&["Careers"]);
        assert!(Desired::TermList(&[]).differs_from(Some(&current), WritePolicy::Overwrite));
    }

    // -- group lists -------------------------------------------------------

    #[test]
    fn group_order_does_not_matter() {
        let current = FieldValue::Principals(vec![9, 3]);
        let desired = [group(3), group(9)];
        assert!(
            !Desired::GroupList(&desired).differs_from(Some(&current), WritePolicy::Overwrite)
        );
    }

    #[test]
    fn different_groups_are_a_change() {
        let current = FieldValue::Principals(vec![3]);
        let desired = [group(3), group(9)];
        assert!(Desired::GroupList(&desired).differs_from(Some(&current), WritePolicy::Overwrite));
    }

    /// Deliberate exception: an empty mapping must not un-target a page.
    #[test]
    fn empty_group_list_never_clears_targeting() {
        let current = FieldValue::Principals(vec![1, 2]);
        assert!(!Desired::GroupList(&[]).differs_from(Some(&current), WritePolicy::Overwrite));
        assert!(!Desired::GroupList(&[]).differs_from(None, WritePolicy::Overwrite));
    }

    // -- urls and scalars --------------------------------------------------

    #[test]
    fn url_description_change_is_detected() {
        let current = FieldValue::Url(url("https://a", "a"));
        let desired = Desired::Url(Some(url("https://a", "b")));
        assert!(desired.differs_from(Some(&current), WritePolicy::Overwrite));
        let same = Desired::Url(Some(url("https://a", "a")));
        assert!(!same.differs_from(Some(&current), WritePolicy::Overwrite));
    }

    #[test]
    fn scalar_compares_string_representation() {
        let current = FieldValue::from("2");
        let desired = Desired::Scalar(Some(FieldValue::Number(2)));
        assert!(!desired.differs_from(Some(&current), WritePolicy::Overwrite));
    }

    #[test]
    fn empty_string_is_not_unset() {
        let current = FieldValue::from("");
        let desired = Desired::Scalar(Some(FieldValue::from("")));
        assert!(!desired.differs_from(Some(&current), WritePolicy::Overwrite));
        assert!(desired.differs_from(None, WritePolicy::Overwrite));
    }

    #[test]
    fn missing_url_clears_stored_url() {
        let current = FieldValue::Url(url("https://a", "a"));
        assert!(Desired::Url(None).differs_from(Some(&current), WritePolicy::Overwrite));
        assert!(!Desired::Url(None).differs_from(None, WritePolicy::Overwrite));
    }

    // -- stager ------------------------------------------------------------

    #[test]
    fn stager_clears_field_when_value_disappears() {
        let mut item = ListItem::new(1);
        item.set("SourceProvider", FieldValue::from("Newsroom"));
        let mut stager = FieldStager::new(&mut item);
        assert!(stager.stage("SourceProvider", Desired::Scalar(None), WritePolicy::Overwrite));
        assert!(!stager.stage("SourceProvider", Desired::Scalar(None), WritePolicy::Overwrite));
        assert_eq!(stager.into_changed(), vec!["SourceProvider".to_string()]);
        assert!(item.get("SourceProvider").is_none());
    }

    #[test]
    fn stager_only_records_changes() {
        let mut item = ListItem::new(1);
        item.set("Title", FieldValue::from("Same"));
        let mut stager = FieldStager::new(&mut item);
        assert!(!stager.stage(
            "Title",
            Desired::Scalar(Some(FieldValue::from("Same"))),
            WritePolicy::Overwrite
        ));
        assert!(stager.stage(
            "Description",
            Desired::Scalar(Some(FieldValue::from("New"))),
            WritePolicy::Overwrite
        ));
        assert_eq!(stager.into_changed(), vec!["Description".to_string()]);
        assert_eq!(item.get("Description"), Some(&FieldValue::from("New")));
    }

    #[test]
    fn stage_terms_resolves_descriptor_only_on_change() {
        let mut item = ListItem::new(1);
        item.set("SourceCategories", terms_value(&["Careers"]));
        let desired = [term("Careers")];
        let mut stager = FieldStager::new(&mut item);
        let changed = stager
            .stage_terms::<(), _>("SourceCategories", &desired, WritePolicy::Overwrite, |_| {
                panic!("descriptor must not be fetched for unchanged terms")
            })
            .unwrap();
        assert!(!changed);

        let desired = [term("Careers"), term("Engineering")];
        let changed = stager
            .stage_terms::<(), _>("SourceCategories", &desired, WritePolicy::Overwrite, |name| {
                Ok(FieldDescriptor {
                    internal_name: name.to_string(),
                    id: "fid".to_string(),
                })
            })
            .unwrap();
        assert!(changed);
        assert!(stager.has_changes());
        let stored = item.get("SourceCategories").and_then(FieldValue::as_terms).unwrap();
        assert_eq!(stored.field_id, "fid");
        assert_eq!(stored.sorted_labels(), vec!["Careers", "Engineering"]);
    }
}
