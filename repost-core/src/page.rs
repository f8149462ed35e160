//! Page-store value model: repost pages, their list items and typed field values.
//!
//! A field that is absent from [`ListItem::fields`] is *unset*. A field holding
//! an empty string, empty list or zero value is *set*; the two are never
//! conflated.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::PageName;

// ---------------------------------------------------------------------------
// Reference entities
// ---------------------------------------------------------------------------

/// A principal that audience targeting can point at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudienceGroup {
    pub id: i64,
    pub name: String,
}

/// A managed-taxonomy term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomyTerm {
    /// Term GUID in hyphenated form.
    pub id: String,
    pub name: String,
}

/// Metadata required to build typed values for a list field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub internal_name: String,
    pub id: String,
}

// ---------------------------------------------------------------------------
// Field values
// ---------------------------------------------------------------------------

/// Hyperlink field value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlValue {
    pub url: String,
    pub description: String,
}

/// A single taxonomy label/id pair as stored on an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermValue {
    pub label: String,
    pub id: String,
}

/// Multi-valued taxonomy field value, bound to the field it was built for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermCollection {
    pub field_id: String,
    pub terms: Vec<TermValue>,
}

impl TermCollection {
    /// Build a collection from resolved terms for the field `descriptor`.
    pub fn from_terms(descriptor: &FieldDescriptor, terms: &[TaxonomyTerm]) -> Self {
        Self {
            field_id: descriptor.id.clone(),
            terms: terms
                .iter()
                .map(|t| TermValue {
                    label: t.name.clone(),
                    id: t.id.clone(),
                })
                .collect(),
        }
    }

    /// Labels sorted ascending.
    pub fn sorted_labels(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = self.terms.iter().map(|t| t.label.as_str()).collect();
        labels.sort_unstable();
        labels
    }
}

/// A typed value stored in a list item field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    Text(String),
    Number(i64),
    DateTime(DateTime<Utc>),
    Url(UrlValue),
    Terms(TermCollection),
    /// Lookup ids of users or groups.
    Principals(Vec<i64>),
}

impl FieldValue {
    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            FieldValue::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }

    pub fn as_url(&self) -> Option<&UrlValue> {
        match self {
            FieldValue::Url(u) => Some(u),
            _ => None,
        }
    }

    pub fn as_terms(&self) -> Option<&TermCollection> {
        match self {
            FieldValue::Terms(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_principals(&self) -> Option<&[i64]> {
        match self {
            FieldValue::Principals(ids) => Some(ids),
            _ => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::Number(n)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Number(n) => write!(f, "{n}"),
            FieldValue::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%SZ")),
            FieldValue::Url(u) => write!(f, "{}, {}", u.url, u.description),
            FieldValue::Terms(c) => {
                let parts: Vec<String> =
                    c.terms.iter().map(|t| format!("{}|{}", t.label, t.id)).collect();
                f.write_str(&parts.join(";"))
            }
            FieldValue::Principals(ids) => {
                let parts: Vec<String> = ids.iter().map(i64::to_string).collect();
                f.write_str(&parts.join(","))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Items and pages
// ---------------------------------------------------------------------------

/// The list item backing a page: a bag of named field values.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ListItem {
    pub id: u64,
    #[serde(default)]
    pub fields: BTreeMap<String, FieldValue>,
}

impl ListItem {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            fields: BTreeMap::new(),
        }
    }

    /// Current value of `name`, or `None` when the field is unset.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Stage `value` into `name` locally; nothing is sent until the item is updated.
    pub fn set(&mut self, name: impl Into<String>, value: FieldValue) {
        self.fields.insert(name.into(), value);
    }

    /// Unset `name` locally.
    pub fn clear(&mut self, name: &str) {
        self.fields.remove(name);
    }
}

/// Page layout kinds the sync cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PageLayout {
    #[default]
    Article,
    RepostPage,
}

/// A page in the content-management page store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepostPage {
    pub name: PageName,
    pub layout: PageLayout,
    #[serde(default)]
    pub published: bool,
    pub item: ListItem,
}

impl RepostPage {
    /// Store id of the page's list item.
    pub fn id(&self) -> u64 {
        self.item.id
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn unset_and_empty_are_distinct() {
        let mut item = ListItem::new(1);
        assert!(item.get("Title").is_none());
        item.set("Title", FieldValue::from(""));
        assert_eq!(item.get("Title"), Some(&FieldValue::Text(String::new())));
    }

    #[test]
    fn display_uses_string_representation() {
        assert_eq!(FieldValue::Number(2).to_string(), "2");
        let dt = Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap();
        assert_eq!(FieldValue::DateTime(dt).to_string(), "2024-05-06 07:08:09Z");
        assert_eq!(FieldValue::Principals(vec![3, 7]).to_string(), "3,7");
    }

    #[test]
    fn term_collection_labels_are_sorted() {
        let descriptor = FieldDescriptor {
            internal_name: "SourceCategories".to_string(),
            id: "f1".to_string(),
        };
        let terms = vec![
            TaxonomyTerm {
                id: "2".to_string(),
                name: "Engineering".to_string(),
            },
            TaxonomyTerm {
                id: "1".to_string(),
                name: "Careers".to_string(),
            },
        ];
        let collection = TermCollection::from_terms(&descriptor, &terms);
        assert_eq!(collection.field_id, "f1");
        assert_eq!(collection.sorted_labels(), vec!["Careers", "Engineering"]);
    }

    #[test]
    fn field_value_serde_is_tagged() {
        let json = serde_json::to_string(&FieldValue::Number(2)).unwrap();
        assert_eq!(json, r#"{"kind":"number","value":2}"#);
    }
}
