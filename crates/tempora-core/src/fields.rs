//! Typed field containers held per node.
//!
//! Fields are partitioned into six maps by kind. A field name lives in at most
//! one map at a time; writing a name under a new kind moves it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::{TemporaError, TemporaResult};

/// The six field kinds a node can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Boolean,
    String,
    Number,
    BooleanList,
    StringList,
    NumberList,
}

/// A field value tagged with its kind. `None` is an explicit null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    Boolean(Option<bool>),
    String(Option<String>),
    Number(Option<f64>),
    BooleanList(Option<Vec<bool>>),
    StringList(Option<Vec<String>>),
    NumberList(Option<Vec<f64>>),
}

impl FieldValue {
    pub fn kind(&self) -> FieldKind {
        match self {
            Self::Boolean(_) => FieldKind::Boolean,
            Self::String(_) => FieldKind::String,
            Self::Number(_) => FieldKind::Number,
            Self::BooleanList(_) => FieldKind::BooleanList,
            Self::StringList(_) => FieldKind::StringList,
            Self::NumberList(_) => FieldKind::NumberList,
        }
    }

    pub fn is_null(&self) -> bool {
        match self {
            Self::Boolean(v) => v.is_none(),
            Self::String(v) => v.is_none(),
            Self::Number(v) => v.is_none(),
            Self::BooleanList(v) => v.is_none(),
            Self::StringList(v) => v.is_none(),
            Self::NumberList(v) => v.is_none(),
        }
    }

    /// Replace one element of a list value, returning the updated value.
    ///
    /// Fails when the value is not a list, is null, the selector misses, or
    /// the replacement item's kind does not match the list.
    pub fn replace_list_item(
        &self,
        selector: &ListItemSelector,
        item: ListItem,
    ) -> TemporaResult<FieldValue> {
        match (self, item) {
            (Self::BooleanList(Some(list)), ListItem::Boolean(b)) => {
                let mut list = list.clone();
                let idx = locate(&list, selector, |x, v| match v {
                    ListItem::Boolean(y) => x == y,
                    _ => false,
                })?;
                list[idx] = b;
                Ok(Self::BooleanList(Some(list)))
            }
            (Self::StringList(Some(list)), ListItem::String(s)) => {
                let mut list = list.clone();
                let idx = locate(&list, selector, |x, v| match v {
                    ListItem::String(y) => x == y,
                    _ => false,
                })?;
                list[idx] = s;
                Ok(Self::StringList(Some(list)))
            }
            (Self::NumberList(Some(list)), ListItem::Number(n)) => {
                let mut list = list.clone();
                let idx = locate(&list, selector, |x, v| match v {
                    ListItem::Number(y) => x == y,
                    _ => false,
                })?;
                list[idx] = n;
                Ok(Self::NumberList(Some(list)))
            }
            (other, item) => Err(TemporaError::ValidationError(format!(
                "cannot replace {:?} item in {:?} value",
                item.kind(),
                other.kind()
            ))),
        }
    }
}

fn locate<T>(
    list: &[T],
    selector: &ListItemSelector,
    matches: impl Fn(&T, &ListItem) -> bool,
) -> TemporaResult<usize> {
    match selector {
        ListItemSelector::ByIndex(idx) if *idx < list.len() => Ok(*idx),
        ListItemSelector::ByIndex(idx) => Err(TemporaError::ValidationError(format!(
            "list index {idx} out of bounds (len {})",
            list.len()
        ))),
        ListItemSelector::ByValue(value) => list
            .iter()
            .position(|x| matches(x, value))
            .ok_or_else(|| TemporaError::ValidationError(format!("list item {value:?} not found"))),
    }
}

/// A single element of a list field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ListItem {
    Boolean(bool),
    Number(f64),
    String(String),
}

impl ListItem {
    /// The list kind this item belongs in.
    pub fn kind(&self) -> FieldKind {
        match self {
            Self::Boolean(_) => FieldKind::BooleanList,
            Self::Number(_) => FieldKind::NumberList,
            Self::String(_) => FieldKind::StringList,
        }
    }
}

/// Which element of a list field an update targets.
///
/// Exactly one of "by value" and "by index" may be given; [`ListItemSelector::parse`]
/// enforces that at construction time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListItemSelector {
    ByValue(ListItem),
    ByIndex(usize),
}

impl ListItemSelector {
    pub fn parse(by_value: Option<ListItem>, by_index: Option<usize>) -> TemporaResult<Self> {
        match (by_value, by_index) {
            (Some(value), None) => Ok(Self::ByValue(value)),
            (None, Some(index)) => Ok(Self::ByIndex(index)),
            (Some(_), Some(_)) => Err(TemporaError::ValidationError(
                "list item selector takes a value or an index, not both".to_string(),
            )),
            (None, None) => Err(TemporaError::ValidationError(
                "list item selector needs a value or an index".to_string(),
            )),
        }
    }
}

/// Six typed maps from field name to optional value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldStore {
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub booleans: BTreeMap<String, Option<bool>>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub strings: BTreeMap<String, Option<String>>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub numbers: BTreeMap<String, Option<f64>>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub boolean_lists: BTreeMap<String, Option<Vec<bool>>>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub string_lists: BTreeMap<String, Option<Vec<String>>>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub number_lists: BTreeMap<String, Option<Vec<f64>>>,
}

impl FieldStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write a field, returning the value it replaced in this store.
    pub fn set(&mut self, name: &str, value: FieldValue) -> Option<FieldValue> {
        let previous = self.remove(name);
        let name = name.to_string();
        match value {
            FieldValue::Boolean(v) => {
                self.booleans.insert(name, v);
            }
            FieldValue::String(v) => {
                self.strings.insert(name, v);
            }
            FieldValue::Number(v) => {
                self.numbers.insert(name, v);
            }
            FieldValue::BooleanList(v) => {
                self.boolean_lists.insert(name, v);
            }
            FieldValue::StringList(v) => {
                self.string_lists.insert(name, v);
            }
            FieldValue::NumberList(v) => {
                self.number_lists.insert(name, v);
            }
        }
        previous
    }

    pub fn get(&self, name: &str) -> Option<FieldValue> {
        if let Some(v) = self.booleans.get(name) {
            return Some(FieldValue::Boolean(*v));
        }
        if let Some(v) = self.strings.get(name) {
            return Some(FieldValue::String(v.clone()));
        }
        if let Some(v) = self.numbers.get(name) {
            return Some(FieldValue::Number(*v));
        }
        if let Some(v) = self.boolean_lists.get(name) {
            return Some(FieldValue::BooleanList(v.clone()));
        }
        if let Some(v) = self.string_lists.get(name) {
            return Some(FieldValue::StringList(v.clone()));
        }
        self.number_lists
            .get(name)
            .map(|v| FieldValue::NumberList(v.clone()))
    }

    pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
        if let Some(v) = self.booleans.remove(name) {
            return Some(FieldValue::Boolean(v));
        }
        if let Some(v) = self.strings.remove(name) {
            return Some(FieldValue::String(v));
        }
        if let Some(v) = self.numbers.remove(name) {
            return Some(FieldValue::Number(v));
        }
        if let Some(v) = self.boolean_lists.remove(name) {
            return Some(FieldValue::BooleanList(v));
        }
        if let Some(v) = self.string_lists.remove(name) {
            return Some(FieldValue::StringList(v));
        }
        self.number_lists.remove(name).map(FieldValue::NumberList)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.booleans.contains_key(name)
            || self.strings.contains_key(name)
            || self.numbers.contains_key(name)
            || self.boolean_lists.contains_key(name)
            || self.string_lists.contains_key(name)
            || self.number_lists.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.booleans.len()
            + self.strings.len()
            + self.numbers.len()
            + self.boolean_lists.len()
            + self.string_lists.len()
            + self.number_lists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every field as `(name, value)`, grouped by kind.
    pub fn entries(&self) -> Vec<(String, FieldValue)> {
        let mut out = Vec::with_capacity(self.len());
        out.extend(self.booleans.iter().map(|(k, v)| (k.clone(), FieldValue::Boolean(*v))));
        out.extend(self.strings.iter().map(|(k, v)| (k.clone(), FieldValue::String(v.clone()))));
        out.extend(self.numbers.iter().map(|(k, v)| (k.clone(), FieldValue::Number(*v))));
        out.extend(
            self.boolean_lists
                .iter()
                .map(|(k, v)| (k.clone(), FieldValue::BooleanList(v.clone()))),
        );
        out.extend(
            self.string_lists
                .iter()
                .map(|(k, v)| (k.clone(), FieldValue::StringList(v.clone()))),
        );
        out.extend(
            self.number_lists
                .iter()
                .map(|(k, v)| (k.clone(), FieldValue::NumberList(v.clone()))),
        );
        out
    }

    /// Last-write-wins overlay: every field in `other` replaces the field of
    /// the same name here. Fields absent from `other` are left alone.
    pub fn overlay(&mut self, other: &FieldStore) {
        for (name, value) in other.entries() {
            self.set(&name, value);
        }
    }
}
