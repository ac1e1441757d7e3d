use std::collections::HashSet;
use std::fmt;

use indexmap::IndexMap;
use itertools::Itertools;
use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

use crate::collation::locale_compare;

const DUPLICATE_KEY_HEADER: &str = "flag names already exist:";

/// A FlagTable maps flag names to boolean values, e.g. the globals an environment defines and
/// whether each of them is writable.
///
/// Iteration follows insertion order. [sort_keys], [merge] and [intersect] always return
/// tables in canonical order (see [crate::locale_compare]). Equality ignores order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FlagTable {
    entries: IndexMap<String, bool>,
}

impl FlagTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: IndexMap::with_capacity(capacity),
        }
    }

    /// Sets the value for `name`, returning the previous value if the name was already present.
    /// A replaced name keeps its original position.
    pub fn insert(&mut self, name: impl Into<String>, value: bool) -> Option<bool> {
        self.entries.insert(name.into(), value)
    }

    pub fn get(&self, name: &str) -> Option<bool> {
        self.entries.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Flag names in iteration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), *value))
    }
}

impl<K: Into<String>> FromIterator<(K, bool)> for FlagTable {
    fn from_iter<I: IntoIterator<Item = (K, bool)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value))
                .collect(),
        }
    }
}

impl<K: Into<String>> Extend<(K, bool)> for FlagTable {
    fn extend<I: IntoIterator<Item = (K, bool)>>(&mut self, iter: I) {
        self.entries
            .extend(iter.into_iter().map(|(name, value)| (name.into(), value)));
    }
}

impl IntoIterator for FlagTable {
    type Item = (String, bool);
    type IntoIter = indexmap::map::IntoIter<String, bool>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

// Tables read from disk must hold non-empty, unique names and only boolean values; the map
// type alone would silently keep the last of two duplicate names.
impl<'de> Deserialize<'de> for FlagTable {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct FlagTableVisitor;

        impl<'de> Visitor<'de> for FlagTableVisitor {
            type Value = FlagTable;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map of flag names to booleans")
            }

            fn visit_map<V>(self, mut map: V) -> Result<FlagTable, V::Error>
            where
                V: MapAccess<'de>,
            {
                let mut table = FlagTable::with_capacity(map.size_hint().unwrap_or(0));

                while let Some(name) = map.next_key::<String>()? {
                    if name.is_empty() {
                        return Err(de::Error::custom("flag name must not be empty"));
                    }
                    let value: bool = map.next_value()?;
                    if table.contains(&name) {
                        return Err(de::Error::custom(format!("duplicate flag name `{}`", name)));
                    }
                    table.insert(name, value);
                }

                Ok(table)
            }
        }

        deserializer.deserialize_map(FlagTableVisitor)
    }
}

/// DuplicateKeyError is returned by [merge] when both tables define at least one common name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DuplicateKeyError {
    /// Every colliding name, in the iteration order of the second table.
    pub names: Vec<String>,
}

impl fmt::Display for DuplicateKeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", DUPLICATE_KEY_HEADER)?;
        for name in &self.names {
            write!(f, "\n - {}", name)?;
        }
        Ok(())
    }
}

impl std::error::Error for DuplicateKeyError {}

/// Returns a copy of `table` iterating in canonical name order.
pub fn sort_keys(table: &FlagTable) -> FlagTable {
    table
        .entries
        .iter()
        .sorted_by(|(a, _), (b, _)| locale_compare(a, b))
        .map(|(name, value)| (name.clone(), *value))
        .collect()
}

/// Combines two tables that must not share any name.
///
/// Fails with every name of `b` that `a` already defines; no entry is ever overwritten.
pub fn merge(a: &FlagTable, b: &FlagTable) -> Result<FlagTable, DuplicateKeyError> {
    let names_a: HashSet<&str> = a.names().collect();
    let duplicates: Vec<String> = b
        .names()
        .filter(|name| names_a.contains(name))
        .map(str::to_owned)
        .collect();

    if !duplicates.is_empty() {
        return Err(DuplicateKeyError { names: duplicates });
    }

    let mut merged = FlagTable::with_capacity(a.len() + b.len());
    merged.extend(a.iter().chain(b.iter()));
    Ok(sort_keys(&merged))
}

/// Returns the names present in both tables. For each of them the value from `b` is used.
pub fn intersect(a: &FlagTable, b: &FlagTable) -> FlagTable {
    let intersection: FlagTable = b.iter().filter(|(name, _)| a.contains(name)).collect();
    sort_keys(&intersection)
}
