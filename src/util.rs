use std::hash::Hash;

use itertools::Itertools;

/// Returns each distinct item once, in order of first occurrence.
pub fn unique<T, I>(items: I) -> Vec<T>
where
    I: IntoIterator<Item = T>,
    T: Eq + Hash + Clone,
{
    items.into_iter().unique().collect()
}
