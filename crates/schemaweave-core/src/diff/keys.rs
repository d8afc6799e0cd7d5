//! Key-set differencing over ordered mappings

use indexmap::IndexSet;

use crate::schema::RESERVED_PREFIX;

/// Classification of two ordered key sets
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyDiff<'a> {
    /// In `next` only, in `next`'s order
    pub added: Vec<&'a str>,
    /// In `prev` only, in `prev`'s order
    pub removed: Vec<&'a str>,
    /// In both, in `next`'s order
    pub common: Vec<&'a str>,
}

impl KeyDiff<'_> {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Classify the keys of `prev` and `next`
///
/// Keys starting with the reserved `__` prefix are ignored on both sides.
pub fn diff_keys<'a, P, N>(prev: P, next: N) -> KeyDiff<'a>
where
    P: IntoIterator<Item = &'a str>,
    N: IntoIterator<Item = &'a str>,
{
    let prev: IndexSet<&str> = prev
        .into_iter()
        .filter(|k| !k.starts_with(RESERVED_PREFIX))
        .collect();
    let next: IndexSet<&str> = next
        .into_iter()
        .filter(|k| !k.starts_with(RESERVED_PREFIX))
        .collect();

    let mut diff = KeyDiff::default();
    for key in &next {
        if prev.contains(key) {
            diff.common.push(*key);
        } else {
            diff.added.push(*key);
        }
    }
    diff.removed = prev.difference(&next).copied().collect();
    diff
}
