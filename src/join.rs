// 🔗 Typed left joins
// Every join keeps all rows of the primary side. A secondary row that cannot
// be found is reported as `Resolved::Unmatched`, never as a silent null.

use std::collections::HashMap;
use std::hash::Hash;

// ============================================================================
// RESOLVED
// ============================================================================

/// Outcome of looking up a foreign key on the secondary side of a join
#[derive(Debug, PartialEq)]
pub enum Resolved<'a, R> {
    Matched(&'a R),
    Unmatched,
}

impl<'a, R> Clone for Resolved<'a, R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, R> Copy for Resolved<'a, R> {}

impl<'a, R> Resolved<'a, R> {
    pub fn is_matched(&self) -> bool {
        matches!(self, Resolved::Matched(_))
    }

    pub fn matched(&self) -> Option<&'a R> {
        match *self {
            Resolved::Matched(row) => Some(row),
            Resolved::Unmatched => None,
        }
    }

    /// Follow a further link from the matched row; stays unmatched otherwise
    pub fn and_then<S>(self, next: impl FnOnce(&'a R) -> Resolved<'a, S>) -> Resolved<'a, S> {
        match self {
            Resolved::Matched(row) => next(row),
            Resolved::Unmatched => Resolved::Unmatched,
        }
    }

    /// Display label of the matched row, or the given sentinel
    pub fn label_or(&self, sentinel: &str, label: impl FnOnce(&'a R) -> String) -> String {
        match *self {
            Resolved::Matched(row) => label(row),
            Resolved::Unmatched => sentinel.to_string(),
        }
    }
}

// ============================================================================
// KEY INDEX
// ============================================================================

/// Hash index over the secondary side of a join
///
/// Keys are expected to be primary keys. When a key repeats, the first row
/// in source order wins.
pub struct KeyIndex<'a, K, R> {
    rows: HashMap<K, &'a R>,
}

impl<'a, K: Eq + Hash, R> KeyIndex<'a, K, R> {
    pub fn build(rows: &'a [R], key: impl Fn(&R) -> K) -> Self {
        let mut index = HashMap::with_capacity(rows.len());
        for row in rows {
            index.entry(key(row)).or_insert(row);
        }
        KeyIndex { rows: index }
    }

    /// Look up a (possibly null) foreign key
    pub fn resolve(&self, key: Option<K>) -> Resolved<'a, R> {
        match key.and_then(|k| self.rows.get(&k).copied()) {
            Some(row) => Resolved::Matched(row),
            None => Resolved::Unmatched,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ============================================================================
// LEFT JOIN
// ============================================================================

/// A primary row paired with its (possibly unmatched) secondary row
#[derive(Debug)]
pub struct Joined<'a, L, R> {
    pub left: &'a L,
    pub right: Resolved<'a, R>,
}

/// Left join `left` to `right`, preserving the order of `left`
///
/// `left_key` returns `None` for a null foreign key, which never matches.
pub fn left_join<'a, L, R, K>(
    left: &'a [L],
    right: &'a [R],
    left_key: impl Fn(&L) -> Option<K>,
    right_key: impl Fn(&R) -> K,
) -> Vec<Joined<'a, L, R>>
where
    K: Eq + Hash,
{
    let index = KeyIndex::build(right, right_key);

    left.iter()
        .map(|row| Joined {
            left: row,
            right: index.resolve(left_key(row)),
        })
        .collect()
}
