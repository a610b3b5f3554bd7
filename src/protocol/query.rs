//! Query-string utilities consumed by handlers.
//!
//! The router never inspects the query; these are pure helpers for splitting
//! a raw request target and parsing its query string.

/// Splits a raw request target into `(path, query)` on the first `?`.
///
/// The `?` itself belongs to neither part. A target without a query yields
/// an empty query string.
pub fn split_target(target: &str) -> (&str, &str) {
    match target.split_once('?') {
        Some((path, query)) => (path, query),
        None => (target, ""),
    }
}

/// An ordered key→value view over a query string.
///
/// Pairs are split on `&`, then on the first `=`; a pair lacking `=` is
/// ignored. Duplicate keys keep the last occurrence, in the position the key
/// first appeared.
#[derive(Debug, PartialEq, Eq)]
pub struct Query<'a> {
    pairs: Vec<(&'a str, &'a str)>,
}

impl<'a> Query<'a> {
    /// Looks up the value for `key`, if present.
    pub fn get(&self, key: &str) -> Option<&'a str> {
        self.pairs.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a str)> + '_ {
        self.pairs.iter().copied()
    }
}

impl<'a> From<&'a str> for Query<'a> {
    fn from(str: &'a str) -> Self {
        let mut pairs: Vec<(&'a str, &'a str)> = Vec::new();

        if str.is_empty() {
            return Query { pairs };
        }

        for kv in str.split('&') {
            // a pair without '=' contributes nothing
            let Some((key, value)) = kv.split_once('=') else {
                continue;
            };

            match pairs.iter_mut().find(|(k, _)| *k == key) {
                Some(pair) => pair.1 = value,
                None => pairs.push((key, value)),
            }
        }

        Query { pairs }
    }
}
