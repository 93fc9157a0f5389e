//src/qualifier/similarity.rs

use crate::qualifier::codec::decode;

/// Loose equality used before inserting a new ortholog/paralog value:
/// the primary values must contain one another (either way) and the
/// cluster names must be identical. Rank and description are ignored.
///
/// Containment tolerates truncated or prefixed identifiers; it is a
/// heuristic and can over-match short ids.
pub fn matches(candidate: &str, existing: &str) -> bool {
    let (Ok(a), Ok(b)) = (decode(candidate), decode(existing)) else {
        return false;
    };
    let related = a.primary_value.contains(&b.primary_value)
        || b.primary_value.contains(&a.primary_value);
    related && a.cluster_name == b.cluster_name
}

/// True if any value in `collection` matches `candidate`.
pub fn contains_match<S: AsRef<str>>(candidate: &str, collection: &[S]) -> bool {
    collection.iter().any(|existing| matches(candidate, existing.as_ref()))
}
