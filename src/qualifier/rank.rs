//src/qualifier/rank.rs

use std::cmp::Ordering;

use crate::qualifier::codec::rank_component;

/// Rank embedded in a raw qualifier value, `0` when absent or unreadable.
/// Reads the `rank` component exactly as `decode` does (the last one wins),
/// but looks at nothing else, so values with a malformed component 0
/// still sort.
pub fn rank_of(raw: &str) -> i32 {
    raw.split(';')
        .skip(1)
        .map(str::trim)
        .filter_map(rank_component)
        .last()
        .map(|value| value.parse().unwrap_or(0))
        .unwrap_or(0)
}

/// Orders two raw values by rank.
pub fn compare(a: &str, b: &str) -> Ordering {
    rank_of(a).cmp(&rank_of(b))
}

/// Stable ascending sort by rank; values of equal rank keep their order.
pub fn sort_by_rank<S: AsRef<str>>(values: &mut [S]) {
    values.sort_by_cached_key(|v| rank_of(v.as_ref()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qualifier::codec::decode;

    #[test]
    fn test_rank_of() {
        assert_eq!(rank_of("g;description=d;rank=3"), 3);
        assert_eq!(rank_of("g;rank 11"), 11);
        assert_eq!(rank_of("g;description=d"), 0);
        assert_eq!(rank_of("rank=9"), 0);
        assert_eq!(rank_of("g;rank=x"), 0);
        assert_eq!(rank_of(";rank=2"), 2);
    }

    #[test]
    fn test_rank_of_agrees_with_decode() {
        for raw in [
            "g;rank =3",
            "g;rank= 3",
            "g;rank 4",
            "g;rank=x",
            "g;rank and file",
            "g;rank=1;rank=6",
            "g;description=d",
        ] {
            assert_eq!(rank_of(raw), decode(raw).unwrap().rank, "{raw}");
        }
        assert_eq!(rank_of("g;rank =3"), 3);
    }

    #[test]
    fn test_spaced_rank_sorts_by_value() {
        let mut values = vec!["b;rank =3", "a;rank=1"];
        sort_by_rank(&mut values);
        assert_eq!(values, vec!["a;rank=1", "b;rank =3"]);
    }

    #[test]
    fn test_compare_is_numeric() {
        assert_eq!(compare("a;rank=10", "b;rank=9"), Ordering::Greater);
        assert_eq!(compare("a", "b;rank=0"), Ordering::Equal);
        assert_eq!(compare("a;rank=-1", "b"), Ordering::Less);
        assert_eq!(compare("same;rank=4", "same;rank=4"), Ordering::Equal);
    }

    #[test]
    fn test_sort_by_rank_is_stable() {
        let mut values = vec![
            "c;rank=2".to_string(),
            "a".to_string(),
            "b;rank=1".to_string(),
            "d;rank=0".to_string(),
        ];
        sort_by_rank(&mut values);
        assert_eq!(values, vec!["a", "d;rank=0", "b;rank=1", "c;rank=2"]);
    }
}
