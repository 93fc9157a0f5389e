//src/qualifier/synonym.rs

use crate::qualifier::codec::decode;

const NOT_CURRENT: &str = ";current=false";

/// The values of one synonym qualifier (e.g. `previous_systematic_id`).
/// At most one value is current; the others carry `current=false`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynonymQualifier {
    pub name: String,
    pub values: Vec<String>,
}

fn synonym_name(raw: &str) -> Option<String> {
    match decode(raw) {
        Ok(record) => Some(record.primary_value),
        Err(e) => {
            log::warn!("Ignoring synonym value: {e}");
            None
        }
    }
}

fn is_current(raw: &str) -> bool {
    decode(raw).map(|r| r.current).unwrap_or(false)
}

impl SynonymQualifier {
    pub fn new(name: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// The first value not marked `current=false`.
    pub fn current(&self) -> Option<String> {
        self.values
            .iter()
            .find(|v| is_current(v))
            .and_then(|v| synonym_name(v))
    }

    /// Bare names for display, current ones first.
    pub fn display_order(&self) -> Vec<String> {
        let (current, old): (Vec<&String>, Vec<&String>) =
            self.values.iter().partition(|v| is_current(v));
        current
            .into_iter()
            .chain(old)
            .filter_map(|v| synonym_name(v))
            .collect()
    }

    /// Makes `selected` the current value and demotes every other one.
    /// Returns `false` if no value has that name.
    pub fn make_current(&mut self, selected: &str) -> bool {
        let names: Vec<Option<String>> = self.values.iter().map(|v| synonym_name(v)).collect();
        if !names.iter().any(|n| n.as_deref() == Some(selected)) {
            return false;
        }

        for (value, name) in self.values.iter_mut().zip(names) {
            match name {
                Some(name) if name == selected => *value = name,
                Some(name) => *value = format!("{name}{NOT_CURRENT}"),
                None => {}
            }
        }
        true
    }

    /// Adds a synonym. When `make_current` is set every other value is
    /// demoted, otherwise the new value is added as not current.
    pub fn add(&mut self, synonym: &str, make_current: bool) -> bool {
        let synonym = synonym.trim();
        if synonym.is_empty() || synonym.contains(';') {
            return false;
        }

        if make_current {
            for value in self.values.iter_mut() {
                if synonym_name(value).as_deref() != Some(synonym) && !value.ends_with(NOT_CURRENT) {
                    value.push_str(NOT_CURRENT);
                }
            }
            self.values.push(synonym.to_string());
        } else {
            self.values.push(format!("{synonym}{NOT_CURRENT}"));
        }
        true
    }

    /// Removes one value. An empty qualifier should be dropped by the caller.
    pub fn remove(&mut self, idx: usize) -> Option<String> {
        if idx < self.values.len() {
            Some(self.values.remove(idx))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn synonyms() -> SynonymQualifier {
        SynonymQualifier::new(
            "previous_systematic_id",
            vec![
                "PFA0005w;current=false".to_string(),
                "PF3D7_0100100".to_string(),
                "MAL1P1.1;current=false".to_string(),
            ],
        )
    }

    #[test]
    fn test_current_and_display_order() {
        let syn = synonyms();
        assert_eq!(syn.current().as_deref(), Some("PF3D7_0100100"));
        assert_eq!(syn.display_order(), vec!["PF3D7_0100100", "PFA0005w", "MAL1P1.1"]);
    }

    #[test]
    fn test_make_current() {
        let mut syn = synonyms();
        assert!(syn.make_current("MAL1P1.1"));
        assert_eq!(
            syn.values,
            vec!["PFA0005w;current=false", "PF3D7_0100100;current=false", "MAL1P1.1"]
        );
        assert_eq!(syn.current().as_deref(), Some("MAL1P1.1"));
        assert!(!syn.make_current("unknown"));
    }

    #[test]
    fn test_add_synonym() {
        let mut syn = synonyms();
        assert!(syn.add("old_name", false));
        assert_eq!(syn.current().as_deref(), Some("PF3D7_0100100"));
        assert_eq!(syn.values.last().unwrap(), "old_name;current=false");

        assert!(syn.add("new_name", true));
        assert_eq!(syn.current().as_deref(), Some("new_name"));
        assert_eq!(syn.values[1], "PF3D7_0100100;current=false");
        assert_eq!(syn.values[3], "old_name;current=false");

        assert!(!syn.add("  ", true));
        assert!(!syn.add("a;b", true));
    }

    #[test]
    fn test_remove() {
        let mut syn = synonyms();
        assert_eq!(syn.remove(0).as_deref(), Some("PFA0005w;current=false"));
        assert_eq!(syn.values.len(), 2);
        assert!(syn.remove(5).is_none());
    }
}
