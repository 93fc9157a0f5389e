//src/qualifier/codec.rs

use crate::error::CodecError;
use crate::types::AnnotationRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Description,
    ClusterName,
    MatchName,
    Rank,
    Current,
}

/// Keys recognised after component 0. Anything else is either the
/// positional description or ignored.
const KEYS: &[(&str, Field)] = &[
    ("description", Field::Description),
    ("cluster_name", Field::ClusterName),
    ("match_name", Field::MatchName),
    ("rank", Field::Rank),
    ("current", Field::Current),
];

/// Decodes one qualifier value such as
/// `speciesA:geneX link=http://x;description=kinase;cluster_name=C1;rank=3`.
///
/// Component 0 is mandatory; every other component defaults when absent.
/// The first component without a recognised key is taken as the
/// description unless a `description=` component is present.
pub fn decode(raw: &str) -> Result<AnnotationRecord, CodecError> {
    let mut parts = raw.split(';');
    let head = parts.next().unwrap_or_default().trim();
    let (primary, link) = split_link(head);
    if primary.is_empty() {
        return Err(CodecError::MissingPrimary {
            raw: raw.to_string(),
        });
    }

    let mut record = AnnotationRecord::new(primary);
    record.link = link.to_string();

    let mut positional: Option<&str> = None;
    for part in parts.map(str::trim).filter(|p| !p.is_empty()) {
        match keyed(part) {
            Some((Field::Description, value)) => record.description = value.to_string(),
            Some((Field::ClusterName, value)) => record.cluster_name = value.to_string(),
            Some((Field::MatchName, value)) => record.match_name = value.to_string(),
            Some((Field::Rank, value)) => {
                record.rank = value.parse().unwrap_or_else(|_| {
                    log::warn!("Ignoring rank {value:?} in {raw:?}");
                    0
                })
            }
            Some((Field::Current, value)) => record.current = !value.eq_ignore_ascii_case("false"),
            None if positional.is_none() => positional = Some(part),
            None => log::trace!("Ignoring component {part:?}"),
        }
    }

    if record.description.is_empty() {
        if let Some(description) = positional {
            record.description = description.to_string();
        }
    }
    Ok(record)
}

/// Encodes a record in the fixed component order
/// `gene[ link=..][;current=false];description=..;cluster_name=..;match_name=..;rank=N`.
/// Values are written trimmed and empty optional components are left out.
/// Values must not contain `;`.
pub fn encode(record: &AnnotationRecord) -> String {
    let mut out = record.primary_value.trim().to_string();
    let link = record.link.trim();
    if !link.is_empty() {
        out.push_str(" link=");
        out.push_str(link);
    }
    if !record.current {
        out.push_str(";current=false");
    }

    for (key, value) in [
        ("description", &record.description),
        ("cluster_name", &record.cluster_name),
        ("match_name", &record.match_name),
    ] {
        let value = value.trim();
        if !value.is_empty() {
            out.push(';');
            out.push_str(key);
            out.push('=');
            out.push_str(value);
        }
    }

    out.push_str(";rank=");
    out.push_str(&record.rank.to_string());
    out
}

/// Splits `gene link=url` into gene and link, both trimmed.
pub(crate) fn split_link(head: &str) -> (&str, &str) {
    match head.find("link=") {
        Some(pos) => (head[..pos].trim(), head[pos + 5..].trim()),
        None => (head.trim(), ""),
    }
}

/// Value of a `rank` component, in any form `decode` accepts.
pub(crate) fn rank_component(part: &str) -> Option<&str> {
    match keyed(part) {
        Some((Field::Rank, value)) => Some(value),
        _ => None,
    }
}

fn keyed(part: &str) -> Option<(Field, &str)> {
    // legacy `rank 3`
    if let Some(value) = part.strip_prefix("rank ") {
        if !part.contains('=') && value.trim().parse::<i32>().is_ok() {
            return Some((Field::Rank, value.trim()));
        }
    }
    let (key, value) = part.split_once('=')?;
    let key = key.trim();
    KEYS.iter()
        .find(|(name, _)| *name == key)
        .map(|&(_, field)| (field, value.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_full_ortholog() {
        let rec = decode("speciesA:geneX link=http://x;description=kinase;cluster_name=C1;rank=3").unwrap();
        assert_eq!(rec.primary_value, "speciesA:geneX");
        assert_eq!(rec.organism(), Some("speciesA"));
        assert_eq!(rec.link, "http://x");
        assert_eq!(rec.description, "kinase");
        assert_eq!(rec.cluster_name, "C1");
        assert_eq!(rec.match_name, "");
        assert_eq!(rec.rank, 3);
        assert!(rec.current);

        let again = decode(&encode(&rec)).unwrap();
        assert_eq!(again, rec);
    }

    #[test]
    fn test_decode_synonym_current_flag() {
        assert!(!decode("oldName;current=false").unwrap().current);
        let rec = decode("newName").unwrap();
        assert!(rec.current);
        assert_eq!(rec.primary_value, "newName");
        assert_eq!(rec.rank, 0);
    }

    #[test]
    fn test_decode_positional_description() {
        // written without a key
        let rec = decode("Tb:Tb927.1.100 link=Tb927.1.100;hypothetical protein, conserved;cluster_name=OG1;rank=0").unwrap();
        assert_eq!(rec.description, "hypothetical protein, conserved");
        assert_eq!(rec.cluster_name, "OG1");

        // an explicit key wins over a positional component
        let rec = decode("g;free text;description=kept").unwrap();
        assert_eq!(rec.description, "kept");

        // unknown keys are descriptions when positional
        let rec = decode("g;similar to x=y;other").unwrap();
        assert_eq!(rec.description, "similar to x=y");
    }

    #[test]
    fn test_decode_rank_separators() {
        assert_eq!(decode("g;rank=7").unwrap().rank, 7);
        assert_eq!(decode("g;rank 4").unwrap().rank, 4);
        assert_eq!(decode("g;rank=abc").unwrap().rank, 0);
        assert_eq!(decode("g; match_name = m1 ;rank=-2").unwrap().match_name, "m1");
    }

    #[test]
    fn test_decode_missing_primary() {
        assert!(matches!(decode(""), Err(CodecError::MissingPrimary { .. })));
        assert!(matches!(decode("  ;rank=1"), Err(CodecError::MissingPrimary { .. })));
        assert!(matches!(decode(" link=http://x;rank=1"), Err(CodecError::MissingPrimary { .. })));
    }

    #[test]
    fn test_encode_omits_empty_components() {
        let mut rec = AnnotationRecord::new("org:gene");
        rec.match_name = "m".to_string();
        rec.rank = 2;
        assert_eq!(encode(&rec), "org:gene;match_name=m;rank=2");

        rec.current = false;
        rec.link = "L".to_string();
        assert_eq!(encode(&rec), "org:gene link=L;current=false;match_name=m;rank=2");
    }

    #[test]
    fn test_round_trip_records() {
        let mut records = Vec::new();
        for (link, desc, cluster, matched, rank, current) in [
            ("", "", "", "", 0, true),
            ("http://a/b?c=d", "a = b", "C9", "MN", 12, true),
            ("x", "kinase, putative", "", "", -1, false),
        ] {
            let mut rec = AnnotationRecord::new("sp:g1");
            rec.link = link.to_string();
            rec.description = desc.to_string();
            rec.cluster_name = cluster.to_string();
            rec.match_name = matched.to_string();
            rec.rank = rank;
            rec.current = current;
            records.push(rec);
        }
        for rec in records {
            assert_eq!(decode(&encode(&rec)).unwrap(), rec);
        }
    }

    #[test]
    fn test_padded_values_round_trip_trimmed() {
        let mut rec = AnnotationRecord::new(" org:g1 ");
        rec.link = " http://x ".to_string();
        rec.description = " padded ".to_string();
        rec.cluster_name = "  ".to_string();
        rec.rank = 4;

        let encoded = encode(&rec);
        assert_eq!(encoded, "org:g1 link=http://x;description=padded;rank=4");
        assert_eq!(decode(&encoded).unwrap(), rec.trimmed());
        assert_eq!(encode(&rec.trimmed()), encoded);
    }

    #[test]
    fn test_normalised_encode_decodes_identically() {
        let raw = "g link=u;rank=5;cluster_name=c;some description";
        let rec = decode(raw).unwrap();
        assert_eq!(decode(&encode(&rec)).unwrap(), rec);
        assert_eq!(encode(&rec), "g link=u;description=some description;cluster_name=c;rank=5");
    }
}
