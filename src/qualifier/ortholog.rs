//src/qualifier/ortholog.rs

use crate::error::CodecError;
use crate::qualifier::codec::{decode, encode, split_link};
use crate::qualifier::rank::sort_by_rank;
use crate::qualifier::similarity::contains_match;
use crate::types::{AnnotationRecord, MatchKind};

/// A single gene row of the ortholog/paralog table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRow {
    pub kind: MatchKind,
    pub record: AnnotationRecord,
}

impl MatchRow {
    pub fn symbol(&self) -> char {
        self.kind.symbol()
    }

    pub fn organism(&self) -> Option<&str> {
        self.record.organism()
    }
}

/// Rows built from the `orthologous_to` and `paralogous_to` qualifiers of
/// one feature. Values that fail to decode are kept in `rejected` and do
/// not stop their siblings from loading.
#[derive(Debug, Default)]
pub struct MatchTable {
    pub rows: Vec<MatchRow>,
    pub rejected: Vec<CodecError>,
}

/// Decodes a value whose component 0 may list several genes separated by
/// `,`. Each gene becomes a record sharing the remaining components.
pub fn decode_rows(raw: &str) -> Result<Vec<AnnotationRecord>, CodecError> {
    let record = decode(raw)?;
    let head = raw.split(';').next().unwrap_or_default();
    if !head.contains(',') {
        return Ok(vec![record]);
    }

    let rows: Vec<AnnotationRecord> = head
        .split(',')
        .filter_map(|gene| {
            let (primary, link) = split_link(gene);
            if primary.is_empty() {
                return None;
            }
            Some(AnnotationRecord {
                primary_value: primary.to_string(),
                link: link.to_string(),
                ..record.clone()
            })
        })
        .collect();

    if rows.is_empty() {
        return Err(CodecError::MissingPrimary {
            raw: raw.to_string(),
        });
    }
    Ok(rows)
}

impl MatchTable {
    /// Each qualifier's values are ordered by rank before they become rows;
    /// orthologs come before paralogs.
    pub fn from_qualifiers<S: AsRef<str>>(ortholog_values: &[S], paralog_values: &[S]) -> Self {
        let mut table = MatchTable::default();
        for (kind, values) in [
            (MatchKind::Ortholog, ortholog_values),
            (MatchKind::Paralog, paralog_values),
        ] {
            let mut sorted: Vec<&str> = values.iter().map(AsRef::as_ref).collect();
            sort_by_rank(&mut sorted);

            for raw in sorted {
                match decode_rows(raw) {
                    Ok(records) => table
                        .rows
                        .extend(records.into_iter().map(|record| MatchRow { kind, record })),
                    Err(e) => {
                        log::warn!("Skipping {} value: {e}", kind.qualifier_name());
                        table.rejected.push(e);
                    }
                }
            }
        }
        log::debug!("Built {} match rows ({} rejected)", table.rows.len(), table.rejected.len());
        table
    }

    /// Appends a row unless a matching value of the same kind is already
    /// present. Returns whether the row was added.
    pub fn add_row(&mut self, kind: MatchKind, record: AnnotationRecord) -> bool {
        let candidate = encode(&record);
        if contains_match(&candidate, &self.qualifier_values(kind)) {
            log::debug!("{} already listed as {}", record.primary_value, kind.qualifier_name());
            return false;
        }
        self.rows.push(MatchRow { kind, record });
        true
    }

    pub fn remove_row(&mut self, idx: usize) -> Option<MatchRow> {
        if idx < self.rows.len() {
            Some(self.rows.remove(idx))
        } else {
            None
        }
    }

    /// Moves a row, as when rows are dragged into a new order.
    pub fn move_row(&mut self, from: usize, to: usize) -> bool {
        if from >= self.rows.len() || to >= self.rows.len() {
            return false;
        }
        let row = self.rows.remove(from);
        self.rows.insert(to, row);
        true
    }

    pub fn rows_of(&self, kind: MatchKind) -> impl Iterator<Item = &MatchRow> {
        self.rows.iter().filter(move |row| row.kind == kind)
    }

    /// Encoded values for one qualifier. Each row's rank is its current
    /// position in the whole table, not the rank it was loaded with.
    pub fn qualifier_values(&self, kind: MatchKind) -> Vec<String> {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row.kind == kind)
            .map(|(pos, row)| {
                let mut record = row.record.clone();
                record.rank = pos as i32;
                encode(&record)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_rows_splits_gene_list() {
        let rows = decode_rows("Lm:LmjF01.0010 link=LmjF01.0010, Tc:Tc00.1 link=Tc00.1;cluster_name=OG5;rank=2").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].primary_value, "Lm:LmjF01.0010");
        assert_eq!(rows[0].link, "LmjF01.0010");
        assert_eq!(rows[1].primary_value, "Tc:Tc00.1");
        assert_eq!(rows[1].link, "Tc00.1");
        assert!(rows.iter().all(|r| r.cluster_name == "OG5" && r.rank == 2));
    }

    #[test]
    fn test_table_orders_by_rank_and_keeps_siblings() {
        let orthologs = vec![
            "Pf:PF2 link=PF2;description=second;rank=1".to_string(),
            ";rank=0".to_string(),
            "Pf:PF1 link=PF1;description=first;rank=0".to_string(),
        ];
        let paralogs = vec!["Pb:PB1 link=PB1;rank=0".to_string()];

        let table = MatchTable::from_qualifiers(&orthologs, &paralogs);
        assert_eq!(table.rejected.len(), 1);
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.rows[0].record.primary_value, "Pf:PF1");
        assert_eq!(table.rows[1].record.primary_value, "Pf:PF2");
        assert_eq!(table.rows[2].symbol(), 'P');
        assert_eq!(table.rows[2].organism(), Some("Pb"));
        assert_eq!(table.rows_of(MatchKind::Ortholog).count(), 2);
    }

    #[test]
    fn test_rank_follows_row_position() {
        let orthologs = vec!["a:1 link=1;rank=7".to_string(), "a:2 link=2;rank=3".to_string()];
        let mut table = MatchTable::from_qualifiers(&orthologs, &[]);
        assert_eq!(
            table.qualifier_values(MatchKind::Ortholog),
            vec!["a:2 link=2;rank=0", "a:1 link=1;rank=1"]
        );

        assert!(table.move_row(1, 0));
        assert_eq!(
            table.qualifier_values(MatchKind::Ortholog),
            vec!["a:1 link=1;rank=0", "a:2 link=2;rank=1"]
        );
        assert!(!table.move_row(0, 5));
    }

    #[test]
    fn test_add_row_skips_near_duplicates() {
        let orthologs = vec!["org:gene12 link=x;cluster_name=C1;rank=0".to_string()];
        let mut table = MatchTable::from_qualifiers(&orthologs, &[]);

        let mut dup = AnnotationRecord::new("org:gene1");
        dup.cluster_name = "C1".to_string();
        assert!(!table.add_row(MatchKind::Ortholog, dup.clone()));
        // same gene as a paralog is a different qualifier
        assert!(table.add_row(MatchKind::Paralog, dup));

        let mut other = AnnotationRecord::new("org:gene12");
        other.cluster_name = "C2".to_string();
        assert!(table.add_row(MatchKind::Ortholog, other));
        assert_eq!(table.rows.len(), 3);

        assert!(table.remove_row(0).is_some());
        assert!(table.remove_row(9).is_none());
    }
}
