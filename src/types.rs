//src/types.rs

use std::fmt;
use std::ops::Range;

/// The report dialect, decided by content rather than file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportFormat {
    Fasta,
    Blastp,
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportFormat::Fasta => f.write_str("fasta"),
            ReportFormat::Blastp => f.write_str("blastp"),
        }
    }
}

/// Supplementary text fetched for a hit after parsing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HitAnnotation {
    pub description: Option<String>,
    pub organism: Option<String>,
    pub go_terms: Option<String>,
}

/// One alignment result from a FASTA or BLASTP report.
///
/// Every extracted field is optional: a line that carries the marker but
/// not the expected sub-structure leaves its field unset.
///
/// `start_offset` and `end_offset` are byte offsets (not character counts)
/// into `ParsedReport::text`, so `&text[start..end]` is the alignment block.
#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
    pub id: String,
    pub format: ReportFormat,
    /// Database prefix stripped from a BLASTP id (`sp` for `sp:P12345`).
    pub database: Option<String>,
    pub description: Option<String>,
    pub score: Option<String>,
    pub identity: Option<String>,
    pub ungapped: Option<String>,        // FASTA only
    pub overlap: Option<String>,         // FASTA only
    pub query_range: Option<String>,
    pub subject_range: Option<String>,
    pub length: Option<String>,          // BLASTP only
    pub e_value: Option<String>,
    pub go_terms: Option<String>,        // BLASTP only
    /// Byte offset into the annotated text where the alignment block starts.
    pub start_offset: Option<usize>,
    /// Byte offset one past the end of the alignment block.
    pub end_offset: Option<usize>,
    /// Filled in by the background enricher.
    pub annotation: Option<HitAnnotation>,
}

impl Hit {
    pub fn new(id: impl Into<String>, format: ReportFormat) -> Self {
        Self {
            id: id.into(),
            format,
            database: None,
            description: None,
            score: None,
            identity: None,
            ungapped: None,
            overlap: None,
            query_range: None,
            subject_range: None,
            length: None,
            e_value: None,
            go_terms: None,
            start_offset: None,
            end_offset: None,
            annotation: None,
        }
    }

    /// The alignment block as a range into the annotated text, once both
    /// ends are known.
    pub fn span(&self) -> Option<Range<usize>> {
        match (self.start_offset, self.end_offset) {
            (Some(start), Some(end)) => Some(start..end),
            _ => None,
        }
    }

    /// All `GO:nnnnnnn` identifiers mentioned in `go_terms`.
    pub fn go_ids(&self) -> Vec<String> {
        let Some(text) = self.go_terms.as_deref() else {
            return Vec::new();
        };
        let mut ids = Vec::new();
        let mut rest = text;
        while let Some(pos) = rest.find("GO:") {
            let after = &rest[pos + 3..];
            let digits: String = after.chars().take_while(|c| c.is_ascii_digit()).collect();
            if !digits.is_empty() {
                let id = format!("GO:{digits}");
                if !ids.contains(&id) {
                    ids.push(id);
                }
            }
            rest = after;
        }
        ids
    }
}

/// Ortholog or paralog row type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchKind {
    Ortholog,
    Paralog,
}

impl MatchKind {
    /// Qualifier name the values are stored under.
    pub fn qualifier_name(&self) -> &'static str {
        match self {
            MatchKind::Ortholog => "orthologous_to",
            MatchKind::Paralog => "paralogous_to",
        }
    }

    /// One-letter symbol shown in the type column.
    pub fn symbol(&self) -> char {
        match self {
            MatchKind::Ortholog => 'O',
            MatchKind::Paralog => 'P',
        }
    }

    pub fn from_qualifier_name(name: &str) -> Option<Self> {
        match name {
            "orthologous_to" => Some(MatchKind::Ortholog),
            "paralogous_to" => Some(MatchKind::Paralog),
            _ => None,
        }
    }
}

/// One decoded ortholog, paralog or synonym qualifier value.
///
/// Text fields hold trimmed values: `decode` trims every component and
/// `encode` writes values trimmed, so surrounding whitespace never
/// survives a round trip (see `trimmed`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationRecord {
    /// Gene or synonym token, possibly `organism:gene`.
    pub primary_value: String,
    pub link: String,
    pub description: String,
    pub cluster_name: String,
    pub match_name: String,
    pub rank: i32,
    pub current: bool,
}

impl AnnotationRecord {
    pub fn new(primary_value: impl Into<String>) -> Self {
        Self {
            primary_value: primary_value.into(),
            link: String::new(),
            description: String::new(),
            cluster_name: String::new(),
            match_name: String::new(),
            rank: 0,
            current: true,
        }
    }

    /// The same record with every text field trimmed, the form `decode`
    /// produces.
    pub fn trimmed(&self) -> Self {
        Self {
            primary_value: self.primary_value.trim().to_string(),
            link: self.link.trim().to_string(),
            description: self.description.trim().to_string(),
            cluster_name: self.cluster_name.trim().to_string(),
            match_name: self.match_name.trim().to_string(),
            rank: self.rank,
            current: self.current,
        }
    }

    /// Organism/namespace prefix of the primary value, if it has one.
    pub fn organism(&self) -> Option<&str> {
        self.primary_value.split_once(':').map(|(org, _)| org)
    }

    /// The primary value without its organism prefix.
    pub fn gene(&self) -> &str {
        match self.primary_value.split_once(':') {
            Some((_, gene)) => gene,
            None => &self.primary_value,
        }
    }
}
