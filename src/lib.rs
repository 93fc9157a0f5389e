// src/lib.rs
pub mod types;
pub mod error;
pub mod report_source;
pub mod report_parser;
pub mod enrich;
pub mod qualifier;

use std::path::Path;

pub use crate::enrich::{EnrichConfig, EnrichmentHandle, HitEnricher, HitLookup, SharedHits};
pub use crate::error::{CodecError, EnrichError, LookupError, ReportError};
pub use crate::report_parser::{detect_format, parse, ParsedReport};
pub use crate::types::{AnnotationRecord, Hit, HitAnnotation, MatchKind, ReportFormat};

use crate::report_source::read_report_text;

/// A similarity report loaded from disk and indexed.
#[derive(Debug)]
pub struct SimilarityReport {
    pub format: ReportFormat,
    /// Display text; hit offsets point into it.
    pub text: String,
    pub hits: Vec<Hit>,
    /// Set when reading stopped early. Hits found before that are kept.
    pub stream_error: Option<ReportError>,
}

impl SimilarityReport {
    pub fn hit(&self, id: &str) -> Option<&Hit> {
        self.hits.iter().find(|h| h.id == id)
    }

    /// The alignment block of a hit, for scrolling a viewer to it.
    pub fn alignment_text(&self, hit: &Hit) -> Option<&str> {
        self.text.get(hit.span()?)
    }

    /// Moves the hits into a `SharedHits` so they can be enriched in the
    /// background.
    pub fn into_shared(self) -> (String, SharedHits) {
        (self.text, SharedHits::new(self.hits))
    }
}

/// Reads a FASTA or BLASTP report (optionally gzipped), detects its dialect
/// from the content and builds the hit index.
pub fn load_report<P: AsRef<Path>>(path: P) -> Result<SimilarityReport, ReportError> {
    let path = path.as_ref();
    let source = read_report_text(path)?;

    let Some(format) = detect_format(&source.text) else {
        if let Some(e) = source.stream_error {
            return Err(e);
        }
        return Err(ReportError::FormatUnrecognized {
            path: path.to_path_buf(),
        });
    };

    let parsed = parse(&source.text, format);
    log::info!(
        "Loaded {} report {} with {} hits",
        format,
        path.display(),
        parsed.hits.len()
    );

    Ok(SimilarityReport {
        format,
        text: parsed.text,
        hits: parsed.hits,
        stream_error: source.stream_error,
    })
}
