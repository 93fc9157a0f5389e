//src/error.rs

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failures reading or recognising a similarity report.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("cannot read report {}: {source}", .path.display())]
    Stream {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("no FASTA or BLASTP marker found in {}", .path.display())]
    FormatUnrecognized { path: PathBuf },
}

/// A qualifier value that cannot be turned into a row.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("annotation string has no primary value: {raw:?}")]
    MissingPrimary { raw: String },
}

/// Raised by an enrichment lookup collaborator. The enricher swallows it.
#[derive(Debug, Error)]
#[error("lookup for {id} failed: {reason}")]
pub struct LookupError {
    pub id: String,
    pub reason: String,
}

#[derive(Debug, Error)]
pub enum EnrichError {
    #[error("cannot start enrichment thread: {0}")]
    Spawn(#[from] io::Error),
}
