//src/report_source.rs

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use flate2::read::MultiGzDecoder;

use crate::error::ReportError;

/// Report text read into memory, plus the read failure that stopped it early
/// (if any). Lines read before the failure are kept.
#[derive(Debug)]
pub struct ReportText {
    pub text: String,
    pub stream_error: Option<ReportError>,
}

/// Opens a report, decompressing it when the file name ends with `.gz`.
/// The dialect is never inferred from the extension.
pub fn open_report<P: AsRef<Path>>(path: P) -> Result<Box<dyn BufRead>, ReportError> {
    let path = path.as_ref();
    let f = File::open(path).map_err(|source| ReportError::Stream {
        path: path.to_path_buf(),
        source,
    })?;

    let is_gz = path
        .extension()
        .map(|ext| ext == "gz")
        .unwrap_or(false);

    let reader: Box<dyn BufRead> = if is_gz {
        Box::new(BufReader::new(MultiGzDecoder::new(f)))
    } else {
        Box::new(BufReader::new(f))
    };
    Ok(reader)
}

/// Reads the whole report. Failing to open is an error; a failure part way
/// through is logged once and returned alongside the text read so far.
pub fn read_report_text<P: AsRef<Path>>(path: P) -> Result<ReportText, ReportError> {
    let path = path.as_ref();
    let mut reader = open_report(path)?;

    let mut text = String::new();
    let mut line = String::new();
    let mut stream_error = None;

    loop {
        line.clear();
        match reader.read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {
                let trimmed = line.trim_end_matches(['\n', '\r']);
                text.push_str(trimmed);
                text.push('\n');
            }
            Err(source) => {
                log::error!("Cannot read report {}: {}", path.display(), source);
                stream_error = Some(ReportError::Stream {
                    path: PathBuf::from(path),
                    source,
                });
                break;
            }
        }
    }

    log::debug!("Read {} bytes from {}", text.len(), path.display());
    Ok(ReportText { text, stream_error })
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_reads_plain_report() {
        let mut file = NamedTempFile::with_suffix(".out").unwrap();
        write!(file, "BLASTP 2.2.6\r\n\r\nQuery= foo\n").unwrap();
        file.flush().unwrap();

        let report = read_report_text(file.path()).unwrap();
        assert_eq!(report.text, "BLASTP 2.2.6\n\nQuery= foo\n");
        assert!(report.stream_error.is_none());
    }

    #[test]
    fn test_reads_gzipped_report() {
        let mut file = NamedTempFile::with_suffix(".out.gz").unwrap();
        let mut enc = GzEncoder::new(Vec::new(), Compression::default());
        enc.write_all(b"FASTA searches a protein database\nline two").unwrap();
        file.write_all(&enc.finish().unwrap()).unwrap();
        file.flush().unwrap();

        let report = read_report_text(file.path()).unwrap();
        assert_eq!(report.text, "FASTA searches a protein database\nline two\n");
    }

    #[test]
    fn test_invalid_utf8_keeps_earlier_lines() {
        let mut file = NamedTempFile::with_suffix(".out").unwrap();
        file.write_all(b"BLASTP 2.2.6\n\xff\xfe broken\n").unwrap();
        file.flush().unwrap();

        let report = read_report_text(file.path()).unwrap();
        assert_eq!(report.text, "BLASTP 2.2.6\n");
        assert!(matches!(report.stream_error, Some(ReportError::Stream { .. })));
    }

    #[test]
    fn test_missing_file_is_stream_error() {
        let err = read_report_text("/nonexistent/report.out").unwrap_err();
        assert!(matches!(err, ReportError::Stream { .. }));
    }
}
