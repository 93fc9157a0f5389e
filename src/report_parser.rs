//src/report_parser.rs

use ahash::AHashMap;

use crate::types::{Hit, ReportFormat};

const BLASTP_SUMMARY_HEADER: &str = "Sequences producing significant alignments:";
const FASTA_SUMMARY_HEADER: &str = "The best scores are:";

/// The annotated text (every input line reproduced, `\n` terminated) and
/// the hits found in it, in the order their summary lines appear. A hit
/// with only an alignment block sits where that block appears, so start
/// offsets never decrease.
#[derive(Debug, Clone)]
pub struct ParsedReport {
    pub format: ReportFormat,
    pub text: String,
    pub hits: Vec<Hit>,
}

/// Returns the dialect of the first line carrying a marker: a line starting
/// with `BLASTP`, or a line containing `FASTA`. `None` if neither appears.
pub fn detect_format(text: &str) -> Option<ReportFormat> {
    for line in text.lines() {
        if line.starts_with("BLASTP") {
            return Some(ReportFormat::Blastp);
        } else if line.contains("FASTA") {
            return Some(ReportFormat::Fasta);
        }
    }
    None
}

/// Scans the report once, building the hit index and the annotated text.
/// Offsets are byte positions into `ParsedReport::text`.
///
/// Lines carrying a marker but missing the expected sub-structure leave
/// the corresponding field unset; parsing never fails.
pub fn parse(text: &str, format: ReportFormat) -> ParsedReport {
    let mut scanner = Scanner::new(text);
    let mut index = HitIndex::default();

    match format {
        ReportFormat::Blastp => parse_blastp(&mut scanner, &mut index),
        ReportFormat::Fasta => parse_fasta(&mut scanner, &mut index),
    }

    log::debug!(
        "Parsed {} report: {} hits, {} bytes",
        format,
        index.hits.len(),
        scanner.out.len()
    );

    ParsedReport {
        format,
        text: scanner.out,
        hits: index.hits,
    }
}

// ---------------------------------------------------------------------------
//  Line scanner
// ---------------------------------------------------------------------------

/// Hands out lines while copying them to the output buffer, so the running
/// offset is always the buffer length.
struct Scanner<'a> {
    lines: Vec<&'a str>,
    pos: usize,
    out: String,
}

impl<'a> Scanner<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines().collect(),
            pos: 0,
            out: String::with_capacity(text.len() + 1),
        }
    }

    /// Next line and the offset it starts at.
    fn next_line(&mut self) -> Option<(usize, &'a str)> {
        let line = *self.lines.get(self.pos)?;
        self.pos += 1;
        let start = self.out.len();
        self.out.push_str(line);
        self.out.push('\n');
        Some((start, line))
    }

    /// Lines not yet consumed. Reading them does not advance the scanner.
    fn remaining(&self) -> &[&'a str] {
        &self.lines[self.pos..]
    }

    fn offset(&self) -> usize {
        self.out.len()
    }
}

#[derive(Default)]
struct HitIndex {
    hits: Vec<Hit>,
    by_id: AHashMap<String, usize>,
}

impl HitIndex {
    fn insert(&mut self, hit: Hit) {
        if self.by_id.contains_key(&hit.id) {
            log::trace!("Duplicate summary line for {}", hit.id);
            return;
        }
        self.by_id.insert(hit.id.clone(), self.hits.len());
        self.hits.push(hit);
    }

    /// Looks up the hit an alignment block belongs to. A hit with no
    /// summary line is placed right after the last hit whose alignment has
    /// been seen, so start offsets stay in source order.
    fn get_or_create(&mut self, id: &str, format: ReportFormat) -> usize {
        if let Some(&idx) = self.by_id.get(id) {
            return idx;
        }
        log::trace!("Alignment for {id} has no summary line");

        let pos = self
            .hits
            .iter()
            .rposition(|h| h.start_offset.is_some())
            .map_or(0, |last| last + 1);
        self.hits.insert(pos, Hit::new(id, format));
        for (idx, hit) in self.hits.iter().enumerate().skip(pos) {
            self.by_id.insert(hit.id.clone(), idx);
        }
        pos
    }

    fn close(&mut self, open: Option<usize>, offset: usize) {
        if let Some(idx) = open {
            self.hits[idx].end_offset = Some(offset);
        }
    }

    fn open_hit(&mut self, open: Option<usize>) -> Option<&mut Hit> {
        match open {
            Some(idx) => self.hits.get_mut(idx),
            None => None,
        }
    }
}

// ---------------------------------------------------------------------------
//  BLASTP
// ---------------------------------------------------------------------------

fn parse_blastp(scanner: &mut Scanner, index: &mut HitIndex) {
    let mut open: Option<usize> = None;

    while let Some((line_start, line)) = scanner.next_line() {
        if line.starts_with(BLASTP_SUMMARY_HEADER) {
            // the line under the header is spacing
            scanner.next_line();
            while let Some((_, summary)) = scanner.next_line() {
                if summary.trim().is_empty() {
                    break;
                }
                if let Some(hit) = parse_blastp_summary(summary) {
                    index.insert(hit);
                }
            }
        } else if let Some(header) = line.strip_prefix('>') {
            let (database, id) = blastp_alignment_id(header);
            index.close(open, line_start);

            let idx = index.get_or_create(id, ReportFormat::Blastp);
            let go_terms = collect_go_terms(line, scanner.remaining());
            let hit = &mut index.hits[idx];
            hit.start_offset = Some(line_start);
            if hit.database.is_none() {
                hit.database = database.map(str::to_string);
            }
            if hit.description.is_none() {
                hit.description = alignment_description(header);
            }
            if go_terms.is_some() {
                hit.go_terms = go_terms;
            }
            open = Some(idx);
        } else if let Some(pos) = line.find("Identities = ") {
            match (index.open_hit(open), parenthesised(line, pos)) {
                (Some(hit), Some(identity)) => hit.identity = Some(identity),
                _ => log::trace!("No identity extracted from {line:?}"),
            }
        } else if let Some(pos) = line.find("  Length = ") {
            match index.open_hit(open) {
                Some(hit) => hit.length = non_empty(&line[pos + 11..]),
                None => log::trace!("Length line outside an alignment: {line:?}"),
            }
        }
    }

    index.close(open, scanner.offset());
}

/// `sp:P12345 Some protein   250   1e-50` -> id, database, description,
/// score and E-value.
fn parse_blastp_summary(line: &str) -> Option<Hit> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let (database, id) = split_database(tokens.first()?);

    let mut hit = Hit::new(id, ReportFormat::Blastp);
    hit.database = database.map(str::to_string);

    let n = tokens.len();
    if n >= 3 && tokens[n - 2].parse::<f64>().is_ok() && looks_like_e_value(tokens[n - 1]) {
        hit.score = Some(tokens[n - 2].to_string());
        hit.e_value = Some(tokens[n - 1].to_string());
        hit.description = non_empty(&tokens[1..n - 2].join(" "));
    } else {
        hit.description = non_empty(&tokens[1..].join(" "));
    }
    Some(hit)
}

/// Id from the text after `>`: up to the first space, without a `db:` prefix.
fn blastp_alignment_id(header: &str) -> (Option<&str>, &str) {
    let token = header.split(' ').next().unwrap_or_default();
    split_database(token)
}

fn split_database(token: &str) -> (Option<&str>, &str) {
    match token.split_once(':') {
        Some((db, id)) => (Some(db), id),
        None => (None, token),
    }
}

fn alignment_description(header: &str) -> Option<String> {
    let rest = header.split_once(' ').map(|(_, rest)| rest)?;
    let rest = match rest.find("GO:") {
        Some(pos) => &rest[..pos],
        None => rest,
    };
    non_empty(rest)
}

/// Collects GO text from the alignment header and the lines after it, up
/// to the `Length` line. Once a `GO:` has been seen every following
/// non-blank line is treated as a continuation.
fn collect_go_terms(header: &str, following: &[&str]) -> Option<String> {
    let mut going: Option<String> = header.find("GO:").map(|pos| header[pos..].trim().to_string());

    for next in following {
        if next.contains("Length") || next.starts_with('>') {
            break;
        }
        match going.as_mut() {
            None => {
                if let Some(pos) = next.find("GO:") {
                    going = Some(next[pos..].trim().to_string());
                }
            }
            Some(terms) => {
                let next = next.trim();
                if !next.is_empty() {
                    terms.push(' ');
                    terms.push_str(next);
                }
            }
        }
    }
    going
}

// ---------------------------------------------------------------------------
//  FASTA
// ---------------------------------------------------------------------------

fn parse_fasta(scanner: &mut Scanner, index: &mut HitIndex) {
    let mut open: Option<usize> = None;

    while let Some((line_start, line)) = scanner.next_line() {
        if line.starts_with(FASTA_SUMMARY_HEADER) {
            while let Some((_, summary)) = scanner.next_line() {
                if summary.trim().is_empty() {
                    break;
                }
                if let Some(hit) = parse_fasta_summary(summary) {
                    index.insert(hit);
                }
            }
        } else if let Some(header) = line.strip_prefix(">>") {
            let id = header.split(' ').next().unwrap_or_default();
            index.close(open, line_start);

            let idx = index.get_or_create(id, ReportFormat::Fasta);
            index.hits[idx].start_offset = Some(line_start);
            open = Some(idx);
        } else if line.starts_with("Smith-Waterman") {
            match index.open_hit(open) {
                Some(hit) => parse_smith_waterman(line, hit),
                None => log::trace!("Smith-Waterman line outside an alignment"),
            }
        } else if let Some(e_value) = fasta_e_value(line) {
            if let Some(hit) = index.open_hit(open) {
                hit.e_value = Some(e_value.to_string());
            }
        }
    }

    index.close(open, scanner.offset());
}

/// `SW:BAX_HUMAN Apoptosis regulator BAX  ( 192) 1234 290.1 1.2e-80`
fn parse_fasta_summary(line: &str) -> Option<Hit> {
    let line = line.trim_start();
    let id = line.split_whitespace().next()?;
    let rest = &line[id.len()..];

    let mut hit = Hit::new(id, ReportFormat::Fasta);
    match length_column(rest) {
        Some((open, close)) => {
            hit.description = non_empty(&rest[..open]);
            hit.e_value = rest[close + 1..].split_whitespace().last().map(str::to_string);
        }
        None => hit.description = non_empty(rest),
    }
    Some(hit)
}

/// Position of the last `( nnn)` group, the sequence length column.
fn length_column(rest: &str) -> Option<(usize, usize)> {
    let open = rest.rfind('(')?;
    let close = find_from(rest, ")", open)?;
    let inner = rest[open + 1..close].trim();
    if inner.is_empty() || !inner.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some((open, close))
}

/// Positional parse of
/// `Smith-Waterman score: 1234;  45.6% identity (78.9% ungapped) in 300 aa overlap (1-300:5-305)`.
fn parse_smith_waterman(line: &str, hit: &mut Hit) {
    let Some(score_at) = line.find("score:") else {
        log::trace!("No score in {line:?}");
        return;
    };
    let mut cursor = score_at + 6;

    if let Some(semi) = find_from(line, ";", cursor) {
        hit.score = non_empty(&line[cursor..semi]);
        cursor = semi + 1;
        if let Some(ident) = find_from(line, "identity", cursor) {
            hit.identity = non_empty(&line[cursor..ident]);
            cursor = ident;
        }
    }

    if let Some(open) = find_from(line, "(", cursor) {
        if let Some(close) = find_from(line, "ungapped)", open) {
            hit.ungapped = non_empty(&line[open + 1..close]);
            cursor = close;
        }
    }

    let Some(in_at) = find_from(line, " in ", cursor) else {
        return;
    };
    let Some(open) = find_from(line, "(", in_at) else {
        return;
    };
    hit.overlap = non_empty(&line[in_at + 4..open]);

    let ranges_at = open + 1;
    if let Some(colon) = find_from(line, ":", ranges_at) {
        hit.query_range = non_empty(&line[ranges_at..colon]);
        if let Some(close) = find_from(line, ")", colon + 1) {
            hit.subject_range = non_empty(&line[colon + 1..close]);
        }
    }
}

/// First token after ` E():` or ` E(<db size>):`.
fn fasta_e_value(line: &str) -> Option<&str> {
    let pos = line.find(" E(")?;
    let rest = &line[pos + 3..];
    let close = rest.find("):")?;
    if !rest[..close].chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    rest[close + 2..].split_whitespace().next()
}

// ---------------------------------------------------------------------------
//  Helpers
// ---------------------------------------------------------------------------

fn find_from(line: &str, pat: &str, from: usize) -> Option<usize> {
    line.get(from..)?.find(pat).map(|i| i + from)
}

/// Text inside the first `(...)` at or after `from`, trimmed.
fn parenthesised(line: &str, from: usize) -> Option<String> {
    let open = find_from(line, "(", from)?;
    let close = find_from(line, ")", open)?;
    non_empty(&line[open + 1..close])
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

fn looks_like_e_value(token: &str) -> bool {
    token.parse::<f64>().is_ok() || token.starts_with("e-")
}
