use anyhow::Result;
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::record::{FileSpan, MatchRecord};

/// Open a report file and auto-detect gzip compression, returning a boxed BufRead
pub fn open_report_input<P: AsRef<Path>>(path: P) -> Result<Box<dyn BufRead>> {
    let path = path.as_ref();
    let file = File::open(path)?;

    // Check by file extension (faster than reading magic bytes)
    let is_compressed = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext == "gz")
        .unwrap_or(false);

    if is_compressed {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Comments and blank lines are copied through in every parser state
pub fn is_passthrough(line: &str) -> bool {
    line.is_empty() || line.starts_with('#')
}

/// Header lines cue the start of a file-pair section
pub fn is_header(line: &str) -> bool {
    line.starts_with("File ")
}

/// Parse a header line of the form `File <name>, offset <int>, len <int>`.
///
/// The file name is everything up to the last `, offset ` separator, so
/// names containing commas survive. Returns None for any line whose
/// numeric fields fail to parse; the caller drops such lines silently.
pub fn parse_header(line: &str) -> Option<FileSpan> {
    let rest = line.strip_prefix("File ")?;
    let (name, tail) = rest.rsplit_once(", offset ")?;
    let (offset, len) = tail.rsplit_once(", len")?;

    let offset = offset.trim().parse::<u64>().ok()?;
    let len = len.trim().parse::<u64>().ok()?;

    Some(FileSpan {
        name: name.to_string(),
        offset,
        len,
    })
}

/// Parse a match line `a,b,score,length`.
///
/// Lines with fewer than 4 comma-separated fields, non-numeric fields, or
/// a negative length are unparseable and return None. Extra trailing
/// fields are tolerated and ignored.
pub fn parse_match(line: &str) -> Option<MatchRecord> {
    let fields: Vec<&str> = line.split(',').collect();

    if fields.len() < 4 {
        return None;
    }

    let a = fields[0].trim().parse::<i64>().ok()?;
    let b = fields[1].trim().parse::<i64>().ok()?;
    let score = fields[2].trim().parse::<i64>().ok()?;
    let length = fields[3].trim().parse::<i64>().ok()?;

    if length < 0 {
        return None;
    }

    Some(MatchRecord { a, b, score, length })
}
