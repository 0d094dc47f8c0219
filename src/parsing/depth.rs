//! Parser for per-base depth tables.
//!
//! Two row layouts are accepted, separated by tabs or spaces:
//!
//! - `contig position depth` with 1-based positions (`bedtools genomecov -d`)
//! - `contig start end depth` with 0-based half-open intervals (bedGraph,
//!   e.g. `bedtools genomecov -bga`)
//!
//! Rows of one contig must be contiguous and in order; a contig's length is
//! the number of positions it covers.

use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::MultiGzDecoder;

use crate::delinking::coverage::CoverageTable;
use crate::parsing::ParseError;
use crate::utils::validation::is_gzipped;

/// Parse a depth file, plain or gzip compressed
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, or
/// `ParseError::InvalidFormat` if a row is malformed or out of order.
pub fn parse_depth_file(path: &Path) -> Result<CoverageTable, ParseError> {
    let file = std::fs::File::open(path)?;
    if is_gzipped(path) {
        parse_depth_reader(BufReader::new(MultiGzDecoder::new(file)))
    } else {
        parse_depth_reader(BufReader::new(file))
    }
}

/// Parse depth rows from text
///
/// # Errors
///
/// Returns `ParseError::InvalidFormat` if a row is malformed or out of order.
pub fn parse_depth_text(text: &str) -> Result<CoverageTable, ParseError> {
    parse_depth_reader(text.as_bytes())
}

/// Parse depth rows from any buffered reader
///
/// # Errors
///
/// Returns `ParseError::Io` on read failures, or `ParseError::InvalidFormat`
/// if a row is malformed or out of order.
pub fn parse_depth_reader<R: BufRead>(reader: R) -> Result<CoverageTable, ParseError> {
    let mut table = CoverageTable::new();

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        // Line numbers in errors are 1-based for user friendliness
        let line_num = i + 1;
        let fields: Vec<&str> = line.split_whitespace().collect();

        match fields.len() {
            3 => {
                let contig = fields[0];
                let position = parse_number(fields[1], "position", line_num)?;
                let depth = parse_depth(fields[2], line_num)?;
                let expected = table.length(contig).unwrap_or(0) + 1;
                if position != expected {
                    return Err(ParseError::InvalidFormat(format!(
                        "Line {line_num}: expected position {expected} for contig '{contig}', found {position}"
                    )));
                }
                table.push(contig, depth);
            }
            4 => {
                let contig = fields[0];
                let start = parse_number(fields[1], "start", line_num)?;
                let end = parse_number(fields[2], "end", line_num)?;
                let depth = parse_depth(fields[3], line_num)?;
                let expected = table.length(contig).unwrap_or(0);
                if start != expected || end < start {
                    return Err(ParseError::InvalidFormat(format!(
                        "Line {line_num}: interval {start}-{end} does not continue contig '{contig}' at {expected}"
                    )));
                }
                for _ in start..end {
                    table.push(contig, depth);
                }
            }
            n => {
                return Err(ParseError::InvalidFormat(format!(
                    "Line {line_num} has {n} fields, expected 3 or 4"
                )));
            }
        }
    }

    if table.is_empty() {
        return Err(ParseError::InvalidFormat(
            "No depth rows found".to_string(),
        ));
    }

    Ok(table)
}

fn parse_number(field: &str, what: &str, line_num: usize) -> Result<u64, ParseError> {
    field.parse().map_err(|_| {
        ParseError::InvalidFormat(format!("Invalid {what} on line {line_num}: '{field}'"))
    })
}

fn parse_depth(field: &str, line_num: usize) -> Result<u32, ParseError> {
    field.parse().map_err(|_| {
        ParseError::InvalidFormat(format!("Invalid depth on line {line_num}: '{field}'"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_genomecov_rows() {
        let text = "NODE_1\t1\t5\nNODE_1\t2\t6\nNODE_1\t3\t7\nNODE_2\t1\t0\n";
        let table = parse_depth_text(text).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.depths("NODE_1"), Some(&[5, 6, 7][..]));
        assert_eq!(table.length("NODE_2"), Some(1));
    }

    #[test]
    fn test_parse_bedgraph_rows() {
        let text = "# header comment\nctg 0 3 4\nctg 3 5 9\n";
        let table = parse_depth_text(text).unwrap();
        assert_eq!(table.depths("ctg"), Some(&[4, 4, 4, 9, 9][..]));
    }

    #[test]
    fn test_space_separated_rows() {
        let table = parse_depth_text("a 1 2\na 2 3\n").unwrap();
        assert_eq!(table.depths("a"), Some(&[2, 3][..]));
    }

    #[test]
    fn test_out_of_order_positions() {
        let err = parse_depth_text("a\t1\t2\na\t3\t3\n").unwrap_err();
        assert!(err.to_string().contains("Line 2"));
    }

    #[test]
    fn test_invalid_depth() {
        assert!(parse_depth_text("a\t1\tlots\n").is_err());
        assert!(parse_depth_text("a\t1\n").is_err());
        assert!(parse_depth_text("").is_err());
    }

    #[test]
    fn test_parse_gzipped_file() {
        let mut temp = NamedTempFile::with_suffix(".txt.gz").unwrap();
        {
            let mut encoder = GzEncoder::new(temp.as_file_mut(), Compression::default());
            encoder.write_all(b"c1\t1\t10\nc1\t2\t11\n").unwrap();
            encoder.finish().unwrap();
        }
        temp.flush().unwrap();

        let table = parse_depth_file(temp.path()).unwrap();
        assert_eq!(table.depths("c1"), Some(&[10, 11][..]));
    }
}
