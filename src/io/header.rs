//! Header discovery.
//!
//! Several publishers prepend free-form comment lines to their CSV and declare the
//! column list on a commented line of its own:
//!
//! ```text
//! ################################
//! # abuse.ch SSLBL ...
//! ################################
//! # Firstseen,DstIP,DstPort
//! 2024-01-01 00:00:00,1.2.3.4,443
//! ```
//!
//! We scan for the first line containing a known marker and take that line as
//! the schema. The scan is bounded by the input: no marker means `SchemaNotFound`.

use crate::error::FeedError;

/// A located header and the text that follows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedHeader<'a> {
    pub fields: Vec<String>,
    /// Everything after the header line.
    pub rest: &'a str,
    /// 1-based line number of the header.
    pub line: usize,
}

/// Find the first line containing `marker` and split it into field names.
pub fn locate_header<'a>(text: &'a str, marker: &str) -> Result<LocatedHeader<'a>, FeedError> {
    let mut offset = 0usize;
    for (idx, line) in text.split_inclusive('\n').enumerate() {
        offset += line.len();
        if line.contains(marker) {
            return Ok(LocatedHeader {
                fields: split_header(line),
                rest: &text[offset..],
                line: idx + 1,
            });
        }
    }

    Err(FeedError::SchemaNotFound {
        marker: marker.to_string(),
    })
}

/// Strip comment markers, whitespace and a UTF-8 BOM, then split on `,`.
fn split_header(line: &str) -> Vec<String> {
    line.trim_start_matches('\u{feff}')
        .trim_matches(|c: char| c == '#' || c.is_whitespace())
        .split(',')
        .map(|name| name.trim().trim_matches('"').to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MARKER: &str = "Firstseen,DstIP,DstPort";

    #[test]
    fn finds_commented_header_after_preamble() {
        let text = "################\n# SSLBL aggressive\n# Terms of use: ...\n# Firstseen,DstIP,DstPort\r\n2024-01-01 00:00:00,1.2.3.4,443\r\n";

        let header = locate_header(text, MARKER).unwrap();
        assert_eq!(header.fields, vec!["Firstseen", "DstIP", "DstPort"]);
        assert_eq!(header.line, 4);
        assert_eq!(header.rest, "2024-01-01 00:00:00,1.2.3.4,443\r\n");
    }

    #[test]
    fn uncommented_header_on_first_line() {
        let text = "\u{feff}cveID,vendorProject,dateAdded\nCVE-1,Acme,2024-01-01\n";

        let header = locate_header(text, "cveID,vendorProject").unwrap();
        assert_eq!(header.fields, vec!["cveID", "vendorProject", "dateAdded"]);
        assert_eq!(header.line, 1);
    }

    #[test]
    fn header_as_last_line_leaves_empty_rest() {
        let header = locate_header("# comment\n# Firstseen,DstIP,DstPort", MARKER).unwrap();
        assert_eq!(header.rest, "");
        assert_eq!(header.fields.len(), 3);
    }

    #[test]
    fn missing_marker_is_schema_not_found() {
        let text = "# comment\n# another comment\n1.2.3.4\n";
        let err = locate_header(text, MARKER).unwrap_err();
        assert_eq!(
            err,
            FeedError::SchemaNotFound {
                marker: MARKER.to_string()
            }
        );
    }

    #[test]
    fn empty_input_is_schema_not_found() {
        assert!(locate_header("", MARKER).is_err());
    }
}
