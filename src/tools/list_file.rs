//! List files describe a set of sources to compress together and pack into banks.
//!
//! ```text
//! (banks) (size)          maximum bank count (0 for unlimited), bytes per bank
//! (start) (end) (file)    one source per line: byte range of a file, end -1 for all of it
//! ```
//!
//! Integers can be decimal, hexadecimal (0x prefix) or octal (0 prefix). Blank lines are
//! skipped and the file name runs to the end of the line.

use log::{debug, info};
use std::fs;
use std::path::Path;

use crate::error::{HuffmunchError, Result};

/// Bank count used when the list file asks for unlimited banks.
pub const UNLIMITED_BANKS: usize = 1 << 16;

/// One source of a list file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    /// Line of the list file this entry came from
    pub line: usize,
    /// First byte to read, negative for the start of the file
    pub start: i64,
    /// Last byte to read + 1, negative for the end of the file
    pub end: i64,
    pub path: String,
}

impl ListEntry {
    /// The bytes of file this entry selects.
    pub fn select<'a>(&self, file: &'a [u8]) -> Result<&'a [u8]> {
        let start = self.start.max(0) as usize;
        let end = if self.end < 0 { file.len() } else { self.end as usize };
        if end > file.len() {
            return Err(HuffmunchError::ListFile {
                line: self.line,
                message: format!(
                    "source start and end ({}, {}) out of range for {} ({} bytes)",
                    self.start,
                    self.end,
                    self.path,
                    file.len()
                ),
            });
        }
        // an end before the start reads nothing
        Ok(file.get(start..end).unwrap_or(&[]))
    }
}

/// A parsed list file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListFile {
    pub bank_max: usize,
    pub bank_size: usize,
    pub entries: Vec<ListEntry>,
}

/// Parse an integer the way C's strtol does with base 0. Returns the value and the rest
/// of the text, or None if no digits were found.
pub fn parse_int(text: &str) -> Option<(i64, &str)> {
    let s = text.trim_start();
    let (negative, s) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let (radix, digits) = if s.len() > 2 && (s.starts_with("0x") || s.starts_with("0X"))
        && s.as_bytes()[2].is_ascii_hexdigit()
    {
        (16, &s[2..])
    } else if s.starts_with('0') {
        (8, s)
    } else {
        (10, s)
    };
    let len = digits
        .find(|c: char| !c.is_digit(radix))
        .unwrap_or(digits.len());
    if len == 0 {
        return None;
    }
    let value = i64::from_str_radix(&digits[..len], radix).ok()?;
    Some((if negative { -value } else { value }, &digits[len..]))
}

impl ListFile {
    pub fn parse(text: &str) -> Result<Self> {
        let mut lines = text.lines().enumerate().map(|(i, l)| (i + 1, l));
        let bad = |line: usize, message: &str| HuffmunchError::ListFile {
            line,
            message: message.to_string(),
        };

        let (_, first) = lines.next().ok_or_else(|| bad(1, "empty list file"))?;
        let (bank_max, rest) = parse_int(first).ok_or_else(|| bad(1, "unable to read bank count"))?;
        let (bank_size, _) = parse_int(rest).ok_or_else(|| bad(1, "unable to read bank size"))?;
        if bank_max < 0 || bank_size < 0 {
            return Err(bad(1, "bank count and size must not be negative"));
        }
        let bank_max = match bank_max {
            0 => UNLIMITED_BANKS,
            n => n as usize,
        };

        let mut entries = Vec::new();
        for (line, text) in lines {
            let text = text.trim_end();
            if text.is_empty() {
                continue;
            }
            let (start, rest) =
                parse_int(text).ok_or_else(|| bad(line, "unable to read start position"))?;
            let (end, rest) =
                parse_int(rest).ok_or_else(|| bad(line, "unable to read end position"))?;
            let path = rest.trim_start();
            if path.is_empty() {
                return Err(bad(line, "missing file name"));
            }
            entries.push(ListEntry {
                line,
                start,
                end,
                path: path.to_string(),
            });
        }
        debug!("{} entries, {} banks of {} bytes", entries.len(), bank_max, bank_size);
        Ok(ListFile {
            bank_max,
            bank_size: bank_size as usize,
            entries,
        })
    }

    pub fn read(path: &Path) -> Result<Self> {
        let list = Self::parse(&fs::read_to_string(path)?)?;
        info!("{} entries read from {}", list.entries.len(), path.display());
        Ok(list)
    }

    /// Read every source. Returns all the data together, and where each entry starts in it.
    pub fn gather(&self) -> Result<(Vec<u8>, Vec<usize>)> {
        let mut data = Vec::new();
        let mut splits = Vec::with_capacity(self.entries.len());
        for (i, entry) in self.entries.iter().enumerate() {
            splits.push(data.len());
            let file = fs::read(&entry.path)?;
            let selected = entry.select(&file)?;
            debug!(
                "{:4}: {:5} bytes read from {} ({},{})",
                i,
                selected.len(),
                entry.path,
                entry.start,
                entry.end
            );
            data.extend_from_slice(selected);
        }
        info!("{} bytes read from {} source entries", data.len(), self.entries.len());
        Ok((data, splits))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_int_test() {
        assert_eq!(parse_int("42 rest"), Some((42, " rest")));
        assert_eq!(parse_int("  0x1F,"), Some((31, ",")));
        assert_eq!(parse_int("017"), Some((15, "")));
        assert_eq!(parse_int("0"), Some((0, "")));
        assert_eq!(parse_int("-1 file"), Some((-1, " file")));
        assert_eq!(parse_int("09"), Some((0, "9")));
        assert_eq!(parse_int("0x"), Some((0, "x")));
        assert_eq!(parse_int("file"), None);
        assert_eq!(parse_int(""), None);
    }

    #[test]
    fn parse_test() {
        let text = "0 0x2000\n0 -1 data/first.bin\n\n  16 0x20 data/with space.txt  \n";
        let list = ListFile::parse(text).unwrap();
        assert_eq!(list.bank_max, UNLIMITED_BANKS);
        assert_eq!(list.bank_size, 0x2000);
        assert_eq!(
            list.entries,
            vec![
                ListEntry { line: 2, start: 0, end: -1, path: "data/first.bin".to_string() },
                ListEntry { line: 4, start: 16, end: 32, path: "data/with space.txt".to_string() },
            ]
        );
    }

    #[test]
    fn parse_errors_test() {
        assert!(matches!(ListFile::parse(""), Err(HuffmunchError::ListFile { line: 1, .. })));
        assert!(matches!(ListFile::parse("2"), Err(HuffmunchError::ListFile { line: 1, .. })));
        assert!(matches!(
            ListFile::parse("1 100\nnope 3 file"),
            Err(HuffmunchError::ListFile { line: 2, .. })
        ));
        assert!(matches!(
            ListFile::parse("1 100\n0 3"),
            Err(HuffmunchError::ListFile { line: 2, .. })
        ));
    }

    #[test]
    fn select_test() {
        let file = b"0123456789";
        let entry = |start, end| ListEntry { line: 2, start, end, path: "f".to_string() };
        assert_eq!(entry(0, -1).select(file).unwrap(), b"0123456789");
        assert_eq!(entry(-5, 3).select(file).unwrap(), b"012");
        assert_eq!(entry(4, 6).select(file).unwrap(), b"45");
        assert_eq!(entry(6, 4).select(file).unwrap(), b"");
        assert!(entry(0, 11).select(file).is_err());
    }
}
