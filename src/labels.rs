//! Country name <-> label mapping.
//!
//! Labels are handed out in first-seen order and stored as one byte in the
//! tree file, so the table holds at most [`LabelTable::CAPACITY`] entries.
//! Entry 0 is the empty name and means "no country".

use crate::error::{GeomoirError, Result};
use rustc_hash::FxHashMap;
use std::io::{BufRead, Write};

/// Label reserved for regions that belong to no country.
pub const NO_COUNTRY: u8 = 0;

/// Insertion-ordered table of country names, indexed by label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelTable {
    names: Vec<String>,
    lookup: FxHashMap<String, u8>,
}

impl LabelTable {
    /// Maximum number of entries, the reserved empty entry included.
    pub const CAPACITY: usize = u8::MAX as usize + 1;

    /// Create a table holding only the reserved empty entry.
    pub fn new() -> Self {
        let mut lookup = FxHashMap::default();
        lookup.insert(String::new(), NO_COUNTRY);
        Self {
            names: vec![String::new()],
            lookup,
        }
    }

    /// Return the label of `name`, registering it first if unseen.
    ///
    /// Fails with [`GeomoirError::LabelOverflow`] once the table is full.
    pub fn intern(&mut self, name: &str) -> Result<u8> {
        if let Some(&label) = self.lookup.get(name) {
            return Ok(label);
        }

        if self.names.len() >= Self::CAPACITY {
            return Err(GeomoirError::LabelOverflow {
                name: name.to_string(),
                capacity: Self::CAPACITY,
            });
        }

        let label = self.names.len() as u8;
        self.names.push(name.to_string());
        self.lookup.insert(name.to_string(), label);
        Ok(label)
    }

    /// Label of an already registered name.
    pub fn get(&self, name: &str) -> Option<u8> {
        self.lookup.get(name).copied()
    }

    /// Name behind a label. The reserved label yields `Some("")`.
    pub fn name(&self, label: u8) -> Option<&str> {
        self.names.get(label as usize).map(String::as_str)
    }

    /// Country name behind a label, `None` for the reserved label or an unknown one.
    pub fn country(&self, label: u8) -> Option<&str> {
        if label == NO_COUNTRY {
            return None;
        }
        self.name(label)
    }

    pub fn contains_label(&self, label: u8) -> bool {
        (label as usize) < self.names.len()
    }

    /// Number of entries, the reserved entry included.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// True when no country has been registered yet.
    pub fn is_empty(&self) -> bool {
        self.names.len() == 1
    }

    /// Iterate `(label, name)` pairs in label order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, &str)> {
        self.names
            .iter()
            .enumerate()
            .map(|(label, name)| (label as u8, name.as_str()))
    }

    /// Write the label file: one line per entry, starting with the empty
    /// reserved entry, so line N holds label N.
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        for name in &self.names {
            writer.write_all(name.as_bytes())?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Read a label file produced by [`LabelTable::write_to`].
    ///
    /// An empty file yields a table with only the reserved entry.
    pub fn read_from<R: BufRead>(reader: R) -> Result<Self> {
        let mut table = Self::new();

        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            let name = line.strip_suffix('\r').unwrap_or(&line);

            if line_no == 0 {
                if !name.is_empty() {
                    return Err(GeomoirError::InvalidFormat(format!(
                        "label file must start with the empty reserved entry, found '{}'",
                        name
                    )));
                }
                continue;
            }

            if table.lookup.contains_key(name) {
                return Err(GeomoirError::InvalidFormat(format!(
                    "duplicate country name '{}' on line {}",
                    name,
                    line_no + 1
                )));
            }
            table.intern(name)?;
        }

        Ok(table)
    }
}

impl Default for LabelTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_new_table_reserves_zero() {
        let table = LabelTable::new();
        assert_eq!(table.len(), 1);
        assert!(table.is_empty());
        assert_eq!(table.get(""), Some(NO_COUNTRY));
        assert_eq!(table.name(NO_COUNTRY), Some(""));
        assert_eq!(table.country(NO_COUNTRY), None);
    }

    #[test]
    fn test_intern_first_seen_order() {
        let mut table = LabelTable::new();
        assert_eq!(table.intern("France").unwrap(), 1);
        assert_eq!(table.intern("Spain").unwrap(), 2);
        assert_eq!(table.intern("France").unwrap(), 1);
        assert_eq!(table.intern("").unwrap(), NO_COUNTRY);
        assert_eq!(table.country(2), Some("Spain"));
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_capacity_limit() {
        let mut table = LabelTable::new();
        for i in 1..LabelTable::CAPACITY {
            assert_eq!(table.intern(&format!("country-{i}")).unwrap() as usize, i);
        }
        assert_eq!(table.len(), 256);

        // Known names still resolve once full
        assert_eq!(table.intern("country-255").unwrap(), 255);

        let err = table.intern("one-too-many").unwrap_err();
        assert!(matches!(
            err,
            GeomoirError::LabelOverflow { ref name, capacity: 256 } if name == "one-too-many"
        ));
    }

    #[test]
    fn test_file_round_trip() {
        let mut table = LabelTable::new();
        table.intern("United Kingdom").unwrap();
        table.intern("Ireland").unwrap();

        let mut buf = Vec::new();
        table.write_to(&mut buf).unwrap();
        assert_eq!(buf, b"\nUnited Kingdom\nIreland\n");

        let loaded = LabelTable::read_from(Cursor::new(buf)).unwrap();
        assert_eq!(loaded, table);
    }

    #[test]
    fn test_read_crlf() {
        let loaded = LabelTable::read_from(Cursor::new("\r\nPeru\r\nCanada\r\n")).unwrap();
        assert_eq!(loaded.get("Peru"), Some(1));
        assert_eq!(loaded.country(2), Some("Canada"));
    }

    #[test]
    fn test_read_empty_file() {
        let loaded = LabelTable::read_from(Cursor::new("")).unwrap();
        assert!(loaded.is_empty());
    }

    #[test]
    fn test_read_rejects_missing_reserved_entry() {
        let err = LabelTable::read_from(Cursor::new("Peru\nCanada\n")).unwrap_err();
        assert!(matches!(err, GeomoirError::InvalidFormat(_)));
    }

    #[test]
    fn test_read_rejects_duplicates() {
        let err = LabelTable::read_from(Cursor::new("\nPeru\nPeru\n")).unwrap_err();
        assert!(matches!(err, GeomoirError::InvalidFormat(_)));
    }

    #[test]
    fn test_read_rejects_oversized_file() {
        let mut contents = String::from("\n");
        for i in 0..LabelTable::CAPACITY {
            contents.push_str(&format!("country-{i}\n"));
        }
        let err = LabelTable::read_from(Cursor::new(contents)).unwrap_err();
        assert!(matches!(err, GeomoirError::LabelOverflow { .. }));
    }
}
