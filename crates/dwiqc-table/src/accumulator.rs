//! Appending records to a group table file

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::error::{TableError, TableResult};
use crate::fixed_width;
use crate::record::MetricRecord;
use crate::table::GroupTable;
use crate::SUBJECT_FIELD;

/// What an append did to the table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendOutcome {
    /// The file did not exist before this append
    pub created: bool,
    /// Row count after the append
    pub rows: usize,
    /// Columns introduced by the appended record
    pub added_columns: Vec<String>,
    /// Earlier rows already carried this subject
    pub repeated_subject: bool,
}

/// A group table persisted at a filesystem path.
///
/// Loading, appending and storing are not guarded against other processes.
/// Two appends racing on the same path lose one of the rows, so callers
/// running several subjects at once must serialize appends per path.
#[derive(Debug, Clone)]
pub struct GroupTableFile {
    path: PathBuf,
}

impl GroupTableFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        GroupTableFile { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Read the table, or an empty table when the file does not exist.
    pub fn load(&self) -> TableResult<GroupTable> {
        if !self.exists() {
            return Ok(GroupTable::new());
        }
        let text = fs::read_to_string(&self.path).map_err(|source| TableError::Io {
            path: self.path.clone(),
            source,
        })?;
        fixed_width::parse(&text).map_err(|source| TableError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    /// Replace the file content with the rendered table.
    ///
    /// The text goes to a temporary file next to the target which is then
    /// renamed over it, so a failed write keeps the previous table.
    pub fn store(&self, table: &GroupTable) -> TableResult<()> {
        let text = fixed_width::render(table);
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let io_err = |source: std::io::Error| TableError::Io {
            path: self.path.clone(),
            source,
        };

        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(io_err)?;
        tmp.write_all(text.as_bytes()).map_err(io_err)?;
        tmp.as_file().sync_all().map_err(io_err)?;
        tmp.persist(&self.path).map_err(|e| io_err(e.error))?;
        Ok(())
    }

    /// Append `record` as the last row and rewrite the file.
    pub fn append(&self, record: &MetricRecord) -> TableResult<AppendOutcome> {
        let subject = record.subject().map(str::to_owned).or_else(|| {
            record.get(SUBJECT_FIELD).filter(|c| !c.is_null()).map(|c| c.render())
        });
        let Some(subject) = subject else {
            return Err(TableError::MissingSubject(SUBJECT_FIELD));
        };

        let created = !self.exists();
        if created {
            info!("group QC table not found, creating {}", self.path.display());
        } else {
            info!("group QC table found, appending to {}", self.path.display());
        }

        let mut table = self.load()?;
        let previous = table.rows_for_subject(&subject);
        let repeated_subject = !previous.is_empty();
        if repeated_subject {
            warn!(
                "subject {subject} already has {} row(s) in {}; appending another one",
                previous.len(),
                self.path.display()
            );
        }

        let added_columns = table.push(record);
        if !created && !added_columns.is_empty() {
            debug!("new columns in {}: {}", self.path.display(), added_columns.join(", "));
        }
        self.store(&table)?;

        Ok(AppendOutcome {
            created,
            rows: table.len(),
            added_columns,
            repeated_subject,
        })
    }
}

/// Append `record` to the group table at `table_path`, creating the file
/// when it does not exist yet. The whole table is rewritten every time.
pub fn append_record(
    table_path: impl AsRef<Path>,
    record: &MetricRecord,
) -> TableResult<AppendOutcome> {
    GroupTableFile::new(table_path.as_ref()).append(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Cell;

    fn record(subject: &str, fields: &[(&str, f64)]) -> MetricRecord {
        let mut r = MetricRecord::for_subject(subject).unwrap();
        for (name, value) in fields {
            r.insert(name, *value).unwrap();
        }
        r
    }

    #[test]
    fn test_append_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("group_qc.txt");

        let outcome = append_record(&path, &record("sub-01", &[("X", 1.5)])).unwrap();
        assert!(outcome.created);
        assert_eq!(outcome.rows, 1);
        assert_eq!(outcome.added_columns, ["Sub", "X"]);
        assert!(!outcome.repeated_subject);

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text, "   Sub    X\nsub-01  1.5\n");
    }

    #[test]
    fn test_append_to_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("group_qc.txt");
        append_record(&path, &record("sub-01", &[("X", 1.0)])).unwrap();
        let outcome = append_record(&path, &record("sub-02", &[("Y", 2.0)])).unwrap();

        assert!(!outcome.created);
        assert_eq!(outcome.rows, 2);
        assert_eq!(outcome.added_columns, ["Y"]);

        let table = GroupTableFile::new(&path).load().unwrap();
        assert_eq!(table.columns(), ["Sub", "X", "Y"]);
        assert_eq!(table.cell(0, "Y"), Some(&Cell::Null));
    }

    #[test]
    fn test_repeated_subject_is_appended() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("group_qc.txt");
        append_record(&path, &record("sub-01", &[("X", 1.0)])).unwrap();
        let outcome = append_record(&path, &record("sub-01", &[("X", 2.0)])).unwrap();
        assert!(outcome.repeated_subject);
        assert_eq!(outcome.rows, 2);
    }

    #[test]
    fn test_numeric_subject_survives_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("group_qc.txt");
        append_record(&path, &record("1001", &[("X", 1.0)])).unwrap();
        let outcome = append_record(&path, &record("1001", &[("X", 2.0)])).unwrap();
        assert!(outcome.repeated_subject);

        let table = GroupTableFile::new(&path).load().unwrap();
        assert_eq!(table.cell(0, "Sub"), Some(&Cell::Text("1001".into())));
        assert_eq!(table.row(1).unwrap().subject(), Some("1001"));
    }

    #[test]
    fn test_missing_subject() {
        let dir = tempfile::tempdir().unwrap();
        let mut r = MetricRecord::new();
        r.insert("X", 1.0).unwrap();
        let err = append_record(dir.path().join("t.txt"), &r).unwrap_err();
        assert!(matches!(err, TableError::MissingSubject("Sub")));
        assert!(!dir.path().join("t.txt").exists());
    }

    #[test]
    fn test_missing_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("group_qc.txt");
        let err = append_record(&path, &record("sub-01", &[])).unwrap_err();
        assert!(matches!(err, TableError::Io { .. }));
    }

    #[test]
    fn test_corrupt_table_is_left_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("group_qc.txt");
        let corrupt = "Sub  X\n  a  1  2\n";
        fs::write(&path, corrupt).unwrap();

        let err = append_record(&path, &record("sub-01", &[("X", 1.0)])).unwrap_err();
        match err {
            TableError::Corrupt { source, .. } => assert_eq!(source.line, 2),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(fs::read_to_string(&path).unwrap(), corrupt);
    }

    #[test]
    fn test_load_then_store_is_byte_identical() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("group_qc.txt");
        append_record(&path, &record("sub-01", &[("X", 0.123456789)])).unwrap();
        append_record(&path, &record("sub-02", &[("Y", 1e-9)])).unwrap();
        let before = fs::read(&path).unwrap();

        let file = GroupTableFile::new(&path);
        file.store(&file.load().unwrap()).unwrap();
        assert_eq!(fs::read(&path).unwrap(), before);
    }
}
