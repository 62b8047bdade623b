//! The on-disk CSV output set.
//!
//! Headers are written only to files this run creates or truncates; appending
//! to an existing file never adds a second header row.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use crate::error::ExportError;
use crate::tables::{csv_writer, DocumentTables, Table};

/// How to treat output files that already exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Refuse to start if any output file exists.
    #[default]
    Create,
    /// Add rows to existing files; create (with headers) any that are missing.
    Append,
    /// Truncate existing files and start again with headers.
    Overwrite,
}

/// Names of the output files already present in `dir`, in table order.
#[must_use]
pub fn existing_outputs(dir: &Path) -> Vec<String> {
    Table::ALL
        .into_iter()
        .filter(|table| dir.join(table.file_name()).exists())
        .map(|table| table.file_name().to_owned())
        .collect()
}

/// Fails with [`ExportError::OutputConflict`] when `mode` is
/// [`OutputMode::Create`] and any output file already exists in `dir`.
///
/// # Errors
///
/// Returns [`ExportError::OutputConflict`] listing the existing files.
pub fn check_output_conflicts(dir: &Path, mode: OutputMode) -> Result<(), ExportError> {
    if mode != OutputMode::Create {
        return Ok(());
    }
    let files = existing_outputs(dir);
    if files.is_empty() {
        Ok(())
    } else {
        Err(ExportError::OutputConflict { files })
    }
}

impl DocumentTables<File> {
    /// Opens the four output files in `dir`.
    ///
    /// Runs the conflict check first, so nothing is created or truncated when
    /// it fails.
    ///
    /// # Errors
    ///
    /// - [`ExportError::OutputConflict`] in [`OutputMode::Create`] when files exist.
    /// - [`ExportError::Io`] if a file cannot be opened.
    /// - [`ExportError::Csv`] if a header row cannot be written.
    pub fn open(dir: &Path, mode: OutputMode) -> Result<Self, ExportError> {
        check_output_conflicts(dir, mode)?;

        let documents = open_table(dir, Table::Documents, mode)?;
        let denormalised = open_table(dir, Table::Denormalised, mode)?;
        let companies = open_table(dir, Table::Companies, mode)?;
        let topics = open_table(dir, Table::Topics, mode)?;

        Ok(Self::from_csv_writers(documents, denormalised, companies, topics))
    }
}

fn open_table(dir: &Path, table: Table, mode: OutputMode) -> Result<csv::Writer<File>, ExportError> {
    let path: PathBuf = dir.join(table.file_name());
    let appending = mode == OutputMode::Append && path.exists();

    let file = if appending {
        OpenOptions::new().append(true).open(&path)
    } else {
        File::create(&path)
    }
    .map_err(|source| ExportError::Io {
        path: path.clone(),
        source,
    })?;

    let mut writer = csv_writer(file);
    if !appending {
        writer.write_record(table.headers())?;
        writer.flush().map_err(|source| ExportError::Io { path, source })?;
    }
    tracing::debug!(file = table.file_name(), appending, "opened output table");
    Ok(writer)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(dir: &Path, table: Table) -> String {
        std::fs::read_to_string(dir.join(table.file_name())).unwrap()
    }

    fn header_line(table: Table) -> String {
        table
            .headers()
            .iter()
            .map(|h| format!("\"{h}\""))
            .collect::<Vec<_>>()
            .join(",")
    }

    #[test]
    fn create_mode_writes_every_header_once() {
        let dir = tempfile::tempdir().unwrap();
        let tables = DocumentTables::open(dir.path(), OutputMode::Create).unwrap();
        drop(tables);

        for table in Table::ALL {
            assert_eq!(read(dir.path(), table), format!("{}\n", header_line(table)));
        }
    }

    #[test]
    fn create_mode_refuses_existing_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("documents_topics.csv"), "keep me").unwrap();

        let err = DocumentTables::open(dir.path(), OutputMode::Create).err().unwrap();
        match err {
            ExportError::OutputConflict { files } => {
                assert_eq!(files, vec!["documents_topics.csv".to_owned()]);
            }
            other => panic!("expected OutputConflict, got: {other:?}"),
        }
        // Nothing else was created and the existing file is untouched.
        assert_eq!(existing_outputs(dir.path()), vec!["documents_topics.csv"]);
        assert_eq!(read(dir.path(), Table::Topics), "keep me");
    }

    #[test]
    fn append_mode_never_duplicates_headers() {
        let dir = tempfile::tempdir().unwrap();
        drop(DocumentTables::open(dir.path(), OutputMode::Append).unwrap());
        drop(DocumentTables::open(dir.path(), OutputMode::Append).unwrap());

        for table in Table::ALL {
            let content = read(dir.path(), table);
            assert_eq!(content.matches(&header_line(table)).count(), 1, "{table:?}");
        }
    }

    #[test]
    fn append_mode_creates_missing_files_with_headers() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("documents.csv"), "\"id\"\n\"D0\"\n").unwrap();

        drop(DocumentTables::open(dir.path(), OutputMode::Append).unwrap());

        assert_eq!(read(dir.path(), Table::Documents), "\"id\"\n\"D0\"\n");
        assert_eq!(
            read(dir.path(), Table::Companies),
            format!("{}\n", header_line(Table::Companies))
        );
    }

    #[test]
    fn overwrite_mode_truncates_existing_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("documents.csv"), "old content\n").unwrap();

        drop(DocumentTables::open(dir.path(), OutputMode::Overwrite).unwrap());

        assert_eq!(
            read(dir.path(), Table::Documents),
            format!("{}\n", header_line(Table::Documents))
        );
    }

    #[test]
    fn conflict_check_is_skipped_for_append_and_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("documents.csv"), "").unwrap();

        assert!(check_output_conflicts(dir.path(), OutputMode::Append).is_ok());
        assert!(check_output_conflicts(dir.path(), OutputMode::Overwrite).is_ok());
        assert!(check_output_conflicts(dir.path(), OutputMode::Create).is_err());
    }

    #[test]
    fn conflict_error_names_files_and_remedies() {
        let err = ExportError::OutputConflict {
            files: vec!["documents.csv".to_owned(), "documents_topics.csv".to_owned()],
        };
        let msg = err.to_string();
        assert!(msg.contains("documents.csv, documents_topics.csv"), "got: {msg}");
        assert!(msg.contains("overwrite") && msg.contains("append"), "got: {msg}");
    }
}
