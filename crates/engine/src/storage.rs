use std::fs;
use std::path::{Path, PathBuf};

use cli_common::DbError;
use derive_more::derive::From;
use thiserror::Error;

use crate::{util, ID_COLUMN, TABLE_FILE_EXT};

#[derive(Debug, From, Error)]
pub enum StorageError {
    #[error("{0}")]
    Io(std::io::Error),
    #[error("{path}: {source}")]
    File {
        path: String,
        source: std::io::Error,
    },
    #[error("{0}")]
    Corrupt(String),
}

impl From<StorageError> for DbError {
    fn from(err: StorageError) -> Self {
        DbError::StorageIo(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub id: u64,
    /// One cell per column. Cell 0 is always the id.
    pub cells: Vec<String>,
}

impl Row {
    pub fn new(id: u64, values: Vec<String>) -> Self {
        let mut cells = Vec::with_capacity(values.len() + 1);
        cells.push(id.to_string());
        cells.extend(values);

        Row { id, cells }
    }
}

/// A whole table file held in memory. Tables are read fresh for every command
/// and written back whole.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub name: String,
    pub path: PathBuf,
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl Table {
    /// An empty table whose header is `id` followed by `columns`.
    pub fn new(name: &str, path: PathBuf, columns: &[String]) -> Self {
        let mut header = vec![String::from(ID_COLUMN)];
        header.extend(columns.iter().cloned());

        Table {
            name: name.to_string(),
            path,
            columns: header,
            rows: vec![],
        }
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        column_position(&self.columns, name)
    }

    pub fn require_column(&self, name: &str) -> Result<usize, DbError> {
        self.column_index(name)
            .ok_or_else(|| DbError::AttributeNotFound(name.to_string()))
    }

    /// Append a column, giving every existing row an empty cell for it.
    pub fn add_column(&mut self, name: &str) {
        self.columns.push(name.to_string());

        for row in &mut self.rows {
            row.cells.push(String::new());
        }
    }

    pub fn drop_column(&mut self, index: usize) {
        self.columns.remove(index);

        for row in &mut self.rows {
            row.cells.remove(index);
        }
    }

    pub fn push_row(&mut self, row: Row) {
        self.rows.push(row);
    }

    /// Tab separated, header first, one newline-terminated line per row.
    pub fn serialise(&self) -> String {
        let mut out = self.columns.join("\t");
        out.push('\n');

        for row in &self.rows {
            out.push_str(&row.cells.join("\t"));
            out.push('\n');
        }

        out
    }

    pub fn deserialise(name: &str, path: PathBuf, contents: &str) -> Result<Table, StorageError> {
        let mut lines = contents.lines();

        let columns: Vec<String> = match lines.next() {
            Some(header) => header.split('\t').map(|c| c.trim().to_string()).collect(),
            None => return Err(corrupt(&path, "missing header line")),
        };

        if !columns[0].eq_ignore_ascii_case(ID_COLUMN) {
            return Err(corrupt(&path, "first column is not id"));
        }

        let mut rows = vec![];
        for (number, line) in lines.enumerate().filter(|(_, l)| !l.is_empty()) {
            let cells: Vec<String> = line.split('\t').map(String::from).collect();

            if cells.len() != columns.len() {
                return Err(corrupt(
                    &path,
                    &format!(
                        "row {} has {} cells, expected {}",
                        number + 1,
                        cells.len(),
                        columns.len()
                    ),
                ));
            }

            let id = cells[0]
                .parse::<u64>()
                .map_err(|_| corrupt(&path, &format!("row {} has a bad id", number + 1)))?;

            rows.push(Row { id, cells });
        }

        Ok(Table {
            name: name.to_string(),
            path,
            columns,
            rows,
        })
    }
}

fn corrupt(path: &Path, reason: &str) -> StorageError {
    StorageError::Corrupt(format!("{}: {reason}", path.display()))
}

fn file_error(path: &Path, source: std::io::Error) -> StorageError {
    StorageError::File {
        path: path.display().to_string(),
        source,
    }
}

/// Case-insensitive column lookup.
pub fn column_position(columns: &[String], name: &str) -> Option<usize> {
    columns.iter().position(|c| c.eq_ignore_ascii_case(name))
}

pub fn read_table(name: &str, path: &Path) -> Result<Table, StorageError> {
    let contents = fs::read_to_string(path).map_err(|e| file_error(path, e))?;

    Table::deserialise(name, path.to_path_buf(), &contents)
}

pub fn write_table(table: &Table) -> Result<(), StorageError> {
    log::debug!(
        "Writing table {} ({} rows) to {}",
        table.name,
        table.rows.len(),
        table.path.display()
    );

    util::write_atomic(&table.path, &table.serialise()).map_err(|e| file_error(&table.path, e))
}

/// Resolve a database name to its directory under `root`, matching the stored
/// name case-insensitively.
pub fn find_database(root: &Path, name: &str) -> Result<Option<PathBuf>, StorageError> {
    if !root.is_dir() {
        return Ok(None);
    }

    for entry in fs::read_dir(root)? {
        let entry = entry?;

        if entry.file_type()?.is_dir() && entry.file_name().to_string_lossy().eq_ignore_ascii_case(name)
        {
            return Ok(Some(entry.path()));
        }
    }

    Ok(None)
}

pub fn database_exists(root: &Path, name: &str) -> Result<bool, StorageError> {
    Ok(find_database(root, name)?.is_some())
}

/// Resolve a table name to its file inside `db_dir`, matching the base name
/// case-insensitively.
pub fn find_table(db_dir: &Path, name: &str) -> Result<Option<PathBuf>, StorageError> {
    for entry in fs::read_dir(db_dir)? {
        let path = entry?.path();

        let is_table = path.is_file()
            && path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case(TABLE_FILE_EXT));

        let matches = path
            .file_stem()
            .is_some_and(|stem| stem.to_string_lossy().eq_ignore_ascii_case(name));

        if is_table && matches {
            return Ok(Some(path));
        }
    }

    Ok(None)
}

pub fn table_exists(db_dir: &Path, name: &str) -> Result<bool, StorageError> {
    Ok(find_table(db_dir, name)?.is_some())
}

/// The stored table name for a resolved table file.
pub fn table_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

pub fn table_path(db_dir: &Path, name: &str) -> PathBuf {
    let mut path = db_dir.join(name);
    path.set_extension(TABLE_FILE_EXT);
    path
}
