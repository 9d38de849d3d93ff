use std::fs;
use std::path::{Path, PathBuf};

use crate::storage::StorageError;
use crate::{util, SEQUENCE_FILE_NAME};

/// The next id to hand out for one table.
#[derive(Debug, Clone, PartialEq)]
struct SequenceEntry {
    database: String,
    table: String,
    next: u64,
}

/// One shared file mapping `database:table` to the next auto-increment id.
/// Every allocation reads, updates and rewrites the whole file.
pub struct SequenceRegistry {
    path: PathBuf,
}

impl SequenceRegistry {
    pub fn new(root: &Path) -> Self {
        SequenceRegistry {
            path: root.join(SEQUENCE_FILE_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Hand out the table's next id and persist its successor. The first id
    /// for a table is 1. Ids are never handed out twice.
    pub fn allocate(&self, database: &str, table: &str) -> Result<u64, StorageError> {
        let database = database.to_lowercase();
        let table = table.to_lowercase();

        let mut entries = self.read_entries()?;

        let allocated = match entries
            .iter_mut()
            .find(|e| e.database == database && e.table == table)
        {
            Some(entry) => {
                let id = entry.next;
                entry.next += 1;
                id
            }
            None => {
                entries.push(SequenceEntry {
                    database: database.clone(),
                    table: table.clone(),
                    next: 2,
                });
                1
            }
        };

        self.write_entries(&entries)?;

        log::debug!("Allocated id {allocated} for {database}:{table}");

        Ok(allocated)
    }

    fn read_entries(&self) -> Result<Vec<SequenceEntry>, StorageError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => return Err(e.into()),
        };

        contents
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(number, line)| self.parse_entry(number + 1, line))
            .collect()
    }

    fn parse_entry(&self, number: usize, line: &str) -> Result<SequenceEntry, StorageError> {
        let parts: Vec<&str> = line.trim().split(':').collect();

        let malformed = || {
            StorageError::Corrupt(format!(
                "{}: malformed sequence line {number}",
                self.path.display()
            ))
        };

        match parts.as_slice() {
            [database, table, next] => Ok(SequenceEntry {
                database: database.to_string(),
                table: table.to_string(),
                next: next.parse().map_err(|_| malformed())?,
            }),
            _ => Err(malformed()),
        }
    }

    fn write_entries(&self, entries: &[SequenceEntry]) -> Result<(), StorageError> {
        let contents: String = entries
            .iter()
            .map(|e| format!("{}:{}:{}\n", e.database, e.table, e.next))
            .collect();

        Ok(util::write_atomic(&self.path, &contents)?)
    }
}

#[cfg(test)]
mod sequence_tests {
    use super::*;
    use crate::util::temp_data_dir;

    #[test]
    fn test_first_allocation_is_one() {
        let dir = temp_data_dir();
        let registry = SequenceRegistry::new(&dir);

        assert_eq!(registry.allocate("markbook", "marks").unwrap(), 1);
        assert_eq!(registry.allocate("markbook", "marks").unwrap(), 2);
        assert_eq!(registry.allocate("markbook", "marks").unwrap(), 3);

        let contents = fs::read_to_string(registry.path()).unwrap();
        assert_eq!(contents, "markbook:marks:4\n");

        fs::remove_dir_all(dir).expect("Unable to clear down test.");
    }

    #[test]
    fn test_tables_are_independent() {
        let dir = temp_data_dir();
        let registry = SequenceRegistry::new(&dir);

        assert_eq!(registry.allocate("markbook", "marks").unwrap(), 1);
        assert_eq!(registry.allocate("markbook", "coursework").unwrap(), 1);
        assert_eq!(registry.allocate("other", "marks").unwrap(), 1);
        assert_eq!(registry.allocate("MarkBook", "Marks").unwrap(), 2);

        let contents = fs::read_to_string(registry.path()).unwrap();
        assert_eq!(
            contents,
            "markbook:marks:3\nmarkbook:coursework:2\nother:marks:2\n"
        );

        fs::remove_dir_all(dir).expect("Unable to clear down test.");
    }

    #[test]
    fn test_registry_survives_reopen() {
        let dir = temp_data_dir();

        SequenceRegistry::new(&dir).allocate("db", "t").unwrap();
        let reopened = SequenceRegistry::new(&dir);

        assert_eq!(reopened.allocate("db", "t").unwrap(), 2);

        fs::remove_dir_all(dir).expect("Unable to clear down test.");
    }

    #[test]
    fn test_malformed_line() {
        let dir = temp_data_dir();
        let registry = SequenceRegistry::new(&dir);
        fs::write(registry.path(), "db:t:2\nnonsense\n").unwrap();

        let actual = registry.allocate("db", "t");

        assert!(matches!(actual, Err(StorageError::Corrupt(_))));

        fs::remove_dir_all(dir).expect("Unable to clear down test.");
    }
}
