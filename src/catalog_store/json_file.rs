use super::trait_def::BookPersistence;
use crate::book::Book;
use anyhow::{Context, Result};
use std::{
    fs::File,
    io::{Read, Write},
    path::{Path, PathBuf},
};
use tracing::debug;

pub const DEFAULT_DATA_FILE_NAME: &str = "library.json";

/// Stores the catalog as a pretty printed JSON array in a single file.
pub struct JsonFileBookPersistence {
    file_path: PathBuf,
}

impl JsonFileBookPersistence {
    pub fn new<P: Into<PathBuf>>(file_path: P) -> JsonFileBookPersistence {
        JsonFileBookPersistence {
            file_path: file_path.into(),
        }
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// Walks up from the current directory looking for an existing data file.
    pub fn infer_path() -> Option<PathBuf> {
        let mut current_dir = std::env::current_dir().ok()?;

        loop {
            let candidate = current_dir.join(DEFAULT_DATA_FILE_NAME);
            if candidate.is_file() {
                return Some(candidate);
            }

            match current_dir.parent() {
                Some(parent) => current_dir = parent.to_path_buf(),
                None => break,
            }
        }

        None
    }
}

impl BookPersistence for JsonFileBookPersistence {
    fn load(&self) -> Result<Vec<Book>> {
        if !self.file_path.exists() {
            debug!("No data file at {:?}, starting empty", self.file_path);
            return Ok(vec![]);
        }

        let mut file = File::open(&self.file_path)
            .with_context(|| format!("Failed to open data file {:?}", self.file_path))?;
        let mut content = String::new();
        file.read_to_string(&mut content)
            .with_context(|| format!("Failed to read data file {:?}", self.file_path))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse data file {:?}", self.file_path))
    }

    fn save(&self, books: &[Book]) -> Result<()> {
        let json_string = serde_json::to_string_pretty(books)?;
        let mut file = File::create(&self.file_path)
            .with_context(|| format!("Failed to create data file {:?}", self.file_path))?;
        file.write_all(json_string.as_bytes())?;
        file.flush()?;
        Ok(())
    }

    fn describe(&self) -> String {
        self.file_path.display().to_string()
    }
}
