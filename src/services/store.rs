//! Persistence of the last quote
//!
//! Keeps the raw per-insurer results of the most recent quote so `compare`
//! and `export` can run without hitting the insurers again.

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};

use crate::config::data_dir;
use crate::types::{CotizadorError, RawInsurerResult, Result, UserData, VehicleData};

const STORE_FILE_NAME: &str = "last_quote.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredQuote {
    pub saved_at: DateTime<Utc>,
    pub vehicle: VehicleData,
    pub user: UserData,
    pub results: Vec<RawInsurerResult>,
}

impl StoredQuote {
    pub fn new(vehicle: VehicleData, user: UserData, results: Vec<RawInsurerResult>) -> Self {
        Self {
            saved_at: Utc::now(),
            vehicle,
            user,
            results,
        }
    }
}

pub struct QuoteStore {
    dir: PathBuf,
}

impl QuoteStore {
    /// Store under `~/.cotizador`
    pub fn new() -> Result<Self> {
        Ok(Self { dir: data_dir()? })
    }

    pub fn with_dir(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(STORE_FILE_NAME)
    }

    /// Load the last quote under a shared lock; None when nothing was saved
    pub fn load(&self) -> Result<Option<StoredQuote>> {
        let path = self.path();
        if !path.exists() {
            return Ok(None);
        }

        let file = File::open(&path)?;
        file.lock_shared()
            .map_err(|e| CotizadorError::Store(format!("Failed to acquire read lock: {}", e)))?;

        let mut content = String::new();
        let read = std::io::BufReader::new(&file).read_to_string(&mut content);
        let _ = file.unlock();
        read?;

        let quote = serde_json::from_str(&content)
            .map_err(|e| CotizadorError::Store(format!("Corrupted quote file: {}", e)))?;
        tracing::debug!(path = %path.display(), "loaded last quote");
        Ok(Some(quote))
    }

    /// Replace the stored quote (temp file + rename under an exclusive lock)
    pub fn save(&self, quote: &StoredQuote) -> Result<()> {
        fs::create_dir_all(&self.dir)?;

        let content = serde_json::to_string_pretty(quote)
            .map_err(|e| CotizadorError::Store(format!("Serialization failed: {}", e)))?;

        let path = self.path();
        let temp_path = path.with_extension("json.tmp");

        {
            let mut file = File::create(&temp_path)
                .map_err(|e| CotizadorError::Store(format!("Failed to create temp file: {}", e)))?;
            file.write_all(content.as_bytes())
                .map_err(|e| CotizadorError::Store(format!("Failed to write temp file: {}", e)))?;
            file.sync_all()
                .map_err(|e| CotizadorError::Store(format!("Failed to sync temp file: {}", e)))?;
        }

        let target = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;

        target
            .lock_exclusive()
            .map_err(|e| CotizadorError::Store(format!("Failed to acquire write lock: {}", e)))?;

        fs::rename(&temp_path, &path)
            .map_err(|e| CotizadorError::Store(format!("Failed to rename temp file: {}", e)))?;

        let _ = target.unlock();
        tracing::info!(path = %path.display(), results = quote.results.len(), "saved last quote");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_store() -> (QuoteStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = QuoteStore::with_dir(temp_dir.path().join("nested"));
        (store, temp_dir)
    }

    fn sample_quote() -> StoredQuote {
        StoredQuote::new(
            VehicleData {
                marca: "Honda".into(),
                anio: "2017".into(),
                modelo: "CRV".into(),
                descripcion: "Elegance 2WD".into(),
            },
            UserData::default(),
            vec![
                RawInsurerResult::failure("GNP", "caido", Some(500)),
                RawInsurerResult::pending("AXA"),
            ],
        )
    }

    #[test]
    fn test_load_without_file_is_none() {
        let (store, _temp) = create_test_store();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_save_then_load() {
        let (store, _temp) = create_test_store();
        let quote = sample_quote();
        store.save(&quote).unwrap();

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded, quote);
        assert!(!store.path().with_extension("json.tmp").exists());
    }

    #[test]
    fn test_save_replaces_previous() {
        let (store, _temp) = create_test_store();
        store.save(&sample_quote()).unwrap();

        let mut second = sample_quote();
        second.results.truncate(1);
        store.save(&second).unwrap();

        assert_eq!(store.load().unwrap().unwrap().results.len(), 1);
    }

    #[test]
    fn test_corrupted_file_is_store_error() {
        let (store, _temp) = create_test_store();
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), "{oops").unwrap();
        assert!(matches!(store.load(), Err(CotizadorError::Store(_))));
    }
}
