//! Media cache for generated illustrations and pronunciation clips.
//!
//! Blobs are far larger than the JSON content lists, so they live in a
//! separate SQLite database. The database file is only created the first
//! time something is read or written.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MediaCacheError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Media cache lock poisoned")]
    Poisoned,
}

pub type Result<T> = std::result::Result<T, MediaCacheError>;

/// A cached illustration
#[derive(Debug, Clone, PartialEq)]
pub struct CachedImage {
    pub term: String,
    pub mime_type: String,
    /// Base64 encoded image bytes
    pub data_base64: String,
    pub created_at: DateTime<Utc>,
}

/// A cached pronunciation clip (PCM16 mono)
#[derive(Debug, Clone, PartialEq)]
pub struct CachedClip {
    pub text: String,
    pub sample_rate: u32,
    pub samples: Vec<i16>,
}

pub struct MediaCache {
    db_path: PathBuf,
    conn: Mutex<Option<Connection>>,
}

/// Cache keys are case- and whitespace-insensitive
pub fn normalize_key(key: &str) -> String {
    key.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

impl MediaCache {
    /// Create a cache handle. Nothing touches the disk until first use.
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            db_path: data_dir.join("media.db"),
            conn: Mutex::new(None),
        }
    }

    /// Whether the database file has been created yet
    pub fn is_initialized(&self) -> bool {
        self.db_path.exists()
    }

    fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let mut guard = self.conn.lock().map_err(|_| MediaCacheError::Poisoned)?;
        if guard.is_none() {
            *guard = Some(open_database(&self.db_path)?);
        }
        match guard.as_ref() {
            Some(conn) => f(conn),
            None => Err(MediaCacheError::Poisoned),
        }
    }

    // ===== Illustrations =====

    pub fn get_image(&self, term: &str) -> Result<Option<CachedImage>> {
        let key = normalize_key(term);
        self.with_conn(|conn| {
            let image = conn
                .query_row(
                    "SELECT term, mime_type, data, created_at FROM images WHERE key = ?1",
                    params![key],
                    |row| {
                        let created_at: String = row.get(3)?;
                        Ok(CachedImage {
                            term: row.get(0)?,
                            mime_type: row.get(1)?,
                            data_base64: row.get(2)?,
                            created_at: DateTime::parse_from_rfc3339(&created_at)
                                .map(|d| d.with_timezone(&Utc))
                                .unwrap_or_else(|_| Utc::now()),
                        })
                    },
                )
                .optional()?;
            Ok(image)
        })
    }

    pub fn put_image(&self, term: &str, mime_type: &str, data_base64: &str) -> Result<CachedImage> {
        let key = normalize_key(term);
        let created_at = Utc::now();
        self.with_conn(|conn| {
            conn.execute(
                "INSERT OR REPLACE INTO images (key, term, mime_type, data, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![key, term, mime_type, data_base64, created_at.to_rfc3339()],
            )?;
            Ok(())
        })?;

        Ok(CachedImage {
            term: term.to_string(),
            mime_type: mime_type.to_string(),
            data_base64: data_base64.to_string(),
            created_at,
        })
    }

    pub fn image_count(&self) -> Result<usize> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM images", [], |row| row.get(0))?;
            Ok(count as usize)
        })
    }

    // ===== Pronunciation clips =====

    pub fn get_clip(&self, text: &str) -> Result<Option<CachedClip>> {
        let key = normalize_key(text);
        self.with_conn(|conn| {
            let clip = conn
                .query_row(
                    "SELECT text, sample_rate, pcm FROM pronunciations WHERE key = ?1",
                    params![key],
                    |row| {
                        let pcm: Vec<u8> = row.get(2)?;
                        Ok(CachedClip {
                            text: row.get(0)?,
                            sample_rate: row.get(1)?,
                            samples: pcm
                                .chunks_exact(2)
                                .map(|b| i16::from_le_bytes([b[0], b[1]]))
                                .collect(),
                        })
                    },
                )
                .optional()?;
            Ok(clip)
        })
    }

    pub fn put_clip(&self, text: &str, sample_rate: u32, samples: &[i16]) -> Result<()> {
        let key = normalize_key(text);
        let pcm: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
        self.with_conn(|conn| {
            conn.execute(
                "INSERT OR REPLACE INTO pronunciations (key, text, sample_rate, pcm, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![key, text, sample_rate, pcm, Utc::now().to_rfc3339()],
            )?;
            Ok(())
        })
    }
}

fn open_database(db_path: &Path) -> Result<Connection> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let conn = Connection::open(db_path)?;
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS images (
            key TEXT PRIMARY KEY,
            term TEXT NOT NULL,
            mime_type TEXT NOT NULL,
            data TEXT NOT NULL,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS pronunciations (
            key TEXT PRIMARY KEY,
            text TEXT NOT NULL,
            sample_rate INTEGER NOT NULL,
            pcm BLOB NOT NULL,
            created_at TEXT NOT NULL
        );
        "#,
    )?;
    log::debug!("Opened media cache at {}", db_path.display());
    Ok(conn)
}
