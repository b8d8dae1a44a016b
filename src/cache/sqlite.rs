use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, params};
use std::path::PathBuf;

use crate::paths;
use crate::translation::CompletionRequest;

/// Persistent store of successful model replies.
pub struct CacheManager {
    db_path: PathBuf,
}

impl CacheManager {
    pub fn new() -> Result<Self> {
        let cache_dir = paths::cache_dir()?;

        std::fs::create_dir_all(&cache_dir).with_context(|| {
            format!("Failed to create cache directory: {}", cache_dir.display())
        })?;

        Self::open(cache_dir.join("completions.db"))
    }

    /// Opens (and initializes) a cache database at an explicit path.
    pub fn open(db_path: PathBuf) -> Result<Self> {
        let manager = Self { db_path };
        manager.init_db()?;
        Ok(manager)
    }

    fn init_db(&self) -> Result<()> {
        let conn = self.connect()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS completions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                cache_key TEXT UNIQUE NOT NULL,
                stage TEXT NOT NULL,
                model TEXT NOT NULL,
                base_url TEXT NOT NULL,
                prompt TEXT NOT NULL,
                response TEXT NOT NULL,
                prompt_hash TEXT NOT NULL,
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
                accessed_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            )",
            [],
        )
        .context("Failed to create completions table")?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_cache_key ON completions(cache_key)",
            [],
        )
        .context("Failed to create index")?;

        Ok(())
    }

    fn connect(&self) -> Result<Connection> {
        Connection::open(&self.db_path)
            .with_context(|| format!("Failed to open cache database: {}", self.db_path.display()))
    }

    pub fn get(&self, request: &CompletionRequest) -> Result<Option<String>> {
        let cache_key = request.cache_key();
        let conn = self.connect()?;

        let result: Option<String> = conn
            .query_row(
                "SELECT response FROM completions WHERE cache_key = ?1",
                [&cache_key],
                |row| row.get(0),
            )
            .optional()
            .context("Failed to query cache")?;

        if result.is_some() {
            conn.execute(
                "UPDATE completions SET accessed_at = CURRENT_TIMESTAMP WHERE cache_key = ?1",
                [&cache_key],
            )?;
        }

        Ok(result)
    }

    pub fn put(&self, request: &CompletionRequest, response: &str) -> Result<()> {
        let conn = self.connect()?;

        conn.execute(
            "INSERT OR REPLACE INTO completions
             (cache_key, stage, model, base_url, prompt, response, prompt_hash)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                request.cache_key(),
                request.stage.as_str(),
                request.model,
                request.base_url,
                request.prompt,
                response,
                CompletionRequest::prompt_hash(request.stage),
            ],
        )
        .context("Failed to insert completion into cache")?;

        Ok(())
    }

    /// Removes every cached entry, returning how many were deleted.
    pub fn clear(&self) -> Result<usize> {
        let conn = self.connect()?;
        conn.execute("DELETE FROM completions", [])
            .context("Failed to clear cache")
    }
}
