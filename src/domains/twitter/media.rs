// Media uploads - unique storage keys, Media rows and blob writes

use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::infrastructure::blob_store::BlobStore;
use crate::infrastructure::database::Database;

/// Storage keys (and therefore media urls) all live under this prefix.
pub const MEDIA_PREFIX: &str = "media";

/// Largest accepted upload body.
pub const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

static UNSAFE_FILENAME_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9_.-]").expect("filename pattern is valid"));

/// Reduce a client supplied filename to a flat, portable name.
///
/// Path separators become word breaks, whitespace runs collapse into `_`,
/// anything outside `[A-Za-z0-9_.-]` is dropped and leading or trailing dots
/// and underscores are trimmed. The result may be empty.
pub fn sanitize_filename(filename: &str) -> String {
    let ascii: String = filename
        .chars()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();
    let joined = ascii.split_whitespace().collect::<Vec<_>>().join("_");
    let cleaned = UNSAFE_FILENAME_CHARS.replace_all(&joined, "");
    cleaned.trim_matches(|c: char| c == '.' || c == '_').to_string()
}

/// `media/<uuid><sanitized filename>`, the uuid written hyphenated and
/// directly followed by the name.
pub fn storage_key_for(filename: &str) -> String {
    format!("{}/{}{}", MEDIA_PREFIX, Uuid::new_v4(), sanitize_filename(filename))
}

/// Store an uploaded file and register it as an unattached Media row.
///
/// Without a filename nothing is stored and `None` is returned.
pub async fn upload_media(
    db: &Database,
    blobs: &dyn BlobStore,
    filename: Option<&str>,
    bytes: &[u8],
) -> AppResult<Option<i64>> {
    let Some(filename) = filename.filter(|name| !name.is_empty()) else {
        debug!("Upload without filename ignored");
        return Ok(None);
    };

    let key = storage_key_for(filename);

    let mut tx = db.begin_write().await?;
    let media_id = sqlx::query("INSERT INTO media (created_at, url) VALUES (?, ?)")
        .bind(Utc::now())
        .bind(&key)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::conflict_on_unique(e, "Media with this url already exists"))?
        .last_insert_rowid();

    blobs.put(&key, bytes).await?;

    if let Err(e) = tx.commit().await {
        if let Err(cleanup) = blobs.delete(&key).await {
            warn!("Failed to remove orphaned blob {}: {}", key, cleanup);
        }
        return Err(e.into());
    }

    info!("Stored media {} at {} ({} bytes)", media_id, key, bytes.len());
    Ok(Some(media_id))
}
