// SPDX-FileCopyrightText: 2026 Pressroom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Photo and document downloads.

use std::path::{Path, PathBuf};

use pressroom_core::PressroomError;
use teloxide::net::Download;
use teloxide::prelude::*;
use teloxide::types::{Document, FileMeta, PhotoSize};
use tracing::debug;

/// Document extensions the manual source can read.
const TEXT_EXTENSIONS: [&str; 2] = ["txt", "md"];

fn channel_err(message: String) -> impl FnOnce(teloxide::RequestError) -> PressroomError {
    move |e| PressroomError::Channel {
        message: format!("{message}: {e}"),
        source: Some(Box::new(e)),
    }
}

/// Download a file from Telegram servers into memory.
pub async fn download_file(bot: &Bot, file_meta: &FileMeta) -> Result<Vec<u8>, PressroomError> {
    let file = bot
        .get_file(file_meta.id.clone())
        .await
        .map_err(channel_err("failed to get file info".into()))?;

    let mut buf = Vec::new();
    bot.download_file(&file.path, &mut buf)
        .await
        .map_err(|e| PressroomError::Channel {
            message: format!("failed to download file: {e}"),
            source: Some(Box::new(e)),
        })?;

    debug!(file_id = %file_meta.id, size = buf.len(), "downloaded file from Telegram");
    Ok(buf)
}

/// Bytes of the largest variant of a photo. Telegram lists sizes ascending.
pub async fn download_photo(bot: &Bot, photos: &[PhotoSize]) -> Result<Vec<u8>, PressroomError> {
    let largest = photos.last().ok_or_else(|| PressroomError::Channel {
        message: "photo array is empty".into(),
        source: None,
    })?;
    download_file(bot, &largest.file).await
}

/// Whether a document is plain text the manual source can ingest.
pub fn is_text_document(file_name: Option<&str>, mime_type: Option<&str>) -> bool {
    let by_extension = file_name
        .and_then(|n| Path::new(n).extension())
        .and_then(|e| e.to_str())
        .is_some_and(|e| TEXT_EXTENSIONS.iter().any(|t| e.eq_ignore_ascii_case(t)));
    by_extension || mime_type.is_some_and(|m| m == "text/plain" || m == "text/markdown")
}

/// Local file name for a received document: the message id plus the
/// sender's base name, so repeated uploads never overwrite each other.
pub fn local_file_name(message_id: i32, file_name: Option<&str>) -> String {
    let base = file_name
        .and_then(|n| Path::new(n).file_name())
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .unwrap_or("document.txt");
    let base = if Path::new(base).extension().is_some() {
        base.to_string()
    } else {
        format!("{base}.txt")
    };
    format!("{message_id}-{base}")
}

/// Save a text document under `dir` and return its path.
pub async fn save_document(
    bot: &Bot,
    doc: &Document,
    message_id: i32,
    dir: &Path,
) -> Result<PathBuf, PressroomError> {
    let data = download_file(bot, &doc.file).await?;
    let io_err = |e: std::io::Error| PressroomError::Channel {
        message: format!("failed to store document in {}: {e}", dir.display()),
        source: Some(Box::new(e)),
    };
    tokio::fs::create_dir_all(dir).await.map_err(io_err)?;
    let path = dir.join(local_file_name(message_id, doc.file_name.as_deref()));
    tokio::fs::write(&path, data).await.map_err(io_err)?;
    debug!(path = %path.display(), "document saved");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_documents_by_extension_or_mime() {
        assert!(is_text_document(Some("notes.txt"), None));
        assert!(is_text_document(Some("README.MD"), None));
        assert!(is_text_document(Some("blob"), Some("text/plain")));
        assert!(!is_text_document(Some("paper.pdf"), Some("application/pdf")));
        assert!(!is_text_document(None, None));
    }

    #[test]
    fn local_names_are_unique_and_stripped_of_directories() {
        assert_eq!(local_file_name(7, Some("notes.md")), "7-notes.md");
        assert_eq!(local_file_name(8, Some("../../etc/passwd")), "8-passwd.txt");
        assert_eq!(local_file_name(9, None), "9-document.txt");
    }
}
