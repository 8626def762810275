use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use fetcher_core::MediaPayload;
use tempfile::NamedTempFile;
use thiserror::Error;

/// Base name of every saved download.
const SAVE_STEM: &str = "video";
const MAX_NAME_SUFFIX: u32 = 999;

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("output directory missing or not writable: {0}")]
    OutputDir(String),
    #[error("no free file name for {0} in the output directory")]
    NameExhausted(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Ensure output directory exists; create if missing.
pub fn ensure_output_dir(dir: &Path) -> Result<(), SaveError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| SaveError::OutputDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(SaveError::OutputDir("path is not a directory".into()));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| SaveError::OutputDir(e.to_string()))?;
    }
    Ok(())
}

/// File extension for a media type; unknown types get the default container.
pub fn extension_for(content_type: &str) -> &'static str {
    match content_type {
        "video/webm" => "webm",
        "video/x-matroska" => "mkv",
        "video/quicktime" => "mov",
        "video/x-flv" => "flv",
        "video/3gpp" => "3gp",
        "audio/mp4" | "audio/x-m4a" => "m4a",
        "audio/mpeg" => "mp3",
        "audio/webm" => "weba",
        "audio/ogg" => "ogg",
        _ => "mp4",
    }
}

pub fn file_name_for(content_type: &str) -> String {
    format!("{SAVE_STEM}.{}", extension_for(content_type))
}

/// Saves received media under a fixed name in the output directory.
///
/// The bytes go to a temporary file first; it is removed on every error path
/// and only renamed into place once fully written. Existing downloads are
/// never overwritten: `video.mp4` becomes `video (1).mp4` and so on.
pub struct DownloadTrigger {
    dir: PathBuf,
}

impl DownloadTrigger {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn trigger(&self, payload: &MediaPayload) -> Result<PathBuf, SaveError> {
        ensure_output_dir(&self.dir)?;

        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(&payload.bytes)?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;

        let extension = extension_for(&payload.content_type);
        for suffix in 0..=MAX_NAME_SUFFIX {
            let target = self.dir.join(numbered_name(extension, suffix));
            match tmp.persist_noclobber(&target) {
                Ok(_) => return Ok(target),
                Err(err) if err.error.kind() == io::ErrorKind::AlreadyExists => tmp = err.file,
                Err(err) => return Err(SaveError::Io(err.error)),
            }
        }
        Err(SaveError::NameExhausted(file_name_for(&payload.content_type)))
    }
}

fn numbered_name(extension: &str, suffix: u32) -> String {
    if suffix == 0 {
        format!("{SAVE_STEM}.{extension}")
    } else {
        format!("{SAVE_STEM} ({suffix}).{extension}")
    }
}
