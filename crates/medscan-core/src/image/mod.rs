//! Uploaded images: accepted types, upload validation and data URIs.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

use crate::error::{MedscanError, Result};

/// Raster formats the remote model accepts.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
pub enum ImageMimeType {
    #[strum(serialize = "image/jpeg")]
    #[serde(rename = "image/jpeg")]
    Jpeg,
    #[strum(serialize = "image/png")]
    #[serde(rename = "image/png")]
    Png,
    #[strum(serialize = "image/webp")]
    #[serde(rename = "image/webp")]
    Webp,
    #[strum(serialize = "image/gif")]
    #[serde(rename = "image/gif")]
    Gif,
}

impl ImageMimeType {
    /// Parses a declared MIME type, ignoring case and parameters.
    ///
    /// Returns `None` for anything outside the accepted set.
    pub fn parse(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or_default().trim();
        Self::iter().find(|candidate| candidate.as_str().eq_ignore_ascii_case(essence))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Webp => "image/webp",
            Self::Gif => "image/gif",
        }
    }

    /// Comma separated list of every accepted type, for messages.
    pub fn accepted_list() -> String {
        Self::iter()
            .map(|mime| mime.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Where the bytes of an upload come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSource {
    /// A file on disk, read lazily when the submission starts loading.
    Path(PathBuf),
    /// Bytes already held in memory.
    Bytes(Vec<u8>),
}

/// A file offered by the user for classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub name: String,
    /// Declared (or guessed) MIME type; `None` when unknown.
    pub mime_type: Option<String>,
    pub source: FileSource,
}

impl UploadedFile {
    pub fn from_bytes(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            name: name.into(),
            mime_type: Some(mime_type.into()),
            source: FileSource::Bytes(bytes),
        }
    }

    pub fn from_path(path: impl Into<PathBuf>, mime_type: Option<String>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self {
            name,
            mime_type,
            source: FileSource::Path(path),
        }
    }

    /// The accepted image type of this file, if any.
    pub fn image_type(&self) -> Option<ImageMimeType> {
        self.mime_type.as_deref().and_then(ImageMimeType::parse)
    }

    /// Decodes the upload into bytes.
    ///
    /// Fails with `FileRead` when the file cannot be read or is empty.
    pub async fn read_bytes(&self) -> Result<Vec<u8>> {
        let bytes = match &self.source {
            FileSource::Bytes(bytes) => bytes.clone(),
            FileSource::Path(path) => tokio::fs::read(path).await.map_err(|e| {
                MedscanError::file_read(format!("{}: {}", path.display(), e))
            })?,
        };

        if bytes.is_empty() {
            return Err(MedscanError::file_read(format!("{} is empty", self.name)));
        }
        Ok(bytes)
    }
}

/// Picks the file to classify from the offered set.
///
/// Only the first file is used, but every offered file must be an accepted
/// image type; an empty set is a validation failure as well.
pub fn select_upload(files: Vec<UploadedFile>) -> Result<(UploadedFile, ImageMimeType)> {
    if let Some(rejected) = files.iter().find(|file| file.image_type().is_none()) {
        return Err(MedscanError::validation(format!(
            "{} has unsupported type {} (accepted: {})",
            rejected.name,
            rejected.mime_type.as_deref().unwrap_or("unknown"),
            ImageMimeType::accepted_list()
        )));
    }

    let file = files
        .into_iter()
        .next()
        .ok_or_else(|| MedscanError::validation("no file was provided"))?;
    let mime_type = file
        .image_type()
        .ok_or_else(|| MedscanError::internal("validated upload lost its type"))?;
    Ok((file, mime_type))
}

/// An encoded image stored with a history record, as a `data:` URI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageData(String);

impl ImageData {
    pub fn encode(bytes: &[u8], mime_type: ImageMimeType) -> Self {
        Self(format!(
            "data:{};base64,{}",
            mime_type.as_str(),
            BASE64_STANDARD.encode(bytes)
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The declared MIME type of the URI, if it is an accepted image type.
    pub fn mime_type(&self) -> Option<ImageMimeType> {
        let header = self.0.strip_prefix("data:")?.split(',').next()?;
        ImageMimeType::parse(header.trim_end_matches(";base64"))
    }

    /// Recovers the raw image bytes.
    pub fn decode(&self) -> Result<Vec<u8>> {
        let (header, payload) = self
            .0
            .split_once(',')
            .ok_or_else(|| MedscanError::validation("image data is not a data URI"))?;
        if !header.starts_with("data:") || !header.ends_with(";base64") {
            return Err(MedscanError::validation(
                "image data is not a base64 data URI",
            ));
        }
        BASE64_STANDARD
            .decode(payload)
            .map_err(|e| MedscanError::validation(format!("invalid base64 image data: {e}")))
    }
}
