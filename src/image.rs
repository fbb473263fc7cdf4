use crate::error::{Result, SnapError};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use log::debug;
use std::path::Path;

/// Represents where an ingredient photo comes from
#[derive(Debug, Clone)]
pub enum ImageSource {
    /// Image from a file path
    Path(String),
    /// Image as a `data:<mime>;base64,<payload>` URI, as a browser upload produces
    DataUri(String),
}

impl ImageSource {
    /// Load the source into memory
    pub async fn load(&self) -> Result<ImageInput> {
        match self {
            ImageSource::Path(path) => ImageInput::from_path(Path::new(path)).await,
            ImageSource::DataUri(uri) => ImageInput::from_data_uri(uri),
        }
    }
}

/// Base64-encoded image ready to be attached to a generation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInput {
    pub mime_type: String,
    pub data: String,
}

impl ImageInput {
    pub fn from_bytes(bytes: &[u8], mime_type: impl Into<String>) -> Self {
        ImageInput {
            mime_type: mime_type.into(),
            data: STANDARD.encode(bytes),
        }
    }

    /// Reads an image file; the MIME type is guessed from the extension
    pub async fn from_path(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| SnapError::ImageError(format!("{}: {}", path.display(), e)))?;

        if bytes.is_empty() {
            return Err(SnapError::ImageError(format!(
                "{} is empty",
                path.display()
            )));
        }

        let mime_type = mime_type_for(path);
        debug!(
            "Loaded {} ({} bytes, {})",
            path.display(),
            bytes.len(),
            mime_type
        );
        Ok(Self::from_bytes(&bytes, mime_type))
    }

    /// Parses "data:image/jpeg;base64,/9j/4AAQ..."
    pub fn from_data_uri(uri: &str) -> Result<Self> {
        let rest = uri
            .strip_prefix("data:")
            .ok_or_else(|| SnapError::ImageError("not a data URI".to_string()))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| SnapError::ImageError("data URI has no payload".to_string()))?;
        let mime_type = header
            .strip_suffix(";base64")
            .ok_or_else(|| SnapError::ImageError("data URI is not base64 encoded".to_string()))?;

        if payload.is_empty() {
            return Err(SnapError::ImageError("data URI payload is empty".to_string()));
        }
        STANDARD
            .decode(payload)
            .map_err(|e| SnapError::ImageError(format!("invalid base64 payload: {}", e)))?;

        Ok(ImageInput {
            mime_type: if mime_type.is_empty() {
                "image/jpeg".to_string()
            } else {
                mime_type.to_string()
            },
            data: payload.to_string(),
        })
    }

    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

fn mime_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match extension.as_deref() {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("heic") => "image/heic",
        _ => "image/jpeg",
    }
}
