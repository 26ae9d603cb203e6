//! Asset uploads: validate, hand the bytes to an object store, probe
//! dimensions and build the library record.
//!
//! The object store itself sits behind [`AssetUploader`]. A failed upload
//! never produces an asset; a failed dimension probe only leaves
//! `width`/`height` empty.

use chrono::Utc;
use image::{ImageError, ImageReader};
use sitedraft_editor::{Asset, AssetKind};
use std::future::Future;
use std::io::Cursor;
use thiserror::Error;
use uuid::Uuid;

pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;
pub const MAX_VIDEO_BYTES: usize = 100 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadRequest {
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }
}

/// Where the object store put the file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedObject {
    pub url: String,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    #[error("File is empty")]
    Empty,

    #[error("Content type {content_type:?} cannot be used as {kind:?}")]
    UnsupportedType { content_type: String, kind: AssetKind },

    #[error("File is {size} bytes, the limit is {limit}")]
    TooLarge { size: usize, limit: usize },

    #[error("Upload rejected: {0}")]
    Rejected(String),

    #[error("Upload failed: {0}")]
    Transport(String),
}

pub trait AssetUploader {
    fn upload(
        &self,
        request: &UploadRequest,
    ) -> impl Future<Output = Result<UploadedObject, UploadError>> + Send;
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    #[error("Unrecognized image format")]
    UnknownFormat,

    #[error("Image could not be read: {0}")]
    Unreadable(String),
}

/// Reads pixel dimensions out of encoded image bytes
pub trait DimensionProbe {
    fn probe(&self, bytes: &[u8]) -> Result<(u32, u32), ProbeError>;
}

/// Reads dimensions from the image header of any format `image` can decode
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderProbe;

impl DimensionProbe for HeaderProbe {
    fn probe(&self, bytes: &[u8]) -> Result<(u32, u32), ProbeError> {
        let reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| ProbeError::Unreadable(e.to_string()))?;

        reader.into_dimensions().map_err(|e| match e {
            ImageError::Unsupported(_) => ProbeError::UnknownFormat,
            other => ProbeError::Unreadable(other.to_string()),
        })
    }
}

pub fn validate(request: &UploadRequest, kind: AssetKind) -> Result<(), UploadError> {
    if request.bytes.is_empty() {
        return Err(UploadError::Empty);
    }

    let (prefix, limit) = match kind {
        AssetKind::Image | AssetKind::Logo => ("image/", MAX_IMAGE_BYTES),
        AssetKind::Video => ("video/", MAX_VIDEO_BYTES),
    };

    if !request.content_type.starts_with(prefix) {
        return Err(UploadError::UnsupportedType {
            content_type: request.content_type.clone(),
            kind,
        });
    }

    if request.bytes.len() > limit {
        return Err(UploadError::TooLarge {
            size: request.bytes.len(),
            limit,
        });
    }

    Ok(())
}

pub fn next_asset_id() -> String {
    format!("asset-{}", Uuid::new_v4())
}

pub async fn upload_asset<U, P>(
    uploader: &U,
    probe: &P,
    request: &UploadRequest,
    kind: AssetKind,
) -> Result<Asset, UploadError>
where
    U: AssetUploader,
    P: DimensionProbe,
{
    validate(request, kind)?;

    let uploaded = uploader.upload(request).await?;

    let (width, height) = match kind {
        AssetKind::Video => (None, None),
        AssetKind::Image | AssetKind::Logo => match probe.probe(&request.bytes) {
            Ok((width, height)) => (Some(width), Some(height)),
            Err(err) => {
                tracing::warn!(file = %request.file_name, %err, "could not read image dimensions");
                (None, None)
            }
        },
    };

    let asset = Asset {
        id: next_asset_id(),
        url: uploaded.url,
        name: request.file_name.clone(),
        kind,
        uploaded_at: Utc::now(),
        size: Some(request.bytes.len() as u64),
        width,
        height,
    };

    tracing::debug!(id = %asset.id, url = %asset.url, "asset uploaded");
    Ok(asset)
}
