//! Request payload for the verification service.

use std::path::Path;

/// Media type used when a document's type cannot be inferred.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// The identity document as uploaded by the user.
///
/// Stored as-is; the service decides whether the document is usable.
#[derive(Clone, PartialEq, Eq)]
pub struct DocumentArtifact {
    bytes: Vec<u8>,
    media_type: String,
    file_name: String,
}

impl DocumentArtifact {
    /// Wraps document bytes with their media type and file name.
    pub fn new(bytes: Vec<u8>, media_type: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            bytes,
            media_type: media_type.into(),
            file_name: file_name.into(),
        }
    }

    /// Reads a document from disk, inferring the media type from its extension.
    pub fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());
        let media_type = media_type_for(path);
        Ok(Self::new(bytes, media_type, file_name))
    }

    /// Raw document bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// MIME type sent with the document.
    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    /// File name sent with the document.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }
}

impl std::fmt::Debug for DocumentArtifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentArtifact")
            .field("file_name", &self.file_name)
            .field("media_type", &self.media_type)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

/// Media type for the document extensions the upload form accepts.
pub fn media_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase());
    match ext.as_deref() {
        Some("pdf") => "application/pdf",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        _ => OCTET_STREAM,
    }
}

/// One document paired with one JPEG selfie, ready to send.
#[derive(Clone, PartialEq, Eq)]
pub struct SubmissionPayload {
    document: DocumentArtifact,
    selfie_jpeg: Vec<u8>,
}

impl SubmissionPayload {
    /// File name the selfie part is sent under.
    pub const SELFIE_FILE_NAME: &'static str = "selfie.jpg";

    /// Pairs a document with an encoded selfie.
    pub fn new(document: DocumentArtifact, selfie_jpeg: Vec<u8>) -> Self {
        Self {
            document,
            selfie_jpeg,
        }
    }

    /// The identity document.
    pub fn document(&self) -> &DocumentArtifact {
        &self.document
    }

    /// The selfie as JPEG bytes.
    pub fn selfie_jpeg(&self) -> &[u8] {
        &self.selfie_jpeg
    }
}

impl std::fmt::Debug for SubmissionPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubmissionPayload")
            .field("document", &self.document)
            .field("selfie_bytes", &self.selfie_jpeg.len())
            .finish()
    }
}
