//! `multipart/related` body construction for Google Drive uploads.

use chrono::Utc;
use sha2::{Digest, Sha256};

/// One part of a related body.
#[derive(Debug, Clone)]
struct Part {
    content_type: String,
    body: Vec<u8>,
}

/// Builder for a `multipart/related` request body.
#[derive(Debug, Clone)]
pub struct RelatedBody {
    boundary: String,
    parts: Vec<Part>,
}

impl RelatedBody {
    /// Start a body with a boundary derived from `seed` and the current time.
    pub fn new(seed: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(seed.as_bytes());
        hasher.update(Utc::now().timestamp_nanos_opt().unwrap_or_default().to_le_bytes());
        Self::with_boundary(hex::encode(&hasher.finalize()[..16]))
    }

    pub fn with_boundary(boundary: impl Into<String>) -> Self {
        Self { boundary: boundary.into(), parts: Vec::new() }
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Append a part with the given `Content-Type`.
    pub fn part(mut self, content_type: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        self.parts.push(Part { content_type: content_type.into(), body: body.into() });
        self
    }

    /// Value for the request's `Content-Type` header.
    pub fn content_type(&self) -> String {
        format!("multipart/related; boundary={}", self.boundary)
    }

    /// Serialize all parts followed by the closing delimiter.
    pub fn into_bytes(self) -> Vec<u8> {
        let size = self.parts.iter().map(|p| p.body.len() + p.content_type.len() + 64).sum::<usize>();
        let mut out = Vec::with_capacity(size + self.boundary.len() * (self.parts.len() + 1));

        for part in &self.parts {
            out.extend_from_slice(format!("--{}\r\n", self.boundary).as_bytes());
            out.extend_from_slice(format!("Content-Type: {}\r\n\r\n", part.content_type).as_bytes());
            out.extend_from_slice(&part.body);
            out.extend_from_slice(b"\r\n");
        }
        out.extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());

        out
    }
}
