//! Image MIME sniffing and data URI encoding.
//!
//! The type is taken from the leading bytes of the payload, never from a
//! declared `Content-Type` header. Only JPEG and PNG are accepted.

use base64::{Engine, engine::general_purpose::STANDARD};
use image::ImageFormat;
use stellar_core::Error;

/// Image types the relay will encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageMime {
    Jpeg,
    Png,
}

impl ImageMime {
    pub fn as_str(self) -> &'static str {
        match self {
            ImageMime::Jpeg => "image/jpeg",
            ImageMime::Png => "image/png",
        }
    }

    /// File extension used when saving to a storage provider.
    pub fn extension(self) -> &'static str {
        match self {
            ImageMime::Jpeg => "jpeg",
            ImageMime::Png => "png",
        }
    }

    /// Scheme prefix of a data URI for this type.
    pub fn data_uri_prefix(self) -> &'static str {
        match self {
            ImageMime::Jpeg => "data:image/jpeg;base64,",
            ImageMime::Png => "data:image/png;base64,",
        }
    }

    /// Detect the image type from raw bytes.
    ///
    /// Returns `Error::UnsupportedMimeType` carrying the detected type when it
    /// is outside the allow-list.
    pub fn sniff(bytes: &[u8]) -> Result<Self, Error> {
        match image::guess_format(bytes) {
            Ok(ImageFormat::Jpeg) => Ok(ImageMime::Jpeg),
            Ok(ImageFormat::Png) => Ok(ImageMime::Png),
            Ok(other) => Err(Error::UnsupportedMimeType(other.to_mime_type().to_string())),
            Err(_) => Err(Error::UnsupportedMimeType(describe_unknown(bytes).to_string())),
        }
    }
}

/// Label for a payload that is not a known image format.
///
/// Only the first 512 bytes are inspected. HTML error pages and plain text
/// are named as such; anything else is `application/octet-stream`.
fn describe_unknown(bytes: &[u8]) -> &'static str {
    let head = &bytes[..bytes.len().min(512)];
    let lower = head.trim_ascii_start().to_ascii_lowercase();

    const HTML_TAGS: [&[u8]; 4] = [b"<!doctype html", b"<html", b"<head", b"<body"];
    if HTML_TAGS.iter().any(|tag| lower.starts_with(tag)) {
        return "text/html; charset=utf-8";
    }

    // A multi-byte character cut at the 512 byte mark is still text.
    let utf8 = match std::str::from_utf8(head) {
        Ok(_) => true,
        Err(e) => e.error_len().is_none(),
    };
    let binary = head.iter().any(|&b| b.is_ascii_control() && !matches!(b, b'\t' | b'\n' | b'\r' | 0x0C));

    if utf8 && !binary { "text/plain; charset=utf-8" } else { "application/octet-stream" }
}

/// A fetched image encoded as a data URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub mime: ImageMime,
    pub data_uri: String,
}

impl EncodedImage {
    /// Sniff `bytes` and encode them as `data:<mime>;base64,<payload>`.
    pub fn encode(bytes: &[u8]) -> Result<Self, Error> {
        let mime = ImageMime::sniff(bytes)?;
        let prefix = mime.data_uri_prefix();

        let mut data_uri = String::with_capacity(prefix.len() + bytes.len().div_ceil(3) * 4);
        data_uri.push_str(prefix);
        STANDARD.encode_string(bytes, &mut data_uri);

        Ok(Self { mime, data_uri })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const JPEG_BYTES: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00, 0x01];
    pub(crate) const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D];
    pub(crate) const GIF_BYTES: &[u8] = b"GIF89a\x01\x00\x01\x00\x00\x00\x00";

    #[test]
    fn test_sniff_jpeg() {
        assert_eq!(ImageMime::sniff(JPEG_BYTES).unwrap(), ImageMime::Jpeg);
    }

    #[test]
    fn test_sniff_png() {
        assert_eq!(ImageMime::sniff(PNG_BYTES).unwrap(), ImageMime::Png);
    }

    #[test]
    fn test_sniff_gif_rejected() {
        let result = ImageMime::sniff(GIF_BYTES);
        assert!(matches!(result, Err(Error::UnsupportedMimeType(mime)) if mime == "image/gif"));
    }

    #[test]
    fn test_sniff_html_names_type() {
        let result = ImageMime::sniff(b"\n  <!DOCTYPE html><html><body>nope</body></html>");
        assert!(matches!(result, Err(Error::UnsupportedMimeType(mime)) if mime == "text/html; charset=utf-8"));
    }

    #[test]
    fn test_sniff_plain_text_names_type() {
        let result = ImageMime::sniff(b"Rate Limit Exceeded");
        assert!(matches!(result, Err(Error::UnsupportedMimeType(mime)) if mime == "text/plain; charset=utf-8"));
    }

    #[test]
    fn test_sniff_binary_is_octet_stream() {
        let result = ImageMime::sniff(&[0x00, 0x01, 0x02, 0xFE, 0x10]);
        assert!(matches!(result, Err(Error::UnsupportedMimeType(mime)) if mime == "application/octet-stream"));
    }

    #[test]
    fn test_sniff_empty_rejected() {
        assert!(ImageMime::sniff(&[]).is_err());
    }

    #[test]
    fn test_encode_jpeg_prefix() {
        let encoded = EncodedImage::encode(JPEG_BYTES).unwrap();
        assert_eq!(encoded.mime, ImageMime::Jpeg);
        assert!(encoded.data_uri.starts_with("data:image/jpeg;base64,"));
        let payload = encoded.data_uri.trim_start_matches("data:image/jpeg;base64,");
        assert_eq!(STANDARD.decode(payload).unwrap(), JPEG_BYTES);
    }

    #[test]
    fn test_encode_png_prefix() {
        let encoded = EncodedImage::encode(PNG_BYTES).unwrap();
        assert!(encoded.data_uri.starts_with("data:image/png;base64,"));
    }

    #[test]
    fn test_extension() {
        assert_eq!(ImageMime::Jpeg.extension(), "jpeg");
        assert_eq!(ImageMime::Png.as_str(), "image/png");
    }
}
