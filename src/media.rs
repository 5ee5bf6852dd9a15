//! Image-type sniffing from leading magic bytes.
//!
//! Sniffing stops at the signature; decoding and metadata extraction are
//! someone else's job.

use std::path::Path;

use crate::fsys::{self, FsError};

/// Image formats recognized by the sniffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Png,
    Jpeg,
    Gif,
    Webp,
    Bmp,
    Tiff,
}

impl ImageKind {
    pub fn mime_type(self) -> &'static str {
        match self {
            ImageKind::Png => "image/png",
            ImageKind::Jpeg => "image/jpeg",
            ImageKind::Gif => "image/gif",
            ImageKind::Webp => "image/webp",
            ImageKind::Bmp => "image/bmp",
            ImageKind::Tiff => "image/tiff",
        }
    }
}

const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
const JPEG_MAGIC: [u8; 3] = [0xFF, 0xD8, 0xFF];
const TIFF_LE_MAGIC: [u8; 4] = [0x49, 0x49, 0x2A, 0x00];
const TIFF_BE_MAGIC: [u8; 4] = [0x4D, 0x4D, 0x00, 0x2A];

/// Identifies an image format from the leading bytes of its encoding, or
/// `None` when no known signature matches.
pub fn sniff_image(bytes: &[u8]) -> Option<ImageKind> {
    if bytes.starts_with(&PNG_MAGIC) {
        return Some(ImageKind::Png);
    }
    if bytes.starts_with(&JPEG_MAGIC) {
        return Some(ImageKind::Jpeg);
    }
    if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        return Some(ImageKind::Gif);
    }
    // RIFF container with a WEBP form type.
    if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        return Some(ImageKind::Webp);
    }
    if bytes.starts_with(b"BM") {
        return Some(ImageKind::Bmp);
    }
    if bytes.starts_with(&TIFF_LE_MAGIC) || bytes.starts_with(&TIFF_BE_MAGIC) {
        return Some(ImageKind::Tiff);
    }
    None
}

/// Sniffs a file on disk, reading only the header bytes.
pub fn sniff_image_file(path: impl AsRef<Path>) -> Result<Option<ImageKind>, FsError> {
    let header = fsys::read_header(path.as_ref(), 16)?;
    Ok(sniff_image(&header))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sniff_known_signatures() {
        assert_eq!(
            sniff_image(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0]),
            Some(ImageKind::Png)
        );
        assert_eq!(sniff_image(&[0xFF, 0xD8, 0xFF, 0xE0]), Some(ImageKind::Jpeg));
        assert_eq!(sniff_image(b"GIF89a..."), Some(ImageKind::Gif));
        assert_eq!(
            sniff_image(b"RIFF\x10\x00\x00\x00WEBPVP8 "),
            Some(ImageKind::Webp)
        );
        assert_eq!(sniff_image(b"BM\x00\x00"), Some(ImageKind::Bmp));
        assert_eq!(sniff_image(&[0x49, 0x49, 0x2A, 0x00]), Some(ImageKind::Tiff));
        assert_eq!(sniff_image(&[0x4D, 0x4D, 0x00, 0x2A]), Some(ImageKind::Tiff));
    }

    #[test]
    fn test_sniff_rejects_unknown_and_short_input() {
        assert_eq!(sniff_image(b"plain text"), None);
        assert_eq!(sniff_image(&[]), None);
        assert_eq!(sniff_image(&[0x89]), None);
        // RIFF container that is not WEBP.
        assert_eq!(sniff_image(b"RIFF\x10\x00\x00\x00WAVEfmt "), None);
    }

    #[test]
    fn test_mime_types() {
        assert_eq!(ImageKind::Png.mime_type(), "image/png");
        assert_eq!(ImageKind::Jpeg.mime_type(), "image/jpeg");
    }

    #[test]
    fn test_sniff_image_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("img.png");
        let mut bytes = PNG_MAGIC.to_vec();
        bytes.extend_from_slice(&[0u8; 24]);
        std::fs::write(&path, &bytes).unwrap();

        assert_eq!(sniff_image_file(&path).unwrap(), Some(ImageKind::Png));
        assert!(sniff_image_file(dir.path().join("missing.png")).is_err());
    }
}
