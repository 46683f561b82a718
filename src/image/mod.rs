//! Base64 data-URI handling for report photos.

use anyhow::{Context, Result, bail};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::path::Path;

/// Moderation endpoints cap the inline payload; larger images are truncated
/// to this many base64 characters before being sent for classification.
pub const MODERATION_PAYLOAD_CAP: usize = 50_000;

/// Guess a mime type from the file extension. Defaults to JPEG, which is
/// what the mobile client always produced.
fn mime_for_extension(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "image/jpeg",
    }
}

/// Read an image file and encode it as a `data:<mime>;base64,...` URI, the
/// format the backend stores for both report and solution images.
pub fn encode_data_uri(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read image file: {}", path.display()))?;
    if bytes.is_empty() {
        bail!("Image file is empty: {}", path.display());
    }

    let mime = mime_for_extension(path);
    let payload = STANDARD.encode(&bytes);
    Ok(format!("data:{};base64,{}", mime, payload))
}

/// Extract the bare base64 payload from a data URI, or pass a bare payload
/// through unchanged. The moderation API takes the payload without the
/// `data:` prefix.
pub fn base64_payload(data_uri: &str) -> &str {
    match data_uri.split_once(";base64,") {
        Some((_, payload)) => payload,
        None => data_uri,
    }
}

/// Truncate a base64 payload to the moderation size cap.
pub fn truncate_for_moderation(payload: &str) -> &str {
    if payload.len() > MODERATION_PAYLOAD_CAP {
        &payload[..MODERATION_PAYLOAD_CAP]
    } else {
        payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_encode_jpeg_file() {
        let mut file = tempfile::Builder::new()
            .suffix(".jpg")
            .tempfile()
            .unwrap();
        file.write_all(&[0xFF, 0xD8, 0xFF, 0xE0]).unwrap();

        let uri = encode_data_uri(file.path()).unwrap();
        assert!(uri.starts_with("data:image/jpeg;base64,"));
        assert_eq!(base64_payload(&uri), "/9j/4A==");
    }

    #[test]
    fn test_png_extension_sets_mime() {
        let mut file = tempfile::Builder::new()
            .suffix(".PNG")
            .tempfile()
            .unwrap();
        file.write_all(b"\x89PNG\r\n").unwrap();

        let uri = encode_data_uri(file.path()).unwrap();
        assert!(uri.starts_with("data:image/png;base64,"));
    }

    #[test]
    fn test_empty_file_rejected() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert!(encode_data_uri(file.path()).is_err());
    }

    #[test]
    fn test_payload_extraction_passthrough() {
        assert_eq!(base64_payload("data:image/jpeg;base64,QUJD"), "QUJD");
        assert_eq!(base64_payload("QUJD"), "QUJD");
    }

    #[test]
    fn test_truncation_cap() {
        let long = "A".repeat(MODERATION_PAYLOAD_CAP + 100);
        assert_eq!(truncate_for_moderation(&long).len(), MODERATION_PAYLOAD_CAP);

        let short = "QUJD";
        assert_eq!(truncate_for_moderation(short), short);
    }
}
