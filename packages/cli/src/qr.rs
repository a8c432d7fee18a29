// ABOUTME: Exports the QR codes the backend attaches to a cycle
// ABOUTME: Decodes base64 data URLs and writes them as image files

use anyhow::{bail, Context, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use std::path::{Path, PathBuf};
use tracing::debug;

use regressivos_core::{QrKind, ReleaseTestCycle};

/// A decoded `data:image/<ext>;base64,` payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrImage {
    pub extension: String,
    pub bytes: Vec<u8>,
}

/// Decodes a base64 image data URL. Anything else is rejected.
pub fn decode_data_url(raw: &str) -> Result<QrImage> {
    let Some(rest) = raw.trim().strip_prefix("data:image/") else {
        bail!("Not an image data URL");
    };
    let Some((mime, payload)) = rest.split_once(',') else {
        bail!("Data URL has no payload");
    };
    let Some(extension) = mime.strip_suffix(";base64") else {
        bail!("Data URL is not base64 encoded");
    };
    if extension.is_empty() || !extension.chars().all(|c| c.is_ascii_alphanumeric()) {
        bail!("Unsupported image type '{}'", extension);
    }

    let bytes = BASE64
        .decode(payload.trim())
        .context("Invalid base64 in QR code")?;

    Ok(QrImage {
        extension: extension.to_ascii_lowercase(),
        bytes,
    })
}

/// File name for a cycle's QR code, e.g. `a1b2-qr-homolog.png`.
pub fn qr_file_name(cycle_id: &str, kind: QrKind, extension: &str) -> String {
    let id: String = cycle_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    format!("{}-{}.{}", id, kind.file_stem(), extension)
}

/// Writes every QR code the cycle carries into `dir`, creating it when needed.
/// Returns the written paths; a cycle without QR codes writes nothing.
pub async fn save_qr_codes(cycle: &ReleaseTestCycle, dir: &Path) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();

    for kind in QrKind::ALL {
        let Some(raw) = cycle.qr_code(kind) else {
            debug!(cycle_id = %cycle.id, kind = kind.label(), "No QR code");
            continue;
        };
        let image = decode_data_url(raw)
            .with_context(|| format!("QR Code {} of cycle {}", kind.label(), cycle.id))?;

        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("Failed to create {}", dir.display()))?;
        let path = dir.join(qr_file_name(&cycle.id, kind, &image.extension));
        tokio::fs::write(&path, &image.bytes)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;

        debug!(path = %path.display(), bytes = image.bytes.len(), "Saved QR code");
        written.push(path);
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use tempfile::TempDir;

    const PNG_HEADER: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    fn png_data_url() -> String {
        format!("data:image/png;base64,{}", BASE64.encode(PNG_HEADER))
    }

    #[test]
    fn test_decode_png_data_url() {
        let image = decode_data_url(&png_data_url()).unwrap();
        assert_eq!(image.extension, "png");
        assert_eq!(image.bytes, PNG_HEADER);
    }

    #[rstest]
    #[case("iVBORw0KGgo=")]
    #[case("data:text/plain;base64,QUJD")]
    #[case("data:image/png,QUJD")]
    #[case("data:image/png;base64")]
    #[case("data:image/../x;base64,QUJD")]
    #[case("data:image/png;base64,***")]
    fn test_rejects_other_payloads(#[case] raw: &str) {
        assert!(decode_data_url(raw).is_err());
    }

    #[test]
    fn test_file_name_is_path_safe() {
        assert_eq!(
            qr_file_name("a1/b2", QrKind::Alpha, "png"),
            "a1_b2-qr-alpha.png"
        );
    }

    #[tokio::test]
    async fn test_save_writes_present_codes_only() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("qr");
        let cycle = ReleaseTestCycle {
            id: "a1b2".to_string(),
            qr_code_staging: png_data_url(),
            ..Default::default()
        };

        let written = save_qr_codes(&cycle, &out).await.unwrap();

        assert_eq!(written, vec![out.join("a1b2-qr-homolog.png")]);
        assert_eq!(tokio::fs::read(&written[0]).await.unwrap(), PNG_HEADER);
        assert!(!out.join("a1b2-qr-alpha.png").exists());
    }

    #[tokio::test]
    async fn test_save_without_codes_leaves_dir_alone() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("qr");

        let written = save_qr_codes(&ReleaseTestCycle::default(), &out).await.unwrap();

        assert!(written.is_empty());
        assert!(!out.exists());
    }

    #[tokio::test]
    async fn test_save_reports_broken_code() {
        let dir = TempDir::new().unwrap();
        let cycle = ReleaseTestCycle {
            id: "a1b2".to_string(),
            qr_code_alpha: "not a data url".to_string(),
            ..Default::default()
        };

        let err = save_qr_codes(&cycle, dir.path()).await.unwrap_err();
        assert!(format!("{:#}", err).contains("QR Code Alpha"));
    }
}
