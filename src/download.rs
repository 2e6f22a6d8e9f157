//! Export of completed images to disk.

use crate::models::GeneratedImage;
use crate::Result;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

/// File name for an image generated at `at`.
pub fn download_file_name(at: DateTime<Utc>) -> String {
    format!("design-{}.png", at.timestamp_millis())
}

pub async fn export_image(image: &GeneratedImage, dir: &Path) -> Result<PathBuf> {
    export_image_at(image, dir, Utc::now()).await
}

/// Write the decoded image into `dir`, never overwriting an earlier export.
pub async fn export_image_at(
    image: &GeneratedImage,
    dir: &Path,
    at: DateTime<Utc>,
) -> Result<PathBuf> {
    let bytes = image.decode()?;
    tokio::fs::create_dir_all(dir).await?;

    let file_name = download_file_name(at);
    let mut path = dir.join(&file_name);
    let mut suffix = 1;
    while tokio::fs::try_exists(&path).await? {
        path = dir.join(format!("design-{}-{}.png", at.timestamp_millis(), suffix));
        suffix += 1;
    }

    tokio::fs::write(&path, &bytes).await?;
    tracing::info!("Saved image ({} bytes) to {}", bytes.len(), path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::encode_bytes;
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn fixed_time() -> DateTime<Utc> {
        Utc.timestamp_millis_opt(1_700_000_000_123).unwrap()
    }

    #[test]
    fn test_file_name_uses_timestamp() {
        assert_eq!(download_file_name(fixed_time()), "design-1700000000123.png");
    }

    #[tokio::test]
    async fn test_export_writes_decoded_bytes() {
        let dir = tempdir().unwrap();
        let image = GeneratedImage::from_base64(&encode_bytes(b"pixels"), "image/png");

        let path = export_image_at(&image, &dir.path().join("out"), fixed_time())
            .await
            .unwrap();

        assert_eq!(path.file_name().unwrap(), "design-1700000000123.png");
        assert_eq!(std::fs::read(&path).unwrap(), b"pixels");
    }

    #[tokio::test]
    async fn test_export_does_not_overwrite() {
        let dir = tempdir().unwrap();
        let image = GeneratedImage::from_base64(&encode_bytes(b"one"), "image/png");

        let first = export_image_at(&image, dir.path(), fixed_time())
            .await
            .unwrap();
        let second = export_image_at(&image, dir.path(), fixed_time())
            .await
            .unwrap();

        assert_ne!(first, second);
        assert_eq!(
            second.file_name().unwrap(),
            "design-1700000000123-1.png"
        );
    }

    #[test]
    fn test_export_rejects_corrupt_payload() {
        let dir = tempdir().unwrap();
        let image = GeneratedImage::from_base64("%%%", "image/png");

        let result = tokio_test::block_on(export_image_at(&image, dir.path(), fixed_time()));
        assert!(matches!(result, Err(crate::Error::Base64(_))));
        assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
    }
}
