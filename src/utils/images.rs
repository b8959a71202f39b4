//! Writing generated images to disk.
//!
//! The provider hands back either raw bytes or a URL; the bytes variant is
//! written directly, the URL variant is fetched first. Either way the
//! result on disk is the same: a timestamped PNG in the configured
//! image directory.

use chrono::Local;
use std::error::Error as StdError;
use std::fs;
use std::path::{Path, PathBuf};

use crate::provider::ImageResult;

fn unique_image_path(dir: &Path) -> PathBuf {
    let stamp = Local::now().format("%Y%m%d-%H%M%S");
    let base = dir.join(format!("studiolo-image-{stamp}.png"));
    if !base.exists() {
        return base;
    }
    // Same-second collisions get a numeric suffix.
    for n in 1.. {
        let candidate = dir.join(format!("studiolo-image-{stamp}-{n}.png"));
        if !candidate.exists() {
            return candidate;
        }
    }
    unreachable!()
}

fn write_image(dir: &Path, bytes: &[u8]) -> Result<PathBuf, Box<dyn StdError>> {
    fs::create_dir_all(dir)?;
    let path = unique_image_path(dir);
    fs::write(&path, bytes)?;
    Ok(path)
}

/// Turn a provider image result into a file on disk and return its path.
pub async fn realize_image(
    client: &reqwest::Client,
    result: ImageResult,
    dir: &Path,
) -> Result<PathBuf, Box<dyn StdError>> {
    match result {
        ImageResult::Bytes(bytes) => write_image(dir, &bytes),
        ImageResult::Url(url) => {
            tracing::debug!(%url, "fetching generated image");
            let response = client.get(&url).send().await?.error_for_status()?;
            let bytes = response.bytes().await?;
            write_image(dir, &bytes)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn bytes_variant_writes_directly() {
        let dir = tempfile::tempdir().unwrap();
        let client = reqwest::Client::new();

        let path = realize_image(&client, ImageResult::Bytes(vec![0x89, 0x50]), dir.path())
            .await
            .unwrap();

        assert!(path.starts_with(dir.path()));
        assert_eq!(fs::read(&path).unwrap(), vec![0x89, 0x50]);
        assert!(path.file_name().unwrap().to_string_lossy().ends_with(".png"));
    }

    #[tokio::test]
    async fn collisions_get_numeric_suffixes() {
        let dir = tempfile::tempdir().unwrap();
        let client = reqwest::Client::new();

        let first = realize_image(&client, ImageResult::Bytes(vec![1]), dir.path())
            .await
            .unwrap();
        let second = realize_image(&client, ImageResult::Bytes(vec![2]), dir.path())
            .await
            .unwrap();

        assert_ne!(first, second);
        assert_eq!(fs::read(&second).unwrap(), vec![2]);
    }
}
