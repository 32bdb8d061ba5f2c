use std::time::Duration;
use async_trait::async_trait;
use image::imageops::FilterType;
use image::{DynamicImage, RgbaImage};
use log::{debug, error};
use reqwest::Client;
use thiserror::Error;

/// Screen geometry of the 480x800 portrait display
pub const SCREEN_W: u32 = 480;
pub const SCREEN_H: u32 = 800;
/// Edge length of the album art in the detail view
pub const THUMB_W: u32 = 480;

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Failed to fetch image: {0}")]
    Fetch(String),

    #[error("Failed to decode image: {0}")]
    Decode(String),
}

/// Album art prepared for both views
#[derive(Debug, Clone)]
pub struct AlbumArt {
    /// Full-width square for the album view
    pub full: RgbaImage,
    /// Square shown above the text in the detail view
    pub thumb: RgbaImage,
}

impl AlbumArt {
    /// Resize a (square) image to the two display sizes
    pub fn from_image(image: &DynamicImage) -> Self {
        AlbumArt {
            full: image.resize_exact(SCREEN_W, SCREEN_W, FilterType::Lanczos3).to_rgba8(),
            thumb: image.resize_exact(THUMB_W, THUMB_W, FilterType::Lanczos3).to_rgba8(),
        }
    }
}

/// Decode an image held in memory
pub fn decode_image(data: &[u8]) -> Result<DynamicImage, ImageError> {
    image::load_from_memory(data).map_err(|e| ImageError::Decode(e.to_string()))
}

/// Loads images by URI
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, uri: &str) -> Result<DynamicImage, ImageError>;
}

/// Fetches `http(s)://` URIs with reqwest and reads everything else from disk
#[derive(Debug, Clone)]
pub struct HttpImageFetcher {
    client: Client,
}

impl HttpImageFetcher {
    pub fn new(timeout_secs: u64) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_else(|_| Client::new());
        HttpImageFetcher { client }
    }

    async fn download(&self, uri: &str) -> Result<Vec<u8>, ImageError> {
        let response = self.client
            .get(uri)
            .send()
            .await
            .map_err(|e| ImageError::Fetch(format!("{}: {}", uri, e)))?;

        if !response.status().is_success() {
            return Err(ImageError::Fetch(format!("{}: HTTP error {}", uri, response.status())));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ImageError::Fetch(format!("Failed to read body of {}: {}", uri, e)))?;
        Ok(bytes.to_vec())
    }
}

impl Default for HttpImageFetcher {
    fn default() -> Self {
        Self::new(5)
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, uri: &str) -> Result<DynamicImage, ImageError> {
        debug!("Fetching image {}", uri);

        let data = if uri.starts_with("http://") || uri.starts_with("https://") {
            self.download(uri).await?
        } else {
            tokio::fs::read(uri)
                .await
                .map_err(|e| ImageError::Fetch(format!("{}: {}", uri, e)))?
        };

        decode_image(&data).map_err(|e| {
            error!("Image at {} could not be decoded ({} bytes)", uri, data.len());
            e
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};
    use tempfile::TempDir;

    fn sample_image(size: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(size, size, Rgb([200, 10, 10])))
    }

    #[test]
    fn test_album_art_sizes() {
        let art = AlbumArt::from_image(&sample_image(64));
        assert_eq!(art.full.dimensions(), (SCREEN_W, SCREEN_W));
        assert_eq!(art.thumb.dimensions(), (THUMB_W, THUMB_W));
    }

    #[test]
    fn test_decode_garbage_is_error() {
        assert!(matches!(decode_image(b"definitely not an image"), Err(ImageError::Decode(_))));
    }

    #[tokio::test]
    async fn test_fetch_local_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("slide.png");
        sample_image(16).save_with_format(&path, ImageFormat::Png).unwrap();

        let fetcher = HttpImageFetcher::default();
        let image = fetcher.fetch(path.to_str().unwrap()).await.unwrap();
        assert_eq!(image.width(), 16);
    }

    #[tokio::test]
    async fn test_fetch_missing_file_is_fetch_error() {
        let fetcher = HttpImageFetcher::default();
        let result = fetcher.fetch("/nonexistent/slide.png").await;
        assert!(matches!(result, Err(ImageError::Fetch(_))));
    }
}
