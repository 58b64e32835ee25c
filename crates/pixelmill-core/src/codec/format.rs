//! Output format descriptions and detection.

use serde::{Deserialize, Serialize};

/// Supported encode targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[serde(alias = "jpg")]
    Jpeg,
    #[default]
    Png,
    WebP,
    Avif,
    Bmp,
    Gif,
    Tiff,
}

impl OutputFormat {
    /// MIME type of the encoded byte stream.
    pub fn mime_type(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Png => "image/png",
            OutputFormat::WebP => "image/webp",
            OutputFormat::Avif => "image/avif",
            OutputFormat::Bmp => "image/bmp",
            OutputFormat::Gif => "image/gif",
            OutputFormat::Tiff => "image/tiff",
        }
    }

    /// Conventional file extension.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Png => "png",
            OutputFormat::WebP => "webp",
            OutputFormat::Avif => "avif",
            OutputFormat::Bmp => "bmp",
            OutputFormat::Gif => "gif",
            OutputFormat::Tiff => "tiff",
        }
    }

    /// Whether the format has a lossy quality level.
    ///
    /// Quality is ignored entirely for the remaining formats, which keeps
    /// their encodes deterministic regardless of the requested value.
    pub fn supports_quality(self) -> bool {
        matches!(
            self,
            OutputFormat::Jpeg | OutputFormat::WebP | OutputFormat::Avif
        )
    }

    /// The matching format identifier of the image crate.
    pub fn to_image_format(self) -> image::ImageFormat {
        match self {
            OutputFormat::Jpeg => image::ImageFormat::Jpeg,
            OutputFormat::Png => image::ImageFormat::Png,
            OutputFormat::WebP => image::ImageFormat::WebP,
            OutputFormat::Avif => image::ImageFormat::Avif,
            OutputFormat::Bmp => image::ImageFormat::Bmp,
            OutputFormat::Gif => image::ImageFormat::Gif,
            OutputFormat::Tiff => image::ImageFormat::Tiff,
        }
    }

    /// Detect the format of an encoded byte stream from its magic numbers.
    ///
    /// Unknown or unrecognized streams report as PNG, the same fallback the
    /// rest of the pipeline uses for an unspecified format.
    pub fn detect(bytes: &[u8]) -> OutputFormat {
        match image::guess_format(bytes) {
            Ok(image::ImageFormat::Jpeg) => OutputFormat::Jpeg,
            Ok(image::ImageFormat::Png) => OutputFormat::Png,
            Ok(image::ImageFormat::WebP) => OutputFormat::WebP,
            Ok(image::ImageFormat::Avif) => OutputFormat::Avif,
            Ok(image::ImageFormat::Bmp) => OutputFormat::Bmp,
            Ok(image::ImageFormat::Gif) => OutputFormat::Gif,
            Ok(image::ImageFormat::Tiff) => OutputFormat::Tiff,
            _ => OutputFormat::Png,
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}
