//! Output canvas and caption styling.

use serde::{Deserialize, Serialize};

/// Output width in pixels (9:16 portrait)
pub const TARGET_WIDTH: u32 = 1080;
/// Output height in pixels (9:16 portrait)
pub const TARGET_HEIGHT: u32 = 1920;
/// Caption top edge as a fraction of the output height
pub const CAPTION_Y_RATIO: f64 = 0.20;
/// Default output container extension
pub const DEFAULT_OUTPUT_EXTENSION: &str = "mp4";

/// Immutable description of the output canvas.
///
/// Passed by reference into the filter builder so that no target dimension
/// or styling constant is read from module state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputFormat {
    /// Canvas width in pixels
    pub width: u32,
    /// Canvas height in pixels
    pub height: u32,
    /// Scaler algorithm passed as `flags=` to the scale filter
    pub scale_flags: String,
    /// Caption top edge as a fraction of `height`
    pub caption_y_ratio: f64,
    /// Caption fill colour
    pub font_color: String,
    /// Caption outline width
    pub border_width: u32,
    /// Caption outline colour
    pub border_color: String,
    /// Background box colour (with alpha)
    pub box_color: String,
    /// Padding around the caption inside the box
    pub box_border_width: u32,
    /// Extra spacing between wrapped caption lines
    pub line_spacing: u32,
    /// Output container extension (without the dot)
    pub extension: String,
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self {
            width: TARGET_WIDTH,
            height: TARGET_HEIGHT,
            scale_flags: "lanczos".to_string(),
            caption_y_ratio: CAPTION_Y_RATIO,
            font_color: "white".to_string(),
            border_width: 3,
            border_color: "black@0.9".to_string(),
            box_color: "black@0.7".to_string(),
            box_border_width: 15,
            line_spacing: 8,
            extension: DEFAULT_OUTPUT_EXTENSION.to_string(),
        }
    }
}

impl OutputFormat {
    /// Portrait 1080x1920 canvas.
    pub fn vertical() -> Self {
        Self::default()
    }

    /// Canvas aspect ratio (width / height).
    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }

    /// Caption top edge in pixels.
    pub fn caption_y(&self) -> u32 {
        (self.height as f64 * self.caption_y_ratio) as u32
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into().trim_start_matches('.').to_string();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertical_defaults() {
        let format = OutputFormat::vertical();
        assert_eq!(format.width, 1080);
        assert_eq!(format.height, 1920);
        assert!((format.aspect_ratio() - 0.5625).abs() < 1e-9);
    }

    #[test]
    fn test_caption_y_is_twenty_percent() {
        assert_eq!(OutputFormat::default().caption_y(), 384);
    }

    #[test]
    fn test_extension_strips_dot() {
        let format = OutputFormat::default().with_extension(".mov");
        assert_eq!(format.extension, "mov");
    }
}
