//! FFmpeg video filter construction.
//!
//! The chain always has the shape `scale,crop[,drawtext]`:
//! - scale so the source covers the canvas on both axes
//! - crop the overflow on the over-scaled axis, centered
//! - optionally draw a boxed caption near the top

use serde::{Deserialize, Serialize};

use reel_models::{normalize_caption, FontChoice, OutputFormat};

use crate::error::{MediaError, MediaResult};

/// Caption length buckets (exclusive upper bound in chars, font size).
const FONT_SIZE_BUCKETS: &[(usize, u32)] = &[(30, 40), (60, 35), (100, 30)];
/// Font size for captions past the last bucket.
const MIN_FONT_SIZE: u32 = 25;

/// Axis pinned to the canvas size by the scale step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FixedAxis {
    /// Source is relatively wider: height matches, width overflows.
    Height,
    /// Source is relatively taller (or equal): width matches, height overflows.
    Width,
}

/// Scale and crop geometry for one source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScalePlan {
    pub fixed_axis: FixedAxis,
    pub scaled_width: u32,
    pub scaled_height: u32,
    pub crop_x: u32,
    pub crop_y: u32,
}

/// Derived filter chain. Not persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub scale_expr: String,
    pub crop_expr: String,
    pub overlay_expr: Option<String>,
}

impl FilterSpec {
    /// Comma-joined chain for `-vf`.
    pub fn to_filter_string(&self) -> String {
        let mut chain = format!("{},{}", self.scale_expr, self.crop_expr);
        if let Some(overlay) = &self.overlay_expr {
            chain.push(',');
            chain.push_str(overlay);
        }
        chain
    }
}

/// `value_num / value_den` rounded to the nearest even integer (halves up).
fn round_to_even(value_num: u64, value_den: u64) -> MediaResult<u32> {
    let den = 2 * value_den;
    let rounded = ((2 * value_num + den) / (2 * den)) * 2;
    u32::try_from(rounded).map_err(|_| {
        MediaError::InvalidVideo(format!("scaled dimension {} out of range", rounded))
    })
}

/// Compute scale and crop geometry for a source.
pub fn plan_scale(
    source_width: u32,
    source_height: u32,
    format: &OutputFormat,
) -> MediaResult<ScalePlan> {
    if source_width == 0 || source_height == 0 {
        return Err(MediaError::DimensionUnknown {
            width: source_width,
            height: source_height,
        });
    }

    let (sw, sh) = (source_width as u64, source_height as u64);
    let (tw, th) = (format.width as u64, format.height as u64);

    // sw/sh > tw/th, compared without floating point so ties are exact
    let source_wider = sw * th > tw * sh;

    let (fixed_axis, scaled_width, scaled_height) = if source_wider {
        let width = round_to_even(sw * th, sh)?.max(format.width);
        (FixedAxis::Height, width, format.height)
    } else {
        let height = round_to_even(sh * tw, sw)?.max(format.height);
        (FixedAxis::Width, format.width, height)
    };

    Ok(ScalePlan {
        fixed_axis,
        scaled_width,
        scaled_height,
        crop_x: (scaled_width - format.width) / 2,
        crop_y: (scaled_height - format.height) / 2,
    })
}

/// Caption font size by length bucket.
pub fn font_size_for(caption: &str) -> u32 {
    let len = caption.chars().count();
    FONT_SIZE_BUCKETS
        .iter()
        .find(|(limit, _)| len < *limit)
        .map(|(_, size)| *size)
        .unwrap_or(MIN_FONT_SIZE)
}

/// Escape caption text for a quoted drawtext value.
///
/// Backslashes are doubled first so the escapes added for `:` and `'` are
/// not themselves escaped again.
pub fn escape_drawtext(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace(':', "\\:")
        .replace('\'', "\\'")
}

/// Build the caption overlay, or `None` when the caption is blank.
pub fn build_caption_overlay(
    caption: &str,
    font: &FontChoice,
    format: &OutputFormat,
) -> Option<String> {
    let caption = normalize_caption(caption);
    if caption.is_empty() {
        return None;
    }

    Some(format!(
        "drawtext=text='{text}':fontsize={size}:fontcolor={color}\
         :borderw={border}:bordercolor={border_color}\
         :x=(w-text_w)/2:y={y}:font={font}:line_spacing={spacing}\
         :box=1:boxcolor={box_color}:boxborderw={box_border}",
        text = escape_drawtext(&caption),
        size = font_size_for(&caption),
        color = format.font_color,
        border = format.border_width,
        border_color = format.border_color,
        y = format.caption_y(),
        font = font.escaped_family(),
        spacing = format.line_spacing,
        box_color = format.box_color,
        box_border = format.box_border_width,
    ))
}

/// Build the full filter chain for a source.
pub fn build_filter_spec(
    source_width: u32,
    source_height: u32,
    caption: &str,
    font: &FontChoice,
    format: &OutputFormat,
) -> MediaResult<FilterSpec> {
    let plan = plan_scale(source_width, source_height, format)?;

    Ok(FilterSpec {
        scale_expr: format!(
            "scale={}:{}:flags={}",
            plan.scaled_width, plan.scaled_height, format.scale_flags
        ),
        crop_expr: format!(
            "crop={}:{}:{}:{}",
            format.width, format.height, plan.crop_x, plan.crop_y
        ),
        overlay_expr: build_caption_overlay(caption, font, format),
    })
}
