//! PNG pie chart renderer
//!
//! The pie fills the left square of the canvas. Wedges are laid out
//! clockwise from 12 o'clock in bucket order, each taking its share of the
//! bucket total. Colors cycle through a fixed palette; the "Others" wedge is
//! always grey. Whatever width is left over to the right holds the legend:
//! one row per bucket with its swatch, label and share.

use costbot_core::error::{CostbotError, Result};
use costbot_core::provider::ChartRenderer;
use costbot_core::types::{ChartBucket, ChartImage};
use font8x8::{BASIC_FONTS, UnicodeFonts};
use image::{ImageFormat, Rgba, RgbaImage};
use std::f64::consts::TAU;
use std::io::Cursor;
use tracing::debug;

/// Canvas width in pixels: the pie square plus the legend panel
pub const DEFAULT_WIDTH: u32 = 768;

/// Canvas height in pixels, also the side of the pie square
pub const DEFAULT_HEIGHT: u32 = 512;

/// Attachment file name
pub const CHART_FILE_NAME: &str = "cost-breakdown.png";

const CONTENT_TYPE: &str = "image/png";

const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);
const TEXT_COLOR: Rgba<u8> = Rgba([20, 20, 20, 255]);
const OTHERS_COLOR: Rgba<u8> = Rgba([160, 160, 160, 255]);
const EMPTY_COLOR: Rgba<u8> = Rgba([230, 230, 230, 255]);

const PALETTE: [Rgba<u8>; 8] = [
    Rgba([0, 116, 217, 255]),
    Rgba([0, 217, 210, 255]),
    Rgba([0, 217, 101, 255]),
    Rgba([217, 0, 116, 255]),
    Rgba([217, 101, 0, 255]),
    Rgba([217, 210, 0, 255]),
    Rgba([117, 64, 217, 255]),
    Rgba([51, 51, 51, 255]),
];

// Legend geometry, in pixels
const GLYPH_SIZE: u32 = 8;
const LEGEND_MARGIN: u32 = 12;
const ROW_HEIGHT: u32 = 20;
const SWATCH_SIZE: u32 = 12;
const SWATCH_GAP: u32 = 6;

/// Renders chart buckets as a PNG pie chart with a legend
#[derive(Debug, Clone)]
pub struct PieChartRenderer {
    width: u32,
    height: u32,
    file_name: String,
}

impl Default for PieChartRenderer {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            file_name: CHART_FILE_NAME.to_string(),
        }
    }
}

impl PieChartRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the image size in pixels
    ///
    /// A canvas no wider than it is tall has no room for the legend and
    /// holds the pie alone.
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }

    /// Color of the wedge at `index`
    pub fn wedge_color(index: usize, bucket: &ChartBucket) -> Rgba<u8> {
        if bucket.is_others() {
            OTHERS_COLOR
        } else {
            PALETTE[index % PALETTE.len()]
        }
    }

    /// Rasterize the pie and legend without encoding them
    pub fn draw(&self, buckets: &[ChartBucket]) -> RgbaImage {
        let total: f64 = buckets.iter().map(|b| b.value().max(0.0)).sum();

        // Cumulative end of each wedge as a fraction of the full turn
        let mut acc = 0.0;
        let wedges: Vec<(f64, Rgba<u8>)> = buckets
            .iter()
            .enumerate()
            .filter(|(_, bucket)| bucket.value() > 0.0)
            .map(|(index, bucket)| {
                acc += bucket.value() / total;
                (acc, Self::wedge_color(index, bucket))
            })
            .collect();

        let side = self.width.min(self.height);
        let cx = side as f64 / 2.0;
        let cy = self.height as f64 / 2.0;
        let radius = side as f64 / 2.0 * 0.9;

        let mut img = RgbaImage::from_pixel(self.width, self.height, BACKGROUND);
        for (x, y, pixel) in img.enumerate_pixels_mut() {
            let dx = x as f64 + 0.5 - cx;
            let dy = y as f64 + 0.5 - cy;
            if dx * dx + dy * dy > radius * radius {
                continue;
            }

            *pixel = match wedges.last() {
                None => EMPTY_COLOR,
                Some(&(_, last)) => {
                    // Screen y grows downward, so this runs clockwise from 12 o'clock
                    let mut angle = dx.atan2(-dy);
                    if angle < 0.0 {
                        angle += TAU;
                    }
                    let fraction = angle / TAU;
                    wedges
                        .iter()
                        .find(|(end, _)| fraction < *end)
                        .map(|&(_, color)| color)
                        .unwrap_or(last)
                }
            };
        }

        if self.width > side {
            self.draw_legend(&mut img, side, buckets, total);
        }

        img
    }

    fn draw_legend(&self, img: &mut RgbaImage, left: u32, buckets: &[ChartBucket], total: f64) {
        let swatch_x = left + LEGEND_MARGIN;
        let text_x = swatch_x + SWATCH_SIZE + SWATCH_GAP;
        let max_chars = (self.width.saturating_sub(text_x) / GLYPH_SIZE) as usize;
        let max_rows = (self.height.saturating_sub(2 * LEGEND_MARGIN) / ROW_HEIGHT) as usize;
        if max_chars == 0 || max_rows == 0 {
            return;
        }

        let rows = legend_rows(buckets, total, max_chars);
        let shown = if rows.len() > max_rows {
            max_rows - 1
        } else {
            rows.len()
        };

        let text_offset = (SWATCH_SIZE - GLYPH_SIZE) / 2;
        for (row, (color, text)) in rows.iter().take(shown).enumerate() {
            let y = LEGEND_MARGIN + row as u32 * ROW_HEIGHT;
            fill_rect(img, swatch_x, y, SWATCH_SIZE, *color);
            draw_text(img, text_x, y + text_offset, text);
        }

        if shown < rows.len() {
            let y = LEGEND_MARGIN + shown as u32 * ROW_HEIGHT;
            let more = shorten(&format!("+{} more", rows.len() - shown), max_chars);
            draw_text(img, text_x, y + text_offset, &more);
        }
    }
}

/// Swatch color and text of each legend row, e.g. `EC2 60.0%`
///
/// The share is kept whole; only the label is shortened to fit
/// `max_chars`.
fn legend_rows(buckets: &[ChartBucket], total: f64, max_chars: usize) -> Vec<(Rgba<u8>, String)> {
    buckets
        .iter()
        .enumerate()
        .map(|(index, bucket)| {
            let share = if total > 0.0 {
                bucket.value().max(0.0) / total * 100.0
            } else {
                0.0
            };
            let suffix = format!(" {share:.1}%");
            let budget = max_chars.saturating_sub(suffix.chars().count());
            let text = format!("{}{suffix}", shorten(bucket.label(), budget));
            (PieChartRenderer::wedge_color(index, bucket), text)
        })
        .collect()
}

fn shorten(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    if max_chars <= 2 {
        return text.chars().take(max_chars).collect();
    }
    let mut out: String = text.chars().take(max_chars - 2).collect();
    out.push_str("..");
    out
}

fn fill_rect(img: &mut RgbaImage, x: u32, y: u32, size: u32, color: Rgba<u8>) {
    for py in y..(y + size).min(img.height()) {
        for px in x..(x + size).min(img.width()) {
            img.put_pixel(px, py, color);
        }
    }
}

/// Draw `text` with the 8x8 bitmap font, clipped to the canvas
///
/// Characters outside the basic Latin range are drawn as `?`.
fn draw_text(img: &mut RgbaImage, x: u32, y: u32, text: &str) {
    let fallback = BASIC_FONTS.get('?').unwrap_or([0; 8]);
    for (i, ch) in text.chars().enumerate() {
        let glyph = BASIC_FONTS.get(ch).unwrap_or(fallback);
        let gx = x + i as u32 * GLYPH_SIZE;
        for (row, &bits) in glyph.iter().enumerate() {
            for col in 0..GLYPH_SIZE {
                // Bit 0 is the leftmost pixel of the row
                if bits & (1u8 << col) == 0 {
                    continue;
                }
                let (px, py) = (gx + col, y + row as u32);
                if px < img.width() && py < img.height() {
                    img.put_pixel(px, py, TEXT_COLOR);
                }
            }
        }
    }
}

impl ChartRenderer for PieChartRenderer {
    fn render(&self, buckets: &[ChartBucket]) -> Result<ChartImage> {
        if self.width == 0 || self.height == 0 {
            return Err(CostbotError::Render(format!(
                "invalid chart size {}x{}",
                self.width, self.height
            )));
        }

        let img = self.draw(buckets);
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .map_err(|e| CostbotError::Render(e.to_string()))?;

        debug!(
            "Rendered {} buckets into a {}x{} PNG ({} bytes)",
            buckets.len(),
            self.width,
            self.height,
            bytes.len()
        );

        Ok(ChartImage {
            file_name: self.file_name.clone(),
            content_type: CONTENT_TYPE.to_string(),
            bytes,
        })
    }
}
