use image::imageops::{self, FilterType};
use image::{Rgba, Rgba32FImage, RgbaImage};

use super::resize::GridDimensions;

/// How the source image is reduced to one sample per cell.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Sampling {
    /// Coverage- and alpha-weighted mean of every source pixel under the cell.
    #[default]
    Area,
    /// Reconstruction filter from `image::imageops`.
    Filter(FilterType),
}

/// One RGBA sample per grid cell, row-major.
///
/// Color channels are straight (not premultiplied); a cell with no opaque
/// coverage is `[0, 0, 0, 0]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SampleBuffer {
    pub width: u16,
    pub height: u16,
    pub pixels: Vec<[u8; 4]>,
}

impl SampleBuffer {
    pub fn dimensions(&self) -> GridDimensions {
        GridDimensions { columns: self.width, rows: self.height }
    }
}

pub fn downsample(image: &RgbaImage, target: GridDimensions, sampling: Sampling) -> SampleBuffer {
    let pixels = match sampling {
        Sampling::Area => area_average(image, target),
        Sampling::Filter(filter) => filtered(image, target, filter),
    };

    SampleBuffer { width: target.columns, height: target.rows, pixels }
}

/// Source pixels overlapped by one output cell along a single axis.
struct Span {
    start: u32,
    weights: Vec<f64>,
}

fn spans(source: u32, target: u16) -> Vec<Span> {
    let ratio = f64::from(source) / f64::from(target);

    (0..target)
        .map(|index| {
            let lo = f64::from(index) * ratio;
            let hi = (f64::from(index) + 1.0) * ratio;
            let first = (lo.floor() as u32).min(source - 1);
            let last = (hi.ceil() as u32).clamp(first + 1, source);
            let weights = (first..last)
                .map(|pixel| {
                    let pixel = f64::from(pixel);
                    (hi.min(pixel + 1.0) - lo.max(pixel)).max(0.0)
                })
                .collect();
            Span { start: first, weights }
        })
        .collect()
}

/// Turns premultiplied color in `[0, 255]` and alpha in `[0, 1]` back into a straight sample.
fn unpremultiply(color: [f64; 3], alpha: f64) -> [u8; 4] {
    let alpha = alpha.clamp(0.0, 1.0);
    if alpha <= f64::EPSILON {
        return [0; 4];
    }
    let channel = |value: f64| (value / alpha).round().clamp(0.0, 255.0) as u8;
    [channel(color[0]), channel(color[1]), channel(color[2]), (alpha * 255.0).round() as u8]
}

fn filtered(image: &RgbaImage, target: GridDimensions, filter: FilterType) -> Vec<[u8; 4]> {
    // Float subpixels are clamped to [0, 1] by the resampler.
    let premultiplied = Rgba32FImage::from_fn(image.width(), image.height(), |x, y| {
        let [r, g, b, a] = image.get_pixel(x, y).0.map(|channel| f32::from(channel) / 255.0);
        Rgba([r * a, g * a, b * a, a])
    });

    imageops::resize(&premultiplied, u32::from(target.columns), u32::from(target.rows), filter)
        .pixels()
        .map(|pixel| {
            let [r, g, b, a] = pixel.0.map(f64::from);
            unpremultiply([r * 255.0, g * 255.0, b * 255.0], a)
        })
        .collect()
}

fn area_average(image: &RgbaImage, target: GridDimensions) -> Vec<[u8; 4]> {
    let (width, height) = image.dimensions();
    let columns = spans(width, target.columns);
    let rows = spans(height, target.rows);

    let mut output = Vec::with_capacity(target.cell_count());
    for row in &rows {
        for column in &columns {
            let mut acc = [0.0f64; 3];
            let mut coverage = 0.0;
            let mut total = 0.0;

            for (dy, wy) in row.weights.iter().enumerate() {
                let y = row.start + dy as u32;
                for (dx, wx) in column.weights.iter().enumerate() {
                    let weight = wy * wx;
                    if weight <= 0.0 {
                        continue;
                    }
                    let [r, g, b, a] = image.get_pixel(column.start + dx as u32, y).0;
                    let opaque = weight * f64::from(a) / 255.0;
                    for (sum, channel) in acc.iter_mut().zip([r, g, b]) {
                        *sum += opaque * f64::from(channel);
                    }
                    coverage += opaque;
                    total += weight;
                }
            }

            let sample = if total > 0.0 {
                unpremultiply(acc.map(|sum| sum / total), coverage / total)
            } else {
                [0; 4]
            };
            output.push(sample);
        }
    }

    output
}
