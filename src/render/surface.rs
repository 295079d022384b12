use anyhow::Result;

use crate::config::Color;
use crate::error::InitError;

/// Host drawing seam. The engine renders through this; the host decides
/// where the pixels end up (framebuffer, window, test recorder).
pub trait DrawSurface {
    fn clear(&mut self) -> Result<()>;
    fn stroke_line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) -> Result<()>;
    /// Uniform zoom applied to the whole surface, distinct from per-tick
    /// stretching.
    fn set_scale(&mut self, factor: f32) -> Result<()>;
}

const LINE_WIDTH: f32 = 2.0;

/// Square CPU surface: RGBA pixels, alpha-blended strokes, and a
/// zoom-about-center transform resolved at readback.
pub struct Framebuffer {
    size: u32,
    pixels: Vec<u8>,
    color: Color,
    scale: f32,
}

impl Framebuffer {
    pub fn new(size: u32, color: Color) -> Result<Self, InitError> {
        if size == 0 {
            return Err(InitError::Surface("surface size must be > 0".into()));
        }
        Ok(Self {
            size,
            pixels: vec![0; (size * size * 4) as usize],
            color,
            scale: 1.0,
        })
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Unscaled pixel contents.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    fn blend(&mut self, x: i32, y: i32, coverage: f32) {
        if x < 0 || y < 0 || x >= self.size as i32 || y >= self.size as i32 {
            return;
        }
        let idx = ((y as u32 * self.size + x as u32) * 4) as usize;
        let [r, g, b, a] = self.color.0;
        let alpha = coverage * (a as f32 / 255.0);
        let inv = 1.0 - alpha;
        self.pixels[idx] = (r as f32 * alpha + self.pixels[idx] as f32 * inv) as u8;
        self.pixels[idx + 1] = (g as f32 * alpha + self.pixels[idx + 1] as f32 * inv) as u8;
        self.pixels[idx + 2] = (b as f32 * alpha + self.pixels[idx + 2] as f32 * inv) as u8;
        self.pixels[idx + 3] = self.pixels[idx + 3].max((alpha * 255.0) as u8);
    }

    /// Round brush stamp, LINE_WIDTH across, with soft edges.
    fn stamp(&mut self, x: f32, y: f32) {
        let half = LINE_WIDTH / 2.0;
        let x0 = (x - half).floor() as i32;
        let x1 = (x + half).ceil() as i32;
        let y0 = (y - half).floor() as i32;
        let y1 = (y + half).ceil() as i32;
        for py in y0..=y1 {
            for px in x0..=x1 {
                let dx = px as f32 + 0.5 - x;
                let dy = py as f32 + 0.5 - y;
                let coverage = (half + 0.5 - (dx * dx + dy * dy).sqrt()).clamp(0.0, 1.0);
                if coverage > 0.0 {
                    self.blend(px, py, coverage);
                }
            }
        }
    }

    /// Read back the surface with the current scale transform applied,
    /// bilinear-sampled about the center.
    pub fn scaled_rgba(&self) -> Vec<u8> {
        if (self.scale - 1.0).abs() < f32::EPSILON {
            return self.pixels.clone();
        }

        let size = self.size as usize;
        let center = self.size as f32 / 2.0;
        let mut out = vec![0u8; self.pixels.len()];

        for y in 0..size {
            for x in 0..size {
                let src_x = center + (x as f32 + 0.5 - center) / self.scale - 0.5;
                let src_y = center + (y as f32 + 0.5 - center) / self.scale - 0.5;
                let sample = self.sample_bilinear(src_x, src_y);
                let idx = (y * size + x) * 4;
                out[idx..idx + 4].copy_from_slice(&sample);
            }
        }
        out
    }

    fn sample_bilinear(&self, x: f32, y: f32) -> [u8; 4] {
        let max = (self.size - 1) as f32;
        let x = x.clamp(0.0, max);
        let y = y.clamp(0.0, max);
        let x0 = x.floor() as u32;
        let y0 = y.floor() as u32;
        let x1 = (x0 + 1).min(self.size - 1);
        let y1 = (y0 + 1).min(self.size - 1);
        let fx = x - x0 as f32;
        let fy = y - y0 as f32;

        let px = |xx: u32, yy: u32| {
            let idx = ((yy * self.size + xx) * 4) as usize;
            [
                self.pixels[idx] as f32,
                self.pixels[idx + 1] as f32,
                self.pixels[idx + 2] as f32,
                self.pixels[idx + 3] as f32,
            ]
        };

        let (p00, p10, p01, p11) = (px(x0, y0), px(x1, y0), px(x0, y1), px(x1, y1));
        let mut result = [0u8; 4];
        for c in 0..4 {
            let top = p00[c] * (1.0 - fx) + p10[c] * fx;
            let bottom = p01[c] * (1.0 - fx) + p11[c] * fx;
            result[c] = (top * (1.0 - fy) + bottom * fy).round() as u8;
        }
        result
    }
}

impl DrawSurface for Framebuffer {
    fn clear(&mut self) -> Result<()> {
        self.pixels.fill(0);
        Ok(())
    }

    fn stroke_line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) -> Result<()> {
        let length = ((x2 - x1).powi(2) + (y2 - y1).powi(2)).sqrt();
        let steps = (length * 2.0).ceil().max(1.0) as u32;
        for s in 0..=steps {
            let t = s as f32 / steps as f32;
            self.stamp(x1 + (x2 - x1) * t, y1 + (y2 - y1) * t);
        }
        Ok(())
    }

    fn set_scale(&mut self, factor: f32) -> Result<()> {
        self.scale = factor;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alpha_at(fb: &Framebuffer, x: u32, y: u32) -> u8 {
        fb.pixels()[((y * fb.size() + x) * 4 + 3) as usize]
    }

    #[test]
    fn zero_size_surface_is_rejected() {
        assert!(matches!(
            Framebuffer::new(0, Color::WHITE),
            Err(InitError::Surface(_))
        ));
    }

    #[test]
    fn stroke_covers_the_segment_and_clear_erases_it() {
        let mut fb = Framebuffer::new(64, Color::WHITE).unwrap();
        fb.stroke_line(10.0, 32.0, 50.0, 32.0).unwrap();
        assert!(alpha_at(&fb, 30, 32) > 0);
        assert_eq!(alpha_at(&fb, 30, 10), 0);

        fb.clear().unwrap();
        assert!(fb.pixels().iter().all(|&b| b == 0));
    }

    #[test]
    fn out_of_bounds_strokes_are_clipped() {
        let mut fb = Framebuffer::new(16, Color::WHITE).unwrap();
        fb.stroke_line(-20.0, -20.0, 40.0, 40.0).unwrap();
        assert!(alpha_at(&fb, 8, 8) > 0);
    }

    #[test]
    fn identity_scale_reads_back_unchanged() {
        let mut fb = Framebuffer::new(32, Color::WHITE).unwrap();
        fb.stroke_line(4.0, 4.0, 28.0, 28.0).unwrap();
        fb.set_scale(1.0).unwrap();
        assert_eq!(fb.scaled_rgba(), fb.pixels());
    }

    #[test]
    fn zoom_preserves_the_center_and_magnifies() {
        let mut fb = Framebuffer::new(64, Color::WHITE).unwrap();
        // Vertical stroke through the center.
        fb.stroke_line(32.0, 8.0, 32.0, 56.0).unwrap();
        fb.set_scale(2.0).unwrap();
        let zoomed = fb.scaled_rgba();

        // Center of the stroke survives the zoom.
        let center_idx = ((32 * 64 + 32) * 4 + 3) as usize;
        assert!(zoomed[center_idx] > 0);
        // The 2px stroke is now wider around the center row.
        let row = |x: u32| zoomed[((32u32 * 64 + x) * 4 + 3) as usize];
        assert!(row(30) > 0 && row(34) > 0);
    }
}
