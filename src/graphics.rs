use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::Error;

/// An opaque 8-bit RGB colour
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(try_from = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }

    /// Source-over blend of `src` onto `self` with coverage `alpha`
    pub fn blend(self, src: Rgb, alpha: f64) -> Rgb {
        let a = alpha.clamp(0.0, 1.0);
        let mix = |dst: u8, src: u8| -> u8 {
            (dst as f64 + (src as f64 - dst as f64) * a)
                .round()
                .clamp(0.0, 255.0) as u8
        };
        Rgb::new(mix(self.r, src.r), mix(self.g, src.g), mix(self.b, src.b))
    }
}

/// Parses an `"r, g, b"` triplet such as `"139, 92, 246"`
impl FromStr for Rgb {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        let [r, g, b] = parts.as_slice() else {
            return Err(Error::InvalidColor(s.to_string()));
        };
        let channel = |c: &str| c.parse::<u8>().map_err(|_| Error::InvalidColor(s.to_string()));
        Ok(Rgb::new(channel(*r)?, channel(*g)?, channel(*b)?))
    }
}

impl TryFrom<String> for Rgb {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}, {}", self.r, self.g, self.b)
    }
}

/// A 2D drawing target in world units.
///
/// Implementations must accept any finite coordinates, including ones outside
/// the surface, and never fail.
pub trait DrawSurface {
    /// Drawable size in world units
    fn size(&self) -> (f64, f64);

    /// Erases the previous frame
    fn clear(&mut self);

    /// Draws a one-pixel line
    fn stroke_line(&mut self, from: [f64; 2], to: [f64; 2], color: Rgb, alpha: f64);

    /// Draws a filled disc
    fn fill_circle(&mut self, center: [f64; 2], radius: f64, color: Rgb, alpha: f64);
}

/// An RGBA8 pixel buffer composited onto an opaque background.
///
/// World coordinates are multiplied by `pixel_ratio` to obtain pixel
/// coordinates, the same way a canvas applies its device pixel ratio.
pub struct PixelCanvas {
    width: usize,
    height: usize,
    pixel_ratio: f64,
    background: Rgb,
    pixel_data: Vec<u8>,
}

impl PixelCanvas {
    pub fn new(width: usize, height: usize, pixel_ratio: f64, background: Rgb) -> Self {
        let mut canvas = PixelCanvas {
            width,
            height,
            pixel_ratio,
            background,
            pixel_data: Vec::new(),
        };
        canvas.resize(width, height);
        canvas
    }

    /// Reallocates the buffer and fills it with the background
    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.pixel_data = vec![0u8; width * height * 4];
        self.clear();
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }

    pub fn pixel_data(&self) -> &[u8] {
        &self.pixel_data
    }

    /// Colour at pixel `(x, y)`, or `None` outside the buffer
    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y * self.width + x) * 4;
        Some(Rgb::new(
            self.pixel_data[offset],
            self.pixel_data[offset + 1],
            self.pixel_data[offset + 2],
        ))
    }

    fn blend_pixel(&mut self, x: isize, y: isize, color: Rgb, alpha: f64) {
        if x < 0 || y < 0 || x >= self.width as isize || y >= self.height as isize {
            return;
        }
        let (x, y) = (x as usize, y as usize);
        let Some(dst) = self.pixel(x, y) else {
            return;
        };
        let out = dst.blend(color, alpha);
        let offset = (y * self.width + x) * 4;
        self.pixel_data[offset] = out.r;
        self.pixel_data[offset + 1] = out.g;
        self.pixel_data[offset + 2] = out.b;
        self.pixel_data[offset + 3] = 255;
    }

    fn to_pixels(&self, p: [f64; 2]) -> Option<[f64; 2]> {
        let px = [p[0] * self.pixel_ratio, p[1] * self.pixel_ratio];
        (px[0].is_finite() && px[1].is_finite()).then_some(px)
    }
}

impl DrawSurface for PixelCanvas {
    fn size(&self) -> (f64, f64) {
        if self.pixel_ratio <= 0.0 {
            return (0.0, 0.0);
        }
        (
            self.width as f64 / self.pixel_ratio,
            self.height as f64 / self.pixel_ratio,
        )
    }

    fn clear(&mut self) {
        let Rgb { r, g, b } = self.background;
        for pixel in self.pixel_data.chunks_exact_mut(4) {
            pixel.copy_from_slice(&[r, g, b, 255]);
        }
    }

    /// Bresenham line with per-pixel blending
    fn stroke_line(&mut self, from: [f64; 2], to: [f64; 2], color: Rgb, alpha: f64) {
        let (Some(from), Some(to)) = (self.to_pixels(from), self.to_pixels(to)) else {
            return;
        };
        let limit = (self.width.max(self.height) * 4) as f64;
        if from.iter().chain(to.iter()).any(|c| c.abs() > limit) {
            return;
        }

        let (mut x0, mut y0, x1, y1) = (
            from[0].round() as isize,
            from[1].round() as isize,
            to[0].round() as isize,
            to[1].round() as isize,
        );
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy; // error value e_xy

        loop {
            self.blend_pixel(x0, y0, color, alpha);

            if x0 == x1 && y0 == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x0 += sx;
            }
            if e2 <= dx {
                err += dx;
                y0 += sy;
            }
        }
    }

    fn fill_circle(&mut self, center: [f64; 2], radius: f64, color: Rgb, alpha: f64) {
        let Some(center) = self.to_pixels(center) else {
            return;
        };
        let radius = radius * self.pixel_ratio;
        if !radius.is_finite() || radius <= 0.0 {
            return;
        }

        // Sub-pixel discs still light the pixel they fall in
        if radius < 0.75 {
            let (x, y) = (center[0].floor() as isize, center[1].floor() as isize);
            self.blend_pixel(x, y, color, alpha);
            return;
        }

        let min_x = (center[0] - radius).floor().max(0.0) as isize;
        let max_x = (center[0] + radius).ceil().min(self.width as f64) as isize;
        let min_y = (center[1] - radius).floor().max(0.0) as isize;
        let max_y = (center[1] + radius).ceil().min(self.height as f64) as isize;
        let radius_sq = radius * radius;

        for y in min_y..max_y {
            for x in min_x..max_x {
                let px = x as f64 + 0.5 - center[0];
                let py = y as f64 + 0.5 - center[1];
                if px * px + py * py <= radius_sq {
                    self.blend_pixel(x, y, color, alpha);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLACK: Rgb = Rgb::new(0, 0, 0);
    const WHITE: Rgb = Rgb::new(255, 255, 255);

    #[test]
    fn parses_triplets() {
        assert_eq!("139, 92, 246".parse::<Rgb>().unwrap(), Rgb::new(139, 92, 246));
        assert_eq!("0,0,0".parse::<Rgb>().unwrap(), BLACK);
        assert!("1, 2".parse::<Rgb>().is_err());
        assert!("1, 2, 256".parse::<Rgb>().is_err());
        assert!("a, b, c".parse::<Rgb>().is_err());
        assert_eq!(Rgb::new(1, 2, 3).to_string(), "1, 2, 3");
    }

    #[test]
    fn blend_interpolates() {
        assert_eq!(BLACK.blend(WHITE, 1.0), WHITE);
        assert_eq!(BLACK.blend(WHITE, 0.0), BLACK);
        assert_eq!(BLACK.blend(Rgb::new(200, 100, 0), 0.5), Rgb::new(100, 50, 0));
        assert_eq!(BLACK.blend(WHITE, 7.0), WHITE);
    }

    #[test]
    fn line_covers_endpoints() {
        let mut canvas = PixelCanvas::new(10, 10, 1.0, BLACK);
        canvas.stroke_line([1.0, 1.0], [8.0, 5.0], WHITE, 1.0);
        assert_eq!(canvas.pixel(1, 1), Some(WHITE));
        assert_eq!(canvas.pixel(8, 5), Some(WHITE));
        assert_eq!(canvas.pixel(0, 9), Some(BLACK));
    }

    #[test]
    fn offscreen_and_non_finite_input_is_ignored() {
        let mut canvas = PixelCanvas::new(4, 4, 1.0, BLACK);
        canvas.stroke_line([f64::NAN, 0.0], [3.0, 3.0], WHITE, 1.0);
        canvas.stroke_line([-1e12, 0.0], [3.0, 3.0], WHITE, 1.0);
        canvas.fill_circle([f64::INFINITY, 1.0], 2.0, WHITE, 1.0);
        canvas.fill_circle([100.0, 100.0], 2.0, WHITE, 1.0);
        assert!(canvas.pixel_data().chunks(4).all(|p| p[..3] == [0, 0, 0]));
    }

    #[test]
    fn pixel_ratio_scales_world_units() {
        let mut canvas = PixelCanvas::new(10, 5, 0.125, BLACK);
        assert_eq!(canvas.pixel_ratio(), 0.125);
        assert_eq!(canvas.size(), (80.0, 40.0));
        canvas.fill_circle([40.0, 20.0], 1.5, WHITE, 1.0);
        assert_eq!(canvas.pixel(5, 2), Some(WHITE));
    }

    #[test]
    fn disc_fill_and_clear() {
        let mut canvas = PixelCanvas::new(20, 20, 1.0, BLACK);
        canvas.fill_circle([10.0, 10.0], 3.0, WHITE, 1.0);
        assert_eq!(canvas.pixel(10, 10), Some(WHITE));
        assert_eq!(canvas.pixel(10, 15), Some(BLACK));
        canvas.clear();
        assert_eq!(canvas.pixel(10, 10), Some(BLACK));
    }
}
