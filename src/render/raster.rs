use image::codecs::jpeg::JpegEncoder;
use image::{ImageResult, Rgb, RgbImage};
use tracing::{trace, warn};

use super::surface::{Color, Path2D, Point, Surface};
use crate::source::Frame;

/// Affine transform `[a, b, c, d, e, f]`, canvas convention:
/// `x' = a*x + c*y + e`, `y' = b*x + d*y + f`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Transform([f32; 6]);

impl Transform {
    const IDENTITY: Transform = Transform([1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);

    fn apply(&self, p: Point) -> Point {
        let [a, b, c, d, e, f] = self.0;
        Point::new(a * p.x + c * p.y + e, b * p.x + d * p.y + f)
    }

    fn translate(&mut self, dx: f32, dy: f32) {
        let [a, b, c, d, e, f] = self.0;
        self.0 = [a, b, c, d, e + a * dx + c * dy, f + b * dx + d * dy];
    }

    fn scale(&mut self, sx: f32, sy: f32) {
        let [a, b, c, d, e, f] = self.0;
        self.0 = [a * sx, b * sx, c * sy, d * sy, e, f];
    }

    fn rotate(&mut self, radians: f32) {
        let (sin, cos) = radians.sin_cos();
        let [a, b, c, d, e, f] = self.0;
        self.0 = [
            a * cos + c * sin,
            b * cos + d * sin,
            c * cos - a * sin,
            d * cos - b * sin,
            e,
            f,
        ];
    }

    /// Uniform length scale factor.
    fn length_scale(&self) -> f32 {
        let [a, b, c, d, _, _] = self.0;
        (a * d - b * c).abs().sqrt()
    }
}

#[derive(Debug, Clone, Copy)]
struct DrawState {
    fill: Color,
    stroke: Color,
    line_width: f32,
    transform: Transform,
}

impl Default for DrawState {
    fn default() -> Self {
        Self {
            fill: Color::BLACK,
            stroke: Color::BLACK,
            line_width: 1.0,
            transform: Transform::IDENTITY,
        }
    }
}

/// Software surface over an RGB image.
///
/// Text is not rasterised (there is no font), but `fill_text` still honours
/// the transform scoping so callers behave the same as on a real canvas.
#[derive(Clone)]
pub struct RasterSurface {
    canvas: RgbImage,
    state: DrawState,
    stack: Vec<DrawState>,
}

impl RasterSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            canvas: RgbImage::new(width, height),
            state: DrawState::default(),
            stack: Vec::new(),
        }
    }

    pub fn image(&self) -> &RgbImage {
        &self.canvas
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.canvas.width() || y >= self.canvas.height() {
            return None;
        }
        let Rgb([r, g, b]) = *self.canvas.get_pixel(x, y);
        Some(Color::rgb(r, g, b))
    }

    /// Encode the current canvas as JPEG at the given quality (1-100).
    pub fn encode_jpeg(&self, quality: u8) -> ImageResult<Vec<u8>> {
        let mut buf = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut buf, quality);
        self.canvas.write_with_encoder(encoder)?;
        Ok(buf)
    }

    fn put(&mut self, x: i64, y: i64, color: Color) {
        let (width, height) = (i64::from(self.canvas.width()), i64::from(self.canvas.height()));
        if x < 0 || y < 0 || x >= width || y >= height {
            return;
        }
        self.canvas
            .put_pixel(x as u32, y as u32, Rgb([color.r, color.g, color.b]));
    }

    /// Fill a disk given in device coordinates, clipped to the canvas.
    fn fill_disk(&mut self, center: Point, radius: f32, color: Color) {
        if !(center.is_finite() && radius.is_finite()) {
            return;
        }
        let r = radius.max(0.5);
        let (width, height) = (self.canvas.width() as f32, self.canvas.height() as f32);
        let (min_x, max_x) = ((center.x - r).floor().max(0.0), (center.x + r).ceil().min(width - 1.0));
        let (min_y, max_y) = ((center.y - r).floor().max(0.0), (center.y + r).ceil().min(height - 1.0));
        if min_x > max_x || min_y > max_y {
            return;
        }
        let r2 = r * r;
        for y in min_y as i64..=max_y as i64 {
            for x in min_x as i64..=max_x as i64 {
                let dx = x as f32 + 0.5 - center.x;
                let dy = y as f32 + 0.5 - center.y;
                if dx * dx + dy * dy <= r2 {
                    self.put(x, y, color);
                }
            }
        }
    }

    /// Axis-aligned device-space bounds of a user-space rectangle, or `None`
    /// when the transform sends a corner to infinity.
    fn device_rect(&self, x: f32, y: f32, width: f32, height: f32) -> Option<(i64, i64, i64, i64)> {
        let t = self.state.transform;
        let corners = [
            t.apply(Point::new(x, y)),
            t.apply(Point::new(x + width, y)),
            t.apply(Point::new(x, y + height)),
            t.apply(Point::new(x + width, y + height)),
        ];
        if !corners.iter().all(Point::is_finite) {
            return None;
        }
        let min_x = corners.iter().map(|p| p.x).fold(f32::INFINITY, f32::min);
        let max_x = corners.iter().map(|p| p.x).fold(f32::NEG_INFINITY, f32::max);
        let min_y = corners.iter().map(|p| p.y).fold(f32::INFINITY, f32::min);
        let max_y = corners.iter().map(|p| p.y).fold(f32::NEG_INFINITY, f32::max);
        Some((
            min_x.round() as i64,
            min_y.round() as i64,
            max_x.round() as i64,
            max_y.round() as i64,
        ))
    }

    /// Scale RGB pixel data to the requested size.
    fn resize_rgb(frame: &Frame, width: u32, height: u32) -> Option<Vec<u8>> {
        use fast_image_resize as fr;
        use fr::images::Image;

        let src = Image::from_vec_u8(frame.width, frame.height, frame.data.clone(), fr::PixelType::U8x3).ok()?;
        let mut dst = Image::new(width, height, fr::PixelType::U8x3);
        let mut resizer = fr::Resizer::new();
        resizer.resize(&src, &mut dst, None).ok()?;
        Some(dst.into_vec())
    }
}

/// Liang-Barsky clip of segment `a`-`b` to the box `min`..`max`.
fn clip_segment(a: Point, b: Point, min: Point, max: Point) -> Option<(Point, Point)> {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let (mut t0, mut t1) = (0.0f32, 1.0f32);
    for (p, q) in [
        (-dx, a.x - min.x),
        (dx, max.x - a.x),
        (-dy, a.y - min.y),
        (dy, max.y - a.y),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let t = q / p;
        if p < 0.0 {
            t0 = t0.max(t);
        } else {
            t1 = t1.min(t);
        }
        if t0 > t1 {
            return None;
        }
    }
    Some((
        Point::new(a.x + dx * t0, a.y + dy * t0),
        Point::new(a.x + dx * t1, a.y + dy * t1),
    ))
}

impl Surface for RasterSurface {
    fn width(&self) -> u32 {
        self.canvas.width()
    }

    fn height(&self) -> u32 {
        self.canvas.height()
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.canvas = RgbImage::new(width, height);
    }

    fn clear_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        let Some((x0, y0, x1, y1)) = self.device_rect(x, y, width, height) else {
            return;
        };
        let (x0, y0) = (x0.max(0), y0.max(0));
        let x1 = x1.min(i64::from(self.canvas.width()));
        let y1 = y1.min(i64::from(self.canvas.height()));
        for py in y0..y1 {
            for px in x0..x1 {
                self.put(px, py, Color::BLACK);
            }
        }
    }

    fn draw_image(&mut self, frame: &Frame, x: f32, y: f32, width: f32, height: f32) {
        if !frame.is_consistent() {
            warn!(
                "skipping frame with {} bytes for {}x{}",
                frame.data.len(),
                frame.width,
                frame.height
            );
            return;
        }
        let Some((x0, y0, x1, y1)) = self.device_rect(x, y, width, height) else {
            return;
        };
        let (dst_w, dst_h) = ((x1 - x0).max(0) as u32, (y1 - y0).max(0) as u32);
        if dst_w == 0 || dst_h == 0 || frame.width == 0 || frame.height == 0 {
            return;
        }

        let scaled;
        let pixels: &[u8] = if (dst_w, dst_h) == (frame.width, frame.height) {
            &frame.data
        } else {
            match Self::resize_rgb(frame, dst_w, dst_h) {
                Some(data) => {
                    scaled = data;
                    &scaled
                }
                None => {
                    warn!("failed to scale frame to {dst_w}x{dst_h}");
                    return;
                }
            }
        };

        for row in 0..dst_h {
            for col in 0..dst_w {
                let i = ((row * dst_w + col) * 3) as usize;
                let color = Color::rgb(pixels[i], pixels[i + 1], pixels[i + 2]);
                self.put(x0 + i64::from(col), y0 + i64::from(row), color);
            }
        }
    }

    fn set_fill_color(&mut self, color: Color) {
        self.state.fill = color;
    }

    fn set_stroke_color(&mut self, color: Color) {
        self.state.stroke = color;
    }

    fn set_line_width(&mut self, width: f32) {
        self.state.line_width = width;
    }

    fn fill_circle(&mut self, center: Point, radius: f32) {
        let t = self.state.transform;
        self.fill_disk(t.apply(center), radius * t.length_scale(), self.state.fill);
    }

    fn stroke_path(&mut self, path: &Path2D) {
        let t = self.state.transform;
        let half_width = self.state.line_width * t.length_scale() / 2.0;
        if !half_width.is_finite() {
            return;
        }
        let color = self.state.stroke;
        // anything further out than half a line width cannot touch a pixel
        let min = Point::new(-half_width - 1.0, -half_width - 1.0);
        let max = Point::new(
            self.canvas.width() as f32 + half_width + 1.0,
            self.canvas.height() as f32 + half_width + 1.0,
        );
        for (from, to) in path.segments() {
            let (a, b) = (t.apply(from), t.apply(to));
            if !(a.is_finite() && b.is_finite()) {
                trace!("skipping segment with non-finite endpoint");
                continue;
            }
            let Some((a, b)) = clip_segment(a, b, min, max) else {
                continue;
            };
            let length = ((b.x - a.x).powi(2) + (b.y - a.y).powi(2)).sqrt();
            let steps = (length * 2.0).ceil().max(1.0) as u32;
            for step in 0..=steps {
                let s = step as f32 / steps as f32;
                let p = Point::new(a.x + (b.x - a.x) * s, a.y + (b.y - a.y) * s);
                self.fill_disk(p, half_width, color);
            }
        }
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32) {
        let at = self.state.transform.apply(Point::new(x, y));
        trace!("text '{text}' at ({}, {}) not rasterised", at.x, at.y);
    }

    fn save(&mut self) {
        self.stack.push(self.state);
    }

    fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.state = state;
        }
    }

    fn translate(&mut self, dx: f32, dy: f32) {
        self.state.transform.translate(dx, dy);
    }

    fn rotate(&mut self, radians: f32) {
        self.state.transform.rotate(radians);
    }

    fn scale(&mut self, sx: f32, sy: f32) {
        self.state.transform.scale(sx, sy);
    }
}
