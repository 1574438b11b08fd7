use crate::source::Frame;

/// RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 255);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// A point in surface coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// A polyline, optionally closed back to its first point.
#[derive(Debug, Clone, PartialEq)]
pub struct Path2D {
    pub points: Vec<Point>,
    pub closed: bool,
}

impl Path2D {
    pub fn new(points: Vec<Point>, closed: bool) -> Self {
        Self { points, closed }
    }

    /// Line segments in drawing order, including the closing one.
    pub fn segments(&self) -> Vec<(Point, Point)> {
        let mut segments: Vec<(Point, Point)> =
            self.points.windows(2).map(|w| (w[0], w[1])).collect();
        if self.closed && self.points.len() > 2 {
            segments.push((self.points[self.points.len() - 1], self.points[0]));
        }
        segments
    }
}

/// A 2D drawing context.
///
/// Mirrors the subset of a canvas context the renderer uses. Transforms
/// apply to every subsequent call until `restore` pops the state saved by the
/// matching `save`.
pub trait Surface {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    /// Resize the drawing area. Contents are discarded.
    fn resize(&mut self, width: u32, height: u32);

    fn clear_rect(&mut self, x: f32, y: f32, width: f32, height: f32);
    fn draw_image(&mut self, frame: &Frame, x: f32, y: f32, width: f32, height: f32);

    fn set_fill_color(&mut self, color: Color);
    fn set_stroke_color(&mut self, color: Color);
    fn set_line_width(&mut self, width: f32);

    fn fill_circle(&mut self, center: Point, radius: f32);
    fn stroke_path(&mut self, path: &Path2D);
    fn fill_text(&mut self, text: &str, x: f32, y: f32);

    fn save(&mut self);
    fn restore(&mut self);
    fn translate(&mut self, dx: f32, dy: f32);
    fn rotate(&mut self, radians: f32);
    fn scale(&mut self, sx: f32, sy: f32);
}

/// One recorded surface call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Resize { width: u32, height: u32 },
    ClearRect { x: f32, y: f32, width: f32, height: f32 },
    DrawImage { timestamp_us: u64, x: f32, y: f32, width: f32, height: f32 },
    SetFillColor(Color),
    SetStrokeColor(Color),
    SetLineWidth(f32),
    FillCircle { center: Point, radius: f32 },
    StrokePath(Path2D),
    FillText { text: String, x: f32, y: f32 },
    Save,
    Restore,
    Translate { dx: f32, dy: f32 },
    Rotate(f32),
    Scale { sx: f32, sy: f32 },
}

/// Surface that records calls instead of drawing. Used to inspect what the
/// renderer and pipeline did.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    width: u32,
    height: u32,
    commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Fill colors set so far, in call order.
    pub fn fill_colors(&self) -> Vec<Color> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::SetFillColor(color) => Some(*color),
                _ => None,
            })
            .collect()
    }

    /// Depth of `save` calls not yet matched by `restore`.
    pub fn open_saves(&self) -> i64 {
        self.commands.iter().fold(0, |depth, c| match c {
            DrawCommand::Save => depth + 1,
            DrawCommand::Restore => depth - 1,
            _ => depth,
        })
    }
}

impl Surface for RecordingSurface {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.commands.push(DrawCommand::Resize { width, height });
    }

    fn clear_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.commands.push(DrawCommand::ClearRect { x, y, width, height });
    }

    fn draw_image(&mut self, frame: &Frame, x: f32, y: f32, width: f32, height: f32) {
        self.commands.push(DrawCommand::DrawImage {
            timestamp_us: frame.timestamp_us,
            x,
            y,
            width,
            height,
        });
    }

    fn set_fill_color(&mut self, color: Color) {
        self.commands.push(DrawCommand::SetFillColor(color));
    }

    fn set_stroke_color(&mut self, color: Color) {
        self.commands.push(DrawCommand::SetStrokeColor(color));
    }

    fn set_line_width(&mut self, width: f32) {
        self.commands.push(DrawCommand::SetLineWidth(width));
    }

    fn fill_circle(&mut self, center: Point, radius: f32) {
        self.commands.push(DrawCommand::FillCircle { center, radius });
    }

    fn stroke_path(&mut self, path: &Path2D) {
        self.commands.push(DrawCommand::StrokePath(path.clone()));
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32) {
        self.commands.push(DrawCommand::FillText {
            text: text.to_string(),
            x,
            y,
        });
    }

    fn save(&mut self) {
        self.commands.push(DrawCommand::Save);
    }

    fn restore(&mut self) {
        self.commands.push(DrawCommand::Restore);
    }

    fn translate(&mut self, dx: f32, dy: f32) {
        self.commands.push(DrawCommand::Translate { dx, dy });
    }

    fn rotate(&mut self, radians: f32) {
        self.commands.push(DrawCommand::Rotate(radians));
    }

    fn scale(&mut self, sx: f32, sy: f32) {
        self.commands.push(DrawCommand::Scale { sx, sy });
    }
}
