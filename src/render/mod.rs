// Rendering: frame presentation and hand skeleton overlay.

pub mod raster;
pub mod skeleton;
pub mod surface;

pub use raster::RasterSurface;
pub use skeleton::{draw_order, draw_path, hand_color, present_frame, render_hands, RenderOptions};
pub use surface::{Color, DrawCommand, Path2D, Point, RecordingSurface, Surface};
