pub mod capture;
pub mod model;
pub mod raster;
pub mod render;
pub mod state;
pub mod surface;

pub use model::{Color, Point, Position, StrokeStyle};
pub use raster::{alpha_bounds, PixelBounds, RgbaBuffer};
pub use surface::DrawingSurface;
