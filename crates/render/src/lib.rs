//! `ringscan-render` — raster output for reconciled scan data.
//!
//! Heatmap figures are drawn with plotters onto PNG files. Charge diagrams
//! are drawn with plotters onto an in-memory copy of a background image
//! loaded with `image`, then saved next to each other in the charge
//! directory.
//!
//! Text needs real font files: call [`register_fonts`] once before
//! rendering anything.

pub mod diagram;
pub mod error;
pub mod fonts;
pub mod heatmap;

pub use diagram::DiagramRenderer;
pub use error::RenderError;
pub use fonts::register_fonts;
pub use heatmap::render_figure;
