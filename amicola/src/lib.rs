//! A fixed-size square raster of color samples, addressed through the unit square.

pub mod color;
pub mod grid;
pub mod raster;
pub mod render;

pub use color::{Color, V4};
pub use grid::{Cell, Point, Resolution};
pub use raster::Raster;
pub use render::{render, render_with, Bitmap};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
	#[error("cell {cell} is outside the {resolution} grid")]
	OutOfRange { cell: Cell, resolution: Resolution },

	#[error("invalid grid resolution {0}: must be non-zero, with N×N cells addressable")]
	InvalidResolution(usize),
}
