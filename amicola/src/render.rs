use rayon::prelude::*;
use strength_reduce::StrengthReducedUsize;

use crate::color::Color;
use crate::grid::{Cell, Resolution};
use crate::raster::Raster;

/// A rendered image: one packed pixel per raster cell.
pub type Bitmap = Raster<u32>;

/// Collapses every cell of `raster` with [`Color::collapse`].
pub fn render<T: Color + Sync>(raster: &Raster<T>) -> Bitmap {
	render_with(raster, T::collapse)
}

/// Builds a new grid of the same resolution by applying `reduce` to every cell.
///
/// The whole output is computed before returning; cells are processed in parallel.
#[tracing::instrument(level = "debug", skip_all, fields(resolution = %raster.resolution()))]
pub fn render_with<T: Sync, P: Send>(
	raster: &Raster<T>,
	reduce: impl Fn(&T) -> P + Sync,
) -> Raster<P> {
	let resolution = raster.resolution();
	Raster::new_with(resolution, tabulate(resolution, |cell| reduce(&raster[cell])))
}

/// Evaluates `f` on every cell of the grid, in linear-index order.
///
/// Cell `i` is `(i / N, i % N)`.
pub(crate) fn tabulate<T: Send>(resolution: Resolution, f: impl Fn(Cell) -> T + Sync) -> Vec<T> {
	let n = StrengthReducedUsize::new(resolution.get());
	(0..resolution.area())
		.into_par_iter()
		.map(|i| {
			let (x, y) = StrengthReducedUsize::div_rem(i, n);
			f(Cell::new(x as isize, y as isize))
		})
		.collect()
}

#[cfg(test)]
use crate::color::V4;

#[test]
fn test_tabulate_order() {
	let res = Resolution::new(3).unwrap();
	let cells = tabulate(res, |c| (c.x, c.y));
	assert_eq!(
		cells,
		[(0, 0), (0, 1), (0, 2), (1, 0), (1, 1), (1, 2), (2, 0), (2, 1), (2, 2)]
	);
}

#[test]
fn test_render_dimensions() {
	let res = Resolution::new(5).unwrap();
	let bmp = render(&Raster::<V4>::empty(res));
	assert_eq!(bmp.resolution(), res);
	assert_eq!(bmp.as_slice().len(), 25);
	assert!(bmp.as_slice().iter().all(|&p| p == 0));
}

#[test]
fn test_render_matches_cells() {
	let res = Resolution::new(8).unwrap();
	let raster = Raster::with(res, |p| V4::opaque(p.x as f32, p.y as f32, 0.5));
	let bmp = render(&raster);
	for x in 0..8 {
		for y in 0..8 {
			let c = Cell::new(x, y);
			assert_eq!(bmp[c], raster[c].collapse());
			assert_eq!(bmp.as_slice()[(x * 8 + y) as usize], raster.as_slice()[(x * 8 + y) as usize].collapse());
		}
	}
}

#[test]
fn test_render_does_not_touch_raster() -> anyhow::Result<()> {
	let res = Resolution::new(4)?;
	let raster = Raster::empty(res).with_update([(Cell::new(1, 2), V4::opaque(1.0, 1.0, 1.0))])?;
	let copy = raster.clone();
	let a = render(&raster);
	let b = render(&raster);
	assert_eq!(raster, copy);
	assert_eq!(a, b);
	Ok(())
}

#[test]
fn test_update_then_render() -> anyhow::Result<()> {
	let res = Resolution::new(4)?;
	let c = V4::opaque(0.0, 1.0, 0.0);
	let cell = Cell::new(3, 1);
	let bmp = render(&Raster::empty(res).with_update([(cell, c)])?);
	assert_eq!(bmp[cell], c.collapse());
	assert_eq!(bmp[Cell::new(1, 3)], 0);
	Ok(())
}

#[test]
fn test_render_with() {
	let res = Resolution::new(2).unwrap();
	let raster = Raster::splat(res, 7u8);
	let out = render_with(&raster, |&v| v as u64 * 2);
	assert_eq!(out.as_slice(), [14, 14, 14, 14]);
}
