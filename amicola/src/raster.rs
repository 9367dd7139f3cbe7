use crate::color::Color;
use crate::grid::{Cell, Point, Resolution};
use crate::render::tabulate;
use crate::Error;

/// An `N × N` grid of cell values.
///
/// Stored flat, with cell `(x, y)` at index `x * N + y`. A raster is never changed in
/// place; [`with_update`](Self::with_update) returns a modified copy.
#[derive(Clone, PartialEq, Eq)]
pub struct Raster<T> {
	resolution: Resolution,
	data: Vec<T>,
}

impl<T> std::fmt::Debug for Raster<T> {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		f.debug_struct("Raster")
			.field("resolution", &self.resolution)
			.finish_non_exhaustive()
	}
}

impl<T> Raster<T> {
	/// A raster where every cell is [`Color::EMPTY`].
	pub fn empty(resolution: Resolution) -> Self
	where
		T: Color + Clone,
	{
		Self::splat(resolution, T::EMPTY)
	}

	pub fn splat(resolution: Resolution, val: T) -> Self
	where
		T: Clone,
	{
		Self::new_with(resolution, vec![val; resolution.area()])
	}

	/// Generates a raster by calling `f` with the lower-left corner of each cell.
	///
	/// `f` is called exactly once per cell, possibly from several threads.
	#[tracing::instrument(level = "debug", skip_all, fields(resolution = %resolution))]
	pub fn with(resolution: Resolution, f: impl Fn(Point) -> T + Sync) -> Self
	where
		T: Send,
	{
		Self::new_with(resolution, tabulate(resolution, |cell| f(resolution.from_pixel(cell))))
	}

	pub(crate) fn new_with(resolution: Resolution, data: Vec<T>) -> Self {
		assert_eq!(data.len(), resolution.area());
		Raster { resolution, data }
	}

	/// Returns a copy of this raster with the given cells replaced.
	///
	/// Updates are applied in iteration order, so a later update to the same cell wins.
	/// Fails on the first update that lies outside the grid; `self` is left untouched
	/// either way.
	pub fn with_update(&self, updates: impl IntoIterator<Item = (Cell, T)>) -> Result<Self, Error>
	where
		T: Clone,
	{
		let mut data = self.data.clone();
		let mut count = 0usize;
		for (cell, val) in updates {
			data[self.resolution.index(cell)?] = val;
			count += 1;
		}
		tracing::trace!(count, resolution = %self.resolution, "applied raster updates");
		Ok(Raster {
			resolution: self.resolution,
			data,
		})
	}

	pub fn resolution(&self) -> Resolution {
		self.resolution
	}

	pub fn get(&self, cell: Cell) -> Result<&T, Error> {
		Ok(&self.data[self.resolution.index(cell)?])
	}

	/// The flat cell storage, in `x * N + y` order.
	pub fn as_slice(&self) -> &[T] {
		&self.data
	}

	/// Every cell with its value, in storage order.
	pub fn cells(&self) -> impl Iterator<Item = (Cell, &T)> + '_ {
		let n = self.resolution.get();
		self.data
			.iter()
			.enumerate()
			.map(move |(i, v)| (Cell::new((i / n) as isize, (i % n) as isize), v))
	}

	pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> Raster<U> {
		Raster::new_with(self.resolution, self.data.iter().map(f).collect())
	}
}

impl<T> std::ops::Index<Cell> for Raster<T> {
	type Output = T;

	/// # Panics
	/// Panics if `cell` is outside the grid.
	fn index(&self, cell: Cell) -> &T {
		match self.get(cell) {
			Ok(v) => v,
			Err(e) => panic!("{e}"),
		}
	}
}

#[cfg(test)]
use crate::color::V4;

#[cfg(test)]
const RED: V4 = V4::opaque(1.0, 0.0, 0.0);
#[cfg(test)]
const BLUE: V4 = V4::opaque(0.0, 0.0, 1.0);

#[test]
fn test_empty() {
	for n in [1, 4, 33] {
		let res = Resolution::new(n).unwrap();
		let r = Raster::<V4>::empty(res);
		assert_eq!(r.as_slice().len(), n * n);
		assert!(r.as_slice().iter().all(|c| *c == V4::EMPTY));
	}
}

#[test]
fn test_with_generator() {
	let res = Resolution::new(4).unwrap();
	let r = Raster::with(res, |p| (p.x, p.y));
	for x in 0..4 {
		for y in 0..4 {
			let expect = (res.from_raster_coord(x), res.from_raster_coord(y));
			assert_eq!(r.as_slice()[(x * 4 + y) as usize], expect);
			assert_eq!(r[Cell::new(x, y)], expect);
		}
	}
	assert_eq!(r[Cell::new(1, 3)], (0.25, 0.75));
}

#[test]
fn test_with_calls_once_per_cell() {
	use std::sync::atomic::{AtomicUsize, Ordering};
	let res = Resolution::new(16).unwrap();
	let calls = AtomicUsize::new(0);
	let r = Raster::with(res, |_| calls.fetch_add(1, Ordering::Relaxed));
	assert_eq!(calls.into_inner(), 256);
	let mut seen = r.as_slice().to_vec();
	seen.sort();
	assert_eq!(seen, (0..256).collect::<Vec<_>>());
}

#[test]
fn test_empty_update() -> anyhow::Result<()> {
	let res = Resolution::new(4)?;
	let r = Raster::with(res, |p| V4::opaque(p.x as f32, p.y as f32, 0.0));
	assert_eq!(r.with_update([])?, r);
	Ok(())
}

#[test]
fn test_single_update() -> anyhow::Result<()> {
	let res = Resolution::new(4)?;
	let base = Raster::<V4>::empty(res);
	let r = base.with_update([(Cell::new(2, 1), RED)])?;
	assert_eq!(r.as_slice()[2 * 4 + 1], RED);
	for (cell, v) in r.cells() {
		if cell != Cell::new(2, 1) {
			assert_eq!(*v, base[cell]);
		}
	}
	assert!(base.as_slice().iter().all(|c| *c == V4::EMPTY));
	Ok(())
}

#[test]
fn test_last_write_wins() -> anyhow::Result<()> {
	let res = Resolution::new(4)?;
	let r = Raster::<V4>::empty(res).with_update([
		(Cell::new(0, 0), RED),
		(Cell::new(0, 0), BLUE),
	])?;
	assert_eq!(r.as_slice()[0], BLUE);
	Ok(())
}

#[test]
fn test_update_out_of_range() {
	let res = Resolution::new(4).unwrap();
	let base = Raster::<V4>::empty(res);
	for cell in [Cell::new(4, 0), Cell::new(0, 4), Cell::new(-1, 2), Cell::new(1, -1)] {
		let err = base.with_update([(Cell::new(0, 0), RED), (cell, BLUE)]).unwrap_err();
		assert_eq!(err, Error::OutOfRange { cell, resolution: res });
	}
	let outside = res.to_pixel(Point::new(1.0, 0.5));
	assert!(base.with_update([(outside, RED)]).is_err());
	assert_eq!(base, Raster::empty(res));
}

#[test]
fn test_get() {
	let res = Resolution::new(2).unwrap();
	let r = Raster::with(res, |p| p.x + p.y);
	assert_eq!(r.get(Cell::new(1, 1)), Ok(&1.0));
	assert!(r.get(Cell::new(2, 0)).is_err());
}

#[test]
#[should_panic]
fn test_index_out_of_range() {
	let res = Resolution::new(2).unwrap();
	let _ = Raster::splat(res, 0u8)[Cell::new(0, 2)];
}

#[test]
fn test_cells_order() {
	let res = Resolution::new(2).unwrap();
	let r = Raster::splat(res, ());
	let cells = r.cells().map(|(c, _)| c).collect::<Vec<_>>();
	assert_eq!(cells, [Cell::new(0, 0), Cell::new(0, 1), Cell::new(1, 0), Cell::new(1, 1)]);
}

#[test]
fn test_map() {
	let res = Resolution::new(3).unwrap();
	let r = Raster::with(res, |p| V4::opaque(p.x as f32, 0.0, 0.0)).map(Color::collapse);
	assert_eq!(r.resolution(), res);
	assert_eq!(r[Cell::new(0, 2)], 0);
	assert_eq!(r[Cell::new(2, 0)], 0xAA0000);
}

#[test]
fn test_debug_is_short() {
	let res = Resolution::new(64).unwrap();
	let s = format!("{:?}", Raster::<V4>::empty(res));
	assert!(s.starts_with("Raster"));
	assert!(s.len() < 80);
}
