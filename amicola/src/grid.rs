use std::num::NonZeroUsize;

use crate::Error;

/// Side length of the square raster, in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Resolution(NonZeroUsize);

impl Resolution {
	pub const DEFAULT: Resolution = match NonZeroUsize::new(256) {
		Some(n) => Resolution(n),
		None => unreachable!(),
	};

	/// Fails if `n` is zero or `n * n` overflows `usize`.
	pub fn new(n: usize) -> Result<Self, Error> {
		match (NonZeroUsize::new(n), n.checked_mul(n)) {
			(Some(n), Some(_)) => Ok(Resolution(n)),
			_ => Err(Error::InvalidResolution(n)),
		}
	}

	pub fn get(self) -> usize {
		self.0.get()
	}

	/// Number of cells in the grid, `N * N`.
	pub fn area(self) -> usize {
		self.get() * self.get()
	}

	/// `floor(N * c)`.
	///
	/// Values outside `[0, 1)` give cells outside the grid; they are not clamped here.
	/// Non-finite input saturates (NaN becomes 0).
	///
	/// The result is nudged by one when rounding in `N * c` disagrees with
	/// [`from_raster_coord`](Self::from_raster_coord) about which side of a cell edge `c`
	/// lies on, so that every cell edge maps back to its own cell.
	#[inline]
	pub fn to_raster_coord(self, c: f64) -> isize {
		let k = (self.get() as f64 * c).floor() as isize;
		if !c.is_finite() || k == isize::MIN || k == isize::MAX {
			k
		} else if self.from_raster_coord(k + 1) <= c {
			k + 1
		} else if self.from_raster_coord(k) > c {
			k - 1
		} else {
			k
		}
	}

	/// `i / N`, the lower edge of cell `i`.
	#[inline]
	pub fn from_raster_coord(self, i: isize) -> f64 {
		i as f64 / self.get() as f64
	}

	pub fn to_pixel(self, p: Point) -> Cell {
		Cell::new(self.to_raster_coord(p.x), self.to_raster_coord(p.y))
	}

	/// Lower-left corner of `cell` in the unit square.
	///
	/// `to_pixel(from_pixel(c)) == c` for every cell in the grid, but the converse only
	/// holds for points that already sit on a cell corner.
	pub fn from_pixel(self, cell: Cell) -> Point {
		Point::new(self.from_raster_coord(cell.x), self.from_raster_coord(cell.y))
	}

	pub fn contains(self, cell: Cell) -> bool {
		let n = self.get();
		usize::try_from(cell.x).is_ok_and(|x| x < n) && usize::try_from(cell.y).is_ok_and(|y| y < n)
	}

	/// Linear storage index of `cell`, `x * N + y`.
	pub(crate) fn index(self, cell: Cell) -> Result<usize, Error> {
		if self.contains(cell) {
			Ok(cell.x as usize * self.get() + cell.y as usize)
		} else {
			Err(Error::OutOfRange {
				cell,
				resolution: self,
			})
		}
	}
}

impl Default for Resolution {
	fn default() -> Self {
		Self::DEFAULT
	}
}

impl std::fmt::Display for Resolution {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		write!(f, "{0}×{0}", self.get())
	}
}

/// Integer address of a raster cell. May lie outside the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(from = "[isize; 2]", into = "[isize; 2]")]
pub struct Cell {
	pub x: isize,
	pub y: isize,
}

impl Cell {
	pub const fn new(x: isize, y: isize) -> Self {
		Cell { x, y }
	}
}

impl From<[isize; 2]> for Cell {
	fn from([x, y]: [isize; 2]) -> Self {
		Cell { x, y }
	}
}

impl From<Cell> for [isize; 2] {
	fn from(c: Cell) -> Self {
		[c.x, c.y]
	}
}

impl std::fmt::Display for Cell {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		write!(f, "({}, {})", self.x, self.y)
	}
}

/// A location on the unit-square drawing surface.
#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize, serde::Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Point {
	pub x: f64,
	pub y: f64,
}

impl Point {
	pub const fn new(x: f64, y: f64) -> Self {
		Point { x, y }
	}
}

impl From<[f64; 2]> for Point {
	fn from([x, y]: [f64; 2]) -> Self {
		Point { x, y }
	}
}

impl From<Point> for [f64; 2] {
	fn from(p: Point) -> Self {
		[p.x, p.y]
	}
}

pub fn to_raster_coord(c: f64) -> isize {
	Resolution::DEFAULT.to_raster_coord(c)
}

pub fn from_raster_coord(i: isize) -> f64 {
	Resolution::DEFAULT.from_raster_coord(i)
}

pub fn to_pixel(p: Point) -> Cell {
	Resolution::DEFAULT.to_pixel(p)
}

pub fn from_pixel(cell: Cell) -> Point {
	Resolution::DEFAULT.from_pixel(cell)
}

#[cfg(test)]
fn res(n: usize) -> Resolution {
	Resolution::new(n).unwrap()
}

#[test]
fn test_zero_resolution() {
	assert_eq!(Resolution::new(0), Err(Error::InvalidResolution(0)));
	assert_eq!(Resolution::default().get(), 256);
}

#[test]
fn test_resolution_area_overflow() {
	let side = 1usize << (usize::BITS / 2);
	assert_eq!(Resolution::new(side), Err(Error::InvalidResolution(side)));
	assert_eq!(Resolution::new(usize::MAX), Err(Error::InvalidResolution(usize::MAX)));
	let largest = side - 1;
	assert_eq!(Resolution::new(largest).map(Resolution::area), Ok(largest * largest));
}

#[test]
fn test_coord_examples() {
	let r = res(4);
	assert_eq!(r.to_raster_coord(0.3), 1);
	assert_eq!(r.from_raster_coord(1), 0.25);
	assert_eq!(r.to_raster_coord(0.99), 3);
	assert_eq!(r.to_raster_coord(1.0), 4);
	assert!(!r.contains(Cell::new(4, 0)));
	assert_eq!(r.to_raster_coord(-0.1), -1);
	assert!(!r.contains(Cell::new(0, -1)));
}

#[test]
fn test_non_finite() {
	let r = res(4);
	assert_eq!(r.to_raster_coord(f64::NAN), 0);
	assert_eq!(r.to_raster_coord(f64::INFINITY), isize::MAX);
	assert_eq!(r.to_raster_coord(f64::NEG_INFINITY), isize::MIN);
}

#[test]
fn test_pixel_round_trip() {
	for n in [1, 3, 4, 7, 22, 49, 97, 256, 1000] {
		let r = res(n);
		for x in 0..n as isize {
			for y in 0..n as isize {
				let c = Cell::new(x, y);
				assert_eq!(r.to_pixel(r.from_pixel(c)), c);
			}
		}
	}
}

#[test]
fn test_pixel_is_lossy() {
	let r = res(4);
	let p = Point::new(0.3, 0.6);
	assert_eq!(r.to_pixel(p), Cell::new(1, 2));
	assert_eq!(r.from_pixel(r.to_pixel(p)), Point::new(0.25, 0.5));
	assert_ne!(r.from_pixel(r.to_pixel(p)), p);
}

#[test]
fn test_index() {
	let r = res(4);
	assert_eq!(r.index(Cell::new(0, 0)).unwrap(), 0);
	assert_eq!(r.index(Cell::new(0, 3)).unwrap(), 3);
	assert_eq!(r.index(Cell::new(1, 0)).unwrap(), 4);
	assert_eq!(r.index(Cell::new(3, 3)).unwrap(), 15);
	assert!(r.index(Cell::new(-1, 0)).is_err());
	assert!(r.index(Cell::new(0, 4)).is_err());
}

#[test]
fn test_default_free_functions() {
	assert_eq!(to_raster_coord(0.5), 128);
	assert_eq!(from_raster_coord(64), 0.25);
	assert_eq!(to_pixel(from_pixel(Cell::new(10, 200))), Cell::new(10, 200));
}
