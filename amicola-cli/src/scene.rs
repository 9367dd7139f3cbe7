use amicola::{Cell, Point, Raster, Resolution, V4};

/// A raster description: a background and an ordered list of cell updates.
#[derive(Debug, Clone, PartialEq, Default, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scene {
	#[serde(default)]
	pub resolution: Option<usize>,
	#[serde(default)]
	pub background: Option<V4>,
	#[serde(default)]
	pub updates: Vec<Update>,
}

#[derive(Debug, Clone, Copy, PartialEq, serde::Deserialize)]
pub struct Update {
	#[serde(flatten)]
	pub target: Target,
	pub color: V4,
}

/// Where an update lands: either a cell directly, or a point on the unit square.
#[derive(Debug, Clone, Copy, PartialEq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
	Cell(Cell),
	Point(Point),
}

impl Target {
	pub fn cell(self, resolution: Resolution) -> Cell {
		match self {
			Target::Cell(cell) => cell,
			Target::Point(p) => resolution.to_pixel(p),
		}
	}
}

impl Scene {
	pub fn parse(bytes: &[u8]) -> eyre::Result<Self> {
		Ok(serde_json::from_slice(bytes)?)
	}

	/// The resolution to draw at: `over` if given, else the scene's own, else the default.
	pub fn resolution(&self, over: Option<Resolution>) -> Result<Resolution, amicola::Error> {
		match (over, self.resolution) {
			(Some(res), _) => Ok(res),
			(None, Some(n)) => Resolution::new(n),
			(None, None) => Ok(Resolution::DEFAULT),
		}
	}

	#[tracing::instrument(skip_all, fields(updates = self.updates.len()))]
	pub fn raster(&self, over: Option<Resolution>) -> Result<Raster<V4>, amicola::Error> {
		let resolution = self.resolution(over)?;
		let base = match self.background {
			Some(bg) => Raster::splat(resolution, bg),
			None => Raster::empty(resolution),
		};
		base.with_update(self.updates.iter().map(|u| (u.target.cell(resolution), u.color)))
	}
}

#[cfg(test)]
#[filetest::filetest("../../samples/scenes/*.json")]
fn test_render_all(bytes: &[u8]) -> Result<(), eyre::Error> {
	use amicola::Color as _;
	let scene = Scene::parse(bytes)?;
	let raster = scene.raster(None)?;
	let bitmap = amicola::render(&raster);
	assert_eq!(bitmap.resolution(), scene.resolution(None)?);
	for u in &scene.updates {
		let cell = u.target.cell(raster.resolution());
		let last = scene.updates.iter().rev().find(|v| v.target.cell(raster.resolution()) == cell);
		assert_eq!(last.map(|v| v.color.collapse()), Some(bitmap[cell]));
	}
	Ok(())
}

#[test]
fn test_parse() -> Result<(), eyre::Error> {
	let scene = Scene::parse(br#"{
		"resolution": 4,
		"updates": [
			{ "cell": [1, 2], "color": [1, 0, 0, 1] },
			{ "point": [0.3, 0.6], "color": [0, 0, 1, 1] }
		]
	}"#)?;
	assert_eq!(scene.resolution, Some(4));
	assert_eq!(scene.background, None);
	assert_eq!(scene.updates[0].target, Target::Cell(Cell::new(1, 2)));
	assert_eq!(scene.updates[1].target, Target::Point(Point::new(0.3, 0.6)));

	let raster = scene.raster(None)?;
	assert_eq!(raster[Cell::new(1, 2)], V4::opaque(0.0, 0.0, 1.0));
	Ok(())
}

#[test]
fn test_unknown_field() {
	assert!(Scene::parse(br#"{ "size": 4 }"#).is_err());
}

#[test]
fn test_resolution_override() -> Result<(), eyre::Error> {
	let scene = Scene::parse(br#"{ "resolution": 4 }"#)?;
	let over = Resolution::new(8)?;
	assert_eq!(scene.raster(Some(over))?.resolution(), over);
	assert_eq!(Scene::default().resolution(None)?, Resolution::DEFAULT);
	assert!(Scene::parse(br#"{ "resolution": 0 }"#)?.raster(None).is_err());
	Ok(())
}

#[test]
fn test_out_of_range() -> Result<(), eyre::Error> {
	let scene = Scene::parse(br#"{
		"resolution": 4,
		"updates": [{ "point": [1.0, 0.5], "color": [1, 1, 1, 1] }]
	}"#)?;
	let err = scene.raster(None).unwrap_err();
	assert_eq!(
		err,
		amicola::Error::OutOfRange {
			cell: Cell::new(4, 2),
			resolution: Resolution::new(4)?,
		}
	);
	Ok(())
}

#[test]
#[cfg(target_pointer_width = "64")]
fn test_unaddressable_resolution() -> Result<(), eyre::Error> {
	let scene = Scene::parse(br#"{
		"resolution": 4294967296,
		"updates": [{ "cell": [0, 1], "color": [1, 1, 1, 1] }]
	}"#)?;
	assert_eq!(scene.raster(None).unwrap_err(), amicola::Error::InvalidResolution(1 << 32));
	Ok(())
}
