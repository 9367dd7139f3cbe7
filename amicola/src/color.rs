/// A cell value that can be stored in a [`Raster`](crate::Raster) and collapsed to a pixel.
pub trait Color: Sized {
	/// The value of a cell nothing has been drawn to.
	const EMPTY: Self;

	/// Packs the color into a bitmap pixel.
	fn collapse(&self) -> u32;
}

/// Straight RGBA with normalized channels.
#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize, serde::Deserialize)]
#[serde(from = "[f32; 4]", into = "[f32; 4]")]
pub struct V4 {
	pub r: f32,
	pub g: f32,
	pub b: f32,
	pub a: f32,
}

impl V4 {
	pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
		V4 { r, g, b, a }
	}

	pub const fn opaque(r: f32, g: f32, b: f32) -> Self {
		V4 { r, g, b, a: 1.0 }
	}
}

impl Color for V4 {
	const EMPTY: V4 = V4::new(0.0, 0.0, 0.0, 0.0);

	/// `0x00RRGGBB`. Alpha does not take part.
	fn collapse(&self) -> u32 {
		u32::from_le_bytes([channel(self.b), channel(self.g), channel(self.r), 0])
	}
}

fn channel(v: f32) -> u8 {
	// NaN falls through clamp and saturates to 0
	(v.clamp(0.0, 1.0) * 255.0).round() as u8
}

impl From<[f32; 4]> for V4 {
	fn from([r, g, b, a]: [f32; 4]) -> Self {
		V4 { r, g, b, a }
	}
}

impl From<V4> for [f32; 4] {
	fn from(c: V4) -> Self {
		[c.r, c.g, c.b, c.a]
	}
}

#[test]
fn test_collapse() {
	assert_eq!(V4::EMPTY.collapse(), 0);
	assert_eq!(V4::opaque(1.0, 0.0, 0.0).collapse(), 0xFF0000);
	assert_eq!(V4::opaque(0.0, 1.0, 0.0).collapse(), 0x00FF00);
	assert_eq!(V4::opaque(0.0, 0.0, 1.0).collapse(), 0x0000FF);
	assert_eq!(V4::new(0.5, 0.5, 0.5, 0.0).collapse(), 0x808080);
}

#[test]
fn test_collapse_clamps() {
	assert_eq!(V4::opaque(2.0, -1.0, f32::NAN).collapse(), 0xFF0000);
}

#[test]
fn test_serde() -> anyhow::Result<()> {
	let c: V4 = serde_json::from_str("[0.25, 0.5, 0.75, 1.0]")?;
	assert_eq!(c, V4::new(0.25, 0.5, 0.75, 1.0));
	assert_eq!(serde_json::to_string(&c)?, "[0.25,0.5,0.75,1.0]");
	Ok(())
}
