use std::io::Write;

use amicola::{Bitmap, Resolution};
use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use clap::ValueHint;
use eyre_span::emit;

mod scene;

#[derive(Debug, Clone, Parser)]
#[command(arg_required_else_help = true)]
struct Cli {
	/// Grid resolution to draw at, overriding the one given in each scene
	#[clap(long, short, value_parser = clap::value_parser!(u32).range(1..))]
	resolution: Option<u32>,

	/// Print the rendered pixels to stdout
	///
	/// One line per column of the grid, each pixel as six hex digits (RRGGBB).
	#[clap(long, verbatim_doc_comment)]
	dump: bool,

	/// The scene files to render
	#[clap(value_hint = ValueHint::FilePath, required = true)]
	file: Vec<Utf8PathBuf>,
}

impl Cli {
	fn resolution(&self) -> Result<Option<Resolution>, amicola::Error> {
		self.resolution.map(|n| Resolution::new(n as usize)).transpose()
	}
}

/// Environment variable holding log directives; `RUST_LOG` is consulted when it is unset.
const LOG_ENV: &str = "AMICOLA_LOG";

fn main() -> eyre::Result<()> {
	let cli = Cli::parse();
	init_logging(std::env::var(LOG_ENV).or_else(|_| std::env::var("RUST_LOG")).ok().as_deref())?;

	let over = cli.resolution()?;
	tracing::debug!(files = cli.file.len(), ?over, "rendering scenes");
	for file in &cli.file {
		emit(process(&cli, over, file));
	}

	Ok(())
}

fn log_filter(directives: Option<&str>) -> Result<tracing_subscriber::EnvFilter, eyre::Error> {
	Ok(tracing_subscriber::EnvFilter::try_new(directives.unwrap_or("info"))?)
}

fn init_logging(directives: Option<&str>) -> Result<(), eyre::Error> {
	use tracing_subscriber::prelude::*;
	tracing_subscriber::registry()
		.with(log_filter(directives)?)
		.with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
		.with(tracing_error::ErrorLayer::default())
		.init();
	eyre_span::install()?;
	Ok(())
}

#[tracing::instrument(skip_all, fields(path=%file))]
fn process(cli: &Cli, over: Option<Resolution>, file: &Utf8Path) -> eyre::Result<()> {
	let data = std::fs::read(file)?;
	let scene = tracing::info_span!("parse_scene").in_scope(|| scene::Scene::parse(&data))?;
	let raster = scene.raster(over)?;
	let bitmap = amicola::render(&raster);

	let stats = Stats::of(&bitmap);
	tracing::info!(
		resolution = %bitmap.resolution(),
		painted = stats.painted,
		colors = stats.colors,
		"rendered {} updates",
		scene.updates.len()
	);

	if cli.dump {
		dump(std::io::stdout().lock(), &bitmap)?;
	}
	Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Stats {
	/// Pixels that are not black.
	painted: usize,
	colors: usize,
}

impl Stats {
	fn of(bitmap: &Bitmap) -> Self {
		let pixels = bitmap.as_slice();
		let mut distinct = pixels.to_vec();
		distinct.sort_unstable();
		distinct.dedup();
		Stats {
			painted: pixels.iter().filter(|&&p| p != 0).count(),
			colors: distinct.len(),
		}
	}
}

fn dump(mut w: impl Write, bitmap: &Bitmap) -> std::io::Result<()> {
	for column in bitmap.as_slice().chunks(bitmap.resolution().get()) {
		let line = column
			.iter()
			.map(|p| format!("{p:06X}"))
			.collect::<Vec<_>>()
			.join(" ");
		writeln!(w, "{line}")?;
	}
	Ok(())
}

#[cfg(test)]
fn sample_bitmap() -> Bitmap {
	use amicola::{Cell, Raster, V4};
	let res = Resolution::new(2).unwrap();
	let raster = Raster::empty(res)
		.with_update([
			(Cell::new(0, 1), V4::opaque(1.0, 0.0, 0.0)),
			(Cell::new(1, 1), V4::opaque(1.0, 0.0, 0.0)),
			(Cell::new(1, 0), V4::opaque(0.0, 0.0, 1.0)),
		])
		.unwrap();
	amicola::render(&raster)
}

#[test]
fn test_stats() {
	assert_eq!(
		Stats::of(&sample_bitmap()),
		Stats {
			painted: 3,
			colors: 3
		}
	);
}

#[test]
fn test_dump() -> eyre::Result<()> {
	let mut out = Vec::new();
	dump(&mut out, &sample_bitmap())?;
	assert_eq!(String::from_utf8(out)?, "000000 FF0000\n0000FF FF0000\n");
	Ok(())
}

#[test]
fn test_cli() {
	use clap::CommandFactory;
	Cli::command().debug_assert();
	let cli = Cli::try_parse_from(["amicola", "-r", "64", "--dump", "a.json", "b.json"]).unwrap();
	assert_eq!(cli.resolution, Some(64));
	assert!(cli.dump);
	assert_eq!(cli.file.len(), 2);
	assert!(Cli::try_parse_from(["amicola", "-r", "0", "a.json"]).is_err());
}

#[test]
fn test_log_filter() {
	assert!(log_filter(None).is_ok());
	assert!(log_filter(Some("amicola=trace,warn")).is_ok());
}

#[test]
fn test_resolution_override() -> eyre::Result<()> {
	let cli = Cli::try_parse_from(["amicola", "--resolution", "49", "a.json"])?;
	assert_eq!(cli.resolution()?, Some(Resolution::new(49)?));
	let cli = Cli::try_parse_from(["amicola", "a.json"])?;
	assert_eq!(cli.resolution()?, None);
	Ok(())
}
