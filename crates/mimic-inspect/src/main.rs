//! Command-line inspector: load one elevation tile, print its analysis and
//! optionally export the raster and both terrain meshes.

mod http;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Serialize;

use mimic_core::pipeline::process_raster;
use mimic_core::{MeshGeometry, MimicConfig, Tile, TileSession, ViewAction, ViewState};

use http::HttpTileSource;

#[derive(Parser, Debug)]
#[command(name = "mimic-inspect", about = "Inspect a Terrarium elevation tile and its terrain mimic")]
struct Args {
    /// Tile as z/x/y. Alternatively pick one with --lng/--lat/--zoom.
    #[arg(short, long)]
    tile: Option<Tile>,

    /// Longitude of a simulated map click.
    #[arg(long, allow_hyphen_values = true, requires = "lat")]
    lng: Option<f64>,

    /// Latitude of a simulated map click.
    #[arg(long, allow_hyphen_values = true, requires = "lng")]
    lat: Option<f64>,

    /// Map zoom at the click; the tile is one level deeper.
    #[arg(long, default_value_t = 11.0)]
    zoom: f64,

    /// Read the raster from a local PNG instead of fetching it.
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// JSON config (partial; missing keys use defaults).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory for the exported raster and meshes.
    #[arg(short, long, default_value = ".")]
    output: PathBuf,

    /// Also write direct and procedural mesh JSON.
    #[arg(long)]
    mesh: bool,

    /// Noise seed of the procedural mesh.
    #[arg(long, conflicts_with = "reseed")]
    seed: Option<u32>,

    /// Draw a random noise seed.
    #[arg(long)]
    reseed: bool,

    /// HTTP timeout in seconds.
    #[arg(long, default_value_t = 30)]
    timeout: u64,
}

#[derive(Serialize)]
struct Report<'a> {
    tile: String,
    label: String,
    sample_count: usize,
    summary: Vec<(&'static str, f32)>,
    bins: &'a [u32],
    seed: u32,
}

fn resolve_tile(args: &Args) -> Result<Tile> {
    if let Some(tile) = args.tile {
        return Ok(tile);
    }
    let (Some(longitude), Some(latitude)) = (args.lng, args.lat) else {
        bail!("specify --tile z/x/y or --lng/--lat");
    };
    let view = ViewState { longitude, latitude, zoom: args.zoom, selected: None }
        .reduce(ViewAction::Click { longitude, latitude });
    view.selected.context("click did not select a tile")
}

fn write_mesh(dir: &Path, name: &str, mesh: &MeshGeometry) -> Result<()> {
    let path = dir.join(name);
    let file = std::fs::File::create(&path).with_context(|| format!("creating {}", path.display()))?;
    serde_json::to_writer(std::io::BufWriter::new(file), mesh)?;
    log::info!("wrote {} ({} vertices, {} triangles)", path.display(), mesh.vertex_count(), mesh.triangle_count());
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => MimicConfig::load(path)?,
        None => MimicConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.procedural.seed = seed;
    }
    let tile = resolve_tile(&args)?;

    let mut session = TileSession::new(config);
    if args.reseed {
        session.regenerate_mimic(&mut rand::thread_rng());
    }

    match &args.input {
        Some(path) => {
            let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
            session.select(Some(tile));
            let data = process_raster(tile, bytes, &session.config().sampling);
            session.complete(data);
        }
        None => {
            let source = HttpTileSource::new(Duration::from_secs(args.timeout))?;
            session.load(&source, tile);
        }
    }

    let Some(data) = session.data().cloned() else {
        bail!("tile {tile} did not load");
    };
    let Some(analysis) = data.analysis.clone() else {
        bail!("no elevation data for tile {tile}");
    };

    let report = Report {
        tile: tile.to_string(),
        label: tile.label(),
        sample_count: analysis.sample_count(),
        summary: analysis.summary_rows().to_vec(),
        bins: &analysis.bins,
        seed: session.procedural_config().seed,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);

    std::fs::create_dir_all(&args.output).with_context(|| format!("creating {}", args.output.display()))?;
    if let Some((name, bytes)) = data.download() {
        let path = args.output.join(name);
        std::fs::write(&path, bytes).with_context(|| format!("writing {}", path.display()))?;
        log::info!("wrote {}", path.display());
    }

    if args.mesh {
        let direct = session.direct_mesh().context("elevation grid too small for a mesh")?;
        write_mesh(&args.output, &format!("direct-{}-{}-{}.json", tile.zoom, tile.x, tile.y), &direct)?;
        let mimic = session.procedural_mesh().context("no samples for the procedural mesh")?;
        write_mesh(&args.output, &format!("mimic-{}-{}-{}.json", tile.zoom, tile.x, tile.y), &mimic)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn click_coordinates_pick_tile_one_level_deeper() {
        let args = Args::parse_from(["mimic-inspect", "--lng", "-122.4", "--lat", "37.8", "--zoom", "9.5"]);
        let tile = resolve_tile(&args).unwrap();
        assert_eq!(tile.zoom, 10);
        assert_eq!((tile.x, tile.y), (163, 395));
    }

    #[test]
    fn explicit_tile_wins() {
        let args = Args::parse_from(["mimic-inspect", "--tile", "12/2154/1434"]);
        assert_eq!(resolve_tile(&args).unwrap(), Tile::new(12, 2154, 1434).unwrap());
    }

    #[test]
    fn missing_location_is_an_error() {
        let args = Args::parse_from(["mimic-inspect"]);
        assert!(resolve_tile(&args).is_err());
    }
}
