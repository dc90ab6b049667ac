//! Diagnostic visualizer: writes PNG debug images of one tile's direct and
//! procedural meshes to data/debug/.
//!
//! Usage: `visualize [z/x/y] [terrarium.png]`. Without a raster a synthetic
//! ridge tile is used, so the tool runs offline.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use image::{Rgb, RgbImage};

use mimic_core::codec::encode;
use mimic_core::pipeline::process_raster;
use mimic_core::{MeshGeometry, MimicConfig, Tile, TileSession};

const HISTOGRAM_HEIGHT: u32 = 128;

// ── Colour helpers ────────────────────────────────────────────────────────────

fn to_rgb(c: [f32; 3]) -> Rgb<u8> {
    Rgb(c.map(|v| (v.clamp(0.0, 1.0) * 255.0).round() as u8))
}

/// Lambert shading against a light from the north-west.
fn shade(c: [f32; 3], n: [f32; 3]) -> [f32; 3] {
    const LIGHT: [f32; 3] = [-0.5, 0.5, 0.707];
    let lambert = (n[0] * LIGHT[0] + n[1] * LIGHT[1] + n[2] * LIGHT[2]).max(0.0);
    let k = 0.35 + 0.65 * lambert;
    c.map(|v| v * k)
}

// ── Images ────────────────────────────────────────────────────────────────────

/// One pixel per vertex, hypsometric colour with hillshade.
fn mesh_image(mesh: &MeshGeometry) -> RgbImage {
    RgbImage::from_fn(mesh.columns as u32, mesh.rows as u32, |x, y| {
        let i = y as usize * mesh.columns + x as usize;
        to_rgb(shade(mesh.colors[i], mesh.normals[i]))
    })
}

/// Vertex heights as grayscale, scaled to the mesh's own range.
fn height_image(mesh: &MeshGeometry) -> RgbImage {
    let (lo, hi) = mesh.height_range();
    let span = if hi > lo { hi - lo } else { 1.0 };
    RgbImage::from_fn(mesh.columns as u32, mesh.rows as u32, |x, y| {
        let h = mesh.positions[y as usize * mesh.columns + x as usize][2];
        let g = (h - lo) / span;
        to_rgb([g, g, g])
    })
}

fn histogram_image(bins: &[u32]) -> RgbImage {
    let peak = bins.iter().copied().max().unwrap_or(0).max(1) as f32;
    let mut img = RgbImage::from_pixel(bins.len() as u32 * 4, HISTOGRAM_HEIGHT, Rgb([255, 255, 255]));
    for (i, &count) in bins.iter().enumerate() {
        let bar = (count as f32 / peak * HISTOGRAM_HEIGHT as f32).round() as u32;
        for x in i as u32 * 4..i as u32 * 4 + 3 {
            for y in HISTOGRAM_HEIGHT - bar..HISTOGRAM_HEIGHT {
                img.put_pixel(x, y, Rgb([70, 130, 180]));
            }
        }
    }
    img
}

fn save(img: &RgbImage, dir: &Path, name: &str) -> Result<()> {
    let path = dir.join(name);
    img.save(&path).with_context(|| format!("failed to save {name}"))?;
    println!("Wrote {}", path.display());
    Ok(())
}

/// 256×256 Terrarium PNG: a diagonal ridge over a sloping plain.
fn synthetic_tile() -> Result<Vec<u8>> {
    let img = image::RgbaImage::from_fn(256, 256, |x, y| {
        let ridge = 1200.0 - ((x as f32 - y as f32).abs() * 12.0).min(1100.0);
        let [r, g, b] = encode(ridge + x as f32 * 2.0);
        image::Rgba([r, g, b, 255])
    });
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png)?;
    Ok(out.into_inner())
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let tile: Tile = match args.next() {
        Some(s) => s.parse()?,
        None => Tile::new(12, 2132, 1442)?,
    };
    let bytes = match args.next() {
        Some(path) => fs::read(&path).with_context(|| format!("cannot read {path}"))?,
        None => synthetic_tile()?,
    };

    let mut config = MimicConfig::default();
    config.sampling.grid_size = 128;
    let mut session = TileSession::new(config);
    session.select(Some(tile));
    let data = process_raster(tile, bytes, &session.config().sampling);
    session.complete(data);

    let analysis = session
        .data()
        .and_then(|d| d.analysis.clone())
        .context("raster has no elevation data")?;
    println!(
        "Tile {tile}: min {} max {} mean {} std {} ({} samples)",
        analysis.min,
        analysis.max,
        analysis.mean,
        analysis.std,
        analysis.sample_count()
    );

    let out_dir = Path::new("data/debug");
    fs::create_dir_all(out_dir).context("cannot create data/debug/")?;

    let direct = session.direct_mesh().context("grid too small for a mesh")?;
    save(&mesh_image(&direct), out_dir, "direct_colors.png")?;
    save(&height_image(&direct), out_dir, "direct_heights.png")?;

    let mimic = session.procedural_mesh().context("no samples for the mimic")?;
    save(&mesh_image(&mimic), out_dir, "mimic_colors.png")?;
    save(&height_image(&mimic), out_dir, "mimic_heights.png")?;

    save(&histogram_image(&analysis.bins), out_dir, "histogram.png")?;
    Ok(())
}
