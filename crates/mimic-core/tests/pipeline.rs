//! End-to-end: select a tile, load it from an in-memory source, and build
//! both meshes from the published data.
use std::io::Cursor;
use std::sync::Arc;

use image::{ImageFormat, Rgba, RgbaImage};
use mimic_core::codec::encode;
use mimic_core::pipeline::{load_tile, PanelState};
use mimic_core::{MemorySource, MimicConfig, Tile, TileSession, ViewAction, ViewState};

/// A 256×256 Terrarium tile with a single smooth hill.
fn hill_png() -> Vec<u8> {
    let img = RgbaImage::from_fn(256, 256, |x, y| {
        let dx = x as f32 - 128.0;
        let dy = y as f32 - 128.0;
        let elev = 1500.0 - (dx * dx + dy * dy).sqrt() * 8.0;
        let [r, g, b] = encode(elev);
        Rgba([r, g, b, 255])
    });
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

fn small_config() -> MimicConfig {
    let mut cfg = MimicConfig::default();
    cfg.procedural.resolution = 32;
    cfg
}

#[test]
fn click_load_and_mesh() {
    let cfg = small_config();
    let view = ViewState { longitude: 7.65, latitude: 45.97, zoom: 11.3, selected: None }
        .reduce(ViewAction::Click { longitude: 7.65, latitude: 45.97 });
    let tile = view.selected.unwrap();
    assert_eq!(tile.zoom, 12);

    let mut source = MemorySource::new();
    source.insert(tile.url(&cfg.elevation_url), hill_png());

    let mut session = TileSession::new(cfg);
    let req = session.select(view.selected).unwrap();
    assert!(matches!(session.panel(), PanelState::Loading(t) if t == tile));
    let data = load_tile(&source, req.tile, session.config());
    assert!(session.complete(data));

    let analysis = Arc::clone(session.data().unwrap().analysis.as_ref().unwrap());
    assert_eq!(analysis.max, 1500.0);
    assert!(analysis.min < analysis.mean && analysis.mean < analysis.max);
    assert_eq!(analysis.bins.iter().map(|&b| b as usize).sum::<usize>(), analysis.sample_count());

    let direct = session.direct_mesh().unwrap();
    assert_eq!((direct.columns, direct.rows), (32, 32));
    let procedural = session.procedural_mesh().unwrap();
    assert_eq!((procedural.columns, procedural.rows), (32, 32));

    // Both meshes share the height transform, so neither exceeds the tile's relief.
    let top = direct.height_range().1.max(procedural.height_range().1);
    let scale = mimic_core::TerrainScale::for_tile(&tile, session.config().mesh.plane_size);
    assert!(top <= scale.height(analysis.max, analysis.min) + 1e-3);

    let json = serde_json::to_string(&*procedural).unwrap();
    assert!(json.contains("\"positions\""));
}

#[test]
fn late_result_for_previous_tile_is_ignored() {
    let cfg = small_config();
    let a = Tile::new(6, 10, 20).unwrap();
    let b = Tile::new(6, 11, 20).unwrap();
    let mut source = MemorySource::new();
    source.insert(a.url(&cfg.elevation_url), hill_png());
    source.insert(b.url(&cfg.elevation_url), hill_png());

    let mut session = TileSession::new(cfg);
    let req_a = session.select(Some(a)).unwrap();
    let req_b = session.select(Some(b)).unwrap();

    // B resolves first, then A's slow response arrives.
    assert!(session.complete(load_tile(&source, req_b.tile, session.config())));
    assert!(!session.complete(load_tile(&source, req_a.tile, session.config())));
    assert_eq!(session.data().unwrap().tile, b);
}

#[test]
fn failed_fetch_shows_no_data_without_meshes() {
    let tile = Tile::new(8, 1, 1).unwrap();
    let mut session = TileSession::new(small_config());
    assert!(session.load(&MemorySource::new(), tile));
    match session.panel() {
        PanelState::Ready(data) => assert!(!data.has_data()),
        other => panic!("expected ready panel, got {other:?}"),
    }
    assert!(session.direct_mesh().is_none());
    assert!(session.procedural_mesh().is_none());
}
