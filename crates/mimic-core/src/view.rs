//! Map view state: centre, zoom and the selected tile, updated through a
//! reducer and round-tripped through a shareable query string.
use serde::{Deserialize, Serialize};

use crate::tile::{LatLon, Tile, MAX_ZOOM};

const DEFAULT_ZOOM: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub longitude: f64,
    pub latitude: f64,
    pub zoom: f64,
    pub selected: Option<Tile>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self { longitude: 0.0, latitude: 0.0, zoom: DEFAULT_ZOOM, selected: None }
    }
}

/// Events from the map widget.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewAction {
    /// Pan/zoom finished.
    Move { longitude: f64, latitude: f64, zoom: f64 },
    /// Map clicked at a geographic point.
    Click { longitude: f64, latitude: f64 },
    /// Selection set directly (history navigation, panel close).
    Select(Option<Tile>),
}

/// Zoom of the tile picked by a click at map zoom `zoom`: one level deeper.
pub fn click_zoom(zoom: f64) -> u32 {
    let z = (zoom + 1.0).floor();
    if z.is_finite() {
        z.clamp(0.0, MAX_ZOOM as f64) as u32
    } else {
        0
    }
}

/// Hillshade layer opacity: fades in with zoom, never below 0.15.
pub fn hillshade_intensity(zoom: f64) -> f64 {
    (zoom / 20.0 - 0.1).clamp(0.15, 1.0)
}

impl ViewState {
    /// Apply `action`, returning the next state.
    ///
    /// Clicking inside the selected tile deselects it.
    pub fn reduce(self, action: ViewAction) -> Self {
        match action {
            ViewAction::Move { longitude, latitude, zoom } => Self { longitude, latitude, zoom, ..self },
            ViewAction::Click { longitude, latitude } => {
                let tile = Tile::from_latlon(LatLon::new(latitude, longitude), click_zoom(self.zoom));
                let selected = if self.selected == Some(tile) { None } else { Some(tile) };
                Self { selected, ..self }
            }
            ViewAction::Select(selected) => Self { selected, ..self },
        }
    }

    pub fn hillshade_intensity(&self) -> f64 {
        hillshade_intensity(self.zoom)
    }

    /// `lng=..&lat=..&zoom=..[&tile=z/x/y]` with fixed decimals.
    pub fn to_query(&self) -> String {
        let mut q = format!("lng={:.5}&lat={:.5}&zoom={:.2}", self.longitude, self.latitude, self.zoom);
        if let Some(tile) = self.selected {
            q.push_str(&format!("&tile={tile}"));
        }
        q
    }

    /// Parse a query string (leading `?` optional). Unknown keys are ignored;
    /// missing or malformed values keep their defaults.
    pub fn from_query(query: &str) -> Self {
        let mut state = Self::default();
        let query = query.strip_prefix('?').unwrap_or(query);
        for pair in query.split('&') {
            let Some((key, value)) = pair.split_once('=') else { continue };
            match key {
                "lng" => set_finite(&mut state.longitude, value),
                "lat" => set_finite(&mut state.latitude, value),
                "zoom" => set_finite(&mut state.zoom, value),
                "tile" => match value.replace("%2F", "/").replace("%2f", "/").parse::<Tile>() {
                    Ok(tile) => state.selected = Some(tile),
                    Err(e) => log::debug!("ignoring tile in query: {e}"),
                },
                _ => {}
            }
        }
        state
    }
}

fn set_finite(slot: &mut f64, value: &str) {
    if let Ok(v) = value.parse::<f64>() {
        if v.is_finite() {
            *slot = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn click_selects_tile_one_level_deeper() {
        let view = ViewState { zoom: 3.6, ..ViewState::default() };
        let next = view.reduce(ViewAction::Click { longitude: 10.0, latitude: 45.0 });
        let tile = next.selected.unwrap();
        assert_eq!(tile.zoom, 4);
        assert_eq!(tile, Tile::from_latlon(LatLon::new(45.0, 10.0), 4));
    }

    #[test]
    fn clicking_selected_tile_toggles_off() {
        let view = ViewState { zoom: 5.0, ..ViewState::default() };
        let click = ViewAction::Click { longitude: -70.0, latitude: -33.0 };
        let selected = view.reduce(click);
        assert!(selected.selected.is_some());
        assert_eq!(selected.reduce(click).selected, None);
    }

    #[test]
    fn move_keeps_selection() {
        let tile = Tile::new(2, 1, 1).unwrap();
        let view = ViewState { selected: Some(tile), ..ViewState::default() };
        let moved = view.reduce(ViewAction::Move { longitude: 5.0, latitude: 6.0, zoom: 7.0 });
        assert_eq!(moved.selected, Some(tile));
        assert_eq!(moved.zoom, 7.0);
    }

    #[test]
    fn query_round_trip() {
        let view = ViewState {
            longitude: 12.34567,
            latitude: -45.5,
            zoom: 8.25,
            selected: Some(Tile::new(9, 273, 300).unwrap()),
        };
        let q = view.to_query();
        assert_eq!(q, "lng=12.34567&lat=-45.50000&zoom=8.25&tile=9/273/300");
        assert_eq!(ViewState::from_query(&format!("?{q}")), view);
    }

    #[test]
    fn malformed_query_falls_back_to_defaults() {
        let view = ViewState::from_query("lng=abc&lat=NaN&zoom=&tile=3/9/9&extra=1");
        assert_eq!(view, ViewState::default());
        let partial = ViewState::from_query("zoom=4&tile=4%2F3%2F2");
        assert_eq!(partial.zoom, 4.0);
        assert_eq!(partial.selected, Some(Tile::new(4, 3, 2).unwrap()));
        assert_eq!(ViewState::from_query(""), ViewState::default());
    }

    #[test]
    fn hillshade_ramps_with_zoom() {
        assert_relative_eq!(hillshade_intensity(0.0), 0.15);
        assert_relative_eq!(hillshade_intensity(10.0), 0.4);
        assert_relative_eq!(hillshade_intensity(30.0), 1.0);
    }

    #[test]
    fn click_zoom_is_clamped() {
        assert_eq!(click_zoom(-3.0), 0);
        assert_eq!(click_zoom(0.2), 1);
        assert_eq!(click_zoom(40.0), MAX_ZOOM);
        assert_eq!(click_zoom(f64::NAN), 0);
    }
}
