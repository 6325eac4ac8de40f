//! Keeps a map surface in step with the current geolocation record.

use std::sync::Arc;

use log::{debug, info};
use tokio::sync::watch;

use super::popup::PopupContent;
use super::surface::MapSurface;
use crate::config::{DEFAULT_ZOOM, OVERLAY_RADIUS_METERS};
use crate::geoip::GeoRecord;

/// A parsed `"lat,lon"` pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// Parses a provider `loc` string.
///
/// Exactly two comma-separated finite numbers are accepted, each trimmed.
/// Anything else yields `None`.
pub fn parse_loc(loc: &str) -> Option<Coordinates> {
    let (lat, lon) = loc.split_once(',')?;
    if lon.contains(',') {
        return None;
    }
    let lat: f64 = lat.trim().parse().ok()?;
    let lon: f64 = lon.trim().parse().ok()?;
    if !lat.is_finite() || !lon.is_finite() {
        return None;
    }
    Some(Coordinates { lat, lon })
}

/// Drives a [`MapSurface`] from successive current records.
///
/// The synchronizer remembers whether it has placed the marker and whether a
/// precision overlay is drawn, so the surface always holds at most one of each.
pub struct MapSynchronizer<S> {
    surface: S,
    marker: Option<Coordinates>,
    overlay: bool,
}

impl<S: MapSurface> MapSynchronizer<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            marker: None,
            overlay: false,
        }
    }

    /// Applies a record to the surface.
    ///
    /// Returns `true` when the record carried usable coordinates. A record
    /// without them leaves the marker and viewport where they were and only
    /// removes a stale overlay.
    pub fn sync(&mut self, record: &GeoRecord) -> bool {
        let Some(coords) = record.loc.as_deref().and_then(parse_loc) else {
            debug!(
                "No usable coordinates for {}",
                record.ip.as_deref().unwrap_or("unknown address")
            );
            self.drop_overlay();
            return false;
        };

        self.surface
            .set_viewport(coords.lat, coords.lon, DEFAULT_ZOOM);
        self.surface.place_or_move_marker(coords.lat, coords.lon);
        self.marker = Some(coords);
        self.surface.bind_popup(PopupContent::from_record(record));
        self.surface.open_popup();

        self.drop_overlay();
        self.surface
            .add_overlay_circle(coords.lat, coords.lon, OVERLAY_RADIUS_METERS);
        self.overlay = true;
        true
    }

    /// Applies every record published on `current` until the sender goes away.
    ///
    /// The value present when called is applied first.
    pub async fn follow(&mut self, mut current: watch::Receiver<Option<Arc<GeoRecord>>>) {
        loop {
            let record = current.borrow_and_update().clone();
            if let Some(record) = record {
                self.sync(&record);
            }
            if current.changed().await.is_err() {
                info!("Current record channel closed, map follower stopping");
                break;
            }
        }
    }

    /// Where the marker currently sits, if it has been placed.
    pub fn marker(&self) -> Option<Coordinates> {
        self.marker
    }

    pub fn has_overlay(&self) -> bool {
        self.overlay
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    fn drop_overlay(&mut self) {
        if self.overlay {
            self.surface.remove_overlay_circle();
            self.overlay = false;
        }
    }
}
