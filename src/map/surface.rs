//! Map-rendering surface capability.

use std::fmt;

use super::popup::PopupContent;

/// Commands understood by a map-rendering surface.
///
/// Implementations own the rendering state; callers never read it back.
pub trait MapSurface {
    /// Centers the viewport.
    fn set_viewport(&mut self, lat: f64, lon: f64, zoom: u8);
    /// Creates the marker on first use, moves it afterwards.
    fn place_or_move_marker(&mut self, lat: f64, lon: f64);
    /// Replaces the marker's popup content.
    fn bind_popup(&mut self, content: PopupContent);
    fn open_popup(&mut self);
    fn add_overlay_circle(&mut self, lat: f64, lon: f64, radius_meters: f64);
    fn remove_overlay_circle(&mut self);
}

/// A recorded surface command.
#[derive(Debug, Clone, PartialEq)]
pub enum MapCommand {
    SetViewport { lat: f64, lon: f64, zoom: u8 },
    PlaceOrMoveMarker { lat: f64, lon: f64 },
    BindPopup(PopupContent),
    OpenPopup,
    AddOverlayCircle { lat: f64, lon: f64, radius_meters: f64 },
    RemoveOverlayCircle,
}

impl fmt::Display for MapCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapCommand::SetViewport { lat, lon, zoom } => {
                write!(f, "set viewport ({lat}, {lon}) zoom {zoom}")
            }
            MapCommand::PlaceOrMoveMarker { lat, lon } => write!(f, "marker at ({lat}, {lon})"),
            MapCommand::BindPopup(content) => {
                write!(f, "bind popup [{}]", content.lines().len())
            }
            MapCommand::OpenPopup => f.write_str("open popup"),
            MapCommand::AddOverlayCircle {
                lat,
                lon,
                radius_meters,
            } => write!(f, "overlay circle at ({lat}, {lon}) radius {radius_meters}m"),
            MapCommand::RemoveOverlayCircle => f.write_str("remove overlay circle"),
        }
    }
}

/// Surface adapter that queues every command for a renderer to replay.
#[derive(Debug, Clone, Default)]
pub struct CommandQueue {
    commands: Vec<MapCommand>,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands queued since the last drain.
    pub fn commands(&self) -> &[MapCommand] {
        &self.commands
    }

    /// Takes all queued commands.
    pub fn drain(&mut self) -> Vec<MapCommand> {
        std::mem::take(&mut self.commands)
    }
}

impl MapSurface for CommandQueue {
    fn set_viewport(&mut self, lat: f64, lon: f64, zoom: u8) {
        self.commands.push(MapCommand::SetViewport { lat, lon, zoom });
    }

    fn place_or_move_marker(&mut self, lat: f64, lon: f64) {
        self.commands.push(MapCommand::PlaceOrMoveMarker { lat, lon });
    }

    fn bind_popup(&mut self, content: PopupContent) {
        self.commands.push(MapCommand::BindPopup(content));
    }

    fn open_popup(&mut self) {
        self.commands.push(MapCommand::OpenPopup);
    }

    fn add_overlay_circle(&mut self, lat: f64, lon: f64, radius_meters: f64) {
        self.commands.push(MapCommand::AddOverlayCircle {
            lat,
            lon,
            radius_meters,
        });
    }

    fn remove_overlay_circle(&mut self) {
        self.commands.push(MapCommand::RemoveOverlayCircle);
    }
}

impl<T: MapSurface + ?Sized> MapSurface for &mut T {
    fn set_viewport(&mut self, lat: f64, lon: f64, zoom: u8) {
        (**self).set_viewport(lat, lon, zoom);
    }

    fn place_or_move_marker(&mut self, lat: f64, lon: f64) {
        (**self).place_or_move_marker(lat, lon);
    }

    fn bind_popup(&mut self, content: PopupContent) {
        (**self).bind_popup(content);
    }

    fn open_popup(&mut self) {
        (**self).open_popup();
    }

    fn add_overlay_circle(&mut self, lat: f64, lon: f64, radius_meters: f64) {
        (**self).add_overlay_circle(lat, lon, radius_meters);
    }

    fn remove_overlay_circle(&mut self) {
        (**self).remove_overlay_circle();
    }
}
