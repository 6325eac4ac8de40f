//! Map synchronization.
//!
//! The map itself is an external, stateful surface. This module defines the
//! commands it accepts ([`MapSurface`]), a recording adapter
//! ([`CommandQueue`]), and [`MapSynchronizer`], which turns each new current
//! record into viewport, marker, popup and precision-overlay commands.

mod popup;
mod surface;
mod sync;

// Re-export public API
pub use popup::{PopupContent, PopupLine};
pub use surface::{CommandQueue, MapCommand, MapSurface};
pub use sync::{parse_loc, Coordinates, MapSynchronizer};
