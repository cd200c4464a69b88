//! Interactive zone editing over a county's hex grid.

mod controller;
mod host;
mod overlay;
mod style;

pub use controller::{PaintState, ZoneSelectionController};
pub use host::{HeadlessMap, MapHost};
pub use overlay::{GridOverlay, OverlayMode};
pub use style::{CellView, MaskView, PathStyle};
