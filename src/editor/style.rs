use serde::Serialize;

use hexgrid::CellId;

use crate::grid::LatLng;

/// Stroke and fill for one drawn polygon, in the map host's terms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathStyle {
    pub color: &'static str,
    pub weight: f64,
    pub fill_color: &'static str,
    pub fill_opacity: f64,
}

impl PathStyle {
    /// Editable cell that is part of the zone.
    pub const SELECTED: Self = Self { color: "green", weight: 1.0, fill_color: "green", fill_opacity: 0.3 };

    /// Editable cell that is not part of the zone.
    pub const UNSELECTED: Self = Self { color: "gray", weight: 1.0, fill_color: "gray", fill_opacity: 0.05 };

    /// Saved zone cell on a read-only overlay.
    pub const ZONE: Self = Self { color: "green", weight: 2.0, fill_color: "green", fill_opacity: 0.3 };

    /// Shade over everything outside the county being edited.
    pub const MASK: Self = Self { color: "black", weight: 0.0, fill_color: "black", fill_opacity: 0.5 };
}

/// One grid cell to draw.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellView {
    pub id: CellId,
    pub rings: Vec<Vec<LatLng>>,
    pub style: PathStyle,
    pub interactive: bool,
}

/// One polygon of the outside-county mask; never interactive.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaskView {
    pub rings: Vec<Vec<LatLng>>,
    pub style: PathStyle,
}
