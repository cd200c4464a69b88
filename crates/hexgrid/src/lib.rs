pub mod clip;
pub mod identity;
pub mod measure;
pub mod tiling;

pub use clip::{clip_to, is_areal};
pub use identity::{CellId, IdentitySet, cell_id};
pub use measure::{MIN_HEX_KM, bottom_width_km, hex_size_km};
pub use tiling::HexTiling;

/// Errors raised while planning a hex tiling.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GridError {
    /// The resolution knob must be at least 1.
    #[error("grid size must be positive")]
    ZeroGridSize,
    /// The hex edge length is zero, negative or not finite.
    #[error("hex size must be positive and finite, got {0} km")]
    InvalidHexSize(f64),
    /// The polygon is empty or its bounds are not finite.
    #[error("polygon has no usable bounds")]
    EmptyBounds,
}
