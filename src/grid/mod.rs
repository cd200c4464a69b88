//! Hex grid construction over county polygons: the builder, its cache, and
//! the idle-time scheduler that keeps large builds off the render path.

mod builder;
mod cache;
mod cell;
mod idle;
mod scheduler;
mod task;

pub use builder::HexGridBuilder;
pub use cache::{GridCache, GridKey, SharedGridCache};
pub use cell::{GridCell, LatLng};
pub(crate) use cell::swap_ring;
pub use idle::{IdleHost, IdleQueue, IdleTicket};
pub use scheduler::{BuildEvent, GridRequest, IncrementalScheduler};
pub use task::{BuildStep, BuildTask, CancelHandle};
