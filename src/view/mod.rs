//! View Layer
//!
//! - **Surface**: the named elements the dashboard writes into
//! - **Binder**: payload → element projections
//! - **MemoryDom**: a recording surface and chart host
//! - **Terminal**: text/JSON/CSV rendering of a `MemoryDom`

pub mod binder;
pub mod format;
mod fragment;
mod memory;
mod surface;
pub mod terminal;

pub use fragment::{Fragment, FragmentItem};
pub use memory::{ChartInstance, Element, MemoryDom};
pub use surface::{ComponentTable, Surface};
