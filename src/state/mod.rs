//! Dashboard State
//!
//! Selections, request sequencing, and the view-state object the controller
//! owns.

mod selection;
mod sequence;
mod view;

pub use selection::{SelectList, SelectOption, Selection, SelectionKind, Topology};
pub use sequence::{Channel, RequestSequence, RequestToken};
pub use view::{Tab, UiPhase, ViewState};
