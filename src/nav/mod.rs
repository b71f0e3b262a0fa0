//! Runtime navigation over a loaded manifest
//!
//! [`store::NavigationStore`] owns sidebar state (expansion, selection),
//! [`address`] maps nodes to deep links and back, and [`pane::DocumentPane`]
//! holds what the reading pane currently shows.

pub mod address;
pub mod pane;
pub mod store;

pub use address::{format_address, parse_address, ROOT_ADDRESS};
pub use pane::DocumentPane;
pub use store::{NavigationStore, Row};
