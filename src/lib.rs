//! docnav: Document Manifests and Lazy Content Resolution
//!
//! Walks a directory of text documents into a deterministic, versioned
//! manifest ([`tree`], [`manifest`]), and serves a sidebar-driven browser at
//! runtime: navigation state and deep links ([`nav`]) plus a cached,
//! de-duplicating content resolver ([`content`]).

pub mod cli;
pub mod config;
pub mod content;
pub mod error;
pub mod logging;
pub mod manifest;
pub mod nav;
pub mod tree;
pub mod types;
