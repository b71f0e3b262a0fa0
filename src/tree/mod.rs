//! Content tree discovery
//!
//! Walks a content root and turns it into a [`crate::manifest::Manifest`]:
//! every document and directory gets a path-derived id, a deterministic
//! sibling order and builder metadata.

pub mod builder;
pub mod filter;
pub mod hasher;
pub mod path;
pub mod walker;
