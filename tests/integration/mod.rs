//! Integration tests for manifest building, navigation and content resolution

mod config_layers;
mod manifest_build;
mod manifest_codec;
