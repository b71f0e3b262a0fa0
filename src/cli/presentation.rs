//! CLI presentation: text and json formatters per command family.

mod manifest;
mod shared;

pub use manifest::{
    format_build_summary, format_inspect_json, format_inspect_text, format_validate_text,
    BuildSummary, ManifestSummary,
};
pub use shared::{format_section_heading, format_warnings};
