//! CLI domain: parse, route, help, output, and presentation only.
//! No domain orchestration; single route table dispatches to domain services.

mod help;
mod output;
mod parse;
mod presentation;
mod route;

pub use help::command_name;
pub use output::{map_error, RunOutput};
pub use parse::{Cli, Commands};
pub use presentation::{
    format_build_summary, format_inspect_json, format_inspect_text, format_section_heading,
    format_validate_text, format_warnings, BuildSummary, ManifestSummary,
};
pub use route::RunContext;
