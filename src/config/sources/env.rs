//! Environment source: DOCNAV__SECTION__KEY, e.g.
//! DOCNAV__RESOLVER__MAX_ATTEMPTS=5 or DOCNAV__BUILDER__EXTENSIONS=md,rst.

use config::builder::DefaultState;
use config::{ConfigBuilder, Environment};

pub const ENV_PREFIX: &str = "DOCNAV";

pub fn add_to_builder(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
    builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("builder.extensions")
            .with_list_parse_key("builder.ignore"),
    )
}
