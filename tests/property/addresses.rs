//! Property-based tests for deep-link addresses

use docnav::nav::{format_address, parse_address};
use docnav::tree::path::normalize_name;
use proptest::prelude::*;

fn segment() -> impl Strategy<Value = String> {
    "[^/\\\\\\x00-\\x1f]{1,10}".prop_filter("not a dot segment", |s| s != "." && s != "..")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn prop_address_round_trips(segments in prop::collection::vec(segment(), 0..5)) {
        let path = normalize_name(&segments.join("/"));
        prop_assume!(!path.split('/').any(|s| s == ".."));
        let address = format_address(&path);
        prop_assert!(address.starts_with('/'));
        prop_assert_eq!(parse_address(&address).unwrap(), path.clone());
        prop_assert_eq!(parse_address(&format!("#{}/", address)).unwrap(), path);
    }
}
