// Query / display utilities
pub mod json_converter;
pub mod query_string;
pub mod status_formatter;

// Re-export all utilities for convenient access
pub use json_converter::value_to_short_string;
pub use query_string::build_query_string;
pub use status_formatter::{format_host_state, format_status_indicator};
