pub mod text;
pub mod time;

pub use text::{coerce_non_negative, normalize_symbol};
pub use time::{current_human_timestamp, format_last_updated};
