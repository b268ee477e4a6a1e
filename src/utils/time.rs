use chrono::{DateTime, Local, Utc};

pub fn current_human_timestamp() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

pub fn format_last_updated(value: Option<&DateTime<Utc>>) -> String {
    match value {
        Some(ts) => DateTime::<Local>::from(*ts)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
        None => "—".to_string(),
    }
}
