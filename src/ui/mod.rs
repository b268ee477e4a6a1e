pub mod console;
pub mod table;

pub use console::{parse_command, ConsoleCommand, HELP_TEXT};
pub use table::render_table;

use crate::app::SessionView;

/// Status lines followed by the table.
pub fn render_view(view: &SessionView<'_>) -> String {
    let mut out = String::new();
    if !view.auto_refresh_message.is_empty() {
        out.push_str(view.auto_refresh_message);
        out.push('\n');
    }
    if view.loading {
        out.push_str("Loading...\n");
    }
    if let Some(error) = view.error {
        out.push_str(&format!("Error: {error}\n"));
    }
    if view.rows.is_empty() {
        out.push_str("No quotes yet.");
    } else {
        out.push_str(&render_table(view.rows));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::SessionPhase;
    use crate::fetch::test_support::observation;

    #[test]
    fn status_lines_precede_the_table() {
        let rows = [observation("SBIN", 612.4)];
        let view = SessionView {
            rows: &rows,
            auto_refresh_message: "Auto-refreshing SBIN every 5 second(s).",
            loading: true,
            error: Some("boom"),
            phase: SessionPhase::Loading,
            active_symbol: "SBIN".to_string(),
            symbol_input: "SBIN",
        };

        let rendered = render_view(&view);
        let mut lines = rendered.lines();

        assert_eq!(lines.next(), Some("Auto-refreshing SBIN every 5 second(s)."));
        assert_eq!(lines.next(), Some("Loading..."));
        assert_eq!(lines.next(), Some("Error: boom"));
        assert!(rendered.contains("| SBIN "));
    }

    #[test]
    fn idle_view_without_rows() {
        let view = SessionView {
            rows: &[],
            auto_refresh_message: "",
            loading: false,
            error: None,
            phase: SessionPhase::Idle,
            active_symbol: String::new(),
            symbol_input: "",
        };
        assert_eq!(render_view(&view), "No quotes yet.");
    }
}
