use unicode_width::UnicodeWidthStr;

use crate::fetch::Observation;
use crate::utils::format_last_updated;

const HEADERS: [&str; 16] = [
    "Symbol",
    "Company",
    "Last",
    "Change",
    "Change %",
    "Open",
    "High",
    "Low",
    "Prev Close",
    "SMA (20)",
    "EMA (20)",
    "RSI (14)",
    "Bollinger Upper",
    "Bollinger Lower",
    "Volatility %",
    "Updated",
];

const ABSENT: &str = "—";

fn number(value: Option<f64>) -> String {
    value.map_or_else(|| ABSENT.to_string(), |v| format!("{v:.2}"))
}

fn signed(value: Option<f64>) -> String {
    value.map_or_else(|| ABSENT.to_string(), |v| format!("{v:+.2}"))
}

fn cells(row: &Observation) -> Vec<String> {
    vec![
        row.symbol.clone(),
        row.company_name.clone().unwrap_or_else(|| ABSENT.to_string()),
        number(row.last_price),
        signed(row.change),
        signed(row.change_percent),
        number(row.open),
        number(row.high),
        number(row.low),
        number(row.previous_close),
        number(row.sma20),
        number(row.ema20),
        number(row.rsi14),
        number(row.bollinger_upper),
        number(row.bollinger_lower),
        number(row.annualised_volatility),
        format_last_updated(row.last_updated.as_ref()),
    ]
}

/// Bordered table of observations, newest first, padded by display width.
pub fn render_table(rows: &[Observation]) -> String {
    let all_rows: Vec<Vec<String>> =
        std::iter::once(HEADERS.iter().map(|h| h.to_string()).collect())
            .chain(rows.iter().map(cells))
            .collect();

    let mut col_widths = vec![0; HEADERS.len()];
    for row in &all_rows {
        for (i, cell) in row.iter().enumerate() {
            col_widths[i] = col_widths[i].max(cell.width());
        }
    }

    let border = format!(
        "+{}+",
        col_widths
            .iter()
            .map(|w| "-".repeat(w + 2))
            .collect::<Vec<_>>()
            .join("+")
    );

    let mut out = String::new();
    out.push_str(&border);
    out.push('\n');
    for (row_idx, row) in all_rows.iter().enumerate() {
        let formatted_row = row
            .iter()
            .zip(&col_widths)
            .enumerate()
            .map(|(col, (cell, width))| {
                let padding = " ".repeat(width - cell.width());
                // Text columns read better left-aligned.
                if col < 2 {
                    format!(" {cell}{padding} ")
                } else {
                    format!(" {padding}{cell} ")
                }
            })
            .collect::<Vec<_>>()
            .join("|");
        out.push_str(&format!("|{formatted_row}|\n"));
        if row_idx == 0 {
            out.push_str(&border);
            out.push('\n');
        }
    }
    out.push_str(&border);
    out
}
