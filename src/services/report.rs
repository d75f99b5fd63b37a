use std::fmt::Write;

use crate::models::TradingStatus;

const REPORT_TRADES: usize = 5;
const REPORT_POSITIONS: usize = 5;

/// Shorten long addresses to `0x1234...abcd`.
pub fn short_address(address: &str) -> String {
    if address.len() > 10 && address.is_ascii() {
        format!("{}...{}", &address[..6], &address[address.len() - 4..])
    } else {
        address.to_string()
    }
}

/// Render a snapshot as a plain-text report.
pub fn format_status_report(status: &TradingStatus) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "=== Trading status: {} ===", short_address(&status.user_address));
    let _ = writeln!(
        out,
        "Updated: {}",
        status.last_updated.format("%Y-%m-%d %H:%M:%S UTC")
    );
    let _ = writeln!(out);

    let _ = writeln!(out, "Positions: {}", status.total_positions);
    let _ = writeln!(out, "Total value: ${}", status.total_value);
    let _ = writeln!(out);

    let _ = writeln!(out, "Recent trades:");
    if status.recent_trades.is_empty() {
        let _ = writeln!(out, "  none");
    }
    for trade in status.recent_trades.iter().take(REPORT_TRADES) {
        let _ = writeln!(
            out,
            "  {} {} @ {} [{}] {}",
            trade.side,
            trade.quantity,
            trade.price,
            trade.outcome,
            trade.market.question,
        );
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "Open positions:");
    if status.open_positions.is_empty() {
        let _ = writeln!(out, "  none");
    }
    for position in status.open_positions.iter().take(REPORT_POSITIONS) {
        let _ = writeln!(
            out,
            "  {} x{} = ${} {}",
            position.outcome, position.quantity, position.value, position.market.question,
        );
    }

    out
}
