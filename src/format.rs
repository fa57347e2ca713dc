// Stat display formatting helpers.

/// Format a rate stat (AVG/OBP/SLG/OPS) to three decimals with the
/// leading zero stripped, e.g. `0.278` -> `.278`, `1.012` -> `1.012`.
pub fn format_rate(value: f64) -> String {
    let s = format!("{value:.3}");
    s.strip_prefix('0').map(str::to_string).unwrap_or(s)
}

/// Format a percentage stat (BB%/K%) to one decimal with a `%` suffix.
pub fn format_percent(value: f64) -> String {
    format!("{value:.1}%")
}

/// Format a delta against league average with an explicit sign.
///
/// Rate deltas keep three decimals (`+.012`), counting deltas like wRC+
/// round to whole numbers (`-4`). Zero counts as positive, matching how
/// the deltas are colored, including negative values whose rendered
/// magnitude rounds to zero.
pub fn format_delta(value: f64, decimals: usize) -> String {
    let magnitude = if decimals == 0 {
        format!("{:.0}", value.abs().round())
    } else {
        let s = format!("{:.prec$}", value.abs(), prec = decimals);
        s.strip_prefix('0').map(str::to_string).unwrap_or(s)
    };
    let rounds_to_zero = !magnitude.chars().any(|c| c.is_ascii_digit() && c != '0');
    if value < 0.0 && !rounds_to_zero {
        format!("-{magnitude}")
    } else {
        format!("+{magnitude}")
    }
}
