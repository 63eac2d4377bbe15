//! Text formatting helpers for help output and docs

/// Join the non-empty strings with `sep`
pub fn join_strings<'a, I>(strings: I, sep: &str) -> String
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    strings
        .into_iter()
        .flatten()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(sep)
}

/// Lay out rows as columns, each at most 50 wide, three spaces apart
pub fn format_table(rows: &[(String, String)]) -> String {
    let width = rows
        .iter()
        .map(|(first, _)| first.chars().count())
        .max()
        .unwrap_or(0)
        .min(50);
    let lines: Vec<String> = rows
        .iter()
        .map(|(first, second)| format!("{:<width$}   {}", first, second).trim_end().to_string())
        .collect();
    format!("\n{}\n", lines.join("\n"))
}

/// First sentence of a description, cut to `max_width` characters
pub fn format_arg_help(text: Option<&str>, max_width: usize) -> String {
    let text = text.unwrap_or_default().trim();
    if text.is_empty() {
        return String::new();
    }
    let cut: String = text.chars().take(max_width).collect();
    match cut.rsplit_once('.') {
        Some((head, _)) => format!("{}.", head),
        None if text.chars().count() <= max_width => format!("{}.", cut),
        None => format!("{}...", cut),
    }
}

/// Collapse runs of whitespace into single spaces
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
