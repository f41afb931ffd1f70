//! Rendering of `/** ... */` documentation comments as markdown.

/// Strip the comment delimiters and `*` gutters, then render `@param` and
/// `@return` tags.
pub fn format(raw: &str) -> String {
    let trimmed = raw.trim();
    let inner = trimmed
        .strip_prefix("/**")
        .unwrap_or(trimmed)
        .strip_suffix("*/")
        .unwrap_or_else(|| trimmed.strip_prefix("/**").unwrap_or(trimmed));

    let mut out: Vec<String> = Vec::new();
    for line in inner.lines() {
        let line = line.trim();
        let line = line.strip_prefix('*').map_or(line, str::trim_start);

        if let Some(rest) = line.strip_prefix("@param") {
            let rest = rest.trim();
            let (name, text) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            out.push(format!("- `{}` {}", name, text.trim()).trim_end().to_string());
        } else if let Some(rest) = line
            .strip_prefix("@returns")
            .or_else(|| line.strip_prefix("@return"))
        {
            out.push(format!("*Returns* {}", rest.trim()).trim_end().to_string());
        } else {
            out.push(line.to_string());
        }
    }

    // Drop blank lines at both ends, keep inner paragraph breaks.
    let first = out.iter().position(|l| !l.is_empty()).unwrap_or(out.len());
    let last = out.iter().rposition(|l| !l.is_empty()).map_or(first, |i| i + 1);
    out[first..last].join("\n")
}
