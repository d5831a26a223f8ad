//! Casing normalization for extracted strings.

/// Tokens whose casing is not the default first-letter capitalization.
const CASE_EXCEPTIONS: &[(&str, &str)] = &[("po", "PO"), ("p.o", "P.O"), ("nagar", "Nagar")];

/// Lower-cases the input, then capitalizes the first letter of each
/// whitespace-separated token. Tokens in the exception table use their fixed
/// spelling; a single trailing `.` or `,` is ignored for the lookup and kept.
pub fn to_title_case(input: &str) -> String {
    input
        .to_lowercase()
        .split_whitespace()
        .map(title_case_token)
        .collect::<Vec<_>>()
        .join(" ")
}

fn title_case_token(token: &str) -> String {
    let (core, suffix) = match token.char_indices().last() {
        Some((idx, c)) if (c == '.' || c == ',') && idx > 0 => token.split_at(idx),
        _ => (token, ""),
    };

    if let Some((_, fixed)) = CASE_EXCEPTIONS.iter().find(|(key, _)| *key == core) {
        return format!("{}{}", fixed, suffix);
    }

    let mut chars = token.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
