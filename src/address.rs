//! Address line extraction.
//!
//! Runs after the independent extractors because it needs the city, state and
//! PIN code to strip them back out of the address text. The tiers are tried in
//! order and an earlier tier always wins:
//!
//! 1. an `Address:` block running up to the next field label,
//! 2. a `House Name:` field (not geo-cleaned),
//! 3. an optional `Post Office:` suffix on whatever line 1 was found,
//! 4. the first unlabeled line carrying an address keyword.
//!
//! Line 2 is independent and comes from a `Landmark:`/`Near:`/`Area:` field.

use crate::extractors::{FIELD_LABEL, LINE_LEAD, SEP, cut_at_next_label, is_decorator_line, trim_value};
use crate::gazetteer::COMMON_DISTRICTS;
use crate::models::AddressLines;
use once_cell::sync::Lazy;
use regex::Regex;

static ADDRESS_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)(?:\b(e-?mail|ip)[ \t]+)?\b(?:full[ \t]+)?address{}",
        SEP
    ))
    .expect("address label regex")
});

static HOUSE_FIELD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?im){}(?:house[ \t]*name|house){}([^\n]+)",
        LINE_LEAD, SEP
    ))
    .expect("house field regex")
});

/// `PO - 682024` is a PIN written after the post office name, so only a
/// colon or equals sign marks a post office field.
static POST_OFFICE_FIELD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:post[ \t]*office|p\.[ \t]?o\.?|po)[ \t*_]*[:=][ \t]*-?[ \t*_]*([^\n]+)")
        .expect("post office regex")
});

static LANDMARK_FIELD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?i)\b(?:landmark|near|area){}([^\n]+)", SEP))
        .expect("landmark regex")
});

static LEADING_NEAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^near(?:[ \t]+(?:to|by))?\b[ \t]*").expect("leading near regex")
});

/// Label words that disqualify a candidate address line.
static LABEL_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:name|phone|pin|city|state|district|email|format)\b")
        .expect("label prefix regex")
});

/// Lines starting with these labels are never scanned as free address text.
static FIELD_LINE_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)^[ \t>*_•\-]*(?:name|naam|phone|mobile|whatsapp|contact|pin|pincode|zip|city|state|district|email|landmark|near|area|format){}",
        SEP
    ))
    .expect("field line regex")
});

static ADDRESS_KEYWORDS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:house|flat|building|road|street|lane|colony|plot|sector|tower)\b|nagar")
        .expect("address keyword regex")
});

static EMPTY_PARENS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(\s*\)").expect("empty parens regex"));

/// City plus the common district names, deduplicated case-insensitively.
fn removal_list(city: Option<&str>) -> Vec<String> {
    let mut places: Vec<String> = Vec::with_capacity(COMMON_DISTRICTS.len() + 1);
    if let Some(city) = city.map(str::trim).filter(|c| !c.is_empty()) {
        places.push(city.to_string());
    }
    for district in COMMON_DISTRICTS {
        if !places.iter().any(|p| p.eq_ignore_ascii_case(district)) {
            places.push(district.to_string());
        }
    }
    places
}

fn remove_word(text: &str, word: &str) -> String {
    let word = word.trim();
    if word.is_empty() {
        return text.to_string();
    }
    match Regex::new(&format!(r"(?i)\b{}\b", regex::escape(word))) {
        Ok(re) => re.replace_all(text, " ").into_owned(),
        Err(e) => {
            tracing::warn!("Could not build removal pattern for '{}': {}", word, e);
            text.to_string()
        }
    }
}

fn remove_pincode(text: &str, pincode: &str) -> String {
    let text = text.replace(pincode, " ");
    if pincode.len() != 6 || !pincode.bytes().all(|b| b.is_ascii_digit()) {
        return text;
    }
    // Also catch the "682 001" spelling.
    match Regex::new(&format!(r"\b{}[ \t]{}\b", &pincode[..3], &pincode[3..])) {
        Ok(re) => re.replace_all(&text, " ").into_owned(),
        Err(_) => text,
    }
}

/// Collapses empty comma segments and whitespace runs, then trims
/// punctuation from both ends.
fn tidy(text: &str) -> String {
    let text = EMPTY_PARENS.replace_all(text, " ");
    let segments: Vec<String> = text
        .split(',')
        .map(|seg| seg.split_whitespace().collect::<Vec<_>>().join(" "))
        .map(|seg| {
            seg.trim_matches(|c: char| c == '-' || c == '–' || c.is_whitespace())
                .to_string()
        })
        .filter(|seg| !seg.is_empty())
        .collect();
    trim_value(&segments.join(", ")).to_string()
}

/// Strips the PIN code, the state and every place in `removal` from an
/// address candidate, then tidies leftover separators.
pub fn clean_address_text(
    candidate: &str,
    removal: &[String],
    state: Option<&str>,
    pincode: Option<&str>,
) -> String {
    let mut text = candidate.to_string();
    if let Some(pin) = pincode.map(str::trim).filter(|p| !p.is_empty()) {
        text = remove_pincode(&text, pin);
    }
    if let Some(state) = state {
        text = remove_word(&text, state);
    }
    for place in removal {
        text = remove_word(&text, place);
    }
    tidy(&text)
}

/// Rejects fragments that are too short, punctuation only, decorator banners
/// or that start with a field label word.
pub fn is_valid_address_line(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.chars().count() >= 3
        && trimmed.chars().any(char::is_alphanumeric)
        && !is_decorator_line(trimmed)
        && !LABEL_PREFIX.is_match(trimmed)
}

fn labeled_address_block(text: &str) -> Option<String> {
    for caps in ADDRESS_LABEL.captures_iter(text) {
        if caps.get(1).is_some() {
            continue;
        }
        let Some(label) = caps.get(0) else {
            continue;
        };
        let rest = &text[label.end()..];
        let end = FIELD_LABEL.find(rest).map(|m| m.start()).unwrap_or(rest.len());
        let block = rest[..end]
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !is_decorator_line(line))
            .collect::<Vec<_>>()
            .join(", ");
        if !block.is_empty() {
            return Some(block);
        }
    }
    None
}

fn field_value(re: &Regex, text: &str) -> Option<String> {
    re.captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| trim_value(cut_at_next_label(m.as_str())).to_string())
        .find(|value| !value.is_empty())
}

fn post_office(
    text: &str,
    removal: &[String],
    state: Option<&str>,
    pincode: Option<&str>,
) -> Option<String> {
    let value = field_value(&POST_OFFICE_FIELD, text)?;
    let name = clean_address_text(value.split(',').next().unwrap_or(""), removal, state, pincode);
    if !name.chars().any(char::is_alphabetic) || !is_valid_address_line(&name) {
        tracing::debug!(target: "extract", "Ignoring post office value '{}'", value);
        return None;
    }
    Some(name)
}

fn landmark(text: &str) -> Option<String> {
    let value = field_value(&LANDMARK_FIELD, text)?;
    if !is_valid_address_line(&value) {
        return None;
    }
    let place = LEADING_NEAR.replace(&value, "");
    let place = place.trim();
    if place.is_empty() {
        return None;
    }
    Some(format!("Near {}", place))
}

fn keyword_line(text: &str, removal: &[String], state: Option<&str>, pincode: Option<&str>) -> Option<String> {
    let line = text.lines().map(str::trim).find(|line| {
        !line.is_empty()
            && !is_decorator_line(line)
            && !FIELD_LINE_PREFIX.is_match(line)
            && ADDRESS_KEYWORDS.is_match(line)
    })?;
    let cleaned = clean_address_text(line, removal, state, pincode);
    is_valid_address_line(&cleaned).then_some(cleaned)
}

/// Extracts address lines from `text`, stripping the already extracted city,
/// state and PIN code out of line 1.
pub fn extract_address(
    text: &str,
    city: Option<&str>,
    state: Option<&str>,
    pincode: Option<&str>,
) -> AddressLines {
    let removal = removal_list(city);

    let mut line1 = labeled_address_block(text)
        .map(|block| clean_address_text(&block, &removal, state, pincode))
        .filter(|cleaned| is_valid_address_line(cleaned));
    if line1.is_some() {
        tracing::debug!(target: "extract", "address line 1 from labeled address block");
    }

    if line1.is_none() {
        line1 = field_value(&HOUSE_FIELD, text).filter(|house| is_valid_address_line(house));
        if line1.is_some() {
            tracing::debug!(target: "extract", "address line 1 from house name field");
        }
    }

    if let (Some(line), Some(po)) = (line1.as_mut(), post_office(text, &removal, state, pincode)) {
        if !line.to_lowercase().contains(&po.to_lowercase()) {
            line.push_str(&format!(" {} (PO)", po));
        }
    }

    let line2 = landmark(text);

    if line1.is_none() {
        line1 = keyword_line(text, &removal, state, pincode);
        if line1.is_some() {
            tracing::debug!(target: "extract", "address line 1 from keyword scan");
        }
    }

    AddressLines { line1, line2 }
}
