//! Independent field extractors for pasted chat text.
//!
//! Each field has an ordered list of pattern tiers. The first tier that yields
//! an acceptable value wins; later tiers trade specificity for recall. All
//! patterns are compiled once on first use.

use crate::canonical::to_title_case;
use crate::gazetteer::{cities_longest_first, states_longest_first};
use once_cell::sync::Lazy;
use regex::Regex;

/// Optional bullet, quote marker, markdown emphasis or list number before a
/// label at the start of a line.
pub(crate) const LINE_LEAD: &str = r"^[ \t>*_•\-]*(?:\d{1,2}[.)][ \t]*)?";

/// Separator between a label and its value: `:`, `=`, `:-` or a spaced dash,
/// with optional WhatsApp markdown around it.
pub(crate) const SEP: &str = r"[ \t*_]*(?:[:=][ \t]*-?|[ \t]-|-[ \t])[ \t*_]*";

/// Any recognized `Key:` label. Used to cut a value that runs into the next
/// field on the same line, and to end an address block.
pub(crate) static FIELD_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:full[ \t]+address|address|house[ \t]*name|house|landmark|near|area|post[ \t]*office|city|district|state|pin[ \t]*code|pin|zip(?:[ \t]*code)?|postal[ \t]*code|phone|mobile|whats[ \t]?app|contact|e-?mail|name)[ \t*_]*[:=]",
    )
    .expect("field label regex")
});

static HEADER_WORDS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:format|details)\b").expect("header regex"));

static NON_NAME_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?:house|phone|mobile|whatsapp|contact|pin|pincode|address|city|state|district|email|landmark)\b",
    )
    .expect("non-name prefix regex")
});

static NAME_VALUE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-zऀ-ॿഀ-ൿ][A-Za-zऀ-ॿഀ-ൿ .']{1,49}$").expect("name value regex")
});

static HOUSE_NUMBER_PHRASE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:house|flat|door|plot|building|h)[ \t]*(?:no|number|num|#)\.?[ \t]*[:\-]?[ \t]*[A-Za-z0-9/\-]+",
    )
    .expect("house number regex")
});

static CITY_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bcity\b").expect("city word regex"));
static DISTRICT_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:district|dist)\b\.?").expect("district word regex"));

/// A single tier of an ordered fallback chain.
pub(crate) struct FieldPattern {
    pub tier: &'static str,
    pub regex: Regex,
}

impl FieldPattern {
    fn new(tier: &'static str, pattern: &str) -> Self {
        Self {
            tier,
            regex: Regex::new(pattern)
                .unwrap_or_else(|e| panic!("invalid {} pattern: {}", tier, e)),
        }
    }
}

/// An extracted value together with the tier that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMatch {
    pub value: String,
    pub tier: &'static str,
}

fn labeled_line(labels: &str, value: &str) -> String {
    format!(r"(?im){}(?:{}){}{}", LINE_LEAD, labels, SEP, value)
}

fn labeled_anywhere(labels: &str, value: &str) -> String {
    format!(r"(?i)\b(?:{}){}{}", labels, SEP, value)
}

static NAME_PATTERNS: Lazy<Vec<FieldPattern>> = Lazy::new(|| {
    vec![FieldPattern::new(
        "labeled",
        &labeled_line(
            r"full[ \t]+name|customer[ \t]+name|name|naam|नाम|പേര്",
            r"([^\n]+)",
        ),
    )]
});

static PHONE_PATTERNS: Lazy<Vec<FieldPattern>> = Lazy::new(|| {
    vec![
        FieldPattern::new(
            "labeled",
            r"(?i)\b(?:phone|mobile|mob|contact|whats[ \t]?app|cell|ph)(?:[ \t]*(?:no|number|num|nbr))?\.?[ \t*_]*(?:[:=\-][ \t*_]*)?(?:\+?91[ \t\-]?|0)?([6-9](?:[ \t\-]?\d){9})\b",
        ),
        FieldPattern::new("country_code", r"(?:\+91|\b91)[ \t\-]?([6-9]\d{9})\b"),
        FieldPattern::new("bare", r"\b([6-9]\d{9})\b"),
        FieldPattern::new("bare_grouped", r"\b([6-9](?:[ \t\-]?\d){9})\b"),
    ]
});

static EMAIL_PATTERNS: Lazy<Vec<FieldPattern>> = Lazy::new(|| {
    vec![
        FieldPattern::new(
            "labeled",
            r"(?i)\b(?:e-?mail|mail)(?:[ \t]*(?:id|address))?[ \t*_]*(?:[:=\-][ \t*_]*)?([A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,})\b",
        ),
        FieldPattern::new(
            "bare",
            r"\b([A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,})\b",
        ),
    ]
});

static CITY_PATTERNS: Lazy<Vec<FieldPattern>> = Lazy::new(|| {
    vec![
        FieldPattern::new("labeled", &labeled_anywhere(r"city|town", r"([^\n]+)")),
        FieldPattern::new(
            "district",
            &labeled_anywhere(r"district|dist\.?", r"([^\n]+)"),
        ),
    ]
});

static STATE_PATTERNS: Lazy<Vec<FieldPattern>> =
    Lazy::new(|| vec![FieldPattern::new("labeled", &labeled_anywhere(r"state", r"([^\n]+)"))]);

static PINCODE_PATTERNS: Lazy<Vec<FieldPattern>> = Lazy::new(|| {
    vec![
        FieldPattern::new(
            "labeled",
            r"(?i)\b(?:pin[ \t]*code|pin|zip(?:[ \t]*code)?|postal[ \t]*code|post[ \t]*code)(?:[ \t]*(?:no|number))?\.?[ \t*_]*(?:[:=\-][ \t*_]*)?([1-9]\d{2}[ \t]?\d{3})\b",
        ),
        FieldPattern::new("bare", r"\b([1-9]\d{5})\b"),
    ]
});

static CITY_GAZETTEER: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    cities_longest_first()
        .iter()
        .map(|city| {
            let re = Regex::new(&format!(r"(?i)\b{}\b", regex::escape(city)))
                .expect("gazetteer city regex");
            (*city, re)
        })
        .collect()
});

/// Walks the tiers in order and returns the first capture accepted by
/// `accept`. Every match of a tier is tried before moving to the next tier.
pub(crate) fn first_match<F>(patterns: &[FieldPattern], text: &str, accept: F) -> Option<FieldMatch>
where
    F: Fn(&str) -> Option<String>,
{
    for pattern in patterns {
        for caps in pattern.regex.captures_iter(text) {
            let Some(raw) = caps.get(1) else {
                continue;
            };
            if let Some(value) = accept(raw.as_str()) {
                return Some(FieldMatch {
                    value,
                    tier: pattern.tier,
                });
            }
        }
    }
    None
}

/// True for lines made only of banner characters such as `*****` or `-=-=-`.
pub fn is_decorator_line(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty()
        && trimmed
            .chars()
            .all(|c| matches!(c, '*' | '-' | '=' | '_' | '~' | '#' | '•' | '.' | ' ' | '\t'))
}

fn strip_header_lines(text: &str) -> String {
    text.lines()
        .filter(|line| !is_decorator_line(line) && !HEADER_WORDS.is_match(line))
        .collect::<Vec<_>>()
        .join("\n")
}

fn strip_decorator_lines(text: &str) -> String {
    text.lines()
        .filter(|line| !is_decorator_line(line))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Truncates a captured value at the next `Key:` label on the same line.
pub(crate) fn cut_at_next_label(value: &str) -> &str {
    match FIELD_LABEL.find(value) {
        Some(m) => &value[..m.start()],
        None => value,
    }
}

pub(crate) fn trim_value(value: &str) -> &str {
    value.trim_matches(|c: char| {
        c.is_whitespace() || matches!(c, ',' | '.' | '-' | ';' | ':' | '*' | '_' | '|')
    })
}

fn first_segment(value: &str) -> &str {
    value.split(',').next().unwrap_or("")
}

fn accept_place(raw: &str, strip_word: Option<&Regex>) -> Option<String> {
    let value = first_segment(cut_at_next_label(raw));
    let value = match strip_word {
        Some(re) => re.replace_all(value, " ").into_owned(),
        None => value.to_string(),
    };
    let value = trim_value(&value).split_whitespace().collect::<Vec<_>>().join(" ");
    if value.is_empty() || value.chars().count() > 50 || !value.chars().any(char::is_alphabetic) {
        return None;
    }
    Some(value)
}

fn accept_name(raw: &str) -> Option<String> {
    let value = first_segment(cut_at_next_label(raw))
        .trim_matches(|c: char| c.is_whitespace() || matches!(c, '*' | '_' | '.' | ','));
    if !NAME_VALUE.is_match(value) {
        return None;
    }
    if NON_NAME_PREFIX.is_match(value) {
        tracing::debug!("Rejected name candidate starting with a field label: '{}'", value);
        return None;
    }
    let words = value.split_whitespace().count();
    if words == 0 || words > 5 {
        tracing::debug!("Rejected name candidate with {} words: '{}'", words, value);
        return None;
    }
    Some(to_title_case(value))
}

fn accept_digits(raw: &str, len: usize, first: fn(char) -> bool) -> Option<String> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    match digits.chars().next() {
        Some(c) if digits.len() == len && first(c) => Some(digits),
        _ => None,
    }
}

/// Labeled name field, title-cased. There is no unlabeled fallback.
pub fn name_match(text: &str) -> Option<FieldMatch> {
    let cleaned = strip_header_lines(text);
    first_match(&NAME_PATTERNS, &cleaned, accept_name)
}

/// Ten-digit Indian mobile number, labeled first, then bare.
pub fn phone_match(text: &str) -> Option<FieldMatch> {
    let cleaned = strip_decorator_lines(text);
    let cleaned = HOUSE_NUMBER_PHRASE.replace_all(&cleaned, " ");
    first_match(&PHONE_PATTERNS, &cleaned, |raw| {
        accept_digits(raw, 10, |c| matches!(c, '6'..='9'))
    })
}

/// Lower-cased email address, labeled first, then bare.
pub fn email_match(text: &str) -> Option<FieldMatch> {
    first_match(&EMAIL_PATTERNS, text, |raw| Some(raw.to_lowercase()))
}

/// City from a `City:` field, then a `District:` field, then the gazetteer.
pub fn city_match(text: &str) -> Option<FieldMatch> {
    if let Some(found) = first_match(&CITY_PATTERNS[..1], text, |raw| {
        accept_place(raw, Some(&*CITY_WORD))
    }) {
        return Some(found);
    }
    if let Some(found) = first_match(&CITY_PATTERNS[1..], text, |raw| {
        accept_place(raw, Some(&*DISTRICT_WORD))
    }) {
        return Some(found);
    }
    CITY_GAZETTEER
        .iter()
        .find(|(_, re)| re.is_match(text))
        .map(|(city, _)| FieldMatch {
            value: city.to_string(),
            tier: "gazetteer",
        })
}

/// State from a `State:` field, then a case-insensitive scan of known states.
pub fn state_match(text: &str) -> Option<FieldMatch> {
    if let Some(found) = first_match(&STATE_PATTERNS, text, |raw| accept_place(raw, None)) {
        return Some(found);
    }
    let lowered = text.to_lowercase();
    states_longest_first()
        .iter()
        .find(|(key, _)| lowered.contains(key))
        .map(|(_, canonical)| FieldMatch {
            value: canonical.to_string(),
            tier: "gazetteer",
        })
}

/// Six-digit PIN code, labeled first, then any bare six-digit number.
///
/// The bare tier will also pick up unrelated six-digit numbers when no label
/// is present.
pub fn pincode_match(text: &str) -> Option<FieldMatch> {
    first_match(&PINCODE_PATTERNS, text, |raw| {
        accept_digits(raw, 6, |c| matches!(c, '1'..='9'))
    })
}

pub fn extract_name(text: &str) -> Option<String> {
    name_match(text).map(|m| m.value)
}

pub fn extract_phone(text: &str) -> Option<String> {
    phone_match(text).map(|m| m.value)
}

pub fn extract_email(text: &str) -> Option<String> {
    email_match(text).map(|m| m.value)
}

pub fn extract_city(text: &str) -> Option<String> {
    city_match(text).map(|m| m.value)
}

pub fn extract_state(text: &str) -> Option<String> {
    state_match(text).map(|m| m.value)
}

pub fn extract_pincode(text: &str) -> Option<String> {
    pincode_match(text).map(|m| m.value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_labeled() {
        assert_eq!(extract_name("Name: priya sharma"), Some("Priya Sharma".to_string()));
        assert_eq!(extract_name("*Name:* Anjali Menon"), Some("Anjali Menon".to_string()));
        assert_eq!(extract_name("1. Full Name - RAHUL K"), Some("Rahul K".to_string()));
        assert_eq!(extract_name("naam: Ravi Kumar."), Some("Ravi Kumar".to_string()));
    }

    #[test]
    fn test_name_regional_script() {
        assert_eq!(extract_name("नाम: राम कुमार"), Some("राम कुमार".to_string()));
        assert_eq!(extract_name("പേര്: അനു"), Some("അനു".to_string()));
    }

    #[test]
    fn test_name_requires_label() {
        assert_eq!(extract_name("Priya Sharma\n9876543210"), None);
        assert_eq!(extract_name("House Name: Rose Villa"), None);
    }

    #[test]
    fn test_name_rejects_labels_and_long_values() {
        assert_eq!(extract_name("Name: House Rose Villa"), None);
        assert_eq!(extract_name("Name: Phone number below"), None);
        assert_eq!(extract_name("Name: one two three four five six"), None);
        assert_eq!(extract_name("Name: R"), None);
    }

    #[test]
    fn test_name_on_a_line_with_other_fields() {
        for text in [
            "Name: Priya Sharma, Phone: 9876543210",
            "Name: Priya Sharma Phone: 9876543210",
            "Name: Priya Sharma City: Kochi",
            "*Name:* priya sharma, Kochi",
        ] {
            assert_eq!(extract_name(text), Some("Priya Sharma".to_string()), "text {:?}", text);
        }
        assert_eq!(extract_name("Name: 9876543210, Kochi"), None);
    }

    #[test]
    fn test_name_skips_header_lines() {
        let text = "Name: Please send in this format\nName: Meera Nair";
        assert_eq!(extract_name(text), Some("Meera Nair".to_string()));
    }

    #[test]
    fn test_phone_labeled_and_prefixed() {
        assert_eq!(extract_phone("Phone: 9876543210"), Some("9876543210".to_string()));
        assert_eq!(extract_phone("Mobile: +91 98470 12345"), Some("9847012345".to_string()));
        assert_eq!(extract_phone("whatsapp no 09847012345"), Some("9847012345".to_string()));
        let found = phone_match("Contact: 987-654-3210").unwrap();
        assert_eq!(found.value, "9876543210");
        assert_eq!(found.tier, "labeled");
    }

    #[test]
    fn test_phone_bare_and_country_code() {
        let found = phone_match("call me on 9876543210 tomorrow").unwrap();
        assert_eq!(found.value, "9876543210");
        assert_eq!(found.tier, "bare");

        let found = phone_match("ping +919876543210").unwrap();
        assert_eq!(found.value, "9876543210");
        assert_eq!(found.tier, "country_code");
    }

    #[test]
    fn test_phone_rejects_invalid_numbers() {
        assert_eq!(extract_phone("Phone: 5876543210"), None);
        assert_eq!(extract_phone("12345678901234"), None);
        assert_eq!(extract_phone("Pin: 682001"), None);
    }

    #[test]
    fn test_phone_ignores_house_numbers() {
        assert_eq!(extract_phone("House No: 9876543210\nnothing else"), None);
        assert_eq!(
            extract_phone("House No: 42\nPhone: 9123456789"),
            Some("9123456789".to_string())
        );
    }

    #[test]
    fn test_email_extraction() {
        assert_eq!(
            extract_email("Email: Priya.Sharma@Example.COM"),
            Some("priya.sharma@example.com".to_string())
        );
        assert_eq!(
            extract_email("reach me at anu_k@mail.co.in please"),
            Some("anu_k@mail.co.in".to_string())
        );
        assert_eq!(extract_email("no email here @ all"), None);
    }

    #[test]
    fn test_city_labeled_strips_city_word() {
        let found = city_match("City: Kochi City").unwrap();
        assert_eq!(found.value, "Kochi");
        assert_eq!(found.tier, "labeled");
        assert_eq!(extract_city("City: Thrissur, Kerala"), Some("Thrissur".to_string()));
        assert_eq!(
            extract_city("City: Kochi State: Kerala"),
            Some("Kochi".to_string())
        );
    }

    #[test]
    fn test_city_falls_back_to_district() {
        let found = city_match("District: Ernakulam\nState: Kerala").unwrap();
        assert_eq!(found.value, "Ernakulam");
        assert_eq!(found.tier, "district");

        let found = city_match("City: \nDistrict: Kannur Dist").unwrap();
        assert_eq!(found.value, "Kannur");
    }

    #[test]
    fn test_city_gazetteer_prefers_longest() {
        let found = city_match("Near bus stand, Thiruvananthapuram").unwrap();
        assert_eq!(found.value, "Thiruvananthapuram");
        assert_eq!(found.tier, "gazetteer");
        assert_eq!(extract_city("shipping to kozhikode"), Some("Kozhikode".to_string()));
        assert_eq!(extract_city("Landmark: Near City Mall"), None);
    }

    #[test]
    fn test_state_extraction() {
        assert_eq!(extract_state("State: Kerala"), Some("Kerala".to_string()));
        assert_eq!(
            extract_state("Chennai, TAMIL NADU 600001"),
            Some("Tamil Nadu".to_string())
        );
        let found = state_match("deliver in west bengal").unwrap();
        assert_eq!(found.value, "West Bengal");
        assert_eq!(found.tier, "gazetteer");
        assert_eq!(extract_state("nothing relevant"), None);
        assert_eq!(extract_state("Cuttack, orissa"), Some("Orissa".to_string()));
        assert_eq!(extract_state("Salem, TAMILNADU"), Some("Tamil Nadu".to_string()));
    }

    #[test]
    fn test_pincode_extraction() {
        let found = pincode_match("Pincode: 682001").unwrap();
        assert_eq!(found.value, "682001");
        assert_eq!(found.tier, "labeled");
        assert_eq!(extract_pincode("PIN - 682 024"), Some("682024".to_string()));

        let found = pincode_match("Kochi 682011").unwrap();
        assert_eq!(found.tier, "bare");
        assert_eq!(found.value, "682011");
    }

    #[test]
    fn test_pincode_rejects_leading_zero_and_long_numbers() {
        assert_eq!(extract_pincode("Pin: 012345"), None);
        assert_eq!(extract_pincode("9876543210"), None);
    }

    #[test]
    fn test_pincode_bare_fallback_accepts_any_six_digits() {
        assert_eq!(extract_pincode("Order 123456 shipped"), Some("123456".to_string()));
    }

    #[test]
    fn test_decorator_lines() {
        assert!(is_decorator_line("*****"));
        assert!(is_decorator_line(" -=-=-=- "));
        assert!(!is_decorator_line(""));
        assert!(!is_decorator_line("** Name **"));
    }

    #[test]
    fn test_cut_at_next_label() {
        assert_eq!(cut_at_next_label("Kochi State: Kerala"), "Kochi ");
        assert_eq!(cut_at_next_label("Kochi"), "Kochi");
    }
}
