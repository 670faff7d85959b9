use std::borrow::Cow;
use crate::utils::CONSTANTS;

const FILENAME_TRIM_PATTERNS: &[char] = &['.', '-', '_'];

fn named_html_entity(name: &str) -> Option<&'static str> {
    let value = match name {
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",
        "nbsp" => " ",
        "ndash" => "–",
        "mdash" => "—",
        "laquo" => "«",
        "raquo" => "»",
        "auml" => "ä",
        "ouml" => "ö",
        "uuml" => "ü",
        "Auml" => "Ä",
        "Ouml" => "Ö",
        "Uuml" => "Ü",
        "szlig" => "ß",
        "agrave" => "à",
        "egrave" => "è",
        "eacute" => "é",
        "igrave" => "ì",
        "ograve" => "ò",
        "ugrave" => "ù",
        "ccedil" => "ç",
        "ntilde" => "ñ",
        _ => return None,
    };
    Some(value)
}

/// Decodes named and numeric html entities. Unknown entities are kept as they are.
pub fn decode_html(text: &str) -> Cow<'_, str> {
    if !text.contains('&') {
        return Cow::Borrowed(text);
    }
    CONSTANTS.re_html_entity.replace_all(text, |caps: &regex::Captures| {
        let entity = &caps[1];
        let numeric = entity.strip_prefix("#x").or_else(|| entity.strip_prefix("#X"))
            .map(|hex| u32::from_str_radix(hex, 16))
            .or_else(|| entity.strip_prefix('#').map(str::parse::<u32>));
        match numeric {
            Some(Ok(code)) => char::from_u32(code).map_or_else(|| caps[0].to_string(), |c| c.to_string()),
            Some(Err(_)) => caps[0].to_string(),
            None => named_html_entity(entity).map_or_else(|| caps[0].to_string(), ToString::to_string),
        }
    })
}

/// Percent decoding, invalid utf-8 sequences leave the text untouched.
pub fn percent_decode(text: &str) -> Cow<'_, str> {
    if !text.contains('%') {
        return Cow::Borrowed(text);
    }
    urlencoding::decode(text).unwrap_or(Cow::Borrowed(text))
}

/// Removes one trailing `(...)` or `[...]` annotation, `"Chan (HD)"` becomes `"Chan"`.
pub fn strip_trailing_annotation(text: &str) -> Cow<'_, str> {
    match CONSTANTS.re_trailing_annotation.find(text) {
        Some(m) if m.start() > 0 => Cow::Owned(text[..m.start()].trim_end().to_string()),
        _ => Cow::Borrowed(text),
    }
}

pub fn clean_channel_id(id: &str) -> String {
    id.chars().filter(|c| !matches!(c, ':' | ',' | ' ')).collect()
}

/// Turns a group key into the part of a bouquet file name:
/// ascii only, lowercase, whitespace runs become `_`, anything unsafe is dropped.
pub fn sanitize_bouquet_name(group_key: &str) -> String {
    let ascii = deunicode::deunicode(group_key);
    let cleaned: String = ascii
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '_' | '-' | '.'))
        .collect();
    let joined = cleaned.split_whitespace().collect::<Vec<&str>>().join("_");
    let name = joined.trim_matches(FILENAME_TRIM_PATTERNS).to_lowercase();
    if name.is_empty() {
        group_key.bytes().take(16).map(|b| format!("{b:02x}")).collect()
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use crate::utils::{clean_channel_id, decode_html, percent_decode, sanitize_bouquet_name, strip_trailing_annotation};

    #[test]
    fn test_decode_html() {
        assert_eq!(decode_html("Rai 1 &amp; Rai 2"), "Rai 1 & Rai 2");
        assert_eq!(decode_html("Caf&#233; &#x41;"), "Café A");
        assert_eq!(decode_html("&unknown; stays"), "&unknown; stays");
        assert_eq!(decode_html("no entities"), "no entities");
    }

    #[test]
    fn test_percent_decode() {
        assert_eq!(percent_decode("United%20Kingdom"), "United Kingdom");
        assert_eq!(percent_decode("100%"), "100%");
    }

    #[test]
    fn test_strip_trailing_annotation() {
        assert_eq!(strip_trailing_annotation("Chan (HD)"), "Chan");
        assert_eq!(strip_trailing_annotation("Sky Sport [Backup]"), "Sky Sport");
        assert_eq!(strip_trailing_annotation("Chan (1) News"), "Chan (1) News");
        assert_eq!(strip_trailing_annotation("(HD)"), "(HD)");
    }

    #[test]
    fn test_clean_channel_id() {
        assert_eq!(clean_channel_id("1,2:3"), "123");
        assert_eq!(clean_channel_id(" 45 : 6 "), "456");
    }

    #[test]
    fn test_sanitize_bouquet_name() {
        assert_eq!(sanitize_bouquet_name("United Kingdom"), "united_kingdom");
        assert_eq!(sanitize_bouquet_name("UK"), "uk");
        assert_eq!(sanitize_bouquet_name("Sport/News: *Live*"), "sportnews_live");
        assert_eq!(sanitize_bouquet_name("Österreich"), "osterreich");
        assert!(!sanitize_bouquet_name("➾").is_empty());
    }
}
