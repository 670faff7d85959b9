use crate::error::{parse_err, VavooError};
use crate::model::{Channel, GroupedPlaylist, RawEntry, SourceConfig};
use crate::utils::{clean_channel_id, decode_html, percent_decode, strip_trailing_annotation, trace_if_enabled};
use log::{debug, warn};
use serde_json::Value;
use std::collections::HashSet;

fn value_to_string(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Number(num)) => num.to_string(),
        _ => String::new(),
    }
}

fn to_raw_entry(value: &Value) -> Option<RawEntry> {
    let record = value.as_object()?;
    Some(RawEntry {
        country: value_to_string(record.get("country")),
        name: value_to_string(record.get("name")),
        id: value_to_string(record.get("id")),
    })
}

/// Reads the channel records of the document. A single object counts as a
/// list with one record, list members that are no objects are skipped.
pub fn parse_vavoo_document(document: &Value) -> Result<Vec<RawEntry>, VavooError> {
    match document {
        Value::Array(records) => Ok(records.iter().enumerate()
            .filter_map(|(idx, record)| {
                let entry = to_raw_entry(record);
                if entry.is_none() {
                    warn!("{}", parse_err!("Skipping channel record {idx}, expected an object"));
                }
                entry
            })
            .collect()),
        Value::Object(_) => Ok(to_raw_entry(document).into_iter().collect()),
        _ => Err(parse_err!("Channel list is neither a list nor an object")),
    }
}

fn strip_line_breaks(text: &str) -> String {
    text.replace(['\r', '\n'], "").trim().to_string()
}

fn clean_name(name: &str) -> String {
    let decoded = strip_line_breaks(&percent_decode(name));
    let decoded = decode_html(&decoded);
    strip_trailing_annotation(decoded.trim()).trim().to_string()
}

/// Groups the entries by country. Stream urls are unique across all groups,
/// later duplicates are dropped.
pub fn group_entries(entries: Vec<RawEntry>, source: &SourceConfig) -> GroupedPlaylist {
    let mut playlist = GroupedPlaylist::new();
    let mut seen_urls: HashSet<String> = HashSet::new();
    let mut skipped = 0usize;
    let mut duplicates = 0usize;

    for entry in entries {
        let country = strip_line_breaks(&percent_decode(&entry.country));
        let name = clean_name(&entry.name);
        let id = clean_channel_id(&entry.id);
        if country.is_empty() || name.is_empty() || id.is_empty() {
            warn!("Skipping incomplete channel record country={:?} name={:?} id={:?}", entry.country, entry.name, entry.id);
            skipped += 1;
            continue;
        }
        let url = source.stream_url(&id);
        if seen_urls.insert(url.clone()) {
            playlist.push(&country, Channel::new(name, url));
        } else {
            trace_if_enabled!("Skipping duplicate stream {}", url);
            duplicates += 1;
        }
    }

    debug!("Grouped {} channels into {} groups, {skipped} skipped, {duplicates} duplicates",
        playlist.channel_count(), playlist.len());
    playlist
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use crate::model::{Channel, RawEntry, SourceConfig};
    use crate::processing::parser::vavoo::{group_entries, parse_vavoo_document};

    fn entry(country: &str, name: &str, id: &str) -> RawEntry {
        RawEntry { country: country.to_string(), name: name.to_string(), id: id.to_string() }
    }

    #[test]
    fn test_parse_document() {
        let doc = json!([{"country": "UK", "name": "Chan", "id": 123}, "garbage", {"country": "Italy"}]);
        let entries = parse_vavoo_document(&doc).unwrap();
        assert_eq!(entries, vec![entry("UK", "Chan", "123"), entry("Italy", "", "")]);
    }

    #[test]
    fn test_parse_single_object() {
        let doc = json!({"country": "UK", "name": "Chan", "id": "1"});
        assert_eq!(parse_vavoo_document(&doc).unwrap().len(), 1);
        assert!(parse_vavoo_document(&json!(42)).is_err());
    }

    #[test]
    fn test_group_cleans_values() {
        let playlist = group_entries(vec![entry("UK", "Chan (HD)", "1,2:3")], &SourceConfig::default());
        assert_eq!(playlist.get("UK").unwrap(), &vec![Channel::new("Chan", "https://vavoo.to/live2/play/123.ts")]);

        let playlist = group_entries(vec![entry("United%20Kingdom\r\n", "Sky%20News &amp; more [FHD]", "7")], &SourceConfig::default());
        assert_eq!(playlist.get("United Kingdom").unwrap()[0].name, "Sky News & more");
    }

    #[test]
    fn test_group_dedups_urls_globally() {
        let entries = vec![
            entry("UK", "Chan", "123"),
            entry("Italy", "Chan Copy", "1 2 3"),
            entry("UK", "Other", "456"),
        ];
        let playlist = group_entries(entries, &SourceConfig::default());
        assert_eq!(playlist.channel_count(), 2);
        assert!(playlist.get("Italy").is_none());
    }

    #[test]
    fn test_group_skips_incomplete() {
        let entries = vec![entry("", "Chan", "1"), entry("UK", " ", "2"), entry("UK", "Chan", ": ,"), entry("UK", "Ok", "3")];
        let playlist = group_entries(entries, &SourceConfig::default());
        assert_eq!(playlist.channel_count(), 1);
        assert_eq!(playlist.get("UK").unwrap()[0].name, "Ok");
    }
}
