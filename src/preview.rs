//! Sampling and summarising a large local JSON file.
//!
//! Only the head of the file is read, so a sample of a big document usually
//! does not parse; the raw text is shown instead.

use serde_json::Value;
use std::fs::File;
use std::io::Read;
use std::path::Path;

// -----------------------------------------------------------------------------
// Models
// -----------------------------------------------------------------------------

pub const SAMPLE_BYTES: usize = 10240;
pub const RAW_PREVIEW_CHARS: usize = 1000;
pub const MAX_KEYS_SHOWN: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub enum FilePreview {
    Missing,
    Found {
        size: u64,
        sample: Result<Sample, String>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Sample {
    Parsed { value: Value, shape: Shape },
    Raw { excerpt: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    Object {
        key_count: usize,
        keys: Vec<String>,
    },
    Array {
        item_count: usize,
        first_item_type: Option<&'static str>,
    },
    Scalar(&'static str),
}

// -----------------------------------------------------------------------------
// Functions
// -----------------------------------------------------------------------------

/// True only for an existing regular file.
pub fn file_exists(path: &Path) -> bool {
    path.is_file()
}

pub fn load_preview(path: &Path) -> FilePreview {
    if !file_exists(path) {
        return FilePreview::Missing;
    }

    let size = match path.metadata() {
        Ok(metadata) => metadata.len(),
        Err(err) => {
            return FilePreview::Found {
                size: 0,
                sample: Err(err.to_string()),
            }
        }
    };

    let sample = read_sample(path)
        .map(|text| sample_from_text(&text))
        .map_err(|err| err.to_string());

    FilePreview::Found { size, sample }
}

pub fn read_sample(path: &Path) -> std::io::Result<String> {
    let mut bytes = Vec::with_capacity(SAMPLE_BYTES);
    File::open(path)?
        .take(SAMPLE_BYTES as u64)
        .read_to_end(&mut bytes)?;
    Ok(decode_sample(&bytes))
}

/// Decodes UTF-8, dropping a code point cut off at the end of the sample.
pub fn decode_sample(bytes: &[u8]) -> String {
    let end = complete_prefix_len(bytes);
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

fn complete_prefix_len(bytes: &[u8]) -> usize {
    let len = bytes.len();
    for back in 1..=len.min(4) {
        let byte = bytes[len - back];
        if byte & 0xC0 == 0x80 {
            continue;
        }
        let width = match byte {
            0xC0..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF7 => 4,
            _ => 1,
        };
        return if width > back { len - back } else { len };
    }
    len
}

pub fn sample_from_text(text: &str) -> Sample {
    match serde_json::from_str::<Value>(text) {
        Ok(value) => {
            let shape = describe(&value);
            Sample::Parsed { value, shape }
        }
        Err(_) => Sample::Raw {
            excerpt: raw_excerpt(text),
        },
    }
}

pub fn raw_excerpt(text: &str) -> String {
    match text.char_indices().nth(RAW_PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

pub fn describe(value: &Value) -> Shape {
    match value {
        Value::Object(map) => Shape::Object {
            key_count: map.len(),
            keys: map.keys().take(MAX_KEYS_SHOWN).cloned().collect(),
        },
        Value::Array(items) => Shape::Array {
            item_count: items.len(),
            first_item_type: items.first().map(type_name),
        },
        other => Shape::Scalar(type_name(other)),
    }
}

pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Object(_) => "object",
        Value::Array(_) => "array",
    }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_file_exists() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("big.json");

        assert!(!file_exists(&path));
        assert!(!file_exists(dir.path()));

        std::fs::write(&path, "{}").expect("Failed to write");
        assert!(file_exists(&path));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        assert_eq!(load_preview(&dir.path().join("nope.json")), FilePreview::Missing);
    }

    #[test]
    fn test_small_object_parses() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("big.json");
        std::fs::write(&path, r#"{"b": 1, "a": [1, 2]}"#).expect("Failed to write");

        match load_preview(&path) {
            FilePreview::Found {
                size,
                sample: Ok(Sample::Parsed { value, shape }),
            } => {
                assert_eq!(size, 21);
                assert_eq!(value, json!({"b": 1, "a": [1, 2]}));
                assert_eq!(
                    shape,
                    Shape::Object {
                        key_count: 2,
                        keys: vec!["b".to_string(), "a".to_string()],
                    }
                );
            }
            other => panic!("unexpected preview: {:?}", other),
        }
    }

    #[test]
    fn test_large_file_falls_back_to_raw() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("big.json");
        let items: Vec<_> = (0..5000).map(|i| json!({"id": i, "name": "item"})).collect();
        let content = serde_json::to_string(&items).expect("Failed to serialize");
        assert!(content.len() > SAMPLE_BYTES);
        std::fs::write(&path, &content).expect("Failed to write");

        match load_preview(&path) {
            FilePreview::Found {
                size,
                sample: Ok(Sample::Raw { excerpt }),
            } => {
                assert_eq!(size, content.len() as u64);
                assert_eq!(excerpt.chars().count(), RAW_PREVIEW_CHARS + 3);
                assert!(excerpt.ends_with("..."));
                assert!(content.starts_with(&excerpt[..RAW_PREVIEW_CHARS]));
            }
            other => panic!("unexpected preview: {:?}", other),
        }
    }

    #[test]
    fn test_describe_shapes() {
        assert_eq!(
            describe(&json!([{"a": 1}, 2])),
            Shape::Array {
                item_count: 2,
                first_item_type: Some("object"),
            }
        );
        assert_eq!(
            describe(&json!([])),
            Shape::Array {
                item_count: 0,
                first_item_type: None,
            }
        );
        assert_eq!(describe(&json!("text")), Shape::Scalar("string"));
        assert_eq!(describe(&json!(null)), Shape::Scalar("null"));
        assert_eq!(describe(&json!(1.5)), Shape::Scalar("number"));
    }

    #[test]
    fn test_describe_keeps_document_key_order() {
        let value: Value =
            serde_json::from_str(r#"{"zeta": 1, "alpha": 2, "mid": 3}"#).expect("Failed to parse");

        assert_eq!(
            describe(&value),
            Shape::Object {
                key_count: 3,
                keys: vec!["zeta".to_string(), "alpha".to_string(), "mid".to_string()],
            }
        );
    }

    #[test]
    fn test_describe_limits_keys() {
        let map: serde_json::Map<String, Value> =
            (0..25).map(|i| (format!("k{:02}", i), json!(i))).collect();
        match describe(&Value::Object(map)) {
            Shape::Object { key_count, keys } => {
                assert_eq!(key_count, 25);
                assert_eq!(keys.len(), MAX_KEYS_SHOWN);
            }
            other => panic!("unexpected shape: {:?}", other),
        }
    }

    #[test]
    fn test_raw_excerpt_short_text_unchanged() {
        assert_eq!(raw_excerpt("not json"), "not json");
        let exact: String = "x".repeat(RAW_PREVIEW_CHARS);
        assert_eq!(raw_excerpt(&exact), exact);
    }

    #[test]
    fn test_decode_sample_drops_cut_code_point() {
        let text = "ab€";
        let bytes = text.as_bytes();
        assert_eq!(decode_sample(bytes), "ab€");
        assert_eq!(decode_sample(&bytes[..bytes.len() - 1]), "ab");
        assert_eq!(decode_sample(&bytes[..3]), "ab");
        assert_eq!(decode_sample(b"a\xffb"), "a\u{fffd}b");
        assert_eq!(decode_sample(b""), "");
    }
}
