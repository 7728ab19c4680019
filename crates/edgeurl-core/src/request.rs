//! Asset variant requests and their JSON Lines encoding.
//!
//! A request is a JSON object keyed like the edge URL props:
//! `{"src": "abc", "name": "cat.png", "type": "image", "width": 300}`.
//! Key order is kept so variant parameters serialize in the order given.

use crate::edge_url::{EdgeUrlOptions, Variant};
use crate::media::MediaType;
use serde::de::{self, DeserializeOwned, Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::io::BufRead;

/// Source key plus the options to build its edge URL with.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssetVariantRequest {
    pub src: String,
    pub options: EdgeUrlOptions,
}

impl AssetVariantRequest {
    pub fn new(src: impl Into<String>, options: EdgeUrlOptions) -> Self {
        Self {
            src: src.into(),
            options,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("line {line}: read failed: {source}")]
    Io {
        line: usize,
        #[source]
        source: std::io::Error,
    },
    #[error("line {line}: invalid request: {source}")]
    Json {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

impl RequestError {
    pub fn line(&self) -> usize {
        match self {
            RequestError::Io { line, .. } | RequestError::Json { line, .. } => *line,
        }
    }
}

impl<'de> Deserialize<'de> for AssetVariantRequest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(RequestVisitor)
    }
}

struct RequestVisitor;

impl<'de> Visitor<'de> for RequestVisitor {
    type Value = AssetVariantRequest;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an asset variant request object")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut req = AssetVariantRequest::default();
        while let Some(key) = map.next_key::<String>()? {
            let opts = &mut req.options;
            match key.as_str() {
                "src" => req.src = map.next_value::<Option<String>>()?.unwrap_or_default(),
                "name" => opts.name = map.next_value()?,
                "type" => opts.media_type = map.next_value()?,
                "anim" => opts.anim = truthy(&map.next_value::<Value>()?),
                "transcode" => opts.transcode = truthy(&map.next_value::<Value>()?),
                _ => {
                    let value: Value = map.next_value()?;
                    let variant = decode_variant(key, &value)
                        .map_err(<A::Error as de::Error>::custom)?;
                    if let Some(variant) = variant {
                        opts.variants.set(variant);
                    }
                }
            }
        }
        Ok(req)
    }
}

/// Flag value by JavaScript truthiness; `null` is absent.
fn truthy(value: &Value) -> Option<bool> {
    match value {
        Value::Null => None,
        Value::Bool(b) => Some(*b),
        Value::Number(n) => Some(n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan())),
        Value::String(s) => Some(!s.is_empty()),
        Value::Array(_) | Value::Object(_) => Some(true),
    }
}

/// Typed variant when the value fits the key, otherwise the value as text.
fn decode_variant(key: String, value: &Value) -> Result<Option<Variant>, String> {
    fn typed<T: DeserializeOwned>(value: &Value, wrap: fn(T) -> Variant) -> Option<Variant> {
        T::deserialize(value).ok().map(wrap)
    }

    if value.is_null() {
        return Ok(None);
    }
    let variant = match key.as_str() {
        "width" => typed(value, Variant::Width),
        "height" => typed(value, Variant::Height),
        "fit" => typed(value, Variant::Fit),
        "blur" => typed(value, Variant::Blur),
        "quality" => typed(value, Variant::Quality),
        "gravity" => typed(value, Variant::Gravity),
        "metadata" => typed(value, Variant::Metadata),
        "background" => typed(value, Variant::Background),
        "gamma" => typed(value, Variant::Gamma),
        "optimized" => typed(value, Variant::Optimized),
        _ => None,
    };
    match variant {
        Some(variant) => Ok(Some(variant)),
        None => Ok(scalar_text(value)?.map(|text| Variant::Other { key, value: text })),
    }
}

fn scalar_text(value: &Value) -> Result<Option<String>, String> {
    match value {
        Value::Null => Ok(None),
        Value::Bool(b) => Ok(Some(b.to_string())),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::String(s) => Ok(Some(s.clone())),
        Value::Array(_) | Value::Object(_) => {
            Err(format!("variant parameter must be a scalar, got {value}"))
        }
    }
}

/// Parses one request per line.
///
/// Blank lines and lines starting with `#` are skipped. Each failure carries its
/// 1-based line number so callers can report and keep going.
pub fn parse_requests<R: BufRead>(
    reader: R,
) -> impl Iterator<Item = Result<AssetVariantRequest, RequestError>> {
    reader
        .lines()
        .enumerate()
        .filter_map(|(idx, line)| {
            let line_no = idx + 1;
            let line = match line {
                Ok(line) => line,
                Err(source) => return Some(Err(RequestError::Io { line: line_no, source })),
            };
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                return None;
            }
            Some(
                serde_json::from_str::<AssetVariantRequest>(trimmed)
                    .map_err(|source| RequestError::Json { line: line_no, source }),
            )
        })
}

/// Applies `media_type` to requests that name none.
pub fn apply_default_media_type(req: &mut AssetVariantRequest, media_type: Option<MediaType>) {
    if req.options.media_type.is_none() {
        req.options.media_type = media_type;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge_url::{EdgeUrlBuilder, Fit};

    fn decode(json: &str) -> AssetVariantRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn decodes_known_keys() {
        let req = decode(
            r#"{"src":"abc","name":"cat.png","type":"video","transcode":true,"width":300,"fit":"scale-down"}"#,
        );
        assert_eq!(req.src, "abc");
        assert_eq!(req.options.name.as_deref(), Some("cat.png"));
        assert_eq!(req.options.media_type, Some(MediaType::Video));
        assert_eq!(req.options.transcode, Some(true));
        assert_eq!(req.options.variants.get("width"), Some(&Variant::Width(300)));
        assert_eq!(req.options.variants.get("fit"), Some(&Variant::Fit(Fit::ScaleDown)));
    }

    #[test]
    fn keeps_json_key_order() {
        let req = decode(r#"{"quality":90,"src":"k","blur":20,"dpr":2,"width":64}"#);
        assert_eq!(req.options.serialize_params(), "quality=90,blur=20,dpr=2,width=64");
    }

    #[test]
    fn null_means_absent() {
        let req = decode(r#"{"src":"k","width":null,"name":null,"extra":null}"#);
        assert!(req.options.variants.is_empty());
        assert!(req.options.name.is_none());
    }

    #[test]
    fn missing_src_passes_through() {
        let req = decode(r#"{"width":10}"#);
        let url = EdgeUrlBuilder::new("https://cdn.example.com").build_request(&req);
        assert_eq!(url, "");
    }

    #[test]
    fn rejects_nested_values() {
        assert!(serde_json::from_str::<AssetVariantRequest>(r#"{"src":"k","x":[1]}"#).is_err());
        assert!(serde_json::from_str::<AssetVariantRequest>(r#"{"src":"k","width":{"a":1}}"#).is_err());
    }

    #[test]
    fn off_type_values_pass_through_as_text() {
        let cases = [
            (r#"{"src":"k","width":"auto"}"#, "width=auto"),
            (r#"{"src":"k","width":100.5}"#, "width=100.5"),
            (r#"{"src":"k","quality":300}"#, "quality=300"),
            (r#"{"src":"k","fit":"zoom"}"#, "fit=zoom"),
            (r#"{"src":"k","optimized":1}"#, "optimized=1"),
        ];
        for (json, params) in cases {
            assert_eq!(decode(json).options.serialize_params(), params, "{json}");
        }
    }

    #[test]
    fn off_type_value_keeps_first_position() {
        let req = decode(r#"{"src":"k","width":10,"blur":5,"width":"auto"}"#);
        assert_eq!(req.options.serialize_params(), "width=auto,blur=5");
    }

    #[test]
    fn flags_follow_truthiness() {
        let req = decode(r#"{"src":"k","transcode":1,"anim":"yes"}"#);
        assert_eq!(req.options.transcode, Some(true));
        assert_eq!(req.options.anim, Some(true));
        assert_eq!(req.options.serialize_params(), "transcode=true");

        let req = decode(r#"{"src":"k","transcode":0,"anim":""}"#);
        assert_eq!(req.options.transcode, Some(false));
        assert_eq!(req.options.anim, Some(false));
        assert_eq!(req.options.serialize_params(), "");

        let req = decode(r#"{"src":"k","transcode":"false"}"#);
        assert_eq!(req.options.serialize_params(), "transcode=true");

        let req = decode(r#"{"src":"k","transcode":null}"#);
        assert!(req.options.transcode.is_none());
    }

    #[test]
    fn parse_requests_skips_blank_and_comments() {
        let input = "# header\n{\"src\":\"a\"}\n\n{\"src\":\"b\"}\n";
        let srcs: Vec<_> = parse_requests(input.as_bytes())
            .map(|r| r.unwrap().src)
            .collect();
        assert_eq!(srcs, ["a", "b"]);
    }

    #[test]
    fn parse_requests_reports_line_numbers() {
        let input = "{\"src\":\"a\"}\nnot json\n{\"src\":\"c\"}\n";
        let results: Vec<_> = parse_requests(input.as_bytes()).collect();
        assert_eq!(results.len(), 3);
        assert_eq!(results[1].as_ref().unwrap_err().line(), 2);
        assert_eq!(results[2].as_ref().unwrap().src, "c");
    }

    #[test]
    fn default_media_type_fills_gaps_only() {
        let mut req = decode(r#"{"src":"k","type":"audio"}"#);
        apply_default_media_type(&mut req, Some(MediaType::Video));
        assert_eq!(req.options.media_type, Some(MediaType::Audio));

        let mut req = decode(r#"{"src":"k"}"#);
        apply_default_media_type(&mut req, Some(MediaType::Video));
        assert_eq!(req.options.media_type, Some(MediaType::Video));
    }
}
