//! Display-variant parameters applied by the CDN at delivery time.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error for a variant value that is not one of the accepted keywords.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind} {value:?} (expected one of: {expected})")]
pub struct ParseVariantError {
    pub kind: &'static str,
    pub value: String,
    pub expected: &'static str,
}

/// Declares a keyword enum with its wire names, `Display`, and `FromStr`.
macro_rules! keyword_enum {
    ($(#[$meta:meta])* $name:ident, $kind:literal, { $($variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $wire)] $variant),+
        }

        impl $name {
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $wire),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ParseVariantError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim() {
                    $($wire => Ok($name::$variant),)+
                    other => Err(ParseVariantError {
                        kind: $kind,
                        value: other.to_string(),
                        expected: concat!($($wire, " "),+),
                    }),
                }
            }
        }
    };
}

keyword_enum!(
    /// How the image is resized into the requested box.
    Fit, "fit", {
        ScaleDown => "scale-down",
        Contain => "contain",
        Cover => "cover",
        Crop => "crop",
        Pad => "pad",
    }
);

keyword_enum!(
    /// Anchor used when cropping.
    Gravity, "gravity", {
        Auto => "auto",
        Side => "side",
        Left => "left",
        Right => "right",
        Top => "top",
        Bottom => "bottom",
    }
);

keyword_enum!(
    /// Which embedded metadata survives the transformation.
    Metadata, "metadata", {
        Keep => "keep",
        Copyright => "copyright",
        None => "none",
    }
);

/// A single `key=value` variant option.
///
/// Ranges documented by the CDN (blur 0-250, quality 0-100) are not enforced
/// here; values are passed through as given.
#[derive(Debug, Clone, PartialEq)]
pub enum Variant {
    Width(u32),
    Height(u32),
    Fit(Fit),
    Blur(u16),
    Quality(u8),
    Gravity(Gravity),
    Metadata(Metadata),
    Background(String),
    Gamma(f64),
    Optimized(bool),
    /// Any option the CDN understands that has no typed variant.
    Other { key: String, value: String },
}

impl Variant {
    pub fn key(&self) -> &str {
        match self {
            Variant::Width(_) => "width",
            Variant::Height(_) => "height",
            Variant::Fit(_) => "fit",
            Variant::Blur(_) => "blur",
            Variant::Quality(_) => "quality",
            Variant::Gravity(_) => "gravity",
            Variant::Metadata(_) => "metadata",
            Variant::Background(_) => "background",
            Variant::Gamma(_) => "gamma",
            Variant::Optimized(_) => "optimized",
            Variant::Other { key, .. } => key,
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = self.key();
        match self {
            Variant::Width(v) | Variant::Height(v) => write!(f, "{key}={v}"),
            Variant::Fit(v) => write!(f, "{key}={v}"),
            Variant::Blur(v) => write!(f, "{key}={v}"),
            Variant::Quality(v) => write!(f, "{key}={v}"),
            Variant::Gravity(v) => write!(f, "{key}={v}"),
            Variant::Metadata(v) => write!(f, "{key}={v}"),
            Variant::Background(v) => write!(f, "{key}={v}"),
            Variant::Gamma(v) => write!(f, "{key}={v}"),
            Variant::Optimized(v) => write!(f, "{key}={v}"),
            Variant::Other { value, .. } => write!(f, "{key}={value}"),
        }
    }
}

/// Parses `key=value`, producing a typed variant when the key is known.
impl FromStr for Variant {
    type Err = ParseVariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |kind: &'static str, expected: &'static str| ParseVariantError {
            kind,
            value: s.to_string(),
            expected,
        };
        let (key, value) = s
            .split_once('=')
            .ok_or_else(|| invalid("parameter", "key=value"))?;
        let (key, value) = (key.trim(), value.trim());
        if key.is_empty() {
            return Err(invalid("parameter", "key=value"));
        }
        if is_reserved_key(key) {
            return Err(invalid("parameter", "a key other than anim, transcode, name, type or src"));
        }
        let number = |kind| invalid(kind, "a non-negative integer");
        Ok(match key {
            "width" => Variant::Width(value.parse().map_err(|_| number("width"))?),
            "height" => Variant::Height(value.parse().map_err(|_| number("height"))?),
            "blur" => Variant::Blur(value.parse().map_err(|_| number("blur"))?),
            "quality" => Variant::Quality(value.parse().map_err(|_| number("quality"))?),
            "fit" => Variant::Fit(value.parse()?),
            "gravity" => Variant::Gravity(value.parse()?),
            "metadata" => Variant::Metadata(value.parse()?),
            "background" => Variant::Background(value.to_string()),
            "gamma" => Variant::Gamma(value.parse().map_err(|_| invalid("gamma", "a number"))?),
            "optimized" => {
                Variant::Optimized(value.parse().map_err(|_| invalid("optimized", "true false"))?)
            }
            _ => Variant::Other {
                key: key.to_string(),
                value: value.to_string(),
            },
        })
    }
}

/// Keys carried by dedicated request fields; never valid as free-form options.
pub const RESERVED_KEYS: [&str; 5] = ["anim", "transcode", "name", "type", "src"];

pub fn is_reserved_key(key: &str) -> bool {
    RESERVED_KEYS.contains(&key)
}

/// Variant options in insertion order.
///
/// Setting a key that is already present replaces its value but keeps the
/// position of the first insertion. Options under a reserved key are dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariantParams(Vec<Variant>);

impl VariantParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, variant: Variant) {
        if is_reserved_key(variant.key()) {
            tracing::debug!(key = variant.key(), "dropping variant under reserved key");
            return;
        }
        match self.0.iter_mut().find(|v| v.key() == variant.key()) {
            Some(slot) => *slot = variant,
            None => self.0.push(variant),
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<Variant> {
        let idx = self.0.iter().position(|v| v.key() == key)?;
        Some(self.0.remove(idx))
    }

    pub fn get(&self, key: &str) -> Option<&Variant> {
        self.0.iter().find(|v| v.key() == key)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Variant> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Variant> for VariantParams {
    fn from_iter<I: IntoIterator<Item = Variant>>(iter: I) -> Self {
        let mut params = VariantParams::new();
        params.extend(iter);
        params
    }
}

impl Extend<Variant> for VariantParams {
    fn extend<I: IntoIterator<Item = Variant>>(&mut self, iter: I) {
        for variant in iter {
            self.set(variant);
        }
    }
}

impl<'a> IntoIterator for &'a VariantParams {
    type Item = &'a Variant;
    type IntoIter = std::slice::Iter<'a, Variant>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
