//! Edge URL construction.
//!
//! Turns a stored asset key plus display-variant options into a CDN URL of
//! the form `{base}/{src}/{params}/{filename}`, omitting empty segments.
//! Sources that are already resolved (`http...`, `blob...`, or empty) are
//! returned unchanged.

mod filename;
mod variant;

pub use filename::derive_edge_filename;
pub use variant::{
    is_reserved_key, Fit, Gravity, Metadata, ParseVariantError, Variant, VariantParams,
    RESERVED_KEYS,
};

use crate::config::EdgeConfig;
use crate::media::MediaType;

/// Prefixes of sources that already point somewhere fetchable.
const PASS_THROUGH_PREFIXES: [&str; 2] = ["http", "blob"];

/// Everything about an edge URL except the source key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgeUrlOptions {
    /// Label used for the filename; falls back to the source key.
    pub name: Option<String>,
    /// Decides the filename extension; `None` means image.
    pub media_type: Option<MediaType>,
    pub anim: Option<bool>,
    pub transcode: Option<bool>,
    pub variants: VariantParams,
}

impl EdgeUrlOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn media_type(mut self, media_type: MediaType) -> Self {
        self.media_type = Some(media_type);
        self
    }

    pub fn anim(mut self, anim: bool) -> Self {
        self.anim = Some(anim);
        self
    }

    pub fn transcode(mut self, transcode: bool) -> Self {
        self.transcode = Some(transcode);
        self
    }

    pub fn variant(mut self, variant: Variant) -> Self {
        self.variants.set(variant);
        self
    }

    pub fn width(self, width: u32) -> Self {
        self.variant(Variant::Width(width))
    }

    pub fn height(self, height: u32) -> Self {
        self.variant(Variant::Height(height))
    }

    pub fn fit(self, fit: Fit) -> Self {
        self.variant(Variant::Fit(fit))
    }

    pub fn blur(self, blur: u16) -> Self {
        self.variant(Variant::Blur(blur))
    }

    pub fn quality(self, quality: u8) -> Self {
        self.variant(Variant::Quality(quality))
    }

    pub fn gravity(self, gravity: Gravity) -> Self {
        self.variant(Variant::Gravity(gravity))
    }

    pub fn metadata(self, metadata: Metadata) -> Self {
        self.variant(Variant::Metadata(metadata))
    }

    pub fn background(self, background: impl Into<String>) -> Self {
        self.variant(Variant::Background(background.into()))
    }

    pub fn gamma(self, gamma: f64) -> Self {
        self.variant(Variant::Gamma(gamma))
    }

    pub fn optimized(self, optimized: bool) -> Self {
        self.variant(Variant::Optimized(optimized))
    }

    /// Comma-joined `key=value` list after flag normalization.
    ///
    /// `anim` is never emitted: a set flag and a cleared flag both normalize
    /// to "absent", pending a decision on whether the CDN should see it.
    /// `transcode` is emitted as `transcode=true` only when set.
    pub fn serialize_params(&self) -> String {
        let anim: Option<bool> = None;
        let transcode = self.transcode.filter(|&t| t);

        let flags = [("anim", anim), ("transcode", transcode)]
            .into_iter()
            .filter_map(|(key, value)| value.map(|v| format!("{key}={v}")));
        let variants = self.variants.iter().map(Variant::to_string);

        flags.chain(variants).collect::<Vec<_>>().join(",")
    }

    /// Filename segment for `src` under these options.
    pub fn filename_for(&self, src: &str) -> String {
        derive_edge_filename(
            src,
            self.name.as_deref(),
            self.media_type.unwrap_or_default(),
        )
    }
}

/// Returns true when `src` must be passed through untouched.
pub fn is_pass_through(src: &str) -> bool {
    src.is_empty() || PASS_THROUGH_PREFIXES.iter().any(|p| src.starts_with(p))
}

/// Builds edge URLs under one CDN base location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeUrlBuilder {
    base_location: String,
}

impl EdgeUrlBuilder {
    pub fn new(base_location: impl Into<String>) -> Self {
        Self {
            base_location: base_location.into(),
        }
    }

    pub fn from_config(cfg: &EdgeConfig) -> Self {
        Self::new(cfg.image_location.clone())
    }

    pub fn base_location(&self) -> &str {
        &self.base_location
    }

    /// Builds the delivery URL for `src`.
    ///
    /// Never fails: missing options resolve to defaults.
    ///
    /// # Examples
    ///
    /// - `build("abc123", &EdgeUrlOptions::new())` → `"{base}/abc123/abc123.jpeg"`
    /// - `build("https://x/y.png", ..)` → `"https://x/y.png"`
    pub fn build(&self, src: &str, opts: &EdgeUrlOptions) -> String {
        if is_pass_through(src) {
            tracing::trace!(src, "edge url pass-through");
            return src.to_string();
        }

        let params = opts.serialize_params();
        let filename = opts.filename_for(src);

        let url = [self.base_location.as_str(), src, params.as_str(), filename.as_str()]
            .into_iter()
            .filter(|segment| !segment.is_empty())
            .collect::<Vec<_>>()
            .join("/");
        tracing::trace!(src, url = %url, "built edge url");
        url
    }

    pub fn build_request(&self, req: &crate::request::AssetVariantRequest) -> String {
        self.build(&req.src, &req.options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://images.example.com/acct";

    fn builder() -> EdgeUrlBuilder {
        EdgeUrlBuilder::new(BASE)
    }

    #[test]
    fn pass_through_sources() {
        let opts = EdgeUrlOptions::new().width(100).name("x.png").transcode(true);
        for src in ["", "http://a/b.png", "https://a/b.png", "blob:https://a/1", "httpfoo"] {
            assert_eq!(builder().build(src, &opts), src);
        }
    }

    #[test]
    fn pass_through_is_case_sensitive() {
        let url = builder().build("HTTP-key", &EdgeUrlOptions::new());
        assert_eq!(url, format!("{BASE}/HTTP-key/HTTP-key.jpeg"));
    }

    #[test]
    fn bare_key_omits_param_segment() {
        assert_eq!(
            builder().build("abc123", &EdgeUrlOptions::new()),
            format!("{BASE}/abc123/abc123.jpeg")
        );
    }

    #[test]
    fn params_in_insertion_order() {
        let opts = EdgeUrlOptions::new()
            .quality(80)
            .width(450)
            .fit(Fit::Cover)
            .optimized(true);
        assert_eq!(
            builder().build("key", &opts),
            format!("{BASE}/key/quality=80,width=450,fit=cover,optimized=true/key.jpeg")
        );
    }

    #[test]
    fn transcode_true_leads_params() {
        let opts = EdgeUrlOptions::new().width(10).transcode(true);
        assert_eq!(opts.serialize_params(), "transcode=true,width=10");
    }

    #[test]
    fn transcode_false_omitted() {
        let opts = EdgeUrlOptions::new().transcode(false).width(10);
        assert_eq!(opts.serialize_params(), "width=10");
    }

    #[test]
    fn anim_never_emitted() {
        for anim in [true, false] {
            let opts = EdgeUrlOptions::new().anim(anim);
            assert_eq!(opts.serialize_params(), "");
            assert!(!builder().build("k", &opts).contains("anim"));
        }
    }

    #[test]
    fn reserved_keys_cannot_leak_through_variants() {
        let opts = EdgeUrlOptions::new()
            .transcode(true)
            .variant(Variant::Other {
                key: "anim".into(),
                value: "true".into(),
            })
            .variant(Variant::Other {
                key: "transcode".into(),
                value: "false".into(),
            })
            .width(8);
        assert_eq!(opts.serialize_params(), "transcode=true,width=8");
    }

    #[test]
    fn explicit_false_variant_is_kept() {
        let opts = EdgeUrlOptions::new().optimized(false);
        assert_eq!(opts.serialize_params(), "optimized=false");
    }

    #[test]
    fn video_extension_from_source() {
        let opts = EdgeUrlOptions::new().media_type(MediaType::Video);
        assert_eq!(
            builder().build("clip-key", &opts),
            format!("{BASE}/clip-key/clip-key.mp4")
        );
    }

    #[test]
    fn display_name_drives_filename() {
        let opts = EdgeUrlOptions::new().name("50% off.png").width(200);
        assert_eq!(
            builder().build("abc", &opts),
            format!("{BASE}/abc/width=200/50 off.jpeg")
        );
    }

    #[test]
    fn empty_base_location_is_omitted() {
        let b = EdgeUrlBuilder::new("");
        assert_eq!(b.build("abc", &EdgeUrlOptions::new()), "abc/abc.jpeg");
    }

    #[test]
    fn idempotent() {
        let opts = EdgeUrlOptions::new().width(1).gravity(Gravity::Top).name("n.gif");
        let b = builder();
        assert_eq!(b.build("s", &opts), b.build("s", &opts));
    }

    #[test]
    fn from_config_uses_image_location() {
        let cfg = EdgeConfig {
            image_location: BASE.to_string(),
            default_media_type: None,
        };
        assert_eq!(EdgeUrlBuilder::from_config(&cfg).base_location(), BASE);
    }
}
