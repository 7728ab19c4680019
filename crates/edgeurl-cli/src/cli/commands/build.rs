//! `edgeurl build <src>` – print the edge URL for one asset.

use anyhow::Result;
use edgeurl_core::config::EdgeConfig;
use edgeurl_core::edge_url::{EdgeUrlBuilder, EdgeUrlOptions, Variant};
use edgeurl_core::MediaType;

use crate::cli::BuildArgs;

pub fn run_build(cfg: &EdgeConfig, args: &BuildArgs) -> Result<()> {
    cfg.validate()?;
    let builder = EdgeUrlBuilder::from_config(cfg);
    let opts = build_options(args, cfg.default_media_type);
    println!("{}", builder.build(&args.src, &opts));
    Ok(())
}

/// Translates CLI flags into builder options, in flag declaration order.
pub fn build_options(args: &BuildArgs, default_media_type: Option<MediaType>) -> EdgeUrlOptions {
    let mut opts = EdgeUrlOptions::new();
    opts.name = args.name.clone();
    opts.media_type = args.media_type.or(default_media_type);
    opts.anim = args.anim.then_some(true);
    opts.transcode = args.transcode.then_some(true);

    let typed = [
        args.width.map(Variant::Width),
        args.height.map(Variant::Height),
        args.fit.map(Variant::Fit),
        args.blur.map(Variant::Blur),
        args.quality.map(Variant::Quality),
        args.gravity.map(Variant::Gravity),
        args.metadata.map(Variant::Metadata),
        args.background.clone().map(Variant::Background),
        args.gamma.map(Variant::Gamma),
        args.optimized.then_some(Variant::Optimized(true)),
    ];
    opts.variants.extend(typed.into_iter().flatten());
    opts.variants.extend(args.params.iter().cloned());
    opts
}
