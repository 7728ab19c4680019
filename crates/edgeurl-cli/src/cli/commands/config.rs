//! `edgeurl config` – show where settings come from.

use anyhow::Result;
use edgeurl_core::config::{self, EdgeConfig};
use std::path::Path;

pub fn run_config(cfg: &EdgeConfig, explicit_path: Option<&Path>) -> Result<()> {
    let path = match explicit_path {
        Some(p) => p.to_path_buf(),
        None => config::config_path()?,
    };
    println!("config file:        {}", path.display());
    if cfg.image_location.is_empty() {
        println!("image_location:     (unset)");
    } else {
        println!("image_location:     {}", cfg.image_location);
    }
    match cfg.default_media_type {
        Some(kind) => println!("default_media_type: {kind}"),
        None => println!("default_media_type: (image)"),
    }
    if let Err(err) = cfg.validate() {
        println!("status:             {err}");
    } else {
        println!("status:             ok");
    }
    Ok(())
}
