//! Edge URL construction for CDN-delivered media variants.

pub mod config;
pub mod logging;

pub mod edge_url;
pub mod media;
pub mod request;

pub use edge_url::{EdgeUrlBuilder, EdgeUrlOptions};
pub use media::MediaType;
pub use request::AssetVariantRequest;
