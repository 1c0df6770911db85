#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod archive;
pub mod asset_paths;
pub mod bundler;
pub mod config;
pub mod extract;
pub mod models;
pub mod remap;
pub mod resolve;
pub mod rewrite;
pub mod sweep;

pub use archive::BundleResult;
pub use bundler::{AssetBundler, bundle_assets};
pub use config::BundlerConfig;
pub use models::Asset;
