//! Helpers for classifying references and computing archive paths.
//!
//! Filtering references and building archive-relative paths are split into focused
//! submodules so each can be tested independently of the filesystem-bound bundling code.

mod archive;
mod filters;

pub use archive::{
    archive_dir, relative_archive_reference, relative_to, suffixed_file_name, to_archive_path,
};
pub use filters::is_remote_reference;
