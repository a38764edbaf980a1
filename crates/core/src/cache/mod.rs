//! Filesystem cache for base64-encoded images.
//!
//! Entries live at `<cache_dir>/<cache_key>/<filename>` and hold a complete
//! `data:<mime>;base64,<payload>` string. They are never invalidated; removal
//! happens out-of-band.
//!
//! - [`ImageCache::resolve`] is the read-through lookup: a readable entry is
//!   returned verbatim, anything else falls through to an [`ImageSource`].
//! - [`ImageCache::store`] is the separate write path used after a miss.

pub mod image;
pub mod path;

pub use image::{ImageCache, ImageSource};
pub use path::entry_path;
