//! Output generation for the digest.
//!
//! # Submodules
//!
//! - [`html`]: Renders a [`crate::models::Report`] into an escaped HTML document
//! - [`files`]: Writes the document under its "latest" and dated filenames
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! ├── daily.html
//! ├── 2025-05-05.html
//! └── 2025-05-06.html
//! ```

pub mod files;
pub mod html;
