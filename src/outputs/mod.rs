//! Output generation.
//!
//! # Submodules
//!
//! - [`json`]: Writes the [`Report`](crate::models::Report) as the single JSON
//!   document the front end renders from
//!
//! # Output Structure
//!
//! ```text
//! data.json
//! ├── lastUpdate   "YYYY/MM/DD HH:MM"
//! ├── categories   [{key, name, icon, count}, ...]
//! └── articles     [{id, title, summary, published_at, source, url, tags, category, metrics}, ...]
//! ```

pub mod json;
