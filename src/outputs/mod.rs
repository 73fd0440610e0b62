//! Output generation for a finished digest.
//!
//! # Submodules
//!
//! - [`markdown`]: Renders [`DigestResults`](crate::models::DigestResults) as the Markdown report
//! - [`json`]: Dumps the same records as JSON for other tools
//!
//! The Markdown report goes to stdout or the `--output` file; the JSON dump is
//! only written when `--json-output-dir` is set:
//!
//! ```text
//! json_output_dir/
//! └── 2025-05-06/
//!     └── mixture-of-experts_past-week.json
//! ```

pub mod json;
pub mod markdown;
