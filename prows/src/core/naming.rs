//! Bundle output file naming.

use chrono::NaiveDateTime;

pub const BUNDLE_PREFIX: &str = "bundled_";
const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// File name for a bundle produced at `at`: `bundled_<YYYYmmddHHMMSS>.py`.
///
/// Second granularity: two bundles in the same second share a name.
pub fn bundle_file_name(at: NaiveDateTime) -> String {
    format!("{BUNDLE_PREFIX}{}.py", at.format(TIMESTAMP_FORMAT))
}
