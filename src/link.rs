// Badge link normalization: shared-drive "view" links become direct downloads

use once_cell::sync::Lazy;
use regex::Regex;

/// Domain marker that identifies a shared-drive link
pub const DRIVE_MARKER: &str = "drive.google.com";

const DIRECT_DOWNLOAD_PREFIX: &str = "https://drive.google.com/uc?export=download&id=";

static FILE_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[-A-Za-z0-9_]{25,}").expect("file id pattern is a valid regex"));

/// Rewrite a shared-drive URL into its direct-download form.
///
/// The first run of 25 or more `[A-Za-z0-9_-]` characters is taken as the
/// file identifier. URLs without the drive marker, or without such a run,
/// come back unchanged.
pub fn normalize_badge_url(url: &str) -> String {
    if !url.contains(DRIVE_MARKER) {
        return url.to_string();
    }

    match FILE_ID.find(url) {
        Some(file_id) => format!("{}{}", DIRECT_DOWNLOAD_PREFIX, file_id.as_str()),
        None => url.to_string(),
    }
}
