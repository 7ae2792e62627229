//! Update check against the GitHub releases API

use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::Duration;

use serde::Deserialize;

const RELEASE_API_URL: &str = "https://api.github.com/repos/crest-player/crest/releases/latest";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateStatus {
    UpToDate,
    Available { version: String, url: String },
}

#[derive(Debug, Deserialize)]
struct Release {
    tag_name: String,
    html_url: String,
}

/// Parse "v1.2.3" or "1.2.3" into a numeric triple
fn parse_version(tag: &str) -> Option<(u32, u32, u32)> {
    let trimmed = tag.trim().trim_start_matches('v');
    let mut parts = trimmed.split('.');
    let major = parts.next()?.parse().ok()?;
    let minor = parts.next()?.parse().ok()?;
    let patch = parts.next().unwrap_or("0").parse().ok()?;
    Some((major, minor, patch))
}

fn is_newer(candidate: &str, current: &str) -> bool {
    match (parse_version(candidate), parse_version(current)) {
        (Some(a), Some(b)) => a > b,
        _ => false,
    }
}

/// Query the latest release and compare against this build's version
pub fn check_for_update() -> Result<UpdateStatus, String> {
    let release: Release = ureq::get(RELEASE_API_URL)
        .set("Accept", "application/vnd.github+json")
        .set("User-Agent", concat!("crest/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(10))
        .call()
        .map_err(|e| e.to_string())?
        .into_json()
        .map_err(|e| e.to_string())?;

    if is_newer(&release.tag_name, env!("CARGO_PKG_VERSION")) {
        Ok(UpdateStatus::Available {
            version: release.tag_name.trim_start_matches('v').to_string(),
            url: release.html_url,
        })
    } else {
        Ok(UpdateStatus::UpToDate)
    }
}

/// Run the check on a background thread; poll the receiver from the UI tick
pub fn check_in_background() -> Receiver<Result<UpdateStatus, String>> {
    let (tx, rx) = mpsc::channel();
    let builder = thread::Builder::new().name("update-check".to_string());
    let spawned = builder.spawn(move || {
        let result = check_for_update();
        if let Err(ref e) = result {
            log::warn!("Update check failed: {}", e);
        }
        let _ = tx.send(result);
    });
    if let Err(e) = spawned {
        log::error!("Failed to spawn update check thread: {}", e);
    }
    rx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_version() {
        assert_eq!(parse_version("v1.2.3"), Some((1, 2, 3)));
        assert_eq!(parse_version("0.10.0"), Some((0, 10, 0)));
        assert_eq!(parse_version("2.1"), Some((2, 1, 0)));
        assert_eq!(parse_version("nightly"), None);
    }

    #[test]
    fn test_is_newer() {
        assert!(is_newer("v1.0.1", "1.0.0"));
        assert!(is_newer("2.0.0", "1.9.9"));
        assert!(!is_newer("1.0.0", "1.0.0"));
        assert!(!is_newer("0.9.0", "1.0.0"));
        assert!(!is_newer("garbage", "1.0.0"));
    }
}
