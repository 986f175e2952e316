//! Deterministic artifact filename generation.
//!
//! Pattern: `<prefix>_<YYYYMMDD>_<HHMMSS>[_<platformId>_<componentId>]<extension>`

use chrono::{DateTime, Utc};

/// Filename for a recording segment.
///
/// Deterministic given its inputs; segments of one session differ by their
/// seconds-resolution timestamp.
pub fn artifact_filename(
    prefix: &str,
    timestamp: DateTime<Utc>,
    platform_id: Option<&str>,
    component_id: Option<&str>,
    extension: &str,
) -> String {
    let mut name = format!("{}_{}", prefix, timestamp.format("%Y%m%d_%H%M%S"));
    if let Some(platform) = platform_id {
        name.push('_');
        name.push_str(platform);
    }
    if let Some(component) = component_id {
        name.push('_');
        name.push_str(component);
    }
    name.push_str(extension);
    name
}

/// Filename for a photo.
///
/// Photos can be taken several times per second, so the seconds-resolution
/// timestamp alone is not collision-resistant: a millisecond field and a
/// short random suffix are appended.
pub fn photo_filename(
    prefix: &str,
    timestamp: DateTime<Utc>,
    platform_id: Option<&str>,
    component_id: Option<&str>,
    extension: &str,
) -> String {
    let mut name = format!("{}_{}", prefix, timestamp.format("%Y%m%d_%H%M%S"));
    if let Some(platform) = platform_id {
        name.push('_');
        name.push_str(platform);
    }
    if let Some(component) = component_id {
        name.push('_');
        name.push_str(component);
    }
    let suffix: String = uuid::Uuid::new_v4().simple().to_string()[..6].to_string();
    name.push_str(&format!("_{:03}{}", timestamp.timestamp_subsec_millis(), suffix));
    name.push_str(extension);
    name
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 10, 15, 0).unwrap()
    }

    #[test]
    fn follows_the_documented_pattern() {
        let name = artifact_filename("DIVE", fixed_time(), None, None, ".webm");
        assert_eq!(name, "DIVE_20250301_101500.webm");
    }

    #[test]
    fn includes_platform_and_component_when_present() {
        let name = artifact_filename("DIVE", fixed_time(), Some("PLT-4"), Some("RISER-2"), ".mp4");
        assert_eq!(name, "DIVE_20250301_101500_PLT-4_RISER-2.mp4");
    }

    #[test]
    fn is_deterministic_for_identical_inputs() {
        let a = artifact_filename("ROV", fixed_time(), Some("PLT-4"), None, ".webm");
        let b = artifact_filename("ROV", fixed_time(), Some("PLT-4"), None, ".webm");
        assert_eq!(a, b);
    }

    #[test]
    fn photo_filenames_never_collide_within_one_second() {
        let a = photo_filename("PHOTO", fixed_time(), None, None, ".png");
        let b = photo_filename("PHOTO", fixed_time(), None, None, ".png");
        assert_ne!(a, b);
        assert!(a.starts_with("PHOTO_20250301_101500_"));
        assert!(a.ends_with(".png"));
    }
}
