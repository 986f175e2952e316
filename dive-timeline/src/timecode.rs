//! `HH:MM:SS` timecode parsing.
//!
//! Timecodes are offsets into a recording unit and form the common time axis
//! all three event sources are merged on.

/// Parse an `HH:MM:SS` timecode into elapsed seconds.
///
/// Returns `None` for anything that does not match the three-field shape or
/// whose fields are not numeric. Minutes and seconds above 59 are rejected;
/// hours are unbounded since long deployments exceed a day of tape.
pub fn to_seconds(timecode: &str) -> Option<u64> {
    let mut parts = timecode.trim().splitn(3, ':');
    let hours: u64 = parts.next()?.parse().ok()?;
    let minutes: u64 = parts.next()?.parse().ok()?;
    let seconds: u64 = parts.next()?.parse().ok()?;
    if minutes > 59 || seconds > 59 {
        return None;
    }
    Some(hours * 3600 + minutes * 60 + seconds)
}

/// Format elapsed seconds back into an `HH:MM:SS` timecode.
pub fn from_seconds(total: u64) -> String {
    format!("{:02}:{:02}:{:02}", total / 3600, (total % 3600) / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_canonical_timecodes() {
        assert_eq!(to_seconds("00:00:00"), Some(0));
        assert_eq!(to_seconds("00:01:30"), Some(90));
        assert_eq!(to_seconds("01:02:03"), Some(3723));
        assert_eq!(to_seconds("27:00:00"), Some(97_200));
    }

    #[test]
    fn rejects_out_of_range_fields() {
        assert_eq!(to_seconds("00:60:00"), None);
        assert_eq!(to_seconds("00:00:61"), None);
    }

    #[test]
    fn rejects_malformed_input() {
        assert_eq!(to_seconds(""), None);
        assert_eq!(to_seconds("12:34"), None);
        assert_eq!(to_seconds("ab:cd:ef"), None);
        assert_eq!(to_seconds("1:2:3:4"), None);
    }

    #[test]
    fn tolerates_surrounding_whitespace() {
        assert_eq!(to_seconds(" 00:05:00 "), Some(300));
    }

    #[test]
    fn round_trips_through_formatting() {
        assert_eq!(from_seconds(3723), "01:02:03");
        assert_eq!(to_seconds(&from_seconds(90)), Some(90));
    }
}
