//! Timestamp Normalization
//!
//! The backend mixes two timestamp shapes in the same fields: naive
//! wall-clock strings coming straight out of `datetime-local` form inputs
//! (`YYYY-MM-DDTHH:MM[:SS]`), and UTC instants generated server-side
//! (ISO 8601, usually with fractional seconds and no zone suffix).
//! Treating both the same way produces a systematic timezone-offset
//! display bug, so the two cases are kept on separate paths:
//!
//! - naive strings are echoed back with their literal digits, never
//!   converted;
//! - everything else parses as a UTC instant and is shifted to the
//!   viewer's offset for display.

use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, Offset, TimeZone, Utc};

/// Display format for all normalized timestamps.
const DISPLAY_FORMAT: &str = "%d/%m/%Y %H:%M";

/// Format a raw backend timestamp for display in the viewer's timezone.
///
/// Never fails: unparseable input is returned unchanged (with a logged
/// warning), empty input yields an empty string.
pub fn normalize(raw: &str) -> String {
    normalize_with_offset(raw, Local::now().offset().fix())
}

/// Like [`normalize`], for an `Option` field.
pub fn normalize_opt(raw: Option<&str>) -> String {
    raw.map(normalize).unwrap_or_default()
}

/// [`normalize`] with an explicit viewer offset instead of [`Local`].
///
/// The offset only affects the instant branch; naive strings display
/// their literal digits under every offset.
pub fn normalize_with_offset(raw: &str, offset: FixedOffset) -> String {
    if raw.is_empty() {
        return String::new();
    }

    if is_naive_local(raw) {
        match parse_naive(raw) {
            Some(dt) => return dt.format(DISPLAY_FORMAT).to_string(),
            None => {
                tracing::warn!(raw, "failed to parse naive timestamp");
                return raw.to_string();
            }
        }
    }

    match parse_instant(raw) {
        Some(instant) => instant
            .with_timezone(&offset)
            .format(DISPLAY_FORMAT)
            .to_string(),
        None => {
            tracing::warn!(raw, "failed to parse instant timestamp");
            raw.to_string()
        }
    }
}

/// Parse a raw backend timestamp as a UTC instant, for ordering.
///
/// Naive wall-clock strings are ordered by their literal digits (read as
/// UTC); real instants by their absolute value. Sorting must never fall
/// back to string comparison.
pub fn parse_sort_key(raw: &str) -> Option<DateTime<Utc>> {
    if is_naive_local(raw) {
        return parse_naive(raw).map(|dt| Utc.from_utc_datetime(&dt));
    }
    parse_instant(raw).map(|dt| dt.with_timezone(&Utc))
}

/// Boundary check for the `datetime-local` input shape:
/// `YYYY-MM-DDTHH:MM` through `YYYY-MM-DDTHH:MM:SS` (16-19 chars),
/// never a trailing zone marker.
fn is_naive_local(raw: &str) -> bool {
    raw.contains('T') && (16..=19).contains(&raw.len()) && !raw.ends_with('Z')
}

fn parse_naive(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M"))
        .ok()
}

fn parse_instant(raw: &str) -> Option<DateTime<FixedOffset>> {
    // RFC 3339 first ("...Z" / "...+02:00"), then the zone-less ISO
    // shape Python's `datetime.utcnow().isoformat()` produces, which is
    // UTC by contract.
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|dt| Utc.from_utc_datetime(&dt).fixed_offset())
        })
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f")
                .ok()
                .map(|dt| Utc.from_utc_datetime(&dt).fixed_offset())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offset_hours(h: i32) -> FixedOffset {
        FixedOffset::east_opt(h * 3600).unwrap()
    }

    #[test]
    fn naive_string_keeps_literal_digits_in_any_offset() {
        for h in [-11, -3, 0, 5, 13] {
            let out = normalize_with_offset("2024-03-09T14:30", offset_hours(h));
            assert_eq!(out, "09/03/2024 14:30");
        }
    }

    #[test]
    fn naive_string_with_seconds_is_still_naive() {
        let out = normalize_with_offset("2024-03-09T14:30:59", offset_hours(-5));
        assert_eq!(out, "09/03/2024 14:30");
    }

    #[test]
    fn trailing_z_forces_instant_branch() {
        // Same length as a naive string, but the zone marker makes it
        // an absolute instant.
        let out = normalize_with_offset("2024-03-09T14:30:00Z", offset_hours(2));
        assert_eq!(out, "09/03/2024 16:30");
    }

    #[test]
    fn backend_microsecond_instant_converts_to_viewer_offset() {
        // datetime.utcnow().isoformat() shape: 26 chars, no suffix.
        let out = normalize_with_offset("2024-03-09T23:30:00.123456", offset_hours(3));
        assert_eq!(out, "10/03/2024 02:30");
    }

    #[test]
    fn rfc3339_with_offset_converts() {
        let out = normalize_with_offset("2024-01-01T10:00:00+02:00", offset_hours(0));
        assert_eq!(out, "01/01/2024 08:00");
    }

    #[test]
    fn instant_branch_is_idempotent_on_calendar_date() {
        let offset = offset_hours(1);
        let first = normalize_with_offset("2024-06-15T08:00:00Z", offset);
        assert_eq!(first, "15/06/2024 09:00");
        // Re-normalizing output parsed back under the same offset keeps
        // the displayed calendar date.
        let reparsed = NaiveDateTime::parse_from_str(&first, DISPLAY_FORMAT).unwrap();
        assert_eq!(reparsed.format("%d/%m/%Y").to_string(), "15/06/2024");
    }

    #[test]
    fn empty_and_missing_yield_empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize_opt(None), "");
    }

    #[test]
    fn junk_is_returned_unchanged() {
        assert_eq!(normalize("not-a-date"), "not-a-date");
        assert_eq!(normalize("2024-13-99T99:99"), "2024-13-99T99:99");
    }

    #[test]
    fn sort_key_orders_mixed_shapes_by_instant() {
        let naive = parse_sort_key("2024-01-01T10:00").unwrap();
        let instant = parse_sort_key("2024-01-02T10:00:00.000001").unwrap();
        assert!(naive < instant);
        assert!(parse_sort_key("nonsense").is_none());
    }
}
