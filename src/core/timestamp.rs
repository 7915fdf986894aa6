//! Formatting for the `/timestamp` reply.

use chrono::{DateTime, Local, TimeZone, Utc};
use chrono_tz::Tz;
use std::fmt::Display;

/// The host's IANA time zone, if the platform reports one chrono-tz knows.
#[must_use]
pub fn host_zone() -> Option<Tz> {
    match iana_time_zone::get_timezone() {
        Ok(name) => resolve_zone(&name),
        Err(e) => {
            tracing::debug!("Could not determine host time zone: {e}");
            None
        }
    }
}

/// Looks up an IANA zone name such as `America/New_York`.
#[must_use]
pub fn resolve_zone(name: &str) -> Option<Tz> {
    name.parse::<Tz>().ok()
}

/// Message for `now` in the host's native zone.
///
/// With a named zone the text ends in its abbreviation (`EDT`); without one it
/// falls back to the local UTC offset.
#[must_use]
pub fn native_timestamp_message(now: DateTime<Utc>, zone: Option<Tz>) -> String {
    match zone {
        Some(zone) => timestamp_message(&now.with_timezone(&zone)),
        None => timestamp_message(&now.with_timezone(&Local)),
    }
}

/// Renders `now` as a Discord short-time timestamp plus the same time as text.
///
/// Discord shows `<t:…:t>` in each reader's own zone; the plain-text part is in
/// the zone of `now`, named by its offset's display form. The hour is not zero
/// padded.
#[must_use]
pub fn timestamp_message<Z>(now: &DateTime<Z>) -> String
where
    Z: TimeZone,
    Z::Offset: Display,
{
    format!(
        "The time is {} in your current timezone, which is {} in {}, our native timezone.",
        discord_timestamp(now),
        now.format("%-I:%M %p"),
        now.format("%Z"),
    )
}

/// `<t:SECONDS:t>` markup for the instant, seconds rounded down.
#[must_use]
pub fn discord_timestamp<Z: TimeZone>(instant: &DateTime<Z>) -> String {
    format!("<t:{}:t>", instant.timestamp())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use chrono::{FixedOffset, Timelike};

    #[test]
    fn test_message_for_fixed_instant() {
        let now = Utc
            .with_ymd_and_hms(2024, 1, 1, 9, 5, 0)
            .unwrap()
            .with_nanosecond(750_000_000)
            .unwrap();

        assert_eq!(
            timestamp_message(&now),
            "The time is <t:1704099900:t> in your current timezone, \
             which is 9:05 AM in UTC, our native timezone."
        );
    }

    #[test]
    fn test_afternoon_in_offset_zone() {
        let zone = FixedOffset::east_opt(2 * 3600).unwrap();
        let now = zone.with_ymd_and_hms(2024, 1, 1, 14, 30, 0).unwrap();

        let message = timestamp_message(&now);
        assert!(message.contains("<t:1704112200:t>"));
        assert!(message.contains("which is 2:30 PM in +02:00"));
    }

    #[test]
    fn test_named_zone_uses_abbreviation() {
        let new_york = resolve_zone("America/New_York").unwrap();

        let summer = Utc.with_ymd_and_hms(2024, 7, 1, 20, 27, 0).unwrap();
        assert_eq!(
            native_timestamp_message(summer, Some(new_york)),
            "The time is <t:1719865620:t> in your current timezone, \
             which is 4:27 PM in EDT, our native timezone."
        );

        let winter = Utc.with_ymd_and_hms(2024, 1, 1, 14, 5, 0).unwrap();
        assert!(
            native_timestamp_message(winter, Some(new_york))
                .ends_with("which is 9:05 AM in EST, our native timezone.")
        );
    }

    #[test]
    fn test_resolve_zone_rejects_unknown_names() {
        assert_eq!(resolve_zone("Europe/Berlin"), Some(chrono_tz::Europe::Berlin));
        assert!(resolve_zone("Not/A_Zone").is_none());
    }

    #[test]
    fn test_without_zone_falls_back_to_local_offset() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 9, 5, 0).unwrap();
        assert!(native_timestamp_message(now, None).starts_with("The time is <t:1704099900:t>"));
    }
}
