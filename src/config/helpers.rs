use std::time::Duration;

use serde::{Deserialize, Deserializer, Serializer, de};

/// Custom deserializer for Duration from seconds.
///
/// Accepts either a plain number of seconds (`30`) or a human readable
/// duration string (`"30s"`, `"1m30s"`), so environment overrides can use
/// the same syntax as the interval argument.
pub fn deserialize_duration_from_seconds<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Secs(u64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Secs(secs) => Ok(Duration::from_secs(secs)),
        Raw::Text(text) => match text.trim().parse::<u64>() {
            Ok(secs) => Ok(Duration::from_secs(secs)),
            Err(_) => humantime::parse_duration(text.trim()).map_err(de::Error::custom),
        },
    }
}

/// Custom serializer for Duration to seconds
pub fn serialize_duration_to_seconds<S>(
    duration: &Duration,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u64(duration.as_secs())
}

/// Parses the scheduling interval given on the command line.
///
/// Uses the `30s` / `5m` / `1h30m` syntax and rejects a zero interval,
/// which would turn the scheduler into a busy loop.
pub fn parse_interval(raw: &str) -> Result<Duration, String> {
    let interval = humantime::parse_duration(raw).map_err(|e| {
        format!("invalid interval format '{raw}': {e} (examples: 30s, 5m, 1h30m)")
    })?;
    if interval.is_zero() {
        return Err(format!("invalid interval '{raw}': must be greater than zero"));
    }
    Ok(interval)
}
