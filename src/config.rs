//! Configuration types.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

/// Application configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// On-device database file backing the key-value slots.
    pub db_path: PathBuf,
    /// Port for the web client HTTP surface.
    pub http_port: u16,
    /// Initial value of the platform "reduce motion" setting.
    pub reduce_motion: bool,
    /// Offsets for the completion reveal.
    pub reveal: RevealTimings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("./data/qoncier.db"),
            http_port: 8080,
            reduce_motion: false,
            reveal: RevealTimings::default(),
        }
    }
}

impl AppConfig {
    /// Build configuration from `QONCIER_*` environment variables, falling back
    /// to defaults for anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let db_path = std::env::var("QONCIER_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.db_path);

        let http_port = match std::env::var("QONCIER_HTTP_PORT") {
            Ok(raw) => parse_value("QONCIER_HTTP_PORT", &raw)?,
            Err(_) => defaults.http_port,
        };

        let reduce_motion = match std::env::var("QONCIER_REDUCE_MOTION") {
            Ok(raw) => parse_value("QONCIER_REDUCE_MOTION", &raw)?,
            Err(_) => defaults.reduce_motion,
        };

        let reveal = match std::env::var("QONCIER_REVEAL_SCALE") {
            Ok(raw) => {
                let factor: f64 = parse_value("QONCIER_REVEAL_SCALE", &raw)?;
                if !factor.is_finite() || factor <= 0.0 {
                    return Err(ConfigError::InvalidValue {
                        key: "QONCIER_REVEAL_SCALE".to_string(),
                        message: format!("must be a positive number, got {factor}"),
                    });
                }
                RevealTimings::default().scaled(factor)
            }
            Err(_) => defaults.reveal,
        };

        Ok(Self {
            db_path,
            http_port,
            reduce_motion,
            reveal,
        })
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key: key.to_string(),
        message: e.to_string(),
    })
}

/// Offsets of every cue in the completion reveal, measured from the tap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RevealTimings {
    /// Ambient background and radial burst.
    pub burst: Duration,
    pub particles: Duration,
    pub caption: Duration,
    /// Phase change to `celebrating`.
    pub celebrating: Duration,
    pub badge: Duration,
    /// Achievement confirmation plus its haptic pulse.
    pub achievement: Duration,
    pub ring: Duration,
    /// Phase change to `revealing` and the full content reveal.
    pub reveal: Duration,
    pub journey_haptic: Duration,
    /// Phase change to `complete`.
    pub complete: Duration,
    /// Delay before `complete` on the reduced-motion path.
    pub reduced_motion_complete: Duration,
}

impl Default for RevealTimings {
    fn default() -> Self {
        Self {
            burst: Duration::ZERO,
            particles: Duration::from_millis(450),
            caption: Duration::from_millis(500),
            celebrating: Duration::from_millis(800),
            badge: Duration::from_millis(850),
            achievement: Duration::from_millis(1000),
            ring: Duration::from_millis(1200),
            reveal: Duration::from_millis(1500),
            journey_haptic: Duration::from_millis(2500),
            complete: Duration::from_millis(3000),
            reduced_motion_complete: Duration::from_millis(300),
        }
    }
}

impl RevealTimings {
    /// Multiply every offset by `factor`. Relative order is preserved.
    pub fn scaled(&self, factor: f64) -> Self {
        let s = |d: Duration| {
            Duration::from_nanos((d.as_nanos() as f64 * factor).round() as u64)
        };
        Self {
            burst: s(self.burst),
            particles: s(self.particles),
            caption: s(self.caption),
            celebrating: s(self.celebrating),
            badge: s(self.badge),
            achievement: s(self.achievement),
            ring: s(self.ring),
            reveal: s(self.reveal),
            journey_haptic: s(self.journey_haptic),
            complete: s(self.complete),
            reduced_motion_complete: s(self.reduced_motion_complete),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_offsets_are_ordered() {
        let t = RevealTimings::default();
        let offsets = [
            t.burst,
            t.particles,
            t.caption,
            t.celebrating,
            t.badge,
            t.achievement,
            t.ring,
            t.reveal,
            t.journey_haptic,
            t.complete,
        ];
        assert!(offsets.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(t.complete, Duration::from_millis(3000));
        assert!(t.reduced_motion_complete < t.complete);
    }

    #[test]
    fn scaling_preserves_order() {
        let t = RevealTimings::default().scaled(0.01);
        assert_eq!(t.complete, Duration::from_millis(30));
        assert_eq!(t.celebrating, Duration::from_millis(8));
        assert!(t.reduced_motion_complete < t.complete);
    }

    #[test]
    fn parse_value_reports_key() {
        let err = parse_value::<u16>("QONCIER_HTTP_PORT", "not-a-port").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("QONCIER_HTTP_PORT"), "got: {msg}");

        let port: u16 = parse_value("QONCIER_HTTP_PORT", " 9090 ").unwrap();
        assert_eq!(port, 9090);

        let flag: bool = parse_value("QONCIER_REDUCE_MOTION", "true").unwrap();
        assert!(flag);
    }
}
