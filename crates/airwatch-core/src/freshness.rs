//! Device freshness: online/offline status and "time since" labels.
//!
//! The reported status flag and the age of the last reading are kept apart.
//! [`Freshness::raw_status`] is what the device claims, [`Freshness::is_stale`]
//! is what its timestamp says, and [`FreshnessPolicy`] decides how the two
//! combine into [`Freshness::is_online`]. With the default
//! [`FreshnessPolicy::Passthrough`] a device that reports "online" stays
//! online however old its last reading is.
//!
//! # Example
//!
//! ```
//! use airwatch_core::freshness::{evaluate, FreshnessPolicy, FreshnessEvaluator};
//! use airwatch_types::{Device, DeviceStatus};
//! use time::macros::datetime;
//! use time::Duration;
//!
//! let now = datetime!(2024-01-15 12:00 UTC);
//! let device = Device::new("AQM-001", "Living Room")
//!     .with_status(DeviceStatus::Online)
//!     .with_last_seen(datetime!(2024-01-15 10:01 UTC));
//!
//! let freshness = evaluate(device.last_seen_at, device.raw_status, now);
//! assert!(freshness.is_online);
//! assert!(freshness.is_stale);
//! assert_eq!(freshness.recency_label, "1 hr ago");
//!
//! let strict = FreshnessEvaluator::new(FreshnessPolicy::StaleAfter(Duration::minutes(15)));
//! assert!(!strict.evaluate(&device, now).is_online);
//! ```

use core::fmt;

use serde::Serialize;
use time::{Duration, OffsetDateTime};

use airwatch_types::{Device, DeviceStatus};

/// Age after which a reading counts as stale when no threshold is configured.
pub const DEFAULT_STALE_AFTER: Duration = Duration::minutes(15);

const MINUTES_PER_HOUR: i64 = 60;
const MINUTES_PER_DAY: i64 = 24 * MINUTES_PER_HOUR;

/// Largest threshold a [`Duration`] can hold in whole minutes.
const MAX_POLICY_MINUTES: i64 = i64::MAX / 60;

/// How the reported status and the reading age combine into `is_online`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FreshnessPolicy {
    /// `is_online` is the reported status, unchanged.
    #[default]
    Passthrough,
    /// `is_online` requires the reported status and a reading younger than
    /// the given age.
    StaleAfter(Duration),
}

impl FreshnessPolicy {
    /// Build a policy from an optional threshold in minutes.
    pub fn from_minutes(minutes: Option<u64>) -> Self {
        match minutes {
            Some(m) => {
                let minutes = i64::try_from(m).unwrap_or(i64::MAX).min(MAX_POLICY_MINUTES);
                Self::StaleAfter(Duration::minutes(minutes))
            }
            None => Self::Passthrough,
        }
    }

    /// Age beyond which a reading is reported as stale.
    pub fn stale_after(&self) -> Duration {
        match self {
            FreshnessPolicy::Passthrough => DEFAULT_STALE_AFTER,
            FreshnessPolicy::StaleAfter(threshold) => *threshold,
        }
    }
}

/// Elapsed-time bucket, truncated at every tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "unit", content = "count", rename_all = "snake_case")]
pub enum Recency {
    /// Less than one minute.
    JustNow,
    /// 1 to 59 minutes.
    Minutes(i64),
    /// 1 to 23 hours.
    Hours(i64),
    /// One day or more.
    ///
    /// `None` is the never-seen case: the device has no `last_seen_at`, or
    /// its reported value was not a readable timestamp. It renders as
    /// "many days ago" rather than a count.
    Days(Option<i64>),
}

impl Recency {
    /// Bucket a whole-minute elapsed time. `None` means never seen.
    pub fn from_minutes(elapsed: Option<i64>) -> Self {
        match elapsed {
            None => Recency::Days(None),
            Some(m) if m < 1 => Recency::JustNow,
            Some(m) if m < MINUTES_PER_HOUR => Recency::Minutes(m),
            Some(m) if m < MINUTES_PER_DAY => Recency::Hours(m / MINUTES_PER_HOUR),
            Some(m) => Recency::Days(Some(m / MINUTES_PER_DAY)),
        }
    }
}

impl fmt::Display for Recency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recency::JustNow => write!(f, "just now"),
            Recency::Minutes(n) => write!(f, "{} min ago", n),
            Recency::Hours(n) => write!(f, "{} hr ago", n),
            Recency::Days(Some(n)) => write!(f, "{} days ago", n),
            Recency::Days(None) => write!(f, "many days ago"),
        }
    }
}

/// Result of evaluating a device's freshness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Freshness {
    /// Online according to the active [`FreshnessPolicy`].
    pub is_online: bool,
    /// Status flag as reported.
    pub raw_status: DeviceStatus,
    /// The last reading is older than the policy threshold, or there is none.
    pub is_stale: bool,
    /// Whole minutes since the last reading; `None` if never seen.
    pub elapsed_minutes: Option<i64>,
    pub recency: Recency,
    /// `recency` rendered for display.
    pub recency_label: String,
}

/// Whole minutes between `last_seen_at` and `now`.
///
/// Timestamps in the future count as zero.
pub fn elapsed_minutes(last_seen_at: Option<OffsetDateTime>, now: OffsetDateTime) -> Option<i64> {
    last_seen_at.map(|at| (now - at).whole_minutes().max(0))
}

/// Evaluates freshness under a fixed policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FreshnessEvaluator {
    policy: FreshnessPolicy,
}

impl FreshnessEvaluator {
    pub fn new(policy: FreshnessPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> FreshnessPolicy {
        self.policy
    }

    /// Evaluate a device record.
    #[must_use]
    pub fn evaluate(&self, device: &Device, now: OffsetDateTime) -> Freshness {
        self.evaluate_parts(device.last_seen_at, device.raw_status, now)
    }

    /// Evaluate a last-seen timestamp and reported status.
    #[must_use]
    pub fn evaluate_parts(
        &self,
        last_seen_at: Option<OffsetDateTime>,
        raw_status: DeviceStatus,
        now: OffsetDateTime,
    ) -> Freshness {
        let elapsed = elapsed_minutes(last_seen_at, now);
        let is_stale = match last_seen_at {
            Some(at) => now - at > self.policy.stale_after(),
            None => true,
        };
        let is_online = match self.policy {
            FreshnessPolicy::Passthrough => raw_status.is_online(),
            FreshnessPolicy::StaleAfter(_) => raw_status.is_online() && !is_stale,
        };
        let recency = Recency::from_minutes(elapsed);

        Freshness {
            is_online,
            raw_status,
            is_stale,
            elapsed_minutes: elapsed,
            recency,
            recency_label: recency.to_string(),
        }
    }
}

/// Evaluate with the default pass-through policy.
#[must_use]
pub fn evaluate(
    last_seen_at: Option<OffsetDateTime>,
    raw_status: DeviceStatus,
    now: OffsetDateTime,
) -> Freshness {
    FreshnessEvaluator::default().evaluate_parts(last_seen_at, raw_status, now)
}

/// The recency label alone.
#[must_use]
pub fn recency_label(last_seen_at: Option<OffsetDateTime>, now: OffsetDateTime) -> String {
    Recency::from_minutes(elapsed_minutes(last_seen_at, now)).to_string()
}
