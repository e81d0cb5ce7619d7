// SPDX-License-Identifier: MIT OR Apache-2.0

//! Retry backoff policies and their compact textual form.
//!
//! A policy is written as a comma-separated list of items:
//!
//! ```text
//! spec     := item ( "," item )*
//! item     := tier | "cap" duration | "jitter"
//! tier     := duration [ "x" count | "*" factor ]
//! duration := digits ( "ms" | "s" | "m" )
//! ```
//!
//! - `500ms` is one attempt delayed by 500 milliseconds.
//! - `1sx3` is three consecutive attempts delayed by one second each.
//! - `1s*2` is open-ended growth: 1s, 2s, 4s, ... It must be the last tier and
//!   needs an explicit cap.
//! - `cap30s` bounds every delay. Without it the cap is the last tier's delay.
//! - `jitter` marks the policy for full jitter; see [`BackoffPolicy::jittered_delay`].
//!
//! Once the listed tiers are exhausted every further attempt is delayed by the cap.
//! Tiers may never get shorter, so delays are non-decreasing in the attempt number.
//! Parsing is all-or-nothing.

use crate::domain::errors::{BackoffErrorKind, BackoffParseError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

const MILLIS_PER_SECOND: u64 = 1_000;
const MILLIS_PER_MINUTE: u64 = 60_000;

/// A run of attempts sharing the same delay.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Tier {
    delay: Duration,
    repeat: u32,
}

/// Open-ended geometric growth starting at `base`.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Growth {
    base: Duration,
    factor: f64,
}

impl Growth {
    /// Delay for the zero-based `step` into the growth tier, clamped to `cap`.
    fn delay_at(&self, step: u64, cap: Duration) -> Duration {
        let exponent = i32::try_from(step).unwrap_or(i32::MAX);
        let millis = self.base.as_millis() as f64 * self.factor.powi(exponent);
        if !millis.is_finite() || millis >= cap.as_millis() as f64 {
            cap
        } else {
            Duration::from_millis(millis.round() as u64)
        }
    }
}

/// An immutable retry schedule.
///
/// # Examples
///
/// ```
/// use cfgbind::domain::backoff::BackoffPolicy;
/// use std::time::Duration;
///
/// let policy: BackoffPolicy = "100ms,200ms,1s*2,cap10s".parse().unwrap();
///
/// assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(100));
/// assert_eq!(policy.delay_for_attempt(3), Duration::from_secs(1));
/// assert_eq!(policy.delay_for_attempt(4), Duration::from_secs(2));
/// assert_eq!(policy.delay_for_attempt(50), Duration::from_secs(10));
/// assert_eq!(policy.cap(), Duration::from_secs(10));
/// assert_eq!(policy.to_string(), "100ms,200ms,1s*2,cap10s");
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BackoffPolicy {
    tiers: Vec<Tier>,
    growth: Option<Growth>,
    explicit_cap: Option<Duration>,
    cap: Duration,
    jitter: bool,
}

impl BackoffPolicy {
    /// Parses a textual backoff specification.
    ///
    /// # Errors
    ///
    /// Returns a [`BackoffParseError`] carrying the offending substring if the
    /// input is empty, uses an unknown unit, has a non-positive duration, a
    /// malformed modifier, a decreasing tier, or a cap below the first delay.
    pub fn parse(spec: &str) -> Result<Self, BackoffParseError> {
        let trimmed = spec.trim();
        if trimmed.is_empty() {
            return Err(BackoffParseError::new(BackoffErrorKind::Empty, spec));
        }

        let mut builder = PolicyBuilder::default();
        for raw in trimmed.split(',') {
            let item = raw.trim();
            if item.is_empty() {
                return Err(BackoffParseError::new(BackoffErrorKind::Empty, trimmed));
            }
            if let Some(rest) = item.strip_prefix("cap") {
                builder.cap(item, parse_duration(rest)?)?;
            } else if item == "jitter" {
                builder.jitter(item)?;
            } else {
                builder.tier(item)?;
            }
        }
        builder.finish(trimmed)
    }

    /// Returns the delay before the `attempt`-th retry.
    ///
    /// Attempts are numbered from 1; attempt 0 is treated as attempt 1. The
    /// result never exceeds [`BackoffPolicy::cap`] and never decreases as
    /// `attempt` grows.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let mut index = u64::from(attempt.max(1)) - 1;
        for tier in &self.tiers {
            if index < u64::from(tier.repeat) {
                return tier.delay.min(self.cap);
            }
            index -= u64::from(tier.repeat);
        }
        match &self.growth {
            Some(growth) => growth.delay_at(index, self.cap),
            None => self.cap,
        }
    }

    /// Returns the maximum delay this policy ever produces.
    pub fn cap(&self) -> Duration {
        self.cap
    }

    /// Returns `true` if the policy asks for jittered delays.
    pub fn jitter(&self) -> bool {
        self.jitter
    }

    /// Applies full jitter to the delay for `attempt`.
    ///
    /// `sample` is a caller-supplied random number in `[0, 1)`; values outside
    /// that range are clamped. Policies without the `jitter` flag ignore it.
    ///
    /// # Examples
    ///
    /// ```
    /// use cfgbind::domain::backoff::BackoffPolicy;
    /// use std::time::Duration;
    ///
    /// let policy: BackoffPolicy = "1s,jitter".parse().unwrap();
    /// assert_eq!(policy.jittered_delay(1, 0.25), Duration::from_millis(250));
    /// ```
    pub fn jittered_delay(&self, attempt: u32, sample: f64) -> Duration {
        let delay = self.delay_for_attempt(attempt);
        if !self.jitter {
            return delay;
        }
        let sample = if sample.is_finite() {
            sample.clamp(0.0, 1.0)
        } else {
            1.0
        };
        delay.mul_f64(sample)
    }

    /// Iterates over the delays for attempts 1, 2, 3, ...
    pub fn attempts(&self) -> impl Iterator<Item = Duration> + '_ {
        (1..=u32::MAX).map(move |attempt| self.delay_for_attempt(attempt))
    }

    /// Returns how many attempts the fixed tiers cover before growth or the cap
    /// takes over.
    pub fn fixed_attempts(&self) -> u64 {
        self.tiers.iter().map(|t| u64::from(t.repeat)).sum()
    }
}

impl FromStr for BackoffPolicy {
    type Err = BackoffParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BackoffPolicy::parse(s)
    }
}

impl TryFrom<String> for BackoffPolicy {
    type Error = BackoffParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        BackoffPolicy::parse(&value)
    }
}

impl From<BackoffPolicy> for String {
    fn from(policy: BackoffPolicy) -> Self {
        policy.to_string()
    }
}

/// Writes the canonical form, which parses back to an equal policy.
impl fmt::Display for BackoffPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut items = Vec::with_capacity(self.tiers.len() + 3);
        for tier in &self.tiers {
            if tier.repeat > 1 {
                items.push(format!("{}x{}", format_duration(tier.delay), tier.repeat));
            } else {
                items.push(format_duration(tier.delay));
            }
        }
        if let Some(growth) = &self.growth {
            items.push(format!("{}*{}", format_duration(growth.base), growth.factor));
        }
        if let Some(cap) = self.explicit_cap {
            items.push(format!("cap{}", format_duration(cap)));
        }
        if self.jitter {
            items.push("jitter".to_string());
        }
        f.write_str(&items.join(","))
    }
}

fn format_duration(duration: Duration) -> String {
    let millis = duration.as_millis();
    if millis % u128::from(MILLIS_PER_MINUTE) == 0 {
        format!("{}m", millis / u128::from(MILLIS_PER_MINUTE))
    } else if millis % u128::from(MILLIS_PER_SECOND) == 0 {
        format!("{}s", millis / u128::from(MILLIS_PER_SECOND))
    } else {
        format!("{}ms", millis)
    }
}

fn parse_duration(text: &str) -> Result<Duration, BackoffParseError> {
    let text = text.trim();
    if text.starts_with('-') {
        return Err(BackoffParseError::new(
            BackoffErrorKind::NonPositiveDuration,
            text,
        ));
    }

    let split = text
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(text.len());
    let (digits, unit) = text.split_at(split);
    if digits.is_empty() || unit.starts_with('.') {
        return Err(BackoffParseError::new(BackoffErrorKind::InvalidDuration, text));
    }

    let scale = match unit.trim() {
        "ms" => 1,
        "s" => MILLIS_PER_SECOND,
        "m" => MILLIS_PER_MINUTE,
        _ => return Err(BackoffParseError::new(BackoffErrorKind::UnknownUnit, text)),
    };

    let amount: u64 = digits
        .parse()
        .map_err(|_| BackoffParseError::new(BackoffErrorKind::InvalidDuration, text))?;
    if amount == 0 {
        return Err(BackoffParseError::new(
            BackoffErrorKind::NonPositiveDuration,
            text,
        ));
    }

    amount
        .checked_mul(scale)
        .map(Duration::from_millis)
        .ok_or_else(|| BackoffParseError::new(BackoffErrorKind::InvalidDuration, text))
}

enum Modifier {
    Once,
    Repeat(u32),
    Grow(f64),
}

fn parse_tier(item: &str) -> Result<(Duration, Modifier), BackoffParseError> {
    let malformed = || BackoffParseError::new(BackoffErrorKind::MalformedModifier, item);

    let Some(at) = item.find(|c: char| c == 'x' || c == '*') else {
        return Ok((parse_duration(item)?, Modifier::Once));
    };
    let (duration, modifier) = item.split_at(at);
    let delay = parse_duration(duration)?;
    let argument = modifier[1..].trim();

    let modifier = if modifier.starts_with('x') {
        match argument.parse::<u32>() {
            Ok(count) if count > 0 => Modifier::Repeat(count),
            _ => return Err(malformed()),
        }
    } else {
        match argument.parse::<f64>() {
            Ok(factor) if factor.is_finite() && factor > 1.0 => Modifier::Grow(factor),
            _ => return Err(malformed()),
        }
    };
    Ok((delay, modifier))
}

#[derive(Default)]
struct PolicyBuilder {
    tiers: Vec<Tier>,
    growth: Option<(Growth, String)>,
    cap: Option<(Duration, String)>,
    jitter: bool,
}

impl PolicyBuilder {
    fn has_tiers(&self) -> bool {
        !self.tiers.is_empty() || self.growth.is_some()
    }

    fn tier(&mut self, item: &str) -> Result<(), BackoffParseError> {
        let (delay, modifier) = parse_tier(item)?;

        if self.cap.is_some() || self.jitter {
            return Err(BackoffParseError::new(BackoffErrorKind::MisplacedItem, item));
        }
        if self.growth.is_some() {
            return Err(BackoffParseError::new(BackoffErrorKind::GrowthNotLast, item));
        }
        if let Some(last) = self.tiers.last() {
            if delay < last.delay {
                return Err(BackoffParseError::new(BackoffErrorKind::DecreasingTier, item));
            }
        }

        match modifier {
            Modifier::Grow(factor) => {
                self.growth = Some((Growth { base: delay, factor }, item.to_string()));
            }
            Modifier::Once => self.push_fixed(item, delay, 1)?,
            Modifier::Repeat(count) => self.push_fixed(item, delay, count)?,
        }
        Ok(())
    }

    fn push_fixed(&mut self, item: &str, delay: Duration, repeat: u32) -> Result<(), BackoffParseError> {
        match self.tiers.last_mut() {
            Some(last) if last.delay == delay => {
                last.repeat = last.repeat.checked_add(repeat).ok_or_else(|| {
                    BackoffParseError::new(BackoffErrorKind::MalformedModifier, item)
                })?;
            }
            _ => self.tiers.push(Tier { delay, repeat }),
        }
        Ok(())
    }

    fn cap(&mut self, item: &str, cap: Duration) -> Result<(), BackoffParseError> {
        if !self.has_tiers() || self.cap.is_some() {
            return Err(BackoffParseError::new(BackoffErrorKind::MisplacedItem, item));
        }
        self.cap = Some((cap, item.to_string()));
        Ok(())
    }

    fn jitter(&mut self, item: &str) -> Result<(), BackoffParseError> {
        if !self.has_tiers() || self.jitter {
            return Err(BackoffParseError::new(BackoffErrorKind::MisplacedItem, item));
        }
        self.jitter = true;
        Ok(())
    }

    fn finish(self, spec: &str) -> Result<BackoffPolicy, BackoffParseError> {
        let first = self
            .tiers
            .first()
            .map(|t| t.delay)
            .or_else(|| self.growth.as_ref().map(|(g, _)| g.base))
            .ok_or_else(|| BackoffParseError::new(BackoffErrorKind::Empty, spec))?;

        let cap = match (&self.cap, &self.growth) {
            (Some((cap, item)), _) => {
                if *cap < first {
                    return Err(BackoffParseError::new(
                        BackoffErrorKind::CapBelowFirstTier,
                        item.as_str(),
                    ));
                }
                *cap
            }
            (None, Some((_, item))) => {
                return Err(BackoffParseError::new(
                    BackoffErrorKind::MissingCap,
                    item.as_str(),
                ));
            }
            (None, None) => self.tiers.last().map(|t| t.delay).unwrap_or(first),
        };

        Ok(BackoffPolicy {
            tiers: self.tiers,
            growth: self.growth.map(|(g, _)| g),
            explicit_cap: self.cap.map(|(c, _)| c),
            cap,
            jitter: self.jitter,
        })
    }
}
