use crate::{CallDescriptor, RpcFailure};
use std::fmt;
use std::num::ParseIntError;
use std::time::Duration;

/// Why a retry policy refused another attempt.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum GiveUpReason {
    /// The policy's retry budget is used up.
    BudgetExhausted,
    /// Re-sending could execute the operation twice.
    NotRetryable,
}

/// The answer of `Transport::retry_policy`.
///
/// A transport that backs off must finish waiting before returning `Retry`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum RetryDecision {
    Retry,
    GiveUp(GiveUpReason),
}

/// A policy decision before any waiting has happened.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum RetryPlan {
    Retry { after: Duration },
    GiveUp(GiveUpReason),
}

impl RetryPlan {
    pub fn decision(&self) -> RetryDecision {
        match self {
            RetryPlan::Retry { .. } => RetryDecision::Retry,
            RetryPlan::GiveUp(reason) => RetryDecision::GiveUp(*reason),
        }
    }
}

/// Ordered delays between attempts; the number of delays is the retry
/// budget.
///
/// `[0ms, 100ms, 500ms]` means: retry immediately, then after 100ms, then
/// after 500ms, then give up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryIntervals {
    intervals: Vec<Duration>,
}

impl Default for RetryIntervals {
    fn default() -> Self {
        Self {
            intervals: vec![Duration::ZERO],
        }
    }
}

impl RetryIntervals {
    pub fn new(intervals: Vec<Duration>) -> Self {
        Self { intervals }
    }

    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            intervals: Vec::new(),
        }
    }

    /// `budget` immediate retries.
    pub fn immediate(budget: usize) -> Self {
        Self {
            intervals: vec![Duration::ZERO; budget],
        }
    }

    /// Parses a whitespace-separated list of millisecond delays, e.g.
    /// `"0 100 500"`. The single value `-1` disables retries.
    pub fn parse(spec: &str) -> Result<Self, RetryIntervalsParseError> {
        let trimmed = spec.trim();
        if trimmed == "-1" {
            return Ok(Self::none());
        }
        let intervals = trimmed
            .split_whitespace()
            .map(|part| {
                part.parse::<u64>()
                    .map(Duration::from_millis)
                    .map_err(|source| RetryIntervalsParseError {
                        part: part.to_string(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { intervals })
    }

    pub fn budget(&self) -> u32 {
        self.intervals.len() as u32
    }

    pub fn intervals(&self) -> &[Duration] {
        &self.intervals
    }

    pub fn decide(&self, retry_count: u32, failure: &RpcFailure, call: &CallDescriptor) -> RetryPlan {
        if failure.request_sent() && !call.is_idempotent() {
            return RetryPlan::GiveUp(GiveUpReason::NotRetryable);
        }
        match self.intervals.get(retry_count as usize) {
            Some(after) => RetryPlan::Retry { after: *after },
            None => RetryPlan::GiveUp(GiveUpReason::BudgetExhausted),
        }
    }
}

/// A retry interval list entry that is not a millisecond count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryIntervalsParseError {
    pub part: String,
    pub source: ParseIntError,
}

impl fmt::Display for RetryIntervalsParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid retry interval {:?}: {}", self.part, self.source)
    }
}

impl std::error::Error for RetryIntervalsParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}
