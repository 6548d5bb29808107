// Season standings: per-user weekly totals folded into a ranked table.
//
// Each user's adjusted total drops their single worst week, but only once
// they have two or more weeks on the board. A one-week player keeps their
// whole score.

use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use crate::error::{PickemError, Result};

/// Weeks in a regular season unless configured otherwise.
pub const DEFAULT_SEASON_WEEKS: u32 = 17;

/// One user's point total for one week.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeeklyTotal {
    pub user_name: String,
    /// 1-based week of the season.
    pub week: u32,
    pub total: i64,
}

impl WeeklyTotal {
    pub fn new(user_name: impl Into<String>, week: u32, total: i64) -> Self {
        Self {
            user_name: user_name.into(),
            week,
            total,
        }
    }
}

/// A user's row in the standings table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StandingEntry {
    pub user_name: String,
    /// Indexed by `week - 1`. `None` marks a week with no reported total.
    pub weekly_totals: Vec<Option<i64>>,
    pub raw_total: i64,
    pub adjusted_total: i64,
}

impl StandingEntry {
    /// Fails with `InvalidInput` on `total` when a sum leaves the i64 range.
    fn from_weeks(user_name: String, weekly_totals: Vec<Option<i64>>) -> Result<Self> {
        let overflow = || {
            PickemError::invalid(
                "total",
                format!("weekly totals for {user_name} overflow the season sum"),
            )
        };

        let played: Vec<i64> = weekly_totals.iter().flatten().copied().collect();
        let raw_total = played
            .iter()
            .try_fold(0i64, |acc, &t| acc.checked_add(t))
            .ok_or_else(overflow)?;
        let adjusted_total = match played.iter().min() {
            Some(&lowest) if played.len() > 1 => {
                raw_total.checked_sub(lowest).ok_or_else(overflow)?
            }
            _ => raw_total,
        };

        Ok(Self {
            user_name,
            weekly_totals,
            raw_total,
            adjusted_total,
        })
    }

    /// The total for a 1-based week, if one was reported.
    pub fn week(&self, week: usize) -> Option<i64> {
        self.weekly_totals.get(week.checked_sub(1)?).copied().flatten()
    }
}

/// Builds ranked standings from flat weekly totals.
#[derive(Debug, Clone, Copy)]
pub struct StandingsAggregator {
    season_weeks: u32,
}

impl Default for StandingsAggregator {
    fn default() -> Self {
        Self::new(DEFAULT_SEASON_WEEKS)
    }
}

impl StandingsAggregator {
    pub fn new(season_weeks: u32) -> Self {
        Self { season_weeks }
    }

    /// Group totals by user, compute raw and adjusted sums, and rank.
    ///
    /// - Users keep the order in which they first appear in `raw_totals`.
    /// - A repeated (user, week) pair overwrites the earlier total.
    /// - The result is sorted by adjusted total, highest first. The sort is
    ///   stable, so ties stay in first-appearance order.
    ///
    /// Fails with `InvalidInput` on a blank user name or a week outside
    /// `1..=season_weeks`. Empty input yields an empty table.
    pub fn aggregate(&self, raw_totals: &[WeeklyTotal]) -> Result<Vec<StandingEntry>> {
        let mut order: Vec<(String, Vec<Option<i64>>)> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();

        for t in raw_totals {
            self.check(t)?;

            let slot = match index.get(t.user_name.as_str()) {
                Some(&i) => i,
                None => {
                    index.insert(t.user_name.as_str(), order.len());
                    order.push((t.user_name.clone(), Vec::new()));
                    order.len() - 1
                }
            };

            let weeks = &mut order[slot].1;
            let idx = (t.week - 1) as usize;
            if weeks.len() <= idx {
                weeks.resize(idx + 1, None);
            }
            if weeks[idx].is_some() {
                debug!(user = %t.user_name, week = t.week, "duplicate weekly total, keeping the later one");
            }
            weeks[idx] = Some(t.total);
        }

        let mut standings = order
            .into_iter()
            .map(|(name, weeks)| StandingEntry::from_weeks(name, weeks))
            .collect::<Result<Vec<_>>>()?;

        // Vec::sort_by is stable.
        standings.sort_by(|a, b| b.adjusted_total.cmp(&a.adjusted_total));

        Ok(standings)
    }

    fn check(&self, t: &WeeklyTotal) -> Result<()> {
        if t.user_name.trim().is_empty() {
            return Err(PickemError::invalid("user.firstName", "must not be empty"));
        }
        if t.week == 0 || t.week > self.season_weeks {
            return Err(PickemError::invalid(
                "week",
                format!(
                    "must be between 1 and {}, got {}",
                    self.season_weeks, t.week
                ),
            ));
        }
        Ok(())
    }
}

/// Aggregate with the default season length.
pub fn aggregate(raw_totals: &[WeeklyTotal]) -> Result<Vec<StandingEntry>> {
    StandingsAggregator::default().aggregate(raw_totals)
}

/// How far each entry trails the leader's adjusted total. Expects ranked
/// input (as returned by `aggregate`); the leader gets 0. Gaps wider than
/// i64 saturate.
pub fn points_back(standings: &[StandingEntry]) -> Vec<(&str, i64)> {
    let leader = standings.first().map(|s| s.adjusted_total).unwrap_or(0);
    standings
        .iter()
        .map(|s| (s.user_name.as_str(), leader.saturating_sub(s.adjusted_total)))
        .collect()
}
