// Weekly picks, the special-points quota, and applying a user's edits.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use tracing::debug;

use crate::error::{PickemError, Result};
use crate::model::{Game, Team, User};

// ---------------------------------------------------------------------------
// Quota limits
// ---------------------------------------------------------------------------

pub const MAX_SEVENS: usize = 1;
pub const MAX_FIVES: usize = 2;
pub const MAX_THREES: usize = 5;

// ---------------------------------------------------------------------------
// Point values
// ---------------------------------------------------------------------------

/// The points wagered on a pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum PointValue {
    One,
    Three,
    Five,
    Seven,
}

impl PointValue {
    pub fn value(self) -> u8 {
        match self {
            PointValue::One => 1,
            PointValue::Three => 3,
            PointValue::Five => 5,
            PointValue::Seven => 7,
        }
    }
}

impl TryFrom<u8> for PointValue {
    type Error = PickemError;

    fn try_from(n: u8) -> Result<Self> {
        match n {
            1 => Ok(PointValue::One),
            3 => Ok(PointValue::Three),
            5 => Ok(PointValue::Five),
            7 => Ok(PointValue::Seven),
            other => Err(PickemError::invalid(
                "points",
                format!("must be one of 1, 3, 5, 7, got {other}"),
            )),
        }
    }
}

impl From<PointValue> for u8 {
    fn from(p: PointValue) -> u8 {
        p.value()
    }
}

impl fmt::Display for PointValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

// ---------------------------------------------------------------------------
// Picks
// ---------------------------------------------------------------------------

/// A user's selection and wager for one game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pick {
    pub game: Game,
    pub user: User,
    /// `None` until the user picks a side. Sent to the backend as a blank
    /// team, which is how it reports an unmade pick.
    #[serde(serialize_with = "serialize_selection")]
    pub selection: Option<Team>,
    pub points: PointValue,
}

fn serialize_selection<S: Serializer>(selection: &Option<Team>, s: S) -> std::result::Result<S::Ok, S::Error> {
    match selection {
        Some(team) => team.serialize(s),
        None => Team::default().serialize(s),
    }
}

impl Pick {
    /// Build a pick, checking that the selection is one of the game's teams.
    pub fn new(game: Game, user: User, selection: Option<Team>, points: PointValue) -> Result<Self> {
        if let Some(team) = &selection {
            if !game.involves(team) {
                return Err(PickemError::invalid(
                    "selection",
                    format!("{team} does not play in {}", game.matchup()),
                ));
            }
        }
        Ok(Self {
            game,
            user,
            selection,
            points,
        })
    }
}

/// A single change a user makes to their pick sheet: back the team with
/// this nickname for this many points. A nickname appears in at most one
/// game per week, so it identifies the pick too.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickEdit {
    pub nickname: String,
    pub points: PointValue,
}

impl PickEdit {
    pub fn new(nickname: impl Into<String>, points: PointValue) -> Self {
        Self {
            nickname: nickname.into(),
            points,
        }
    }
}

/// Parses `NICKNAME=POINTS`, e.g. `Giants=7`.
impl FromStr for PickEdit {
    type Err = PickemError;

    fn from_str(s: &str) -> Result<Self> {
        let (nickname, points) = s
            .split_once('=')
            .ok_or_else(|| PickemError::invalid("selection", format!("expected NICKNAME=POINTS, got `{s}`")))?;
        let nickname = nickname.trim();
        if nickname.is_empty() {
            return Err(PickemError::invalid("selection", "nickname must not be empty"));
        }
        let points: u8 = points
            .trim()
            .parse()
            .map_err(|_| PickemError::invalid("points", format!("`{}` is not a number", points.trim())))?;
        Ok(Self::new(nickname, PointValue::try_from(points)?))
    }
}

// ---------------------------------------------------------------------------
// Quota validation
// ---------------------------------------------------------------------------

/// A broken special-points limit, carrying the offending count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuotaViolation {
    TooManySevens(usize),
    TooManyFives(usize),
    TooManyThrees(usize),
}

impl fmt::Display for QuotaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (label, limit, count) = match *self {
            QuotaViolation::TooManySevens(n) => ("seven", MAX_SEVENS, n),
            QuotaViolation::TooManyFives(n) => ("five", MAX_FIVES, n),
            QuotaViolation::TooManyThrees(n) => ("three", MAX_THREES, n),
        };
        write!(
            f,
            "Too many {label} point picks. You may only have {limit}, but you have {count}"
        )
    }
}

/// Check a stream of point values against the quota.
pub fn check_quota<I>(points: I) -> Vec<QuotaViolation>
where
    I: IntoIterator<Item = PointValue>,
{
    let (mut sevens, mut fives, mut threes) = (0, 0, 0);
    for p in points {
        match p {
            PointValue::Seven => sevens += 1,
            PointValue::Five => fives += 1,
            PointValue::Three => threes += 1,
            PointValue::One => {}
        }
    }

    let mut violations = Vec::new();
    if sevens > MAX_SEVENS {
        violations.push(QuotaViolation::TooManySevens(sevens));
    }
    if fives > MAX_FIVES {
        violations.push(QuotaViolation::TooManyFives(fives));
    }
    if threes > MAX_THREES {
        violations.push(QuotaViolation::TooManyThrees(threes));
    }
    violations
}

/// Every quota the pick set breaks, in the order sevens, fives, threes.
/// An empty result means the picks may be submitted.
pub fn validate(picks: &[Pick]) -> Vec<QuotaViolation> {
    check_quota(picks.iter().map(|p| p.points))
}

// ---------------------------------------------------------------------------
// PickSet
// ---------------------------------------------------------------------------

/// All of one user's picks for one week, in schedule order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct PickSet {
    picks: Vec<Pick>,
}

impl PickSet {
    pub fn new(picks: Vec<Pick>) -> Self {
        Self { picks }
    }

    pub fn as_slice(&self) -> &[Pick] {
        &self.picks
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Pick> {
        self.picks.iter()
    }

    pub fn len(&self) -> usize {
        self.picks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.picks.is_empty()
    }

    pub fn violations(&self) -> Vec<QuotaViolation> {
        validate(&self.picks)
    }

    pub fn is_legal(&self) -> bool {
        self.violations().is_empty()
    }

    /// Picks whose games have not kicked off yet.
    pub fn unlocked(&self, now: DateTime<Utc>) -> Vec<&Pick> {
        self.picks.iter().filter(|p| !p.game.is_locked(now)).collect()
    }

    /// Apply `edits` in order. Each edit targets the pick whose game involves
    /// the edited nickname; the last edit for a game wins.
    ///
    /// Either every edit applies or none do: an unknown nickname fails with
    /// `UnknownSelection` and a game that has kicked off fails with
    /// `GameLocked`. Quota is not checked here; run `validate` afterwards.
    pub fn apply(&mut self, edits: &[PickEdit], now: DateTime<Utc>) -> Result<()> {
        let mut targets = Vec::with_capacity(edits.len());
        for edit in edits {
            let idx = self
                .picks
                .iter()
                .position(|p| p.game.involves_nickname(&edit.nickname))
                .ok_or_else(|| PickemError::UnknownSelection {
                    nickname: edit.nickname.clone(),
                })?;
            let game = &self.picks[idx].game;
            if game.is_locked(now) {
                return Err(PickemError::GameLocked {
                    matchup: game.matchup(),
                });
            }
            targets.push(idx);
        }

        for (edit, idx) in edits.iter().zip(targets) {
            let pick = &mut self.picks[idx];
            // Take the canonical team from the game so the city is filled in.
            let team = if pick.game.home.matches_nickname(&edit.nickname) {
                pick.game.home.clone()
            } else {
                pick.game.away.clone()
            };
            debug!(game = %pick.game.matchup(), selection = %team, points = %edit.points, "applying pick edit");
            pick.selection = Some(team);
            pick.points = edit.points;
        }

        Ok(())
    }
}

impl From<Vec<Pick>> for PickSet {
    fn from(picks: Vec<Pick>) -> Self {
        Self::new(picks)
    }
}

impl<'a> IntoIterator for &'a PickSet {
    type Item = &'a Pick;
    type IntoIter = std::slice::Iter<'a, Pick>;

    fn into_iter(self) -> Self::IntoIter {
        self.picks.iter()
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
