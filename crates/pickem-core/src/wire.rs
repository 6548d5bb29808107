// Backend JSON records and their strict conversion into core types.
//
// Records deserialize leniently (every field optional, numbers kept as raw
// JSON values) so a bad payload surfaces as `InvalidInput` naming the exact
// field, instead of a generic decode failure or a silently coerced value.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::error::{PickemError, Result};
use crate::model::{Game, Team, User};
use crate::picks::{Pick, PickSet, PointValue};
use crate::results::{GameResult, PickResult};
use crate::standings::WeeklyTotal;

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub admin: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TeamRecord {
    pub city: Option<String>,
    pub nickname: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameRecord {
    pub year: Option<Value>,
    pub week: Option<Value>,
    pub date: Option<String>,
    pub home: Option<TeamRecord>,
    pub away: Option<TeamRecord>,
    pub home_score: Option<Value>,
    pub away_score: Option<Value>,
}

/// One entry of `/totals`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WeekTotalRecord {
    pub user: Option<UserRecord>,
    pub year: Option<Value>,
    pub week: Option<Value>,
    pub total: Option<Value>,
}

/// One entry of `/picks`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PickRecord {
    pub game: Option<GameRecord>,
    pub user: Option<UserRecord>,
    pub selection: Option<TeamRecord>,
    pub points: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PickResultRecord {
    pub user: Option<UserRecord>,
    pub selection: Option<TeamRecord>,
    pub points: Option<Value>,
}

/// One entry of `/results`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResultRecord {
    pub game: Option<GameRecord>,
    pub picks: Option<Vec<PickResultRecord>>,
}

// ---------------------------------------------------------------------------
// Field helpers
// ---------------------------------------------------------------------------

fn join(prefix: &str, field: &str) -> String {
    if prefix.is_empty() {
        field.to_string()
    } else {
        format!("{prefix}.{field}")
    }
}

fn integer(value: Option<&Value>, field: &str) -> Result<i64> {
    match value {
        None | Some(Value::Null) => Err(PickemError::invalid(field, "missing")),
        Some(v) => v
            .as_i64()
            .ok_or_else(|| PickemError::invalid(field, format!("expected an integer, got {v}"))),
    }
}

fn non_negative(value: Option<&Value>, field: &str) -> Result<u32> {
    let n = integer(value, field)?;
    u32::try_from(n).map_err(|_| PickemError::invalid(field, format!("must not be negative, got {n}")))
}

fn week_number(value: Option<&Value>, field: &str) -> Result<u32> {
    let n = non_negative(value, field)?;
    if n == 0 {
        return Err(PickemError::invalid(field, "weeks start at 1"));
    }
    Ok(n)
}

fn points(value: Option<&Value>, field: &str) -> Result<PointValue> {
    let n = integer(value, field)?;
    u8::try_from(n)
        .ok()
        .and_then(|b| PointValue::try_from(b).ok())
        .ok_or_else(|| PickemError::invalid(field, format!("must be one of 1, 3, 5, 7, got {n}")))
}

fn user(record: Option<UserRecord>, prefix: &str) -> Result<User> {
    let record = record.ok_or_else(|| PickemError::invalid(prefix, "missing"))?;
    let first_name = record
        .first_name
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| PickemError::invalid(&join(prefix, "firstName"), "missing"))?;
    Ok(User {
        first_name,
        last_name: record.last_name.unwrap_or_default(),
        email: record.email.unwrap_or_default(),
        admin: record.admin.unwrap_or(false),
    })
}

fn team(record: Option<TeamRecord>, prefix: &str) -> Result<Team> {
    let record = record.ok_or_else(|| PickemError::invalid(prefix, "missing"))?;
    let nickname = record
        .nickname
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| PickemError::invalid(&join(prefix, "nickname"), "missing"))?;
    Ok(Team {
        city: record.city.unwrap_or_default(),
        nickname,
    })
}

/// A blank or absent selection is an unmade pick.
fn selection(record: Option<TeamRecord>, game: &Game, field: &str) -> Result<Option<Team>> {
    let Some(record) = record else {
        return Ok(None);
    };
    let team = Team {
        city: record.city.unwrap_or_default(),
        nickname: record.nickname.unwrap_or_default(),
    };
    if team.is_blank() {
        return Ok(None);
    }
    if !game.involves(&team) {
        return Err(PickemError::invalid(
            field,
            format!("{team} does not play in {}", game.matchup()),
        ));
    }
    Ok(Some(team))
}

fn game(record: Option<GameRecord>, prefix: &str) -> Result<Game> {
    let record = record.ok_or_else(|| PickemError::invalid(prefix, "missing"))?;

    let date_field = join(prefix, "date");
    let date = record
        .date
        .as_deref()
        .ok_or_else(|| PickemError::invalid(&date_field, "missing"))?;
    let date = DateTime::parse_from_rfc3339(date)
        .map_err(|e| PickemError::invalid(&date_field, format!("`{date}` is not an RFC 3339 timestamp: {e}")))?
        .with_timezone(&Utc);

    let year = integer(record.year.as_ref(), &join(prefix, "year"))?;
    let year = i32::try_from(year)
        .map_err(|_| PickemError::invalid(&join(prefix, "year"), format!("out of range: {year}")))?;

    let score = |v: Option<Value>, field: &str| match v {
        None | Some(Value::Null) => Ok(0),
        Some(v) => non_negative(Some(&v), &join(prefix, field)),
    };

    Ok(Game {
        year,
        week: week_number(record.week.as_ref(), &join(prefix, "week"))?,
        date,
        home: team(record.home, &join(prefix, "home"))?,
        away: team(record.away, &join(prefix, "away"))?,
        home_score: score(record.home_score, "homeScore")?,
        away_score: score(record.away_score, "awayScore")?,
    })
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

impl TryFrom<WeekTotalRecord> for WeeklyTotal {
    type Error = PickemError;

    fn try_from(record: WeekTotalRecord) -> Result<Self> {
        let user = user(record.user, "user")?;
        Ok(WeeklyTotal {
            user_name: user.first_name,
            week: week_number(record.week.as_ref(), "week")?,
            total: integer(record.total.as_ref(), "total")?,
        })
    }
}

impl TryFrom<GameRecord> for Game {
    type Error = PickemError;

    fn try_from(record: GameRecord) -> Result<Self> {
        game(Some(record), "")
    }
}

impl TryFrom<PickRecord> for Pick {
    type Error = PickemError;

    fn try_from(record: PickRecord) -> Result<Self> {
        let game = game(record.game, "game")?;
        let user = user(record.user, "user")?;
        let selection = selection(record.selection, &game, "selection")?;
        let points = points(record.points.as_ref(), "points")?;
        Ok(Pick {
            game,
            user,
            selection,
            points,
        })
    }
}

impl TryFrom<ResultRecord> for GameResult {
    type Error = PickemError;

    fn try_from(record: ResultRecord) -> Result<Self> {
        let game = game(record.game, "game")?;
        let picks = record
            .picks
            .unwrap_or_default()
            .into_iter()
            .map(|p| -> Result<PickResult> {
                Ok(PickResult {
                    user: user(p.user, "picks.user")?,
                    selection: selection(p.selection, &game, "picks.selection")?,
                    points: points(p.points.as_ref(), "picks.points")?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(GameResult { game, picks })
    }
}

/// Convert every record, stopping at the first invalid one. The error
/// message is prefixed with the record's position.
pub fn convert_all<R, T>(records: Vec<R>) -> Result<Vec<T>>
where
    T: TryFrom<R, Error = PickemError>,
{
    records
        .into_iter()
        .enumerate()
        .map(|(i, r)| T::try_from(r).map_err(|e| e.at_record(i)))
        .collect()
}

pub fn pick_set(records: Vec<PickRecord>) -> Result<PickSet> {
    convert_all(records).map(PickSet::new)
}
