// Games, teams, users and season weeks as the pick'em backend describes them.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An NFL team. The nickname alone is unique across the league.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Team {
    pub city: String,
    pub nickname: String,
}

impl Team {
    pub fn new(city: impl Into<String>, nickname: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            nickname: nickname.into(),
        }
    }

    /// Whether this is the backend's placeholder for "no team selected".
    pub fn is_blank(&self) -> bool {
        self.nickname.trim().is_empty()
    }

    /// Teams are identified by nickname, case-insensitively.
    pub fn matches_nickname(&self, nickname: &str) -> bool {
        self.nickname.eq_ignore_ascii_case(nickname.trim())
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.city, self.nickname)
    }
}

/// A single contest on the schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    pub year: i32,
    pub week: u32,
    /// Kickoff time. Picks lock once this has passed.
    pub date: DateTime<Utc>,
    pub home: Team,
    pub away: Team,
    #[serde(default)]
    pub home_score: u32,
    #[serde(default)]
    pub away_score: u32,
}

impl Game {
    /// Whether `team` plays in this game.
    pub fn involves(&self, team: &Team) -> bool {
        self.involves_nickname(&team.nickname)
    }

    pub fn involves_nickname(&self, nickname: &str) -> bool {
        self.home.matches_nickname(nickname) || self.away.matches_nickname(nickname)
    }

    /// A game is locked once kickoff is at or before `now`.
    pub fn is_locked(&self, now: DateTime<Utc>) -> bool {
        self.date <= now
    }

    /// The team with the strictly higher score. Ties (including 0-0 for
    /// unplayed games) have no winner.
    pub fn winner(&self) -> Option<&Team> {
        use std::cmp::Ordering;
        match self.home_score.cmp(&self.away_score) {
            Ordering::Greater => Some(&self.home),
            Ordering::Less => Some(&self.away),
            Ordering::Equal => None,
        }
    }

    /// Short `Away/Home` label used in result tables.
    pub fn matchup(&self) -> String {
        format!("{}/{}", self.away.nickname, self.home.nickname)
    }
}

/// A member of the pool.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub admin: bool,
}

impl User {
    pub fn named(first_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            ..Self::default()
        }
    }
}

/// A week of a given season, as reported by the backend's `/current`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Week {
    pub year: i32,
    pub week: u32,
}

impl fmt::Display for Week {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} week {}", self.year, self.week)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn game(home_score: u32, away_score: u32) -> Game {
        Game {
            year: 2017,
            week: 1,
            date: Utc.with_ymd_and_hms(2017, 9, 10, 17, 0, 0).unwrap(),
            home: Team::new("Buffalo", "Bills"),
            away: Team::new("New York", "Jets"),
            home_score,
            away_score,
        }
    }

    #[test]
    fn winner_home_away_and_tie() {
        assert_eq!(game(21, 14).winner().unwrap().nickname, "Bills");
        assert_eq!(game(3, 10).winner().unwrap().nickname, "Jets");
        assert!(game(17, 17).winner().is_none());
    }

    #[test]
    fn locked_at_and_after_kickoff() {
        let g = game(0, 0);
        assert!(!g.is_locked(g.date - chrono::Duration::minutes(1)));
        assert!(g.is_locked(g.date));
        assert!(g.is_locked(g.date + chrono::Duration::hours(3)));
    }

    #[test]
    fn involves_is_case_insensitive_on_nickname() {
        let g = game(0, 0);
        assert!(g.involves_nickname("bills"));
        assert!(g.involves(&Team::new("", "JETS")));
        assert!(!g.involves_nickname("Dolphins"));
    }

    #[test]
    fn blank_team_is_the_unset_placeholder() {
        assert!(Team::default().is_blank());
        assert!(Team::new("Dallas", " ").is_blank());
        assert!(!Team::new("", "Cowboys").is_blank());
    }

    #[test]
    fn game_deserializes_backend_json() {
        let json = r#"{
            "year": 2017, "week": 1, "date": "2017-09-10T17:00:00Z",
            "home": {"city": "Buffalo", "nickname": "Bills"},
            "away": {"city": "New York", "nickname": "Jets"},
            "homeScore": 21, "awayScore": 12
        }"#;
        let g: Game = serde_json::from_str(json).unwrap();
        assert_eq!(g.home_score, 21);
        assert_eq!(g.matchup(), "Jets/Bills");
    }
}
