// Scoring a week's results: which picks won and how many points each user
// earned from them.

use serde::Serialize;

use crate::model::{Game, Team, User};
use crate::picks::PointValue;

/// One user's pick on a game that has started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickResult {
    pub user: User,
    pub selection: Option<Team>,
    pub points: PointValue,
}

impl PickResult {
    /// Correct when the selection is the game's winner. Unplayed or tied
    /// games have no winner, so nothing is correct yet.
    pub fn is_correct(&self, game: &Game) -> bool {
        match (game.winner(), &self.selection) {
            (Some(winner), Some(sel)) => winner.matches_nickname(&sel.nickname),
            _ => false,
        }
    }
}

/// A game together with every user's pick on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameResult {
    pub game: Game,
    pub picks: Vec<PickResult>,
}

/// Points a user has earned across a set of results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserTally {
    pub user_name: String,
    pub points: u32,
    pub correct: usize,
    pub incorrect: usize,
}

impl UserTally {
    fn new(user_name: &str) -> Self {
        Self {
            user_name: user_name.to_string(),
            points: 0,
            correct: 0,
            incorrect: 0,
        }
    }
}

/// Tally each user's points. Users are listed in the order they first
/// appear, which is the column order of the first game's picks.
pub fn tally(results: &[GameResult]) -> Vec<UserTally> {
    let mut tallies: Vec<UserTally> = Vec::new();

    for result in results {
        for pick in &result.picks {
            let name = pick.user.first_name.as_str();
            let idx = match tallies.iter().position(|t| t.user_name == name) {
                Some(i) => i,
                None => {
                    tallies.push(UserTally::new(name));
                    tallies.len() - 1
                }
            };

            let entry = &mut tallies[idx];
            if pick.is_correct(&result.game) {
                entry.points += u32::from(pick.points.value());
                entry.correct += 1;
            } else {
                entry.incorrect += 1;
            }
        }
    }

    tallies
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn game(home: &str, away: &str, home_score: u32, away_score: u32) -> Game {
        Game {
            year: 2017,
            week: 3,
            date: Utc.with_ymd_and_hms(2017, 9, 24, 17, 0, 0).unwrap(),
            home: Team::new("Home", home),
            away: Team::new("Away", away),
            home_score,
            away_score,
        }
    }

    fn pick(user: &str, nickname: Option<&str>, points: PointValue) -> PickResult {
        PickResult {
            user: User::named(user),
            selection: nickname.map(|n| Team::new("", n)),
            points,
        }
    }

    #[test]
    fn winners_earn_their_points() {
        let results = vec![
            GameResult {
                game: game("Bills", "Jets", 21, 12),
                picks: vec![
                    pick("Alice", Some("Bills"), PointValue::Seven),
                    pick("Bob", Some("Jets"), PointValue::Three),
                ],
            },
            GameResult {
                game: game("Giants", "Cowboys", 10, 24),
                picks: vec![
                    pick("Alice", Some("Giants"), PointValue::One),
                    pick("Bob", Some("Cowboys"), PointValue::Five),
                ],
            },
        ];

        let t = tally(&results);
        assert_eq!(t.len(), 2);
        assert_eq!(t[0].user_name, "Alice");
        assert_eq!((t[0].points, t[0].correct, t[0].incorrect), (7, 1, 1));
        assert_eq!(t[1].user_name, "Bob");
        assert_eq!((t[1].points, t[1].correct, t[1].incorrect), (5, 1, 1));
    }

    #[test]
    fn ties_and_unmade_picks_score_nothing() {
        let results = vec![GameResult {
            game: game("Bears", "Packers", 17, 17),
            picks: vec![
                pick("Alice", Some("Bears"), PointValue::Seven),
                pick("Bob", None, PointValue::One),
            ],
        }];
        let t = tally(&results);
        assert!(t.iter().all(|u| u.points == 0 && u.incorrect == 1));
    }

    #[test]
    fn users_missing_from_first_game_are_appended() {
        let results = vec![
            GameResult {
                game: game("Bills", "Jets", 21, 12),
                picks: vec![pick("Alice", Some("Bills"), PointValue::One)],
            },
            GameResult {
                game: game("Rams", "Saints", 30, 20),
                picks: vec![
                    pick("Cara", Some("Rams"), PointValue::Three),
                    pick("Alice", Some("Rams"), PointValue::One),
                ],
            },
        ];
        let names: Vec<_> = tally(&results).into_iter().map(|t| t.user_name).collect();
        assert_eq!(names, vec!["Alice", "Cara"]);
    }

    #[test]
    fn no_results_no_tallies() {
        assert!(tally(&[]).is_empty());
    }
}
