// Plain-text and CSV rendering of standings, games, results and picks.

use std::fmt::Write as _;
use std::io;

use chrono::{DateTime, Utc};
use pickem_core::{points_back, GameResult, Game, Pick, QuotaViolation, StandingEntry, UserTally};

/// Number of week columns needed to show every entry's totals.
fn week_columns(standings: &[StandingEntry]) -> usize {
    standings
        .iter()
        .map(|s| s.weekly_totals.len())
        .max()
        .unwrap_or(0)
}

/// Column width in chars, which is what `{:<width$}` pads by.
fn name_width<'a>(names: impl Iterator<Item = &'a str>, header: &str) -> usize {
    names
        .map(|n| n.chars().count())
        .chain([header.chars().count()])
        .max()
        .unwrap_or(0)
}

/// Ranked standings: one row per user with each week, raw, adjusted and
/// points back from the leader.
pub fn standings_table(standings: &[StandingEntry]) -> String {
    let weeks = week_columns(standings);
    let width = name_width(standings.iter().map(|s| s.user_name.as_str()), "Name");
    let back = points_back(standings);

    let mut out = String::new();
    let _ = write!(out, "{:>4}  {:<width$}", "#", "Name");
    for w in 1..=weeks {
        let _ = write!(out, " {:>4}", format!("W{w}"));
    }
    let _ = writeln!(out, " {:>6} {:>8} {:>5}", "Raw", "Adjusted", "Back");

    for (i, (entry, (_, behind))) in standings.iter().zip(back).enumerate() {
        let _ = write!(out, "{:>4}  {:<width$}", i + 1, entry.user_name);
        for w in 1..=weeks {
            match entry.week(w) {
                Some(t) => {
                    let _ = write!(out, " {t:>4}");
                }
                None => {
                    let _ = write!(out, " {:>4}", "-");
                }
            }
        }
        let _ = writeln!(
            out,
            " {:>6} {:>8} {:>5}",
            entry.raw_total, entry.adjusted_total, behind
        );
    }

    out
}

/// Standings as CSV with the same columns as the table.
pub fn standings_csv<W: io::Write>(standings: &[StandingEntry], out: W) -> Result<(), csv::Error> {
    let weeks = week_columns(standings);
    let mut wtr = csv::Writer::from_writer(out);

    let mut header = vec!["rank".to_string(), "name".to_string()];
    header.extend((1..=weeks).map(|w| format!("week{w}")));
    header.extend(["raw".to_string(), "adjusted".to_string(), "back".to_string()]);
    wtr.write_record(&header)?;

    for (i, (entry, (_, behind))) in standings.iter().zip(points_back(standings)).enumerate() {
        let mut row = vec![(i + 1).to_string(), entry.user_name.clone()];
        row.extend((1..=weeks).map(|w| entry.week(w).map(|t| t.to_string()).unwrap_or_default()));
        row.extend([
            entry.raw_total.to_string(),
            entry.adjusted_total.to_string(),
            behind.to_string(),
        ]);
        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    Ok(())
}

pub fn games_table(games: &[Game]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<17}  {:<24} {:>3}  {:<24} {:>3}",
        "Kickoff (UTC)", "Away", "", "Home", ""
    );
    for g in games {
        let _ = writeln!(
            out,
            "{:<17}  {:<24} {:>3}  {:<24} {:>3}",
            g.date.format("%a %m/%d %H:%M").to_string(),
            g.away.to_string(),
            g.away_score,
            g.home.to_string(),
            g.home_score
        );
    }
    out
}

/// One row per game with every user's pick, marked `+` when it won, then a
/// totals line from the tally.
pub fn results_table(results: &[GameResult], tallies: &[UserTally]) -> String {
    let mut out = String::new();
    let _ = write!(out, "{:<22}", "Game");
    for t in tallies {
        let _ = write!(out, " {:>16}", t.user_name);
    }
    let _ = writeln!(out);

    for r in results {
        let _ = write!(out, "{:<22}", r.game.matchup());
        for t in tallies {
            let cell = r
                .picks
                .iter()
                .find(|p| p.user.first_name == t.user_name)
                .map(|p| {
                    let name = p
                        .selection
                        .as_ref()
                        .map(|s| s.nickname.as_str())
                        .unwrap_or("-");
                    let mark = if p.is_correct(&r.game) { "+" } else { " " };
                    if p.points.value() == 1 {
                        format!("{mark}{name}")
                    } else {
                        format!("{mark}{name} ({})", p.points)
                    }
                })
                .unwrap_or_default();
            let _ = write!(out, " {cell:>16}");
        }
        let _ = writeln!(out);
    }

    let _ = write!(out, "{:<22}", "Total");
    for t in tallies {
        let _ = write!(out, " {:>16}", t.points);
    }
    let _ = writeln!(out);
    out
}

pub fn tally_csv<W: io::Write>(tallies: &[UserTally], out: W) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(["name", "points", "correct", "incorrect"])?;
    for t in tallies {
        wtr.write_record([
            t.user_name.clone(),
            t.points.to_string(),
            t.correct.to_string(),
            t.incorrect.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// A user's pick sheet. Games that have kicked off are marked locked.
pub fn picks_table(picks: &[Pick], now: DateTime<Utc>) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<17}  {:<24} {:<24} {:<24} {:>3}  {}",
        "Kickoff (UTC)", "Away", "Home", "Selection", "Pts", ""
    );
    for p in picks {
        let selection = p
            .selection
            .as_ref()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-".to_string());
        let status = if p.game.is_locked(now) { "locked" } else { "" };
        let _ = writeln!(
            out,
            "{:<17}  {:<24} {:<24} {:<24} {:>3}  {}",
            p.game.date.format("%a %m/%d %H:%M").to_string(),
            p.game.away.to_string(),
            p.game.home.to_string(),
            selection,
            p.points,
            status
        );
    }
    out
}

pub fn violations(violations: &[QuotaViolation]) -> String {
    let mut out = String::new();
    for v in violations {
        let _ = writeln!(out, "{v}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pickem_core::{aggregate, tally, PickResult, PointValue, Team, User, WeeklyTotal};

    fn standings() -> Vec<StandingEntry> {
        aggregate(&[
            WeeklyTotal::new("Alice", 1, 10),
            WeeklyTotal::new("Alice", 2, 4),
            WeeklyTotal::new("Bob", 1, 8),
        ])
        .unwrap()
    }

    #[test]
    fn standings_table_has_week_columns_and_back() {
        let table = standings_table(&standings());
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("W1") && lines[0].contains("W2") && !lines[0].contains("W3"));
        assert!(lines[1].contains("Alice"));
        assert!(lines[1].trim_end().ends_with("14       10     0"));
        // Bob has no week 2.
        assert!(lines[2].contains(" -"));
        assert!(lines[2].trim_end().ends_with("8        8     2"));
    }

    #[test]
    fn non_ascii_names_keep_columns_aligned() {
        let standings = aggregate(&[
            WeeklyTotal::new("José", 1, 12),
            WeeklyTotal::new("Zoë", 1, 9),
            WeeklyTotal::new("Bob", 1, 8),
        ])
        .unwrap();
        let table = standings_table(&standings);
        let lines: Vec<&str> = table.lines().collect();
        // "José" is four chars wide, the same as the header.
        assert!(lines[0].starts_with("   #  Name   W1"), "header: {:?}", lines[0]);
        assert!(lines[1].starts_with("   1  José   12"), "row: {:?}", lines[1]);
        let widths: Vec<usize> = lines.iter().map(|l| l.chars().count()).collect();
        assert!(widths.iter().all(|&w| w == widths[0]), "ragged rows: {widths:?}");
    }

    #[test]
    fn empty_standings_render_header_only() {
        assert_eq!(standings_table(&[]).lines().count(), 1);
    }

    #[test]
    fn standings_csv_rows() {
        let mut buf = Vec::new();
        standings_csv(&standings(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(
            text,
            "rank,name,week1,week2,raw,adjusted,back\n1,Alice,10,4,14,10,0\n2,Bob,8,,8,8,2\n"
        );
    }

    #[test]
    fn results_table_marks_winners_and_totals() {
        let game = Game {
            year: 2017,
            week: 1,
            date: Utc.with_ymd_and_hms(2017, 9, 10, 17, 0, 0).unwrap(),
            home: Team::new("Buffalo", "Bills"),
            away: Team::new("New York", "Jets"),
            home_score: 21,
            away_score: 12,
        };
        let results = vec![GameResult {
            game,
            picks: vec![
                PickResult {
                    user: User::named("Alice"),
                    selection: Some(Team::new("Buffalo", "Bills")),
                    points: PointValue::Seven,
                },
                PickResult {
                    user: User::named("Bob"),
                    selection: Some(Team::new("New York", "Jets")),
                    points: PointValue::One,
                },
            ],
        }];
        let tallies = tally(&results);
        let table = results_table(&results, &tallies);
        assert!(table.contains("+Bills (7)"));
        assert!(table.contains(" Jets"));
        let total = table.lines().last().unwrap();
        assert!(total.starts_with("Total"));
        assert!(total.contains('7') && total.trim_end().ends_with('0'));

        let mut buf = Vec::new();
        tally_csv(&tallies, &mut buf).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "name,points,correct,incorrect\nAlice,7,1,0\nBob,0,0,1\n"
        );
    }

    #[test]
    fn violations_one_per_line() {
        let text = violations(&[QuotaViolation::TooManySevens(2), QuotaViolation::TooManyThrees(6)]);
        assert_eq!(text.lines().count(), 2);
        assert!(text.starts_with("Too many seven point picks"));
    }
}
