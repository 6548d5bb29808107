// Library root: the pure pick'em logic shared by every front end.
//
// Nothing in this crate performs I/O. Callers hand in fully materialized
// payloads (usually decoded through `wire`) and get plain data back.

pub mod error;
pub mod model;
pub mod picks;
pub mod results;
pub mod standings;
pub mod wire;

pub use error::{PickemError, Result};
pub use model::{Game, Team, User, Week};
pub use picks::{validate, Pick, PickEdit, PickSet, PointValue, QuotaViolation};
pub use results::{tally, GameResult, PickResult, UserTally};
pub use standings::{aggregate, points_back, StandingEntry, StandingsAggregator, WeeklyTotal};
