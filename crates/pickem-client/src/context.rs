// The year/week/user a command operates on, passed explicitly to every
// handler and API call.

use pickem_core::Week;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    pub year: i32,
    pub week: u32,
    /// Whose picks to load or submit. Only the pick commands need one.
    pub username: Option<String>,
}

impl SessionContext {
    pub fn new(week: Week, username: Option<String>) -> Self {
        Self {
            year: week.year,
            week: week.week,
            username,
        }
    }

    pub fn week(&self) -> Week {
        Week {
            year: self.year,
            week: self.week,
        }
    }

    /// Replace the year and/or week, keeping the user.
    pub fn with_overrides(mut self, year: Option<i32>, week: Option<u32>) -> Self {
        if let Some(y) = year {
            self.year = y;
        }
        if let Some(w) = week {
            self.week = w;
        }
        self
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }
}
