//! Academic semesters.
//!
//! A semester has two encodings:
//!
//! - the *number*, `YYYYSS`, used internally and in URLs (`202008`)
//! - the *name*, `"<Season> <year>"`, shown to users (`"Fall 2020"`)
//!
//! Winter terms straddle the new year. They are numbered with the December
//! they start in but named after the January they mostly occupy, so `202012`
//! is `"Winter 2021"`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{
    FALL_CODE, RECENT_SEMESTERS, SEMESTER_NUMBER_LEN, SPRING_CODE, SUMMER_CODE, WINTER_CODE,
};
use crate::error::{Result, TerpError};

// ═══════════════════════════════════════════════════════════════════════════════
// SEASON
// ═══════════════════════════════════════════════════════════════════════════════

/// Season of an academic term, in calendar order of its code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    /// Code `01`.
    Spring,
    /// Code `05`.
    Summer,
    /// Code `08`.
    Fall,
    /// Code `12`.
    Winter,
}

impl Season {
    /// All seasons in code order.
    pub const ALL: [Season; 4] = [Season::Spring, Season::Summer, Season::Fall, Season::Winter];

    /// Two-digit code used in semester numbers.
    pub fn code(self) -> &'static str {
        match self {
            Season::Spring => SPRING_CODE,
            Season::Summer => SUMMER_CODE,
            Season::Fall => FALL_CODE,
            Season::Winter => WINTER_CODE,
        }
    }

    /// Capitalized display name.
    pub fn name(self) -> &'static str {
        match self {
            Season::Spring => "Spring",
            Season::Summer => "Summer",
            Season::Fall => "Fall",
            Season::Winter => "Winter",
        }
    }

    /// Looks up a season by its two-digit code.
    pub fn from_code(code: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|s| s.code() == code)
            .ok_or_else(|| TerpError::UnknownSeason(code.to_string()))
    }

    /// Looks up a season by name, ignoring case.
    pub fn from_name(name: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|s| s.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| TerpError::UnknownSeason(name.to_string()))
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SEMESTER
// ═══════════════════════════════════════════════════════════════════════════════

/// An academic semester.
///
/// Ordering is chronological and matches the ordering of semester numbers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Semester {
    /// Year as it appears in the semester number.
    year: u16,
    season: Season,
}

impl Semester {
    /// Creates a semester from its number-form year and season.
    pub fn new(year: u16, season: Season) -> Result<Self> {
        if year > 9999 {
            return Err(TerpError::invalid_semester(
                year.to_string(),
                "year must have at most four digits",
            ));
        }
        Ok(Self { year, season })
    }

    /// Parses a semester number such as `202008`.
    pub fn from_number(number: &str) -> Result<Self> {
        if number.len() != SEMESTER_NUMBER_LEN || !number.bytes().all(|b| b.is_ascii_digit()) {
            return Err(TerpError::invalid_semester(
                number,
                format!("expected {SEMESTER_NUMBER_LEN} digits"),
            ));
        }

        let (year, code) = number.split_at(4);
        let season = Season::from_code(code)
            .map_err(|_| TerpError::invalid_semester(number, format!("unknown season code {code}")))?;
        let year = year
            .parse()
            .map_err(|_| TerpError::invalid_semester(number, "invalid year"))?;

        Ok(Self { year, season })
    }

    /// Parses a semester name such as `"Fall 2020"` or `" winter 2021 "`.
    ///
    /// The season is case-insensitive; season and year are separated by a
    /// single space.
    pub fn from_name(name: &str) -> Result<Self> {
        let trimmed = name.trim();
        let mut parts = trimmed.split(' ');
        let (season, year) = match (parts.next(), parts.next(), parts.next()) {
            (Some(season), Some(year), None) => (season, year),
            _ => {
                return Err(TerpError::invalid_semester(
                    name,
                    "expected '<season> <year>'",
                ))
            }
        };

        let season = Season::from_name(season)
            .map_err(|_| TerpError::invalid_semester(name, format!("unknown season {season}")))?;
        let display_year: u16 = year
            .parse()
            .map_err(|_| TerpError::invalid_semester(name, "invalid year"))?;

        // Exact inverse of `name()`: "Winter 2021" is 202012. Adding a year
        // here instead would send it to 202212.
        let year = if season == Season::Winter {
            display_year
                .checked_sub(1)
                .ok_or_else(|| TerpError::invalid_semester(name, "winter year out of range"))?
        } else {
            display_year
        };

        Self::new(year, season).map_err(|_| TerpError::invalid_semester(name, "year out of range"))
    }

    /// Season of the term.
    pub fn season(&self) -> Season {
        self.season
    }

    /// Year used in the semester number.
    pub fn number_year(&self) -> u16 {
        self.year
    }

    /// Year used in the semester name (one later for winter terms).
    pub fn display_year(&self) -> u32 {
        match self.season {
            Season::Winter => u32::from(self.year) + 1,
            _ => u32::from(self.year),
        }
    }

    /// Semester number, e.g. `"202012"`.
    pub fn number(&self) -> String {
        format!("{:04}{}", self.year, self.season.code())
    }

    /// Semester name, e.g. `"Winter 2021"`.
    pub fn name(&self) -> String {
        format!("{} {}", self.season, self.display_year())
    }
}

impl fmt::Display for Semester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.number())
    }
}

impl FromStr for Semester {
    type Err = TerpError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_number(s)
    }
}

impl TryFrom<String> for Semester {
    type Error = TerpError;

    fn try_from(value: String) -> Result<Self> {
        Self::from_number(&value)
    }
}

impl From<Semester> for String {
    fn from(value: Semester) -> Self {
        value.number()
    }
}

/// Converts a semester number to its name: `"202012"` → `"Winter 2021"`.
pub fn semester_name(number: &str) -> Result<String> {
    Semester::from_number(number).map(|s| s.name())
}

/// Converts a semester name to its number: `"Winter 2021"` → `"202012"`.
pub fn semester_number(name: &str) -> Result<String> {
    Semester::from_name(name).map(|s| s.number())
}

/// Recently offered semesters, ascending.
pub fn recent_semesters() -> Result<Vec<Semester>> {
    RECENT_SEMESTERS.iter().map(|n| Semester::from_number(n)).collect()
}
