//! Calendar months, tariff seasons, and the fixed per-month / per-season tables.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::TariffError;

/// Calendar month, ordered January through December.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Month {
    January,
    February,
    March,
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
}

impl Month {
    /// All twelve months in calendar order.
    pub const ALL: [Month; 12] = [
        Month::January,
        Month::February,
        Month::March,
        Month::April,
        Month::May,
        Month::June,
        Month::July,
        Month::August,
        Month::September,
        Month::October,
        Month::November,
        Month::December,
    ];

    /// English month name, e.g. `"January"`.
    pub fn name(self) -> &'static str {
        match self {
            Month::January => "January",
            Month::February => "February",
            Month::March => "March",
            Month::April => "April",
            Month::May => "May",
            Month::June => "June",
            Month::July => "July",
            Month::August => "August",
            Month::September => "September",
            Month::October => "October",
            Month::November => "November",
            Month::December => "December",
        }
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Month {
    type Err = TariffError;

    /// Parses an English month name, ignoring case and surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Month::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| TariffError::InvalidInput(format!("unrecognized month \"{s}\"")))
    }
}

/// Tariff season. Each season carries its own rates and demand tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Season {
    Winter,
    Summer,
    SummerPeak,
}

impl Season {
    /// All seasons, in table order.
    pub const ALL: [Season; 3] = [Season::Winter, Season::Summer, Season::SummerPeak];

    /// Upper-case tariff name, e.g. `"SUMMER_PEAK"`.
    pub fn name(self) -> &'static str {
        match self {
            Season::Winter => "WINTER",
            Season::Summer => "SUMMER",
            Season::SummerPeak => "SUMMER_PEAK",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One value per calendar month.
///
/// Exhaustive by construction; in TOML and JSON it reads as a table keyed by
/// month name (`January = 7.13`). Keys are exact, capitalized English names:
/// `january` is an unknown field. Use [`MonthTable::from_entries`] with
/// parsed [`Month`] values for case-insensitive input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct MonthTable<T> {
    pub january: T,
    pub february: T,
    pub march: T,
    pub april: T,
    pub may: T,
    pub june: T,
    pub july: T,
    pub august: T,
    pub september: T,
    pub october: T,
    pub november: T,
    pub december: T,
}

impl<T> MonthTable<T> {
    /// Builds a table by evaluating `f` for every month.
    pub fn from_fn(mut f: impl FnMut(Month) -> T) -> Self {
        Self {
            january: f(Month::January),
            february: f(Month::February),
            march: f(Month::March),
            april: f(Month::April),
            may: f(Month::May),
            june: f(Month::June),
            july: f(Month::July),
            august: f(Month::August),
            september: f(Month::September),
            october: f(Month::October),
            november: f(Month::November),
            december: f(Month::December),
        }
    }

    /// Builds a table by evaluating a fallible `f` for every month.
    ///
    /// # Errors
    ///
    /// Returns the first error produced by `f`, in calendar order.
    pub fn try_from_fn<E>(mut f: impl FnMut(Month) -> Result<T, E>) -> Result<Self, E> {
        Ok(Self {
            january: f(Month::January)?,
            february: f(Month::February)?,
            march: f(Month::March)?,
            april: f(Month::April)?,
            may: f(Month::May)?,
            june: f(Month::June)?,
            july: f(Month::July)?,
            august: f(Month::August)?,
            september: f(Month::September)?,
            october: f(Month::October)?,
            november: f(Month::November)?,
            december: f(Month::December)?,
        })
    }

    /// Returns the value for `month`.
    pub fn get(&self, month: Month) -> &T {
        match month {
            Month::January => &self.january,
            Month::February => &self.february,
            Month::March => &self.march,
            Month::April => &self.april,
            Month::May => &self.may,
            Month::June => &self.june,
            Month::July => &self.july,
            Month::August => &self.august,
            Month::September => &self.september,
            Month::October => &self.october,
            Month::November => &self.november,
            Month::December => &self.december,
        }
    }

    /// Iterates `(month, value)` pairs in calendar order.
    pub fn iter(&self) -> impl Iterator<Item = (Month, &T)> {
        Month::ALL.into_iter().map(move |m| (m, self.get(m)))
    }

    /// Builds a table from `(month, value)` pairs.
    ///
    /// # Errors
    ///
    /// Returns `TariffError::InvalidInput` if a month is missing or repeated.
    pub fn from_entries(entries: impl IntoIterator<Item = (Month, T)>) -> Result<Self, TariffError> {
        let mut slots: [Option<T>; 12] = Default::default();
        for (month, value) in entries {
            let slot = &mut slots[month as usize];
            if slot.replace(value).is_some() {
                return Err(TariffError::InvalidInput(format!(
                    "month {month} given more than once"
                )));
            }
        }

        let mut missing = Vec::new();
        for month in Month::ALL {
            if slots[month as usize].is_none() {
                missing.push(month.name());
            }
        }
        if !missing.is_empty() {
            return Err(TariffError::InvalidInput(format!(
                "missing months: {}",
                missing.join(", ")
            )));
        }

        Self::try_from_fn(|m| {
            slots[m as usize]
                .take()
                .ok_or_else(|| TariffError::InvalidInput(format!("missing month {m}")))
        })
    }
}

impl MonthTable<f64> {
    /// Sum of all twelve monthly values.
    pub fn total(&self) -> f64 {
        self.iter().map(|(_, v)| *v).sum()
    }
}

/// One value per tariff season, keyed `WINTER` / `SUMMER` / `SUMMER_PEAK`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeasonTable<T> {
    #[serde(rename = "WINTER")]
    pub winter: T,
    #[serde(rename = "SUMMER")]
    pub summer: T,
    #[serde(rename = "SUMMER_PEAK")]
    pub summer_peak: T,
}

impl<T> SeasonTable<T> {
    /// Returns the value for `season`.
    pub fn get(&self, season: Season) -> &T {
        match season {
            Season::Winter => &self.winter,
            Season::Summer => &self.summer,
            Season::SummerPeak => &self.summer_peak,
        }
    }

    /// Iterates `(season, value)` pairs in table order.
    pub fn iter(&self) -> impl Iterator<Item = (Season, &T)> {
        Season::ALL.into_iter().map(move |s| (s, self.get(s)))
    }
}

/// Classifies `month` into its tariff season using the `seasons` map.
///
/// A month absent from every season falls back to `Season::Winter`; a
/// validated map never takes that path.
pub fn season_of(seasons: &SeasonTable<Vec<Month>>, month: Month) -> Season {
    seasons
        .iter()
        .find(|(_, months)| months.contains(&month))
        .map_or(Season::Winter, |(season, _)| season)
}
