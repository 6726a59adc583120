//! Column Catalog Module
//! Tags numeric columns with their variable families and temporal granularity,
//! and selects columns for the variable-type / temporal-period filters.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
#[error("Unknown month: {0}")]
pub struct UnknownMonth(pub String);

/// Variable type filter offered by the distribution explorer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum VariableCategory {
    #[default]
    All,
    Static,
    Temperature,
    Salinity,
    Chlorophyll,
    Nutrients,
    WaveHeight,
    WaterClarity,
}

impl VariableCategory {
    pub const ALL: [VariableCategory; 8] = [
        VariableCategory::All,
        VariableCategory::Static,
        VariableCategory::Temperature,
        VariableCategory::Salinity,
        VariableCategory::Chlorophyll,
        VariableCategory::Nutrients,
        VariableCategory::WaveHeight,
        VariableCategory::WaterClarity,
    ];

    pub fn label(self) -> &'static str {
        match self {
            VariableCategory::All => "All Variables",
            VariableCategory::Static => "Geographic/Static",
            VariableCategory::Temperature => "Temperature",
            VariableCategory::Salinity => "Salinity",
            VariableCategory::Chlorophyll => "Chlorophyll-α",
            VariableCategory::Nutrients => "Nutrients (Nitrate/Phosphate)",
            VariableCategory::WaveHeight => "Wave Height",
            VariableCategory::WaterClarity => "Water Transparency (Secchi)",
        }
    }

    /// Keyword test against a column name.
    pub fn matches(self, name: &str) -> bool {
        let upper = name.to_uppercase();
        match self {
            VariableCategory::All => true,
            VariableCategory::Static => [
                "Distance",
                "bathym",
                "LATITUDE",
                "LONGITUDE",
                "GEOGRAPHIC_ZONE",
            ]
            .iter()
            .any(|keyword| name.contains(keyword)),
            VariableCategory::Temperature => name.contains("VOTEMPER") || upper.contains("TEMP"),
            VariableCategory::Salinity => name.contains("VOSALINE") || upper.contains("SAL"),
            VariableCategory::Chlorophyll => upper.contains("CHL"),
            VariableCategory::Nutrients => ["NIT", "PHO", "NUTRIENT"]
                .iter()
                .any(|keyword| upper.contains(keyword)),
            VariableCategory::WaveHeight => name.contains("VHM0") || upper.contains("WAVE"),
            VariableCategory::WaterClarity => name.contains("ZSD") || upper.contains("SECCHI"),
        }
    }

    /// Static variables have no time axis, and "All" spans every axis.
    pub fn ignores_period(self) -> bool {
        matches!(self, VariableCategory::All | VariableCategory::Static)
    }
}

impl fmt::Display for VariableCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Temporal aggregation filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TemporalPeriod {
    #[default]
    All,
    Annual,
    Seasonal,
    Monthly,
}

impl TemporalPeriod {
    pub const ALL: [TemporalPeriod; 4] = [
        TemporalPeriod::All,
        TemporalPeriod::Annual,
        TemporalPeriod::Seasonal,
        TemporalPeriod::Monthly,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TemporalPeriod::All => "All Periods",
            TemporalPeriod::Annual => "Annual (Year)",
            TemporalPeriod::Seasonal => "Seasonal (Winter, Spring, Summer, Autumn)",
            TemporalPeriod::Monthly => "Monthly (Individual months)",
        }
    }
}

impl fmt::Display for TemporalPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Autumn,
}

impl Season {
    fn from_token(token: &str) -> Option<Self> {
        match token {
            "winter" => Some(Season::Winter),
            "spring" => Some(Season::Spring),
            "summer" => Some(Season::Summer),
            "autumn" | "fall" => Some(Season::Autumn),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Month {
    January = 1,
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

    const NAMES: [&'static str; 12] = [
        "January",
        "February",
        "March",
        "April",
        "May",
        "June",
        "July",
        "August",
        "September",
        "October",
        "November",
        "December",
    ];

    pub fn number(self) -> u32 {
        self as u32
    }

    pub fn from_number(number: u32) -> Option<Self> {
        Month::ALL.get(number.checked_sub(1)? as usize).copied()
    }

    pub fn name(self) -> &'static str {
        Self::NAMES[self as usize - 1]
    }

    /// Selector label, e.g. "March (3)".
    pub fn label(self) -> String {
        format!("{} ({})", self.name(), self.number())
    }

    /// Full name or three-letter abbreviation ("sept" also accepted), lower case.
    fn from_name_token(token: &str) -> Option<Self> {
        if token == "sept" {
            return Some(Month::September);
        }
        Month::ALL.into_iter().find(|month| {
            let name = month.name().to_lowercase();
            token == name || token == &name[..3]
        })
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Month {
    type Err = UnknownMonth;

    /// Accepts selector labels ("March (3)"), names, abbreviations and numbers.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        let head = lower.split_whitespace().next().unwrap_or_default();
        Month::from_name_token(head)
            .or_else(|| head.parse().ok().and_then(Month::from_number))
            .ok_or_else(|| UnknownMonth(s.to_string()))
    }
}

/// Temporal granularity encoded in a column name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Granularity {
    Static,
    Annual,
    Seasonal(Season),
    Monthly(Month),
    Unspecified,
}

impl Granularity {
    /// Parse the naming convention: `_year` suffix token, season names,
    /// `YYYY-MM-DD` / `YYYY_MM` dates, or month names, with `_` or `-` delimiters.
    pub fn from_column_name(name: &str) -> Self {
        let lower = name.to_lowercase();
        let tokens: Vec<&str> = lower
            .split(['_', '-'])
            .filter(|t| !t.is_empty())
            .collect();

        if tokens.iter().any(|t| *t == "year") {
            return Granularity::Annual;
        }
        if let Some(season) = tokens.iter().find_map(|t| Season::from_token(t)) {
            return Granularity::Seasonal(season);
        }
        if let Some(month) = month_from_tokens(&tokens) {
            return Granularity::Monthly(month);
        }
        if VariableCategory::Static.matches(name) {
            return Granularity::Static;
        }
        Granularity::Unspecified
    }

    fn matches_period(self, period: TemporalPeriod, months: &[Month]) -> bool {
        match (period, self) {
            (TemporalPeriod::All, _) => true,
            (TemporalPeriod::Annual, Granularity::Annual) => true,
            (TemporalPeriod::Seasonal, Granularity::Seasonal(_)) => true,
            (TemporalPeriod::Monthly, Granularity::Monthly(month)) => {
                months.is_empty() || months.contains(&month)
            }
            _ => false,
        }
    }
}

fn is_year(token: &str) -> bool {
    token.len() == 4 && token.bytes().all(|b| b.is_ascii_digit())
}

fn numeric_month(token: &str) -> Option<Month> {
    if token.is_empty() || token.len() > 2 || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse().ok().and_then(Month::from_number)
}

fn month_from_tokens(tokens: &[&str]) -> Option<Month> {
    if let Some(month) = tokens.iter().find_map(|t| Month::from_name_token(t)) {
        return Some(month);
    }

    // In dated encodings the month follows the year; the trailing day is not a month.
    if let Some(pos) = tokens.iter().position(|t| is_year(t)) {
        return tokens
            .get(pos + 1)
            .and_then(|t| numeric_month(t))
            .or_else(|| pos.checked_sub(1).and_then(|p| numeric_month(tokens[p])));
    }

    tokens.iter().skip(1).find_map(|t| numeric_month(t))
}

/// Structured metadata for one numeric column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnTag {
    pub name: String,
    pub categories: BTreeSet<VariableCategory>,
    pub granularity: Granularity,
}

impl ColumnTag {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let categories = VariableCategory::ALL
            .into_iter()
            .filter(|category| category.matches(&name))
            .collect();
        let granularity = Granularity::from_column_name(&name);
        Self {
            name,
            categories,
            granularity,
        }
    }
}

/// Tags for every numeric column of a table, in table order.
#[derive(Debug, Clone, Default)]
pub struct ColumnCatalog {
    tags: Vec<ColumnTag>,
}

impl ColumnCatalog {
    pub fn new<I, S>(numeric_columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tags: numeric_columns.into_iter().map(ColumnTag::new).collect(),
        }
    }

    pub fn tags(&self) -> &[ColumnTag] {
        &self.tags
    }

    pub fn get(&self, name: &str) -> Option<&ColumnTag> {
        self.tags.iter().find(|tag| tag.name == name)
    }

    /// Columns passing both the category and the period filter, sorted and deduplicated.
    ///
    /// `months` only narrows a `Monthly` period; an empty slice means every month.
    /// Categories without a time axis ignore `period` entirely.
    pub fn select_columns(
        &self,
        category: VariableCategory,
        period: TemporalPeriod,
        months: &[Month],
    ) -> Vec<String> {
        let period = if category.ignores_period() {
            TemporalPeriod::All
        } else {
            period
        };

        self.tags
            .iter()
            .filter(|tag| tag.categories.contains(&category))
            .filter(|tag| tag.granularity.matches_period(period, months))
            .map(|tag| tag.name.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

/// Presets of the descriptive statistics table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VariableSet {
    #[default]
    Static,
    AnnualTemporal,
    AllNumeric,
}

impl VariableSet {
    pub const ALL: [VariableSet; 3] = [
        VariableSet::Static,
        VariableSet::AnnualTemporal,
        VariableSet::AllNumeric,
    ];

    pub fn label(self) -> &'static str {
        match self {
            VariableSet::Static => "Static Variables",
            VariableSet::AnnualTemporal => "Temporal Variables (Annual Averages)",
            VariableSet::AllNumeric => "All Numerical Variables",
        }
    }

    /// File-name friendly form of the label.
    pub fn slug(self) -> String {
        self.label().to_lowercase().replace(' ', "_")
    }
}

/// Location-fixed predictors, in display order.
pub const STATIC_COLUMNS: [&str; 7] = [
    "Med_bathym",
    "Distance_to_Coast",
    "Distance_to_Major_River",
    "Distance_to_Complete_River",
    "Distance_to_Major_Cities",
    "Distance_to_Complete_Cities",
    "Distance_to_Port",
];

impl ColumnCatalog {
    /// Columns of a descriptive statistics preset, in table order.
    pub fn variable_set(&self, set: VariableSet) -> Vec<String> {
        match set {
            VariableSet::Static => STATIC_COLUMNS
                .iter()
                .filter(|name| self.get(name).is_some())
                .map(|name| name.to_string())
                .collect(),
            VariableSet::AnnualTemporal => self
                .tags
                .iter()
                .filter(|tag| !STATIC_COLUMNS.contains(&tag.name.as_str()))
                .filter(|tag| tag.name.contains("_year"))
                .filter(|tag| {
                    let lower = tag.name.to_lowercase();
                    !lower.contains("max") && !lower.contains("min")
                })
                .map(|tag| tag.name.clone())
                .collect(),
            VariableSet::AllNumeric => self.tags.iter().map(|tag| tag.name.clone()).collect(),
        }
    }

    /// Static followed by annual-average columns: the correlation analysis subset.
    pub fn correlation_columns(&self) -> Vec<String> {
        let mut columns = self.variable_set(VariableSet::Static);
        columns.extend(self.variable_set(VariableSet::AnnualTemporal));
        columns
    }
}
