use crate::error::{ForecastError, Result};
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Average number of weeks in a month used to turn a weekly amount into a
/// monthly one.
pub const DEFAULT_WEEKLY_FACTOR: Decimal = Decimal::from_parts(433, 0, 0, false, 2);

/// Amounts closer than this are reported as unchanged between two months.
pub const DEFAULT_CHANGE_TOLERANCE: Decimal = Decimal::from_parts(5, 0, 0, false, 3);

pub const DEFAULT_HORIZON_MONTHS: i64 = 24;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(default)]
pub struct ProjectionOptions {
    #[schemars(
        description = "Number of months to project, starting with the current month. Zero or negative yields an empty projection."
    )]
    pub horizon_months: i64,

    #[schemars(description = "Multiplier applied to weekly amounts to get a monthly amount")]
    pub weekly_factor: Decimal,

    #[schemars(
        description = "Largest difference between two monthly amounts that still counts as unchanged in change narratives"
    )]
    pub change_tolerance: Decimal,
}

impl Default for ProjectionOptions {
    fn default() -> Self {
        Self {
            horizon_months: DEFAULT_HORIZON_MONTHS,
            weekly_factor: DEFAULT_WEEKLY_FACTOR,
            change_tolerance: DEFAULT_CHANGE_TOLERANCE,
        }
    }
}

impl ProjectionOptions {
    pub fn with_horizon(horizon_months: i64) -> Self {
        Self {
            horizon_months,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.weekly_factor.is_sign_negative() {
            return Err(ForecastError::InvalidWeeklyFactor(self.weekly_factor));
        }
        if self.change_tolerance.is_sign_negative() {
            return Err(ForecastError::InvalidChangeTolerance(self.change_tolerance));
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }
}

/// Horizons offered by the dashboard. Any positive month count is accepted by
/// the projector; these are only the menu entries.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub enum HorizonPreset {
    NextYear,
    NextTwoYears,
    NextThreeYears,
    NextFiveYears,
    NextTenYears,
    NextTwentyFiveYears,
}

impl HorizonPreset {
    pub const ALL: [HorizonPreset; 6] = [
        HorizonPreset::NextYear,
        HorizonPreset::NextTwoYears,
        HorizonPreset::NextThreeYears,
        HorizonPreset::NextFiveYears,
        HorizonPreset::NextTenYears,
        HorizonPreset::NextTwentyFiveYears,
    ];

    pub fn months(&self) -> i64 {
        match self {
            HorizonPreset::NextYear => 12,
            HorizonPreset::NextTwoYears => 24,
            HorizonPreset::NextThreeYears => 36,
            HorizonPreset::NextFiveYears => 60,
            HorizonPreset::NextTenYears => 120,
            HorizonPreset::NextTwentyFiveYears => 300,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            HorizonPreset::NextYear => "Next 12 months",
            HorizonPreset::NextTwoYears => "Next 24 months",
            HorizonPreset::NextThreeYears => "Next 3 years",
            HorizonPreset::NextFiveYears => "Next 5 years",
            HorizonPreset::NextTenYears => "Next 10 years",
            HorizonPreset::NextTwentyFiveYears => "Next 25 years",
        }
    }

    pub fn from_months(months: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|preset| preset.months() == months)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ProjectionOptions::default();
        assert_eq!(options.horizon_months, 24);
        assert_eq!(options.weekly_factor, Decimal::new(433, 2));
        assert_eq!(options.change_tolerance, Decimal::new(5, 3));
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let options = ProjectionOptions::from_json(r#"{ "horizon_months": 60 }"#).unwrap();
        assert_eq!(options.horizon_months, 60);
        assert_eq!(options.weekly_factor, DEFAULT_WEEKLY_FACTOR);
    }

    #[test]
    fn test_negative_weekly_factor_rejected() {
        let result = ProjectionOptions::from_json(r#"{ "weekly_factor": "-1" }"#);
        assert!(matches!(result, Err(ForecastError::InvalidWeeklyFactor(_))));

        let options = ProjectionOptions {
            change_tolerance: Decimal::new(-1, 2),
            ..ProjectionOptions::default()
        };
        assert!(matches!(
            options.validate(),
            Err(ForecastError::InvalidChangeTolerance(_))
        ));
    }

    #[test]
    fn test_horizon_presets() {
        let months: Vec<i64> = HorizonPreset::ALL.iter().map(|p| p.months()).collect();
        assert_eq!(months, vec![12, 24, 36, 60, 120, 300]);
        assert_eq!(
            HorizonPreset::from_months(36),
            Some(HorizonPreset::NextThreeYears)
        );
        assert_eq!(HorizonPreset::from_months(7), None);
        assert_eq!(HorizonPreset::NextFiveYears.label(), "Next 5 years");
    }
}
