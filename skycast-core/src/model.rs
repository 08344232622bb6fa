use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Geographic position of a resolved city. Only present after a successful
/// geocode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Coarse display icon derived from a weather condition code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConditionIcon {
    Clear,
    PartlyCloudy,
    Precipitation,
}

impl ConditionIcon {
    pub fn glyph(&self) -> &'static str {
        match self {
            ConditionIcon::Clear => "☀️",
            ConditionIcon::PartlyCloudy => "⛅",
            ConditionIcon::Precipitation => "🌧️",
        }
    }
}

/// Condition-code boundaries for icon classification. These are a display
/// policy, not a physical law, so callers may override them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IconThresholds {
    /// Codes at or below this value render as clear sky.
    pub clear_max: u16,
    /// Codes at or above this value render as precipitation.
    pub precipitation_min: u16,
}

impl Default for IconThresholds {
    fn default() -> Self {
        Self {
            clear_max: 0,
            precipitation_min: 50,
        }
    }
}

impl IconThresholds {
    pub fn icon_for(&self, condition_code: u16) -> ConditionIcon {
        if condition_code <= self.clear_max {
            ConditionIcon::Clear
        } else if condition_code >= self.precipitation_min {
            ConditionIcon::Precipitation
        } else {
            ConditionIcon::PartlyCloudy
        }
    }
}

/// Severe-weather warning tier derived from a condition code. Tiers are
/// mutually exclusive; only the highest matching one applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StormWarning {
    PossibleStorm,
    VeryHeavyRain,
    SevereStorm,
}

impl StormWarning {
    /// Most-severe-first: >= 80 severe storm, >= 70 very heavy rain,
    /// >= 60 possible storm, otherwise none.
    pub fn for_code(condition_code: u16) -> Option<Self> {
        if condition_code >= 80 {
            Some(StormWarning::SevereStorm)
        } else if condition_code >= 70 {
            Some(StormWarning::VeryHeavyRain)
        } else if condition_code >= 60 {
            Some(StormWarning::PossibleStorm)
        } else {
            None
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            StormWarning::SevereStorm => "severe storm",
            StormWarning::VeryHeavyRain => "very heavy rain",
            StormWarning::PossibleStorm => "possible storm",
        }
    }
}

impl std::fmt::Display for StormWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// Raw per-day forecast values as returned by a provider, before derivation.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyEntry {
    pub date: NaiveDate,
    pub temperature_max: f64,
    pub temperature_min: f64,
    pub condition_code: u16,
}

/// Raw current-conditions sample as returned by a provider.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentSample {
    pub temperature: f64,
    pub condition_code: u16,
    pub observed_at: DateTime<Utc>,
}

/// One forecast day as exposed to callers. `icon` and `warning` are derived
/// from `condition_code` at construction and never stored independently.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub temperature_max: f64,
    pub temperature_min: f64,
    pub condition_code: u16,
    pub icon: ConditionIcon,
    pub warning: Option<StormWarning>,
}

impl ForecastPoint {
    pub fn from_entry(entry: DailyEntry, thresholds: &IconThresholds) -> Self {
        Self {
            date: entry.date,
            temperature_max: entry.temperature_max,
            temperature_min: entry.temperature_min,
            condition_code: entry.condition_code,
            icon: thresholds.icon_for(entry.condition_code),
            warning: StormWarning::for_code(entry.condition_code),
        }
    }
}

/// Current conditions as exposed to callers, with the derived icon.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentConditions {
    pub temperature: f64,
    pub condition_code: u16,
    pub icon: ConditionIcon,
    pub observed_at: DateTime<Utc>,
}

impl CurrentConditions {
    pub fn from_sample(sample: CurrentSample, thresholds: &IconThresholds) -> Self {
        Self {
            temperature: sample.temperature,
            condition_code: sample.condition_code,
            icon: thresholds.icon_for(sample.condition_code),
            observed_at: sample.observed_at,
        }
    }
}

/// Temperature unit preference. Providers always report Celsius; conversion
/// happens at display time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    pub fn convert_from_celsius(&self, celsius: f64) -> f64 {
        match self {
            TemperatureUnit::Celsius => celsius,
            TemperatureUnit::Fahrenheit => celsius * 9.0 / 5.0 + 32.0,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "°C",
            TemperatureUnit::Fahrenheit => "°F",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(condition_code: u16) -> DailyEntry {
        DailyEntry {
            date: NaiveDate::from_ymd_opt(2026, 8, 24).expect("valid date"),
            temperature_max: 21.0,
            temperature_min: 14.0,
            condition_code,
        }
    }

    #[test]
    fn clear_sky_has_no_warning() {
        let point = ForecastPoint::from_entry(entry(0), &IconThresholds::default());
        assert_eq!(point.icon, ConditionIcon::Clear);
        assert_eq!(point.warning, None);
    }

    #[test]
    fn mid_range_code_is_partly_cloudy() {
        let point = ForecastPoint::from_entry(entry(30), &IconThresholds::default());
        assert_eq!(point.icon, ConditionIcon::PartlyCloudy);
        assert_eq!(point.warning, None);
    }

    #[test]
    fn icon_boundary_between_cloudy_and_precipitation() {
        let thresholds = IconThresholds::default();
        assert_eq!(thresholds.icon_for(49), ConditionIcon::PartlyCloudy);
        assert_eq!(thresholds.icon_for(50), ConditionIcon::Precipitation);
    }

    #[test]
    fn warning_tiers_are_mutually_exclusive() {
        assert_eq!(StormWarning::for_code(59), None);
        assert_eq!(StormWarning::for_code(65), Some(StormWarning::PossibleStorm));
        assert_eq!(StormWarning::for_code(70), Some(StormWarning::VeryHeavyRain));
        assert_eq!(StormWarning::for_code(82), Some(StormWarning::SevereStorm));
    }

    #[test]
    fn custom_thresholds_shift_icon_classification() {
        let thresholds = IconThresholds {
            clear_max: 2,
            precipitation_min: 40,
        };
        assert_eq!(thresholds.icon_for(2), ConditionIcon::Clear);
        assert_eq!(thresholds.icon_for(45), ConditionIcon::Precipitation);
    }

    #[test]
    fn fahrenheit_conversion() {
        let unit = TemperatureUnit::Fahrenheit;
        assert!((unit.convert_from_celsius(0.0) - 32.0).abs() < f64::EPSILON);
        assert!((unit.convert_from_celsius(100.0) - 212.0).abs() < f64::EPSILON);
        assert_eq!(TemperatureUnit::Celsius.convert_from_celsius(21.5), 21.5);
    }
}
