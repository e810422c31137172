// ==========================================
// Roofline Engine - Flag Generator
// ==========================================
// Derives job-level advisory codes from the full multi-day
// installability output. Advisory only: multiple codes can co-occur
// and the absence of all of them is not itself a flag.
// ==========================================

use crate::domain::forecast::{HourEvaluation, NormalizedConstraints};
use crate::domain::installability::{DayInstallability, InstallabilityResult};
use crate::domain::types::{BlockerTag, FlagCode};

// ==========================================
// FlagGenerator - pure rule struct
// ==========================================
pub struct FlagGenerator;

impl FlagGenerator {
    /// Derive job-level codes.
    ///
    /// # Rules
    /// 1. WEATHER_INFEASIBLE: zero feasible days across the whole
    ///    evaluated range
    /// 2. RISING_WINDOW_TOO_SHORT: the policy requires rising
    ///    temperature and at least one hour anywhere was blocked
    ///    specifically by temperature_rising
    /// 3. FORECAST_DATA_GAP: any evaluated hour followed a gap
    pub fn generate(
        policy: &NormalizedConstraints,
        evaluations: &[HourEvaluation],
        days: &[DayInstallability],
    ) -> Vec<FlagCode> {
        let mut codes = Vec::new();

        if days.iter().all(|d| !d.feasible) {
            codes.push(FlagCode::WeatherInfeasible);
        }

        if policy.requires_rising_temp
            && evaluations
                .iter()
                .any(|e| e.blockers.contains(&BlockerTag::TemperatureRising))
        {
            codes.push(FlagCode::RisingWindowTooShort);
        }

        if evaluations.iter().any(|e| e.forecast_gap) {
            codes.push(FlagCode::ForecastDataGap);
        }

        codes
    }

    /// Assemble the persisted installability shape.
    pub fn assemble(
        policy: &NormalizedConstraints,
        evaluations: &[HourEvaluation],
        days: Vec<DayInstallability>,
    ) -> InstallabilityResult {
        let flagged = Self::generate(policy, evaluations, &days);
        let total_feasible_days = days.iter().filter(|d| d.feasible).count();
        InstallabilityResult {
            windows: days,
            total_feasible_days,
            flagged,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::forecast::HourlyForecastPoint;
    use chrono::{DateTime, Duration, Utc};

    fn policy(requires_rising_temp: bool) -> NormalizedConstraints {
        NormalizedConstraints {
            min_temp_f: Some(40.0),
            requires_rising_temp,
            min_window_minutes: 120,
            max_wind_mph: None,
            max_precip_prob: None,
        }
    }

    fn eval(hour_offset: i64, blockers: Vec<BlockerTag>, forecast_gap: bool) -> HourEvaluation {
        let base = "2026-04-01T08:00:00Z".parse::<DateTime<Utc>>().unwrap();
        HourEvaluation {
            point: HourlyForecastPoint {
                ts: base + Duration::hours(hour_offset),
                temp_f: 45.0,
                wind_mph: 5.0,
                precip_prob: 0.0,
            },
            blockers,
            forecast_gap,
        }
    }

    fn day(feasible: bool) -> DayInstallability {
        DayInstallability {
            date: "2026-04-01".parse().unwrap(),
            windows: vec![],
            feasible,
            limiting_factors: vec![],
        }
    }

    #[test]
    fn test_no_flags_on_clean_feasible_range() {
        let codes = FlagGenerator::generate(&policy(false), &[eval(0, vec![], false)], &[day(true)]);
        assert!(codes.is_empty());
    }

    #[test]
    fn test_weather_infeasible_when_no_day_is_feasible() {
        let codes = FlagGenerator::generate(&policy(false), &[], &[day(false), day(false)]);
        assert_eq!(codes, vec![FlagCode::WeatherInfeasible]);
    }

    #[test]
    fn test_rising_window_too_short_requires_policy_and_blocker() {
        let evals = vec![eval(0, vec![BlockerTag::TemperatureRising], false)];

        // Policy does not require rising: blocker alone is not enough.
        let codes = FlagGenerator::generate(&policy(false), &evals, &[day(true)]);
        assert!(codes.is_empty());

        let codes = FlagGenerator::generate(&policy(true), &evals, &[day(true)]);
        assert_eq!(codes, vec![FlagCode::RisingWindowTooShort]);
    }

    #[test]
    fn test_forecast_data_gap_flag() {
        let evals = vec![eval(0, vec![], false), eval(3, vec![], true)];
        let codes = FlagGenerator::generate(&policy(false), &evals, &[day(true)]);
        assert_eq!(codes, vec![FlagCode::ForecastDataGap]);
    }

    #[test]
    fn test_flags_can_co_occur() {
        let evals = vec![eval(0, vec![BlockerTag::TemperatureRising], true)];
        let codes = FlagGenerator::generate(&policy(true), &evals, &[day(false)]);
        assert_eq!(
            codes,
            vec![
                FlagCode::WeatherInfeasible,
                FlagCode::RisingWindowTooShort,
                FlagCode::ForecastDataGap
            ]
        );
    }

    #[test]
    fn test_assemble_counts_feasible_days() {
        let result = FlagGenerator::assemble(
            &policy(false),
            &[eval(0, vec![], false)],
            vec![day(true), day(false), day(true)],
        );
        assert_eq!(result.total_feasible_days, 2);
        assert_eq!(result.windows.len(), 3);
        assert!(result.flagged.is_empty());
    }
}
