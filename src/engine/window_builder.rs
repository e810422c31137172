// ==========================================
// Roofline Engine - Window Builder
// ==========================================
// Groups evaluated hours by calendar date, merges consecutive
// compliant hours into contiguous windows, discards windows shorter
// than the minimum continuous-window requirement and records the
// blocking factors observed per day. Pure logic.
// ==========================================

use crate::config::EngineConfig;
use crate::domain::forecast::{HourEvaluation, NormalizedConstraints};
use crate::domain::installability::{DayInstallability, FeasibleWindow};
use crate::domain::types::BlockerTag;
use chrono::{Duration, NaiveDate};
use std::collections::{BTreeMap, BTreeSet};

// ==========================================
// WindowBuilder
// ==========================================
pub struct WindowBuilder {
    /// Hours of work a day must support to count as feasible, on top
    /// of the minimum-window requirement.
    required_daily_hours: f64,
}

impl WindowBuilder {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            required_daily_hours: config.required_daily_hours,
        }
    }

    /// Build per-day installability records from evaluated hours.
    ///
    /// # Rules
    /// - hours are grouped by the date portion of their timestamp
    /// - a run of consecutive compliant hours closes as a candidate
    ///   window spanning [run start, last sample + 1h): each hourly
    ///   sample represents a full hour of coverage
    /// - a candidate is kept only if its duration reaches the
    ///   minimum continuous window; shorter candidates are discarded
    ///   entirely, never truncated
    /// - a day is feasible iff its kept window minutes reach
    ///   max(min window, required daily hours × 60); the boundary
    ///   case (exactly equal) is feasible
    /// - limiting factors = deduplicated non-gap blockers seen on the
    ///   day's non-qualifying hours
    ///
    /// Evaluations must already be sorted ascending (the hour
    /// evaluator guarantees it). Days come back in date order.
    pub fn build(
        &self,
        evaluations: &[HourEvaluation],
        policy: &NormalizedConstraints,
    ) -> Vec<DayInstallability> {
        let mut by_date: BTreeMap<NaiveDate, Vec<&HourEvaluation>> = BTreeMap::new();
        for evaluation in evaluations {
            by_date
                .entry(evaluation.point.ts.date_naive())
                .or_default()
                .push(evaluation);
        }

        by_date
            .into_iter()
            .map(|(date, hours)| self.build_day(date, &hours, policy))
            .collect()
    }

    fn build_day(
        &self,
        date: NaiveDate,
        hours: &[&HourEvaluation],
        policy: &NormalizedConstraints,
    ) -> DayInstallability {
        let mut windows: Vec<FeasibleWindow> = Vec::new();
        let mut limiting: BTreeSet<BlockerTag> = BTreeSet::new();
        let mut run: Option<(usize, usize)> = None; // (first, last) index of open run

        for (idx, hour) in hours.iter().enumerate() {
            if hour.meets_all() {
                run = Some(match run {
                    Some((first, _)) => (first, idx),
                    None => (idx, idx),
                });
            } else {
                limiting.extend(hour.blockers.iter().copied());
                if let Some((first, last)) = run.take() {
                    self.close_run(hours, first, last, policy, &mut windows);
                }
            }
        }
        if let Some((first, last)) = run {
            self.close_run(hours, first, last, policy, &mut windows);
        }

        let total_minutes: i64 = windows.iter().map(|w| w.minutes).sum();
        let required_minutes =
            (policy.min_window_minutes as f64).max(self.required_daily_hours * 60.0);
        let feasible = total_minutes as f64 >= required_minutes;

        DayInstallability {
            date,
            windows,
            feasible,
            limiting_factors: limiting.into_iter().collect(),
        }
    }

    /// Close a run of compliant hours as a candidate window; keep it
    /// only if it satisfies the minimum continuous window.
    fn close_run(
        &self,
        hours: &[&HourEvaluation],
        first: usize,
        last: usize,
        policy: &NormalizedConstraints,
        windows: &mut Vec<FeasibleWindow>,
    ) {
        let start = hours[first].point.ts;
        let end = hours[last].point.ts + Duration::hours(1);
        let minutes = (end - start).num_minutes();

        if minutes >= policy.min_window_minutes {
            windows.push(FeasibleWindow { start, end, minutes });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::forecast::HourlyForecastPoint;
    use chrono::{DateTime, Utc};

    fn policy(min_window_minutes: i64) -> NormalizedConstraints {
        NormalizedConstraints {
            min_temp_f: Some(40.0),
            requires_rising_temp: false,
            min_window_minutes,
            max_wind_mph: Some(25.0),
            max_precip_prob: Some(0.5),
        }
    }

    fn eval(hour_offset: i64, blockers: Vec<BlockerTag>) -> HourEvaluation {
        let base = "2026-04-01T08:00:00Z".parse::<DateTime<Utc>>().unwrap();
        HourEvaluation {
            point: HourlyForecastPoint {
                ts: base + Duration::hours(hour_offset),
                temp_f: 45.0,
                wind_mph: 10.0,
                precip_prob: 0.1,
            },
            blockers,
            forecast_gap: false,
        }
    }

    fn builder() -> WindowBuilder {
        WindowBuilder::new(&EngineConfig::default())
    }

    // ==========================================
    // Single-run merging (Scenario A)
    // ==========================================

    #[test]
    fn test_four_clear_hours_merge_into_one_window() {
        let evals: Vec<_> = (0..4).map(|h| eval(h, vec![])).collect();
        let days = builder().build(&evals, &policy(120));

        assert_eq!(days.len(), 1);
        let day = &days[0];
        assert_eq!(day.windows.len(), 1);
        // 4 hourly samples cover [08:00, 12:00): the half-open end
        // counts the final sample's full hour.
        assert_eq!(day.windows[0].minutes, 240);
        assert!(day.feasible);
        assert!(day.limiting_factors.is_empty());
    }

    #[test]
    fn test_window_end_is_last_sample_plus_one_hour() {
        let evals: Vec<_> = (0..4).map(|h| eval(h, vec![])).collect();
        let days = builder().build(&evals, &policy(120));
        let window = days[0].windows[0];
        assert_eq!(
            window.end,
            "2026-04-01T12:00:00Z".parse::<DateTime<Utc>>().unwrap()
        );
        assert_eq!((window.end - window.start).num_minutes(), window.minutes);
    }

    // ==========================================
    // Run breaking and discards (Scenario B)
    // ==========================================

    #[test]
    fn test_blocked_middle_hour_discards_short_fragments() {
        // Hours 0,1 clear; hour 2 blocked by precipitation; hour 3
        // clear. Fragments of 120 and 60 minutes against a 120-minute
        // floor: the first survives, the second is discarded.
        let evals = vec![
            eval(0, vec![]),
            eval(1, vec![]),
            eval(2, vec![BlockerTag::Precipitation]),
            eval(3, vec![]),
        ];
        let days = builder().build(&evals, &policy(120));

        let day = &days[0];
        assert_eq!(day.windows.len(), 1);
        assert_eq!(day.windows[0].minutes, 120);
        assert!(day.feasible);
        assert_eq!(day.limiting_factors, vec![BlockerTag::Precipitation]);
    }

    #[test]
    fn test_all_fragments_too_short_makes_day_infeasible() {
        // Single clear hours on both sides of a blocked hour: both
        // candidates are 60 minutes, both discarded, day infeasible.
        let evals = vec![
            eval(0, vec![]),
            eval(1, vec![BlockerTag::Precipitation]),
            eval(2, vec![]),
        ];
        let days = builder().build(&evals, &policy(120));

        let day = &days[0];
        assert!(day.windows.is_empty());
        assert!(!day.feasible);
        assert_eq!(day.limiting_factors, vec![BlockerTag::Precipitation]);
    }

    // ==========================================
    // Feasibility boundary and invariants
    // ==========================================

    #[test]
    fn test_exactly_minimum_window_is_feasible() {
        let evals = vec![eval(0, vec![]), eval(1, vec![])];
        let days = builder().build(&evals, &policy(120));
        assert_eq!(days[0].total_window_minutes(), 120);
        assert!(days[0].feasible);
    }

    #[test]
    fn test_required_daily_hours_raises_the_bar() {
        let mut config = EngineConfig::default();
        config.required_daily_hours = 4.0;
        let builder = WindowBuilder::new(&config);

        // 3 clear hours = 180 window minutes >= 120 min window, but
        // below 4h x 60 = 240 required minutes.
        let evals: Vec<_> = (0..3).map(|h| eval(h, vec![])).collect();
        let days = builder.build(&evals, &policy(120));
        assert_eq!(days[0].total_window_minutes(), 180);
        assert!(!days[0].feasible);
    }

    #[test]
    fn test_windows_sorted_and_non_overlapping() {
        let evals = vec![
            eval(0, vec![]),
            eval(1, vec![]),
            eval(2, vec![BlockerTag::Wind]),
            eval(3, vec![]),
            eval(4, vec![]),
            eval(5, vec![]),
        ];
        let days = builder().build(&evals, &policy(120));
        let windows = &days[0].windows;
        assert_eq!(windows.len(), 2);
        for pair in windows.windows(2) {
            assert!(pair[0].start < pair[1].start);
            assert!(pair[0].end <= pair[1].start);
        }
        // Half-open end convention allows at most 1440 + 60 minutes.
        assert!(days[0].total_window_minutes() <= 1500);
    }

    #[test]
    fn test_hours_grouped_by_calendar_date() {
        // 22:00 and 23:00 on day one, 00:00 and 01:00 on day two.
        let evals = vec![
            eval(14, vec![]),
            eval(15, vec![]),
            eval(16, vec![]),
            eval(17, vec![]),
        ];
        let days = builder().build(&evals, &policy(120));

        assert_eq!(days.len(), 2);
        assert_eq!(days[0].date, "2026-04-01".parse::<NaiveDate>().unwrap());
        assert_eq!(days[1].date, "2026-04-02".parse::<NaiveDate>().unwrap());
        assert_eq!(days[0].windows[0].minutes, 120);
        assert_eq!(days[1].windows[0].minutes, 120);
    }

    #[test]
    fn test_limiting_factors_deduplicated() {
        let evals = vec![
            eval(0, vec![BlockerTag::Wind, BlockerTag::Precipitation]),
            eval(1, vec![BlockerTag::Wind]),
            eval(2, vec![BlockerTag::Temperature]),
        ];
        let days = builder().build(&evals, &policy(120));
        assert_eq!(
            days[0].limiting_factors,
            vec![
                BlockerTag::Temperature,
                BlockerTag::Wind,
                BlockerTag::Precipitation
            ]
        );
    }
}
