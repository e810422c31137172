// ==========================================
// Roofline Engine - Schedule Planner
// ==========================================
// Greedy date-order allocation of the estimate's labor hours across
// the feasible installability days, producing the suggested start and
// end dates, the per-day revenue projection and a blended confidence
// score. Pure logic.
// ==========================================

use crate::config::EngineConfig;
use crate::domain::installability::{DayInstallability, InstallabilityResult, SchedulePlan};
use crate::domain::money::round2;
use crate::engine::error::{EngineError, EngineResult};
use std::collections::BTreeMap;
use tracing::debug;

// ==========================================
// SchedulePlanner
// ==========================================
pub struct SchedulePlanner {
    /// Revenue credited per allocated labor hour.
    hourly_revenue_rate: f64,
    /// Confidence multiplier applied when the forecast had data gaps.
    forecast_gap_penalty: f64,
}

impl SchedulePlanner {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            hourly_revenue_rate: config.default_hourly_revenue,
            forecast_gap_penalty: config.forecast_gap_penalty,
        }
    }

    /// Allocate `total_labor_hours` across the installability days.
    ///
    /// # Rules
    /// 1. days are processed in ascending date order; infeasible days
    ///    and days with zero usable hours carry no capacity
    /// 2. the first day with capacity becomes the suggested start
    /// 3. each day receives min(usable hours, remaining hours); its
    ///    revenue projection is allocated hours x hourly rate, rounded
    ///    to cents; the suggested end tracks the last allocated day
    /// 4. allocation stops once remaining hours reach zero
    /// 5. no day with capacity at all is a hard error, not a degraded
    ///    plan
    ///
    /// Confidence = (min(1, feasible days / planned duration days)
    /// x 0.6 + slack x 0.4) x gap penalty, where slack is 1.0 when
    /// everything was allocated and max(0, 1 - remaining/24)
    /// otherwise, and the gap penalty applies only when the
    /// installability run was flagged with a forecast data gap.
    pub fn plan(
        &self,
        job_id: &str,
        total_labor_hours: f64,
        installability: &InstallabilityResult,
    ) -> EngineResult<SchedulePlan> {
        let mut remaining = total_labor_hours;
        let mut suggested_start = None;
        let mut suggested_end = None;
        let mut usable_hours_per_day = BTreeMap::new();
        let mut revenue_projection = BTreeMap::new();

        for day in &installability.windows {
            let usable = Self::day_capacity(day);
            if usable <= 0.0 {
                continue;
            }
            if suggested_start.is_none() {
                suggested_start = Some(day.date);
            }
            if remaining <= 0.0 {
                // Nothing left to place: a zero-hour job still anchors
                // on the first day with capacity.
                suggested_end.get_or_insert(day.date);
                break;
            }

            let allocated = usable.min(remaining);
            remaining -= allocated;
            suggested_end = Some(day.date);
            usable_hours_per_day.insert(day.date, usable);
            revenue_projection.insert(day.date, round2(allocated * self.hourly_revenue_rate));
        }

        let (suggested_start, suggested_end) = match (suggested_start, suggested_end) {
            (Some(start), Some(end)) => (start, end),
            _ => {
                return Err(EngineError::NoFeasibleStartDate {
                    job_id: job_id.to_string(),
                })
            }
        };

        let confidence = self.confidence(
            installability,
            suggested_start,
            suggested_end,
            remaining.max(0.0),
        );
        debug!(
            job_id,
            %suggested_start,
            %suggested_end,
            confidence,
            remaining_hours = remaining.max(0.0),
            "schedule plan computed"
        );

        Ok(SchedulePlan {
            job_id: job_id.to_string(),
            suggested_start,
            suggested_end,
            confidence: round2(confidence),
            usable_hours_per_day,
            revenue_projection,
        })
    }

    /// Infeasible days carry no capacity even when they hold windows
    /// (the daily-hours requirement can fail a day that still has a
    /// qualifying window).
    fn day_capacity(day: &DayInstallability) -> f64 {
        if day.feasible {
            day.usable_hours()
        } else {
            0.0
        }
    }

    fn confidence(
        &self,
        installability: &InstallabilityResult,
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
        remaining_hours: f64,
    ) -> f64 {
        let duration_days = (end - start).num_days() + 1;
        let capacity_score =
            (installability.total_feasible_days as f64 / duration_days as f64).min(1.0);

        let slack_score = if remaining_hours <= 0.0 {
            1.0
        } else {
            (1.0 - remaining_hours / 24.0).max(0.0)
        };

        let penalty = if installability.is_flagged(crate::domain::types::FlagCode::ForecastDataGap)
        {
            self.forecast_gap_penalty
        } else {
            1.0
        };

        (capacity_score * 0.6 + slack_score * 0.4) * penalty
    }
}
