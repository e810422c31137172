// ==========================================
// Roofline Engine - Hour Evaluator
// ==========================================
// Annotates every forecast hour with the constraints it violates
// and flags timestamp gaps between consecutive samples. Pure logic:
// one evaluation record per input hour, no hours ever dropped.
// ==========================================

use crate::config::EngineConfig;
use crate::domain::forecast::{HourEvaluation, HourlyForecastPoint, NormalizedConstraints};
use crate::domain::types::BlockerTag;

// ==========================================
// HourEvaluator
// ==========================================
pub struct HourEvaluator {
    /// Gap to the previous sample (minutes) beyond which the hour is
    /// marked as following a forecast data gap.
    gap_minutes: i64,
    /// Temperature must exceed the previous hour by more than this
    /// to count as genuinely rising.
    rising_epsilon_f: f64,
}

impl HourEvaluator {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            gap_minutes: config.forecast_gap_minutes,
            rising_epsilon_f: config.rising_epsilon_f,
        }
    }

    /// Evaluate all forecast hours against the normalized policy.
    ///
    /// Points are sorted by timestamp first: downstream day grouping
    /// assumes ascending order, and producers are not trusted to
    /// deliver sorted data.
    ///
    /// # Blockers per hour
    /// - `temperature`: below the minimum temperature floor
    /// - `temperature_rising`: rising required and this is the first
    ///   point, or the point is below the floor, or it does not
    ///   exceed the previous point by more than the epsilon
    /// - `wind`: above the wind ceiling
    /// - `precipitation`: above the precipitation-probability ceiling
    ///
    /// The gap marker is carried separately: it never disqualifies
    /// the hour and never enters per-day limiting factors.
    pub fn evaluate(
        &self,
        mut points: Vec<HourlyForecastPoint>,
        policy: &NormalizedConstraints,
    ) -> Vec<HourEvaluation> {
        points.sort_by_key(|p| p.ts);

        let mut evaluations = Vec::with_capacity(points.len());
        let mut previous: Option<HourlyForecastPoint> = None;

        for point in points {
            let forecast_gap = previous
                .map(|prev| (point.ts - prev.ts).num_minutes() > self.gap_minutes)
                .unwrap_or(false);

            let mut blockers = Vec::new();

            let below_floor = policy
                .min_temp_f
                .map(|floor| point.temp_f < floor)
                .unwrap_or(false);
            if below_floor {
                blockers.push(BlockerTag::Temperature);
            }

            if policy.requires_rising_temp {
                let rising = match previous {
                    // No trend context yet.
                    None => false,
                    Some(prev) => point.temp_f > prev.temp_f + self.rising_epsilon_f,
                };
                if below_floor || !rising {
                    blockers.push(BlockerTag::TemperatureRising);
                }
            }

            if let Some(ceiling) = policy.max_wind_mph {
                if point.wind_mph > ceiling {
                    blockers.push(BlockerTag::Wind);
                }
            }

            if let Some(ceiling) = policy.max_precip_prob {
                if point.precip_prob > ceiling {
                    blockers.push(BlockerTag::Precipitation);
                }
            }

            evaluations.push(HourEvaluation {
                point,
                blockers,
                forecast_gap,
            });
            previous = Some(point);
        }

        evaluations
    }
}
