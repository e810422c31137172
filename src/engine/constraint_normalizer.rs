// ==========================================
// Roofline Engine - Constraint Normalizer
// ==========================================
// Reduces all per-material install constraints on a job into one
// strictest-wins policy. Pure logic: no state, no side effects,
// no I/O.
// ==========================================

use crate::domain::forecast::{MaterialConstraint, NormalizedConstraints};

// ==========================================
// ConstraintNormalizer - pure rule struct
// ==========================================
pub struct ConstraintNormalizer;

impl ConstraintNormalizer {
    /// Aggregate per-material constraints into a single policy.
    ///
    /// # Rules
    /// 1. minimum temperature = max of all non-null per-material
    ///    minimums (strictest floor wins)
    /// 2. requires rising = true if ANY material requires it
    /// 3. minimum continuous window = max of per-material minimums;
    ///    if every material specifies zero, the configured default
    ///    applies
    /// 4. maximum wind = min of all non-null per-material maximums
    ///    (strictest ceiling wins)
    /// 5. maximum precipitation probability = min of all non-null
    ///    per-material maximums
    ///
    /// No constraints present produces the permissive policy.
    pub fn normalize(
        constraints: &[MaterialConstraint],
        default_min_window_minutes: i64,
    ) -> NormalizedConstraints {
        let mut policy = NormalizedConstraints::permissive(default_min_window_minutes);
        let mut max_window = 0i64;

        for constraint in constraints {
            if let Some(floor) = constraint.min_temp_f {
                policy.min_temp_f = Some(match policy.min_temp_f {
                    Some(current) => current.max(floor),
                    None => floor,
                });
            }

            policy.requires_rising_temp |= constraint.requires_rising_temp;

            max_window = max_window.max(constraint.min_window_minutes);

            if let Some(ceiling) = constraint.max_wind_mph {
                policy.max_wind_mph = Some(match policy.max_wind_mph {
                    Some(current) => current.min(ceiling),
                    None => ceiling,
                });
            }

            if let Some(ceiling) = constraint.max_precip_prob {
                policy.max_precip_prob = Some(match policy.max_precip_prob {
                    Some(current) => current.min(ceiling),
                    None => ceiling,
                });
            }
        }

        if max_window > 0 {
            policy.min_window_minutes = max_window;
        }

        policy
    }
}
