// ==========================================
// Roofline Engine - Plan Orchestrator
// ==========================================
// Drives one full planning run for a job: estimate rebuild, forecast
// fetch, constraint normalization, hour evaluation, window building,
// flag generation, schedule planning and persistence. Collaborators
// are injected at construction; independent reads fan out and join
// before aggregation.
// ==========================================

use crate::config::EngineConfig;
use crate::domain::estimate::{Estimate, EstimateFlag, EstimateItem};
use crate::domain::installability::{InstallabilityResult, SchedulePlan};
use crate::engine::collaborators::PlanStores;
use crate::engine::constraint_normalizer::ConstraintNormalizer;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::estimate_builder::EstimateBuilder;
use crate::engine::flag_generator::FlagGenerator;
use crate::engine::hour_evaluator::HourEvaluator;
use crate::engine::schedule_planner::SchedulePlanner;
use crate::engine::window_builder::WindowBuilder;
use crate::weather::{ForecastRange, SiteLocation, WeatherProvider};
use std::sync::Arc;
use tracing::info;

/// Everything one planning run produces, already persisted.
#[derive(Debug, Clone)]
pub struct JobPlanResult {
    pub estimate: Estimate,
    pub estimate_items: Vec<EstimateItem>,
    pub estimate_flags: Vec<EstimateFlag>,
    pub installability: InstallabilityResult,
    pub schedule_plan: SchedulePlan,
}

// ==========================================
// PlanOrchestrator
// ==========================================
pub struct PlanOrchestrator {
    config: EngineConfig,
    stores: PlanStores,
    weather: Arc<dyn WeatherProvider>,
}

impl PlanOrchestrator {
    pub fn new(
        config: EngineConfig,
        stores: PlanStores,
        weather: Arc<dyn WeatherProvider>,
    ) -> Self {
        Self {
            config,
            stores,
            weather,
        }
    }

    /// Run the full pipeline for one job.
    ///
    /// Installability windows are persisted before planning starts:
    /// a job with no feasible start date still leaves its windows and
    /// flags queryable.
    pub async fn plan_job(
        &self,
        tenant_id: &str,
        job_id: &str,
        site: &SiteLocation,
        range: &ForecastRange,
    ) -> EngineResult<JobPlanResult> {
        info!(tenant_id, job_id, "========== planning run started ==========");

        // ---------- step 1: estimate ----------
        info!("========== step 1: rebuild estimate ==========");
        let builder = EstimateBuilder::new(
            self.config.clone(),
            self.stores.takeoffs.clone(),
            self.stores.catalog.clone(),
            self.stores.estimates.clone(),
        );
        let estimate = builder.build(tenant_id, job_id).await?;

        // ---------- step 2: constraints + forecast ----------
        info!("========== step 2: fetch constraints and forecast ==========");
        let constraints_fut = async {
            self.stores
                .catalog
                .constraints_by_material_ids(&estimate.material_ids)
                .await
                .map_err(EngineError::from)
        };
        let forecast_fut = async {
            self.weather
                .fetch_hourly(tenant_id, site, range)
                .await
                .map_err(EngineError::from)
        };
        let (constraints, points) = tokio::try_join!(constraints_fut, forecast_fut)?;
        info!(
            constraints = constraints.len(),
            forecast_hours = points.len(),
            "inputs resolved"
        );

        // ---------- step 3: installability ----------
        info!("========== step 3: evaluate installability ==========");
        let policy =
            ConstraintNormalizer::normalize(&constraints, self.config.default_min_window_minutes);
        let evaluations = HourEvaluator::new(&self.config).evaluate(points, &policy);

        // Lookback hours exist for rising-trend context only; they
        // contribute no windows of their own.
        let in_range: Vec<_> = evaluations
            .into_iter()
            .filter(|e| e.point.ts >= range.start && e.point.ts <= range.end)
            .collect();

        let days = WindowBuilder::new(&self.config).build(&in_range, &policy);
        let installability = FlagGenerator::assemble(&policy, &in_range, days);
        info!(
            days = installability.windows.len(),
            feasible_days = installability.total_feasible_days,
            flags = ?installability.flagged,
            "installability evaluated"
        );

        self.stores
            .installability
            .replace_windows(tenant_id, job_id, &installability.windows)
            .await?;

        // ---------- step 4: schedule plan ----------
        info!("========== step 4: schedule plan ==========");
        let plan = SchedulePlanner::new(&self.config).plan(
            job_id,
            estimate.estimate.total_labor_hours,
            &installability,
        )?;
        self.stores
            .installability
            .upsert_schedule_plan(tenant_id, &plan)
            .await?;

        info!(
            tenant_id,
            job_id,
            total = estimate.estimate.total,
            confidence = plan.confidence,
            "========== planning run finished =========="
        );

        Ok(JobPlanResult {
            estimate: estimate.estimate,
            estimate_items: estimate.items,
            estimate_flags: estimate.flags,
            installability,
            schedule_plan: plan,
        })
    }
}
