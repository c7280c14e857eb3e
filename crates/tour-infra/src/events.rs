use async_trait::async_trait;
use tracing::info;
use tour_core::ports::TourEventPort;
use tour_core::TourState;

/// Event port that records state changes in the log; used when no UI listens.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingTourEventPort;

#[async_trait]
impl TourEventPort for TracingTourEventPort {
    async fn emit_tour_state_changed(&self, state: TourState) {
        info!(
            tour_id = ?state.current_tour_id,
            active = state.is_active,
            step = state.current_step,
            total_steps = state.total_steps,
            navigating = state.is_navigating,
            completed_tours = state.completed_tours.len(),
            "tour state changed"
        );
    }
}
