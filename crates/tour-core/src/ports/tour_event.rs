use crate::tour::TourState;

#[async_trait::async_trait]
pub trait TourEventPort: Send + Sync {
    async fn emit_tour_state_changed(&self, state: TourState);
}
