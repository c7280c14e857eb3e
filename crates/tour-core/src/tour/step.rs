use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::ids::Location;

/// Predicate evaluated when a step is reached; `true` means skip it.
pub type StepPredicate = Arc<dyn Fn() -> bool + Send + Sync>;

/// Side-effecting hook invoked at a step boundary.
pub type StepHook = Arc<dyn Fn() + Send + Sync>;

/// Where the rendering layer should place the step tooltip relative to its anchor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    Top,
    #[default]
    Bottom,
    Left,
    Right,
    Center,
}

/// One unit of guidance, supplied by the caller and never mutated by the engine.
///
/// `target` and `fallback_target` are opaque to the engine; they are consumed by the
/// rendering layer. `navigate_to`, `skip_condition` and the hooks drive the engine.
#[derive(Clone, Default)]
pub struct TourStep {
    pub target: String,
    pub title: String,
    pub content: String,
    pub placement: Placement,
    pub navigate_to: Option<Location>,
    pub fallback_target: Option<String>,
    pub skip_condition: Option<StepPredicate>,
    pub on_before_step: Option<StepHook>,
    pub on_after_step: Option<StepHook>,
}

impl TourStep {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    pub fn navigate_to(mut self, location: impl Into<Location>) -> Self {
        self.navigate_to = Some(location.into());
        self
    }

    pub fn with_fallback_target(mut self, target: impl Into<String>) -> Self {
        self.fallback_target = Some(target.into());
        self
    }

    pub fn skip_when<F>(mut self, predicate: F) -> Self
    where
        F: Fn() -> bool + Send + Sync + 'static,
    {
        self.skip_condition = Some(Arc::new(predicate));
        self
    }

    pub fn on_before<F>(mut self, hook: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_before_step = Some(Arc::new(hook));
        self
    }

    pub fn on_after<F>(mut self, hook: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_after_step = Some(Arc::new(hook));
        self
    }

    /// Evaluates the skip condition; steps without one are always displayable.
    pub fn should_skip(&self) -> bool {
        self.skip_condition
            .as_ref()
            .map(|predicate| predicate())
            .unwrap_or(false)
    }

    pub fn run_before_hook(&self) {
        if let Some(hook) = &self.on_before_step {
            hook();
        }
    }

    pub fn run_after_hook(&self) {
        if let Some(hook) = &self.on_after_step {
            hook();
        }
    }
}

impl fmt::Debug for TourStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TourStep")
            .field("target", &self.target)
            .field("title", &self.title)
            .field("placement", &self.placement)
            .field("navigate_to", &self.navigate_to)
            .field("fallback_target", &self.fallback_target)
            .field("has_skip_condition", &self.skip_condition.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn step_without_condition_is_displayable() {
        let step = TourStep::new("#a");
        assert!(!step.should_skip());
        assert_eq!(step.placement, Placement::Bottom);
    }

    #[test]
    fn step_hooks_run_when_present() {
        let calls = Arc::new(AtomicUsize::new(0));
        let before = calls.clone();
        let after = calls.clone();
        let step = TourStep::new("#a")
            .on_before(move || {
                before.fetch_add(1, Ordering::SeqCst);
            })
            .on_after(move || {
                after.fetch_add(10, Ordering::SeqCst);
            });

        step.run_before_hook();
        step.run_after_hook();
        TourStep::new("#b").run_before_hook();

        assert_eq!(calls.load(Ordering::SeqCst), 11);
    }

    #[test]
    fn debug_output_omits_closures() {
        let step = TourStep::new("#a").skip_when(|| true).navigate_to("/p2");
        let rendered = format!("{step:?}");
        assert!(rendered.contains("has_skip_condition: true"));
        assert!(rendered.contains("/p2"));
    }
}
