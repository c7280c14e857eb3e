use std::collections::BTreeMap;

use crate::ids::TourId;
use crate::tour::error::TourError;
use crate::tour::step::TourStep;

/// Ordered step lists per named tour.
///
/// The registry is owned by the caller; the engine only ever receives a step
/// list at start time.
#[derive(Debug, Clone, Default)]
pub struct TourRegistry {
    tours: BTreeMap<TourId, Vec<TourStep>>,
}

impl TourRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a tour, returning the steps it replaced if the id was taken.
    pub fn register(
        &mut self,
        tour_id: impl Into<TourId>,
        steps: Vec<TourStep>,
    ) -> Option<Vec<TourStep>> {
        self.tours.insert(tour_id.into(), steps)
    }

    pub fn get(&self, tour_id: &TourId) -> Option<&[TourStep]> {
        self.tours.get(tour_id).map(Vec::as_slice)
    }

    /// Mutable access, used to attach predicates and hooks to file-defined tours.
    pub fn get_mut(&mut self, tour_id: &TourId) -> Option<&mut Vec<TourStep>> {
        self.tours.get_mut(tour_id)
    }

    /// Cloned step list for handing to the engine.
    pub fn steps(&self, tour_id: &TourId) -> Result<Vec<TourStep>, TourError> {
        self.get(tour_id)
            .map(<[TourStep]>::to_vec)
            .ok_or_else(|| TourError::UnknownTour(tour_id.clone()))
    }

    pub fn tour_ids(&self) -> impl Iterator<Item = &TourId> {
        self.tours.keys()
    }

    pub fn len(&self) -> usize {
        self.tours.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tours.is_empty()
    }
}
