mod simulated_router;

pub use simulated_router::SimulatedRouter;
