mod debounced;

pub use debounced::DebouncedTourPersistence;
