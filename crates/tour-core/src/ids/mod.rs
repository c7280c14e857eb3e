//! Identifier newtypes.

mod id_macro;

use id_macro::impl_id;
use serde::{Deserialize, Serialize};

/// Name of a tour, chosen by the caller (e.g. `"welcome"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TourId(String);

/// Opaque routing location understood by the host application (e.g. `"/dashboard"`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Location(String);

impl_id!(TourId, Location);
