//! Remote availability tracking.

mod availability_prober;

pub use availability_prober::*;
