//! Expense domain: models, repository contracts, and the routing service.

mod expenses_model;
mod expenses_service;
mod expenses_summary;
mod expenses_traits;

pub use expenses_model::*;
pub use expenses_service::*;
pub use expenses_summary::*;
pub use expenses_traits::*;
