// ============================================================================
// Order Domain - Business Logic for the Sales Order Aggregate
// ============================================================================
//
// - Value objects (LineItem, OrderStatus, Customer, Payment, Totals, ...)
// - Totals calculator (pure)
// - Commands (CreateOrder, UpdateOrder)
// - Boundary validation
// - Errors (OrderError enum)
// - Aggregate (Order, NewOrder, StatusPolicy)
// - Command Handler (OrderCommandHandler, the lifecycle manager)
//
// ============================================================================

pub mod value_objects;
pub mod totals;
pub mod commands;
pub mod validation;
pub mod errors;
pub mod aggregate;
pub mod command_handler;

#[cfg(test)]
pub(crate) mod test_fixtures;

// Re-export for convenience
pub use value_objects::*;
pub use totals::{compute_totals, round_money};
pub use commands::*;
pub use validation::Validate;
pub use errors::*;
pub use aggregate::*;
pub use command_handler::*;
