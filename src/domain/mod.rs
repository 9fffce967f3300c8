// ============================================================================
// Domain Layer - Business Logic
// ============================================================================
//
// - order: the sales-order aggregate, its totals and lifecycle manager
// - delivery: the delivery fee quote offered before an order is placed
//
// Nothing in here knows about HTTP or SQL.
//
// ============================================================================

pub mod order;
pub mod delivery;
