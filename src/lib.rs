//! Sales-order service: the order aggregate and its totals engine, a
//! repository over Postgres or memory, and an actix-web API on top.

pub mod api;
pub mod config;
pub mod domain;
pub mod metrics;
pub mod store;
pub mod utils;
