//! Use cases: one per orchestration phase, plus the driver

pub mod aggregate_results;
pub mod analyze_results;
pub mod execute_plan;
pub mod generate_plan;
pub mod route_request;
pub mod validate_request;

pub(crate) mod shared;

#[cfg(test)]
pub(crate) mod test_support;
