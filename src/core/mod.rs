pub mod arrival;
pub mod builder;
pub mod config;
pub mod entity;
pub mod errors;
pub mod event;
pub mod event_scheduler;
pub mod execution;
pub mod random;
pub mod resource_group;
pub mod routing;
pub mod simulation_engine;
pub mod statistics;
pub mod trace;
pub mod types;

#[cfg(test)]
mod tests;
