// Public API for integration tests and the server binary

pub mod api;
pub mod config;
pub mod hub;
pub mod routes;
pub mod state;
pub mod types;
pub mod ws;

#[cfg(test)]
pub mod test_utils;
