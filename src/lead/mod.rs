pub mod handlers;
pub mod models;
pub mod relay;
pub mod routes;
