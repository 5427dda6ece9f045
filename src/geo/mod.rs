pub mod branches;
pub mod geocode;
pub mod handlers;
pub mod models;
pub mod pickup;
pub mod places;
pub mod postal;
pub mod routes;
