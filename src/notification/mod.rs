pub mod email;
pub mod handlers;
pub mod models;
pub mod notifier;
pub mod routes;
pub mod templates;
pub mod whatsapp;

pub use models::ChannelStatus;
pub use notifier::Notifier;
