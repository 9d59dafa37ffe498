pub mod envelope;
pub mod index;
pub mod server;
pub mod users;
