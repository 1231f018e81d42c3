pub mod auth;
pub mod console;
pub mod log;
pub mod routes;
pub mod status;
