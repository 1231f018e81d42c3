pub mod api;
pub mod error;
pub mod protocol;
pub mod unauthorized;

pub use api::ApiClient;
pub use error::ApiError;
pub use protocol::Motor;
pub use unauthorized::{CountUnauthorized, ForcedRedirect, UnauthorizedHandler};
