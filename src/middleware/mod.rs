mod error_handler;
mod guard;

pub use error_handler::log_errors;
pub use guard::route_guard;
