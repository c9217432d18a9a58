pub mod commands;
pub mod handlers;
pub mod keyboards;
pub mod state;

/// Error type shared by every dispatcher endpoint.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;
pub type HandlerResult = Result<(), HandlerError>;
