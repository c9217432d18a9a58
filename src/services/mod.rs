pub mod notifications;
pub mod program;
pub mod reminder;
