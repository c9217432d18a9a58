pub mod donation;
pub mod event;
pub mod notification;
pub mod participant;
pub mod question;
pub mod speaker;
pub mod speech;
pub mod subscription;

pub use donation::*;
pub use event::*;
pub use notification::*;
pub use participant::*;
pub use question::*;
pub use speaker::*;
pub use speech::*;
pub use subscription::*;
