mod health_check;
mod subscribers;
mod subscriptions;

pub use health_check::*;
pub use subscribers::*;
pub use subscriptions::*;
