//! Mail transports, cookies and event subscribers.

pub mod cookies;
pub mod event_subscribers;
pub mod mailer;

pub use event_subscribers::default_dispatcher;
pub use mailer::build_transport;
