pub mod mailer;
pub mod transport;

pub use mailer::EmailService;
pub use transport::{HttpMailRelay, MailTransport};
