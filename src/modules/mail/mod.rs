//! Outgoing mail: SMTP transport plus the HTML templates it renders.

mod mailer;
mod templates;

pub use mailer::{MailAttachment, Mailer};
