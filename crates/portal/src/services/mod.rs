//! Third-party service integrations.

pub mod emailjs;

pub use emailjs::{
    CONTACT_SUBJECTS, ContactEmail, DEFAULT_CONTACT_SUBJECT, EmailJsClient, EmailJsError,
};
