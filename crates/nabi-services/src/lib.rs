//! nabi-services: external collaborator contracts for the Nabi assistant
//!
//! Gmail and Calendar are exposed as narrow async traits (the OAuth/REST
//! plumbing lives with the implementor); web search and weather are thin HTTP
//! clients.

pub mod calendar;
pub mod error;
pub mod mail;
pub mod search;
pub mod weather;

pub use calendar::{
    CalendarService, CreatedEvent, EventDraft, EventStart, EventSummary, format_event,
};
pub use error::{Error, Result};
pub use mail::{
    EmailDraft, EmailSummary, LabelAction, MailService, SentEmail, format_email, split_recipients,
};
pub use search::SearchClient;
pub use weather::{WeatherClient, WeatherReport};
