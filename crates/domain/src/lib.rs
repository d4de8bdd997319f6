//! Domain layer for the ticket survey mailer.
//!
//! This crate contains:
//! - Value objects and domain models (tickets, users, send records, configuration)
//! - The CSV processing and email dispatch services
//! - Domain events and the in-process event dispatcher
//! - The error taxonomy with user-facing messages

pub mod errors;
pub mod events;
pub mod models;
pub mod services;

#[cfg(test)]
pub(crate) mod testing;
