//! Core types and trait definitions for the membership portal's event
//! calendar.
//!
//! Everything that decides which events a viewer sees, and how those events
//! are classified, searched and grouped by day, lives here. This crate is
//! free of HTTP and database dependencies; storage backends implement
//! [`store::EventStore`] and [`role::AdminDirectory`], and view code drives
//! the [`calendar`] pipeline.

// Trait futures declare their `Send` bounds explicitly in the signatures.
#![allow(async_fn_in_trait)]

pub mod admin;
pub mod calendar;
pub mod clock;
pub mod error;
pub mod event;
pub mod feed;
pub mod grouping;
pub mod normalize;
pub mod publication;
pub mod role;
pub mod search;
pub mod store;
pub mod temporal;
pub mod visibility;

pub use error::{Error, Result};

#[cfg(test)]
mod fixtures;
