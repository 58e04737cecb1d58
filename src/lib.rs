//! Topic Flow - schema-driven intake conversations.
//!
//! This crate walks a user through an ordered set of topics, collecting
//! structured fields through free-form dialogue with a language model,
//! skipping topics whose visibility rules do not hold, and finishing once
//! every visible topic is answered.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
