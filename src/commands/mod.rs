// src/commands/mod.rs
//! Command handlers for the kitchen CLI

mod cook;

pub use cook::{cmd_cook, cmd_fetch, cmd_test, cmd_validate, CookOptions};
