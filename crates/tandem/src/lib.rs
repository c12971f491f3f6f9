//! Command-line surface of tandem.
//!
//! `cli` holds the clap command tree and argument plumbing; `commands` holds
//! one module per command family, each driving `tandem_core`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod cli;
pub mod commands;
