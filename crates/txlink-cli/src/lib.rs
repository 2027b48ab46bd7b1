//! Command-line front end for the txlink pipeline.
//!
//! `txlink inspect` decodes a link and shows the plan it carries,
//! `txlink run` executes it against the configured signer or a simulated
//! wallet, and `txlink chains` lists the networks links may target.

pub mod cli;
pub mod commands;
