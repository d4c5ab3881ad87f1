//! coinfolio: crypto portfolio evaluation, forecasting data prep and a
//! rule-based robo-advisor.
//!
//! Hexagonal architecture: domain logic in [`domain`], port traits in [`ports`],
//! concrete implementations in [`adapters`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;
