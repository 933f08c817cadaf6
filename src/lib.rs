//! buddy-games-rs library crate
//!
//! This module exposes internal types for integration testing.
//! The main binary is in main.rs.

#[macro_use]
extern crate log;

pub mod audio;
pub mod character;
pub mod config;
pub mod constants;
pub mod content;
pub mod controller;
pub mod event;
pub mod feedback;
pub mod generate;
pub mod message;
pub mod playback;
pub mod round;
pub mod shell;
pub mod sink;
pub mod speech;
pub mod terminal;

#[cfg(test)]
mod round_tests;
