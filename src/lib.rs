//! Light Cycle Server Library
//!
//! A real-time multiplayer light cycle game served over raw TCP.
//! Players steer a cycle around a shared arena, leaving a trail behind
//! them; touching any trail resets the run. Everything a client needs
//! is a terminal that speaks ANSI escape codes.

pub mod config;
pub mod game;
pub mod metrics;
pub mod net;
