//! Pachorman: a headless maze-chase simulation core.

pub mod app;
pub mod config;
pub mod constants;
pub mod error;
pub mod formatter;
pub mod game;
pub mod map;
pub mod systems;
