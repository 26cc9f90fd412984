#![deny(unused_variables)]
#![deny(dead_code)]
#![deny(unused_imports)]
#![deny(clippy::no_effect_underscore_binding)]
pub mod features;
pub mod heuristic;
pub mod pipeline;
pub mod types;

#[path = "../classify/mod.rs"]
pub mod classify;

#[path = "../render/mod.rs"]
pub mod render;

#[path = "../shared/config.rs"]
pub mod config;
