//! newscheck: a static asset server for the fake-news detection UI, and a
//! client controller that drives the external classification API.

pub mod api;
pub mod cli;
pub mod config;
pub mod controller;
pub mod logging;
pub mod server;
