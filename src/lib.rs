//! pinreq - pinned requirements manifest library
//!
//! This library provides the core functionality for working with a
//! `requirements.txt` made of exact `name==version` pins:
//! - Lossless parsing, validation, formatting and editing
//! - Resolution against a PyPI-compatible index
//! - Upgrades to the newest eligible releases
//! - Provisioning with pip or uv

pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod installer;
pub mod logging;
pub mod manifest;
pub mod orchestrator;
pub mod output;
pub mod progress;
pub mod registry;
pub mod resolve;
pub mod update;
