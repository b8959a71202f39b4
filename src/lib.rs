//! Studiolo is a terminal-first chat studio: a role-conditioned chatbot
//! with an image-generation side channel, speaking OpenAI-style APIs.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns runtime state: configuration, the role registry, the
//!   session (history, active role, image gate), and the action layer the
//!   interaction loop dispatches into.
//! - [`provider`] normalizes the two remote API generations behind one
//!   adapter trait, selected once at startup by a capability probe.
//! - [`ui`] renders the terminal interface and runs the event loop.
//! - [`commands`] implements slash-command parsing used by the chat loop.
//! - [`api`] defines the chat/image wire payloads shared by the adapters.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`].

pub mod api;
pub mod auth;
pub mod cli;
pub mod commands;
pub mod core;
pub mod provider;
pub mod ui;
pub mod utils;
