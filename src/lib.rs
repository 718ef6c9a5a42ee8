//! # Connect Four
//!
//! A turn-based Connect Four game service. Players register, start games
//! against each other and take turns dropping tokens into a 7x6 board; the
//! service validates moves, detects wins and draws, keeps a per-game move
//! history and derives player rankings from finished games.
//!
//! ## Modules
//!
//! - [`game`] — Core game logic: board, win detection, history, state machine
//! - [`ranking`] — Win/loss/draw rankings over completed games
//! - [`store`] — Persistence port with in-memory and JSON-file adapters
//! - [`service`] — Operations that tie the game rules to a store
//! - [`config`] — TOML configuration loading and validation
//! - [`error`] — Structured error types

pub mod config;
pub mod error;
pub mod game;
pub mod ranking;
pub mod service;
pub mod store;
