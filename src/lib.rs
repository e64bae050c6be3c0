//! # Trackback
//!
//! Recovers the titles of deleted or private YouTube videos from Wayback
//! Machine snapshots. When a video is gone from YouTube, a historical copy
//! of its watch page may still carry the title it had before it disappeared.
//!
//! ## Pipeline
//!
//! ```text
//! ┌───────────┐   ┌──────────────┐   ┌───────────────┐
//! │ CDX index │──▶│ ranked       │──▶│ per candidate: │
//! │ query     │   │ snapshots    │   │ fetch + extract│──▶ first title wins
//! └───────────┘   │ newest-first │   └───────────────┘
//!                 └──────────────┘
//! ```
//!
//! The entry point is [`resolve::resolve`], which returns a
//! [`models::Resolution`]: `Found` (title, extraction rule, snapshot),
//! `NotFound`, or `Failed` (the index query itself could not complete).
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`fetch`] | Resilient HTTP fetching with retry/backoff |
//! | [`cdx`] | CDX index query builder and response parser |
//! | [`extract`] | Ordered title-extraction rules |
//! | [`resolve`] | Resolution orchestrator |

pub mod cdx;
pub mod config;
pub mod extract;
pub mod fetch;
pub mod models;
pub mod resolve;
