//! comicboard — text-to-comic website with a simulated four-panel generator.
//!
//! ARCHITECTURE
//! ============
//! `comic` holds the generation pipeline (panels, board, simulator, view).
//! `routes` exposes it over a websocket session and serves the static site.
//! `config` and `state` wire both together at startup; `frame` is the
//! message envelope shared by the session and the page.

pub mod comic;
pub mod config;
pub mod frame;
pub mod routes;
pub mod state;
