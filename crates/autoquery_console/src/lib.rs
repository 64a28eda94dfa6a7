//! Line-oriented console front-end for the AutoQuery chat core.
//!
//! ## Transport bootstrap
//!
//! `autoquery_console` selects its transport at startup:
//!
//! - `AUTOQUERY_TRANSPORT=mock` (the default) answers locally with canned
//!   vehicle-data replies and needs no backend
//! - `AUTOQUERY_TRANSPORT=http` talks to a running AutoQuery backend
//!
//! When `AUTOQUERY_TRANSPORT=http`, the endpoint is configured through:
//!
//! - `AUTOQUERY_CHAT_URL`: base URL of the backend
//!   (default `http://localhost:5000`)
//! - `AUTOQUERY_HTTP_TIMEOUT_SECS`: optional whole-request timeout, > 0
//! - `AUTOQUERY_SEND_HISTORY`: `1`/`true` to forward prior turns with each
//!   message, for backends that do not keep their own session state
//!
//! ## Console contract
//!
//! The prompt loop reads one message per line. `/help`, `/trace`, and
//! `/quit` (or a plain `exit`) are handled locally; anything else is sent to
//! the agent, and the loop blocks until the exchange settles. Tool traces are
//! hidden by default; `/trace` toggles them.

pub mod commands;
pub mod render;
pub mod transports;
