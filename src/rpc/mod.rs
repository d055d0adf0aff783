//! Remote control of the reload queue.
//!
//! A small HTTP/JSON service on the loopback interface that a separate
//! `configwatchd flush` / `configwatchd list` invocation talks to.
//!
//! | Route         | Request          | Response              |
//! |---------------|------------------|-----------------------|
//! | `POST /flush` | [`FlushOpts`]    | [`FlushResponse`]     |
//! | `GET /list`   | -                | [`ListResponse`]      |
//!
//! Both routes answer `409` with an [`ErrorResponse`] when the server runs
//! without queue mode.

mod client;
mod error;
mod server;
mod types;

pub use client::QueueClient;
pub use error::RpcError;
pub use server::{FLUSH_PATH, LIST_PATH, QueueService, serve};
pub use types::{ErrorResponse, FlushOpts, FlushResponse, ListResponse};
