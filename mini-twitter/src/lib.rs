//! A tiny message-posting service.
//!
//! Clients post short text messages to one shared, in-memory log and read
//! back the most recent N of them. The log lives only as long as the server
//! process and grows without bound.
//!
//! - [`store`] holds the log behind a mutex.
//! - [`service`] turns the two calls (send, get recent) into store
//!   operations and defines the [`service::MessageApi`] trait shared by the
//!   server-side handler and the network client.
//! - [`message`] defines the JSON line protocol plus helpers for async reads
//!   and writes.
//! - [`server`] accepts TCP connections and runs calls on a bounded pool of
//!   workers.
//! - [`client`] is the network stub and the entry point of the interactive
//!   client.
//! - [`console`] parses `SEND`/`GET`/`EXIT` commands and prints results.
//! - [`cli`] parses the command-line interface for server and client modes.

pub mod cli;
pub mod client;
pub mod console;
pub mod message;
pub mod server;
pub mod service;
pub mod store;
