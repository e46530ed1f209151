#![deny(missing_docs)]
//! A remote, in-memory key-value store (rkvs) that maps [`String`] keys to [`String`] values.
//!
//! A client sends textual commands to a server over a simple remote-call channel. The server
//! runs each command on a bounded pool of worker threads against a single shared store, and
//! returns a textual result.
//!
//! ## Supported Commands
//! - `PUT <key> <value>` inserts or overwrites a key, returning `Operation successful.`
//! - `GET <key>` returns the value, or `No record found.`
//! - `DELETE <key>` removes the key if present, returning `Operation successful.`
//!
//! Anything else returns `Invalid Command.`, and too few arguments return a usage string.
//! None of these are errors: a call only fails when the server could not run the command.
//!
//! ## Dispatcher
//! [`Dispatcher`] is the brains of this entire operation. It is responsible for:
//! - owning the [`KvsEngine`] and guarding every access to it with one lock
//! - running commands on a fixed pool of worker threads fed by a bounded queue
//! - rejecting work with [`KvsError::Busy`] when the queue is full
//! - bounding how long a caller waits with a per-call deadline
//! - draining in-flight work on shutdown while rejecting work that has not started
//!
//! ## Client / Server
//! [`KvsServer`] exposes [`CommandHandler`]s under well-known names; [`RemoteEndpoint`] is the
//! handler that forwards calls to a [`Dispatcher`]. [`KvsClient`] resolves a name and then
//! invokes the handler. On the wire a [`Request`] and its [`Response`] are JSON values sent
//! back to back over a `TcpStream`.
//!
//! ### Client / Server executables
//! The `rkvs-server` and `rkvs-client` binaries wrap these types with command line parsing
//! and logging.
//!
//! [`String`]: https://doc.rust-lang.org/std/string/struct.String.html

pub use client::{parse_line, KvsClient, PREPOPULATE_SCRIPT};
pub use command::{Request, Response};
pub use config::DispatcherConfig;
pub use dispatcher::{Dispatcher, PendingResult};
pub use endpoint::{CommandHandler, RemoteEndpoint};
pub use engine::{KvsEngine, MemStore};
pub use error::{KvsError, Result};
pub use server::{KvsServer, ShutdownHandle, DEFAULT_SERVICE_NAME};

mod client;
mod command;
pub mod config;
mod dispatcher;
mod endpoint;
mod engine;
mod error;
pub mod interpreter;
mod server;
