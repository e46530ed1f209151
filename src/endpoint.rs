use std::sync::Arc;

use tracing::{info, warn};

use crate::{Dispatcher, KvsEngine, Result};

/// The remote-call contract: run one textual command and return its textual result.
///
/// Implementors are registered with a [`KvsServer`](crate::KvsServer) under a service name.
/// An `Err` is reported to the remote caller as a failed call, never as a result string.
pub trait CommandHandler: Send + Sync + 'static {
    /// handles `command` with its positional `args`
    fn handle_command(&self, command: &str, args: &[String]) -> Result<String>;
}

/// The server-side object that receives calls from the transport and forwards them to a
/// [`Dispatcher`]. It holds no state of its own and performs no validation; the command
/// interpreter running inside the dispatcher does that.
pub struct RemoteEndpoint<E: KvsEngine> {
    dispatcher: Arc<Dispatcher<E>>,
}

impl<E: KvsEngine> RemoteEndpoint<E> {
    /// creates an endpoint that submits every call to `dispatcher`
    pub fn new(dispatcher: Arc<Dispatcher<E>>) -> Self {
        RemoteEndpoint { dispatcher }
    }

    /// the dispatcher this endpoint forwards to
    pub fn dispatcher(&self) -> &Arc<Dispatcher<E>> {
        &self.dispatcher
    }
}

impl<E: KvsEngine> CommandHandler for RemoteEndpoint<E> {
    fn handle_command(&self, command: &str, args: &[String]) -> Result<String> {
        info!("Received command: {} {}", command, args.join(" "));

        let result = self
            .dispatcher
            .submit(command, args.to_vec())
            .and_then(|pending| pending.wait());

        match &result {
            Ok(text) => info!("Response: {}", text),
            Err(e) => warn!("Command failed: {}", e),
        }
        result
    }
}
