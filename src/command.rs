use serde::{Deserialize, Serialize};

/// These are the requests a client can send to a [`KvsServer`](crate::KvsServer)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Request {
    /// checks that a handler is bound under `name`
    Lookup {
        /// the service name to resolve
        name: String,
    },
    /// invokes the handler bound under `name`
    Call {
        /// the service name of the handler
        name: String,
        /// the command name, e.g. `PUT`
        command: String,
        /// the command's positional arguments
        args: Vec<String>,
    },
}

/// The Response types that can be returned for any Request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Response {
    /// this variant is returned when a request was successful. A `Lookup` carries no payload,
    /// a `Call` carries the command's result text
    Ok(Option<String>),
    /// this variant is returned if the request could not be served
    Err(String),
}
