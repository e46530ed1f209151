//! Translates a `(name, args)` pair into exactly one storage primitive and a result string.
//!
//! Nothing in here fails: malformed arguments and unknown command names become descriptive
//! result text, and the engine is only touched once a command has been validated.

use std::fmt;

use crate::KvsEngine;

/// result text of a successful `PUT` or `DELETE`
pub const OK_MESSAGE: &str = "Operation successful.";
/// result text of a `GET` on a key that is not in the store
pub const NOT_FOUND_MESSAGE: &str = "No record found.";
/// result text for any command name other than `PUT`, `GET` or `DELETE`
pub const INVALID_COMMAND_MESSAGE: &str = "Invalid Command.";

const PUT_USAGE: &str = "Sample Usage: PUT <key> <value>";
const GET_USAGE: &str = "Sample Usage: GET <key>";
const DELETE_USAGE: &str = "Sample Usage: DELETE <key>";

/// A validated command, ready to run against a [`KvsEngine`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// insert or overwrite `key`
    Put {
        /// the key to set
        key: String,
        /// the value to set
        value: String,
    },
    /// read the value of `key`
    Get {
        /// the key to search for
        key: String,
    },
    /// remove `key` if present
    Delete {
        /// the key to remove
        key: String,
    },
}

/// Why a `(name, args)` pair did not produce a [`Command`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// known command, but too few arguments; holds the usage text
    Usage(&'static str),
    /// the command name is not one of `PUT`, `GET` or `DELETE`
    Invalid,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::Usage(usage) => f.write_str(usage),
            Rejection::Invalid => f.write_str(INVALID_COMMAND_MESSAGE),
        }
    }
}

impl Command {
    /// validates `name` and `args`. Names are matched case-sensitively and arguments beyond
    /// the ones a command needs are ignored.
    pub fn parse(name: &str, args: &[String]) -> Result<Command, Rejection> {
        match name {
            "PUT" => match args {
                [key, value, ..] => Ok(Command::Put {
                    key: key.clone(),
                    value: value.clone(),
                }),
                _ => Err(Rejection::Usage(PUT_USAGE)),
            },
            "GET" => match args.first() {
                Some(key) => Ok(Command::Get { key: key.clone() }),
                None => Err(Rejection::Usage(GET_USAGE)),
            },
            "DELETE" => match args.first() {
                Some(key) => Ok(Command::Delete { key: key.clone() }),
                None => Err(Rejection::Usage(DELETE_USAGE)),
            },
            _ => Err(Rejection::Invalid),
        }
    }

    /// applies this command to `engine` and returns the result text
    pub fn apply<E: KvsEngine + ?Sized>(self, engine: &mut E) -> String {
        match self {
            Command::Put { key, value } => {
                engine.put(key, value);
                OK_MESSAGE.to_owned()
            }
            Command::Get { key } => engine
                .get(&key)
                .unwrap_or_else(|| NOT_FOUND_MESSAGE.to_owned()),
            Command::Delete { key } => {
                engine.delete(&key);
                OK_MESSAGE.to_owned()
            }
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Put { key, value } => write!(f, "PUT {} {}", key, value),
            Command::Get { key } => write!(f, "GET {}", key),
            Command::Delete { key } => write!(f, "DELETE {}", key),
        }
    }
}

/// parses and runs one command against `engine`, always producing a result string
pub fn execute<E: KvsEngine + ?Sized>(engine: &mut E, name: &str, args: &[String]) -> String {
    match Command::parse(name, args) {
        Ok(cmd) => cmd.apply(engine),
        Err(rejection) => rejection.to_string(),
    }
}
