use std::io::{BufReader, BufWriter, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use serde::Deserialize;
use serde_json::de::IoRead;
use serde_json::Deserializer;
use tracing::debug;

use crate::command::{Request, Response};
use crate::{KvsError, Result};

/// commands a client can send right after connecting, to give the store some data:
/// five `PUT`s, then a `GET` and a `DELETE` for each key
pub const PREPOPULATE_SCRIPT: &[&str] = &[
    "PUT key1 value1",
    "PUT key2 value2",
    "PUT key3 value3",
    "PUT key4 value4",
    "PUT key5 value5",
    "GET key1",
    "GET key2",
    "GET key3",
    "GET key4",
    "GET key5",
    "DELETE key1",
    "DELETE key2",
    "DELETE key3",
    "DELETE key4",
    "DELETE key5",
];

/// splits a line of user input into a command name and its arguments.
///
/// The first whitespace-delimited token is the command name. The rest of the line is split
/// into at most two arguments, so everything after the key is the value:
/// `PUT greeting hello world` gives `("PUT", ["greeting", "hello world"])`.
/// Returns `None` for a blank line.
pub fn parse_line(line: &str) -> Option<(String, Vec<String>)> {
    let mut parts = line.trim().splitn(2, char::is_whitespace);
    // blank input is skipped rather than sent as an empty (invalid) command name
    let command = parts.next().filter(|c| !c.is_empty())?.to_owned();

    let mut args = Vec::new();
    if let Some(rest) = parts.next() {
        let mut rest = rest.trim_start().splitn(2, char::is_whitespace);
        if let Some(key) = rest.next().filter(|k| !k.is_empty()) {
            args.push(key.to_owned());
        }
        if let Some(value) = rest.next().map(str::trim_start).filter(|v| !v.is_empty()) {
            args.push(value.to_owned());
        }
    }
    Some((command, args))
}

struct Connection {
    reader: Deserializer<IoRead<BufReader<TcpStream>>>,
    writer: BufWriter<TcpStream>,
}

impl Connection {
    fn open(addr: SocketAddr, timeout: Option<Duration>) -> Result<Self> {
        let tcp_reader = TcpStream::connect(addr)?;
        tcp_reader.set_read_timeout(timeout)?;
        tcp_reader.set_write_timeout(timeout)?;
        let tcp_writer = tcp_reader.try_clone()?;

        Ok(Connection {
            reader: Deserializer::from_reader(BufReader::new(tcp_reader)),
            writer: BufWriter::new(tcp_writer),
        })
    }

    fn send(&mut self, req: &Request) -> Result<Response> {
        serde_json::to_writer(&mut self.writer, req)?;
        self.writer.flush()?;
        Ok(Response::deserialize(&mut self.reader)?)
    }
}

/// `KvsClient` is the client-side stub of a [`CommandHandler`](crate::CommandHandler)
/// registered with a [`KvsServer`](crate::KvsServer).
///
/// A transport failure (timeout, reset connection, garbled response) drops the connection;
/// the next call reconnects and resolves the service name again.
pub struct KvsClient {
    addr: SocketAddr,
    name: String,
    timeout: Option<Duration>,
    conn: Option<Connection>,
}

impl KvsClient {
    /// connects to the server at `addr` and resolves the handler bound under `name`.
    /// `timeout` bounds every read and write on the socket.
    ///
    /// # Errors
    /// `Err<KvsError::NotBound>` if the server has no handler under `name`, or an IO error if
    /// the server cannot be reached
    pub fn lookup<A: ToSocketAddrs>(addr: A, name: &str, timeout: Option<Duration>) -> Result<Self> {
        let addr = addr.to_socket_addrs()?.next().ok_or_else(|| {
            KvsError::Parsing("address did not resolve to any socket address".to_owned())
        })?;
        let mut client = KvsClient {
            addr,
            name: name.to_owned(),
            timeout,
            conn: None,
        };
        client.connection()?;
        Ok(client)
    }

    /// the service name this client is bound to
    pub fn name(&self) -> &str {
        &self.name
    }

    /// sends `command` and `args` to the remote handler and returns its result text
    ///
    /// # Errors
    /// `Err<KvsError::Remote>` if the server could not execute the command, or an IO/serde
    /// error if the call did not make it there and back
    pub fn handle_command(&mut self, command: &str, args: &[String]) -> Result<String> {
        let req = Request::Call {
            name: self.name.clone(),
            command: command.to_owned(),
            args: args.to_vec(),
        };

        let resp = match self.connection()?.send(&req) {
            Ok(resp) => resp,
            Err(e) => {
                // a half-read response would poison every later call on this stream
                self.conn = None;
                return Err(e);
            }
        };

        match resp {
            Response::Ok(text) => Ok(text.unwrap_or_default()),
            Response::Err(msg) => Err(KvsError::Remote(msg)), // re-throwing error here
        }
    }

    fn connection(&mut self) -> Result<&mut Connection> {
        let conn = match self.conn.take() {
            Some(conn) => conn,
            None => self.reconnect()?,
        };
        Ok(self.conn.insert(conn))
    }

    fn reconnect(&self) -> Result<Connection> {
        debug!("connecting to {} for '{}'", self.addr, self.name);
        let mut conn = Connection::open(self.addr, self.timeout)?;
        let lookup = Request::Lookup {
            name: self.name.clone(),
        };
        match conn.send(&lookup)? {
            Response::Ok(_) => Ok(conn),
            Response::Err(_) => Err(KvsError::NotBound(self.name.clone())),
        }
    }
}
