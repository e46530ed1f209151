use std::collections::HashMap;
use std::io::{BufReader, BufWriter, Write};
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::thread;

use serde_json::Deserializer;
use tracing::{debug, error, info, warn};

use crate::command::{Request, Response};
use crate::{CommandHandler, KvsError, Result};

/// the name the server binary registers its [`RemoteEndpoint`](crate::RemoteEndpoint) under
pub const DEFAULT_SERVICE_NAME: &str = "command-handler";

type Registry = Arc<RwLock<HashMap<String, Arc<dyn CommandHandler>>>>;

/// A TCP socket server that exposes [`CommandHandler`]s by name.
///
/// It listens for incoming [`Request`]s, serves every client connection on its own thread
/// and hands each call to the handler registered under the requested name. Handlers do their
/// own scheduling; the server only carries calls in and results out.
///
/// # Example
/// Expose a dispatcher over an in-memory store on "127.0.0.1:4000"
/// ```rust,no_run
/// use std::sync::Arc;
/// use rkvs::{Dispatcher, DispatcherConfig, KvsServer, MemStore, RemoteEndpoint, DEFAULT_SERVICE_NAME};
/// # fn main() -> rkvs::Result<()> {
/// let dispatcher = Arc::new(Dispatcher::new(MemStore::new(), &DispatcherConfig::default())?);
/// let server = KvsServer::bind("127.0.0.1:4000")?;
/// server.register(DEFAULT_SERVICE_NAME, RemoteEndpoint::new(dispatcher));
/// server.run()?;
/// # Ok(())
/// # }
/// ```
///
/// [`Request`]: ./enum.Request.html
pub struct KvsServer {
    listener: TcpListener,
    registry: Registry,
    stop: Arc<AtomicBool>,
}

impl KvsServer {
    /// binds a listener to `addr`. Binding to port 0 picks a free port, see
    /// [`local_addr`](KvsServer::local_addr)
    pub fn bind<A: ToSocketAddrs>(addr: A) -> Result<Self> {
        let listener = TcpListener::bind(addr)?;
        Ok(KvsServer {
            listener,
            registry: Arc::new(RwLock::new(HashMap::new())),
            stop: Arc::new(AtomicBool::new(false)),
        })
    }

    /// the address the server is listening on
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// binds `handler` under `name`, replacing any handler previously bound to that name
    pub fn register<H: CommandHandler>(&self, name: impl Into<String>, handler: H) {
        let name = name.into();
        let previous = self
            .registry
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.clone(), Arc::new(handler));
        if previous.is_some() {
            info!("rebound handler '{}'", name);
        } else {
            info!("bound handler '{}'", name);
        }
    }

    /// returns a handle that can stop [`run`](KvsServer::run) from another thread
    pub fn shutdown_handle(&self) -> Result<ShutdownHandle> {
        let mut addr = self.local_addr()?;
        if addr.ip().is_unspecified() {
            match addr {
                SocketAddr::V4(_) => addr.set_ip(Ipv4Addr::LOCALHOST.into()),
                SocketAddr::V6(_) => addr.set_ip(Ipv6Addr::LOCALHOST.into()),
            }
        }
        Ok(ShutdownHandle {
            addr,
            stop: Arc::clone(&self.stop),
        })
    }

    /// accepts connections until a [`ShutdownHandle`] stops the server.
    /// Each connection is serviced on its own thread.
    ///
    /// # Errors
    /// returns [`KvsError`] if the server could not be started
    pub fn run(self) -> Result<()> {
        info!("serving on {}", self.local_addr()?);
        for stream in self.listener.incoming() {
            if self.stop.load(Ordering::SeqCst) {
                break;
            }
            match stream {
                Ok(stream) => {
                    let registry = Arc::clone(&self.registry);
                    let spawned = thread::Builder::new()
                        .name("rkvs-conn".to_owned())
                        .spawn(move || {
                            if let Err(e) = serve(registry, stream) {
                                error!("Error on serving client: {}", e);
                            }
                        });
                    if let Err(e) = spawned {
                        error!("Cannot spawn a thread to serve connection: {}", e);
                    }
                }
                Err(e) => error!("Connection failed: {}", e),
            }
        }
        info!("server stopped accepting connections");
        Ok(())
    }
}

/// Stops a running [`KvsServer`]. Connections already being served are left to finish.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    addr: SocketAddr,
    stop: Arc<AtomicBool>,
}

impl ShutdownHandle {
    /// asks the accept loop to exit
    pub fn shutdown(&self) {
        self.stop.store(true, Ordering::SeqCst);
        // wake the accept loop so it sees the flag
        if let Err(e) = TcpStream::connect(self.addr) {
            warn!("could not wake the accept loop: {}", e);
        }
    }
}

fn lookup(registry: &Registry, name: &str) -> Option<Arc<dyn CommandHandler>> {
    registry
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(name)
        .cloned()
}

/// Reads [`Request`]s off the `tcp` stream, runs each one, and writes back one [`Response`]
/// per request, in order, until the client closes the connection
fn serve(registry: Registry, tcp: TcpStream) -> Result<()> {
    let peer_addr = tcp.peer_addr()?;
    let stream_reader = BufReader::new(&tcp);
    let mut stream_writer = BufWriter::new(&tcp);
    let req_reader = Deserializer::from_reader(stream_reader).into_iter::<Request>();

    let mut send_resp = move |resp: Response| -> Result<()> {
        serde_json::to_writer(&mut stream_writer, &resp)?;
        stream_writer.flush()?;
        debug!("Response sent to {}: {:?}", peer_addr, resp);
        Ok(())
    };

    for req in req_reader {
        let req = req?;
        debug!("Receive request from {}: {:?}", peer_addr, req);

        let resp = match req {
            Request::Lookup { name } => match lookup(&registry, &name) {
                Some(_) => Response::Ok(None),
                None => Response::Err(KvsError::NotBound(name).to_string()),
            },
            Request::Call {
                name,
                command,
                args,
            } => match lookup(&registry, &name) {
                Some(handler) => match handler.handle_command(&command, &args) {
                    Ok(text) => Response::Ok(Some(text)),
                    Err(e) => Response::Err(e.to_string()),
                },
                None => Response::Err(KvsError::NotBound(name).to_string()),
            },
        };
        send_resp(resp)?;
    }
    debug!("{} disconnected", peer_addr);
    Ok(())
}
