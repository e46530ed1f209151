//! this binary starts the rkvs server
//! to see the list of options, type: `rkvs-server --help`

use std::io;
use std::net::SocketAddr;
use std::process::exit;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use clap::{crate_version, App, Arg, ArgMatches};
use rkvs::config::{DEFAULT_CALL_TIMEOUT, DEFAULT_POOL_SIZE, DEFAULT_QUEUE_CAPACITY};
use rkvs::{
    Dispatcher, DispatcherConfig, KvsError, KvsServer, MemStore, RemoteEndpoint, Result,
    DEFAULT_SERVICE_NAME,
};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

const DEFAULT_ADDRESS: &str = "127.0.0.1:4000";

/// ['Opt'] holds parsed and validated options from the command line
#[derive(Debug)]
struct Opt {
    addr: SocketAddr,
    name: String,
    config: DispatcherConfig,
    log_level: Level,
}

impl Opt {
    /// validates the command line parameters
    /// returns `Ok<Opt>` if everything is valid
    /// # Errors
    /// returns [`KvsError::Parsing`] if one of the parameters is invalid
    ///
    fn build(matches: &ArgMatches) -> Result<Opt> {
        let addr = matches.value_of("addr").unwrap_or(DEFAULT_ADDRESS);
        let addr: SocketAddr = addr.parse().map_err(|_| {
            KvsError::Parsing(format!("could not parse {} into an IP address and port", addr))
        })?;

        let name = matches
            .value_of("name")
            .unwrap_or(DEFAULT_SERVICE_NAME)
            .to_owned();

        let pool_size: usize = parse_value(matches, "threads")?;
        let queue_capacity: usize = parse_value(matches, "queue-size")?;
        let timeout_ms: u64 = parse_value(matches, "timeout-ms")?;
        // zero disables the call deadline
        let call_timeout = Some(Duration::from_millis(timeout_ms)).filter(|t| !t.is_zero());

        let config = DispatcherConfig::default()
            .pool_size(pool_size)
            .queue_capacity(queue_capacity)
            .call_timeout(call_timeout);
        config
            .validate()
            .map_err(|e| KvsError::Parsing(e.to_string()))?;

        let log_level: Level = parse_value(matches, "log-level")?;

        Ok(Opt {
            addr,
            name,
            config,
            log_level,
        })
    }
}

fn main() {
    let pool_size = DEFAULT_POOL_SIZE.to_string();
    let queue_capacity = DEFAULT_QUEUE_CAPACITY.to_string();
    let timeout_ms = DEFAULT_CALL_TIMEOUT.as_millis().to_string();

    // parse command line args
    let matches = App::new("rkvs-server")
        .version(crate_version!())
        .author("strohs <strohs1@gmail.com>")
        .about("a remote key-value store server")
        .arg(Arg::with_name("addr")
            .long("addr")
            .value_name("IP_ADDR:PORT")
            .help("sets the IP_ADDR:PORT that the server listens on")
            .default_value(DEFAULT_ADDRESS))
        .arg(Arg::with_name("name")
            .long("name")
            .value_name("NAME")
            .help("sets the service name the command handler is bound under")
            .default_value(DEFAULT_SERVICE_NAME))
        .arg(Arg::with_name("threads")
            .long("threads")
            .value_name("N")
            .help("sets the number of worker threads executing commands")
            .default_value(&pool_size))
        .arg(Arg::with_name("queue-size")
            .long("queue-size")
            .value_name("N")
            .help("sets how many commands may wait for a free worker before the server reports busy")
            .default_value(&queue_capacity))
        .arg(Arg::with_name("timeout-ms")
            .long("timeout-ms")
            .value_name("MILLIS")
            .help("sets how long a call may wait for its result, 0 waits forever")
            .default_value(&timeout_ms))
        .arg(Arg::with_name("log-level")
            .long("log-level")
            .value_name("LEVEL")
            .help("sets the maximum log level: trace, debug, info, warn or error")
            .default_value("info"))
        .get_matches();

    // validate command line options, store them in Opt
    let opt = match Opt::build(&matches) {
        Ok(opt) => opt,
        Err(err) => {
            eprintln!("{}", err);
            exit(1);
        }
    };

    // set up a tracing subscriber to log to STDERR
    subscriber_config(opt.log_level);

    // start the server
    if let Err(e) = run(opt) {
        eprintln!("{}", e);
        exit(1);
    }
}

fn run(opt: Opt) -> Result<()> {
    info!("rkvs-server {}", env!("CARGO_PKG_VERSION"));
    info!(
        "Worker pool: {} threads, queue capacity {}",
        opt.config.pool_size, opt.config.queue_capacity
    );

    let dispatcher = Arc::new(Dispatcher::new(MemStore::new(), &opt.config)?);
    let server = KvsServer::bind(opt.addr)?;
    server.register(opt.name.as_str(), RemoteEndpoint::new(Arc::clone(&dispatcher)));
    info!("Listening on {} as '{}'", server.local_addr()?, opt.name);

    // SIGINT/SIGTERM stop the accept loop so the dispatcher below gets to drain
    let handle = server.shutdown_handle()?;
    ctrlc::set_handler(move || {
        info!("termination signal received, shutting down");
        handle.shutdown();
    })
    .map_err(|e| KvsError::Io(io::Error::new(io::ErrorKind::Other, e)))?;

    let result = server.run();
    dispatcher.shutdown();
    result
}

/// parses the value of the option `name` into a `T`
fn parse_value<T: FromStr>(matches: &ArgMatches, name: &str) -> Result<T> {
    let raw = matches.value_of(name).unwrap_or_default();
    raw.parse()
        .map_err(|_| KvsError::Parsing(format!("invalid value '{}' for --{}", raw, name)))
}

/// configures a tracing subscriber that will log to STDERR
fn subscriber_config(level: Level) {
    let subscriber = FmtSubscriber::builder()
        // all spans/events at `level` or more severe will be written
        .with_max_level(level)
        // log to stderr instead of stdout
        .with_writer(std::io::stderr)
        // completes the builder.
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("setting tracing default subscriber failed: {}", e);
    }
}
