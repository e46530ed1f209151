//! The rkvs-client executable supports the following command line arguments:
//!
//! `rkvs-client [--addr IP-PORT] [--name NAME] [--timeout-ms MILLIS] [--script FILE] [--prepopulate]`
//!
//!     Resolves the command handler bound under NAME on the server at IP-PORT (default
//!     127.0.0.1:4000), then reads commands, one per line, from FILE or from stdin and prints
//!     each server response. Reading stops at a line containing `exit` or at end of input.
//!     --prepopulate runs a fixed script of PUT, GET and DELETE commands first.
//!     A failed command is reported and the client moves on to the next one.
//!     Print an error and return a non-zero exit code if the server cannot be resolved.
//!
//! `rkvs-client -V`
//!
//!     Print the version.

use std::fmt::Display;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::net::SocketAddr;
use std::process::exit;
use std::time::Duration;

use clap::{crate_version, App, Arg, ArgMatches};
use rkvs::{parse_line, KvsClient, KvsError, Result, DEFAULT_SERVICE_NAME, PREPOPULATE_SCRIPT};
use tracing::{error, info, Level};
use tracing_subscriber::fmt::time::{FormatTime, SystemTime};
use tracing_subscriber::FmtSubscriber;

const DEFAULT_ADDRESS: &str = "127.0.0.1:4000";
const DEFAULT_TIMEOUT_MS: &str = "10000";
const EXIT_COMMAND: &str = "exit";

/// ['Opt'] holds parsed and validated options from the command line
#[derive(Debug)]
struct Opt {
    /// the server's ip:port
    addr: SocketAddr,
    name: String,
    timeout: Option<Duration>,
    script: Option<String>,
    prepopulate: bool,
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

        let raw_timeout = matches.value_of("timeout-ms").unwrap_or(DEFAULT_TIMEOUT_MS);
        let timeout_ms: u64 = raw_timeout.parse().map_err(|_| {
            KvsError::Parsing(format!("invalid value '{}' for --timeout-ms", raw_timeout))
        })?;

        let raw_level = matches.value_of("log-level").unwrap_or("warn");
        let log_level: Level = raw_level.parse().map_err(|_| {
            KvsError::Parsing(format!("invalid value '{}' for --log-level", raw_level))
        })?;

        Ok(Opt {
            addr,
            name: matches
                .value_of("name")
                .unwrap_or(DEFAULT_SERVICE_NAME)
                .to_owned(),
            // zero disables the transport deadline
            timeout: Some(Duration::from_millis(timeout_ms)).filter(|t| !t.is_zero()),
            script: matches.value_of("script").map(String::from),
            prepopulate: matches.is_present("prepopulate"),
            log_level,
        })
    }
}

fn main() {
    let matches = App::new("rkvs-client")
        .version(crate_version!())
        .author("strohs <strohs1@gmail.com>")
        .about("sends PUT, GET and DELETE commands to an rkvs server")
        .arg(Arg::with_name("addr")
            .long("addr")
            .value_name("IP_ADDR:PORT")
            .help("sets the IP_ADDR:PORT of the server to connect to")
            .default_value(DEFAULT_ADDRESS))
        .arg(Arg::with_name("name")
            .long("name")
            .value_name("NAME")
            .help("sets the service name to resolve on the server")
            .default_value(DEFAULT_SERVICE_NAME))
        .arg(Arg::with_name("timeout-ms")
            .long("timeout-ms")
            .value_name("MILLIS")
            .help("sets how long to wait on the server before reporting an error, 0 waits forever")
            .default_value(DEFAULT_TIMEOUT_MS))
        .arg(Arg::with_name("script")
            .long("script")
            .value_name("FILE")
            .help("reads commands from FILE instead of stdin"))
        .arg(Arg::with_name("prepopulate")
            .long("prepopulate")
            .help("runs a fixed script of PUT, GET and DELETE commands before reading input"))
        .arg(Arg::with_name("log-level")
            .long("log-level")
            .value_name("LEVEL")
            .help("sets the maximum log level: trace, debug, info, warn or error")
            .default_value("warn"))
        .get_matches();

    let opt = match Opt::build(&matches) {
        Ok(opt) => opt,
        Err(e) => {
            eprintln!("{}", e);
            exit(1);
        }
    };

    // configure a subscriber that will log messages to STDERR
    subscriber_config(opt.log_level);

    if let Err(e) = run(opt) {
        eprintln!("Client exception: {}", e);
        exit(1);
    }
}

/// resolves the server's command handler and feeds it commands until `exit` or end of input
fn run(opt: Opt) -> Result<()> {
    let mut client = KvsClient::lookup(opt.addr, &opt.name, opt.timeout)?;
    info!("resolved '{}' at {}", client.name(), opt.addr);

    if opt.prepopulate {
        prepopulate(&mut client);
    }

    let input: Box<dyn BufRead> = match &opt.script {
        Some(path) => Box::new(BufReader::new(File::open(path)?)),
        None => Box::new(BufReader::new(io::stdin())),
    };
    let interactive = opt.script.is_none();

    let mut lines = input.lines();
    loop {
        if interactive {
            print!("Enter command: ");
            io::stdout().flush()?;
        }
        let line = match lines.next() {
            Some(line) => line?,
            None => break,
        };
        if line.trim().eq_ignore_ascii_case(EXIT_COMMAND) {
            break;
        }
        let (command, args) = match parse_line(&line) {
            Some(parsed) => parsed,
            None => continue,
        };

        match client.handle_command(&command, &args) {
            Ok(response) => print_with_timestamp(format_args!("Server response: {}", response)),
            // report and keep going, one failed command never ends the session
            Err(e) => error!("Error communicating with server: {}", e),
        }
    }
    Ok(())
}

/// sends every command in [`PREPOPULATE_SCRIPT`] to the server
fn prepopulate(client: &mut KvsClient) {
    for line in PREPOPULATE_SCRIPT {
        let (command, args) = match parse_line(line) {
            Some(parsed) => parsed,
            None => continue,
        };
        match client.handle_command(&command, &args) {
            Ok(response) => print_with_timestamp(format_args!(
                "Prepopulated command: {}, response: {}",
                line, response
            )),
            Err(e) => error!("Error during prepopulation: {}", e),
        }
    }
}

/// prints `msg` to STDOUT, stamped with the same clock the log lines use
fn print_with_timestamp(msg: impl Display) {
    let mut stamp = String::new();
    if SystemTime.format_time(&mut stamp).is_err() || stamp.trim().is_empty() {
        println!("{}", msg);
    } else {
        println!("{} {}", stamp.trim_end(), msg);
    }
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
