//! Server configuration: host/port and the event-store directory.

/// Default port the websocket listener binds to when none is given on
/// the command line.
pub const DEFAULT_PORT: u16 = 5678;

/// Directory event files are read from and written to. A build-time
/// constant, as spec'd.
pub const EVENT_STORE_DIR: &str = "/tmp/scrabble";

/// Parsed startup configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address to bind to; `None` binds all interfaces.
    pub host: Option<String>,
    /// Port to bind to.
    pub port: u16,
}
impl Config {
    /// Parses configuration from process arguments (excluding argv\[0\]):
    /// an optional host, then an optional port. Either or both may be
    /// omitted; both default as documented on [`Config`]'s fields.
    ///
    /// ```text
    /// server                 -> host=None port=5678
    /// server 8080            -> host=None port=8080
    /// server 0.0.0.0 8080    -> host=Some("0.0.0.0") port=8080
    /// ```
    pub fn from_args(args: &[String]) -> Self {
        match args {
            [] => Config { host: None, port: DEFAULT_PORT },
            [only] => match only.parse::<u16>() {
                Ok(port) => Config { host: None, port },
                Err(_) => Config {
                    host: Some(only.clone()),
                    port: DEFAULT_PORT,
                },
            },
            [host, port, ..] => Config {
                host: Some(host.clone()),
                port: port.parse().unwrap_or(DEFAULT_PORT),
            },
        }
    }
}
