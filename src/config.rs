//! Node configuration.
//!
//! Built from command-line arguments, with environment variables as fallback for the
//! settings a deployment usually injects (`RING_NODE_IP`, `RING_HTTP_BIND`,
//! `RING_BRIDGE_URL`). Timing knobs keep their defaults unless a caller overrides them.

use crate::ring::identity::{AddressScheme, NodeId};

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_PING_PORT: u16 = 80;
pub const DEFAULT_RING_PORT: u16 = 5566;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("--ip (or RING_NODE_IP) is required")]
    MissingAddress,
    #[error("missing value for {0}")]
    MissingValue(String),
    #[error("invalid value {value:?} for {flag}")]
    InvalidValue { flag: String, value: String },
    #[error("address {0} has no ring position (third octet must be 1..=255)")]
    NotARingAddress(Ipv4Addr),
    #[error("address {addr} is outside the {prefix} ring prefix")]
    OutsidePrefix { addr: Ipv4Addr, prefix: String },
}

#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub node_ip: Ipv4Addr,
    pub scheme: AddressScheme,
    pub ping_port: u16,
    pub ring_port: u16,
    pub http_bind: Option<SocketAddr>,
    pub bridge_url: Option<String>,
    pub ping_responder: bool,
    pub verbose: bool,
    pub probe_timeout: Duration,
    pub monitor_interval: Duration,
    pub convergence_poll: Duration,
    pub discovery_retry: Duration,
    pub broadcast_retention: Duration,
    /// Connect timeout for forwarded packets. `None` waits as long as the OS does.
    pub send_timeout: Option<Duration>,
}

impl NodeConfig {
    /// Defaults for a node at `node_ip` in the `10.20` ring.
    pub fn new(node_ip: Ipv4Addr) -> Self {
        Self {
            node_ip,
            scheme: AddressScheme::default(),
            ping_port: DEFAULT_PING_PORT,
            ring_port: DEFAULT_RING_PORT,
            http_bind: None,
            bridge_url: None,
            ping_responder: true,
            verbose: false,
            probe_timeout: Duration::from_millis(150),
            monitor_interval: Duration::from_secs(5),
            convergence_poll: Duration::from_secs(3),
            discovery_retry: Duration::from_secs(1),
            broadcast_retention: Duration::from_secs(60),
            send_timeout: None,
        }
    }

    pub fn node_id(&self) -> Result<NodeId, ConfigError> {
        self.scheme
            .node_id(self.node_ip)
            .ok_or(ConfigError::NotARingAddress(self.node_ip))
    }

    /// Parses `args` (without the program name), falling back to `env` for unset values.
    pub fn from_args<F>(args: &[String], env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut node_ip: Option<Ipv4Addr> = None;
        let mut scheme = AddressScheme::default();
        let mut ping_port = DEFAULT_PING_PORT;
        let mut ring_port = DEFAULT_RING_PORT;
        let mut http_bind: Option<SocketAddr> = None;
        let mut bridge_url: Option<String> = None;
        let mut ping_responder = true;
        let mut verbose = false;

        let mut i = 0;
        while i < args.len() {
            let flag = args[i].as_str();
            match flag {
                "--ip" => {
                    node_ip = Some(parse(flag, value(args, i)?)?);
                    i += 2;
                }
                "--prefix" => {
                    scheme = parse_prefix(flag, value(args, i)?)?;
                    i += 2;
                }
                "--ping-port" => {
                    ping_port = parse(flag, value(args, i)?)?;
                    i += 2;
                }
                "--ring-port" => {
                    ring_port = parse(flag, value(args, i)?)?;
                    i += 2;
                }
                "--http" => {
                    http_bind = Some(parse(flag, value(args, i)?)?);
                    i += 2;
                }
                "--bridge" => {
                    bridge_url = Some(value(args, i)?.to_string());
                    i += 2;
                }
                "--no-ping-responder" => {
                    ping_responder = false;
                    i += 1;
                }
                "--verbose" => {
                    verbose = true;
                    i += 1;
                }
                _ => {
                    tracing::warn!("Ignoring unknown argument {}", flag);
                    i += 1;
                }
            }
        }

        let node_ip = match node_ip {
            Some(ip) => ip,
            None => {
                let raw = env("RING_NODE_IP").ok_or(ConfigError::MissingAddress)?;
                parse("RING_NODE_IP", &raw)?
            }
        };
        if http_bind.is_none()
            && let Some(raw) = env("RING_HTTP_BIND")
        {
            http_bind = Some(parse("RING_HTTP_BIND", &raw)?);
        }
        if bridge_url.is_none() {
            bridge_url = env("RING_BRIDGE_URL");
        }

        let [a, b] = scheme.prefix();
        let octets = node_ip.octets();
        if octets[0] != a || octets[1] != b {
            return Err(ConfigError::OutsidePrefix {
                addr: node_ip,
                prefix: format!("{}.{}", a, b),
            });
        }

        let config = Self {
            scheme,
            ping_port,
            ring_port,
            http_bind,
            bridge_url,
            ping_responder,
            verbose,
            ..Self::new(node_ip)
        };
        config.node_id()?;

        Ok(config)
    }
}

fn value(args: &[String], i: usize) -> Result<&str, ConfigError> {
    args.get(i + 1)
        .map(String::as_str)
        .ok_or_else(|| ConfigError::MissingValue(args[i].clone()))
}

fn parse<T: std::str::FromStr>(flag: &str, raw: &str) -> Result<T, ConfigError> {
    raw.parse().map_err(|_| ConfigError::InvalidValue {
        flag: flag.to_string(),
        value: raw.to_string(),
    })
}

fn parse_prefix(flag: &str, raw: &str) -> Result<AddressScheme, ConfigError> {
    let invalid = || ConfigError::InvalidValue {
        flag: flag.to_string(),
        value: raw.to_string(),
    };
    let (a, b) = raw.split_once('.').ok_or_else(invalid)?;
    let a: u8 = a.parse().map_err(|_| invalid())?;
    let b: u8 = b.parse().map_err(|_| invalid())?;

    Ok(AddressScheme::new(a, b))
}
