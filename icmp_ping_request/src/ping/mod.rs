pub mod checksum;
pub mod icmp;
pub mod packet;
pub mod transport;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use std::net::IpAddr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressFamily {
    V4,
    V6,
}

impl AddressFamily {
    pub fn of(addr: &IpAddr) -> Self {
        match addr {
            IpAddr::V4(_) => Self::V4,
            IpAddr::V6(_) => Self::V6,
        }
    }

    pub fn echo_request_type(self) -> u8 {
        match self {
            Self::V4 => 8,
            Self::V6 => 128,
        }
    }

    pub fn echo_reply_type(self) -> u8 {
        match self {
            Self::V4 => 0,
            Self::V6 => 129,
        }
    }
}

impl fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V4 => write!(f, "IPv4"),
            Self::V6 => write!(f, "IPv6"),
        }
    }
}

/// Errors that abort a whole run.
#[derive(Debug, Error)]
pub enum PingError {
    #[error(
        "cannot open a raw ICMP socket ({source}) - ICMP messages can only be sent \
         by processes running as root or holding CAP_NET_RAW"
    )]
    PermissionDenied {
        #[source]
        source: io::Error,
    },
    #[error("cannot resolve {host} to an {family} address")]
    AddressResolutionFailed { host: String, family: AddressFamily },
    #[error("failed to set up the raw socket: {0}")]
    SocketSetup(#[source] io::Error),
    #[error("failed to send echo request icmp_seq={sequence}: {source}")]
    SendFailed {
        sequence: u16,
        #[source]
        source: io::Error,
    },
    #[error("failed to receive from the raw socket: {0}")]
    ReceiveFatal(#[source] io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeFailure {
    SendFailed(io::ErrorKind),
}

impl fmt::Display for ProbeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SendFailed(kind) => write!(f, "send failed ({})", kind),
        }
    }
}

/// Terminal state of one probe.
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeResult {
    Reply {
        sequence: u16,
        from: IpAddr,
        /// ICMP message size, IP header excluded.
        bytes: usize,
        /// Only known for IPv4, the socket layer strips the IPv6 header.
        ttl: Option<u8>,
        latency: Duration,
    },
    Timeout {
        sequence: u16,
    },
    Error {
        sequence: u16,
        kind: ProbeFailure,
    },
}

impl ProbeResult {
    pub fn sequence(&self) -> u16 {
        match self {
            Self::Reply { sequence, .. }
            | Self::Timeout { sequence }
            | Self::Error { sequence, .. } => *sequence,
        }
    }

    pub fn latency(&self) -> Option<Duration> {
        match self {
            Self::Reply { latency, .. } => Some(*latency),
            _ => None,
        }
    }
}
