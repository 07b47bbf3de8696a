use crate::ping::checksum::ChecksumConvention;
use crate::ping::icmp::{Pinger, ProbeSettings};
use crate::ping::packet::{default_payload, DEFAULT_PAYLOAD_SIZE};
use crate::ping::transport::RawSocketTransport;
use crate::ping::{AddressFamily, PingError};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::time::Duration;
use thiserror::Error;

// ICMP payload of an IPv4 datagram without options
const MAX_PAYLOAD_SIZE: usize = 65_507;

#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("invalid configuration file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PingConfiguration {
    pub count: u32,
    /// Per-probe reply budget.
    pub timeout: Duration,
    /// TTL for IPv4, unicast hop limit for IPv6.
    pub ttl: u8,
    /// Pause between two probes, outside of any probe's timeout.
    pub interval: Duration,
    pub payload_size: usize,
    pub family: AddressFamily,
    pub checksum: ChecksumConvention,
    pub statistics: bool,
}

impl Default for PingConfiguration {
    fn default() -> Self {
        Self {
            count: 4,
            timeout: Duration::from_secs(2),
            ttl: 64,
            interval: Duration::from_secs(1),
            payload_size: DEFAULT_PAYLOAD_SIZE,
            family: AddressFamily::V4,
            checksum: ChecksumConvention::WordSwap,
            statistics: true,
        }
    }
}

impl PingConfiguration {
    pub fn from_json(data: &[u8]) -> Result<Self, ConfigurationError> {
        let conf: Self = serde_json::from_slice(data)?;
        conf.validate()?;
        Ok(conf)
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.count == 0 {
            return Err(ConfigurationError::Invalid("count must be at least 1".into()));
        }
        if self.ttl == 0 {
            return Err(ConfigurationError::Invalid("ttl must be at least 1".into()));
        }
        if self.timeout.is_zero() {
            return Err(ConfigurationError::Invalid("timeout must be positive".into()));
        }
        if self.payload_size > MAX_PAYLOAD_SIZE {
            return Err(ConfigurationError::Invalid(format!(
                "payload size {} exceeds {}",
                self.payload_size, MAX_PAYLOAD_SIZE
            )));
        }
        Ok(())
    }

    pub fn probe_settings(&self, identifier: u16) -> ProbeSettings {
        ProbeSettings {
            identifier,
            timeout: self.timeout,
            payload: default_payload(self.payload_size),
            checksum: self.checksum,
        }
    }

    /// Opens the raw socket and binds a pinger to `target`.
    pub fn generate(
        &self,
        target: IpAddr,
        identifier: u16,
    ) -> Result<Pinger<RawSocketTransport>, PingError> {
        let transport = RawSocketTransport::open(AddressFamily::of(&target), self.ttl)?;
        Ok(Pinger::new(transport, target, self.probe_settings(identifier)))
    }
}
