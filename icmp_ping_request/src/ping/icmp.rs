use super::checksum::ChecksumConvention;
use super::packet::{EchoReply, PacketBuilder, ICMP_HEADER_SIZE};
use super::transport::EchoTransport;
use super::*;
use log::{debug, trace, warn};
use std::io;
use std::net::IpAddr;
use std::time::{Duration, Instant};

const RECV_BUFFER_SIZE: usize = 1024;
const IPV4_MAX_HEADER_SIZE: usize = 60;

#[derive(Debug, Clone)]
pub struct ProbeSettings {
    /// Identifies this run's echo requests, usually derived from the pid.
    pub identifier: u16,
    pub timeout: Duration,
    pub payload: Vec<u8>,
    pub checksum: ChecksumConvention,
}

/// One echo request in flight.
#[derive(Debug, Clone, Copy)]
pub struct Probe {
    pub identifier: u16,
    pub sequence: u16,
    pub sent_at: Instant,
}

impl Probe {
    fn is_answered_by(&self, reply: &EchoReply, family: AddressFamily) -> bool {
        reply.icmp_type == family.echo_reply_type()
            && reply.identifier == self.identifier
            && reply.sequence == self.sequence
    }
}

/// Sends echo requests to a single target, one at a time.
pub struct Pinger<T: EchoTransport> {
    transport: T,
    target: IpAddr,
    family: AddressFamily,
    builder: PacketBuilder,
    identifier: u16,
    timeout: Duration,
    payload: Vec<u8>,
    next_sequence: u16,
    buffer: Vec<u8>,
}

impl<T: EchoTransport> Pinger<T> {
    pub fn new(transport: T, target: IpAddr, settings: ProbeSettings) -> Self {
        let family = AddressFamily::of(&target);
        let buffer_size =
            RECV_BUFFER_SIZE.max(IPV4_MAX_HEADER_SIZE + ICMP_HEADER_SIZE + settings.payload.len());
        Self {
            transport,
            target,
            family,
            builder: PacketBuilder::new(family, settings.checksum),
            identifier: settings.identifier,
            timeout: settings.timeout,
            payload: settings.payload,
            next_sequence: 0,
            buffer: vec![0; buffer_size],
        }
    }

    pub fn target(&self) -> IpAddr {
        self.target
    }

    pub fn payload_size(&self) -> usize {
        self.payload.len()
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Runs one probe to completion. Only errors that make further probes
    /// pointless are returned as `Err`.
    pub fn probe(&mut self) -> Result<ProbeResult, PingError> {
        let sequence = self.next_sequence;
        self.next_sequence = sequence.wrapping_add(1);
        let packet = self.builder.build(self.identifier, sequence, &self.payload);

        let probe = Probe {
            identifier: self.identifier,
            sequence,
            sent_at: Instant::now(),
        };
        if let Err(e) = self.send(&packet) {
            warn!("Failed to send icmp_seq={} to {}: {}", sequence, self.target, e);
            return Ok(ProbeResult::Error {
                sequence,
                kind: ProbeFailure::SendFailed(e.kind()),
            });
        }
        trace!("Sent icmp_seq={} ({} bytes) to {}", sequence, packet.len(), self.target);
        self.await_reply(&probe)
    }

    fn send(&mut self, packet: &[u8]) -> io::Result<()> {
        let mut remaining = packet;
        while !remaining.is_empty() {
            match self.transport.send_to(remaining, self.target) {
                Ok(0) => return Err(io::Error::from(io::ErrorKind::WriteZero)),
                Ok(sent) => remaining = &remaining[sent..],
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    fn await_reply(&mut self, probe: &Probe) -> Result<ProbeResult, PingError> {
        let timed_out = Ok(ProbeResult::Timeout {
            sequence: probe.sequence,
        });
        let mut budget = self.timeout;
        loop {
            let wait_start = Instant::now();
            let received = match self.transport.recv_within(&mut self.buffer, budget) {
                Ok(Some(received)) => Some(received),
                Ok(None) => return timed_out,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => None,
                Err(e) => return Err(PingError::ReceiveFatal(e)),
            };

            if let Some((size, from)) = received {
                let received_at = Instant::now();
                match EchoReply::parse(&self.buffer[..size], self.family) {
                    Ok(reply) if probe.is_answered_by(&reply, self.family) => {
                        if !reply.checksum_valid {
                            debug!("Reply icmp_seq={} from {} has a bad checksum", probe.sequence, from);
                        }
                        return Ok(ProbeResult::Reply {
                            sequence: probe.sequence,
                            from: reply.ip.as_ref().map_or(from, |ip| IpAddr::V4(ip.source)),
                            bytes: reply.bytes,
                            ttl: reply.ip.as_ref().map(|ip| ip.ttl),
                            latency: received_at.duration_since(probe.sent_at),
                        });
                    }
                    Ok(reply) => trace!(
                        "Ignoring ICMP type {} id={} seq={} from {} while waiting for seq={}",
                        reply.icmp_type,
                        reply.identifier,
                        reply.sequence,
                        from,
                        probe.sequence
                    ),
                    Err(e) => debug!("Ignoring malformed datagram from {}: {}", from, e),
                }
            }

            budget = budget.saturating_sub(wait_start.elapsed());
            if budget.is_zero() {
                return timed_out;
            }
        }
    }
}
