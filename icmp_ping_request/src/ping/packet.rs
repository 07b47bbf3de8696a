use super::checksum::ChecksumConvention;
use super::AddressFamily;
use pnet::packet::icmp::echo_reply::EchoReplyPacket;
use pnet::packet::icmp::echo_request::MutableEchoRequestPacket;
use pnet::packet::icmp::{IcmpCode, IcmpType};
use pnet::packet::ipv4::Ipv4Packet;
use pnet::packet::Packet;
use std::net::Ipv4Addr;
use thiserror::Error;

pub const ICMP_HEADER_SIZE: usize = 8;
pub const DEFAULT_PAYLOAD_SIZE: usize = 192;
const IPV4_MIN_HEADER_SIZE: usize = 20;
const PAYLOAD_FILLER: u8 = b'Q';

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PacketError {
    #[error("datagram too short: {actual} bytes, need {needed}")]
    Truncated { needed: usize, actual: usize },
    #[error("not an IPv4 header (version {0})")]
    NotIpv4(u8),
    #[error("invalid IPv4 header length {0}")]
    BadHeaderLength(usize),
}

pub fn default_payload(size: usize) -> Vec<u8> {
    vec![PAYLOAD_FILLER; size]
}

/// Builds ICMP echo requests for one address family.
#[derive(Debug, Clone, Copy)]
pub struct PacketBuilder {
    family: AddressFamily,
    convention: ChecksumConvention,
}

impl PacketBuilder {
    pub fn new(family: AddressFamily, convention: ChecksumConvention) -> Self {
        Self { family, convention }
    }

    pub fn build(&self, identifier: u16, sequence: u16, payload: &[u8]) -> Vec<u8> {
        let unsigned = self.serialize(0, identifier, sequence, payload);
        let checksum = self.convention.compute(&unsigned);
        self.serialize(
            self.convention.to_network(checksum),
            identifier,
            sequence,
            payload,
        )
    }

    fn serialize(&self, checksum: u16, identifier: u16, sequence: u16, payload: &[u8]) -> Vec<u8> {
        let buffer = vec![0; ICMP_HEADER_SIZE + payload.len()];
        let mut packet =
            MutableEchoRequestPacket::owned(buffer).expect("buffer holds at least an echo header");
        packet.set_icmp_type(IcmpType::new(self.family.echo_request_type()));
        packet.set_icmp_code(IcmpCode::new(0));
        packet.set_checksum(checksum);
        packet.set_identifier(identifier);
        packet.set_sequence_number(sequence);
        packet.set_payload(payload);
        packet.packet().to_vec()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpHeader {
    pub header_length: usize,
    pub ttl: u8,
    pub protocol: u8,
    pub source: Ipv4Addr,
    pub destination: Ipv4Addr,
}

impl IpHeader {
    pub fn parse(data: &[u8]) -> Result<Self, PacketError> {
        let packet = Ipv4Packet::new(data).ok_or(PacketError::Truncated {
            needed: IPV4_MIN_HEADER_SIZE,
            actual: data.len(),
        })?;
        if packet.get_version() != 4 {
            return Err(PacketError::NotIpv4(packet.get_version()));
        }
        let header_length = packet.get_header_length() as usize * 4;
        if header_length < IPV4_MIN_HEADER_SIZE {
            return Err(PacketError::BadHeaderLength(header_length));
        }
        if data.len() < header_length {
            return Err(PacketError::Truncated {
                needed: header_length,
                actual: data.len(),
            });
        }
        Ok(Self {
            header_length,
            ttl: packet.get_ttl(),
            protocol: packet.get_next_level_protocol().0,
            source: packet.get_source(),
            destination: packet.get_destination(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EchoReply {
    pub icmp_type: u8,
    pub code: u8,
    pub checksum: u16,
    pub identifier: u16,
    pub sequence: u16,
    /// ICMP message length, IP header excluded.
    pub bytes: usize,
    pub checksum_valid: bool,
    pub ip: Option<IpHeader>,
}

impl EchoReply {
    /// Parses a received datagram. IPv4 raw sockets deliver the IP header in
    /// front of the ICMP message, IPv6 ones do not.
    pub fn parse(data: &[u8], family: AddressFamily) -> Result<Self, PacketError> {
        let ip = match family {
            AddressFamily::V4 => Some(IpHeader::parse(data)?),
            AddressFamily::V6 => None,
        };
        let offset = ip.as_ref().map_or(0, |ip| ip.header_length);
        let icmp = &data[offset..];
        let packet = EchoReplyPacket::new(icmp).ok_or(PacketError::Truncated {
            needed: offset + ICMP_HEADER_SIZE,
            actual: data.len(),
        })?;
        Ok(Self {
            icmp_type: packet.get_icmp_type().0,
            code: packet.get_icmp_code().0,
            checksum: packet.get_checksum(),
            identifier: packet.get_identifier(),
            sequence: packet.get_sequence_number(),
            bytes: icmp.len(),
            // ICMPv6 checksums cover a pseudo header we do not see.
            checksum_valid: family == AddressFamily::V6 || super::checksum::verify(icmp),
            ip,
        })
    }
}
