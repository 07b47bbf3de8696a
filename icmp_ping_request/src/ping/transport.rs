use super::{AddressFamily, PingError};
use log::debug;
use socket2::{Domain, Protocol, SockAddr, Socket, Type};
use std::io;
use std::mem::MaybeUninit;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

// SO_RCVTIMEO has microsecond resolution and a zero timeval blocks forever.
const MIN_READ_TIMEOUT: Duration = Duration::from_micros(1);

/// Datagram transport the engine sends echo requests over.
pub trait EchoTransport {
    fn send_to(&mut self, data: &[u8], addr: IpAddr) -> io::Result<usize>;

    /// Receives one datagram, waiting at most `wait`. `Ok(None)` means
    /// nothing became readable in time.
    fn recv_within(&mut self, buf: &mut [u8], wait: Duration)
        -> io::Result<Option<(usize, IpAddr)>>;
}

pub struct RawSocketTransport {
    socket: Socket,
}

impl RawSocketTransport {
    pub fn open(family: AddressFamily, ttl: u8) -> Result<Self, PingError> {
        let (domain, protocol) = match family {
            AddressFamily::V4 => (Domain::IPV4, Protocol::ICMPV4),
            AddressFamily::V6 => (Domain::IPV6, Protocol::ICMPV6),
        };
        let socket = Socket::new_raw(domain, Type::RAW, Some(protocol)).map_err(|e| {
            match e.kind() {
                io::ErrorKind::PermissionDenied => PingError::PermissionDenied { source: e },
                _ => PingError::SocketSetup(e),
            }
        })?;
        match family {
            AddressFamily::V4 => socket.set_ttl(ttl as u32),
            AddressFamily::V6 => socket.set_unicast_hops_v6(ttl as u32),
        }
        .map_err(PingError::SocketSetup)?;
        debug!("Opened raw {} socket with ttl {}", family, ttl);
        Ok(Self { socket })
    }

    #[cfg(test)]
    fn from_socket(socket: Socket) -> Self {
        Self { socket }
    }
}

impl EchoTransport for RawSocketTransport {
    fn send_to(&mut self, data: &[u8], addr: IpAddr) -> io::Result<usize> {
        self.socket.send_to(data, &SockAddr::from(SocketAddr::new(addr, 0)))
    }

    fn recv_within(
        &mut self,
        buf: &mut [u8],
        wait: Duration,
    ) -> io::Result<Option<(usize, IpAddr)>> {
        if wait.is_zero() {
            return Ok(None);
        }
        self.socket.set_read_timeout(Some(wait.max(MIN_READ_TIMEOUT)))?;
        // SAFETY: an initialized byte buffer is a valid MaybeUninit buffer and
        // recv_from only ever writes into it.
        let uninit = unsafe { &mut *(buf as *mut [u8] as *mut [MaybeUninit<u8>]) };
        match self.socket.recv_from(uninit) {
            Ok((size, from)) => {
                let from = from
                    .as_socket()
                    .map(|addr| addr.ip())
                    .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "non-IP source"))?;
                Ok(Some((size, from)))
            }
            Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => {
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}
