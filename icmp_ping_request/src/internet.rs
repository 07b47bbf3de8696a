use crate::ping::{AddressFamily, PingError};
use log::debug;
use std::net::{IpAddr, ToSocketAddrs};

/// Turns a literal address or a host name into one address of `family`.
pub fn resolve(host: &str, family: AddressFamily) -> Result<IpAddr, PingError> {
    let failed = || PingError::AddressResolutionFailed {
        host: host.to_string(),
        family,
    };

    if let Ok(addr) = host.parse::<IpAddr>() {
        return if AddressFamily::of(&addr) == family {
            Ok(addr)
        } else {
            Err(failed())
        };
    }

    let addr = (host, 0)
        .to_socket_addrs()
        .map_err(|e| {
            debug!("Lookup of {} failed: {}", host, e);
            failed()
        })?
        .map(|addr| addr.ip())
        .find(|addr| AddressFamily::of(addr) == family)
        .ok_or_else(failed)?;
    debug!("Resolved {} to {}", host, addr);
    Ok(addr)
}

#[cfg(test)]
mod test {
    use super::*;
    use std::net::{Ipv4Addr, Ipv6Addr};

    #[test]
    fn literals() {
        assert_eq!(
            resolve("127.0.0.1", AddressFamily::V4).unwrap(),
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        );
        assert_eq!(
            resolve("::1", AddressFamily::V6).unwrap(),
            IpAddr::V6(Ipv6Addr::LOCALHOST)
        );
    }

    #[test]
    fn literal_of_the_wrong_family() {
        match resolve("::1", AddressFamily::V4) {
            Err(PingError::AddressResolutionFailed { host, family }) => {
                assert_eq!(host, "::1");
                assert_eq!(family, AddressFamily::V4);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(resolve("10.0.0.1", AddressFamily::V6).is_err());
    }

    #[test]
    fn unresolvable_name() {
        assert!(matches!(
            resolve("no-such-host.invalid", AddressFamily::V4),
            Err(PingError::AddressResolutionFailed { .. })
        ));
    }
}
