use crate::configuration::PingConfiguration;
use crate::internet::resolve;
use crate::ping::icmp::Pinger;
use crate::ping::transport::{EchoTransport, RawSocketTransport};
use crate::ping::{PingError, ProbeFailure, ProbeResult};
use crate::statistics::Statistics;
use log::info;
use std::io;
use std::time::Duration;

/// Resolves `host` and opens the socket. Resolution comes first, so a bad
/// host name never touches the network.
pub fn open(
    host: &str,
    conf: &PingConfiguration,
    identifier: u16,
) -> Result<Pinger<RawSocketTransport>, PingError> {
    let target = resolve(host, conf.family)?;
    let pinger = conf.generate(target, identifier)?;
    info!("Pinging {} ({}) with identifier {:#06x}", host, target, identifier);
    Ok(pinger)
}

/// Runs `count` probes back to back, pausing `interval` between them.
pub fn run<T, F>(
    pinger: &mut Pinger<T>,
    count: u32,
    interval: Duration,
    mut on_result: F,
) -> Result<Statistics, PingError>
where
    T: EchoTransport,
    F: FnMut(&ProbeResult),
{
    let mut statistics = Statistics::default();
    for i in 0..count {
        if i > 0 && !interval.is_zero() {
            std::thread::sleep(interval);
        }
        let result = pinger.probe()?;
        if let ProbeResult::Error {
            sequence,
            kind: ProbeFailure::SendFailed(kind),
        } = result
        {
            if count == 1 {
                return Err(PingError::SendFailed {
                    sequence,
                    source: io::Error::from(kind),
                });
            }
        }
        on_result(&result);
        statistics = statistics.record(&result);
    }
    Ok(statistics)
}
