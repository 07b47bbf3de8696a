use icmp_ping_request::configuration::PingConfiguration;
use icmp_ping_request::ping::{PingError, ProbeResult};
use icmp_ping_request::session;
use std::time::Duration;

fn identifier() -> u16 {
    (std::process::id() & 0xffff) as u16
}

#[test]
fn unresolvable_host_aborts_before_probing() {
    let conf = PingConfiguration::default();
    match session::open("no-such-host.invalid", &conf, identifier()) {
        Err(PingError::AddressResolutionFailed { host, .. }) => {
            assert_eq!(host, "no-such-host.invalid")
        }
        Err(e) => panic!("unexpected error {}", e),
        Ok(_) => panic!("resolution should have failed"),
    }
}

#[test]
#[ignore = "needs root or CAP_NET_RAW"]
fn loopback_answers_every_probe() {
    let conf = PingConfiguration {
        interval: Duration::from_millis(100),
        ..PingConfiguration::default()
    };
    let mut pinger = session::open("127.0.0.1", &conf, identifier()).unwrap();

    let mut results = vec![];
    let stats = session::run(&mut pinger, conf.count, conf.interval, |result| {
        results.push(result.clone())
    })
    .unwrap();

    assert_eq!(results.len(), 4);
    for (i, result) in results.iter().enumerate() {
        match result {
            ProbeResult::Reply { sequence, ttl, .. } => {
                assert_eq!(*sequence, i as u16);
                assert_eq!(*ttl, Some(64));
            }
            other => panic!("probe {} gave {:?}", i, other),
        }
    }
    assert_eq!((stats.sent, stats.received, stats.lost()), (4, 4, 0));
    assert_eq!(stats.loss_percent(), 0.0);
}
