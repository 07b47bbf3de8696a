use icmp_ping_request::ping::{ProbeFailure, ProbeResult};
use icmp_ping_request::statistics::Statistics;
use std::net::IpAddr;
use std::time::Duration;

fn millis(duration: Duration) -> String {
    format!("{:.3}", duration.as_secs_f64() * 1000.0)
}

pub fn header(host: &str, target: IpAddr, payload_size: usize) {
    println!("PING {} ({}): {} data bytes", host, target, payload_size);
}

pub fn probe(target: IpAddr, result: &ProbeResult) {
    println!("{}", probe_line(target, result));
}

fn probe_line(target: IpAddr, result: &ProbeResult) -> String {
    match result {
        ProbeResult::Reply {
            sequence,
            from,
            bytes,
            ttl,
            latency,
        } => {
            let ttl = ttl.map(|ttl| format!(" ttl={}", ttl)).unwrap_or_default();
            format!(
                "{} bytes from {}: icmp_seq={}{} time={} ms",
                bytes,
                from,
                sequence,
                ttl,
                millis(*latency)
            )
        }
        ProbeResult::Timeout { sequence } => {
            format!("Request timeout for icmp_seq {} ({} is down?)", sequence, target)
        }
        ProbeResult::Error {
            sequence,
            kind: ProbeFailure::SendFailed(reason),
        } => format!("Send failed for icmp_seq {}: {}", sequence, reason),
    }
}

pub fn summary(host: &str, stats: &Statistics) {
    for line in summary_lines(host, stats) {
        println!("{}", line);
    }
}

fn summary_lines(host: &str, stats: &Statistics) -> Vec<String> {
    let mut lines = vec![
        String::new(),
        format!("--- {} ping statistics ---", host),
        format!(
            "{} packets transmitted, {} packets received, {:.1}% packet loss",
            stats.sent,
            stats.received,
            stats.loss_percent()
        ),
    ];
    if let (Some(min), Some(mean), Some(max)) = (stats.min, stats.mean(), stats.max) {
        lines.push(format!(
            "round-trip min/avg/max = {}/{}/{} ms",
            millis(min),
            millis(mean),
            millis(max)
        ));
    }
    lines
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io;
    use std::net::Ipv4Addr;

    const TARGET: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

    #[test]
    fn reply_lines() {
        let mut reply = ProbeResult::Reply {
            sequence: 3,
            from: TARGET,
            bytes: 200,
            ttl: Some(64),
            latency: Duration::from_micros(1234),
        };
        assert_eq!(
            probe_line(TARGET, &reply),
            "200 bytes from 127.0.0.1: icmp_seq=3 ttl=64 time=1.234 ms"
        );
        if let ProbeResult::Reply { ttl, .. } = &mut reply {
            *ttl = None;
        }
        assert_eq!(
            probe_line(TARGET, &reply),
            "200 bytes from 127.0.0.1: icmp_seq=3 time=1.234 ms"
        );
    }

    #[test]
    fn failure_lines() {
        assert_eq!(
            probe_line(TARGET, &ProbeResult::Timeout { sequence: 1 }),
            "Request timeout for icmp_seq 1 (127.0.0.1 is down?)"
        );
        let error = ProbeResult::Error {
            sequence: 2,
            kind: ProbeFailure::SendFailed(io::ErrorKind::PermissionDenied),
        };
        assert_eq!(
            probe_line(TARGET, &error),
            "Send failed for icmp_seq 2: permission denied"
        );
    }

    #[test]
    fn summary_without_replies_has_no_round_trip_line() {
        let stats = Statistics::default().record(&ProbeResult::Timeout { sequence: 0 });
        let lines = summary_lines("example.org", &stats);
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[2],
            "1 packets transmitted, 0 packets received, 100.0% packet loss"
        );
    }

    #[test]
    fn summary_with_replies() {
        let stats = Statistics::default().record(&ProbeResult::Reply {
            sequence: 0,
            from: TARGET,
            bytes: 200,
            ttl: Some(64),
            latency: Duration::from_millis(2),
        });
        let lines = summary_lines("localhost", &stats);
        assert_eq!(lines[1], "--- localhost ping statistics ---");
        assert_eq!(lines[3], "round-trip min/avg/max = 2.000/2.000/2.000 ms");
    }
}
