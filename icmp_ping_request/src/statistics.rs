use crate::ping::ProbeResult;
use serde::Serialize;
use std::time::Duration;

/// Running totals of a ping run. Send failures and timeouts count as sent
/// and lost.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Statistics {
    pub sent: u32,
    pub received: u32,
    pub min: Option<Duration>,
    pub max: Option<Duration>,
    pub total: Duration,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub sent: u32,
    pub received: u32,
    pub lost: u32,
    pub loss_percent: f64,
    pub min_ms: Option<f64>,
    pub avg_ms: Option<f64>,
    pub max_ms: Option<f64>,
}

fn as_millis(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}

impl Statistics {
    pub fn record(mut self, result: &ProbeResult) -> Self {
        self.sent += 1;
        if let Some(latency) = result.latency() {
            self.received += 1;
            self.total += latency;
            self.min = Some(self.min.map_or(latency, |min| min.min(latency)));
            self.max = Some(self.max.map_or(latency, |max| max.max(latency)));
        }
        self
    }

    pub fn lost(&self) -> u32 {
        self.sent - self.received
    }

    pub fn loss_percent(&self) -> f64 {
        if self.sent == 0 {
            return 0.0;
        }
        100.0 * self.lost() as f64 / self.sent as f64
    }

    pub fn mean(&self) -> Option<Duration> {
        if self.received == 0 {
            None
        } else {
            Some(self.total / self.received)
        }
    }

    pub fn summary(&self) -> Summary {
        Summary {
            sent: self.sent,
            received: self.received,
            lost: self.lost(),
            loss_percent: self.loss_percent(),
            min_ms: self.min.map(as_millis),
            avg_ms: self.mean().map(as_millis),
            max_ms: self.max.map(as_millis),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::ping::ProbeFailure;
    use std::io;
    use std::net::{IpAddr, Ipv4Addr};

    fn reply(sequence: u16, millis: u64) -> ProbeResult {
        ProbeResult::Reply {
            sequence,
            from: IpAddr::V4(Ipv4Addr::LOCALHOST),
            bytes: 200,
            ttl: Some(64),
            latency: Duration::from_millis(millis),
        }
    }

    #[test]
    fn empty() {
        let stats = Statistics::default();
        assert_eq!(stats.lost(), 0);
        assert_eq!(stats.loss_percent(), 0.0);
        assert_eq!(stats.mean(), None);
        assert_eq!(stats.summary().min_ms, None);
    }

    #[test]
    fn mixed_results() {
        let stats = [
            reply(0, 10),
            ProbeResult::Timeout { sequence: 1 },
            reply(2, 30),
            ProbeResult::Error {
                sequence: 3,
                kind: ProbeFailure::SendFailed(io::ErrorKind::Other),
            },
            reply(4, 20),
        ]
        .iter()
        .fold(Statistics::default(), |stats, result| stats.record(result));

        assert_eq!((stats.sent, stats.received, stats.lost()), (5, 3, 2));
        assert_eq!(stats.loss_percent(), 40.0);
        assert_eq!(stats.min, Some(Duration::from_millis(10)));
        assert_eq!(stats.max, Some(Duration::from_millis(30)));
        assert_eq!(stats.mean(), Some(Duration::from_millis(20)));

        let summary = stats.summary();
        assert_eq!(summary.avg_ms, Some(20.0));
        assert_eq!(summary.lost, 2);
    }

    #[test]
    fn summary_json() {
        let stats = Statistics::default().record(&ProbeResult::Timeout { sequence: 0 });
        let json = serde_json::to_value(stats.summary()).unwrap();
        assert_eq!(json["sent"], 1);
        assert_eq!(json["loss_percent"], 100.0);
        assert!(json["min_ms"].is_null());
    }
}
