use clap::{Parser, ValueEnum};
use events_bus::DEFAULT_CHANNEL_CAPACITY;

/// Transport the synchronizer consumes events from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BusKind {
    /// In-process channel; only events published by this process are seen.
    Local,
    /// NATS queue group shared with the other replicas.
    Nats,
}

/// heureka event handler
#[derive(Parser, Debug)]
#[command(name = "event-handler")]
#[command(about = "Consumes heureka domain events and mirrors them into the authorization store")]
pub struct Args {
    /// Event transport
    #[arg(long, env = "EVENT_BUS", value_enum, default_value_t = BusKind::Nats)]
    pub bus: BusKind,

    /// Capacity of the in-process channel when `--bus local` is used
    #[arg(long, env = "LOCAL_BUS_CAPACITY", default_value_t = DEFAULT_CHANNEL_CAPACITY)]
    pub local_capacity: usize,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON (also enabled by LOG_FORMAT=json)
    #[arg(long)]
    pub json_logs: bool,
}

impl Args {
    pub fn json_output(&self) -> bool {
        self.json_logs
            || std::env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_nats() {
        let args = Args::try_parse_from(["event-handler"]).unwrap();
        if std::env::var("EVENT_BUS").is_err() {
            assert_eq!(args.bus, BusKind::Nats);
        }
        assert!(!args.verbose);
    }

    #[test]
    fn test_local_bus_flags() {
        let args = Args::try_parse_from([
            "event-handler",
            "--bus",
            "local",
            "--local-capacity",
            "10",
            "-v",
            "--json-logs",
        ])
        .unwrap();
        assert_eq!(args.bus, BusKind::Local);
        assert_eq!(args.local_capacity, 10);
        assert!(args.verbose);
        assert!(args.json_output());
    }
}
