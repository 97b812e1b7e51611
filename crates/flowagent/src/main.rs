//! flowagentd - Reactive forwarding agent entry point.

use clap::Parser;
use flowctl_agent::{FlowDaemonConfig, L2SwitchConfig};
use flowctl_types::EtherType;
use log::info;
use std::process::ExitCode;

/// Reactive forwarding agent
#[derive(Parser, Debug)]
#[command(name = "flowagentd")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Idle timeout for reactively installed rules, in seconds
    #[arg(short = 't', long, default_value = "10")]
    flow_timeout: u32,

    /// Capacity of the inbound packet channel
    #[arg(long, default_value = "1024")]
    channel_capacity: usize,

    /// Interval between debug state dumps in milliseconds
    #[arg(long, default_value = "1000")]
    heartbeat_interval: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&args.log_level))
        .init();

    info!("--- Starting flowagentd ---");
    info!("Flow timeout: {}s", args.flow_timeout);
    info!("Packet channel capacity: {}", args.channel_capacity);
    info!("Heartbeat interval: {}ms", args.heartbeat_interval);

    let l2_config = L2SwitchConfig {
        flow_timeout_secs: args.flow_timeout,
        ether_types: vec![EtherType::IPV4, EtherType::ARP],
        ..L2SwitchConfig::default()
    };
    let daemon_config = FlowDaemonConfig {
        channel_capacity: args.channel_capacity,
        heartbeat_interval_ms: args.heartbeat_interval,
    };
    info!(
        "Reacting to ether types: {:?}",
        l2_config
            .ether_types
            .iter()
            .map(|t| t.to_string())
            .collect::<Vec<_>>()
    );
    info!("Daemon config: {:?}", daemon_config);

    // The southbound transport provides the RuleInstaller and
    // HostDirectory handles and feeds the packet channel; until it is
    // wired in, the agent only demonstrates its configuration.
    info!("flowagentd initialization complete (placeholder mode)");
    info!("Full startup pending southbound transport integration");

    ExitCode::SUCCESS
}
