//! dvpn-cli: query a dVPN ledger node from the command line.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use dvpn_query::{JsonRpcLedgerClient, QueryConfig, VpnQueryService};
use dvpn_telemetry::{init_telemetry, TelemetryConfig};
use tracing::debug;

use dvpn_cli::{execute, Args};

async fn run(args: Args) -> Result<ExitCode> {
    let mut telemetry = TelemetryConfig::from_env();
    if args.json_logs {
        telemetry = telemetry.with_json_logs(true);
    }
    let _guard = init_telemetry(telemetry).context("failed to initialize logging")?;

    let config = args.apply_to(QueryConfig::from_env());
    config.validate().context("invalid configuration")?;
    debug!(endpoint = %config.rpc_endpoint, "Connecting to ledger node");

    let client = JsonRpcLedgerClient::new(&config).context("failed to build RPC client")?;
    let service = VpnQueryService::with_client(config, Arc::new(client));

    execute(&service, &args.command).await?.report()
}

#[tokio::main]
async fn main() -> ExitCode {
    match run(Args::parse()).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
