// Entry point: set up one recurring donation described by a request file.
//
// Startup sequence:
// 1. Initialize tracing (stderr; RUST_LOG overrides the default filter)
// 2. Load config
// 3. Open the local store
// 4. Build the gateway client
// 5. Parse the donation request file (first CLI argument)
// 6. Run the subscription flow, print the gateway subscription id

use std::path::PathBuf;

use anyhow::{bail, Context};
use tracing::info;

use subrelay::config;
use subrelay::flow;
use subrelay::gateway;
use subrelay::request;
use subrelay::store;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing
    init_tracing()?;

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    info!(
        base_url = %config.gateway.base_url,
        live = config.gateway.live,
        "config loaded"
    );

    // 3. Open the local store
    let store = store::Store::open(&config.db_path).context("failed to open database")?;
    info!("database opened at {}", config.db_path);

    // 4. Build the gateway client
    let client = gateway::GatewayClient::from_config(&config);
    match &client {
        gateway::GatewayClient::Active(_) => info!("gateway client ready"),
        gateway::GatewayClient::Disabled => {
            info!("gateway client disabled (no shop credentials)")
        }
    }

    // 5. Parse the donation request file
    let Some(request_path) = std::env::args().nth(1).map(PathBuf::from) else {
        bail!("usage: subrelay <donation-request.toml>");
    };
    let request =
        request::load_request(&request_path).context("failed to load donation request")?;
    info!(
        donor = request.donor.id,
        campaign = %request.campaign.name,
        amount = %request.money,
        interval = %request.interval,
        "donation request loaded"
    );

    // 6. Run the subscription flow
    let outcome = flow::subscribe(
        &client,
        &store,
        &request.donor,
        &request.campaign,
        &request.money,
        &request.interval,
    )
    .await
    .context("subscription setup failed")?;

    println!(
        "subscription {} recorded for campaign {}",
        outcome.record.gateway_subscription_id, outcome.record.campaign_id
    );
    if let Some(url) = &outcome.redirect_url {
        println!("complete checkout at: {url}");
    }

    Ok(())
}

/// Initialize tracing to stderr so stdout stays clean for the final output.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("subrelay=info,warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
