// Recurring-donation setup: three sequential gateway calls followed by a
// local save.
//
// Order matters and matches the gateway's expectations: the plan and the
// customer must both exist before the subscription can reference them. There
// is deliberately no compensation on partial failure; a failed step leaves
// earlier gateway objects in place and nothing is persisted locally.

use anyhow::{Context, Result};
use tracing::info;

use crate::gateway::{GatewayClient, GATEWAY_ID};
use crate::money::{Money, PaymentInterval};
use crate::store::Store;

// ---------------------------------------------------------------------------
// Input records
// ---------------------------------------------------------------------------

/// The person setting up the recurring donation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Donor {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
}

/// The campaign the donation funds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Campaign {
    pub id: i64,
    pub name: String,
}

// ---------------------------------------------------------------------------
// Output records
// ---------------------------------------------------------------------------

/// The locally persisted subscription row (without database-generated
/// columns).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionRecord {
    pub donor_id: i64,
    pub campaign_id: i64,
    pub payment_gateway: String,
    pub gateway_subscription_id: String,
    pub amount: i64,
    pub currency: String,
    pub payment_interval: String,
}

/// Result of a successful subscription setup: the persisted record plus the
/// checkout URL the donor must visit to enter payment details (when the
/// gateway provides one).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionOutcome {
    pub record: SubscriptionRecord,
    pub redirect_url: Option<String>,
}

// ---------------------------------------------------------------------------
// The flow
// ---------------------------------------------------------------------------

/// Set up a recurring donation: create the plan, register the donor as a
/// gateway customer, bind the two into a subscription, then record the
/// result locally.
pub async fn subscribe(
    client: &GatewayClient,
    store: &Store,
    donor: &Donor,
    campaign: &Campaign,
    money: &Money,
    interval: &PaymentInterval,
) -> Result<SubscriptionOutcome> {
    let plan_id = client
        .create_plan(money, campaign, interval)
        .await
        .context("failed to create billing plan")?;
    info!(%plan_id, campaign = %campaign.name, "billing plan created");

    let customer_id = client
        .create_customer(donor)
        .await
        .context("failed to create gateway customer")?;
    info!(%customer_id, donor_id = donor.id, "gateway customer created");

    let created = client
        .create_subscription(&customer_id, &plan_id)
        .await
        .context("failed to create subscription")?;
    info!(
        subscription_id = %created.id,
        state = created.state.as_deref().unwrap_or("unknown"),
        "gateway subscription created"
    );

    let record = SubscriptionRecord {
        donor_id: donor.id,
        campaign_id: campaign.id,
        payment_gateway: GATEWAY_ID.to_string(),
        gateway_subscription_id: created.id,
        amount: money.minor_units(),
        currency: money.currency().to_string(),
        payment_interval: interval.as_str().to_string(),
    };

    store
        .record_subscription(&record)
        .context("failed to record subscription locally")?;

    Ok(SubscriptionOutcome {
        record,
        redirect_url: created.redirect_url,
    })
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
