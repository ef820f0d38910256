// bePaid subscriptions API client.
//
// Drives the three endpoints needed to set up a recurring donation:
// POST /plans, POST /customers, POST /subscriptions. Every call carries
// HTTP basic auth with the shop id/key pair and a JSON body; responses are
// parsed leniently since only the object ids matter downstream.

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::GatewayError;
use crate::config::Config;
use crate::flow::{Campaign, Donor};
use crate::money::{Money, PaymentInterval};

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct CustomerRequest<'a> {
    test: bool,
    first_name: &'a str,
    last_name: &'a str,
    email: &'a str,
    phone: &'a str,
    country: &'a str,
    ip: &'a str,
    city: &'a str,
    address: &'a str,
    zip: &'a str,
}

#[derive(Debug, Serialize)]
struct PlanRequest<'a> {
    test: bool,
    title: String,
    currency: &'a str,
    plan: PlanBody,
    language: &'a str,
    infinite: bool,
}

#[derive(Debug, Serialize)]
struct PlanBody {
    amount: i64,
    interval: u32,
    interval_unit: &'static str,
}

#[derive(Debug, Serialize)]
struct SubscriptionRequest<'a> {
    customer: IdRef<'a>,
    plan: IdRef<'a>,
    return_url: &'a str,
    settings: SubscriptionSettings<'a>,
}

#[derive(Debug, Serialize)]
struct IdRef<'a> {
    id: &'a str,
}

#[derive(Debug, Serialize)]
struct SubscriptionSettings<'a> {
    language: &'a str,
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// The parts of a `POST /subscriptions` reply the flow cares about. The
/// donor completes checkout at `redirect_url` when the gateway provides one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionCreated {
    pub id: String,
    pub state: Option<String>,
    pub redirect_url: Option<String>,
}

// ---------------------------------------------------------------------------
// BePaidClient
// ---------------------------------------------------------------------------

/// Low-level client for the bePaid subscriptions API.
pub struct BePaidClient {
    http: reqwest::Client,
    base_url: String,
    shop_id: String,
    shop_key: String,
    live: bool,
    country: String,
    language: String,
    return_url: String,
    placeholder: String,
}

impl BePaidClient {
    /// Create a client from explicit parts. Tests point `base_url` at a
    /// local mock server; production code goes through `from_config`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        base_url: String,
        shop_id: String,
        shop_key: String,
        live: bool,
        country: String,
        language: String,
        return_url: String,
        placeholder: String,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            shop_id,
            shop_key,
            live,
            country,
            language,
            return_url,
            placeholder,
        }
    }

    fn from_config(config: &Config, shop_id: &str, shop_key: &str) -> Self {
        Self::new(
            config.gateway.base_url.clone(),
            shop_id.to_string(),
            shop_key.to_string(),
            config.gateway.live,
            config.gateway.country.clone(),
            config.gateway.language.clone(),
            config.gateway.return_url.clone(),
            config.placeholder.clone(),
        )
    }

    /// Create a billing plan for `money` charged every `interval` months.
    /// Returns the gateway's plan id.
    pub async fn create_plan(
        &self,
        money: &Money,
        campaign: &Campaign,
        interval: &PaymentInterval,
    ) -> Result<String, GatewayError> {
        let body = PlanRequest {
            test: !self.live,
            title: plan_title(money, campaign),
            currency: money.currency().as_str(),
            plan: PlanBody {
                amount: money.minor_units(),
                interval: interval.months(),
                interval_unit: "month",
            },
            language: &self.language,
            infinite: true,
        };

        let response = self.post_json("/plans", &body).await?;
        extract_id(&response)
            .ok_or_else(|| GatewayError::MalformedResponse {
                context: "/plans reply has no `id`".to_string(),
            })
    }

    /// Register the donor as a gateway customer. Returns the customer id.
    pub async fn create_customer(&self, donor: &Donor) -> Result<String, GatewayError> {
        let body = CustomerRequest {
            test: !self.live,
            first_name: &donor.first_name,
            last_name: &donor.last_name,
            email: &donor.email,
            phone: &donor.phone,
            country: &self.country,
            ip: &self.placeholder,
            city: &self.placeholder,
            address: &self.placeholder,
            zip: &self.placeholder,
        };

        let response = self.post_json("/customers", &body).await?;
        extract_id(&response)
            .ok_or_else(|| GatewayError::MalformedResponse {
                context: "/customers reply has no `id`".to_string(),
            })
    }

    /// Bind an existing customer to an existing plan.
    pub async fn create_subscription(
        &self,
        customer_id: &str,
        plan_id: &str,
    ) -> Result<SubscriptionCreated, GatewayError> {
        let body = SubscriptionRequest {
            customer: IdRef { id: customer_id },
            plan: IdRef { id: plan_id },
            return_url: &self.return_url,
            settings: SubscriptionSettings {
                language: &self.language,
            },
        };

        let response = self.post_json("/subscriptions", &body).await?;
        let id = extract_id(&response).ok_or_else(|| GatewayError::MalformedResponse {
            context: "/subscriptions reply has no `id`".to_string(),
        })?;

        Ok(SubscriptionCreated {
            id,
            state: extract_str(&response, "state"),
            redirect_url: extract_str(&response, "redirect_url"),
        })
    }

    async fn post_json<B: Serialize>(&self, path: &str, body: &B) -> Result<Value, GatewayError> {
        let url = format!("{}{}", self.base_url.trim_end_matches('/'), path);
        debug!(%url, "gateway request");

        let response = self
            .http
            .post(&url)
            .basic_auth(&self.shop_id, Some(&self.shop_key))
            .header("Accept", "application/json")
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        debug!(%status, "gateway response");

        if !status.is_success() {
            return Err(GatewayError::Status { status, body: text });
        }

        serde_json::from_str(&text).map_err(|_| GatewayError::MalformedResponse {
            context: format!("{path} reply is not valid JSON"),
        })
    }
}

// ---------------------------------------------------------------------------
// GatewayClient wrapper
// ---------------------------------------------------------------------------

/// High-level wrapper that is either a configured bePaid client or disabled.
pub enum GatewayClient {
    /// Shop credentials are present and the client is ready.
    Active(BePaidClient),
    /// No shop credentials configured; every call fails fast.
    Disabled,
}

impl GatewayClient {
    /// Build a `GatewayClient` from the application config.
    ///
    /// Returns `Active` only when both `shop_id` and `shop_key` are present
    /// and non-empty.
    pub fn from_config(config: &Config) -> Self {
        match (&config.credentials.shop_id, &config.credentials.shop_key) {
            (Some(id), Some(key)) if !id.is_empty() && !key.is_empty() => {
                GatewayClient::Active(BePaidClient::from_config(config, id, key))
            }
            _ => GatewayClient::Disabled,
        }
    }

    pub async fn create_plan(
        &self,
        money: &Money,
        campaign: &Campaign,
        interval: &PaymentInterval,
    ) -> Result<String, GatewayError> {
        match self {
            GatewayClient::Active(client) => client.create_plan(money, campaign, interval).await,
            GatewayClient::Disabled => Err(GatewayError::NotConfigured),
        }
    }

    pub async fn create_customer(&self, donor: &Donor) -> Result<String, GatewayError> {
        match self {
            GatewayClient::Active(client) => client.create_customer(donor).await,
            GatewayClient::Disabled => Err(GatewayError::NotConfigured),
        }
    }

    pub async fn create_subscription(
        &self,
        customer_id: &str,
        plan_id: &str,
    ) -> Result<SubscriptionCreated, GatewayError> {
        match self {
            GatewayClient::Active(client) => {
                client.create_subscription(customer_id, plan_id).await
            }
            GatewayClient::Disabled => Err(GatewayError::NotConfigured),
        }
    }
}

// ---------------------------------------------------------------------------
// JSON helpers
// ---------------------------------------------------------------------------

/// Human-readable plan title shown in the gateway's dashboard and on the
/// donor's bank statement.
pub(crate) fn plan_title(money: &Money, campaign: &Campaign) -> String {
    format!(
        "Campaign: {}, {} {}",
        campaign.name,
        money.currency(),
        money.minor_units()
    )
}

/// Extract a top-level `id` from a gateway reply. The gateway uses string
/// ids for plans and numeric ids for customers, so both are accepted.
pub(crate) fn extract_id(v: &Value) -> Option<String> {
    match v.get("id")? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Extract an optional top-level string field.
pub(crate) fn extract_str(v: &Value, key: &str) -> Option<String> {
    v.get(key)?.as_str().map(|s| s.to_string())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
