// Donation request file parsing.
//
// The binary consumes a small TOML file describing one donation to set up:
// who is donating, to which campaign, how much, and how often.

use std::path::Path;

use serde::Deserialize;

use crate::config::ConfigError;
use crate::flow::{Campaign, Donor};
use crate::money::{Currency, Money, PaymentInterval};

// ---------------------------------------------------------------------------
// File structs
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RequestFile {
    donor: DonorSection,
    campaign: CampaignSection,
    donation: DonationSection,
}

#[derive(Debug, Deserialize)]
struct DonorSection {
    id: i64,
    first_name: String,
    last_name: String,
    email: String,
    phone: String,
}

#[derive(Debug, Deserialize)]
struct CampaignSection {
    id: i64,
    name: String,
}

#[derive(Debug, Deserialize)]
struct DonationSection {
    amount_minor_units: i64,
    currency: String,
    /// ISO-8601 month period, e.g. "P1M".
    interval: String,
}

// ---------------------------------------------------------------------------
// Assembled request
// ---------------------------------------------------------------------------

/// A validated donation request, ready to feed into the flow.
#[derive(Debug, Clone)]
pub struct DonationRequest {
    pub donor: Donor,
    pub campaign: Campaign,
    pub money: Money,
    pub interval: PaymentInterval,
}

/// Load and validate a donation request from a TOML file.
pub fn load_request(path: &Path) -> Result<DonationRequest, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })?;
    let file: RequestFile = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;

    let currency =
        Currency::new(&file.donation.currency).map_err(|e| ConfigError::ValidationError {
            field: "donation.currency".into(),
            message: e.to_string(),
        })?;
    let money = Money::from_minor_units(file.donation.amount_minor_units, currency).map_err(
        |e| ConfigError::ValidationError {
            field: "donation.amount_minor_units".into(),
            message: e.to_string(),
        },
    )?;
    let interval =
        PaymentInterval::parse(&file.donation.interval).map_err(|e| {
            ConfigError::ValidationError {
                field: "donation.interval".into(),
                message: e.to_string(),
            }
        })?;

    Ok(DonationRequest {
        donor: Donor {
            id: file.donor.id,
            first_name: file.donor.first_name,
            last_name: file.donor.last_name,
            email: file.donor.email,
            phone: file.donor.phone,
        },
        campaign: Campaign {
            id: file.campaign.id,
            name: file.campaign.name,
        },
        money,
        interval,
    })
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
