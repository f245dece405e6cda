/// Donation pledges as seen by the Pix layer, and the QR data shown to a
/// donor for each of their pledges.

use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::MerchantConfig;
use crate::error::PixError;
use crate::render::QrRenderer;
use crate::tables::{AMOUNT_DECIMAL_PLACES, TXID_LIMIT};


const TXID_LENGTH: usize = 20;
const TXID_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

#[derive(Clone,Copy,Hash,Eq,PartialEq,Debug,Default,Serialize,Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PixStatus {
    #[default]
    Pending,
    AwaitingConfirmation,
    Confirmed,
    Failed,
}

impl PixStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PixStatus::Pending => "pending",
            PixStatus::AwaitingConfirmation => "awaiting_confirmation",
            PixStatus::Confirmed => "confirmed",
            PixStatus::Failed => "failed",
        }
    }

    /// No further transitions are expected once a pledge is settled
    pub fn is_final(self) -> bool {
        matches!(self, PixStatus::Confirmed | PixStatus::Failed)
    }
}

//-------------------------------------------------------------------------------------------------

#[derive(Clone,Eq,PartialEq,Debug,Serialize,Deserialize)]
pub struct DonationPledge {
    pub amount: Decimal,
    #[serde(default = "default_currency")]
    pub currency: String,
    pub pix_txid: String,
    #[serde(default)]
    pub pix_status: PixStatus,
}

fn default_currency() -> String {
    "BRL".to_string()
}

impl DonationPledge {
    /// A new pending pledge with a freshly generated txid
    pub fn new(amount: Decimal) -> Result<DonationPledge, PixError> {
        DonationPledge::with_txid(amount, generate_txid())
    }

    /// A pending pledge for a txid assigned elsewhere
    pub fn with_txid<S: Into<String>>(amount: Decimal, txid: S) -> Result<DonationPledge, PixError> {
        validate_amount(amount)?;
        Ok(DonationPledge {
            amount,
            currency: default_currency(),
            pix_txid: txid.into(),
            pix_status: PixStatus::Pending,
        })
    }
}

/// Positive, with at most two fraction digits as written
fn validate_amount(amount: Decimal) -> Result<(), PixError> {
    if amount <= Decimal::ZERO {
        return Err(PixError::invalid(format!("pledge amount must be positive, got {}", amount)));
    }
    if amount.scale() > AMOUNT_DECIMAL_PLACES {
        return Err(PixError::invalid(format!("pledge amount {} has more than two decimal places", amount)));
    }
    Ok(())
}

/// Random uppercase alphanumeric txid. Collisions are the storage layer's
/// problem, it owns uniqueness.
pub fn generate_txid() -> String {
    let mut rng = rand::thread_rng();
    (0..TXID_LENGTH)
        .map(|_| TXID_CHARSET[rng.gen_range(0..TXID_CHARSET.len())] as char)
        .collect()
}

//-------------------------------------------------------------------------------------------------

/// What a donor is shown for one pledge
#[derive(Clone,Eq,PartialEq,Debug,Serialize)]
pub struct PledgeQr {
    pub payload: String,
    /// base64 PNG
    pub qr_image: String,
    pub txid_display: String,
}

impl PledgeQr {
    /// Payload and QR image for `pledge`. A static payload override wins over
    /// encoding; with neither an override nor a key there is nothing to show.
    pub fn for_pledge(merchant: &MerchantConfig,
                      pledge: &DonationPledge) -> Result<Option<PledgeQr>, PixError> {
        PledgeQr::for_pledge_with(&QrRenderer::default(), merchant, pledge)
    }

    pub fn for_pledge_with(renderer: &QrRenderer,
                           merchant: &MerchantConfig,
                           pledge: &DonationPledge) -> Result<Option<PledgeQr>, PixError> {
        let payload = if let Some(payload) = merchant.static_payload() {
            warn!(txid = %pledge.pix_txid, "using static pix payload, encoder bypassed");
            payload.to_string()
        } else if merchant.is_configured() {
            if pledge.pix_txid.chars().count() > TXID_LIMIT {
                warn!(txid = %pledge.pix_txid, "txid longer than the payload allows, it will be cut");
            }
            merchant.encode(&pledge.pix_txid, pledge.amount)?.into_string()
        } else {
            debug!("no pix key configured, skipping qr code");
            return Ok(None);
        };

        let qr_image = renderer.render(&payload)?;
        let txid_display = merchant
            .static_txid()
            .unwrap_or(&pledge.pix_txid)
            .to_string();
        Ok(Some(PledgeQr { payload, qr_image, txid_display }))
    }
}
