//! Static Pix payloads and their QR codes.
//!
//! [`encode`] assembles the EMV "copy and paste" text with its CRC-16
//! trailer, [`render`] turns any payload into a base64 PNG. Both are pure
//! functions of their arguments.

pub use crate::config::MerchantConfig;
pub use crate::donation::{DonationPledge, PixStatus, PledgeQr};
pub use crate::emv::PixField;
pub use crate::error::PixError;
pub use crate::payload::{encode, PixPayload};
pub use crate::render::{render, QrRenderer};

pub mod config;
pub mod crc;
pub mod donation;
pub mod emv;
pub mod error;
pub mod payload;
pub mod render;
pub mod tables;


/// Encode a payload and render it in one go. Returns `(payload, base64_png)`:
/// the encoded payload first, then the base64 text of its PNG QR code.
pub fn create_pix_qr_code(merchant: &MerchantConfig,
                          txid: &str,
                          amount: rust_decimal::Decimal) -> Result<(PixPayload, String), PixError> {
    let payload = merchant.encode(txid, amount)?;
    let image = render(payload.as_str())?;
    Ok((payload, image))
}
