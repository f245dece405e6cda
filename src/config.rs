/// Merchant settings consumed by the payload encoder. Either built explicitly
/// at the call site or loaded from `PIX_*` environment variables.
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::debug;

use crate::error::PixError;
use crate::payload::{encode, PixPayload};


const ENV_PREFIX: &str = "PIX";

#[derive(Clone,Eq,PartialEq,Debug,Deserialize)]
pub struct MerchantConfig {
    /// Pix receiving key. Empty means Pix is not set up.
    #[serde(default)]
    pub key: String,
    #[serde(default = "default_merchant_name")]
    pub merchant_name: String,
    #[serde(default = "default_merchant_city")]
    pub merchant_city: String,
    #[serde(default = "default_description")]
    pub description: String,
    /// A precomputed payload shown instead of an encoded one
    #[serde(default)]
    pub static_payload: Option<String>,
    /// Txid shown to donors alongside a static payload
    #[serde(default)]
    pub static_txid: Option<String>,
}

fn default_merchant_name() -> String {
    "SelvaCore Studios".to_string()
}

fn default_merchant_city() -> String {
    "SAO PAULO".to_string()
}

fn default_description() -> String {
    "SelvaCore Community".to_string()
}

impl Default for MerchantConfig {
    fn default() -> Self {
        MerchantConfig {
            key: String::new(),
            merchant_name: default_merchant_name(),
            merchant_city: default_merchant_city(),
            description: default_description(),
            static_payload: None,
            static_txid: None,
        }
    }
}

impl MerchantConfig {
    /// Constructor, with no description and no overrides
    pub fn new<K, N, C>(key: K, merchant_name: N, merchant_city: C) -> MerchantConfig
        where K: Into<String>, N: Into<String>, C: Into<String> {
        MerchantConfig {
            key: key.into(),
            merchant_name: merchant_name.into(),
            merchant_city: merchant_city.into(),
            description: String::new(),
            static_payload: None,
            static_txid: None,
        }
    }

    pub fn with_description<S: Into<String>>(mut self, description: S) -> MerchantConfig {
        self.description = description.into();
        self
    }

    pub fn with_static_payload<S: Into<String>>(mut self, payload: S) -> MerchantConfig {
        self.static_payload = Some(payload.into());
        self
    }

    pub fn with_static_txid<S: Into<String>>(mut self, txid: S) -> MerchantConfig {
        self.static_txid = Some(txid.into());
        self
    }

    /// Load from `PIX_KEY`, `PIX_MERCHANT_NAME`, `PIX_MERCHANT_CITY`,
    /// `PIX_DESCRIPTION`, `PIX_STATIC_PAYLOAD` and `PIX_STATIC_TXID`
    pub fn load() -> Result<MerchantConfig, PixError> {
        let source = config::Config::builder()
            .add_source(config::Environment::with_prefix(ENV_PREFIX))
            .build()?;
        MerchantConfig::from_config(source)
    }

    pub fn from_config(source: config::Config) -> Result<MerchantConfig, PixError> {
        let merchant: MerchantConfig = source.try_deserialize()?;
        debug!(configured = merchant.is_configured(),
               static_payload = merchant.static_payload().is_some(),
               "loaded merchant config");
        Ok(merchant)
    }

    /// Whether a Pix key is set
    pub fn is_configured(&self) -> bool {
        !self.key.trim().is_empty()
    }

    /// The static payload override, if one is set and not blank
    pub fn static_payload(&self) -> Option<&str> {
        non_blank(self.static_payload.as_deref())
    }

    pub fn static_txid(&self) -> Option<&str> {
        non_blank(self.static_txid.as_deref())
    }

    /// Encode a payload for this merchant. Static overrides are not
    /// consulted here; see [`crate::donation::PledgeQr`].
    pub fn encode(&self, txid: &str, amount: Decimal) -> Result<PixPayload, PixError> {
        encode(&self.key, txid, amount, &self.merchant_name, &self.merchant_city, &self.description)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}
