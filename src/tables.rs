/// Contains the fixed reference data needed to assemble or check a Pix
/// "copy and paste" payload: field ids, the literal values of the fixed
/// fields, truncation limits and the parameters of the checksum.

use image::Luma;

// FIELD IDS (top level)
pub const ID_PAYLOAD_FORMAT: &str = "00";
pub const ID_POINT_OF_INITIATION: &str = "01";
pub const ID_MERCHANT_ACCOUNT: &str = "26";
pub const ID_MERCHANT_CATEGORY: &str = "52";
pub const ID_CURRENCY: &str = "53";
pub const ID_AMOUNT: &str = "54";
pub const ID_COUNTRY: &str = "58";
pub const ID_MERCHANT_NAME: &str = "59";
pub const ID_MERCHANT_CITY: &str = "60";
pub const ID_ADDITIONAL_DATA: &str = "62";
pub const ID_CRC: &str = "63";

// FIELD IDS (inside the merchant account template, tag 26)
pub const ID_GUI: &str = "00";
pub const ID_KEY: &str = "01";
pub const ID_DESCRIPTION: &str = "02";

// FIELD IDS (inside the additional data template, tag 62)
pub const ID_TXID: &str = "05";

// FIXED VALUES
pub const PAYLOAD_FORMAT_INDICATOR: &str = "01";
pub const STATIC_INITIATION: &str = "12";       // reusable payload
pub const PIX_GUI: &str = "BR.GOV.BCB.PIX";
pub const MERCHANT_CATEGORY_CODE: &str = "0000";
pub const CURRENCY_BRL: &str = "986";           // ISO 4217 numeric
pub const COUNTRY_CODE: &str = "BR";

/// Tag and length of the checksum field. Appended before the checksum is
/// computed, so the checksum covers its own header.
pub const CRC_FIELD_HEADER: &str = "6304";
pub const CRC_HEX_DIGITS: usize = 4;

// LIMITS (in characters)
pub const MERCHANT_NAME_LIMIT: usize = 25;
pub const MERCHANT_CITY_LIMIT: usize = 15;
pub const DESCRIPTION_LIMIT: usize = 20;
pub const TXID_LIMIT: usize = 25;
pub const MAX_VALUE_LENGTH: usize = 99;         // a length prefix has two digits

pub const AMOUNT_DECIMAL_PLACES: u32 = 2;

// CRC-16/CCITT-FALSE
pub const CRC_POLYNOMIAL: u16 = 0x1021;
pub const CRC_INITIAL: u16 = 0xFFFF;

// RENDERING
pub const DEFAULT_MODULE_SIZE: u32 = 10;
pub const BIT_WHITE: Luma<u8> = Luma([255u8]);
pub const BIT_BLACK: Luma<u8> = Luma([0u8]);
pub const PNG_MIME: &str = "image/png";
