/// Assembly and verification of static Pix "copy and paste" payloads.
///
/// A payload is a fixed sequence of EMV fields followed by a CRC field whose
/// checksum covers everything before it, including the CRC field's own
/// header `6304`.

use rust_decimal::{Decimal, RoundingStrategy};
use tracing::{debug, warn};

use std::fmt;
use std::str::FromStr;

use crate::crc;
use crate::emv::{parse_fields, serialize_fields, PixField};
use crate::error::PixError;
use crate::tables::*;


/// A finished payload. Only produced by [`encode`] or by successfully
/// parsing an existing payload, so it always carries a valid checksum.
#[derive(Clone,Eq,PartialEq,Debug)]
pub struct PixPayload {
    text: String,
    fields: Vec<PixField>,
}

/// Build the payload for a static Pix charge.
///
/// `key` is trimmed and must not be empty. `amount` must be positive and is
/// written with exactly two fraction digits (half-even rounding). The
/// merchant name and city are trimmed, upper-cased and cut to 25 and 15
/// characters; `txid` is cut to 25 and `description` to 20 characters. An
/// empty description leaves its sub-field out.
pub fn encode(key: &str,
              txid: &str,
              amount: Decimal,
              merchant_name: &str,
              merchant_city: &str,
              description: &str) -> Result<PixPayload, PixError> {
    let key = key.trim();
    if key.is_empty() {
        return Err(PixError::invalid("Pix key must not be empty"));
    }
    let amount_text = format_amount(amount)?;

    let mut account_info = vec![
        PixField::new(ID_GUI, PIX_GUI)?,
        PixField::new(ID_KEY, key)?,
    ];
    if !description.is_empty() {
        account_info.push(PixField::new(ID_DESCRIPTION, truncate(description, DESCRIPTION_LIMIT))?);
    }
    let additional_data = [PixField::new(ID_TXID, truncate(txid, TXID_LIMIT))?];

    let mut fields = vec![
        PixField::new(ID_PAYLOAD_FORMAT, PAYLOAD_FORMAT_INDICATOR)?,
        PixField::new(ID_POINT_OF_INITIATION, STATIC_INITIATION)?,
        PixField::template(ID_MERCHANT_ACCOUNT, &account_info)?,
        PixField::new(ID_MERCHANT_CATEGORY, MERCHANT_CATEGORY_CODE)?,
        PixField::new(ID_CURRENCY, CURRENCY_BRL)?,
        PixField::new(ID_AMOUNT, amount_text)?,
        PixField::new(ID_COUNTRY, COUNTRY_CODE)?,
        PixField::new(ID_MERCHANT_NAME, sanitize(merchant_name, MERCHANT_NAME_LIMIT))?,
        PixField::new(ID_MERCHANT_CITY, sanitize(merchant_city, MERCHANT_CITY_LIMIT))?,
        PixField::template(ID_ADDITIONAL_DATA, &additional_data)?,
    ];

    let mut text = serialize_fields(&fields);
    text.push_str(CRC_FIELD_HEADER);
    let checksum = crc::checksum_hex(&text);
    text.push_str(&checksum);
    fields.push(PixField::new(ID_CRC, checksum)?);

    debug!(length = text.len(), txid = additional_data[0].value(), "encoded pix payload");
    Ok(PixPayload { text, fields })
}

/// Render a positive amount with exactly two fraction digits
fn format_amount(amount: Decimal) -> Result<String, PixError> {
    if amount <= Decimal::ZERO {
        return Err(PixError::invalid(format!("amount must be positive, got {}", amount)));
    }
    let mut rounded = amount.round_dp_with_strategy(AMOUNT_DECIMAL_PLACES, RoundingStrategy::MidpointNearestEven);
    if rounded.is_zero() {
        return Err(PixError::invalid(format!("amount {} rounds to zero", amount)));
    }
    rounded.rescale(AMOUNT_DECIMAL_PLACES);
    // rescale leaves the scale short when the mantissa has no room left
    if rounded.scale() != AMOUNT_DECIMAL_PLACES {
        return Err(PixError::invalid(format!("amount {} is too large to write with two decimals", amount)));
    }
    Ok(rounded.to_string())
}

fn truncate(value: &str, limit: usize) -> String {
    value.chars().take(limit).collect()
}

/// Trim, upper-case, then cut to `limit` characters. Accented characters are
/// kept as they are.
fn sanitize(value: &str, limit: usize) -> String {
    let upper = value.trim().to_uppercase();
    if !upper.is_ascii() {
        warn!(value = %upper, "merchant field contains non-ASCII characters, some Pix readers may reject it");
    }
    let sanitized = truncate(&upper, limit);
    if sanitized.len() < upper.len() {
        warn!(from = %upper, to = %sanitized, "merchant field truncated");
    }
    sanitized
}

//-------------------------------------------------------------------------------------------------

impl PixPayload {
    /// Check an existing payload string: well formed fields all the way to
    /// the end, a trailing `63` field of four hex digits, and a checksum that
    /// matches the preceding text.
    pub fn parse(text: &str) -> Result<PixPayload, PixError> {
        if text.is_empty() {
            return Err(PixError::malformed("payload is empty"));
        }
        let fields = parse_fields(text)?;
        let crc_field = match fields.last() {
            Some(f) if f.tag() == ID_CRC
                && f.len() == CRC_HEX_DIGITS
                && f.value().bytes().all(|b| b.is_ascii_hexdigit()) => f,
            _ => return Err(PixError::malformed("payload does not end with a CRC field")),
        };
        let covered = &text[..text.len() - CRC_HEX_DIGITS];
        let expected = crc::checksum_hex(covered);
        if !crc_field.value().eq_ignore_ascii_case(&expected) {
            return Err(PixError::malformed(format!(
                "checksum mismatch, payload carries {} but content hashes to {}", crc_field.value(), expected)));
        }
        Ok(PixPayload { text: text.to_string(), fields })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }

    /// Top level fields, in payload order, the CRC field last
    pub fn fields(&self) -> &[PixField] {
        &self.fields
    }

    pub fn field(&self, tag: &str) -> Option<&PixField> {
        self.fields.iter().find(|f| f.tag() == tag)
    }

    /// The amount exactly as written in the payload
    pub fn amount(&self) -> Option<&str> {
        self.field(ID_AMOUNT).map(PixField::value)
    }

    pub fn merchant_name(&self) -> Option<&str> {
        self.field(ID_MERCHANT_NAME).map(PixField::value)
    }

    pub fn merchant_city(&self) -> Option<&str> {
        self.field(ID_MERCHANT_CITY).map(PixField::value)
    }

    /// Pix key from the merchant account template
    pub fn key(&self) -> Option<String> {
        self.sub_field(ID_MERCHANT_ACCOUNT, ID_KEY)
    }

    /// Transaction id from the additional data template
    pub fn txid(&self) -> Option<String> {
        self.sub_field(ID_ADDITIONAL_DATA, ID_TXID)
    }

    pub fn checksum(&self) -> &str {
        &self.text[self.text.len() - CRC_HEX_DIGITS..]
    }

    fn sub_field(&self, template: &str, tag: &str) -> Option<String> {
        self.field(template)?
            .children()
            .ok()?
            .into_iter()
            .find(|f| f.tag() == tag)
            .map(|f| f.value().to_string())
    }
}

impl fmt::Display for PixPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl AsRef<str> for PixPayload {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

impl FromStr for PixPayload {
    type Err = PixError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PixPayload::parse(s)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_amount_formatting() {
        assert_eq!(format_amount(dec("35")).unwrap(), "35.00");
        assert_eq!(format_amount(dec("35.00")).unwrap(), "35.00");
        assert_eq!(format_amount(dec("10.5")).unwrap(), "10.50");
        assert_eq!(format_amount(dec("1234.567")).unwrap(), "1234.57");
        assert_eq!(format_amount(dec("0.01")).unwrap(), "0.01");
        assert_eq!(format_amount(dec("12345678901234567890123456.789")).unwrap(),
                   "12345678901234567890123456.79");
    }

    #[test]
    fn test_amount_without_room_for_decimals() {
        assert!(matches!(format_amount(Decimal::MAX), Err(PixError::InvalidInput(_))));
        assert!(matches!(encode("k", "T", Decimal::MAX, "N", "C", ""), Err(PixError::InvalidInput(_))));
    }

    #[test]
    fn test_amount_rounds_half_even() {
        assert_eq!(format_amount(dec("0.125")).unwrap(), "0.12");
        assert_eq!(format_amount(dec("0.135")).unwrap(), "0.14");
        assert_eq!(format_amount(dec("2.675")).unwrap(), "2.68");
    }

    #[test]
    fn test_amount_must_be_positive() {
        assert!(matches!(format_amount(dec("0")), Err(PixError::InvalidInput(_))));
        assert!(matches!(format_amount(dec("-1.00")), Err(PixError::InvalidInput(_))));
        assert!(matches!(format_amount(dec("0.004")), Err(PixError::InvalidInput(_))));
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize("  SelvaCore Studios ", 25), "SELVACORE STUDIOS");
        assert_eq!(sanitize("Sao Jose dos Campos", 15), "SAO JOSE DOS CA");
        assert_eq!(sanitize("São Paulo", 15), "SÃO PAULO");
        assert_eq!(sanitize("", 15), "");
    }

    #[test]
    fn test_truncate_counts_characters() {
        assert_eq!(truncate("ÁÉÍÓÚ", 3), "ÁÉÍ");
        assert_eq!(truncate("abc", 25), "abc");
    }

    #[test]
    fn test_description_sub_field() {
        let without = encode("k", "T1", dec("1"), "N", "C", "").unwrap();
        assert!(!without.as_str().contains("BR.GOV.BCB.PIX0101k02"));
        let with = encode("k", "T1", dec("1"), "N", "C", "Apoio comunitario da SelvaCore").unwrap();
        assert!(with.as_str().contains("0101k0220Apoio comunitario da"));
    }

    #[test]
    fn test_accessors() {
        let payload = encode(" chave@exemplo.com ", "TX-0001", dec("10.5"), "SelvaCore", "Sao Paulo", "").unwrap();
        assert_eq!(payload.key().as_deref(), Some("chave@exemplo.com"));
        assert_eq!(payload.txid().as_deref(), Some("TX-0001"));
        assert_eq!(payload.amount(), Some("10.50"));
        assert_eq!(payload.merchant_name(), Some("SELVACORE"));
        assert_eq!(payload.merchant_city(), Some("SAO PAULO"));
        assert_eq!(payload.fields().last().unwrap().tag(), "63");
        assert_eq!(payload.checksum(), payload.fields().last().unwrap().value());
    }

    #[test]
    fn test_key_too_long_overflows() {
        // 18 characters of GUI field + 4 characters of key header leave room for 77
        assert!(encode(&"k".repeat(77), "T", dec("1"), "N", "C", "").is_ok());
        assert!(matches!(
            encode(&"k".repeat(78), "T", dec("1"), "N", "C", ""),
            Err(PixError::EncodingOverflow { .. })));
    }

    #[test]
    fn test_parse_accepts_encoded() {
        let payload = encode("chave", "ABC", dec("5"), "Loja", "Recife", "doacao").unwrap();
        let parsed: PixPayload = payload.as_str().parse().unwrap();
        assert_eq!(parsed, payload);
    }

    #[test]
    fn test_parse_rejects_tampering() {
        let payload = encode("chave", "ABC", dec("5"), "Loja", "Recife", "").unwrap();
        let tampered = payload.as_str().replace("5.00", "9.00");
        assert!(matches!(PixPayload::parse(&tampered), Err(PixError::MalformedPayload(_))));

        let without_crc = &payload.as_str()[..payload.as_str().len() - 8];
        assert!(PixPayload::parse(without_crc).is_err());
        assert!(PixPayload::parse("").is_err());
    }
}
