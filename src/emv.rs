/// Tag/length/value fields of the EMV merchant-presented QR format. A field
/// serializes as its two digit tag, a two digit length counted in characters,
/// then the value itself. Templates are fields whose value is another run of
/// fields.

use itertools::Itertools;

use std::fmt;

use crate::error::PixError;
use crate::tables::MAX_VALUE_LENGTH;


#[derive(Clone,Hash,Eq,PartialEq,Debug)]
pub struct PixField {
    tag: String,
    value: String,
}

impl PixField {
    /// Create a field, rejecting tags that are not exactly two ASCII digits and
    /// values whose length would not fit the two digit prefix.
    pub fn new<S: Into<String>>(tag: &str, value: S) -> Result<PixField, PixError> {
        if !is_valid_tag(tag) {
            return Err(PixError::invalid(format!("field tag {:?} is not two digits", tag)));
        }
        let value = value.into();
        let length = value.chars().count();
        if length > MAX_VALUE_LENGTH {
            return Err(PixError::EncodingOverflow { tag: tag.to_string(), length });
        }
        Ok(PixField { tag: tag.to_string(), value })
    }

    /// Create a template field whose value is the serialization of `children`
    pub fn template(tag: &str, children: &[PixField]) -> Result<PixField, PixError> {
        PixField::new(tag, serialize_fields(children))
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Length of the value in characters, i.e. what the prefix declares
    pub fn len(&self) -> usize {
        self.value.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Read the value of a template field back as fields
    pub fn children(&self) -> Result<Vec<PixField>, PixError> {
        parse_fields(&self.value)
    }
}

impl fmt::Display for PixField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:02}{}", self.tag, self.len(), self.value)
    }
}

fn is_valid_tag(tag: &str) -> bool {
    tag.len() == 2 && tag.bytes().all(|b| b.is_ascii_digit())
}

//-------------------------------------------------------------------------------------------------

/// Concatenate the serialized fields, in order, with no separators
pub fn serialize_fields(fields: &[PixField]) -> String {
    fields.iter().join("")
}

/// Split a run of serialized fields back into fields. Fails if a header is
/// cut short, is not numeric, or declares more characters than remain.
pub fn parse_fields(input: &str) -> Result<Vec<PixField>, PixError> {
    let mut fields = Vec::new();
    let mut rest = input;
    while !rest.is_empty() {
        let header = match rest.get(..4) {
            Some(h) if h.bytes().all(|b| b.is_ascii_digit()) => h,
            _ => return Err(PixError::malformed(format!("bad field header at {:?}", truncate_for_error(rest)))),
        };
        let tag = &header[..2];
        // both digits checked above
        let length: usize = header[2..].parse().map_err(|_| PixError::malformed("bad length prefix"))?;
        rest = &rest[4..];

        let value: String = rest.chars().take(length).collect();
        if value.chars().count() != length {
            return Err(PixError::malformed(format!(
                "field {} declares {} characters but only {} remain", tag, length, value.chars().count())));
        }
        rest = &rest[value.len()..];
        fields.push(PixField { tag: tag.to_string(), value });
    }
    Ok(fields)
}

fn truncate_for_error(s: &str) -> String {
    s.chars().take(8).collect()
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_serialization() {
        let field = PixField::new("00", "01").unwrap();
        assert_eq!(field.to_string(), "000201");
        let field = PixField::new("53", "986").unwrap();
        assert_eq!(field.to_string(), "5303986");
    }

    #[test]
    fn test_empty_value() {
        let field = PixField::new("05", "").unwrap();
        assert!(field.is_empty());
        assert_eq!(field.to_string(), "0500");
    }

    #[test]
    fn test_length_counts_characters() {
        let field = PixField::new("60", "SÃO PAULO").unwrap();
        assert_eq!(field.len(), 9);
        assert_eq!(field.to_string(), "6009SÃO PAULO");
    }

    #[test]
    fn test_length_limit() {
        assert!(PixField::new("59", "X".repeat(99)).is_ok());
        match PixField::new("59", "X".repeat(100)) {
            Err(PixError::EncodingOverflow { tag, length }) => {
                assert_eq!(tag, "59");
                assert_eq!(length, 100);
            },
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_bad_tags() {
        for tag in &["", "1", "123", "A1", "٣٣"] {
            assert!(matches!(PixField::new(tag, "x"), Err(PixError::InvalidInput(_))), "tag {:?}", tag);
        }
    }

    #[test]
    fn test_template() {
        let children = [
            PixField::new("00", "BR.GOV.BCB.PIX").unwrap(),
            PixField::new("01", "chave@exemplo.com").unwrap(),
        ];
        let template = PixField::template("26", &children).unwrap();
        assert_eq!(template.to_string(), "26390014BR.GOV.BCB.PIX0117chave@exemplo.com");
        assert_eq!(template.children().unwrap(), children.to_vec());
    }

    #[test]
    fn test_parse_fields() {
        let fields = parse_fields("000201010212").unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].tag(), "00");
        assert_eq!(fields[0].value(), "01");
        assert_eq!(fields[1].tag(), "01");
        assert_eq!(fields[1].value(), "12");
        assert!(parse_fields("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_rejects_broken_runs() {
        assert!(parse_fields("000").is_err());             // short header
        assert!(parse_fields("00AB01").is_err());          // non numeric length
        assert!(parse_fields("000501").is_err());          // declared 5, only 2 remain
        assert!(parse_fields("0002010").is_err());         // trailing garbage
    }
}
