use std::fmt;
use std::str::FromStr;

use mongodb::bson::{doc, oid::ObjectId, Bson, Document};
use thiserror::Error;

/// Length of an ObjectId rendered as hex
const OBJECT_ID_HEX_LEN: usize = 24;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdentifierError {
    #[error("Invalid id provided")]
    Invalid(String),
}

/// Primary key of a grade record.
///
/// Path segments are accepted in exactly two shapes: the 24-character hex
/// form of an ObjectId, or a plain run of ASCII digits read as an `i64`.
/// Hex is checked first, so a 24-digit numeric string is an ObjectId.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GradeId {
    ObjectId(ObjectId),
    Integer(i64),
}

impl GradeId {
    /// Validate a raw path segment and return its canonical identifier.
    ///
    /// Digit strings that overflow `i64` are rejected rather than saturated.
    pub fn normalize(raw: &str) -> Result<Self, IdentifierError> {
        if is_object_id_hex(raw) {
            return ObjectId::parse_str(raw)
                .map(GradeId::ObjectId)
                .map_err(|_| IdentifierError::Invalid(raw.to_string()));
        }

        if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
            return raw
                .parse::<i64>()
                .map(GradeId::Integer)
                .map_err(|_| IdentifierError::Invalid(raw.to_string()));
        }

        Err(IdentifierError::Invalid(raw.to_string()))
    }

    pub fn to_bson(&self) -> Bson {
        match self {
            GradeId::ObjectId(oid) => Bson::ObjectId(*oid),
            GradeId::Integer(n) => Bson::Int64(*n),
        }
    }

    /// Exact-match filter on `_id`
    pub fn filter(&self) -> Document {
        doc! { "_id": self.to_bson() }
    }

    /// Whether a stored `_id` value refers to this identifier.
    ///
    /// Integer identifiers compare numerically against any numeric BSON type,
    /// the same way the server evaluates `{ _id: <number> }`.
    pub fn matches(&self, value: &Bson) -> bool {
        match (self, value) {
            (GradeId::ObjectId(oid), Bson::ObjectId(other)) => oid == other,
            (GradeId::Integer(n), Bson::Int32(other)) => *n == i64::from(*other),
            (GradeId::Integer(n), Bson::Int64(other)) => n == other,
            (GradeId::Integer(n), Bson::Double(other)) => {
                other.fract() == 0.0 && (*n as f64) == *other
            }
            _ => false,
        }
    }
}

fn is_object_id_hex(raw: &str) -> bool {
    raw.len() == OBJECT_ID_HEX_LEN && raw.bytes().all(|b| b.is_ascii_hexdigit())
}

impl FromStr for GradeId {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GradeId::normalize(s)
    }
}

impl fmt::Display for GradeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GradeId::ObjectId(oid) => write!(f, "{}", oid.to_hex()),
            GradeId::Integer(n) => write!(f, "{}", n),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_hex_object_ids_unchanged() {
        for raw in [
            "ffffffffffffffffffffffff",
            "507f1f77bcf86cd799439011",
            "000000000000000000000000",
        ] {
            let id = GradeId::normalize(raw).unwrap();
            assert!(matches!(id, GradeId::ObjectId(_)));
            assert_eq!(id.to_string(), raw);
        }
    }

    #[test]
    fn uppercase_hex_is_an_object_id() {
        let id = GradeId::normalize("507F1F77BCF86CD799439011").unwrap();
        assert_eq!(id.to_string(), "507f1f77bcf86cd799439011");
    }

    #[test]
    fn accepts_digit_strings_as_integers() {
        assert_eq!(GradeId::normalize("0").unwrap(), GradeId::Integer(0));
        assert_eq!(GradeId::normalize("42").unwrap(), GradeId::Integer(42));
        assert_eq!(GradeId::normalize("007").unwrap(), GradeId::Integer(7));
        assert_eq!(
            GradeId::normalize("9223372036854775807").unwrap(),
            GradeId::Integer(i64::MAX)
        );
    }

    #[test]
    fn twenty_four_digits_are_hex_shaped() {
        let id = GradeId::normalize("123456789012345678901234").unwrap();
        assert!(matches!(id, GradeId::ObjectId(_)));
    }

    #[test]
    fn rejects_everything_else() {
        for raw in ["abc", "", "12a", "-5", "+5", " 12", "1.5", "not-an-id", "fffffffffffffffffffffff"] {
            assert_eq!(
                GradeId::normalize(raw),
                Err(IdentifierError::Invalid(raw.to_string())),
                "{raw:?} should be invalid"
            );
        }
    }

    #[test]
    fn rejects_integers_that_overflow() {
        assert!(GradeId::normalize("9223372036854775808").is_err());
        assert!(GradeId::normalize("99999999999999999999").is_err());
    }

    #[test]
    fn integer_ids_match_any_numeric_type() {
        let id = GradeId::Integer(5);
        assert!(id.matches(&Bson::Int32(5)));
        assert!(id.matches(&Bson::Int64(5)));
        assert!(id.matches(&Bson::Double(5.0)));
        assert!(!id.matches(&Bson::Double(5.5)));
        assert!(!id.matches(&Bson::String("5".into())));
    }

    #[test]
    fn filter_targets_id_field() {
        let filter = GradeId::Integer(12).filter();
        assert_eq!(filter.get("_id"), Some(&Bson::Int64(12)));
    }
}
