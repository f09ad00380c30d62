//! Record types returned by the Musabaha backend
//!
//! The backend is loose about JSON types: identifiers and amounts arrive either
//! as numbers or as strings, optional text fields may be `null` or empty, and a
//! missing status means the record has not been reviewed yet. The deserializers
//! in this module normalize all of that at the boundary so the rest of the
//! workspace can work with strict types.

use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Identifier of a payment or registration record
///
/// Accepts both JSON numbers and strings; always rendered as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Create an identifier from its textual form
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Textual form of the identifier
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<u64> for RecordId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl FromStr for RecordId {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(crate::Error::validation("id", "record id must not be empty"));
        }
        Ok(Self::new(trimmed))
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Scalar::deserialize(deserializer)? {
            Scalar::Text(text) => Ok(Self(text)),
            Scalar::Number(number) => Ok(Self(number.to_string())),
            Scalar::Bool(_) => Err(serde::de::Error::custom("record id must be a number or string")),
        }
    }
}

/// Review status shared by payments and registrations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    /// Awaiting an administrator decision
    #[default]
    Pending,
    /// Accepted by an administrator
    Approved,
    /// Declined by an administrator
    Rejected,
}

impl ApprovalStatus {
    /// All statuses in display order
    pub const ALL: [Self; 3] = [Self::Pending, Self::Approved, Self::Rejected];

    /// Wire representation
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApprovalStatus {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(crate::Error::UnknownStatus {
                value: s.to_string(),
            }),
        }
    }
}

/// Key used to count distinct payers
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum UserKey {
    /// Backend user identifier
    Id(RecordId),
    /// Contact string, used when the payment has no user id
    Contact(String),
}

/// A subsequent payment submitted by an estate subscriber
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRecord {
    /// Payment identifier
    pub id: RecordId,

    /// Amount paid, in naira
    #[serde(default, deserialize_with = "lenient_amount")]
    pub amount: Decimal,

    /// Review status
    #[serde(default, deserialize_with = "status_or_pending")]
    pub status: ApprovalStatus,

    /// Payment channel (transfer, cash, ...)
    #[serde(default, deserialize_with = "lenient_text")]
    pub payment_method: Option<String>,

    /// Bank or gateway reference
    #[serde(default, deserialize_with = "lenient_text")]
    pub transaction_reference: Option<String>,

    /// Backend user identifier of the payer
    #[serde(default, deserialize_with = "lenient_id")]
    pub user_id: Option<RecordId>,

    /// Payer contact (phone or email)
    #[serde(default, deserialize_with = "lenient_text")]
    pub user_contact: Option<String>,

    /// Payer display name
    #[serde(default, deserialize_with = "lenient_text")]
    pub user_name: Option<String>,

    /// Free-form note left by the payer
    #[serde(default, deserialize_with = "lenient_text")]
    pub note: Option<String>,

    /// Uploaded receipt file name
    #[serde(default, deserialize_with = "lenient_text")]
    pub receipt_file: Option<String>,

    /// Submission time
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

impl PaymentRecord {
    /// Create a pending payment with only the required fields set
    pub fn new(id: impl Into<RecordId>, amount: Decimal) -> Self {
        Self {
            id: id.into(),
            amount,
            status: ApprovalStatus::Pending,
            payment_method: None,
            transaction_reference: None,
            user_id: None,
            user_contact: None,
            user_name: None,
            note: None,
            receipt_file: None,
            created_at: None,
        }
    }

    /// Key identifying the payer, preferring the user id over the contact
    #[must_use]
    pub fn user_key(&self) -> Option<UserKey> {
        self.user_id.clone().map(UserKey::Id).or_else(|| {
            self.user_contact
                .as_ref()
                .map(|contact| UserKey::Contact(contact.clone()))
        })
    }
}

/// Uploaded document attached to a registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    /// Passport photograph
    PassportPhoto,
    /// Government identification
    Identification,
    /// Proof of address
    UtilityBill,
    /// Signature specimen
    Signature,
}

impl DocumentKind {
    /// All document kinds in display order
    pub const ALL: [Self; 4] = [
        Self::PassportPhoto,
        Self::Identification,
        Self::UtilityBill,
        Self::Signature,
    ];

    /// Human-readable label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::PassportPhoto => "Passport Photo",
            Self::Identification => "Identification",
            Self::UtilityBill => "Utility Bill",
            Self::Signature => "Signature",
        }
    }

    /// JSON field holding the stored path
    #[must_use]
    pub const fn field(self) -> &'static str {
        match self {
            Self::PassportPhoto => "passport_photo",
            Self::Identification => "identification_file",
            Self::UtilityBill => "utility_bill_file",
            Self::Signature => "signature_file",
        }
    }
}

/// An estate subscription registration awaiting review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRegistration {
    /// Registration identifier
    pub id: RecordId,

    /// Applicant name
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: Option<String>,

    /// Applicant email
    #[serde(default, deserialize_with = "lenient_text")]
    pub email: Option<String>,

    /// Applicant phone number
    #[serde(default, deserialize_with = "lenient_text")]
    pub telephone: Option<String>,

    /// Applicant occupation
    #[serde(default, deserialize_with = "lenient_text")]
    pub occupation: Option<String>,

    /// Estate the applicant subscribed to
    #[serde(default, deserialize_with = "lenient_text")]
    pub estate_name: Option<String>,

    /// Number of plots requested
    #[serde(default, deserialize_with = "lenient_count")]
    pub number_of_plots: u32,

    /// Review status
    #[serde(default, deserialize_with = "status_or_pending")]
    pub status: ApprovalStatus,

    /// Stored passport photo path
    #[serde(default, deserialize_with = "lenient_text")]
    pub passport_photo: Option<String>,

    /// Stored identification path
    #[serde(default, deserialize_with = "lenient_text")]
    pub identification_file: Option<String>,

    /// Stored utility bill path
    #[serde(default, deserialize_with = "lenient_text")]
    pub utility_bill_file: Option<String>,

    /// Stored signature path
    #[serde(default, deserialize_with = "lenient_text")]
    pub signature_file: Option<String>,

    /// Any additional fields the backend returned
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl UserRegistration {
    /// Create a pending registration with only the id set
    pub fn new(id: impl Into<RecordId>) -> Self {
        Self {
            id: id.into(),
            name: None,
            email: None,
            telephone: None,
            occupation: None,
            estate_name: None,
            number_of_plots: 0,
            status: ApprovalStatus::Pending,
            passport_photo: None,
            identification_file: None,
            utility_bill_file: None,
            signature_file: None,
            extra: BTreeMap::new(),
        }
    }

    /// Stored path for a document kind, if uploaded
    #[must_use]
    pub fn document(&self, kind: DocumentKind) -> Option<&str> {
        match kind {
            DocumentKind::PassportPhoto => self.passport_photo.as_deref(),
            DocumentKind::Identification => self.identification_file.as_deref(),
            DocumentKind::UtilityBill => self.utility_bill_file.as_deref(),
            DocumentKind::Signature => self.signature_file.as_deref(),
        }
    }

    /// Uploaded documents in display order
    pub fn documents(&self) -> impl Iterator<Item = (DocumentKind, &str)> + '_ {
        DocumentKind::ALL
            .into_iter()
            .filter_map(|kind| self.document(kind).map(|path| (kind, path)))
    }

    /// Every field as a `(key, value)` row, with `-` for empty values
    ///
    /// Named fields come first in declaration order, followed by any extra
    /// fields the backend returned, sorted by key.
    #[must_use]
    pub fn detail_rows(&self) -> Vec<(String, String)> {
        let text = |value: Option<&String>| {
            value.map_or_else(|| "-".to_string(), std::clone::Clone::clone)
        };

        let mut rows = vec![
            ("id".to_string(), self.id.to_string()),
            ("name".to_string(), text(self.name.as_ref())),
            ("email".to_string(), text(self.email.as_ref())),
            ("telephone".to_string(), text(self.telephone.as_ref())),
            ("occupation".to_string(), text(self.occupation.as_ref())),
            ("estate_name".to_string(), text(self.estate_name.as_ref())),
            (
                "number_of_plots".to_string(),
                self.number_of_plots.to_string(),
            ),
            ("status".to_string(), self.status.to_string()),
        ];

        for kind in DocumentKind::ALL {
            rows.push((
                kind.field().to_string(),
                self.document(kind).unwrap_or("-").to_string(),
            ));
        }

        rows.extend(
            self.extra
                .iter()
                .map(|(key, value)| (key.clone(), display_json(value))),
        );

        rows
    }
}

fn display_json(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => "-".to_string(),
        serde_json::Value::String(text) if text.trim().is_empty() => "-".to_string(),
        serde_json::Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Envelope returned by the list endpoints
///
/// The payments endpoint names its list `payments`; the subscriptions endpoint
/// uses `data`.
#[derive(Debug, Clone, Deserialize)]
pub struct ListEnvelope<T> {
    /// Whether the backend considers the call successful
    #[serde(default)]
    pub success: bool,

    /// The records, when successful
    #[serde(alias = "payments")]
    pub data: Option<Vec<T>>,

    /// Error detail, when unsuccessful
    #[serde(default)]
    pub error: Option<serde_json::Value>,

    /// Human-readable message
    #[serde(default)]
    pub message: Option<String>,
}

impl<T> ListEnvelope<T> {
    /// Best available explanation for a failed call
    #[must_use]
    pub fn failure_message(&self) -> Option<String> {
        failure_message(self.message.as_deref(), self.error.as_ref())
    }
}

/// Envelope returned by the status-update endpoints
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MutationEnvelope {
    /// Whether the backend applied the change
    #[serde(default)]
    pub success: bool,

    /// Error detail, when unsuccessful
    #[serde(default)]
    pub error: Option<serde_json::Value>,

    /// Human-readable message
    #[serde(default)]
    pub message: Option<String>,
}

impl MutationEnvelope {
    /// Best available explanation for a failed call
    #[must_use]
    pub fn failure_message(&self) -> Option<String> {
        failure_message(self.message.as_deref(), self.error.as_ref())
    }
}

fn failure_message(message: Option<&str>, error: Option<&serde_json::Value>) -> Option<String> {
    let from_error = error.and_then(|value| match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(text) => Some(text.clone()),
        serde_json::Value::Object(map) => map
            .get("message")
            .and_then(serde_json::Value::as_str)
            .map(str::to_string)
            .or_else(|| Some(value.to_string())),
        other => Some(other.to_string()),
    });

    from_error
        .or_else(|| message.map(str::to_string))
        .filter(|text| !text.trim().is_empty())
}

/// Body of the payment status PATCH
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    /// Requested status
    pub status: ApprovalStatus,
}

// Lenient field deserializers

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Number(serde_json::Number),
    Bool(bool),
}

fn status_or_pending<'de, D: Deserializer<'de>>(deserializer: D) -> Result<ApprovalStatus, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(ApprovalStatus::Pending),
        Some(text) => text.parse().map_err(serde::de::Error::custom),
    }
}

fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let raw = Option::<Scalar>::deserialize(deserializer)?;
    Ok(match raw {
        Some(Scalar::Text(text)) if !text.trim().is_empty() => Some(text),
        Some(Scalar::Number(number)) => Some(number.to_string()),
        Some(Scalar::Bool(flag)) => Some(flag.to_string()),
        _ => None,
    })
}

fn lenient_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<RecordId>, D::Error> {
    Ok(lenient_text(deserializer)?.map(RecordId::new))
}

fn lenient_amount<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
    let raw = Option::<Scalar>::deserialize(deserializer)?;
    let text = match raw {
        Some(Scalar::Text(text)) => text,
        Some(Scalar::Number(number)) => number.to_string(),
        Some(Scalar::Bool(_)) | None => return Ok(Decimal::ZERO),
    };
    Ok(parse_amount(&text).unwrap_or_else(|| {
        tracing::warn!(amount = %text, "Unparseable amount, counting as zero");
        Decimal::ZERO
    }))
}

/// Parse a decimal amount, accepting plain and scientific notation
#[must_use]
pub fn parse_amount(text: &str) -> Option<Decimal> {
    let trimmed = text.trim();
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .ok()
}

fn lenient_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let raw = Option::<Scalar>::deserialize(deserializer)?;
    Ok(match raw {
        Some(Scalar::Text(text)) => text.trim().parse().unwrap_or(0),
        Some(Scalar::Number(number)) => number
            .as_u64()
            .and_then(|value| u32::try_from(value).ok())
            .unwrap_or(0),
        Some(Scalar::Bool(_)) | None => 0,
    })
}

fn lenient_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}

/// Parse a backend timestamp, assuming UTC when no offset is given
#[must_use]
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let trimmed = text.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .map(|naive| naive.and_utc())
}
