// 🎵 Chinook entity rows
// Read-only records loaded once per run. Field names follow the Chinook
// schema through serde renames so CSV exports deserialize directly.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

// ============================================================================
// ENTITY KIND
// ============================================================================

/// The fixed set of tables a data source exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Invoice,
    InvoiceLine,
    Customer,
    Track,
    Album,
    Artist,
    Genre,
    Employee,
}

impl EntityKind {
    pub const ALL: [EntityKind; 8] = [
        EntityKind::Invoice,
        EntityKind::InvoiceLine,
        EntityKind::Customer,
        EntityKind::Track,
        EntityKind::Album,
        EntityKind::Artist,
        EntityKind::Genre,
        EntityKind::Employee,
    ];

    /// Table name in the Chinook schema (also the CSV file stem)
    pub fn table_name(&self) -> &'static str {
        match self {
            EntityKind::Invoice => "Invoice",
            EntityKind::InvoiceLine => "InvoiceLine",
            EntityKind::Customer => "Customer",
            EntityKind::Track => "Track",
            EntityKind::Album => "Album",
            EntityKind::Artist => "Artist",
            EntityKind::Genre => "Genre",
            EntityKind::Employee => "Employee",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_name())
    }
}

// ============================================================================
// ENTITIES
// ============================================================================

/// A single customer purchase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    #[serde(rename = "InvoiceId")]
    pub id: i64,

    #[serde(rename = "CustomerId")]
    pub customer_id: i64,

    #[serde(rename = "InvoiceDate", deserialize_with = "deserialize_invoice_date")]
    pub date: NaiveDate,

    #[serde(rename = "Total", deserialize_with = "deserialize_invoice_total")]
    pub total_amount: f64,
}

/// One line item of an invoice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceLine {
    #[serde(rename = "InvoiceLineId")]
    pub id: i64,

    #[serde(rename = "TrackId")]
    pub track_id: i64,

    #[serde(rename = "Quantity")]
    pub quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    #[serde(rename = "CustomerId")]
    pub id: i64,

    #[serde(rename = "FirstName")]
    pub first_name: String,

    #[serde(rename = "LastName")]
    pub last_name: String,

    #[serde(rename = "Country", default)]
    pub billing_country: Option<String>,

    #[serde(rename = "SupportRepId", default)]
    pub support_rep_id: Option<i64>,
}

impl Customer {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Billing country, treating blank values as missing
    pub fn country(&self) -> Option<&str> {
        self.billing_country
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    #[serde(rename = "TrackId")]
    pub id: i64,

    #[serde(rename = "AlbumId", default)]
    pub album_id: Option<i64>,

    #[serde(rename = "GenreId", default)]
    pub genre_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Album {
    #[serde(rename = "AlbumId")]
    pub id: i64,

    #[serde(rename = "Title")]
    pub title: String,

    #[serde(rename = "ArtistId")]
    pub artist_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artist {
    #[serde(rename = "ArtistId")]
    pub id: i64,

    #[serde(rename = "Name")]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Genre {
    #[serde(rename = "GenreId")]
    pub id: i64,

    #[serde(rename = "Name")]
    pub name: String,
}

/// A sales support representative
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    #[serde(rename = "EmployeeId")]
    pub id: i64,

    #[serde(rename = "FirstName")]
    pub first_name: String,

    #[serde(rename = "LastName")]
    pub last_name: String,
}

impl Employee {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

// ============================================================================
// DATE PARSING
// ============================================================================

/// Parse an invoice timestamp into its calendar date
///
/// Accepts `2009-01-01`, `2009-01-01 00:00:00` (the Chinook SQLite format),
/// `2009-01-01T00:00:00` and RFC 3339.
pub fn parse_invoice_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }

    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt.date());
        }
    }

    DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive())
}

fn deserialize_invoice_total<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let total = f64::deserialize(deserializer)?;
    if total.is_finite() {
        Ok(total)
    } else {
        Err(serde::de::Error::custom(format!("invoice total must be finite, got {}", total)))
    }
}

fn deserialize_invoice_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_invoice_date(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("unrecognized invoice date '{}'", raw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_invoice_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2009, 1, 1).unwrap();

        assert_eq!(parse_invoice_date("2009-01-01"), Some(expected));
        assert_eq!(parse_invoice_date("2009-01-01 00:00:00"), Some(expected));
        assert_eq!(parse_invoice_date("2009-01-01T13:45:00"), Some(expected));
        assert_eq!(parse_invoice_date("2009-01-01T23:00:00+00:00"), Some(expected));
        assert_eq!(parse_invoice_date(" 2009-01-01 "), Some(expected));
        assert_eq!(parse_invoice_date("01/01/2009"), None);
    }

    #[test]
    fn test_customer_country_blank_is_missing() {
        let mut customer = Customer {
            id: 1,
            first_name: "Luís".to_string(),
            last_name: "Gonçalves".to_string(),
            billing_country: Some("  ".to_string()),
            support_rep_id: Some(3),
        };
        assert_eq!(customer.country(), None);

        customer.billing_country = Some("Brazil".to_string());
        assert_eq!(customer.country(), Some("Brazil"));
        assert_eq!(customer.display_name(), "Luís Gonçalves");
    }

    #[test]
    fn test_entity_kind_table_names() {
        let names: Vec<&str> = EntityKind::ALL.iter().map(|k| k.table_name()).collect();
        assert_eq!(
            names,
            vec![
                "Invoice",
                "InvoiceLine",
                "Customer",
                "Track",
                "Album",
                "Artist",
                "Genre",
                "Employee"
            ]
        );
        assert_eq!(EntityKind::Genre.to_string(), "Genre");
    }
}
