use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

/// Ids and `createdBy` values arrive as strings or numbers depending on the
/// backend collection; both are normalized to strings.
fn id_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    })
}

fn opt_id_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    Ok(match Option::<RawId>::deserialize(deserializer)? {
        Some(RawId::Text(s)) if !s.is_empty() => Some(s),
        Some(RawId::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// `null` reads as the type's default
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq)]
pub enum PaymentStatus {
    Paid,
    Unpaid,
    #[default]
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq)]
pub enum InvoiceType {
    Standard,
    Proforma,
    #[default]
    #[serde(other)]
    Other,
}

/// An invoice's currency, either a bare id or the populated document
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum CurrencyRef {
    Id(String),
    Populated {
        #[serde(rename = "_id")]
        id: String,
    },
}

impl CurrencyRef {
    pub fn id(&self) -> &str {
        match self {
            CurrencyRef::Id(id) => id,
            CurrencyRef::Populated { id } => id,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    #[serde(rename = "_id", deserialize_with = "id_string")]
    pub id: String,
    pub date: DateTime<Utc>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub payment_status: PaymentStatus,
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub invoice_type: InvoiceType,
    pub currency: CurrencyRef,
    #[serde(default, deserialize_with = "null_as_default")]
    pub paid_amount: Decimal,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total: Decimal,
    #[serde(default, deserialize_with = "opt_id_string")]
    pub created_by: Option<String>,
}

impl Invoice {
    pub fn currency_id(&self) -> &str {
        self.currency.id()
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SymbolPosition {
    Before,
    After,
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Currency {
    #[serde(rename = "_id", deserialize_with = "id_string")]
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub symbol_position: SymbolPosition,
    #[serde(default)]
    pub active: bool,
    #[serde(default, deserialize_with = "opt_id_string")]
    pub created_by: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    #[serde(rename = "_id", deserialize_with = "id_string")]
    pub id: String,
    #[serde(rename = "prenom", default)]
    pub first_name: String,
    #[serde(rename = "nom", default)]
    pub last_name: String,
    #[serde(rename = "entreprise", default, deserialize_with = "opt_id_string")]
    pub company: Option<String>,
    #[serde(rename = "pays", default)]
    pub country: String,
    #[serde(rename = "telephone", default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, deserialize_with = "opt_id_string")]
    pub created_by: Option<String>,
}

/// Body of `PUT /api/people/:id`
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct PersonUpdate {
    #[serde(rename = "prenom")]
    pub first_name: String,
    #[serde(rename = "nom")]
    pub last_name: String,
    #[serde(rename = "entreprise")]
    pub company: Option<String>,
    #[serde(rename = "pays")]
    pub country: Option<String>,
    #[serde(rename = "telephone")]
    pub phone: String,
    pub email: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    #[serde(rename = "_id", deserialize_with = "id_string")]
    pub id: String,
    #[serde(rename = "nom", default)]
    pub name: String,
    #[serde(default, deserialize_with = "opt_id_string")]
    pub created_by: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(rename = "_id", deserialize_with = "id_string")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "opt_id_string")]
    pub created_by: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id", deserialize_with = "id_string")]
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "opt_id_string")]
    pub product_category: Option<String>,
    #[serde(default, deserialize_with = "opt_id_string")]
    pub currency: Option<String>,
    #[serde(default)]
    pub price: Decimal,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub reference: String,
    #[serde(default, deserialize_with = "opt_id_string")]
    pub created_by: Option<String>,
}

/// Body of `POST /api/product`
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    pub product_category: String,
    pub currency: String,
    pub price: Decimal,
    pub description: String,
    pub reference: String,
    pub created_by: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invoice_accepts_populated_currency() {
        let json = r#"{
            "_id": "inv1",
            "date": "2024-01-05T10:00:00.000Z",
            "paymentStatus": "Paid",
            "type": "Standard",
            "currency": {"_id": "eur", "name": "Euro"},
            "paidAmount": 100,
            "total": 120.5,
            "createdBy": "u1"
        }"#;
        let invoice: Invoice = serde_json::from_str(json).unwrap();
        assert_eq!(invoice.currency_id(), "eur");
        assert_eq!(invoice.paid_amount, Decimal::from(100));
        assert_eq!(invoice.total, Decimal::new(1205, 1));
    }

    #[test]
    fn unknown_status_and_type_map_to_other() {
        let json = r#"{
            "_id": 7,
            "date": "2024-01-05T10:00:00Z",
            "paymentStatus": "Partial",
            "type": "CreditNote",
            "currency": "usd"
        }"#;
        let invoice: Invoice = serde_json::from_str(json).unwrap();
        assert_eq!(invoice.id, "7");
        assert_eq!(invoice.payment_status, PaymentStatus::Other);
        assert_eq!(invoice.invoice_type, InvoiceType::Other);
        assert_eq!(invoice.currency_id(), "usd");
        assert_eq!(invoice.paid_amount, Decimal::ZERO);
    }

    #[test]
    fn missing_type_and_null_amounts_are_tolerated() {
        let json = r#"{
            "_id": "inv2",
            "date": "2024-01-05T10:00:00Z",
            "paymentStatus": null,
            "currency": "eur",
            "paidAmount": null,
            "total": 40
        }"#;
        let invoice: Invoice = serde_json::from_str(json).unwrap();
        assert_eq!(invoice.invoice_type, InvoiceType::Other);
        assert_eq!(invoice.payment_status, PaymentStatus::Other);
        assert_eq!(invoice.paid_amount, Decimal::ZERO);
        assert_eq!(invoice.total, Decimal::from(40));
    }

    #[test]
    fn person_fields_are_renamed() {
        let json = r#"{"_id":"p1","prenom":"Ada","nom":"Lovelace","entreprise":null,
            "pays":"France","telephone":"+33 1 23 45 67 89","email":"ada@example.com","createdBy":"u1"}"#;
        let person: Person = serde_json::from_str(json).unwrap();
        assert_eq!(person.first_name, "Ada");
        assert_eq!(person.company, None);
        assert_eq!(person.created_by.as_deref(), Some("u1"));
    }
}
