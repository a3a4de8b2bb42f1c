//! Persisted client record
//!
//! The backend owns the record; the bot reads it at the start of every turn
//! and writes back merged copies. Fields the bot does not model are kept in
//! `extra` so a read-modify-write cycle never drops them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::document::DocumentField;
use crate::state::{lenient_previous_state, lenient_state, DialogueState};

/// One record per chat
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientRecord {
    pub chat_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpf: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rg_number: Option<String>,

    /// Remote reference of the income proof document
    #[serde(rename = "incomeProof", default, skip_serializing_if = "Option::is_none")]
    pub income_proof: Option<String>,

    /// Remote reference of the RG/CNH photo
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rg_photo: Option<String>,

    /// Append-only list of file references
    #[serde(default)]
    pub documents: Vec<String>,

    #[serde(default)]
    pub bot_data: BotData,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ClientRecord {
    /// Seed a record for a chat seen for the first time
    pub fn seed(chat_id: impl Into<String>, push_name: Option<&str>, number: &str) -> Self {
        let name = push_name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("Cliente {}", number));

        Self {
            chat_id: chat_id.into(),
            name: Some(name),
            phone: Some(number.to_string()),
            cpf: None,
            job: None,
            rg_number: None,
            income_proof: None,
            rg_photo: None,
            documents: Vec::new(),
            bot_data: BotData::default(),
            extra: Map::new(),
        }
    }

    /// Name shown to the sales team: captured name, else phone, else chat id
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.phone.as_deref())
            .unwrap_or(&self.chat_id)
    }

    /// Attach a persisted document reference to its record field
    pub fn attach_document(&mut self, field: DocumentField, reference: impl Into<String>) {
        let reference = reference.into();
        match field {
            DocumentField::TradeInPhoto => {
                self.bot_data.trade_in_car.photos.push(reference.clone());
            },
            DocumentField::IncomeProof => self.income_proof = Some(reference.clone()),
            DocumentField::RgPhoto => self.rg_photo = Some(reference.clone()),
        }
        self.documents.push(reference);
    }

    /// Every attachment worth forwarding to a salesperson, in collection order
    pub fn attachments(&self) -> Vec<&str> {
        let mut docs: Vec<&str> = Vec::new();
        if let Some(proof) = self.income_proof.as_deref() {
            docs.push(proof);
        }
        if let Some(photo) = self.rg_photo.as_deref() {
            docs.push(photo);
        }
        docs.extend(self.bot_data.trade_in_car.photos.iter().map(String::as_str));
        docs
    }
}

/// State-machine memory stored inside the record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct BotData {
    #[serde(default, deserialize_with = "lenient_state")]
    pub state: DialogueState,

    #[serde(
        rename = "previousState",
        default,
        deserialize_with = "lenient_previous_state"
    )]
    pub previous_state: Option<DialogueState>,

    #[serde(default)]
    pub temp_car: Option<Vehicle>,

    #[serde(default)]
    pub interested_vehicles: Vec<Vehicle>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<PaymentMethod>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deal_type: Option<DealType>,

    #[serde(default)]
    pub financing_details: FinancingDetails,

    #[serde(default)]
    pub trade_in_car: TradeInCar,

    #[serde(default)]
    pub history: Vec<HistoryEntry>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Payment path chosen by the customer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[serde(rename = "a_vista")]
    Cash,
    #[serde(rename = "financiamento")]
    Financing,
    #[serde(rename = "troca")]
    TradeIn,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "a_vista",
            Self::Financing => "financiamento",
            Self::TradeIn => "troca",
        }
    }
}

/// Negotiation kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DealType {
    #[serde(rename = "venda")]
    Sale,
    #[serde(rename = "troca")]
    TradeIn,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct FinancingDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub down_payment: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_to_finance: Option<f64>,

    /// Stored as `"{n}x"`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installments: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TradeInCar {
    /// Free-text model and year as typed by the customer
    #[serde(rename = "modelo", default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub photos: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desired_value: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difference_payment_method: Option<PaymentMethod>,
}

/// Audit log entry appended on every state change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct HistoryEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
}

impl HistoryEntry {
    pub fn transition(at: DateTime<Utc>, from: DialogueState, to: DialogueState) -> Self {
        Self {
            at: Some(at),
            from: Some(from.as_str().to_string()),
            to: Some(to.as_str().to_string()),
        }
    }
}

/// Catalog price, either as typed by the store ("50.000,00") or as a number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Price {
    Amount(f64),
    Text(String),
}

/// Vehicle from the store catalog
///
/// Accepts both the English field names and the Portuguese ones used by the
/// catalog export (`nome`, `ano`, `preco`, `descricao`, `imagens`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    #[serde(alias = "nome")]
    pub name: String,

    #[serde(alias = "ano", default, deserialize_with = "string_or_number")]
    pub year: Option<String>,

    #[serde(alias = "preco", default)]
    pub price: Option<Price>,

    #[serde(alias = "descricao", default)]
    pub description: Option<String>,

    #[serde(alias = "imagens", default)]
    pub images: Vec<String>,
}

impl Vehicle {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            year: None,
            price: None,
            description: None,
            images: Vec::new(),
        }
    }

    pub fn with_year(mut self, year: impl Into<String>) -> Self {
        self.year = Some(year.into());
        self
    }

    pub fn with_price(mut self, price: Price) -> Self {
        self.price = Some(price);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_seed_uses_push_name() {
        let record = ClientRecord::seed("5511999@c.us", Some("Ana"), "5511999");
        assert_eq!(record.name.as_deref(), Some("Ana"));
        assert_eq!(record.phone.as_deref(), Some("5511999"));
        assert_eq!(record.bot_data.state, DialogueState::LeadReceived);
        assert!(record.bot_data.history.is_empty());
    }

    #[test]
    fn test_seed_without_push_name() {
        let record = ClientRecord::seed("5511999@c.us", None, "5511999");
        assert_eq!(record.name.as_deref(), Some("Cliente 5511999"));
    }

    #[test]
    fn test_unknown_state_falls_back() {
        let record: ClientRecord = serde_json::from_value(json!({
            "chat_id": "1@c.us",
            "bot_data": { "state": "estado_velho", "previousState": "outro_velho" }
        }))
        .unwrap();
        assert_eq!(record.bot_data.state, DialogueState::LeadReceived);
        assert_eq!(record.bot_data.previous_state, None);
    }

    #[test]
    fn test_missing_bot_data_defaults() {
        let record: ClientRecord =
            serde_json::from_value(json!({ "chat_id": "1@c.us", "name": null })).unwrap();
        assert_eq!(record.bot_data.state, DialogueState::LeadReceived);
        assert!(record.documents.is_empty());
    }

    #[test]
    fn test_unmodelled_fields_survive_round_trip() {
        let source = json!({
            "chat_id": "1@c.us",
            "store_id": 42,
            "bot_data": { "state": "visita", "custom": true }
        });
        let record: ClientRecord = serde_json::from_value(source).unwrap();
        let back = serde_json::to_value(&record).unwrap();
        assert_eq!(back["store_id"], 42);
        assert_eq!(back["bot_data"]["custom"], true);
        assert_eq!(back["bot_data"]["state"], "visita");
    }

    #[test]
    fn test_vehicle_portuguese_aliases() {
        let car: Vehicle = serde_json::from_value(json!({
            "nome": "Fiat Uno",
            "ano": 2018,
            "preco": "35.000,00",
            "descricao": "Completo",
            "imagens": ["https://cdn/uno.jpg"]
        }))
        .unwrap();
        assert_eq!(car.name, "Fiat Uno");
        assert_eq!(car.year.as_deref(), Some("2018"));
        assert_eq!(car.price, Some(Price::Text("35.000,00".to_string())));
        assert_eq!(car.images.len(), 1);
    }

    #[test]
    fn test_numeric_price() {
        let car: Vehicle =
            serde_json::from_value(json!({ "name": "Onix", "price": 72000.5 })).unwrap();
        assert_eq!(car.price, Some(Price::Amount(72000.5)));
    }

    #[test]
    fn test_attach_document_routes_by_field() {
        let mut record = ClientRecord::seed("1@c.us", None, "1");
        record.attach_document(DocumentField::TradeInPhoto, "a.jpg");
        record.attach_document(DocumentField::IncomeProof, "b.pdf");
        record.attach_document(DocumentField::RgPhoto, "c.jpg");

        assert_eq!(record.bot_data.trade_in_car.photos, vec!["a.jpg"]);
        assert_eq!(record.income_proof.as_deref(), Some("b.pdf"));
        assert_eq!(record.rg_photo.as_deref(), Some("c.jpg"));
        assert_eq!(record.documents, vec!["a.jpg", "b.pdf", "c.jpg"]);
        assert_eq!(record.attachments(), vec!["b.pdf", "c.jpg", "a.jpg"]);
    }

    #[test]
    fn test_payment_wire_names() {
        assert_eq!(serde_json::to_value(PaymentMethod::Cash).unwrap(), "a_vista");
        assert_eq!(serde_json::to_value(DealType::Sale).unwrap(), "venda");
        assert_eq!(serde_json::to_value(DealType::TradeIn).unwrap(), "troca");
    }
}
