//! Store profile and vehicle catalog
//!
//! Both are JSON files read once at startup. The store profile is mandatory;
//! the catalog may be absent, in which case the bot runs with an empty stock.

use serde::{Deserialize, Serialize};
use std::path::Path;

use zailo_bot_core::Vehicle;

use crate::ConfigError;

/// Store identity and the salespeople that receive finished leads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreProfile {
    /// Name the assistant introduces itself with
    #[serde(alias = "atendente")]
    pub assistant_name: String,

    #[serde(alias = "loja")]
    pub store_name: String,

    #[serde(alias = "vendedores", default)]
    pub sales_contacts: Vec<SalesContact>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesContact {
    #[serde(alias = "nome", default)]
    pub name: Option<String>,

    /// WhatsApp number or chat id
    #[serde(default)]
    pub whatsapp: Option<String>,
}

impl SalesContact {
    /// Chat id to deliver to; bare numbers get the user-chat suffix
    pub fn chat_id(&self) -> Option<String> {
        let number = self.whatsapp.as_deref()?.trim();
        if number.is_empty() {
            None
        } else if number.contains('@') {
            Some(number.to_string())
        } else {
            Some(format!("{}@c.us", number))
        }
    }
}

impl StoreProfile {
    /// Load and validate the profile; a missing file is fatal
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound(path.display().to_string()))?;
        let profile: StoreProfile = serde_json::from_str(&raw)
            .map_err(|e| ConfigError::ParseError(format!("{}: {}", path.display(), e)))?;
        profile.validate()?;
        Ok(profile)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.assistant_name.trim().is_empty() {
            return Err(ConfigError::MissingField("assistant_name".to_string()));
        }
        if self.store_name.trim().is_empty() {
            return Err(ConfigError::MissingField("store_name".to_string()));
        }
        Ok(())
    }

    /// Chat ids of every salesperson with a usable number
    pub fn sales_chat_ids(&self) -> Vec<String> {
        self.sales_contacts
            .iter()
            .filter_map(SalesContact::chat_id)
            .collect()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogFile {
    List(Vec<Vehicle>),
    Wrapped {
        #[serde(alias = "modelos")]
        vehicles: Vec<Vehicle>,
    },
}

/// Load the vehicle catalog, keeping file order
///
/// A missing file yields an empty catalog with a warning.
pub fn load_catalog(path: impl AsRef<Path>) -> Result<Vec<Vehicle>, ConfigError> {
    let path = path.as_ref();
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "Vehicle catalog not found, starting with an empty stock"
            );
            return Ok(Vec::new());
        },
    };

    let file: CatalogFile = serde_json::from_str(&raw)
        .map_err(|e| ConfigError::ParseError(format!("{}: {}", path.display(), e)))?;

    Ok(match file {
        CatalogFile::List(vehicles) => vehicles,
        CatalogFile::Wrapped { vehicles } => vehicles,
    })
}
