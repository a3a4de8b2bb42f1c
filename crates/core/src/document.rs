//! Collected documents and pending uploads

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::CoreError;

/// Record field a collected document is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentField {
    /// Appended to `bot_data.trade_in_car.photos`
    #[serde(rename = "trade_in_photos")]
    TradeInPhoto,
    /// Stored in `incomeProof`
    #[serde(rename = "incomeProof")]
    IncomeProof,
    /// Stored in `rg_photo`
    #[serde(rename = "rg_photo")]
    RgPhoto,
}

impl DocumentField {
    /// Multipart part name understood by the backend
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TradeInPhoto => "trade_in_photos",
            Self::IncomeProof => "incomeProof",
            Self::RgPhoto => "rg_photo",
        }
    }

    /// File name prefix used when staging the document locally
    pub fn file_prefix(&self) -> &'static str {
        match self {
            Self::TradeInPhoto => "trade_in_photo",
            Self::IncomeProof => "comprovante_renda",
            Self::RgPhoto => "rg",
        }
    }
}

impl FromStr for DocumentField {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "trade_in_photos" => Ok(Self::TradeInPhoto),
            "incomeProof" => Ok(Self::IncomeProof),
            "rg_photo" => Ok(Self::RgPhoto),
            other => Err(CoreError::UnknownDocumentField(other.to_string())),
        }
    }
}

/// A locally staged file waiting to be persisted with the next record update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingUpload {
    pub field: DocumentField,
    pub path: PathBuf,
    pub mime_type: String,
}

impl PendingUpload {
    pub fn new(field: DocumentField, path: impl Into<PathBuf>, mime_type: impl Into<String>) -> Self {
        Self {
            field,
            path: path.into(),
            mime_type: mime_type.into(),
        }
    }

    /// File name component of the staged path
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| format!("{}.bin", self.field.file_prefix()))
    }
}
