//! Text processing for the dealership chat-bot
//!
//! - **Normalization**: case/accent/punctuation folding for keyword matching
//! - **Currency**: Brazilian real parsing and formatting
//! - **Intent Detection**: keyword-list classifiers for greetings, list
//!   requests, yes/no answers and payment choices
//! - **PII**: CPF format check and masking
//!
//! # Example
//!
//! ```
//! use zailo_bot_text_processing::{detect_confirmation, format_currency, Confirmation};
//!
//! assert_eq!(detect_confirmation("Não, mas confirmo"), Some(Confirmation::Deny));
//! assert_eq!(format_currency(Some(10000.0)), "R$ 10.000,00");
//! ```

pub mod currency;
pub mod intent;
pub mod normalize;
pub mod pii;

pub use currency::{extract_number, format_currency, parse_currency};
pub use intent::{
    detect_confirmation, detect_greeting, detect_interest, detect_payment, Confirmation,
    Interest, PaymentChoice,
};
pub use normalize::{contains_any, normalize_text};
pub use pii::{is_cpf_format, mask_cpf};
