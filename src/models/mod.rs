pub mod row;
pub mod template;

pub use row::*;
pub use template::*;

use serde::{Deserialize, Serialize};

/// Corpo enviado para a API de mensagens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub number: String,
    pub text: String,
}
