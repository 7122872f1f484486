//! Cliente mínimo da API Google Sheets v4
//!
//! Cobre apenas o que o disparador precisa:
//!
//! - Autenticação por conta de serviço (fluxo JWT bearer, token em cache)
//! - Abrir uma planilha pelo ID e localizar abas pelo título
//! - Ler todas as linhas como registros indexados pelo cabeçalho
//! - Atualizar uma única célula por linha/coluna (1-based)
//!
//! # Exemplo Básico
//!
//! ```rust,ignore
//! use sheets::{ServiceAccountAuth, SheetsClient, SPREADSHEETS_SCOPE};
//!
//! #[tokio::main]
//! async fn main() -> sheets::Result<()> {
//!     let auth = ServiceAccountAuth::from_file("credentials.json", &[SPREADSHEETS_SCOPE])?;
//!     let client = SheetsClient::new(auth)?;
//!
//!     let worksheet = client.open_by_key("1AbC...").worksheet("Automação").await?;
//!     for (index, record) in worksheet.get_all_records().await?.iter().enumerate() {
//!         println!("linha {}: {:?}", index + 2, record.get("Numero"));
//!     }
//!     worksheet.update_cell(2, 3, "Concluído").await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod error;
pub mod range;

pub use auth::{ServiceAccountAuth, ServiceAccountKey, SPREADSHEETS_SCOPE};
pub use client::{Record, SheetsClient, Spreadsheet, Worksheet};
pub use error::{Result, SheetsError};
