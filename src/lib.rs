// Biblioteca do disparador de mensagens a partir do Google Sheets
// Expõe módulos para uso em testes e no binário

pub mod config;
pub mod models;
pub mod services;
pub mod utils;
