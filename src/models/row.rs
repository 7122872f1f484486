use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Coluna do número de telefone (1-based)
pub const NUMERO_COLUMN: u32 = 2;
/// Coluna do status de envio (1-based)
pub const STATUS_COLUMN: u32 = 3;

/// Linha 1 é o cabeçalho; o primeiro contato está na linha 2
pub const FIRST_DATA_ROW: u32 = 2;

pub const NUMERO_HEADER: &str = "Numero";
pub const STATUS_HEADER: &str = "Status";
pub const NOME_HEADER: &str = "Nome";

/// Status de envio de um contato
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RowStatus {
    Pendente,
    Concluido,
    Erro,
    /// Qualquer outro texto na coluna (inclusive vazio); nunca é enviado
    Outro(String),
}

impl RowStatus {
    /// Comparação exata: espaços ou variação de caixa não contam como status conhecido
    pub fn parse(raw: &str) -> Self {
        match raw {
            "Pendente" => RowStatus::Pendente,
            "Concluído" => RowStatus::Concluido,
            "Erro" => RowStatus::Erro,
            other => RowStatus::Outro(other.to_string()),
        }
    }

    /// Texto gravado na planilha
    pub fn as_str(&self) -> &str {
        match self {
            RowStatus::Pendente => "Pendente",
            RowStatus::Concluido => "Concluído",
            RowStatus::Erro => "Erro",
            RowStatus::Outro(raw) => raw,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, RowStatus::Pendente)
    }
}

impl fmt::Display for RowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Contato lido da planilha
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    /// Linha na planilha (1-based, contando o cabeçalho)
    pub index: u32,
    pub numero: String,
    pub status: RowStatus,
    pub nome: String,
}

impl Row {
    /// Monta a linha a partir de um registro indexado pelo cabeçalho.
    /// Colunas ausentes viram string vazia.
    pub fn from_record(index: u32, record: &HashMap<String, String>) -> Self {
        let field = |name: &str| record.get(name).cloned().unwrap_or_default();

        Self {
            index,
            numero: field(NUMERO_HEADER),
            status: RowStatus::parse(&field(STATUS_HEADER)),
            nome: field(NOME_HEADER),
        }
    }

    /// Converte registros na ordem da planilha em linhas numeradas
    pub fn from_records(records: &[HashMap<String, String>]) -> Vec<Self> {
        records
            .iter()
            .zip(FIRST_DATA_ROW..)
            .map(|(record, index)| Self::from_record(index, record))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_status_round_trip_text() {
        assert_eq!(RowStatus::parse("Pendente"), RowStatus::Pendente);
        assert_eq!(RowStatus::parse("Concluído"), RowStatus::Concluido);
        assert_eq!(RowStatus::parse("Erro"), RowStatus::Erro);
        assert_eq!(RowStatus::parse("pendente"), RowStatus::Outro("pendente".to_string()));
        assert_eq!(RowStatus::Concluido.to_string(), "Concluído");
        assert!(RowStatus::Pendente.is_pending());
        assert!(!RowStatus::Outro(String::new()).is_pending());
    }

    #[test]
    fn test_status_with_surrounding_spaces_is_not_pending() {
        let status = RowStatus::parse(" Pendente ");
        assert_eq!(status, RowStatus::Outro(" Pendente ".to_string()));
        assert!(!status.is_pending());
        assert!(!RowStatus::parse("Pendente\n").is_pending());
    }

    #[test]
    fn test_rows_are_numbered_after_header() {
        let records = vec![
            record(&[("Nome", "Ana"), ("Numero", "11999999999"), ("Status", "Pendente")]),
            record(&[("Nome", "Bruno"), ("Numero", "5511988887777"), ("Status", "Concluído")]),
        ];

        let rows = Row::from_records(&records);
        assert_eq!(rows[0].index, 2);
        assert_eq!(rows[1].index, 3);
        assert_eq!(rows[0].nome, "Ana");
        assert_eq!(rows[1].status, RowStatus::Concluido);
    }

    #[test]
    fn test_missing_columns_are_empty() {
        let row = Row::from_record(7, &record(&[("Numero", "11999999999")]));
        assert_eq!(row.nome, "");
        assert_eq!(row.status, RowStatus::Outro(String::new()));
    }
}
