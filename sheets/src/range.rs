//! Notação A1 para ranges da API Sheets

use crate::error::{Result, SheetsError};

/// Converte índice de coluna 1-based em letras (1 → A, 27 → AA)
pub fn column_letter(mut column: u32) -> String {
    let mut letters = Vec::new();
    while column > 0 {
        let rem = ((column - 1) % 26) as u8;
        letters.push((b'A' + rem) as char);
        column = (column - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// Título de aba entre aspas simples, escapando aspas internas
pub fn quote_title(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

/// Range cobrindo a aba inteira
pub fn sheet_range(title: &str) -> String {
    quote_title(title)
}

/// Range de uma única célula, ex.: `'Automação'!B2`
pub fn cell_range(title: &str, row: u32, column: u32) -> Result<String> {
    if row == 0 || column == 0 {
        return Err(SheetsError::InvalidCell(format!(
            "linha {} coluna {} (índices começam em 1)",
            row, column
        )));
    }
    Ok(format!("{}!{}{}", quote_title(title), column_letter(column), row))
}
