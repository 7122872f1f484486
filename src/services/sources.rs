//! Fonte tabular de contatos
//!
//! O disparador só depende do trait [`RowSource`]; a implementação real lê e
//! grava uma aba do Google Sheets.

use async_trait::async_trait;
use std::sync::Arc;

use crate::models::Row;
use crate::utils::DispatchResult;

/// Planilha de contatos: leitura completa e escrita célula a célula
#[async_trait]
pub trait RowSource: Send + Sync {
    /// Nome usado nos logs (título da aba)
    fn name(&self) -> &str;

    /// Lê todas as linhas de dados, já numeradas a partir da linha 2
    async fn read_rows(&self) -> DispatchResult<Vec<Row>>;

    /// Atualiza uma célula (linha e coluna 1-based)
    async fn update_cell(&self, row: u32, column: u32, value: &str) -> DispatchResult<()>;
}

#[async_trait]
impl<T: RowSource + ?Sized> RowSource for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn read_rows(&self) -> DispatchResult<Vec<Row>> {
        (**self).read_rows().await
    }

    async fn update_cell(&self, row: u32, column: u32, value: &str) -> DispatchResult<()> {
        (**self).update_cell(row, column, value).await
    }
}

/// Aba do Google Sheets usada como fonte de contatos
pub struct SheetSource {
    worksheet: sheets::Worksheet,
}

impl SheetSource {
    pub fn new(worksheet: sheets::Worksheet) -> Self {
        Self { worksheet }
    }
}

#[async_trait]
impl RowSource for SheetSource {
    fn name(&self) -> &str {
        self.worksheet.title()
    }

    async fn read_rows(&self) -> DispatchResult<Vec<Row>> {
        let records = self.worksheet.get_all_records().await?;
        Ok(Row::from_records(&records))
    }

    async fn update_cell(&self, row: u32, column: u32, value: &str) -> DispatchResult<()> {
        self.worksheet.update_cell(row, column, value).await?;
        Ok(())
    }
}
