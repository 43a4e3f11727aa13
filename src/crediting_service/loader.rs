use std::{
    io::{Cursor, Read, Seek},
    path::Path,
};

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader, Sheets};
use tracing::{debug, info};

use crate::{
    models::{Cell, Sheet},
    Result,
};

pub const OVERALL_SHEET: &str = "Crediting_overall";
pub const DETAIL_SHEET: &str = "Crediting_detail";
pub const SECTOR_SHEET: &str = "Crediting_sector";
pub const ISSUANCES_SHEET: &str = "Crediting_issuances";

#[derive(Debug, Clone)]
pub struct RawWorkbook {
    pub overall: Sheet,
    pub detail: Sheet,
    pub sector: Sheet,
    pub issuances: Sheet,
}

pub async fn load(path: &Path) -> Result<RawWorkbook> {
    info!("Reading crediting workbook {}", path.display());
    let bytes = tokio::fs::read(path).await?;
    from_bytes(bytes)
}

pub fn from_bytes(bytes: Vec<u8>) -> Result<RawWorkbook> {
    let cursor = Cursor::new(bytes);
    let mut workbook = open_workbook_auto_from_rs(cursor)?;
    Ok(RawWorkbook {
        overall: read_sheet(&mut workbook, OVERALL_SHEET)?,
        detail: read_sheet(&mut workbook, DETAIL_SHEET)?,
        sector: read_sheet(&mut workbook, SECTOR_SHEET)?,
        issuances: read_sheet(&mut workbook, ISSUANCES_SHEET)?,
    })
}

fn read_sheet<RS: Read + Seek>(workbook: &mut Sheets<RS>, name: &str) -> Result<Sheet> {
    let range = workbook.worksheet_range(name)?;
    let sheet = sheet_from_range(name, &range);
    debug!(
        "Sheet '{name}': {} columns, {} rows",
        sheet.headers.len(),
        sheet.rows.len()
    );
    Ok(sheet)
}

pub fn sheet_from_range(name: &str, range: &Range<Data>) -> Sheet {
    let mut rows = range.rows();
    let headers = rows
        .next()
        .map(|row| row.iter().map(|d| d.to_string().trim().to_string()).collect())
        .unwrap_or_default();
    let rows = rows
        .map(|row| row.iter().map(Cell::from).collect::<Vec<_>>())
        .filter(|row| row.iter().any(|c| *c != Cell::Empty))
        .collect();
    Sheet {
        name: name.to_string(),
        headers,
        rows,
    }
}
