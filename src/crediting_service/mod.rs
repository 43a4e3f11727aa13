mod converter;
pub mod loader;
pub mod pages;

pub use converter::{ConversionMode, CurrencyMarker, PriceConverter, MARKERS};
pub use pages::{PageSummary, PageView};

use std::path::Path;

use tracing::{info, instrument};

use crate::{
    models::{Cell, DetailRecord, OverallRecord, Page, SectorRow, SectorTable, Sheet},
    Result,
};
use loader::RawWorkbook;

pub const PRICE_RANGE_USD: &str = "Price range USD";

pub struct CreditingService {
    overall: Sheet,
    overall_records: Vec<OverallRecord>,
    detail: Sheet,
    detail_records: Vec<DetailRecord>,
    sector: Sheet,
    sector_table: SectorTable,
    issuances: Sheet,
}

impl CreditingService {
    pub async fn new(path: &Path, conversion_mode: ConversionMode) -> Result<Self> {
        let workbook = loader::load(path).await?;
        Self::from_workbook(workbook, conversion_mode)
    }

    #[instrument(name = "building crediting tables", skip(workbook))]
    pub fn from_workbook(workbook: RawWorkbook, conversion_mode: ConversionMode) -> Result<Self> {
        let converter = PriceConverter::new(conversion_mode)?;
        let overall_records = overall_records(&workbook.overall)?;
        let mut detail = workbook.detail;
        let detail_records = detail_records(&detail, &converter)?;
        augment_with_usd(&mut detail, &detail_records);
        let sector_table = sector_table(&workbook.sector)?;
        let priced = detail_records
            .iter()
            .filter(|r| r.price_range_usd.is_some())
            .count();
        info!(
            "Crediting tables ready: {} overall, {} detail ({priced} priced in USD), {} sectors, {} issuances",
            overall_records.len(),
            detail_records.len(),
            sector_table.rows.len(),
            workbook.issuances.rows.len()
        );
        Ok(Self {
            overall: workbook.overall,
            overall_records,
            detail,
            detail_records,
            sector: workbook.sector,
            sector_table,
            issuances: workbook.issuances,
        })
    }

    pub fn detail_records(&self) -> &[DetailRecord] {
        &self.detail_records
    }

    pub fn page(&self, page: Page) -> PageView<'_> {
        match page {
            Page::Overall => PageView::Overall(pages::overall(&self.overall, &self.overall_records)),
            Page::Detail => PageView::Detail(pages::detail(&self.detail, &self.detail_records)),
            Page::Sector => PageView::Sector(pages::sector(&self.sector, &self.sector_table)),
            Page::Issuances => PageView::Issuances(pages::issuances(&self.issuances)),
        }
    }
}

fn text(row: &[Cell], index: usize) -> String {
    Sheet::cell(row, index).as_label().unwrap_or_default()
}

fn overall_records(sheet: &Sheet) -> Result<Vec<OverallRecord>> {
    let jurisdiction_type = sheet.require_column("Type of jurisdiction covered")?;
    let jurisdiction = sheet.require_column("Jurisdiction covered")?;
    let status = sheet.require_column("Status")?;
    let year = sheet.require_column("Year of implementation")?;
    Ok(sheet
        .rows
        .iter()
        .map(|row| OverallRecord {
            jurisdiction_type: text(row, jurisdiction_type),
            jurisdiction: text(row, jurisdiction),
            status: text(row, status),
            year: Sheet::cell(row, year).as_label(),
        })
        .collect())
}

fn detail_records(sheet: &Sheet, converter: &PriceConverter) -> Result<Vec<DetailRecord>> {
    let mechanism = sheet.require_column("Name of the mechanism")?;
    let status = sheet.require_column("Status of the mechanism")?;
    let year = sheet.require_column("Year of implementation")?;
    let issued = sheet.require_column("Credits issued (MtCO2e)")?;
    let retired = sheet.require_column("Credits retired or cancelled (MtCO2e)")?;
    let price_range = sheet.require_column("Price range")?;
    Ok(sheet
        .rows
        .iter()
        .map(|row| {
            let price_range = Sheet::cell(row, price_range).as_label();
            let price_range_usd = price_range.as_deref().and_then(|p| converter.to_usd(p));
            DetailRecord {
                mechanism: text(row, mechanism),
                status: text(row, status),
                year: Sheet::cell(row, year).as_label(),
                credits_issued: Sheet::cell(row, issued).as_f64(),
                credits_retired: Sheet::cell(row, retired).as_f64(),
                price_range,
                price_range_usd,
            }
        })
        .collect())
}

fn augment_with_usd(sheet: &mut Sheet, records: &[DetailRecord]) {
    let width = sheet.headers.len();
    sheet.headers.push(PRICE_RANGE_USD.to_string());
    for (row, record) in sheet.rows.iter_mut().zip(records) {
        row.resize(width, Cell::Empty);
        row.push(record.price_range_usd.map(Cell::Number).unwrap_or(Cell::Empty));
    }
}

fn sector_table(sheet: &Sheet) -> Result<SectorTable> {
    let key = sheet.require_column("Sectors")?;
    let columns = sheet
        .headers
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != key)
        .map(|(i, h)| (i, h.clone()))
        .collect::<Vec<_>>();
    let rows = sheet
        .rows
        .iter()
        .map(|row| SectorRow {
            sector: text(row, key),
            values: columns
                .iter()
                .map(|(i, _)| Sheet::cell(row, *i).as_f64())
                .collect(),
        })
        .collect();
    Ok(SectorTable {
        columns: columns.into_iter().map(|(_, h)| h).collect(),
        rows,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::crediting_service::loader::{
        sheet_from_range, tests::range_of, DETAIL_SHEET, ISSUANCES_SHEET, OVERALL_SHEET,
        SECTOR_SHEET,
    };
    use crate::AppError;
    use anyhow::Result;

    pub(crate) fn workbook() -> RawWorkbook {
        RawWorkbook {
            overall: sheet_from_range(
                OVERALL_SHEET,
                &range_of(&[
                    &["Type of jurisdiction covered", "Jurisdiction covered", "Status", "Year of implementation"],
                    &["National", "Japan", "Implemented", "2013"],
                    &["Subnational", "Alberta", "Implemented", "2007"],
                    &["National", "Chile", "Under development", ""],
                ]),
            ),
            detail: sheet_from_range(
                DETAIL_SHEET,
                &range_of(&[
                    &[
                        "Name of the mechanism",
                        "Status of the mechanism",
                        "Year of implementation",
                        "Credits issued (MtCO2e)",
                        "Credits retired or cancelled (MtCO2e)",
                        "Price range",
                    ],
                    &["J-Credit Scheme", "Implemented", "2013", "8.1", "5.2", "JPY 1500 (US$11.30)"],
                    &["Alberta Offset System", "Implemented", "2007", "70.4", "61", "CAN$10.00 (US$7.50)"],
                    &["Chile Offsets", "Under development", "", "", "", "N/A"],
                ]),
            ),
            sector: sheet_from_range(
                SECTOR_SHEET,
                &range_of(&[
                    &["Sectors", "Total", "2021", "2022"],
                    &["Forestry", "9", "4", "5"],
                    &["Energy", "3", "1", "2"],
                ]),
            ),
            issuances: sheet_from_range(
                ISSUANCES_SHEET,
                &range_of(&[&["Name of the mechanism", "2022"], &["J-Credit Scheme", "1.5"]]),
            ),
        }
    }

    #[test]
    fn test_detail_gets_usd_column() -> Result<()> {
        let service = CreditingService::from_workbook(workbook(), ConversionMode::UsdAnchor)?;
        let PageView::Detail(view) = service.page(Page::Detail) else {
            panic!("expected detail page");
        };
        assert_eq!(view.table.headers.last().map(String::as_str), Some(PRICE_RANGE_USD));
        assert_eq!(view.table.rows[2].last(), Some(&Cell::Empty));
        let prices: Vec<_> = view.prices.iter().map(|p| p.mechanism.as_str()).collect();
        assert_eq!(prices, vec!["J-Credit Scheme", "Alberta Offset System"]);
        let alberta = service.detail_records()[1].price_range_usd.unwrap_or_default();
        assert!((alberta - 5.625).abs() < 1e-9);
        Ok(())
    }

    #[test]
    fn test_local_marker_mode_changes_prices() -> Result<()> {
        let service = CreditingService::from_workbook(workbook(), ConversionMode::LocalMarker)?;
        let alberta = service.detail_records()[1].price_range_usd.unwrap_or_default();
        assert!((alberta - 7.5).abs() < 1e-9);
        // "JPY 1500" carries no decimal amount after the marker
        assert_eq!(service.detail_records()[0].price_range_usd, None);
        Ok(())
    }

    #[test]
    fn test_years_are_labels() -> Result<()> {
        let service = CreditingService::from_workbook(workbook(), ConversionMode::UsdAnchor)?;
        let PageView::Overall(view) = service.page(Page::Overall) else {
            panic!("expected overall page");
        };
        let years: Vec<_> = view.implemented_by_year.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(years, vec!["2007", "2013"]);
        Ok(())
    }

    #[test]
    fn test_sector_table() -> Result<()> {
        let service = CreditingService::from_workbook(workbook(), ConversionMode::UsdAnchor)?;
        let PageView::Sector(view) = service.page(Page::Sector) else {
            panic!("expected sector page");
        };
        assert_eq!(view.by_year.len(), 2);
        assert_eq!(view.by_sector[1].name, "Energy");
        Ok(())
    }

    #[test]
    fn test_missing_column_is_schema_error() {
        let mut broken = workbook();
        broken.overall.headers[2] = "State".to_string();
        let result = CreditingService::from_workbook(broken, ConversionMode::UsdAnchor);
        assert!(matches!(result, Err(AppError::SchemaError(_))));
    }
}
