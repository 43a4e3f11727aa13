use std::collections::HashMap;

use serde::Serialize;

use crate::models::{DetailRecord, OverallRecord, Page, SectorTable, Sheet};

pub const IMPLEMENTED: &str = "Implemented";

pub const ABOUT: &str = "Data last updated 31 March 2023. Crediting mechanisms are considered to be \
under development if they have legislature in place allowing for the future implementation of a \
carbon crediting system but have currently not issued any credits, either due to missing \
components such as registries and protocols. Data source: The World Bank \
(https://carbonpricingdashboard.worldbank.org/carbon_crediting).";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountPoint {
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusPoint {
    pub location: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MechanismPoint {
    pub mechanism: String,
    pub status: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricePoint {
    pub mechanism: String,
    pub price_range_usd: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub year: String,
    pub status: String,
    pub credits_issued: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabeledValue {
    pub label: String,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StackSeries {
    pub name: String,
    pub values: Vec<LabeledValue>,
}

#[derive(Debug, Serialize)]
pub struct OverallView<'a> {
    pub title: &'static str,
    pub jurisdiction_types: Vec<CountPoint>,
    pub status_map: Vec<StatusPoint>,
    pub implemented_by_year: Vec<CountPoint>,
    pub table: &'a Sheet,
}

#[derive(Debug, Serialize)]
pub struct DetailView<'a> {
    pub title: &'static str,
    pub credits_issued: Vec<MechanismPoint>,
    pub credits_retired: Vec<MechanismPoint>,
    pub prices: Vec<PricePoint>,
    pub issued_trend: Vec<TrendPoint>,
    pub table: &'a Sheet,
}

#[derive(Debug, Serialize)]
pub struct SectorView<'a> {
    pub title: &'static str,
    pub by_year: Vec<StackSeries>,
    pub by_sector: Vec<StackSeries>,
    pub table: &'a Sheet,
}

#[derive(Debug, Serialize)]
pub struct IssuancesView<'a> {
    pub title: &'static str,
    pub table: &'a Sheet,
}

#[derive(Debug, Serialize)]
#[serde(tag = "page")]
pub enum PageView<'a> {
    Overall(OverallView<'a>),
    Detail(DetailView<'a>),
    Sector(SectorView<'a>),
    Issuances(IssuancesView<'a>),
}

#[derive(Debug, Serialize)]
pub struct PageSummary {
    pub name: String,
    pub title: &'static str,
}

pub fn summaries() -> Vec<PageSummary> {
    Page::ALL
        .iter()
        .map(|p| PageSummary {
            name: p.to_string(),
            title: p.title(),
        })
        .collect()
}

pub fn value_counts<I, S>(values: I) -> Vec<CountPoint>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut counts: Vec<CountPoint> = Vec::new();
    for value in values {
        let value = value.as_ref();
        match positions.get(value) {
            Some(&i) => counts[i].count += 1,
            None => {
                positions.insert(value.to_string(), counts.len());
                counts.push(CountPoint {
                    label: value.to_string(),
                    count: 1,
                });
            }
        }
    }
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

pub fn overall<'a>(table: &'a Sheet, records: &[OverallRecord]) -> OverallView<'a> {
    let jurisdiction_types = value_counts(
        records
            .iter()
            .filter(|r| !r.jurisdiction_type.is_empty())
            .map(|r| &r.jurisdiction_type),
    );
    let status_map = records
        .iter()
        .filter(|r| !r.jurisdiction.is_empty())
        .map(|r| StatusPoint {
            location: r.jurisdiction.clone(),
            status: r.status.clone(),
        })
        .collect();
    let mut implemented_by_year = value_counts(
        records
            .iter()
            .filter(|r| r.status == IMPLEMENTED)
            .filter_map(|r| r.year.as_ref()),
    );
    implemented_by_year.sort_by(|a, b| a.label.cmp(&b.label));
    OverallView {
        title: Page::Overall.title(),
        jurisdiction_types,
        status_map,
        implemented_by_year,
        table,
    }
}

pub fn detail<'a>(table: &'a Sheet, records: &[DetailRecord]) -> DetailView<'a> {
    let by_mechanism = |pick: fn(&DetailRecord) -> Option<f64>| {
        records
            .iter()
            .filter_map(|r| {
                pick(r).map(|value| MechanismPoint {
                    mechanism: r.mechanism.clone(),
                    status: r.status.clone(),
                    value,
                })
            })
            .collect::<Vec<_>>()
    };
    let prices = records
        .iter()
        .filter_map(|r| {
            r.price_range_usd.map(|price_range_usd| PricePoint {
                mechanism: r.mechanism.clone(),
                price_range_usd,
            })
        })
        .collect();
    let mut issued_trend = records
        .iter()
        .filter_map(|r| {
            let year = r.year.clone()?;
            let credits_issued = r.credits_issued?;
            Some(TrendPoint {
                year,
                status: r.status.clone(),
                credits_issued,
            })
        })
        .collect::<Vec<_>>();
    issued_trend.sort_by(|a, b| a.year.cmp(&b.year));
    DetailView {
        title: Page::Detail.title(),
        credits_issued: by_mechanism(|r| r.credits_issued),
        credits_retired: by_mechanism(|r| r.credits_retired),
        prices,
        issued_trend,
        table,
    }
}

/// The year-stacked chart leaves out the first value column, as the source
/// workbook's first column after `Sectors` is not a year.
pub fn sector<'a>(table: &'a Sheet, sectors: &SectorTable) -> SectorView<'a> {
    let by_year = sectors
        .columns
        .iter()
        .enumerate()
        .skip(1)
        .map(|(i, column)| StackSeries {
            name: column.clone(),
            values: sectors
                .rows
                .iter()
                .map(|row| LabeledValue {
                    label: row.sector.clone(),
                    value: row.values.get(i).copied().flatten(),
                })
                .collect(),
        })
        .collect();
    let by_sector = sectors
        .rows
        .iter()
        .map(|row| StackSeries {
            name: row.sector.clone(),
            values: sectors
                .columns
                .iter()
                .zip(row.values.iter())
                .map(|(column, value)| LabeledValue {
                    label: column.clone(),
                    value: *value,
                })
                .collect(),
        })
        .collect();
    SectorView {
        title: Page::Sector.title(),
        by_year,
        by_sector,
        table,
    }
}

pub fn issuances(table: &Sheet) -> IssuancesView<'_> {
    IssuancesView {
        title: Page::Issuances.title(),
        table,
    }
}
