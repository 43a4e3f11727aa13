use std::{fmt::Display, str::FromStr};

use calamine::Data;
use serde::{Deserialize, Serialize};

use crate::AppError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Empty,
    Bool(bool),
    Number(f64),
    Text(String),
}
impl Cell {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().replace(',', "").parse::<f64>().ok(),
            _ => None,
        }
    }
    /// Text form used for categorical columns: whole numbers lose the `.0`
    pub fn as_label(&self) -> Option<String> {
        match self {
            Self::Empty => None,
            Self::Bool(b) => Some(b.to_string()),
            Self::Number(n) if n.fract() == 0.0 && n.is_finite() => Some(format!("{n:.0}")),
            Self::Number(n) => Some(n.to_string()),
            Self::Text(s) if s.trim().is_empty() => None,
            Self::Text(s) => Some(s.trim().to_string()),
        }
    }
}
impl From<&Data> for Cell {
    fn from(value: &Data) -> Self {
        match value {
            Data::Empty | Data::Error(_) => Self::Empty,
            Data::Int(i) => Self::Number(*i as f64),
            Data::Float(f) => Self::Number(*f),
            Data::Bool(b) => Self::Bool(*b),
            Data::String(s) => Self::Text(s.clone()),
            other => Self::Text(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sheet {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}
impl Sheet {
    pub fn column(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header)
    }
    pub fn require_column(&self, header: &str) -> crate::Result<usize> {
        self.column(header).ok_or_else(|| {
            AppError::SchemaError(format!("sheet '{}' has no column '{header}'", self.name))
        })
    }
    pub fn cell<'a>(row: &'a [Cell], index: usize) -> &'a Cell {
        row.get(index).unwrap_or(&Cell::Empty)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverallRecord {
    pub jurisdiction_type: String,
    pub jurisdiction: String,
    pub status: String,
    pub year: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailRecord {
    pub mechanism: String,
    pub status: String,
    pub year: Option<String>,
    pub credits_issued: Option<f64>,
    pub credits_retired: Option<f64>,
    pub price_range: Option<String>,
    pub price_range_usd: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectorRow {
    pub sector: String,
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectorTable {
    pub columns: Vec<String>,
    pub rows: Vec<SectorRow>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Page {
    #[default]
    Overall,
    Detail,
    Sector,
    Issuances,
}
impl Page {
    pub const ALL: [Page; 4] = [Page::Overall, Page::Detail, Page::Sector, Page::Issuances];

    pub fn title(&self) -> &'static str {
        match self {
            Self::Overall => "Overall Carbon Crediting Data",
            Self::Detail => "Detailed Carbon Crediting Data",
            Self::Sector => "Industry Sector",
            Self::Issuances => "Carbon Credit Issuances",
        }
    }
}
impl Display for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Overall => "Overall",
            Self::Detail => "Detail",
            Self::Sector => "Sector",
            Self::Issuances => "Issuances",
        };
        write!(f, "{s}")
    }
}
impl FromStr for Page {
    type Err = AppError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Page::ALL
            .into_iter()
            .find(|p| p.to_string().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| AppError::NotFound(format!("page '{s}'")))
    }
}
