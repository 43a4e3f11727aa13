use std::collections::HashMap;

use serde_json::Value;
use tracing::debug;

use crate::{
    models::{Coin, QuoteUnit},
    AppError, Result,
};

pub const NEXT_DATA_ID: &str = "__NEXT_DATA__";
const INITIAL_STATE: &str = "/props/initialState";
const LISTING_DATA: &str = "/cryptocurrency/listingLatest/data";
const KEYS: &str = "keysArr";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteField {
    Price,
    PercentChange1h,
    PercentChange24h,
    PercentChange7d,
    MarketCap,
    Volume24h,
}
impl QuoteField {
    pub fn key(&self) -> &'static str {
        match self {
            Self::Price => "price",
            Self::PercentChange1h => "percentChange1h",
            Self::PercentChange24h => "percentChange24h",
            Self::PercentChange7d => "percentChange7d",
            Self::MarketCap => "marketCap",
            Self::Volume24h => "volume24h",
        }
    }
}

/// Attribute name -> position lookup built from `keysArr`. The first
/// occurrence of a repeated name wins.
#[derive(Debug, Clone, Default)]
pub struct AttributeIndex {
    offsets: HashMap<String, usize>,
}
impl AttributeIndex {
    pub fn new<S: AsRef<str>>(attributes: &[S]) -> Self {
        let mut offsets = HashMap::with_capacity(attributes.len());
        for (i, name) in attributes.iter().enumerate() {
            offsets.entry(name.as_ref().to_string()).or_insert(i);
        }
        Self { offsets }
    }
    pub fn offset(&self, name: &str) -> Result<usize> {
        self.offsets
            .get(name)
            .copied()
            .ok_or_else(|| AppError::SchemaError(format!("attribute '{name}' not found in {KEYS}")))
    }
    pub fn quote_offset(&self, unit: QuoteUnit, field: QuoteField) -> Result<usize> {
        self.offset(&format!("quote.{unit}.{}", field.key()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldIndex {
    pub id: usize,
    pub slug: usize,
    pub symbol: usize,
    pub price: usize,
    pub percent_change_1h: usize,
    pub percent_change_24h: usize,
    pub percent_change_7d: usize,
    pub market_cap: usize,
    pub volume_24h: usize,
}
impl FieldIndex {
    pub fn resolve(attributes: &AttributeIndex, unit: QuoteUnit) -> Result<Self> {
        let quote = |field| attributes.quote_offset(unit, field);
        Ok(Self {
            id: attributes.offset("id")?,
            slug: attributes.offset("slug")?,
            symbol: attributes.offset("symbol")?,
            price: quote(QuoteField::Price)?,
            percent_change_1h: quote(QuoteField::PercentChange1h)?,
            percent_change_24h: quote(QuoteField::PercentChange24h)?,
            percent_change_7d: quote(QuoteField::PercentChange7d)?,
            market_cap: quote(QuoteField::MarketCap)?,
            volume_24h: quote(QuoteField::Volume24h)?,
        })
    }
}

const SCRIPT_OPEN: &str = "<script";
const SCRIPT_CLOSE: &str = "</script";

/// Raw body of `<script id="__NEXT_DATA__" type="application/json">`.
/// Script content is raw text up to the first `</script`, so it is sliced out
/// of the page instead of going through the markup parser.
pub fn next_data(html: &str) -> Result<String> {
    let lower = html.to_ascii_lowercase();
    let mut from = 0;
    while let Some(start) = lower[from..].find(SCRIPT_OPEN).map(|i| i + from) {
        let after_name = start + SCRIPT_OPEN.len();
        if !lower[after_name..].starts_with(|c: char| c.is_ascii_whitespace() || c == '>') {
            from = after_name;
            continue;
        }
        let body_start = open_tag_end(html, start)?;
        let body_end = lower[body_start..]
            .find(SCRIPT_CLOSE)
            .map(|i| i + body_start)
            .ok_or_else(|| AppError::ScrapeError("unterminated <script> element".to_string()))?;
        if is_next_data(&html[start..body_start])? {
            return Ok(html[body_start..body_end].to_string());
        }
        from = body_end + SCRIPT_CLOSE.len();
    }
    Err(AppError::ScrapeError(format!(
        "page has no <script id=\"{NEXT_DATA_ID}\" type=\"application/json\">"
    )))
}

fn open_tag_end(html: &str, start: usize) -> Result<usize> {
    let mut quote = None;
    for (i, c) in html[start..].char_indices() {
        match (quote, c) {
            (None, '"' | '\'') => quote = Some(c),
            (Some(q), c) if c == q => quote = None,
            (None, '>') => return Ok(start + i + 1),
            _ => {}
        }
    }
    Err(AppError::ScrapeError("unterminated <script> tag".to_string()))
}

fn is_next_data(open_tag: &str) -> Result<bool> {
    let fragment = format!("{open_tag}</script>");
    let dom = tl::parse(&fragment, tl::ParserOptions::default())
        .map_err(|e| AppError::ScrapeError(e.to_string()))?;
    let Some(tag) = dom.children().first().and_then(|h| h.get(dom.parser())).and_then(|n| n.as_tag()) else {
        return Ok(false);
    };
    let attribute = |name: &'static str| {
        tag.attributes()
            .get(name)
            .flatten()
            .map(|v| v.as_utf8_str().to_string())
    };
    Ok(attribute("id").as_deref() == Some(NEXT_DATA_ID)
        && attribute("type").as_deref() == Some("application/json"))
}

/// Unwraps the JSON-in-JSON layer and returns the raw listing array:
/// element 0 holds `keysArr`, the rest are positional rows.
pub fn listing_data(next_data: &str) -> Result<Vec<Value>> {
    let outer: Value = serde_json::from_str(next_data)?;
    let initial_state = outer
        .pointer(INITIAL_STATE)
        .ok_or_else(|| AppError::SchemaError("props.initialState is missing".to_string()))?
        .as_str()
        .ok_or_else(|| AppError::SchemaError("props.initialState is not a JSON string".to_string()))?;
    let mut inner: Value = serde_json::from_str(initial_state)?;
    match inner.pointer_mut(LISTING_DATA).map(Value::take) {
        Some(Value::Array(data)) => Ok(data),
        Some(_) => Err(AppError::SchemaError(
            "cryptocurrency.listingLatest.data is not an array".to_string(),
        )),
        None => Err(AppError::SchemaError(
            "cryptocurrency.listingLatest.data is missing".to_string(),
        )),
    }
}

pub fn attributes(header: &Value) -> Result<Vec<String>> {
    header
        .get(KEYS)
        .and_then(Value::as_array)
        .ok_or_else(|| AppError::SchemaError(format!("first listing entry has no {KEYS} array")))?
        .iter()
        .map(|v| {
            v.as_str()
                .map(String::from)
                .ok_or_else(|| AppError::SchemaError(format!("{KEYS} holds a non-string: {v}")))
        })
        .collect()
}

pub fn extract(html: &str, unit: QuoteUnit) -> Result<Vec<Coin>> {
    let data = listing_data(&next_data(html)?)?;
    let (header, rows) = data
        .split_first()
        .ok_or_else(|| AppError::SchemaError("listing data is empty".to_string()))?;
    let attributes = AttributeIndex::new(&attributes(header)?);
    let index = FieldIndex::resolve(&attributes, unit)?;
    debug!("Resolved {unit} field offsets: {index:?}");
    rows.iter()
        .enumerate()
        .map(|(i, row)| coin(i + 1, row, &index))
        .collect()
}

fn coin(rank: usize, row: &Value, index: &FieldIndex) -> Result<Coin> {
    let cells = row
        .as_array()
        .ok_or_else(|| AppError::SchemaError(format!("listing row {rank} is not an array")))?;
    let cell = |offset: usize| {
        cells.get(offset).ok_or_else(|| {
            AppError::SchemaError(format!("listing row {rank} has no value at offset {offset}"))
        })
    };
    let text = |offset: usize| -> Result<String> {
        match cell(offset)? {
            Value::String(s) => Ok(s.clone()),
            other => Err(AppError::SchemaError(format!(
                "listing row {rank}: expected text at offset {offset}, got {other}"
            ))),
        }
    };
    let number = |offset: usize| -> Result<Option<f64>> {
        match cell(offset)? {
            Value::Null => Ok(None),
            Value::Number(n) => Ok(n.as_f64()),
            other => Err(AppError::SchemaError(format!(
                "listing row {rank}: expected a number at offset {offset}, got {other}"
            ))),
        }
    };
    let id = match cell(index.id)? {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        other => {
            return Err(AppError::SchemaError(format!(
                "listing row {rank}: unexpected id {other}"
            )))
        }
    };
    Ok(Coin {
        rank,
        id,
        coin_name: text(index.slug)?,
        coin_symbol: text(index.symbol)?,
        market_cap: number(index.market_cap)?,
        percent_change_1h: number(index.percent_change_1h)?,
        percent_change_24h: number(index.percent_change_24h)?,
        percent_change_7d: number(index.percent_change_7d)?,
        price: number(index.price)?,
        volume_24h: number(index.volume_24h)?,
    })
}
