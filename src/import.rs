//! Loader for the land-price survey tables.
//!
//! The survey workbook is exported to JSON with one object per spreadsheet
//! row, keyed by the spreadsheet column headers. Rows are flattened across
//! sheets, cleaned, and written over the current table contents.

use crate::errors::ChikaError;
use crate::schemas::PropertyCreate;
use crate::storage;
use sea_orm::DatabaseConnection;
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::fs;
use std::path::Path;

/// Marks a cell as "same as the row above".
pub const DITTO: &str = "〃";

/// One spreadsheet row. Cells may be text, numbers, or empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SurveyRow {
    #[serde(rename = "都道府県名", default)]
    pub prefecture: Value,
    #[serde(rename = "市区名", default)]
    pub city: Value,
    #[serde(rename = "基準地数", default)]
    pub base_points: Value,
    #[serde(rename = "平均価格", default)]
    pub average_price: Value,
    #[serde(rename = "最上位の価格", default)]
    pub highest_price: Value,
    #[serde(rename = "最下位の価格", default)]
    pub lowest_price: Value,
}

/// Sheets keyed by name, in the order they appear in the file.
pub type Sheets = Vec<(String, Vec<SurveyRow>)>;

/// Root of the export file: a map of sheet name to rows, or a flat row list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SurveyFile {
    Sheets {
        #[serde(deserialize_with = "sheets_in_order")]
        sheets: Sheets,
    },
    Rows {
        rows: Vec<SurveyRow>,
    },
}

impl SurveyFile {
    pub fn into_rows(self) -> Vec<SurveyRow> {
        match self {
            SurveyFile::Sheets { sheets } => sheets.into_iter().flat_map(|(_, rows)| rows).collect(),
            SurveyFile::Rows { rows } => rows,
        }
    }
}

fn sheets_in_order<'de, D>(deserializer: D) -> Result<Sheets, D::Error>
where
    D: Deserializer<'de>,
{
    struct SheetsVisitor;

    impl<'de> Visitor<'de> for SheetsVisitor {
        type Value = Sheets;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a map of sheet name to row list")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Sheets, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut sheets = Vec::new();
            while let Some(entry) = map.next_entry::<String, Vec<SurveyRow>>()? {
                sheets.push(entry);
            }
            Ok(sheets)
        }
    }

    deserializer.deserialize_map(SheetsVisitor)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub read: usize,
    pub dropped: usize,
    pub inserted: u64,
}

/// Clean survey rows into properties.
///
/// Rows without a numeric average price are dropped first. Every remaining
/// row then inherits the prefecture of the nearest row above it when its own
/// is blank or a ditto mark, and only after that are rows without a city
/// dropped. Prices are truncated to whole yen.
pub fn transform(rows: Vec<SurveyRow>) -> (Vec<PropertyCreate>, usize) {
    let mut out = Vec::with_capacity(rows.len());
    let mut dropped = 0;
    let mut last_prefecture = String::new();

    for row in rows {
        let Some(price) = parse_price(&row.average_price) else {
            dropped += 1;
            continue;
        };

        match cell_text(&row.prefecture) {
            Some(p) if p != DITTO => last_prefecture = p,
            _ => {}
        }

        let Some(city) = cell_text(&row.city) else {
            dropped += 1;
            continue;
        };

        out.push(PropertyCreate::new(city, last_prefecture.clone(), price.trunc()));
    }

    (out, dropped)
}

fn cell_text(cell: &Value) -> Option<String> {
    let text = match cell {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn parse_price(cell: &Value) -> Option<f64> {
    let price = match cell {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let cleaned: String = s
                .chars()
                .filter(|c| !c.is_whitespace() && *c != ',' && *c != '，')
                .collect();
            cleaned.parse::<f64>().ok()?
        }
        _ => return None,
    };
    price.is_finite().then_some(price)
}

pub fn parse_survey(content: &str) -> Result<SurveyFile, ChikaError> {
    serde_json::from_str(content).map_err(|e| ChikaError::Import(e.to_string()))
}

/// Replace the table contents with the rows from a survey export file.
pub async fn import_file(db: &DatabaseConnection, path: &Path) -> Result<ImportReport, ChikaError> {
    tracing::info!("Loading survey rows from {}", path.display());

    let content = fs::read_to_string(path)?;
    let rows = parse_survey(&content)?.into_rows();
    let read = rows.len();

    let (properties, dropped) = transform(rows);
    if dropped > 0 {
        tracing::warn!(dropped, "skipped rows without a numeric average price or city");
    }

    let inserted = storage::replace_all(db, properties).await?;

    tracing::info!(
        "Import complete: {} read, {} dropped, {} inserted",
        read,
        dropped,
        inserted
    );

    Ok(ImportReport {
        read,
        dropped,
        inserted,
    })
}
