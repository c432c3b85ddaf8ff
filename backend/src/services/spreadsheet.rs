//! Spreadsheet import/export and the lamination dispatch note
//!
//! Import accepts rows shaped like rolls minus the id. Spreadsheet tools
//! hand dates over either as ISO strings or as day counts from the
//! 1899-12-30 epoch, so both are parsed; a bad date fails that row and
//! the whole import is rejected rather than half-applied.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use shared::{
    derive_measurements, validate_roll, BagProduction, FabricType, Roll, RollStatus,
};

use crate::error::{AppError, AppResult, RowError};
use crate::repository::Repository;

/// Spreadsheet service
#[derive(Clone)]
pub struct SpreadsheetService {
    repo: Repository,
}

/// One imported row; the roll shape minus id, with a flexible date.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRow {
    pub serial_number: String,
    pub operator_name: String,
    #[serde(default)]
    pub loom_no: Option<String>,
    #[serde(default)]
    pub width: Option<Decimal>,
    #[serde(default)]
    pub gram: Option<Decimal>,
    pub fabric_type: FabricType,
    pub color: String,
    #[serde(default, alias = "lamination")]
    pub is_laminated: Option<LaminationField>,
    pub mtrs: Decimal,
    pub gw: Decimal,
    pub cw: Decimal,
    #[serde(default)]
    pub status: Option<RollStatus>,
    #[serde(default)]
    pub production_date: Option<SpreadsheetDate>,
    #[serde(default)]
    pub consumed_by: Option<String>,
    #[serde(default)]
    pub so_number: Option<String>,
    #[serde(default)]
    pub po_number: Option<String>,
    #[serde(default)]
    pub call_out: Option<String>,
    #[serde(default)]
    pub received_serial_number: Option<String>,
    #[serde(default)]
    pub no_of_bags: Option<u32>,
    #[serde(default)]
    pub avg_bag_weight: Option<Decimal>,
    #[serde(default)]
    pub bag_size: Option<String>,
}

/// Lamination as spreadsheets deliver it: a boolean or a legacy label.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum LaminationField {
    Flag(bool),
    Label(String),
}

impl LaminationField {
    fn as_bool(&self) -> Result<bool, String> {
        match self {
            LaminationField::Flag(flag) => Ok(*flag),
            LaminationField::Label(label) => match label.as_str() {
                "Lam active" | "Laminated" => Ok(true),
                "Unlammed" | "Unlaminated" => Ok(false),
                other => Err(format!("Unknown lamination value: {}", other)),
            },
        }
    }
}

/// A date cell: ISO string or spreadsheet day count.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SpreadsheetDate {
    Serial(f64),
    Text(String),
}

/// Day zero of the spreadsheet date system.
fn spreadsheet_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1899, 12, 30).expect("valid epoch date")
}

/// Parse a date cell into a UTC timestamp.
pub fn parse_spreadsheet_date(value: &SpreadsheetDate) -> Result<DateTime<Utc>, String> {
    match value {
        SpreadsheetDate::Serial(days) => {
            if !days.is_finite() || *days < 0.0 {
                return Err(format!("Invalid day count: {}", days));
            }
            let seconds = (days * 86_400.0).round() as i64;
            let midnight = spreadsheet_epoch()
                .and_hms_opt(0, 0, 0)
                .expect("valid midnight");
            let naive = midnight
                .checked_add_signed(Duration::seconds(seconds))
                .ok_or_else(|| format!("Day count out of range: {}", days))?;
            Ok(Utc.from_utc_datetime(&naive))
        }
        SpreadsheetDate::Text(text) => {
            if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
                return Ok(dt.with_timezone(&Utc));
            }
            if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
                let naive = date.and_hms_opt(0, 0, 0).expect("valid midnight");
                return Ok(Utc.from_utc_datetime(&naive));
            }
            Err(format!("Invalid date: {}", text))
        }
    }
}

impl SpreadsheetService {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Import rows into the roll collection. All rows are validated
    /// before anything is applied; any failure rejects the whole batch
    /// with per-row details.
    pub async fn import(&self, rows: Vec<serde_json::Value>) -> AppResult<Vec<Roll>> {
        if rows.is_empty() {
            return Err(AppError::ValidationError(
                "The import file contains no rows".to_string(),
            ));
        }

        let mut imported = Vec::with_capacity(rows.len());
        let mut errors = Vec::new();

        for (index, raw) in rows.into_iter().enumerate() {
            match row_to_roll(raw) {
                Ok(roll) => imported.push(roll),
                Err((field, message)) => errors.push(RowError {
                    row: index,
                    field,
                    message,
                }),
            }
        }

        if !errors.is_empty() {
            return Err(AppError::ImportRejected(errors));
        }

        let count = imported.len();
        let result = self
            .repo
            .mutate(move |rolls, _| {
                rolls.extend(imported.iter().cloned());
                Ok(imported)
            })
            .await?;
        tracing::info!(rows = count, "spreadsheet import applied");
        Ok(result)
    }

    /// The full roll collection as CSV.
    pub async fn export_csv(&self) -> AppResult<String> {
        let rolls = self.repo.rolls().await;
        rolls_to_csv(&rolls)
    }

    /// Plain-text dispatch note for the selected rolls and their
    /// call-out notes.
    pub async fn dispatch_note(&self, ids: &[Uuid]) -> AppResult<String> {
        if ids.is_empty() {
            return Err(AppError::ValidationError(
                "At least one roll must be selected".to_string(),
            ));
        }

        let rolls = self.repo.rolls().await;
        let mut selected = Vec::with_capacity(ids.len());
        for id in ids {
            let roll = rolls
                .iter()
                .find(|r| r.id == *id)
                .ok_or_else(|| AppError::NotFound(format!("Roll {}", id)))?;
            selected.push(roll);
        }

        let mut note = String::new();
        note.push_str("LAMINATION DISPATCH NOTE\n");
        note.push_str(&format!(
            "Generated: {}\n\n",
            Utc::now().format("%Y-%m-%d %H:%M UTC")
        ));
        note.push_str(&format!(
            "{:<16}{:>10}{:>10}{:>10}  {}\n",
            "Roll No", "Mtrs", "G.W.", "N.W.", "Call Out"
        ));

        let mut total_mtrs = Decimal::ZERO;
        let mut total_nw = Decimal::ZERO;
        for roll in &selected {
            total_mtrs += roll.mtrs;
            total_nw += roll.nw;
            note.push_str(&format!(
                "{:<16}{:>10}{:>10}{:>10}  {}\n",
                roll.serial_number,
                roll.mtrs,
                roll.gw,
                roll.nw,
                roll.call_out.as_deref().unwrap_or("-")
            ));
        }

        note.push_str(&format!(
            "\nRolls: {}  Total meters: {}  Total net weight: {}\n",
            selected.len(),
            total_mtrs,
            total_nw
        ));
        Ok(note)
    }
}

/// Serialize rolls to CSV with bag fields flattened.
pub fn rolls_to_csv(rolls: &[Roll]) -> AppResult<String> {
    #[derive(serde::Serialize)]
    #[serde(rename_all = "camelCase")]
    struct ExportRow<'a> {
        serial_number: &'a str,
        operator_name: &'a str,
        loom_no: &'a str,
        width: Option<Decimal>,
        gram: Option<Decimal>,
        fabric_type: String,
        color: &'a str,
        is_laminated: bool,
        mtrs: Decimal,
        gw: Decimal,
        cw: Decimal,
        nw: Decimal,
        average: Decimal,
        variance_band: &'a str,
        status: &'a str,
        production_date: String,
        consumed_by: &'a str,
        so_number: &'a str,
        po_number: &'a str,
        call_out: &'a str,
        received_serial_number: &'a str,
        no_of_bags: Option<u32>,
        avg_bag_weight: Option<Decimal>,
        bag_size: &'a str,
    }

    let mut wtr = csv::Writer::from_writer(vec![]);
    for roll in rolls {
        let bags = roll.bag_production.as_ref();
        let row = ExportRow {
            serial_number: &roll.serial_number,
            operator_name: &roll.operator_name,
            loom_no: roll.loom_no.as_deref().unwrap_or(""),
            width: roll.width,
            gram: roll.gram,
            fabric_type: roll.fabric_type.to_string(),
            color: &roll.color,
            is_laminated: roll.is_laminated,
            mtrs: roll.mtrs,
            gw: roll.gw,
            cw: roll.cw,
            nw: roll.nw,
            average: roll.average,
            variance_band: &roll.variance_band,
            status: roll.status.as_str(),
            production_date: roll.production_date.to_rfc3339(),
            consumed_by: roll.consumed_by.as_deref().unwrap_or(""),
            so_number: roll.so_number.as_deref().unwrap_or(""),
            po_number: roll.po_number.as_deref().unwrap_or(""),
            call_out: roll.call_out.as_deref().unwrap_or(""),
            received_serial_number: roll.received_serial_number.as_deref().unwrap_or(""),
            no_of_bags: bags.and_then(|b| b.no_of_bags),
            avg_bag_weight: bags.and_then(|b| b.avg_bag_weight),
            bag_size: bags.and_then(|b| b.bag_size.as_deref()).unwrap_or(""),
        };
        wtr.serialize(row)
            .map_err(|e| AppError::Internal(format!("CSV serialization error: {}", e)))?;
    }

    let csv_data = String::from_utf8(
        wtr.into_inner()
            .map_err(|e| AppError::Internal(format!("CSV writer error: {}", e)))?,
    )
    .map_err(|e| AppError::Internal(format!("UTF-8 conversion error: {}", e)))?;
    Ok(csv_data)
}

/// Turn a raw JSON row into a validated roll.
///
/// Returns `(field, message)` on failure so the caller can report which
/// row and which column went wrong.
fn row_to_roll(raw: serde_json::Value) -> Result<Roll, (String, String)> {
    let row: ImportRow = serde_json::from_value(raw)
        .map_err(|e| ("row".to_string(), format!("Malformed row: {}", e)))?;

    let production_date = match &row.production_date {
        Some(value) => parse_spreadsheet_date(value)
            .map_err(|msg| ("productionDate".to_string(), msg))?,
        None => Utc::now(),
    };

    let is_laminated = match &row.is_laminated {
        Some(field) => field
            .as_bool()
            .map_err(|msg| ("lamination".to_string(), msg))?,
        None => false,
    };

    let bag_production = if row.no_of_bags.is_some()
        || row.avg_bag_weight.is_some()
        || row.bag_size.is_some()
    {
        Some(BagProduction {
            no_of_bags: row.no_of_bags,
            avg_bag_weight: row.avg_bag_weight,
            bag_size: row.bag_size,
        })
    } else {
        None
    };

    let derived = derive_measurements(row.mtrs, row.gw, row.cw, row.width, row.gram);
    let roll = Roll {
        id: Uuid::new_v4(),
        serial_number: row.serial_number,
        operator_name: row.operator_name,
        loom_no: row.loom_no,
        width: row.width,
        gram: row.gram,
        fabric_type: row.fabric_type,
        color: row.color,
        is_laminated,
        mtrs: row.mtrs,
        gw: row.gw,
        cw: row.cw,
        nw: derived.nw,
        average: derived.average,
        variance_band: derived.variance_band,
        status: row.status.unwrap_or(RollStatus::ReadyForLamination),
        production_date,
        consumed_by: row.consumed_by,
        so_number: row.so_number,
        po_number: row.po_number,
        call_out: row.call_out,
        received_serial_number: row.received_serial_number,
        bag_production,
    };

    validate_roll(&roll).map_err(|msg| ("row".to_string(), msg.to_string()))?;
    Ok(roll)
}
