use std::path::Path;

use google_sheets4::api::{
    BatchUpdateSpreadsheetRequest, DeleteDimensionRequest, DimensionRange, Request, Spreadsheet,
    ValueRange,
};
use google_sheets4::hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use google_sheets4::hyper_util::client::legacy::Client;
use google_sheets4::hyper_util::client::legacy::connect::HttpConnector;
use google_sheets4::hyper_util::rt::TokioExecutor;
use google_sheets4::Sheets;
use log::{debug, trace};
use serde_json::Value;

use super::{Storage, StorageError, keep_last, pick};
use crate::models::{FIELD_COUNT, WorkoutEntry};

pub const SPREADSHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

/// Only the tab properties are needed from the spreadsheet metadata.
const METADATA_FIELDS: &str = "sheets.properties";

/// Cells are stored as typed, never parsed as formulas or dates.
const VALUE_INPUT_OPTION: &str = "RAW";

const INSERT_DATA_OPTION: &str = "INSERT_ROWS";

/// Title and numeric id of one worksheet tab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetProperties {
    pub sheet_id: i64,
    pub title: String,
}

/// The slice of the Sheets API the remote backend needs.
#[allow(async_fn_in_trait)]
pub trait SheetsApi {
    /// Properties of every tab in the spreadsheet.
    async fn sheet_properties(&self) -> Result<Vec<SheetProperties>, StorageError>;

    /// All rows of an A1 range, cells rendered as text.
    async fn get_values(&self, range: &str) -> Result<Vec<Vec<String>>, StorageError>;

    /// Insert rows after the last row of `range`.
    async fn append_values(&self, range: &str, rows: Vec<Vec<String>>) -> Result<(), StorageError>;

    /// Delete rows `[start, end)` of the tab with numeric id `sheet_id`.
    async fn delete_rows(&self, sheet_id: i64, start: i64, end: i64) -> Result<(), StorageError>;
}

fn remote(context: &str) -> impl FnOnce(google_sheets4::Error) -> StorageError + '_ {
    move |e| StorageError::Remote(format!("{context}: {e}"))
}

fn cell_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Tabs listed in the metadata; a missing sheet id means tab `0`.
fn tab_properties(spreadsheet: Spreadsheet) -> Vec<SheetProperties> {
    spreadsheet
        .sheets
        .unwrap_or_default()
        .into_iter()
        .filter_map(|sheet| sheet.properties)
        .map(|props| SheetProperties {
            sheet_id: props.sheet_id.map(i64::from).unwrap_or(0),
            title: props.title.unwrap_or_default(),
        })
        .collect()
}

fn text_rows(range: ValueRange) -> Vec<Vec<String>> {
    range
        .values
        .unwrap_or_default()
        .into_iter()
        .map(|row| row.into_iter().map(cell_text).collect())
        .collect()
}

fn append_request(rows: Vec<Vec<String>>) -> ValueRange {
    ValueRange {
        major_dimension: Some("ROWS".into()),
        values: Some(
            rows.into_iter()
                .map(|row| row.into_iter().map(Value::String).collect())
                .collect(),
        ),
        ..Default::default()
    }
}

fn grid_index(n: i64) -> Result<i32, StorageError> {
    i32::try_from(n).map_err(|_| StorageError::Remote(format!("row {n} is out of range")))
}

/// One `deleteDimension` over rows `[start, end)` of tab `sheet_id`.
fn delete_rows_request(
    sheet_id: i64,
    start: i64,
    end: i64,
) -> Result<BatchUpdateSpreadsheetRequest, StorageError> {
    let range = DimensionRange {
        sheet_id: Some(grid_index(sheet_id)?),
        dimension: Some("ROWS".into()),
        start_index: Some(grid_index(start)?),
        end_index: Some(grid_index(end)?),
        ..Default::default()
    };

    Ok(BatchUpdateSpreadsheetRequest {
        requests: Some(vec![Request {
            delete_dimension: Some(DeleteDimensionRequest {
                range: Some(range),
                ..Default::default()
            }),
            ..Default::default()
        }]),
        ..Default::default()
    })
}

/// Sheets v4 hub authenticated with a service-account key.
pub struct HttpSheetsClient {
    hub: Sheets<HttpsConnector<HttpConnector>>,
    spreadsheet_id: String,
}

impl HttpSheetsClient {
    /// Read the service-account key at `credentials` and build the hub.
    /// Tokens for [`SPREADSHEETS_SCOPE`] are fetched by the hub on first use.
    pub async fn connect(spreadsheet_id: &str, credentials: &Path) -> Result<Self, StorageError> {
        let key = yup_oauth2::read_service_account_key(credentials)
            .await
            .map_err(|e| {
                StorageError::Config(format!(
                    "reading service account key {}: {e}",
                    credentials.display()
                ))
            })?;

        let auth = yup_oauth2::ServiceAccountAuthenticator::builder(key)
            .build()
            .await
            .map_err(|e| StorageError::Remote(format!("creating sheets service: {e}")))?;

        let connector = HttpsConnectorBuilder::new()
            .with_native_roots()
            .map_err(|e| StorageError::Remote(format!("loading root certificates: {e}")))?
            .https_only()
            .enable_http1()
            .build();
        let client = Client::builder(TokioExecutor::new()).build(connector);

        debug!("sheets hub ready for spreadsheet {spreadsheet_id}");

        Ok(Self {
            hub: Sheets::new(client, auth),
            spreadsheet_id: spreadsheet_id.to_string(),
        })
    }
}

impl SheetsApi for HttpSheetsClient {
    async fn sheet_properties(&self) -> Result<Vec<SheetProperties>, StorageError> {
        trace!("get spreadsheet {} ({METADATA_FIELDS})", self.spreadsheet_id);
        let (_, spreadsheet) = self
            .hub
            .spreadsheets()
            .get(&self.spreadsheet_id)
            .param("fields", METADATA_FIELDS)
            .add_scope(SPREADSHEETS_SCOPE)
            .doit()
            .await
            .map_err(remote("reading spreadsheet metadata"))?;
        Ok(tab_properties(spreadsheet))
    }

    async fn get_values(&self, range: &str) -> Result<Vec<Vec<String>>, StorageError> {
        trace!("values get {range}");
        let (_, values) = self
            .hub
            .spreadsheets()
            .values_get(&self.spreadsheet_id, range)
            .add_scope(SPREADSHEETS_SCOPE)
            .doit()
            .await
            .map_err(remote("reading sheet values"))?;
        Ok(text_rows(values))
    }

    async fn append_values(&self, range: &str, rows: Vec<Vec<String>>) -> Result<(), StorageError> {
        trace!("values append {range} ({} rows)", rows.len());
        self.hub
            .spreadsheets()
            .values_append(append_request(rows), &self.spreadsheet_id, range)
            .value_input_option(VALUE_INPUT_OPTION)
            .insert_data_option(INSERT_DATA_OPTION)
            .add_scope(SPREADSHEETS_SCOPE)
            .doit()
            .await
            .map_err(remote("appending sheet row"))?;
        Ok(())
    }

    async fn delete_rows(&self, sheet_id: i64, start: i64, end: i64) -> Result<(), StorageError> {
        trace!("batch update: delete rows {start}..{end} of tab {sheet_id}");
        self.hub
            .spreadsheets()
            .batch_update(delete_rows_request(sheet_id, start, end)?, &self.spreadsheet_id)
            .add_scope(SPREADSHEETS_SCOPE)
            .doit()
            .await
            .map_err(remote("deleting sheet row"))?;
        Ok(())
    }
}

/// Entries stored as rows of columns A..G of one worksheet tab.
///
/// Unlike the local files there is no year partitioning: `recent` and
/// `last_training_day` look at the whole sheet.
pub struct SheetsStorage<C> {
    client: C,
    sheet_name: String,
    sheet_id: i64,
}

impl<C: SheetsApi> SheetsStorage<C> {
    /// Resolve the numeric id of `sheet_name`; deletions address tabs by id.
    pub async fn connect(client: C, sheet_name: &str) -> Result<Self, StorageError> {
        let tabs = client.sheet_properties().await?;
        let sheet_id = tabs
            .iter()
            .find(|tab| tab.title == sheet_name)
            .map(|tab| tab.sheet_id)
            .ok_or_else(|| {
                StorageError::Config(format!("sheet tab {sheet_name:?} not found in spreadsheet"))
            })?;

        Ok(Self {
            client,
            sheet_name: sheet_name.to_string(),
            sheet_id,
        })
    }

    pub fn sheet_id(&self) -> i64 {
        self.sheet_id
    }

    /// `'<tab>'!A:G`
    fn range(&self) -> String {
        format!("'{}'!A:G", self.sheet_name.replace('\'', "''"))
    }

    /// Every entry in the tab. Rows with an empty first cell and a `date`
    /// header row are skipped; survivors keep their raw row position as
    /// `row_index`, which is what deletion targets.
    async fn read_all_entries(&self) -> Result<Vec<WorkoutEntry>, StorageError> {
        let rows = self.client.get_values(&self.range()).await?;
        trace!("fetched {} raw rows", rows.len());

        Ok(rows
            .iter()
            .enumerate()
            .map(|(i, row)| WorkoutEntry::from_row(row, i as i64))
            .filter(|e| !e.date.is_empty() && !e.date.eq_ignore_ascii_case("date"))
            .collect())
    }
}

impl<C: SheetsApi> Storage for SheetsStorage<C> {
    async fn append(&self, entry: &WorkoutEntry) -> Result<(), StorageError> {
        let row = entry.to_row();
        debug_assert_eq!(row.len(), FIELD_COUNT);
        self.client.append_values(&self.range(), vec![row]).await?;
        debug!("appended {} entry to tab {:?}", entry.date, self.sheet_name);
        Ok(())
    }

    async fn recent(&self, limit: usize) -> Result<Vec<WorkoutEntry>, StorageError> {
        Ok(keep_last(self.read_all_entries().await?, limit))
    }

    async fn search_by_date(&self, date: &str) -> Result<Vec<WorkoutEntry>, StorageError> {
        let mut entries = self.read_all_entries().await?;
        entries.retain(|e| e.date == date);
        Ok(entries)
    }

    async fn remove_by_date_index(&self, date: &str, index: usize) -> Result<(), StorageError> {
        let rows: Vec<i64> = self
            .search_by_date(date)
            .await?
            .iter()
            .filter_map(|e| e.row_index)
            .collect();
        let target = pick(&rows, index)?;

        self.client
            .delete_rows(self.sheet_id, target, target + 1)
            .await?;
        debug!("deleted row {target} ({date} #{index}) from tab {:?}", self.sheet_name);
        Ok(())
    }

    async fn last_training_day(&self) -> Result<Option<(String, String)>, StorageError> {
        Ok(self
            .read_all_entries()
            .await?
            .pop()
            .map(|e| (e.day, e.date)))
    }
}
