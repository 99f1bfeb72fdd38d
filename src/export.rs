// src/export.rs

use crate::db::LOG_COLUMNS;
use crate::error::Result;
use crate::models::TrainingLog;
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use std::path::Path;
use tracing::info;

pub const SHEET_NAME: &str = "training_logs";

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Number(i64),
    Text(String),
}

/// The bold first row: column names in `LOG_COLUMNS` order.
pub fn header_row() -> Vec<Cell> {
    LOG_COLUMNS.iter().map(|c| Cell::Text(c.to_string())).collect()
}

/// One sheet row per log, in `LOG_COLUMNS` order. `id` is the 1-based row number.
pub fn log_rows(logs: &[TrainingLog]) -> Vec<Vec<Cell>> {
    logs.iter()
        .enumerate()
        .map(|(i, log)| {
            vec![
                Cell::Number(i as i64 + 1),
                Cell::Text(log.username.clone()),
                Cell::Text(log.date_str()),
                Cell::Number(log.duration),
                Cell::Text(log.location.as_str().to_string()),
                Cell::Text(log.intensity.as_str().to_string()),
                Cell::Text(log.satisfaction.as_str().to_string()),
                Cell::Text(log.gudan_content.clone()),
                Cell::Number(log.p_swing),
                Cell::Number(log.p_live),
                Cell::Number(log.p_defense),
                Cell::Number(log.p_pitching),
                Cell::Number(log.p_running),
                Cell::Number(log.p_hanging),
                Cell::Text(log.p_etc.clone()),
                Cell::Text(log.coach_feedback.clone()),
                Cell::Text(log.self_good.clone()),
                Cell::Text(log.self_bad.clone()),
                Cell::Text(log.promise.clone()),
                Cell::Text(log.memo.clone()),
                Cell::Text(log.log_type.as_str().to_string()),
                Cell::Text(log.tactical_image.clone()),
            ]
        })
        .collect()
}

/// Builds the workbook in memory and returns the `.xlsx` bytes.
pub fn to_xlsx(logs: &[TrainingLog]) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let mut worksheet = Worksheet::new();
    worksheet.set_name(SHEET_NAME)?;

    let header = Format::new().set_bold();
    for (c, cell) in header_row().iter().enumerate() {
        if let Cell::Text(name) = cell {
            worksheet.write_string_with_format(0, c as u16, name.as_str(), &header)?;
        }
    }

    for (r, row) in log_rows(logs).iter().enumerate() {
        let r = (r + 1) as u32;
        for (c, cell) in row.iter().enumerate() {
            match cell {
                Cell::Number(n) => worksheet.write_number(r, c as u16, *n as f64)?,
                Cell::Text(s) => worksheet.write_string(r, c as u16, s.as_str())?,
            };
        }
    }

    workbook.push_worksheet(worksheet);
    Ok(workbook.save_to_buffer()?)
}

/// Writes the workbook to `path` and returns the number of data rows below the header.
pub fn write_xlsx(logs: &[TrainingLog], path: &Path) -> Result<usize> {
    let bytes = to_xlsx(logs)?;
    std::fs::write(path, &bytes)?;
    info!(path = %path.display(), rows = logs.len(), bytes = bytes.len(), "Exported logs");
    Ok(logs.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{parse_date, LogType};

    fn sample() -> Vec<TrainingLog> {
        let mut a = TrainingLog::new("kim", parse_date("2024-06-03").unwrap(), LogType::Daily);
        a.p_swing = 50;
        a.memo = "good day".to_string();
        let b = TrainingLog::new("lee", parse_date("2024-06-04").unwrap(), LogType::Daily);
        vec![a, b]
    }

    #[test]
    fn rows_follow_column_order() {
        let rows = log_rows(&sample());
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.len() == LOG_COLUMNS.len()));

        let first = &rows[0];
        assert_eq!(first[0], Cell::Number(1));
        assert_eq!(first[1], Cell::Text("kim".to_string()));
        assert_eq!(first[2], Cell::Text("2024-06-03".to_string()));
        assert_eq!(first[8], Cell::Number(50));
        assert_eq!(first[19], Cell::Text("good day".to_string()));
        assert_eq!(first[20], Cell::Text("daily".to_string()));
        assert_eq!(rows[1][0], Cell::Number(2));
    }

    #[test]
    fn header_matches_store_columns() {
        let header = header_row();
        assert_eq!(header.len(), LOG_COLUMNS.len());
        assert_eq!(header[0], Cell::Text("id".to_string()));
        assert_eq!(header[8], Cell::Text("p_swing".to_string()));
        assert_eq!(header[21], Cell::Text("tactical_image".to_string()));
        assert_eq!(header.len(), log_rows(&sample())[0].len());
    }

    #[test]
    fn writes_an_xlsx_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs.xlsx");
        assert_eq!(write_xlsx(&sample(), &path).unwrap(), 2);

        let bytes = std::fs::read(&path).unwrap();
        // xlsx is a zip container
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn empty_export_still_has_a_header_sheet() {
        let bytes = to_xlsx(&[]).unwrap();
        assert!(!bytes.is_empty());
    }
}
