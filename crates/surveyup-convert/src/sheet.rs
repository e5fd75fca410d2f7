//! Spreadsheet emitter for the platform's web-upload layout

use crate::error::ConvertError;
use rust_xlsxwriter::{Color, Format, Workbook, Worksheet, XlsxError};
use std::path::Path;
use surveyup_domain::{QuestionRecord, SurveyResult, MAX_RENDERED_OPTIONS};
use tracing::debug;

/// Name of the single worksheet
pub const SHEET_NAME: &str = "설문지";

/// Fixed columns before the option columns
pub const FIXED_HEADERS: [&str; 9] = [
    "문항번호",
    "콘솔번호",
    "프로그래밍 로직",
    "콘솔 로직",
    "응답가이드",
    "검수 로직",
    "질문유형",
    "보기유형",
    "문항",
];

const FIXED_WIDTHS: [f64; 9] = [10.0, 10.0, 20.0, 25.0, 30.0, 25.0, 10.0, 12.0, 70.0];
const OPTION_WIDTH: f64 = 30.0;

/// Zero-based row of the header; rows above it stay blank
pub const HEADER_ROW: u32 = 2;

const HEADER_FILL: u32 = 0xE0E0E0;

/// Header labels in column order, option columns included
pub fn headers() -> Vec<String> {
    FIXED_HEADERS
        .iter()
        .map(|h| h.to_string())
        .chain((1..=MAX_RENDERED_OPTIONS).map(|n| format!("보기{}", n)))
        .collect()
}

/// Write the survey as an `.xlsx` file at `path`
pub fn write_xlsx(survey: &SurveyResult, path: &Path) -> Result<(), ConvertError> {
    let mut workbook = build_workbook(survey).map_err(emit_error)?;
    workbook.save(path).map_err(emit_error)?;
    debug!("Wrote {} question rows to {:?}", survey.len(), path);
    Ok(())
}

/// Render the survey as `.xlsx` bytes
pub fn to_xlsx_bytes(survey: &SurveyResult) -> Result<Vec<u8>, ConvertError> {
    let mut workbook = build_workbook(survey).map_err(emit_error)?;
    workbook.save_to_buffer().map_err(emit_error)
}

fn build_workbook(survey: &SurveyResult) -> Result<Workbook, XlsxError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    let header_format = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(HEADER_FILL));
    for (col, header) in headers().iter().enumerate() {
        worksheet.write_string_with_format(HEADER_ROW, col as u16, header, &header_format)?;
    }

    for (offset, record) in survey.iter().enumerate() {
        write_record(worksheet, HEADER_ROW + 1 + offset as u32, record)?;
    }

    for (col, width) in FIXED_WIDTHS.iter().enumerate() {
        worksheet.set_column_width(col as u16, *width)?;
    }
    for n in 0..MAX_RENDERED_OPTIONS {
        worksheet.set_column_width((FIXED_HEADERS.len() + n) as u16, OPTION_WIDTH)?;
    }

    Ok(workbook)
}

fn write_record(worksheet: &mut Worksheet, row: u32, record: &QuestionRecord) -> Result<(), XlsxError> {
    let fixed = [
        Some(record.item_id.as_str()),
        Some(record.console_id.as_str()),
        record.programming_logic.as_deref(),
        record.console_logic.as_deref(),
        record.response_guide.as_deref(),
        record.review_logic.as_deref(),
        Some(record.question_type.platform_label()),
        Some(record.option_style.platform_label()),
        Some(record.prompt.as_str()),
    ];

    let options = record.rendered_options().iter().map(|o| Some(o.as_str()));

    for (col, value) in fixed.into_iter().chain(options).enumerate() {
        if let Some(text) = value.filter(|t| !t.is_empty()) {
            worksheet.write_string(row, col as u16, text)?;
        }
    }
    Ok(())
}

fn emit_error(e: XlsxError) -> ConvertError {
    ConvertError::Emit(e.to_string())
}
