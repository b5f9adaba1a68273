//! Monthly report documents: word-processor, spreadsheet and printable output

mod docx;
mod error;
mod layout;
mod printable;
mod spreadsheet;

pub use docx::render_narrative_document;
pub use error::RenderError;
pub use layout::{layout_monthly_report, Block, RenderContext, ReportLayout};
pub use printable::{flatten_symbols, render_plain_text, render_printable_narrative};
pub use spreadsheet::{
    plan_workbook, render_spreadsheet, CellValue, ChartPlan, ChartStyle, SheetPlan,
};
