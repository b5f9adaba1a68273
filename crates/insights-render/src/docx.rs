//! Word-processing document output

use crate::error::RenderError;
use crate::layout::{layout_monthly_report, Block, RenderContext};
use docx_rs::{AlignmentType, Docx, Paragraph, Run, Table, TableCell, TableRow};
use insights_core::MonthlySummary;
use std::io::Cursor;

// Run sizes are in half-points
const TITLE_SIZE: usize = 36;
const HEADING_SIZE: usize = 28;
const FOOTER_SIZE: usize = 18;

fn text_cell(text: &str, bold: bool) -> TableCell {
    let mut run = Run::new().add_text(text);
    if bold {
        run = run.bold();
    }
    TableCell::new().add_paragraph(Paragraph::new().add_run(run))
}

fn block_into(docx: Docx, block: &Block) -> Docx {
    match block {
        Block::Heading { level, text } => {
            let size = if *level <= 1 { TITLE_SIZE } else { HEADING_SIZE };
            let run = Run::new().add_text(text).bold().size(size);
            let mut paragraph = Paragraph::new().add_run(run);
            if *level <= 1 {
                paragraph = paragraph.align(AlignmentType::Center);
            }
            docx.add_paragraph(paragraph)
        }
        Block::Paragraph { text } => text.lines().fold(docx, |docx, line| {
            docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(line)))
        }),
        Block::Bullets { items } => items.iter().fold(docx, |docx, item| {
            docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(format!("• {item}"))))
        }),
        Block::Table { headers, rows } => {
            let mut table_rows = vec![TableRow::new(
                headers.iter().map(|h| text_cell(h, true)).collect(),
            )];
            table_rows.extend(
                rows.iter()
                    .map(|row| TableRow::new(row.iter().map(|c| text_cell(c, false)).collect())),
            );
            docx.add_table(Table::new(table_rows))
        }
        Block::Footer { text } => docx.add_paragraph(
            Paragraph::new()
                .align(AlignmentType::Center)
                .add_run(Run::new().add_text(text).italic().size(FOOTER_SIZE)),
        ),
    }
}

/// Render the monthly report as a .docx file held in memory
pub fn render_narrative_document(
    summary: &MonthlySummary,
    context: &RenderContext,
) -> Result<Vec<u8>, RenderError> {
    let layout = layout_monthly_report(summary, context);
    let docx = layout.blocks.iter().fold(Docx::new(), block_into);

    let mut buffer = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut buffer)
        .map_err(|e| RenderError::Document(e.to_string()))?;

    let bytes = buffer.into_inner();
    tracing::debug!(
        bytes = bytes.len(),
        blocks = layout.blocks.len(),
        "rendered narrative document"
    );
    Ok(bytes)
}
