//! PNG output of a grouped report.
//!
//! Draws the same cells as the text table, separators included, on a white
//! grid. Forks are called out with a bold red "Yes".

use std::path::Path;

use anyhow::Context;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use repotrail_protocol::{Row, yes_no};

use crate::render::{HEADERS, column_widths, table_lines};

/// Written when `--image` is given without a path.
pub(crate) const DEFAULT_IMAGE_PATH: &str = "repos_table.png";

const FONT_SIZE: f64 = 14.0;

/// Advance of one monospace glyph at [`FONT_SIZE`], rounded up.
const CHAR_WIDTH: usize = 9;

const ROW_HEIGHT: usize = 26;

const CELL_PADDING: usize = 10;

const IS_FORK_COLUMN: usize = 3;

const HEADER_FILL: RGBColor = RGBColor(225, 228, 232);

const GRID: RGBColor = RGBColor(150, 150, 150);

const HIGHLIGHT: RGBColor = RGBColor(200, 30, 30);

/// Whether a body cell is drawn emphasized.
fn is_highlighted(column: usize, cell: &str) -> bool {
    column == IS_FORK_COLUMN && cell == yes_no(true)
}

fn px(value: usize) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

/// Renders rows as a PNG table at `path`.
///
/// The Name column is left-aligned; every other column is centered.
///
/// # Errors
///
/// Returns an error if the image is too large, a font cannot be loaded or
/// the file cannot be written.
pub(crate) fn render_image(rows: &[Row], path: &Path) -> anyhow::Result<()> {
    let lines = table_lines(rows);
    let widths = column_widths(&lines).map(|w| w * CHAR_WIDTH + 2 * CELL_PADDING);

    let width = u32::try_from(widths.iter().sum::<usize>()).context("table is too wide")?;
    let height =
        u32::try_from((lines.len() + 1) * ROW_HEIGHT).context("table has too many rows")?;

    let root = BitMapBackend::new(path, (width + 1, height + 1)).into_drawing_area();
    root.fill(&WHITE)?;

    let regular = FontDesc::new(FontFamily::Monospace, FONT_SIZE, FontStyle::Normal).color(&BLACK);
    let bold = FontDesc::new(FontFamily::Monospace, FONT_SIZE, FontStyle::Bold);
    let header = bold.color(&BLACK);
    let highlight = bold.color(&HIGHLIGHT);

    let header_cells = HEADERS.map(String::from);
    let table = std::iter::once(&header_cells).chain(&lines);
    for (row, cells) in table.enumerate() {
        let top = px(row * ROW_HEIGHT);
        let bottom = top + px(ROW_HEIGHT);
        let mut left = 0;

        for (column, (cell, width)) in cells.iter().zip(widths).enumerate() {
            let right = left + px(width);
            if row == 0 {
                root.draw(&Rectangle::new([(left, top), (right, bottom)], HEADER_FILL.filled()))?;
            }
            root.draw(&Rectangle::new(
                [(left, top), (right, bottom)],
                GRID.stroke_width(1),
            ))?;

            let style = match row {
                0 => &header,
                _ if is_highlighted(column, cell) => &highlight,
                _ => &regular,
            };
            let middle = top + px(ROW_HEIGHT / 2);
            let (anchor, x) = if column == 0 {
                (HPos::Left, left + px(CELL_PADDING))
            } else {
                (HPos::Center, left + px(width / 2))
            };
            root.draw_text(cell, &style.pos(Pos::new(anchor, VPos::Center)), (x, middle))?;

            left = right;
        }
    }

    root.present()
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}
