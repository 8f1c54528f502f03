//! Pipe table layout.
//!
//! Cells are buffered row by row while the table events stream in; the layout is computed
//! once the whole table is known.

use crate::ir::nodes::Alignment;
use unicode_width::UnicodeWidthStr;

const MIN_COLUMN_WIDTH: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub text: String,
    pub head: bool,
    pub alignment: Option<Alignment>,
}

/// Rows of a table being rendered.
#[derive(Debug, Default)]
pub struct TableLayout {
    rows: Vec<Vec<Cell>>,
}

impl TableLayout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_row(&mut self) {
        self.rows.push(Vec::new());
    }

    pub fn push_cell(&mut self, cell: Cell) {
        match self.rows.last_mut() {
            Some(row) => row.push(cell),
            None => self.rows.push(vec![cell]),
        }
    }

    /// Leading rows made only of head cells.
    fn head_rows(&self) -> usize {
        self.rows
            .iter()
            .take_while(|row| !row.is_empty() && row.iter().all(|cell| cell.head))
            .count()
    }

    fn column_widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = Vec::new();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                let width = cell.text.width();
                if i >= widths.len() {
                    widths.push(width);
                } else {
                    widths[i] = widths[i].max(width);
                }
            }
        }

        for width in &mut widths {
            *width = (*width).max(MIN_COLUMN_WIDTH);
        }
        widths
    }

    /// Render head rows, the separator and body rows. Lines are joined without a final newline.
    ///
    /// A table without head rows gets an empty one, since a pipe table needs a header.
    pub fn render(&self) -> String {
        let widths = self.column_widths();
        if widths.is_empty() {
            return String::new();
        }

        let head_rows = self.head_rows();
        let mut lines = Vec::new();

        if head_rows == 0 {
            lines.push(render_row(&[], &widths));
        }
        for row in &self.rows[..head_rows] {
            lines.push(render_row(row, &widths));
        }
        lines.push(self.render_separator(&widths));
        for row in &self.rows[head_rows..] {
            lines.push(render_row(row, &widths));
        }

        lines.join("\n")
    }

    fn render_separator(&self, widths: &[usize]) -> String {
        let mut output = String::from("|");
        for (i, width) in widths.iter().enumerate() {
            let align = self
                .rows
                .first()
                .and_then(|row| row.get(i))
                .and_then(|cell| cell.alignment);

            let dashes = "-".repeat(width.saturating_sub(2));
            match align {
                Some(Alignment::Left) => output.push_str(&format!(" :{dashes}- |")),
                Some(Alignment::Right) => output.push_str(&format!(" -{dashes}: |")),
                Some(Alignment::Center) => output.push_str(&format!(" :{dashes}: |")),
                None => output.push_str(&format!(" -{dashes}- |")),
            }
        }
        output
    }
}

fn render_row(row: &[Cell], widths: &[usize]) -> String {
    let mut output = String::from("|");
    for (i, width) in widths.iter().enumerate() {
        let text = row.get(i).map(|cell| cell.text.as_str()).unwrap_or("");
        output.push(' ');
        output.push_str(&center(text, *width));
        output.push_str(" |");
    }
    output
}

/// Pad `text` with spaces on both sides to `width` display columns.
fn center(text: &str, width: usize) -> String {
    let padding = width.saturating_sub(text.width());
    let left = padding / 2;
    let right = padding - left;
    format!("{}{text}{}", " ".repeat(left), " ".repeat(right))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(text: &str, head: bool) -> Cell {
        Cell {
            text: text.to_string(),
            head,
            alignment: None,
        }
    }

    #[test]
    fn columns_are_at_least_three_wide() {
        let mut table = TableLayout::new();
        table.begin_row();
        table.push_cell(cell("a", true));
        table.push_cell(cell("b", true));
        table.begin_row();
        table.push_cell(cell("1", false));
        table.push_cell(cell("2", false));

        assert_eq!(
            table.render(),
            "|  a  |  b  |\n| --- | --- |\n|  1  |  2  |"
        );
    }

    #[test]
    fn widest_cell_sets_the_separator() {
        let mut table = TableLayout::new();
        table.begin_row();
        table.push_cell(cell("Name", true));
        table.begin_row();
        table.push_cell(cell("Alexander", false));

        let rendered = table.render();
        let separator = rendered.lines().nth(1).unwrap();
        assert_eq!(separator, format!("| {} |", "-".repeat(9)));
        assert!(rendered.contains("|   Name    |"));
    }

    #[test]
    fn display_width_counts_wide_characters() {
        let mut table = TableLayout::new();
        table.begin_row();
        table.push_cell(cell("漢字", true));
        assert_eq!(table.render(), "| 漢字 |\n| ---- |");
    }

    #[test]
    fn alignment_comes_from_first_row() {
        let mut table = TableLayout::new();
        table.begin_row();
        for (text, alignment) in [
            ("l", Alignment::Left),
            ("c", Alignment::Center),
            ("r", Alignment::Right),
        ] {
            table.push_cell(Cell {
                text: text.to_string(),
                head: true,
                alignment: Some(alignment),
            });
        }
        let rendered = table.render();
        assert_eq!(rendered.lines().nth(1).unwrap(), "| :-- | :-: | --: |");
    }

    #[test]
    fn missing_head_row_gets_a_blank_one() {
        let mut table = TableLayout::new();
        table.begin_row();
        table.push_cell(cell("x", false));
        assert_eq!(table.render(), "|     |\n| --- |\n|  x  |");
    }

    #[test]
    fn short_rows_are_padded() {
        let mut table = TableLayout::new();
        table.begin_row();
        table.push_cell(cell("a", true));
        table.push_cell(cell("b", true));
        table.begin_row();
        table.push_cell(cell("1", false));
        assert_eq!(table.render().lines().last().unwrap(), "|  1  |     |");
    }
}
