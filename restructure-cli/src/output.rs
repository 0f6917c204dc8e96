use comfy_table::{presets, Cell, CellAlignment, ContentArrangement, Table};
use serde::Serialize;

use crate::app::GlobalOptions;

/// Prints `data` as pretty JSON under `--json`, otherwise hands it to `text`.
pub fn print_output<T: Serialize>(
    data: &T,
    opts: &GlobalOptions,
    text: impl FnOnce(&T),
) -> anyhow::Result<()> {
    if opts.json {
        println!("{}", serde_json::to_string_pretty(data)?);
    } else {
        text(data);
    }
    Ok(())
}

/// Alignment of one column.
#[derive(Clone, Copy)]
pub enum Align {
    Left,
    Right,
}

impl From<Align> for CellAlignment {
    fn from(align: Align) -> Self {
        match align {
            Align::Left => CellAlignment::Left,
            Align::Right => CellAlignment::Right,
        }
    }
}

/// Borderless, indented columns of labels.
pub struct Columns {
    table: Table,
    aligns: Vec<Align>,
    indent: &'static str,
}

impl Columns {
    /// Creates a table with one `(header, alignment)` pair per column, each
    /// line prefixed with `indent`.
    pub fn new(indent: &'static str, headers: &[(&str, Align)]) -> Self {
        let mut table = Table::new();
        table
            .load_preset(presets::NOTHING)
            .set_content_arrangement(ContentArrangement::Disabled)
            .set_header(headers.iter().map(|(name, _)| *name));

        // One space of padding on inner edges only, so columns sit two apart
        let last = headers.len().saturating_sub(1);
        for (i, column) in table.column_iter_mut().enumerate() {
            column.set_padding((u16::from(i > 0), u16::from(i < last)));
        }

        Columns {
            table,
            aligns: headers.iter().map(|(_, align)| *align).collect(),
            indent,
        }
    }

    /// Appends a row, one value per column.
    pub fn push<I, S>(&mut self, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let cells = values
            .into_iter()
            .zip(&self.aligns)
            .map(|(value, align)| Cell::new(value.into()).set_alignment((*align).into()));
        self.table.add_row(cells);
    }

    /// Writes the table to stdout.
    pub fn print(&self) {
        for line in self.table.lines() {
            println!("{}{}", self.indent, line.trim_end());
        }
    }
}
