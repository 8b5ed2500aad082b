//! Terminal input and output helpers.

use std::fmt::Display;
use std::io::{BufRead, Write};

use colored::Colorize;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table, presets::UTF8_FULL};
use pgcrud::Record;

/// Line-oriented prompts over any reader/writer pair.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Write `text` followed by a newline.
    pub fn say(&mut self, text: impl Display) -> anyhow::Result<()> {
        writeln!(self.output, "{text}")?;
        Ok(())
    }

    pub fn success(&mut self, msg: &str) -> anyhow::Result<()> {
        self.say(format!("  {} {}", "✓".green().bold(), msg))
    }

    pub fn warning(&mut self, msg: &str) -> anyhow::Result<()> {
        self.say(format!("  {} {}", "⚠".yellow().bold(), msg))
    }

    pub fn error(&mut self, msg: impl Display) -> anyhow::Result<()> {
        self.say(format!("  {} {}", "✗".red().bold(), msg))
    }

    /// Print `prompt` and read one trimmed line. Fails once input is exhausted.
    fn read_line(&mut self, prompt: &str) -> anyhow::Result<String> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            anyhow::bail!("input closed");
        }
        Ok(line.trim().to_string())
    }

    /// Read a non-empty line, asking again on blank input.
    pub fn read_text(&mut self, prompt: &str) -> anyhow::Result<String> {
        loop {
            let line = self.read_line(prompt)?;
            if !line.is_empty() {
                return Ok(line);
            }
            self.warning("A value is required.")?;
        }
    }

    /// Read a non-negative integer, asking again on anything else.
    pub fn read_number(&mut self, prompt: &str) -> anyhow::Result<u64> {
        loop {
            let line = self.read_line(prompt)?;
            match line.parse::<i64>() {
                Ok(n) if n >= 0 => return Ok(n as u64),
                Ok(_) => self.warning("Negative numbers are not allowed.")?,
                Err(_) => self.warning("Please enter a whole number.")?,
            }
        }
    }

    /// Read a 1-based choice among `count` items and return it 0-based.
    pub fn read_index(&mut self, prompt: &str, count: usize) -> anyhow::Result<usize> {
        if count == 0 {
            anyhow::bail!("nothing to choose from");
        }
        loop {
            let n = self.read_number(prompt)?;
            match usize::try_from(n) {
                Ok(n) if (1..=count).contains(&n) => return Ok(n - 1),
                _ => self.warning(&format!("Choose a number between 1 and {count}."))?,
            }
        }
    }

    /// Boxed list with 1-based numbers.
    pub fn numbered<T: Display>(&mut self, title: &str, items: &[T]) -> anyhow::Result<()> {
        let mut table = styled_table(vec!["#", title]);
        for (i, item) in items.iter().enumerate() {
            table.add_row(vec![Cell::new(i + 1), Cell::new(item)]);
        }
        self.say(table)
    }

    /// Boxed list with every item prefixed by `mark`.
    pub fn marked<T: Display>(&mut self, title: &str, items: &[T], mark: &str) -> anyhow::Result<()> {
        let mut table = styled_table(vec![title]);
        for item in items {
            table.add_row(vec![Cell::new(format!("{mark} {item}"))]);
        }
        self.say(table)
    }

    /// Records as a grid, one column per field of the first record.
    pub fn records(&mut self, records: &[Record]) -> anyhow::Result<()> {
        let Some(first) = records.first() else {
            return self.warning("No records found.");
        };
        let mut table = styled_table(first.column_names());
        for record in records {
            table.add_row(
                record
                    .iter()
                    .map(|f| match &f.value {
                        Some(v) => Cell::new(v),
                        None => Cell::new("NULL").fg(Color::DarkGrey),
                    })
                    .collect::<Vec<_>>(),
            );
        }
        self.say(table)
    }
}

fn styled_table<T: Display>(header: Vec<T>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(
            header
                .into_iter()
                .map(|h| Cell::new(h).add_attribute(Attribute::Bold).fg(Color::Cyan))
                .collect::<Vec<_>>(),
        );
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn prompter(input: &str) -> Prompter<Cursor<Vec<u8>>, Vec<u8>> {
        Prompter::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    fn output(p: &Prompter<Cursor<Vec<u8>>, Vec<u8>>) -> String {
        String::from_utf8_lossy(&p.output).into_owned()
    }

    #[test]
    fn read_index_is_one_based_and_reprompts() {
        let mut p = prompter("0\n-3\nabc\n4\n2\n");
        assert_eq!(p.read_index("Pick: ", 3).unwrap(), 1);
        let out = output(&p);
        assert_eq!(out.matches("Pick: ").count(), 5);
        assert!(out.contains("Negative numbers are not allowed."));
        assert!(out.contains("Please enter a whole number."));
        assert!(out.contains("between 1 and 3"));
    }

    #[test]
    fn read_text_rejects_blank_lines_and_trims() {
        let mut p = prompter("\n   \n  Ana  \n");
        assert_eq!(p.read_text("Name: ").unwrap(), "Ana");
        assert_eq!(output(&p).matches("A value is required.").count(), 2);
    }

    #[test]
    fn exhausted_input_is_an_error() {
        let mut p = prompter("abc\n");
        let err = p.read_number("n: ").unwrap_err();
        assert!(err.to_string().contains("input closed"));
    }

    #[test]
    fn read_index_needs_choices() {
        let mut p = prompter("1\n");
        assert!(p.read_index("Pick: ", 0).is_err());
    }

    #[test]
    fn numbered_list_shows_positions() {
        let mut p = prompter("");
        p.numbered("Schemas", &["public", "school"]).unwrap();
        let out = output(&p);
        assert!(out.contains("Schemas"));
        assert!(out.contains("public"));
        assert!(out.contains("school"));
        assert!(out.contains('2'));
    }

    #[test]
    fn record_grid_shows_nulls() {
        let mut record = Record::new();
        record.push("id", "1", "integer").unwrap();
        record.push_null("name", "character varying").unwrap();

        let mut p = prompter("");
        p.records(&[record]).unwrap();
        let out = output(&p);
        assert!(out.contains("id"));
        assert!(out.contains("NULL"));

        let mut p = prompter("");
        p.records(&[]).unwrap();
        assert!(output(&p).contains("No records found."));
    }
}
