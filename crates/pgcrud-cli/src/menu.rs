//! Interactive schema → table → operation loop.

use std::io::{BufRead, Write};

use pgcrud::{ColumnMeta, CrudError, CrudResult, DatabaseManager, Record};

use crate::console::Prompter;

const TABLE_OPTIONS: [&str; 5] = [
    "View all records",
    "Update a record",
    "Delete a record",
    "Add a record",
    "Exit",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TableOption {
    View,
    Update,
    Delete,
    Add,
    Exit,
}

impl TableOption {
    fn from_choice(n: u64) -> Option<Self> {
        match n {
            1 => Some(Self::View),
            2 => Some(Self::Update),
            3 => Some(Self::Delete),
            4 => Some(Self::Add),
            5 => Some(Self::Exit),
            _ => None,
        }
    }
}

pub struct Menu<'a, R, W> {
    db: &'a DatabaseManager,
    io: Prompter<R, W>,
}

impl<'a, R: BufRead, W: Write> Menu<'a, R, W> {
    pub fn new(db: &'a DatabaseManager, io: Prompter<R, W>) -> Self {
        Self { db, io }
    }

    /// Run until the user exits. Only terminal I/O failures end the loop early.
    pub async fn run(&mut self, schema: Option<&str>) -> anyhow::Result<()> {
        let schema = match schema {
            Some(s) => s.to_string(),
            None => match self.choose_schema().await? {
                Some(s) => s,
                None => return Ok(()),
            },
        };
        let Some(table) = self.choose_table(&schema).await? else {
            return Ok(());
        };
        self.table_loop(&schema, &table).await
    }

    async fn choose_schema(&mut self) -> anyhow::Result<Option<String>> {
        let schemas = match self.db.list_schemas().await {
            Ok(s) => s,
            Err(e) => return self.report(e).map(|_| None),
        };
        if schemas.is_empty() {
            self.io.warning("No schemas available.")?;
            return Ok(None);
        }
        self.io.numbered("Available schemas", &schemas)?;
        let i = self.io.read_index("Choose a schema: ", schemas.len())?;
        Ok(schemas.into_iter().nth(i))
    }

    async fn choose_table(&mut self, schema: &str) -> anyhow::Result<Option<String>> {
        let tables = match self.db.list_tables(schema).await {
            Ok(t) => t,
            Err(e) => return self.report(e).map(|_| None),
        };
        if tables.is_empty() {
            self.io.warning(&format!("No tables in schema {schema}."))?;
            return Ok(None);
        }
        self.io.numbered("Available tables", &tables)?;
        let i = self.io.read_index("Choose a table: ", tables.len())?;
        Ok(tables.into_iter().nth(i))
    }

    async fn table_loop(&mut self, schema: &str, table: &str) -> anyhow::Result<()> {
        loop {
            self.io.numbered("Options", &TABLE_OPTIONS)?;
            let choice = self.io.read_number("Choose an option: ")?;
            let result = match TableOption::from_choice(choice) {
                Some(TableOption::View) => self.view(schema, table).await,
                Some(TableOption::Update) => self.update(schema, table).await,
                Some(TableOption::Delete) => self.delete(schema, table).await,
                Some(TableOption::Add) => self.add(schema, table).await,
                Some(TableOption::Exit) => {
                    self.io.say("Bye.")?;
                    return Ok(());
                }
                None => self.io.warning("Invalid option."),
            };

            // Database errors are shown and the loop goes on; I/O errors end it.
            if let Err(err) = result {
                match err.downcast::<CrudError>() {
                    Ok(crud) => self.report(crud)?,
                    Err(other) => return Err(other),
                }
            }
        }
    }

    /// Columns in table order, read fresh for every operation.
    async fn columns(&mut self, schema: &str, table: &str) -> anyhow::Result<Vec<ColumnMeta>> {
        let columns = self.db.describe_table(schema, table).await?;
        if columns.is_empty() {
            return Err(CrudError::validation(format!(
                "table {schema}.{table} has no columns (was it dropped?)"
            ))
            .into());
        }
        Ok(columns)
    }

    async fn view(&mut self, schema: &str, table: &str) -> anyhow::Result<()> {
        let records = self.db.select_all(schema, table).await?;
        if records.is_empty() {
            return self.io.warning("No records found.");
        }
        self.io.marked("Records", &records, "*")?;
        self.io.records(&records)
    }

    async fn update(&mut self, schema: &str, table: &str) -> anyhow::Result<()> {
        let columns = self.columns(schema, table).await?;
        let filter_column = self.choose_column(table, &columns, "filter on")?;
        let Some(filter) = self.choose_filter(schema, table, filter_column).await? else {
            return Ok(());
        };
        let target = self.choose_column(table, &columns, "modify")?;
        let value = self
            .io
            .read_text(&format!("New value for {}: ", target.name))?;

        let n = self
            .db
            .update(schema, table, &target.name, &value, &filter)
            .await?;
        self.io.success(&format!("{n} record(s) updated."))
    }

    async fn delete(&mut self, schema: &str, table: &str) -> anyhow::Result<()> {
        let columns = self.columns(schema, table).await?;
        let filter_column = self.choose_column(table, &columns, "filter on")?;
        let Some(filter) = self.choose_filter(schema, table, filter_column).await? else {
            return Ok(());
        };
        let n = self.db.delete(schema, table, &filter).await?;
        self.io.success(&format!("{n} record(s) deleted."))
    }

    async fn add(&mut self, schema: &str, table: &str) -> anyhow::Result<()> {
        let columns = self.columns(schema, table).await?;
        let mut record = Record::with_capacity(columns.len());
        for column in &columns {
            let value = self.io.read_text(&format!(
                "Value for {} ({}): ",
                column.name, column.data_type
            ))?;
            record.push(&column.name, value, &column.data_type)?;
        }
        let n = self.db.insert(schema, table, &record).await?;
        self.io.success(&format!("{n} record(s) added."))
    }

    fn choose_column<'c>(
        &mut self,
        table: &str,
        columns: &'c [ColumnMeta],
        action: &str,
    ) -> anyhow::Result<&'c ColumnMeta> {
        let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
        self.io.numbered(&format!("Columns of {table}"), &names)?;
        let i = self
            .io
            .read_index(&format!("Choose a column to {action}: "), columns.len())?;
        Ok(&columns[i])
    }

    /// Pick one of the column's current values as an equality filter.
    async fn choose_filter(
        &mut self,
        schema: &str,
        table: &str,
        column: &ColumnMeta,
    ) -> anyhow::Result<Option<Record>> {
        let values = self.db.column_values(schema, table, &column.name).await?;
        if values.is_empty() {
            self.io
                .warning(&format!("Column {} has no values to filter on.", column.name))?;
            return Ok(None);
        }

        let shown: Vec<&str> = values
            .iter()
            .map(|v| v.as_deref().unwrap_or("NULL"))
            .collect();
        self.io.numbered(&format!("Values of {}", column.name), &shown)?;
        let i = self.io.read_index(
            &format!("Choose the {} value to filter on: ", column.name),
            values.len(),
        )?;
        Ok(Some(filter_record(column, values[i].as_deref())?))
    }

    /// Print a recoverable error and carry on.
    fn report(&mut self, err: CrudError) -> anyhow::Result<()> {
        tracing::debug!(error = ?err, "operation failed");
        self.io.error(&err)
    }
}

/// One-field equality filter carrying the column's declared type.
fn filter_record(column: &ColumnMeta, value: Option<&str>) -> CrudResult<Record> {
    let mut record = Record::new();
    match value {
        Some(v) => record.push(&column.name, v, &column.data_type)?,
        None => record.push_null(&column.name, &column.data_type)?,
    }
    Ok(record)
}
