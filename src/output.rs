use crate::cli::OutputFormat;
use crate::parser::{CombinedEntry, Record};
use crate::schema::FieldSchema;
use chrono::{DateTime, SecondsFormat};
use serde_json::{Map, Value};

/// Record index of the bracketed timestamp in combined records
pub const TIMESTAMP_INDEX: usize = 2;

/// Layout of the timestamp field, e.g. `[10/Oct/2023:13:55:36 +0000]`
const COMBINED_TIMESTAMP_FORMAT: &str = "[%d/%b/%Y:%H:%M:%S %z]";

#[derive(Debug, Clone)]
pub struct OutputOptions {
    /// Record indexes to print, in output order
    pub fields: Vec<usize>,
    pub separator: String,
    pub rfc3339: bool,
    pub whole_line: bool,
    pub format: OutputFormat,
}

impl OutputOptions {
    pub fn new(fields: Vec<usize>) -> Self {
        Self {
            fields,
            separator: "\t".to_string(),
            rfc3339: false,
            whole_line: false,
            format: OutputFormat::Text,
        }
    }

    pub fn separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    pub fn rfc3339(mut self, enabled: bool) -> Self {
        self.rfc3339 = enabled;
        self
    }

    pub fn whole_line(mut self, enabled: bool) -> Self {
        self.whole_line = enabled;
        self
    }

    pub fn format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }
}

/// Resolve a comma-separated list of field names into record indexes.
///
/// Unknown names are logged and skipped. The result is in schema order with
/// duplicates removed. An empty or missing list selects every field.
pub fn select_output_fields(list: Option<&str>, schema: &FieldSchema) -> Vec<usize> {
    let Some(list) = list.filter(|l| !l.trim().is_empty()) else {
        return schema.all_indexes();
    };

    let mut indexes: Vec<usize> = list
        .split(',')
        .map(str::trim)
        .filter_map(|name| {
            let index = schema.index_of(name);
            if index.is_none() {
                log::warn!("ignoring unknown output field '{name}'");
            }
            index
        })
        .collect();
    indexes.sort_unstable();
    indexes.dedup();
    indexes
}

/// Convert `[10/Oct/2023:13:55:36 +0000]` to `2023-10-10T13:55:36Z`
pub fn rfc3339_timestamp(raw: &str) -> Result<String, chrono::ParseError> {
    let parsed = DateTime::parse_from_str(raw, COMBINED_TIMESTAMP_FORMAT)?;
    Ok(parsed.to_rfc3339_opts(SecondsFormat::Secs, true))
}

/// Renders matching entries according to [`OutputOptions`]
pub struct RecordFormatter<'a> {
    options: &'a OutputOptions,
    schema: &'a FieldSchema,
}

impl<'a> RecordFormatter<'a> {
    pub fn new(options: &'a OutputOptions, schema: &'a FieldSchema) -> Self {
        Self { options, schema }
    }

    /// Whether entries are printed as their original line
    pub fn whole_line(&self) -> bool {
        self.options.whole_line
    }

    pub fn format(&self, entry: &CombinedEntry) -> String {
        if self.options.whole_line {
            return entry.line.clone();
        }
        match self.options.format {
            OutputFormat::Text => self.format_text(&entry.record),
            OutputFormat::Json => self.format_json(&entry.record),
        }
    }

    /// Selected fields with their output values; fields that cannot be
    /// rendered are left out
    fn selected<'r>(&self, record: &'r Record) -> Vec<(usize, std::borrow::Cow<'r, str>)> {
        let mut values = Vec::with_capacity(self.options.fields.len());
        for &index in &self.options.fields {
            let Some(value) = record.field(index) else {
                log::warn!("record has no field at index {index}");
                continue;
            };
            if self.options.rfc3339 && index == TIMESTAMP_INDEX {
                match rfc3339_timestamp(value) {
                    Ok(ts) => values.push((index, ts.into())),
                    Err(e) => log::warn!("time parsing of {value:?}: {e}"),
                }
                continue;
            }
            values.push((index, value.into()));
        }
        values
    }

    fn format_text(&self, record: &Record) -> String {
        self.selected(record)
            .into_iter()
            .map(|(_, value)| value)
            .collect::<Vec<_>>()
            .join(self.options.separator.as_str())
    }

    fn format_json(&self, record: &Record) -> String {
        let mut object = Map::new();
        for (index, value) in self.selected(record) {
            let name = self
                .schema
                .name_of(index)
                .map_or_else(|| index.to_string(), str::to_string);
            object.insert(name, Value::String(value.into_owned()));
        }
        Value::Object(object).to_string()
    }
}
