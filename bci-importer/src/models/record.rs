//! Parsed input row

/// One data row as an ordered field-name → value mapping
///
/// Field names come from the header row. A value is `None` when the row
/// ended before reaching that column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    line: u64,
    fields: Vec<(String, Option<String>)>,
}

impl Record {
    pub fn new(line: u64, fields: Vec<(String, Option<String>)>) -> Self {
        Self { line, fields }
    }

    /// 1-based line number in the source file
    pub fn line(&self) -> u64 {
        self.line
    }

    /// Value of the first field with this name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .and_then(|(_, value)| value.as_deref())
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.fields
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_deref()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// True when every value is absent or whitespace
    pub fn is_blank(&self) -> bool {
        self.fields
            .iter()
            .all(|(_, value)| value.as_deref().map_or(true, |v| v.trim().is_empty()))
    }
}
