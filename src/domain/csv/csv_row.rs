use serde::{Deserialize, Serialize};

/// One cell of a parsed upload, tagged with its column header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsvField {
    /// Header exactly as it appeared in the file.
    pub name: String,
    /// Normalized header, used for synonym matching.
    pub clean_name: String,
    pub value: String,
    pub is_empty: bool,
}

impl CsvField {
    pub fn new(name: String, value: String) -> Self {
        let is_empty = value.trim().is_empty();
        let clean_name = normalize_header(&name);
        Self {
            name,
            clean_name,
            value,
            is_empty,
        }
    }
}

/// Normalize a header for matching: lowercase, collapse every run of
/// non-alphanumeric characters to a single underscore.
pub fn normalize_header(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_sep = false;
    for c in name.chars() {
        if c.is_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            pending_sep = false;
            out.extend(c.to_lowercase());
        } else {
            pending_sep = true;
        }
    }
    out
}

/// A data row, 0-indexed from the first line after the header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsvRow {
    pub index: usize,
    pub fields: Vec<CsvField>,
}

impl CsvRow {
    pub fn new(index: usize, fields: Vec<CsvField>) -> Self {
        Self { index, fields }
    }

    pub fn non_empty_fields(&self) -> Vec<&CsvField> {
        self.fields.iter().filter(|f| !f.is_empty).collect()
    }

    /// Value of the column whose original header is `header`, if any.
    pub fn value_for_header(&self, header: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == header)
            .map(|f| f.value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_header() {
        assert_eq!(normalize_header("First Name"), "first_name");
        assert_eq!(normalize_header("E-Mail Address"), "e_mail_address");
        assert_eq!(normalize_header("  Téléphone  "), "téléphone");
        assert_eq!(normalize_header("__id__"), "id");
    }

    #[test]
    fn test_row_lookup_by_header() {
        let row = CsvRow::new(
            0,
            vec![
                CsvField::new("Name".to_string(), "Maria".to_string()),
                CsvField::new("Notes".to_string(), "   ".to_string()),
            ],
        );
        assert_eq!(row.value_for_header("Name"), Some("Maria"));
        assert_eq!(row.value_for_header("Missing"), None);
        assert_eq!(row.non_empty_fields().len(), 1);
    }
}
