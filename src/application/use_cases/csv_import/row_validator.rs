//! Structural and per-row validation for contact imports.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

use crate::domain::contact::{ContactInput, ContactKind};
use crate::domain::csv::{normalize_header, CsvRow, FieldMapping, RowError, TargetField};

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap()
});

static PHONE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\+?[0-9 ().\-]{5,25}$").unwrap()
});

/// Structural concerns worth flagging before any row is written.
/// None of these block the import on their own.
pub fn structural_warnings(headers: &[String], mapping: &FieldMapping, rows: &[CsvRow]) -> Vec<String> {
    let mut warnings = Vec::new();

    // Duplicate headers collide after normalization.
    let mut seen = HashSet::new();
    for header in headers {
        let clean = normalize_header(header);
        if !clean.is_empty() && !seen.insert(clean) {
            warnings.push(format!("Duplicate column header '{}'", header));
        }
    }

    // Misalignment heuristics over the mapped columns: a column whose
    // values do not look like its target field usually means the file
    // is shifted or the mapping grabbed the wrong column.
    if let Some(header) = mapping.source_for(TargetField::Email) {
        let (mut filled, mut plausible) = (0usize, 0usize);
        for row in rows {
            if let Some(value) = row.value_for_header(header) {
                if !value.trim().is_empty() {
                    filled += 1;
                    if EMAIL_RE.is_match(value.trim()) {
                        plausible += 1;
                    }
                }
            }
        }
        if filled >= 3 && plausible * 2 < filled {
            warnings.push(format!(
                "Column '{}' is mapped to email but most of its values are not email addresses",
                header
            ));
        }
    }
    if let Some(header) = mapping.source_for(TargetField::Name) {
        let numeric = rows
            .iter()
            .filter_map(|r| r.value_for_header(header))
            .filter(|v| !v.trim().is_empty() && v.trim().parse::<f64>().is_ok())
            .count();
        if rows.len() >= 3 && numeric * 2 > rows.len() {
            warnings.push(format!(
                "Column '{}' is mapped to name but most of its values are numeric",
                header
            ));
        }
    }

    warnings
}

/// Validate one data row against the mapping and transform it into a
/// contact. Row numbers in errors are 1-based counting the header.
pub fn validate_row(row: &CsvRow, mapping: &FieldMapping) -> std::result::Result<ContactInput, RowError> {
    let row_number = row.index + 2;
    let value_of = |field: TargetField| -> Option<String> {
        mapping
            .source_for(field)
            .and_then(|header| row.value_for_header(header))
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let name = value_of(TargetField::Name).ok_or_else(|| RowError {
        row_number,
        message: "Missing name".to_string(),
    })?;
    if name.chars().count() > 200 {
        return Err(RowError {
            row_number,
            message: "Name is longer than 200 characters".to_string(),
        });
    }

    let email = value_of(TargetField::Email);
    if let Some(email) = &email {
        if !EMAIL_RE.is_match(email) {
            return Err(RowError {
                row_number,
                message: format!("Invalid email address '{}'", email),
            });
        }
    }

    let phone = value_of(TargetField::Phone);
    if let Some(phone) = &phone {
        if !PHONE_RE.is_match(phone) {
            return Err(RowError {
                row_number,
                message: format!("Invalid phone number '{}'", phone),
            });
        }
    }

    // Unknown kinds fall back to Other rather than failing the row.
    let kind = value_of(TargetField::Kind)
        .map(|v| v.to_lowercase())
        .and_then(|v| ContactKind::parse(&v))
        .unwrap_or(ContactKind::Other);

    Ok(ContactInput {
        name,
        email: email.map(|e| e.to_lowercase()),
        phone,
        kind,
        notes: value_of(TargetField::Notes),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::csv::{CsvField, MappedColumn, MatchKind};
    use std::collections::HashMap;

    fn mapping(pairs: &[(TargetField, &str)]) -> FieldMapping {
        FieldMapping {
            columns: pairs
                .iter()
                .map(|(field, header)| {
                    (
                        *field,
                        MappedColumn {
                            source_header: header.to_string(),
                            match_kind: MatchKind::Synonym,
                            score: 1.0,
                        },
                    )
                })
                .collect::<HashMap<_, _>>(),
            unmapped_headers: Vec::new(),
        }
    }

    fn row(index: usize, pairs: &[(&str, &str)]) -> CsvRow {
        CsvRow::new(
            index,
            pairs
                .iter()
                .map(|(h, v)| CsvField::new(h.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_valid_row_transforms() {
        let mapping = mapping(&[
            (TargetField::Name, "Name"),
            (TargetField::Email, "Email"),
            (TargetField::Kind, "Type"),
        ]);
        let contact = validate_row(
            &row(0, &[("Name", "Maria"), ("Email", "MARIA@Example.com"), ("Type", "Cleaner")]),
            &mapping,
        )
        .unwrap();

        assert_eq!(contact.name, "Maria");
        assert_eq!(contact.email.as_deref(), Some("maria@example.com"));
        assert_eq!(contact.kind, ContactKind::Cleaner);
    }

    #[test]
    fn test_missing_name_fails_with_spreadsheet_row_number() {
        let mapping = mapping(&[(TargetField::Name, "Name")]);
        let err = validate_row(&row(3, &[("Name", "  ")]), &mapping).unwrap_err();
        assert_eq!(err.row_number, 5);
    }

    #[test]
    fn test_name_length_counts_characters_not_bytes() {
        let mapping = mapping(&[(TargetField::Name, "Name")]);

        // 150 two-byte characters: over 200 bytes but well under the limit.
        let accented = "é".repeat(150);
        let contact = validate_row(&row(0, &[("Name", accented.as_str())]), &mapping).unwrap();
        assert_eq!(contact.name, accented);

        let too_long = "é".repeat(201);
        assert!(validate_row(&row(0, &[("Name", too_long.as_str())]), &mapping).is_err());
    }

    #[test]
    fn test_bad_email_and_phone_rejected() {
        let mapping = mapping(&[
            (TargetField::Name, "Name"),
            (TargetField::Email, "Email"),
            (TargetField::Phone, "Phone"),
        ]);
        assert!(validate_row(
            &row(0, &[("Name", "Maria"), ("Email", "not-an-email"), ("Phone", "")]),
            &mapping
        )
        .is_err());
        assert!(validate_row(
            &row(0, &[("Name", "Maria"), ("Email", ""), ("Phone", "call me maybe")]),
            &mapping
        )
        .is_err());
    }

    #[test]
    fn test_unknown_kind_becomes_other() {
        let mapping = mapping(&[(TargetField::Name, "Name"), (TargetField::Kind, "Type")]);
        let contact =
            validate_row(&row(0, &[("Name", "Maria"), ("Type", "wizard")]), &mapping).unwrap();
        assert_eq!(contact.kind, ContactKind::Other);
    }

    #[test]
    fn test_email_misalignment_warning() {
        let mapping = mapping(&[(TargetField::Name, "Name"), (TargetField::Email, "Email")]);
        let rows: Vec<CsvRow> = (0..4)
            .map(|i| row(i, &[("Name", "Maria"), ("Email", "912345678")]))
            .collect();
        let warnings = structural_warnings(
            &["Name".to_string(), "Email".to_string()],
            &mapping,
            &rows,
        );
        assert!(warnings.iter().any(|w| w.contains("email")));
    }

    #[test]
    fn test_duplicate_header_warning() {
        let mapping = mapping(&[(TargetField::Name, "Name")]);
        let warnings = structural_warnings(
            &["Name".to_string(), "name ".to_string()],
            &mapping,
            &[],
        );
        assert_eq!(warnings.len(), 1);
    }
}
