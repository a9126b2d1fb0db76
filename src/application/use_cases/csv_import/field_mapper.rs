//! Automatic header-to-field mapping for contact imports.
//!
//! Each target field is first checked against its synonym table.
//! Remaining fields and headers are paired greedily by Levenshtein
//! similarity, best pair first, so a header is never claimed twice.

use std::collections::{HashMap, HashSet};

use crate::domain::csv::{
    normalize_header, FieldMapping, MappedColumn, MatchKind, TargetField, MAPPING_THRESHOLD,
};
use crate::domain::error::{AppError, Result};

/// Resolve the column mapping for a header row. `overrides` pins a
/// target field to an exact header, bypassing the auto-mapper.
pub fn map_headers(
    headers: &[String],
    overrides: &HashMap<TargetField, String>,
) -> Result<FieldMapping> {
    let mut mapping = FieldMapping::default();
    let mut claimed: HashSet<usize> = HashSet::new();

    // Manual overrides win outright.
    for (&field, header) in overrides {
        let idx = headers
            .iter()
            .position(|h| h == header)
            .ok_or_else(|| {
                AppError::ValidationError(format!(
                    "Mapped column '{}' does not exist in the file",
                    header
                ))
            })?;
        if !claimed.insert(idx) {
            return Err(AppError::ValidationError(format!(
                "Column '{}' is mapped to more than one field",
                header
            )));
        }
        mapping.columns.insert(
            field,
            MappedColumn {
                source_header: header.clone(),
                match_kind: MatchKind::Manual,
                score: 1.0,
            },
        );
    }

    let normalized: Vec<String> = headers.iter().map(|h| normalize_header(h)).collect();

    // Synonym pass.
    for field in TargetField::ALL {
        if mapping.is_mapped(field) {
            continue;
        }
        let hit = normalized
            .iter()
            .enumerate()
            .find(|(idx, clean)| {
                !claimed.contains(idx) && field.synonyms().contains(&clean.as_str())
            })
            .map(|(idx, _)| idx);
        if let Some(idx) = hit {
            claimed.insert(idx);
            mapping.columns.insert(
                field,
                MappedColumn {
                    source_header: headers[idx].clone(),
                    match_kind: MatchKind::Synonym,
                    score: 1.0,
                },
            );
        }
    }

    // Similarity pass: score every remaining pair, assign greedily.
    let mut candidates: Vec<(f64, TargetField, usize)> = Vec::new();
    for field in TargetField::ALL {
        if mapping.is_mapped(field) {
            continue;
        }
        for (idx, clean) in normalized.iter().enumerate() {
            if claimed.contains(&idx) {
                continue;
            }
            let score = similarity(field.as_str(), clean);
            if score >= MAPPING_THRESHOLD {
                candidates.push((score, field, idx));
            }
        }
    }
    candidates.sort_by(|a, b| {
        b.0.partial_cmp(&a.0)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.2.cmp(&b.2))
    });
    for (score, field, idx) in candidates {
        if mapping.is_mapped(field) || claimed.contains(&idx) {
            continue;
        }
        claimed.insert(idx);
        mapping.columns.insert(
            field,
            MappedColumn {
                source_header: headers[idx].clone(),
                match_kind: MatchKind::Similarity,
                score,
            },
        );
    }

    mapping.unmapped_headers = headers
        .iter()
        .enumerate()
        .filter(|(idx, _)| !claimed.contains(idx))
        .map(|(_, h)| h.clone())
        .collect();

    for field in TargetField::ALL {
        if field.is_required() && !mapping.is_mapped(field) {
            return Err(AppError::ValidationError(format!(
                "No column could be mapped to the required field '{}'",
                field.as_str()
            )));
        }
    }

    Ok(mapping)
}

/// Normalized Levenshtein similarity in [0, 1].
pub fn similarity(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    1.0 - levenshtein(a, b) as f64 / max_len as f64
}

fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0usize; b.len() + 1];

    for (i, &ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            current[j + 1] = (prev[j + 1] + 1)
                .min(current[j] + 1)
                .min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut current);
    }
    prev[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("same", "same"), 0);
    }

    #[test]
    fn test_synonyms_matched_first() {
        let mapping = map_headers(
            &headers(&["Full Name", "E-Mail Address", "Telephone"]),
            &HashMap::new(),
        )
        .unwrap();

        assert_eq!(mapping.source_for(TargetField::Name), Some("Full Name"));
        assert_eq!(
            mapping.source_for(TargetField::Email),
            Some("E-Mail Address")
        );
        assert_eq!(mapping.source_for(TargetField::Phone), Some("Telephone"));
        assert_eq!(
            mapping.columns[&TargetField::Name].match_kind,
            MatchKind::Synonym
        );
    }

    #[test]
    fn test_similarity_fallback() {
        // "emial" is a typo no synonym covers; similarity picks it up.
        let mapping = map_headers(&headers(&["Name", "Emial"]), &HashMap::new()).unwrap();

        let email = &mapping.columns[&TargetField::Email];
        assert_eq!(email.source_header, "Emial");
        assert_eq!(email.match_kind, MatchKind::Similarity);
        assert!(email.score >= MAPPING_THRESHOLD);
    }

    #[test]
    fn test_each_header_claimed_once() {
        // "note" could fit notes; nothing else should steal it after.
        let mapping = map_headers(
            &headers(&["Name", "Notes", "Irrelevant Column"]),
            &HashMap::new(),
        )
        .unwrap();

        assert_eq!(mapping.source_for(TargetField::Notes), Some("Notes"));
        assert_eq!(
            mapping.unmapped_headers,
            vec!["Irrelevant Column".to_string()]
        );
    }

    #[test]
    fn test_missing_required_field_fails() {
        let err = map_headers(&headers(&["Email", "Phone"]), &HashMap::new()).unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[test]
    fn test_manual_override_wins() {
        let overrides = HashMap::from([(TargetField::Name, "Weird Column".to_string())]);
        let mapping = map_headers(&headers(&["Weird Column", "Email"]), &overrides).unwrap();

        let name = &mapping.columns[&TargetField::Name];
        assert_eq!(name.source_header, "Weird Column");
        assert_eq!(name.match_kind, MatchKind::Manual);
    }

    #[test]
    fn test_override_to_missing_column_fails() {
        let overrides = HashMap::from([(TargetField::Name, "Nope".to_string())]);
        let err = map_headers(&headers(&["Name"]), &overrides).unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }
}
