// Column resolution: map free-form source headers onto the canonical fields.
//
// Each canonical field is matched by lowercase substring against the headers
// in schema order, and the first hit wins. When two headers contain the same
// token the winner depends on column order, so reordering the source columns
// can change the result.
use crate::types::CanonicalField;
use log::debug;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedColumn {
    /// Matched header, or the literal fallback name when nothing matched.
    pub name: String,
    /// Position of `name` in the schema; `None` means the field is absent.
    pub index: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMap {
    columns: BTreeMap<CanonicalField, ResolvedColumn>,
}

impl FieldMap {
    pub fn resolve(headers: &[String]) -> Self {
        let columns = CanonicalField::ALL
            .iter()
            .map(|&field| {
                let name = resolve_column(headers, field.token())
                    .unwrap_or_else(|| field.fallback_name())
                    .to_string();
                let index = headers.iter().position(|h| *h == name);
                debug!("resolved {:?} -> {:?} (present: {})", field, name, index.is_some());
                (field, ResolvedColumn { name, index })
            })
            .collect();
        FieldMap { columns }
    }

    pub fn column_name(&self, field: CanonicalField) -> &str {
        self.columns
            .get(&field)
            .map(|c| c.name.as_str())
            .unwrap_or_else(|| field.fallback_name())
    }

    pub fn index(&self, field: CanonicalField) -> Option<usize> {
        self.columns.get(&field).and_then(|c| c.index)
    }

    pub fn is_present(&self, field: CanonicalField) -> bool {
        self.index(field).is_some()
    }

    pub fn missing_fields(&self) -> Vec<CanonicalField> {
        CanonicalField::ALL
            .iter()
            .copied()
            .filter(|f| !self.is_present(*f))
            .collect()
    }
}

/// First header (in schema order) whose lowercased name contains `token`.
pub fn resolve_column<'a>(headers: &'a [String], token: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|h| h.to_lowercase().contains(token))
        .map(String::as_str)
}
