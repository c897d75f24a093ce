// Build typed records from a raw table using a resolved field map.
use crate::error::{PipelineError, Result};
use crate::resolver::FieldMap;
use crate::types::{CanonicalField, Dataset, RawTable, Record};
use crate::util::{clean_label, parse_f64_safe};
use log::debug;

/// Convert a column of cells to numbers. Unparsable cells become `None`.
pub fn coerce_numeric<'a, I>(cells: I) -> Vec<Option<f64>>
where
    I: IntoIterator<Item = &'a str>,
{
    cells.into_iter().map(|c| parse_f64_safe(Some(c))).collect()
}

/// Resolve, coerce and wrap the table. Fails only on an empty table.
pub fn build_dataset(table: &RawTable) -> Result<Dataset> {
    if table.is_empty() {
        return Err(PipelineError::EmptyInput);
    }
    let fields = FieldMap::resolve(&table.headers);

    let column = |field: CanonicalField| {
        match fields.index(field) {
            Some(col) => (0..table.len())
                .map(|row| table.cell(row, col))
                .collect::<Vec<_>>(),
            None => vec![None; table.len()],
        }
    };
    let numeric = |field: CanonicalField| -> Vec<Option<f64>> {
        let cells = column(field);
        let values = coerce_numeric(cells.iter().map(|c| c.unwrap_or("")));
        let unparsable = cells
            .iter()
            .zip(&values)
            .filter(|(cell, value)| value.is_none() && cell.is_some_and(|c| !c.trim().is_empty()))
            .count();
        if unparsable > 0 {
            debug!(
                "{} cells in {:?} could not be parsed as numbers",
                unparsable,
                fields.column_name(field)
            );
        }
        values
    };

    let regions = column(CanonicalField::Region);
    let courses = column(CanonicalField::Course);
    let genders = column(CanonicalField::Gender);
    let trainees = numeric(CanonicalField::Trainees);
    let placed = numeric(CanonicalField::Placed);
    let completion = numeric(CanonicalField::Completion);

    let records = (0..table.len())
        .map(|i| Record {
            region: clean_label(regions[i]),
            course: clean_label(courses[i]),
            gender: clean_label(genders[i]),
            trainees: trainees[i],
            placed: placed[i],
            completion: completion[i],
        })
        .collect();

    Ok(Dataset { fields, records })
}
