//! Row validation and record assembly

use std::collections::HashMap;

use crate::domain::{
    CellValue, Field, FieldType, ImportSchema, LedgerRecord, RejectReason, ValidatedFields,
};

use super::normalize::{normalize_total, DateNormalizer, TotalError};

/// Raw values the resolver found for one row, keyed by field
pub type ResolvedFields = HashMap<Field, CellValue>;

fn present(resolved: &ResolvedFields, field: Field) -> Option<&CellValue> {
    resolved.get(&field).filter(|value| !value.is_blank())
}

/// Check one row against the schema and normalize its values
///
/// Checks run in a fixed order: date present, required text fields present
/// (schema order), total present, date parseable, total valid.
pub fn validate_row(
    schema: &ImportSchema,
    resolved: &ResolvedFields,
    dates: &DateNormalizer,
) -> Result<ValidatedFields, RejectReason> {
    let date_field = field_of_type(schema, FieldType::Date).unwrap_or(Field::Date);
    let total_field = field_of_type(schema, FieldType::Decimal).unwrap_or(Field::Total);

    let raw_date = present(resolved, date_field).ok_or(RejectReason::MissingDate)?;

    for spec in &schema.fields {
        if spec.required && spec.field_type == FieldType::Text && present(resolved, spec.field).is_none() {
            return Err(RejectReason::MissingRequiredField(spec.field));
        }
    }

    let raw_total = present(resolved, total_field).ok_or(RejectReason::MissingTotal)?;

    let date = dates
        .normalize(raw_date)
        .ok_or(RejectReason::InvalidDateFormat)?;

    let total = normalize_total(raw_total).map_err(|e| match e {
        TotalError::Missing => RejectReason::MissingTotal,
        TotalError::Invalid => RejectReason::InvalidTotal,
    })?;

    let mut fields = ValidatedFields::new(date, total);
    for spec in schema.fields.iter().filter(|s| s.field_type == FieldType::Text) {
        if let Some(value) = present(resolved, spec.field) {
            fields.set_text(spec.field, value.as_text().trim());
        }
    }
    Ok(fields)
}

/// Validate and assemble a record in one step
pub fn assemble<R: LedgerRecord>(
    schema: &ImportSchema,
    resolved: &ResolvedFields,
    dates: &DateNormalizer,
) -> Result<R, RejectReason> {
    validate_row(schema, resolved, dates).map(R::from_fields)
}

fn field_of_type(schema: &ImportSchema, field_type: FieldType) -> Option<Field> {
    schema
        .fields
        .iter()
        .find(|spec| spec.field_type == field_type)
        .map(|spec| spec.field)
}
