//! Field resolution
//!
//! A field is resolved by running an ordered chain of strategies over the
//! row; the first strategy that produces a value wins. The default chain is:
//!
//! 1. `direct_label` - exact header label lookup
//! 2. `positional` - `EMPTY_<n>` columns, only for headerless sheets
//! 3. `reversed_key_value` - rows whose labels and values are swapped
//! 4. `content_shape` - numeric scan, only for fields with `content_scan`

use rust_decimal::Decimal;

use crate::domain::cell::{is_placeholder_label, placeholder_label};
use crate::domain::schema::TOTAL_SCAN_CEILING;
use crate::domain::{CellValue, FieldSpec, RawRow};

use super::normalize::parse_decimal_text;

/// Per-sheet facts a strategy may need
#[derive(Debug, Clone, Copy, Default)]
pub struct ResolveContext {
    pub header_found: bool,
}

/// A resolved raw value and the strategy that found it
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub value: CellValue,
    pub strategy: &'static str,
}

/// One way of finding a field's raw value in a row
pub trait ResolveStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn resolve(&self, row: &RawRow, spec: &FieldSpec, ctx: &ResolveContext) -> Option<CellValue>;
}

/// Exact label match against the field's synonyms, skipping blank cells
pub struct DirectLabel;

impl ResolveStrategy for DirectLabel {
    fn name(&self) -> &'static str {
        "direct_label"
    }

    fn resolve(&self, row: &RawRow, spec: &FieldSpec, _ctx: &ResolveContext) -> Option<CellValue> {
        spec.synonyms
            .iter()
            .filter_map(|synonym| row.get(synonym))
            .find(|value| !value.is_blank())
            .cloned()
    }
}

/// Documented column positions, used when the sheet has no header row
pub struct Positional;

impl ResolveStrategy for Positional {
    fn name(&self) -> &'static str {
        "positional"
    }

    fn resolve(&self, row: &RawRow, spec: &FieldSpec, ctx: &ResolveContext) -> Option<CellValue> {
        if ctx.header_found {
            return None;
        }
        spec.positions
            .iter()
            .filter_map(|&idx| row.get(&placeholder_label(idx)))
            .find(|value| !value.is_blank())
            .cloned()
    }
}

/// Recovers rows exported with keys and values transposed
///
/// When a cell's value is one of the field's synonyms, the cell's label is
/// taken as the field's value.
pub struct ReversedKeyValue;

impl ResolveStrategy for ReversedKeyValue {
    fn name(&self) -> &'static str {
        "reversed_key_value"
    }

    fn resolve(&self, row: &RawRow, spec: &FieldSpec, _ctx: &ResolveContext) -> Option<CellValue> {
        for synonym in &spec.synonyms {
            let wanted = synonym.trim().to_lowercase();
            for (label, value) in row.pairs() {
                if is_placeholder_label(label) || label.trim().is_empty() {
                    continue;
                }
                if let CellValue::Text(text) = value {
                    if text.trim().to_lowercase() == wanted {
                        return Some(CellValue::Text(label.to_string()));
                    }
                }
            }
        }
        None
    }
}

/// Label fragments marking a column as holding a total
const TOTAL_LABEL_HINTS: &[&str] = &["total", "اجمالي", "إجمالي"];

/// Label fragments marking a column as definitely not holding a total
const NON_TOTAL_LABEL_HINTS: &[&str] = &[
    "تاريخ",
    "date",
    "المستفيد",
    "beneficiary",
    "الحساب",
    "account",
    "المشروع",
    "project",
    "العميل",
    "client",
];

/// Finds a total by what the cells look like rather than where they are
pub struct ContentShape;

impl ContentShape {
    fn looks_numeric(value: &CellValue) -> bool {
        match value {
            CellValue::Number(n) => n.is_finite() && *n > 0.0,
            CellValue::Text(text) => parse_decimal_text(text).is_some_and(|d| d > Decimal::ZERO),
            CellValue::Empty => false,
        }
    }
}

impl ResolveStrategy for ContentShape {
    fn name(&self) -> &'static str {
        "content_shape"
    }

    fn resolve(&self, row: &RawRow, spec: &FieldSpec, _ctx: &ResolveContext) -> Option<CellValue> {
        if !spec.content_scan {
            return None;
        }

        let hinted = row.pairs().find(|(label, value)| {
            let label = label.to_lowercase();
            TOTAL_LABEL_HINTS.iter().any(|hint| label.contains(hint)) && Self::looks_numeric(value)
        });
        if let Some((_, value)) = hinted {
            return Some(value.clone());
        }

        row.pairs()
            .find(|(label, value)| {
                let in_range =
                    matches!(value, CellValue::Number(n) if *n > 0.0 && *n < TOTAL_SCAN_CEILING);
                if !in_range || is_placeholder_label(label) {
                    return false;
                }
                let label = label.to_lowercase();
                !NON_TOTAL_LABEL_HINTS.iter().any(|hint| label.contains(hint))
            })
            .map(|(_, value)| value.clone())
    }
}

/// Ordered strategy chain
pub struct FieldResolver {
    strategies: Vec<Box<dyn ResolveStrategy>>,
}

impl Default for FieldResolver {
    fn default() -> Self {
        Self::with_strategies(vec![
            Box::new(DirectLabel),
            Box::new(Positional),
            Box::new(ReversedKeyValue),
            Box::new(ContentShape),
        ])
    }
}

impl FieldResolver {
    pub fn with_strategies(strategies: Vec<Box<dyn ResolveStrategy>>) -> Self {
        Self { strategies }
    }

    /// Drop a strategy from the chain by name
    pub fn without(mut self, name: &str) -> Self {
        self.strategies.retain(|s| s.name() != name);
        self
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    pub fn resolve(&self, row: &RawRow, spec: &FieldSpec, ctx: &ResolveContext) -> Option<Resolution> {
        self.strategies.iter().find_map(|strategy| {
            strategy
                .resolve(row, spec, ctx)
                .map(|value| Resolution {
                    value,
                    strategy: strategy.name(),
                })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Field, ImportSchema};

    fn spec(field: Field) -> FieldSpec {
        ImportSchema::payment().field(field).unwrap().clone()
    }

    const WITH_HEADER: ResolveContext = ResolveContext { header_found: true };
    const HEADERLESS: ResolveContext = ResolveContext { header_found: false };

    #[test]
    fn test_direct_label_follows_synonym_order() {
        let row = RawRow::new()
            .with("التاريخ الى", "2-Feb-2025")
            .with("التاريخ من", "1-Feb-2025");
        let resolved = FieldResolver::default()
            .resolve(&row, &spec(Field::Date), &WITH_HEADER)
            .unwrap();
        assert_eq!(resolved.value, CellValue::text("1-Feb-2025"));
        assert_eq!(resolved.strategy, "direct_label");
    }

    #[test]
    fn test_direct_label_skips_blank_values() {
        let row = RawRow::new()
            .with("التاريخ من", "  ")
            .with("التاريخ الى", "2-Feb-2025");
        let resolved = FieldResolver::default()
            .resolve(&row, &spec(Field::Date), &WITH_HEADER)
            .unwrap();
        assert_eq!(resolved.value, CellValue::text("2-Feb-2025"));
    }

    #[test]
    fn test_direct_label_is_case_sensitive() {
        let row = RawRow::new().with("ACCOUNT", "Main");
        assert!(DirectLabel.resolve(&row, &spec(Field::Account), &WITH_HEADER).is_none());
    }

    #[test]
    fn test_positional_only_without_header() {
        let row = RawRow::positional(&[
            CellValue::from(45000.0),
            CellValue::Empty,
            CellValue::from("Acme"),
            CellValue::from("Main"),
        ]);
        let resolver = FieldResolver::default();

        let resolved = resolver.resolve(&row, &spec(Field::Account), &HEADERLESS).unwrap();
        assert_eq!(resolved.value, CellValue::text("Main"));
        assert_eq!(resolved.strategy, "positional");

        assert!(Positional.resolve(&row, &spec(Field::Account), &WITH_HEADER).is_none());
    }

    #[test]
    fn test_positional_date_falls_back_to_second_column() {
        let row = RawRow::positional(&[CellValue::Empty, CellValue::from(45000.0)]);
        let resolved = FieldResolver::default()
            .resolve(&row, &spec(Field::Date), &HEADERLESS)
            .unwrap();
        assert_eq!(resolved.value, CellValue::Number(45000.0));
    }

    #[test]
    fn test_reversed_key_value_total() {
        let row = RawRow::new().with("2563345", "الاجمالي");
        let resolved = FieldResolver::default()
            .resolve(&row, &spec(Field::Total), &WITH_HEADER)
            .unwrap();
        assert_eq!(resolved.value, CellValue::text("2563345"));
        assert_eq!(resolved.strategy, "reversed_key_value");
    }

    #[test]
    fn test_reversed_key_value_ignores_case_and_whitespace() {
        let row = RawRow::new().with("ProjA", "  PROJECT ");
        let resolved = ReversedKeyValue.resolve(&row, &spec(Field::Project), &WITH_HEADER);
        assert_eq!(resolved, Some(CellValue::text("ProjA")));
    }

    #[test]
    fn test_reversed_key_value_never_returns_placeholder() {
        let row = RawRow::new().with("EMPTY_3", "الحساب");
        assert!(ReversedKeyValue.resolve(&row, &spec(Field::Account), &WITH_HEADER).is_none());
    }

    #[test]
    fn test_reversed_strategy_can_be_disabled() {
        let resolver = FieldResolver::default().without("reversed_key_value");
        assert_eq!(
            resolver.strategy_names(),
            vec!["direct_label", "positional", "content_shape"]
        );
        let row = RawRow::new().with("Main", "الحساب");
        assert!(resolver.resolve(&row, &spec(Field::Account), &WITH_HEADER).is_none());
    }

    #[test]
    fn test_content_shape_prefers_total_labels() {
        let row = RawRow::new()
            .with("Qty", 3.0)
            .with("Grand Total (SAR)", "2,500");
        let resolved = FieldResolver::default()
            .resolve(&row, &spec(Field::Total), &WITH_HEADER)
            .unwrap();
        assert_eq!(resolved.value, CellValue::text("2,500"));
        assert_eq!(resolved.strategy, "content_shape");
    }

    #[test]
    fn test_content_shape_last_resort_skips_dates_and_placeholders() {
        let row = RawRow::new()
            .with("تاريخ الدفع", 45000.0)
            .with("EMPTY_2", 12.0)
            .with("Account", 500.0)
            .with("المبلغ", 750.0);
        let resolved = ContentShape.resolve(&row, &spec(Field::Total), &WITH_HEADER);
        assert_eq!(resolved, Some(CellValue::Number(750.0)));
    }

    #[test]
    fn test_content_shape_skips_non_positive_hinted_text() {
        let row = RawRow::new()
            .with("Total", "0")
            .with("Net total", "-5")
            .with("المبلغ", 640.0);
        let resolved = ContentShape.resolve(&row, &spec(Field::Total), &WITH_HEADER);
        assert_eq!(resolved, Some(CellValue::Number(640.0)));
    }

    #[test]
    fn test_content_shape_respects_ceiling() {
        let row = RawRow::new().with("Qty", 2_000_000.0);
        assert!(ContentShape.resolve(&row, &spec(Field::Total), &WITH_HEADER).is_none());
    }

    #[test]
    fn test_content_shape_only_for_total() {
        let row = RawRow::new().with("Qty", 5.0);
        assert!(ContentShape.resolve(&row, &spec(Field::Account), &WITH_HEADER).is_none());
    }

    #[test]
    fn test_unresolved_field_is_none() {
        let row = RawRow::new().with("Other", "x");
        assert!(FieldResolver::default()
            .resolve(&row, &spec(Field::Project), &WITH_HEADER)
            .is_none());
    }
}
