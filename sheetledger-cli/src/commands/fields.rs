//! Fields command - show the effective import schema

use anyhow::Result;
use colored::Colorize;

use sheetledger_core::domain::FieldType;
use sheetledger_core::RecordKind;

use super::get_context;
use crate::output;

pub fn run(kind: RecordKind, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let schema = ctx.config.schema_for(kind);

    if json {
        println!("{}", serde_json::to_string_pretty(&schema)?);
        return Ok(());
    }

    println!("{}", format!("{} fields", kind).bold());

    let mut table = output::create_table();
    table.set_header(vec!["Field", "Type", "Required", "Column", "Header labels"]);
    for spec in &schema.fields {
        let field_type = match spec.field_type {
            FieldType::Date => "date",
            FieldType::Text => "text",
            FieldType::Decimal => "decimal",
        };
        let required = if spec.required { "yes".green().to_string() } else { "no".to_string() };
        let columns = spec
            .positions
            .iter()
            .map(|p| (p + 1).to_string())
            .collect::<Vec<_>>()
            .join(", ");
        table.add_row(vec![
            spec.field.to_string(),
            field_type.to_string(),
            required,
            columns,
            spec.synonyms.join(", "),
        ]);
    }
    println!("{}", table);

    println!();
    println!("Header row is detected by any of: {}", schema.expected_headers.join(", "));
    Ok(())
}
