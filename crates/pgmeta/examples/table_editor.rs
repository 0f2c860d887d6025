//! Example: the statements a table editor sends for common grid actions.
//!
//! Run with:
//!   cargo run --example table_editor -p pgmeta

use colored::Colorize;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table, presets::UTF8_FULL};
use pgmeta::{
    ColumnMetadata, DeleteOptions, FilterOperator, InsertOptions, QueryError, QueryResult,
    TableMetadata, TableRowsOptions, TruncateOptions, UpdateOptions, table, table_rows_query,
};
use serde_json::json;

fn print_header(title: &str) {
    println!();
    println!("{}", "─".repeat(70).bright_black());
    println!("{}", title.bold().cyan());
    println!("{}", "─".repeat(70).bright_black());
}

fn statements_table(rows: &[(&str, QueryResult<String>)]) -> Table {
    let mut out = Table::new();
    out.load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Grid action")
                .add_attribute(Attribute::Bold)
                .fg(Color::Cyan),
            Cell::new("Statement")
                .add_attribute(Attribute::Bold)
                .fg(Color::Cyan),
        ]);

    for (label, result) in rows {
        let cell = match result {
            Ok(sql) => Cell::new(sql).fg(Color::White),
            Err(err) => Cell::new(format!("error: {err}")).fg(Color::Red),
        };
        out.add_row(vec![Cell::new(label).fg(Color::Yellow), cell]);
    }

    out
}

fn main() -> Result<(), QueryError> {
    let users = || table("public", "users");

    print_header("Browsing rows");
    let users_metadata = TableMetadata::new("public", "users")
        .with_primary_keys(&["id"])
        .with_column(ColumnMetadata::new("id", "bigint", "int8"))
        .with_column(ColumnMetadata::new("name", "text", "text"))
        .with_column(ColumnMetadata::new("tags", "ARRAY", "_text"));
    let browse = vec![
        ("row count", users().count().to_sql()),
        (
            "grid page 3",
            table_rows_query(
                &users_metadata,
                &TableRowsOptions::new().with_page(3, 100).with_max_characters(2048),
            ),
        ),
        (
            "page 2, sorted by name",
            users()
                .select("*")
                .filter("name", FilterOperator::Ilike, "%jo%")
                .order_on("users", "name", true, false)
                .range(100, 199)
                .to_sql(),
        ),
        (
            "keyset page after (id, version)",
            users()
                .select("*")
                .filter_tuple(&["id", "version"], FilterOperator::Gt, json!([42, 3]))
                .order("id", true, false)
                .range(0, 99)
                .to_sql(),
        ),
    ];
    println!("{}", statements_table(&browse));

    print_header("Editing rows");
    let edit = vec![
        (
            "insert row",
            users()
                .insert(
                    &[json!({"name": "John O'Reilly", "tags": ["admin"]})],
                    InsertOptions::new().returning().with_enum_array_columns(&["tags"]),
                )
                .to_sql(),
        ),
        (
            "edit cell",
            users()
                .update(&json!({"name": "Jane"}), UpdateOptions::new().returning())
                .filter("id", FilterOperator::Eq, 1)
                .to_sql(),
        ),
        (
            "delete selected",
            users()
                .delete(DeleteOptions::new().returning())
                .filter("id", FilterOperator::In, json!([1, 2, 3]))
                .to_sql(),
        ),
        (
            "delete without selection",
            users().delete(DeleteOptions::new()).to_sql(),
        ),
        (
            "empty table",
            users().truncate(TruncateOptions::new().cascade()).to_sql(),
        ),
    ];
    println!("{}", statements_table(&edit));

    // The successful statements are ready to send as-is.
    let sql = users().count().to_sql()?;
    println!("\n  {} {}", "✓".green().bold(), sql);
    Ok(())
}
