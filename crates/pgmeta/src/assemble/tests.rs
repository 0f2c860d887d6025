use super::*;
use crate::types::Pagination;
use serde_json::json;

fn users() -> QueryTable {
    QueryTable::public("users")
}

fn row(value: Value) -> JsonRow {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

fn id_eq(id: i64) -> Vec<Filter> {
    vec![Filter::new("id", FilterOperator::Eq, id)]
}

fn select_with(filters: Vec<Filter>) -> QueryResult<String> {
    select_query(&users(), None, &SelectOptions::new().with_filters(filters))
}

// ==================== count / truncate ====================

#[test]
fn count_without_filters() {
    let sql = count_query(&users(), &CountOptions::new()).unwrap();
    assert_eq!(sql, "select count(*) from public.users;");
}

#[test]
fn count_with_filters() {
    let options = CountOptions::new().with_filters(vec![Filter::new("id", FilterOperator::Gt, 1)]);
    let sql = count_query(&users(), &options).unwrap();
    assert_eq!(sql, "select count(*) from public.users where id > 1;");
}

#[test]
fn truncate_plain_and_cascade() {
    assert_eq!(
        truncate_query(&users(), &TruncateOptions::new()).unwrap(),
        "truncate public.users;"
    );
    assert_eq!(
        truncate_query(&users(), &TruncateOptions::new().cascade()).unwrap(),
        "truncate public.users cascade;"
    );
}

// ==================== delete ====================

#[test]
fn delete_requires_filters() {
    let err = delete_query(&users(), &[], &DeleteOptions::new()).unwrap_err();
    assert!(err.is_missing_filter());
    assert_eq!(err.to_string(), "no filters for this delete query");
}

#[test]
fn delete_with_filters() {
    let sql = delete_query(&users(), &id_eq(1), &DeleteOptions::new()).unwrap();
    assert_eq!(sql, "delete from public.users where id = 1;");
}

#[test]
fn delete_returning() {
    let sql = delete_query(&users(), &id_eq(1), &DeleteOptions::new().returning()).unwrap();
    assert_eq!(sql, "delete from public.users where id = 1 returning *;");
}

#[test]
fn delete_returning_enum_arrays() {
    let options = DeleteOptions::new()
        .returning()
        .with_enum_array_columns(&["tags"]);
    let sql = delete_query(&users(), &id_eq(1), &options).unwrap();
    assert_eq!(
        sql,
        "delete from public.users where id = 1 returning *, tags::text[];"
    );
}

#[test]
fn enum_arrays_ignored_without_returning() {
    let options = DeleteOptions::new().with_enum_array_columns(&["tags"]);
    let sql = delete_query(&users(), &id_eq(1), &options).unwrap();
    assert_eq!(sql, "delete from public.users where id = 1;");
}

#[test]
fn delete_keeps_filter_order() {
    let filters = vec![
        Filter::new("name", FilterOperator::Eq, "b"),
        Filter::new("id", FilterOperator::Lt, 3),
    ];
    let sql = delete_query(&users(), &filters, &DeleteOptions::new()).unwrap();
    assert_eq!(sql, "delete from public.users where name = 'b' and id < 3;");
}

// ==================== insert ====================

#[test]
fn insert_requires_rows() {
    let err = insert_query(&users(), &[], &InsertOptions::new()).unwrap_err();
    assert!(err.is_missing_payload());
    assert_eq!(err.to_string(), "no value to insert");
}

#[test]
fn insert_rows() {
    let rows = vec![row(json!({"id": 1, "name": "John"}))];
    let sql = insert_query(&users(), &rows, &InsertOptions::new()).unwrap();
    assert_eq!(
        sql,
        r#"insert into public.users (id,name) select id,name from jsonb_populate_recordset(null::public.users, '[{"id":1,"name":"John"}]');"#
    );
}

#[test]
fn insert_returning_enum_arrays() {
    let rows = vec![row(json!({"id": 1, "name": "John"}))];
    let options = InsertOptions::new()
        .returning()
        .with_enum_array_columns(&["tags"]);
    let sql = insert_query(&users(), &rows, &options).unwrap();
    assert_eq!(
        sql,
        r#"insert into public.users (id,name) select id,name from jsonb_populate_recordset(null::public.users, '[{"id":1,"name":"John"}]') returning *, tags::text[];"#
    );
}

#[test]
fn insert_empty_object_omits_column_list() {
    let rows = vec![JsonRow::new()];
    let sql = insert_query(&users(), &rows, &InsertOptions::new()).unwrap();
    assert_eq!(
        sql,
        "insert into public.users select * from jsonb_populate_recordset(null::public.users, '[{}]');"
    );
}

#[test]
fn insert_escapes_quotes_in_payload() {
    let rows = vec![row(json!({"name": "John O'Reilly"}))];
    let sql = insert_query(
        &QueryTable::public("normal_table"),
        &rows,
        &InsertOptions::new().returning(),
    )
    .unwrap();
    assert_eq!(
        sql,
        r#"insert into public.normal_table (name) select name from jsonb_populate_recordset(null::public.normal_table, '[{"name":"John O''Reilly"}]') returning *;"#
    );
}

#[test]
fn insert_backslash_payload_uses_escape_string() {
    let rows = vec![row(json!({"path": r"C:\tmp"}))];
    let sql = insert_query(&users(), &rows, &InsertOptions::new()).unwrap();
    assert!(sql.contains(r#"E'[{"path":"C:\\\\tmp"}]'"#), "{sql}");
}

// ==================== select ====================

#[test]
fn select_defaults_to_star() {
    assert_eq!(
        select_query(&users(), None, &SelectOptions::new()).unwrap(),
        "select * from public.users;"
    );
    assert_eq!(
        select_query(&users(), Some("  "), &SelectOptions::new()).unwrap(),
        "select * from public.users;"
    );
}

#[test]
fn select_custom_columns() {
    let sql = select_query(&users(), Some("id, name"), &SelectOptions::new()).unwrap();
    assert_eq!(sql, "select id, name from public.users;");
}

#[test]
fn select_with_filter() {
    assert_eq!(
        select_with(id_eq(5)).unwrap(),
        "select * from public.users where id = 5;"
    );
}

#[test]
fn select_with_sorts() {
    let options = SelectOptions::new().with_sorts(vec![Sort::on("users", "name", true, false)]);
    let sql = select_query(&users(), Some("*"), &options).unwrap();
    assert_eq!(sql, "select * from public.users order by users.name asc nulls last;");
}

#[test]
fn select_with_pagination() {
    let options = SelectOptions::new().with_pagination(Pagination::new(5, 10));
    let sql = select_query(&users(), None, &options).unwrap();
    assert_eq!(sql, "select * from public.users limit 10 offset 5;");
}

#[test]
fn select_skips_sorts_without_column() {
    let options = SelectOptions::new().with_sorts(vec![Sort::on("users", "", true, false)]);
    let sql = select_query(&users(), None, &options).unwrap();
    assert_eq!(sql, "select * from public.users;");
}

#[test]
fn select_quotes_special_table_names() {
    let table = QueryTable::public("table with spaces");
    let options = SelectOptions::new().with_filters(vec![Filter::new(
        "column with spaces",
        FilterOperator::Eq,
        "test value",
    )]);
    let sql = select_query(&table, None, &options).unwrap();
    assert_eq!(
        sql,
        r#"select * from public."table with spaces" where "column with spaces" = 'test value';"#
    );

    let sql = select_query(&QueryTable::public("quoted\"table"), None, &SelectOptions::new()).unwrap();
    assert_eq!(sql, r#"select * from public."quoted""table";"#);
}

#[test]
fn select_other_schema() {
    let sql = select_query(&QueryTable::new("shop", "orders"), None, &SelectOptions::new()).unwrap();
    assert_eq!(sql, "select * from shop.orders;");
}

// ==================== update ====================

#[test]
fn update_requires_filters() {
    let err = update_query(&users(), &row(json!({"name": "John"})), &UpdateOptions::new())
        .unwrap_err();
    assert!(err.is_missing_filter());
    assert_eq!(err.to_string(), "no filters for this update query");
}

#[test]
fn update_requires_values() {
    let err = update_query(
        &users(),
        &JsonRow::new(),
        &UpdateOptions::new().with_filters(id_eq(1)),
    )
    .unwrap_err();
    assert!(err.is_missing_payload());
}

#[test]
fn update_with_filters() {
    let sql = update_query(
        &users(),
        &row(json!({"name": "John"})),
        &UpdateOptions::new().with_filters(id_eq(1)),
    )
    .unwrap();
    assert_eq!(
        sql,
        r#"update public.users set (name) = (select name from json_populate_record(null::public.users, '{"name":"John"}')) where id = 1;"#
    );
}

#[test]
fn update_returning_enum_arrays() {
    let options = UpdateOptions::new()
        .with_filters(id_eq(1))
        .returning()
        .with_enum_array_columns(&["tags"]);
    let sql = update_query(&users(), &row(json!({"name": "John"})), &options).unwrap();
    assert_eq!(
        sql,
        r#"update public.users set (name) = (select name from json_populate_record(null::public.users, '{"name":"John"}')) where id = 1 returning *, tags::text[];"#
    );
}

#[test]
fn update_multiple_columns() {
    let sql = update_query(
        &users(),
        &row(json!({"name": "John", "age": 30})),
        &UpdateOptions::new().with_filters(id_eq(1)),
    )
    .unwrap();
    assert!(sql.starts_with("update public.users set (name,age) = (select name,age from "));
}

// ==================== filters ====================

#[test]
fn filter_string_equality() {
    let sql = select_with(vec![Filter::new("name", FilterOperator::Eq, "John")]).unwrap();
    assert_eq!(sql, "select * from public.users where name = 'John';");
}

#[test]
fn filters_joined_with_and() {
    let sql = select_with(vec![
        Filter::new("name", FilterOperator::Eq, "John"),
        Filter::new("age", FilterOperator::Gt, 25),
    ])
    .unwrap();
    assert_eq!(sql, "select * from public.users where name = 'John' and age > 25;");
}

#[test]
fn filter_in_array() {
    let sql = select_with(vec![Filter::new("id", FilterOperator::In, json!([1, 2, 3]))]).unwrap();
    assert_eq!(sql, "select * from public.users where id in (1,2,3);");
}

#[test]
fn filter_in_comma_string() {
    let sql = select_with(vec![Filter::new("id", FilterOperator::In, "1,2,3")]).unwrap();
    assert_eq!(sql, "select * from public.users where id in ('1','2','3');");
}

#[test]
fn filter_in_rejects_empty_list() {
    assert!(select_with(vec![Filter::new("id", FilterOperator::In, json!([]))]).is_err());
    assert!(select_with(vec![Filter::new("id", FilterOperator::In, "")]).is_err());
}

#[test]
fn filter_is_keywords() {
    for (value, expected) in [
        (json!("null"), "email is null"),
        (json!("not null"), "email is not null"),
        (json!("true"), "email is true"),
        (json!(null), "email is null"),
        (json!(false), "email is false"),
    ] {
        let sql = select_with(vec![Filter::new("email", FilterOperator::Is, value)]).unwrap();
        assert_eq!(sql, format!("select * from public.users where {expected};"));
    }
}

#[test]
fn filter_is_rejects_arbitrary_text() {
    let err = select_with(vec![Filter::new("email", FilterOperator::Is, "null; drop table x")])
        .unwrap_err();
    assert!(matches!(err, QueryError::InvalidFilter(_)));
}

#[test]
fn filter_escapes_quotes() {
    let sql = select_with(vec![Filter::new("name", FilterOperator::Eq, "O'Reilly")]).unwrap();
    assert!(sql.contains("where name = 'O''Reilly'"));
}

#[test]
fn filter_pattern_casts_to_text() {
    let sql = select_with(vec![Filter::new("name", FilterOperator::Like, "%John%")]).unwrap();
    assert_eq!(sql, "select * from public.users where name::text ~~ '%John%';");
}

#[test]
fn filter_array_constructor_passes_through() {
    let sql = select_with(vec![Filter::new(
        "tags",
        FilterOperator::Eq,
        "ARRAY['tag1','tag2']",
    )])
    .unwrap();
    assert_eq!(sql, "select * from public.users where tags = ARRAY['tag1','tag2'];");
}

#[test]
fn filter_array_constructor_is_not_escaped() {
    // Only the `ARRAY[` prefix is checked; the rest is emitted as written.
    let sql = select_with(vec![Filter::new(
        "tags",
        FilterOperator::Eq,
        "ARRAY['it''s']",
    )])
    .unwrap();
    assert_eq!(sql, "select * from public.users where tags = ARRAY['it''s'];");

    let sql = select_with(vec![Filter::new(
        "tags",
        FilterOperator::Eq,
        "array['x']",
    )])
    .unwrap();
    assert_eq!(sql, "select * from public.users where tags = 'array[''x'']';");
}

#[test]
fn filter_non_string_values() {
    let sql = select_with(vec![Filter::new("active", FilterOperator::Eq, true)]).unwrap();
    assert_eq!(sql, "select * from public.users where active = true;");
}

#[test]
fn filter_rejects_empty_column() {
    let err = select_with(vec![Filter::new("", FilterOperator::Eq, 1)]).unwrap_err();
    assert!(matches!(err, QueryError::InvalidIdentifier(_)));
}

// ==================== tuple filters ====================

#[test]
fn tuple_comparisons() {
    for (op, value, expected) in [
        (FilterOperator::Eq, json!([1, 2]), "(id, version) = (1, 2)"),
        (FilterOperator::Gt, json!([1, 2]), "(id, version) > (1, 2)"),
        (FilterOperator::Gte, json!([1, 2]), "(id, version) >= (1, 2)"),
        (FilterOperator::Lt, json!([10, 5]), "(id, version) < (10, 5)"),
        (FilterOperator::Lte, json!([10, 5]), "(id, version) <= (10, 5)"),
        (FilterOperator::Ne, json!([1, 2]), "(id, version) <> (1, 2)"),
    ] {
        let sql = select_with(vec![Filter::new(["id", "version"], op, value)]).unwrap();
        assert_eq!(sql, format!("select * from public.users where {expected};"));
    }
}

#[test]
fn tuple_value_must_be_array() {
    let err = select_with(vec![Filter::new(["id", "version"], FilterOperator::Eq, 1)]).unwrap_err();
    assert_eq!(err.to_string(), "Tuple filter value must be an array");
}

#[test]
fn tuple_value_length_must_match() {
    let err = select_with(vec![Filter::new(["id", "version"], FilterOperator::Eq, json!([1]))])
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Tuple filter value must have the same length as the column array"
    );
}

#[test]
fn tuple_in_rows() {
    let sql = select_with(vec![Filter::new(
        ["id", "version"],
        FilterOperator::In,
        json!([[1, 2], [3, 4], [5, 6]]),
    )])
    .unwrap();
    assert_eq!(
        sql,
        "select * from public.users where (id, version) in ((1, 2), (3, 4), (5, 6));"
    );
}

#[test]
fn tuple_in_rows_arity_mismatch() {
    assert!(select_with(vec![Filter::new(
        ["id", "version"],
        FilterOperator::In,
        json!([[1, 2], [3, 4], [5]]),
    )])
    .is_err());
    assert!(select_with(vec![Filter::new(
        ["id", "version"],
        FilterOperator::In,
        json!(["one,two", "three,four", "five"]),
    )])
    .is_err());
}

#[test]
fn tuple_in_comma_strings() {
    let sql = select_with(vec![Filter::new(
        ["id", "version"],
        FilterOperator::In,
        json!(["one,two", "three,four", "five,six"]),
    )])
    .unwrap();
    assert_eq!(
        sql,
        "select * from public.users where (id, version) in (('one', 'two'), ('three', 'four'), ('five', 'six'));"
    );
}

#[test]
fn tuple_string_values() {
    let sql = select_with(vec![Filter::new(
        ["first_name", "last_name"],
        FilterOperator::Eq,
        json!(["John", "Doe"]),
    )])
    .unwrap();
    assert_eq!(
        sql,
        "select * from public.users where (first_name, last_name) = ('John', 'Doe');"
    );
}

#[test]
fn tuple_mixed_with_regular_filters() {
    let sql = select_with(vec![
        Filter::new(["id", "version"], FilterOperator::Gt, json!([1, 2])),
        Filter::new("active", FilterOperator::Eq, true),
    ])
    .unwrap();
    assert_eq!(
        sql,
        "select * from public.users where (id, version) > (1, 2) and active = true;"
    );
}

#[test]
fn tuple_rejects_is_and_pattern_operators() {
    for op in [
        FilterOperator::Is,
        FilterOperator::Like,
        FilterOperator::Ilike,
        FilterOperator::NotLike,
        FilterOperator::NotIlike,
    ] {
        let result = select_with(vec![Filter::new(
            ["first_name", "last_name"],
            op,
            json!(["%a%", "%b%"]),
        )]);
        assert!(result.is_err(), "{op} should be rejected for tuples");
    }
}

// ==================== sorts ====================

#[test]
fn sort_directions_and_nulls() {
    for (sort, expected) in [
        (Sort::on("users", "name", false, false), "users.name desc nulls last"),
        (Sort::on("users", "name", true, true), "users.name asc nulls first"),
        (Sort::asc("name"), "name asc nulls last"),
    ] {
        let options = SelectOptions::new().with_sorts(vec![sort]);
        let sql = select_query(&users(), None, &options).unwrap();
        assert_eq!(sql, format!("select * from public.users order by {expected};"));
    }
}

#[test]
fn multiple_sorts_keep_order() {
    let options = SelectOptions::new().with_sorts(vec![
        Sort::on("users", "last_name", true, false),
        Sort::on("users", "first_name", true, false),
    ]);
    let sql = select_query(&users(), None, &options).unwrap();
    assert_eq!(
        sql,
        "select * from public.users order by users.last_name asc nulls last, users.first_name asc nulls last;"
    );
}

#[test]
fn statement_variants_expose_kind() {
    let stmt = count_statement(&users(), &CountOptions::new()).unwrap();
    assert_eq!(stmt.kind(), "count");
    assert_eq!(stmt.to_sql(), "select count(*) from public.users;");
}
