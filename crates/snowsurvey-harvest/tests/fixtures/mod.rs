//! Shared fixtures: grid builders and a scripted mock account

use snowsurvey_client::{MockClient, MockClientBuilder};
use snowsurvey_core::Grid;

pub fn cell(s: &str) -> Option<String> {
    Some(s.to_string())
}

/// `SHOW …` output: a throwaway first column plus the `name` column.
pub fn show_names(names: &[&str]) -> Grid {
    Grid::from_rows(
        vec!["created_on".to_string(), "name".to_string()],
        names
            .iter()
            .map(|n| vec![cell("2024-01-01"), cell(n)])
            .collect(),
    )
}

/// `SHOW PARAMETERS` output with the six connector columns.
pub fn parameter_grid() -> Grid {
    Grid::from_rows(
        ["key", "value", "default", "level", "description", "type"]
            .iter()
            .map(|c| c.to_string())
            .collect(),
        vec![
            vec![
                cell("TIMEZONE"),
                cell("UTC"),
                cell("America/Los_Angeles"),
                cell("ACCOUNT"),
                cell("Session timezone"),
                cell("STRING"),
            ],
            vec![
                cell("STATEMENT_TIMEOUT_IN_SECONDS"),
                cell("172800"),
                cell("172800"),
                cell(""),
                cell("Statement timeout"),
                cell("NUMBER"),
            ],
        ],
    )
}

/// Raw `DESCRIBE TABLE` output: ten positional columns, one row per column
/// definition given as `(name, data_type)`.
pub fn describe_grid(columns: &[(&str, &str)]) -> Grid {
    Grid::from_rows(
        (0..10).map(|i| format!("col{}", i)).collect(),
        columns
            .iter()
            .map(|(name, data_type)| {
                vec![
                    cell(name),
                    cell(data_type),
                    cell("COLUMN"),
                    cell("Y"),
                    None,
                    cell("N"),
                    cell("N"),
                    None,
                    None,
                    None,
                ]
            })
            .collect(),
    )
}

/// `SELECT *` sample output with `rows` identical rows.
pub fn sample_grid(rows: usize) -> Grid {
    Grid::from_rows(
        vec!["ID".to_string(), "NAME".to_string()],
        (0..rows)
            .map(|i| vec![cell(&i.to_string()), cell("sample")])
            .collect(),
    )
}

/// `SHOW GRANTS` output.
pub fn grant_grid() -> Grid {
    Grid::from_rows(
        ["created_on", "privilege", "granted_on", "name", "grantee_name"]
            .iter()
            .map(|c| c.to_string())
            .collect(),
        vec![vec![
            cell("2024-01-01"),
            cell("USAGE"),
            cell("DATABASE"),
            cell("DB1"),
            cell("ANALYST"),
        ]],
    )
}

/// The information-schema enumeration statement as the fetcher builds it.
pub fn base_tables_sql(database: &str) -> String {
    format!(
        "SELECT table_schema, table_name FROM \"{}\".information_schema.tables \
         WHERE table_type = 'BASE TABLE' ORDER BY table_schema, table_name",
        database
    )
}

pub fn base_tables_grid(pairs: &[(&str, &str)]) -> Grid {
    Grid::from_rows(
        vec!["TABLE_SCHEMA".to_string(), "TABLE_NAME".to_string()],
        pairs
            .iter()
            .map(|(schema, table)| vec![cell(schema), cell(table)])
            .collect(),
    )
}

/// A small healthy account: two databases, one warehouse, one table each.
pub fn scripted_account() -> MockClient {
    MockClientBuilder::new()
        .with_response("SHOW DATABASES", show_names(&["DB1", "DB2"]))
        .with_response("SHOW WAREHOUSES", show_names(&["WH1"]))
        .with_response("SHOW PARAMETERS IN ACCOUNT", parameter_grid())
        .with_response("SHOW PARAMETERS IN SESSION", parameter_grid())
        .with_response("SHOW PARAMETERS IN DATABASE \"DB1\"", parameter_grid())
        .with_response("SHOW PARAMETERS IN DATABASE \"DB2\"", parameter_grid())
        .with_response("ALTER WAREHOUSE \"WH1\" RESUME", Grid::new(vec!["status".into()]))
        .with_response("SHOW PARAMETERS IN WAREHOUSE \"WH1\"", parameter_grid())
        .with_response("SHOW SCHEMAS IN DATABASE \"DB1\"", show_names(&["PUBLIC"]))
        .with_response("SHOW SCHEMAS IN DATABASE \"DB2\"", show_names(&["PUBLIC"]))
        .with_response(
            "SHOW TABLES IN SCHEMA \"DB1\".\"PUBLIC\"",
            show_names(&["ORDERS"]),
        )
        .with_response(
            "SHOW TABLES IN SCHEMA \"DB2\".\"PUBLIC\"",
            show_names(&["EVENTS"]),
        )
        .with_response(base_tables_sql("DB1"), base_tables_grid(&[("PUBLIC", "ORDERS")]))
        .with_response(base_tables_sql("DB2"), base_tables_grid(&[("PUBLIC", "EVENTS")]))
        .with_response(
            "DESCRIBE TABLE \"DB1\".\"PUBLIC\".\"ORDERS\"",
            describe_grid(&[("ID", "NUMBER(38,0)"), ("AMOUNT", "NUMBER(10,2)")]),
        )
        .with_response(
            "DESCRIBE TABLE \"DB2\".\"PUBLIC\".\"EVENTS\"",
            describe_grid(&[("EVENT_ID", "NUMBER(38,0)"), ("PAYLOAD", "VARIANT")]),
        )
        .with_response(
            "SELECT * FROM \"DB1\".\"PUBLIC\".\"ORDERS\" LIMIT 10",
            sample_grid(3),
        )
        .with_response(
            "SELECT * FROM \"DB2\".\"PUBLIC\".\"EVENTS\" LIMIT 10",
            sample_grid(10),
        )
        .with_response("SHOW GRANTS ON DATABASE \"DB1\"", grant_grid())
        .with_response("SHOW GRANTS ON DATABASE \"DB2\"", grant_grid())
        .with_response("SHOW GRANTS ON SCHEMA \"DB1\".\"PUBLIC\"", grant_grid())
        .with_response("SHOW GRANTS ON SCHEMA \"DB2\".\"PUBLIC\"", grant_grid())
        .with_response(
            "SHOW GRANTS ON TABLE \"DB1\".\"PUBLIC\".\"ORDERS\"",
            grant_grid(),
        )
        .with_response(
            "SHOW GRANTS ON TABLE \"DB2\".\"PUBLIC\".\"EVENTS\"",
            grant_grid(),
        )
        .build()
}
