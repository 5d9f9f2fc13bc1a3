use querypilot_tools::schema::introspect;
use querypilot_tools::{
    DatabaseClient, DatabaseConnector, DatabaseProvider, DbError, ForeignKeyDescription, KeyRole,
    SqlxConnector, TableDescription,
};
use serde_json::json;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;

// Integration tests require a disposable PostgreSQL database
// Run with: TEST_POSTGRES_URL=postgresql://... cargo test --test postgres_integration -- --ignored

fn database_url() -> String {
    match std::env::var("TEST_POSTGRES_URL") {
        Ok(url) => url,
        Err(_) => panic!("Skipping integration test - TEST_POSTGRES_URL not set"),
    }
}

async fn connect() -> Arc<dyn DatabaseClient> {
    SqlxConnector::default()
        .connect(DatabaseProvider::Postgresql, &database_url())
        .await
        .unwrap()
}

/// Runs setup statements outside the read-only client
async fn run(statements: &[&str]) {
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&database_url())
        .await
        .unwrap();
    for statement in statements {
        sqlx::query(statement).execute(&pool).await.unwrap();
    }
    pool.close().await;
}

fn table<'a>(tables: &'a [TableDescription], name: &str) -> &'a TableDescription {
    tables
        .iter()
        .find(|t| t.name == name)
        .unwrap_or_else(|| panic!("table {name} not introspected"))
}

fn edge(column: &str, target_table: &str, target_column: &str) -> ForeignKeyDescription {
    ForeignKeyDescription {
        column: column.to_string(),
        target_table: target_table.to_string(),
        target_column: target_column.to_string(),
    }
}

#[tokio::test]
#[ignore] // Run manually with a database
async fn test_values_are_normalized() {
    let db = connect().await;

    let rows = db
        .fetch_rows(
            "SELECT 9007199254740993::int8 AS big_int, 42::int4 AS small_int, \
             12.50::numeric(10,2) AS price, \
             12345678901234567890123456789012345::numeric AS huge, \
             ARRAY[1,2]::int4[] AS ids, ARRAY['ab', NULL]::text[] AS names, \
             interval '2 days' AS gap, '{\"a\": 1}'::jsonb AS doc, \
             NULL::int4 AS missing, true AS flag, '2024-01-02'::date AS day, \
             point(1, 2) AS location, 1 AS id, 2 AS id",
        )
        .await
        .unwrap();

    let row = &rows[0];
    assert_eq!(row["big_int"], json!("9007199254740993"));
    assert_eq!(row["small_int"], json!(42));
    assert_eq!(row["price"], json!("12.50"));
    assert_eq!(row["huge"], json!("12345678901234567890123456789012345"));
    assert_eq!(row["ids"], json!([1, 2]));
    assert_eq!(row["names"], json!(["ab", null]));
    assert_eq!(row["gap"], json!("2 days"));
    assert_eq!(row["doc"], json!({"a": 1}));
    assert_eq!(row["missing"], json!(null));
    assert_eq!(row["flag"], json!(true));
    assert_eq!(row["day"], json!("2024-01-02"));
    // No decoder for geometric types
    assert_eq!(row["location"], json!(null));
    assert_eq!(row["id"], json!(1));
    assert_eq!(row["id_2"], json!(2));
}

#[tokio::test]
#[ignore] // Run manually with a database
async fn test_writes_are_rejected() {
    run(&[
        "DROP TABLE IF EXISTS qp_it_readonly",
        "CREATE TABLE qp_it_readonly (id int4)",
    ])
    .await;

    let db = connect().await;
    let result = db.fetch_rows("INSERT INTO qp_it_readonly VALUES (1)").await;
    assert!(matches!(result, Err(DbError::Execution(_))));

    let rows = db.fetch_rows("SELECT count(*) AS n FROM qp_it_readonly").await.unwrap();
    assert_eq!(rows[0]["n"], json!("0"));

    run(&["DROP TABLE qp_it_readonly"]).await;
}

#[tokio::test]
#[ignore] // Run manually with a database
async fn test_introspection() {
    run(&[
        "DROP TABLE IF EXISTS qp_it_invoice, qp_it_order, qp_it_customer",
        "CREATE TABLE IF NOT EXISTS schema_migrations (version text)",
        "CREATE TABLE qp_it_customer (region text NOT NULL, code int4 NOT NULL, \
         email varchar(20) UNIQUE, PRIMARY KEY (region, code))",
        "CREATE TABLE qp_it_order (id bigserial PRIMARY KEY, region text, code int4, \
         total numeric(12,2), CONSTRAINT fk_customer FOREIGN KEY (region, code) \
         REFERENCES qp_it_customer (region, code))",
        // Same constraint name on another table
        "CREATE TABLE qp_it_invoice (id int4 PRIMARY KEY, customer_region text, \
         customer_code int4, CONSTRAINT fk_customer FOREIGN KEY (customer_region, customer_code) \
         REFERENCES qp_it_customer (region, code))",
    ])
    .await;

    let db = connect().await;
    let schema = introspect(db.as_ref()).await.unwrap();

    assert!(schema.tables.iter().all(|t| t.name != "schema_migrations"));

    let customer = table(&schema.tables, "qp_it_customer");
    let columns: Vec<(&str, &str, bool, KeyRole)> = customer
        .columns
        .iter()
        .map(|c| (c.name.as_str(), c.data_type.as_str(), c.nullable, c.key))
        .collect();
    assert_eq!(
        columns,
        vec![
            ("region", "text", false, KeyRole::Primary),
            ("code", "integer", false, KeyRole::Primary),
            ("email", "character varying(20)", true, KeyRole::Unique),
        ]
    );

    let order = table(&schema.tables, "qp_it_order");
    assert_eq!(order.columns[3].data_type, "numeric(12,2)");
    assert_eq!(
        order.foreign_keys.iter().cloned().collect::<Vec<_>>(),
        vec![
            edge("code", "qp_it_customer", "code"),
            edge("region", "qp_it_customer", "region"),
        ]
    );

    let invoice = table(&schema.tables, "qp_it_invoice");
    assert_eq!(
        invoice.foreign_keys.iter().cloned().collect::<Vec<_>>(),
        vec![
            edge("customer_code", "qp_it_customer", "code"),
            edge("customer_region", "qp_it_customer", "region"),
        ]
    );

    run(&["DROP TABLE qp_it_invoice, qp_it_order, qp_it_customer"]).await;
}
