use super::{
    ColumnDescription, ForeignKeyDescription, KeyRole, SchemaDescription, TableDescription,
};
use crate::database::{DatabaseClient, DatabaseProvider, Row};
use crate::db_error::DbError;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Migration bookkeeping tables hidden from the model
pub const EXCLUDED_TABLES: [&str; 5] = [
    "_prisma_migrations",
    "_sqlx_migrations",
    "__diesel_schema_migrations",
    "schema_migrations",
    "refinery_schema_history",
];

struct DialectQueries {
    tables: &'static str,
    columns: &'static str,
    keys: &'static str,
    foreign_keys: &'static str,
}

const POSTGRES_QUERIES: DialectQueries = DialectQueries {
    tables: "SELECT table_name::text AS table_name \
        FROM information_schema.tables \
        WHERE table_schema = 'public' AND table_type = 'BASE TABLE' \
        ORDER BY table_name",
    // format_type keeps declared length and precision, e.g. character varying(20)
    columns: "SELECT c.relname::text AS table_name, a.attname::text AS column_name, \
        format_type(a.atttypid, a.atttypmod) AS data_type, \
        CASE WHEN a.attnotnull THEN 'NO' ELSE 'YES' END AS is_nullable, \
        a.attnum::int4 AS ordinal_position \
        FROM pg_catalog.pg_attribute a \
        JOIN pg_catalog.pg_class c ON c.oid = a.attrelid \
        JOIN pg_catalog.pg_namespace n ON n.oid = c.relnamespace \
        WHERE n.nspname = 'public' AND c.relkind IN ('r', 'p') \
        AND a.attnum > 0 AND NOT a.attisdropped \
        ORDER BY c.relname, a.attnum",
    keys: "SELECT tc.table_name::text AS table_name, kcu.column_name::text AS column_name, \
        tc.constraint_type::text AS constraint_type \
        FROM information_schema.table_constraints tc \
        JOIN information_schema.key_column_usage kcu \
        ON tc.constraint_name = kcu.constraint_name \
        AND tc.table_schema = kcu.table_schema AND tc.table_name = kcu.table_name \
        WHERE tc.table_schema = 'public' AND tc.constraint_type IN ('PRIMARY KEY', 'UNIQUE')",
    // Zipping conkey with confkey pairs each referencing column with the
    // column it references, also for composite keys
    foreign_keys: "SELECT src.relname::text AS table_name, sa.attname::text AS column_name, \
        dst.relname::text AS target_table, da.attname::text AS target_column \
        FROM pg_catalog.pg_constraint con \
        JOIN pg_catalog.pg_class src ON src.oid = con.conrelid \
        JOIN pg_catalog.pg_namespace n ON n.oid = src.relnamespace \
        JOIN pg_catalog.pg_class dst ON dst.oid = con.confrelid \
        CROSS JOIN LATERAL unnest(con.conkey, con.confkey) AS k(src_attnum, dst_attnum) \
        JOIN pg_catalog.pg_attribute sa \
        ON sa.attrelid = con.conrelid AND sa.attnum = k.src_attnum \
        JOIN pg_catalog.pg_attribute da \
        ON da.attrelid = con.confrelid AND da.attnum = k.dst_attnum \
        WHERE con.contype = 'f' AND n.nspname = 'public'",
};

const MYSQL_QUERIES: DialectQueries = DialectQueries {
    tables: "SELECT table_name AS table_name \
        FROM information_schema.tables \
        WHERE table_schema = DATABASE() AND table_type = 'BASE TABLE' \
        ORDER BY table_name",
    columns: "SELECT table_name AS table_name, column_name AS column_name, \
        column_type AS data_type, is_nullable AS is_nullable, \
        ordinal_position AS ordinal_position \
        FROM information_schema.columns \
        WHERE table_schema = DATABASE() \
        ORDER BY table_name, ordinal_position",
    keys: "SELECT tc.table_name AS table_name, kcu.column_name AS column_name, \
        tc.constraint_type AS constraint_type \
        FROM information_schema.table_constraints tc \
        JOIN information_schema.key_column_usage kcu \
        ON tc.constraint_name = kcu.constraint_name \
        AND tc.table_schema = kcu.table_schema AND tc.table_name = kcu.table_name \
        WHERE tc.table_schema = DATABASE() AND tc.constraint_type IN ('PRIMARY KEY', 'UNIQUE')",
    foreign_keys: "SELECT table_name AS table_name, column_name AS column_name, \
        referenced_table_name AS target_table, referenced_column_name AS target_column \
        FROM information_schema.key_column_usage \
        WHERE table_schema = DATABASE() AND referenced_table_name IS NOT NULL",
};

type TableParts = (Vec<(u64, ColumnDescription)>, BTreeSet<ForeignKeyDescription>);

fn queries_for(provider: DatabaseProvider) -> &'static DialectQueries {
    match provider {
        DatabaseProvider::Postgresql => &POSTGRES_QUERIES,
        DatabaseProvider::Mysql => &MYSQL_QUERIES,
    }
}

fn text_field(row: &Row, key: &str) -> Result<String, DbError> {
    match row.get(key) {
        Some(Value::String(s)) => Ok(s.clone()),
        other => Err(DbError::Execution(format!(
            "Unexpected schema metadata: field '{}' is {:?}",
            key, other
        ))),
    }
}

fn ordinal_field(row: &Row, key: &str) -> Result<u64, DbError> {
    match row.get(key) {
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::String(s)) => s.parse().ok(),
        _ => None,
    }
    .ok_or_else(|| {
        DbError::Execution(format!(
            "Unexpected schema metadata: field '{}' is not an ordinal",
            key
        ))
    })
}

/// Read the table structure of the connected database
pub async fn introspect(client: &dyn DatabaseClient) -> Result<SchemaDescription, DbError> {
    let queries = queries_for(client.provider());

    let table_rows = client.fetch_rows(queries.tables).await?;
    let column_rows = client.fetch_rows(queries.columns).await?;
    let key_rows = client.fetch_rows(queries.keys).await?;
    let fk_rows = client.fetch_rows(queries.foreign_keys).await?;

    let mut tables: BTreeMap<String, TableParts> = BTreeMap::new();
    for row in &table_rows {
        let name = text_field(row, "table_name")?;
        if !EXCLUDED_TABLES.contains(&name.as_str()) {
            tables.entry(name).or_default();
        }
    }

    let mut key_roles: HashMap<(String, String), KeyRole> = HashMap::new();
    for row in &key_rows {
        let table = text_field(row, "table_name")?;
        let column = text_field(row, "column_name")?;
        let role = match text_field(row, "constraint_type")?.as_str() {
            "PRIMARY KEY" => KeyRole::Primary,
            _ => KeyRole::Unique,
        };
        let entry = key_roles.entry((table, column)).or_insert(role);
        if role == KeyRole::Primary {
            *entry = KeyRole::Primary;
        }
    }

    for row in &column_rows {
        let table = text_field(row, "table_name")?;
        let Some((columns, _)) = tables.get_mut(&table) else {
            continue;
        };
        let name = text_field(row, "column_name")?;
        let key = key_roles
            .get(&(table, name.clone()))
            .copied()
            .unwrap_or_default();
        columns.push((
            ordinal_field(row, "ordinal_position")?,
            ColumnDescription {
                name,
                data_type: text_field(row, "data_type")?,
                nullable: text_field(row, "is_nullable")?.eq_ignore_ascii_case("YES"),
                key,
            },
        ));
    }

    for row in &fk_rows {
        let table = text_field(row, "table_name")?;
        let Some((_, foreign_keys)) = tables.get_mut(&table) else {
            continue;
        };
        foreign_keys.insert(ForeignKeyDescription {
            column: text_field(row, "column_name")?,
            target_table: text_field(row, "target_table")?,
            target_column: text_field(row, "target_column")?,
        });
    }

    let tables: Vec<TableDescription> = tables
        .into_iter()
        .map(|(name, (mut columns, foreign_keys))| {
            columns.sort_by_key(|(ordinal, _)| *ordinal);
            TableDescription {
                name,
                columns: columns.into_iter().map(|(_, column)| column).collect(),
                foreign_keys,
            }
        })
        .collect();

    tracing::debug!(
        database = %client.identity(),
        table_count = tables.len(),
        "Schema introspected"
    );

    Ok(SchemaDescription { tables })
}
