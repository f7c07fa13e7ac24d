//! Database schema management
//!
//! This module holds the DDL for every object the scenarios run against and
//! the bootstrap that drops and rebuilds them at the start of a session.

use anyhow::{anyhow, Result};
use rusqlite::Connection;
use serde::Serialize;

/// Schema definitions for all objects in the scenario database
pub struct SchemaDefinitions;

impl SchemaDefinitions {
    pub const USERS_TABLE: &'static str = r#"
        CREATE TABLE users (
            id INTEGER PRIMARY KEY,
            name TEXT
        );
    "#;

    /// Plain foreign key, no cascade
    pub const ORDERS_TABLE: &'static str = r#"
        CREATE TABLE orders (
            id INTEGER PRIMARY KEY,
            user_id INTEGER,
            item TEXT,
            FOREIGN KEY (user_id) REFERENCES users(id)
        );
    "#;

    pub const LOGS_TABLE: &'static str = r#"
        CREATE TABLE logs (
            id INTEGER PRIMARY KEY,
            action TEXT
        );
    "#;

    /// Lookup target for the index scenario
    pub const TEST_TABLE: &'static str = r#"
        CREATE TABLE test (
            id INTEGER PRIMARY KEY,
            name TEXT
        );
    "#;

    pub const PARENTS_TABLE: &'static str = r#"
        CREATE TABLE parents (
            id INTEGER PRIMARY KEY,
            name TEXT
        );
    "#;

    pub const CHILDREN_TABLE: &'static str = r#"
        CREATE TABLE children (
            id INTEGER PRIMARY KEY,
            parent_id INTEGER,
            name TEXT,
            FOREIGN KEY (parent_id) REFERENCES parents(id) ON DELETE CASCADE
        );
    "#;

    pub const PERFORMANCE_TEST_TABLE: &'static str = r#"
        CREATE TABLE performance_test (
            id INTEGER PRIMARY KEY,
            value TEXT
        );
    "#;

    pub const TEST_NAME_INDEX: &'static str = "CREATE INDEX idx_name ON test(name)";

    pub const USER_ORDERS_VIEW: &'static str = r#"
        CREATE VIEW user_orders AS
        SELECT users.name, orders.item
        FROM users INNER JOIN orders ON users.id = orders.user_id;
    "#;

    pub const ORDER_INSERT_TRIGGER: &'static str = r#"
        CREATE TRIGGER order_insert AFTER INSERT ON orders
        BEGIN
            INSERT INTO logs (action) VALUES ('New order registered');
        END;
    "#;

    /// Tables in creation order; parents come before their dependents
    pub const TABLES: &'static [(&'static str, &'static str)] = &[
        ("users", Self::USERS_TABLE),
        ("orders", Self::ORDERS_TABLE),
        ("logs", Self::LOGS_TABLE),
        ("test", Self::TEST_TABLE),
        ("parents", Self::PARENTS_TABLE),
        ("children", Self::CHILDREN_TABLE),
        ("performance_test", Self::PERFORMANCE_TEST_TABLE),
    ];

    pub const INDEXES: &'static [(&'static str, &'static str)] =
        &[("idx_name", Self::TEST_NAME_INDEX)];

    pub const VIEWS: &'static [(&'static str, &'static str)] =
        &[("user_orders", Self::USER_ORDERS_VIEW)];

    pub const TRIGGERS: &'static [(&'static str, &'static str)] =
        &[("order_insert", Self::ORDER_INSERT_TRIGGER)];

    /// Every schema object a bootstrapped database must contain
    pub fn expected_objects() -> Vec<SchemaObject> {
        let mut objects = Vec::new();
        objects.extend(Self::TABLES.iter().map(|(n, _)| SchemaObject::new("table", n)));
        objects.extend(Self::INDEXES.iter().map(|(n, _)| SchemaObject::new("index", n)));
        objects.extend(Self::VIEWS.iter().map(|(n, _)| SchemaObject::new("view", n)));
        objects.extend(Self::TRIGGERS.iter().map(|(n, _)| SchemaObject::new("trigger", n)));
        objects
    }
}

/// A named entry of `sqlite_master`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct SchemaObject {
    pub kind: String,
    pub name: String,
}

impl SchemaObject {
    pub fn new(kind: &str, name: &str) -> Self {
        SchemaObject {
            kind: kind.to_string(),
            name: name.to_string(),
        }
    }
}

/// Schema manager for the scenario database
///
/// Handles the drop-and-rebuild bootstrap and schema inspection.
pub struct SchemaManager<'a> {
    conn: &'a Connection,
}

impl<'a> SchemaManager<'a> {
    /// Create a new schema manager for the given connection
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Drop every known object and recreate the full schema
    ///
    /// Runs inside a single transaction; any failure rolls the whole
    /// bootstrap back and is returned to the caller.
    pub fn bootstrap(&self) -> Result<()> {
        let tx = self
            .conn
            .unchecked_transaction()
            .map_err(|e| anyhow!("Failed to begin bootstrap transaction: {}", e))?;

        Self::drop_all(&tx)?;

        for (name, sql) in SchemaDefinitions::TABLES {
            tx.execute(sql, [])
                .map_err(|e| anyhow!("Failed to create table {}: {}", name, e))?;
        }
        for (name, sql) in SchemaDefinitions::INDEXES {
            tx.execute(sql, [])
                .map_err(|e| anyhow!("Failed to create index {}: {}", name, e))?;
        }
        for (name, sql) in SchemaDefinitions::VIEWS {
            tx.execute(sql, [])
                .map_err(|e| anyhow!("Failed to create view {}: {}", name, e))?;
        }
        for (name, sql) in SchemaDefinitions::TRIGGERS {
            tx.execute(sql, [])
                .map_err(|e| anyhow!("Failed to create trigger {}: {}", name, e))?;
        }

        tx.commit()
            .map_err(|e| anyhow!("Failed to commit bootstrap: {}", e))?;
        Ok(())
    }

    /// Drop triggers, then views, then tables (dependents first)
    pub fn reset(&self) -> Result<()> {
        Self::drop_all(self.conn)
    }

    fn drop_all(conn: &Connection) -> Result<()> {
        for (name, _) in SchemaDefinitions::TRIGGERS {
            conn.execute(&format!("DROP TRIGGER IF EXISTS {}", name), [])
                .map_err(|e| anyhow!("Failed to drop trigger {}: {}", name, e))?;
        }
        for (name, _) in SchemaDefinitions::VIEWS {
            conn.execute(&format!("DROP VIEW IF EXISTS {}", name), [])
                .map_err(|e| anyhow!("Failed to drop view {}: {}", name, e))?;
        }
        for (name, _) in SchemaDefinitions::TABLES.iter().rev() {
            conn.execute(&format!("DROP TABLE IF EXISTS {}", name), [])
                .map_err(|e| anyhow!("Failed to drop table {}: {}", name, e))?;
        }
        Ok(())
    }

    /// List user-visible objects in `sqlite_master`, sorted
    pub fn objects(&self) -> Result<Vec<SchemaObject>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT type, name FROM sqlite_master
                 WHERE name NOT LIKE 'sqlite_%'
                 ORDER BY type, name",
            )
            .map_err(|e| anyhow!("Failed to prepare schema listing: {}", e))?;

        let rows = stmt
            .query_map([], |row| {
                Ok(SchemaObject {
                    kind: row.get(0)?,
                    name: row.get(1)?,
                })
            })
            .map_err(|e| anyhow!("Failed to list schema objects: {}", e))?;

        let mut objects = Vec::new();
        for object in rows {
            objects.push(object.map_err(|e| anyhow!("Failed to read schema object: {}", e))?);
        }
        Ok(objects)
    }

    /// Check whether the bootstrap has produced every expected object
    pub fn check_status(&self) -> Result<SchemaStatus> {
        let present = self.objects()?;
        let missing: Vec<SchemaObject> = SchemaDefinitions::expected_objects()
            .into_iter()
            .filter(|o| !present.contains(o))
            .collect();

        let expected = SchemaDefinitions::expected_objects().len();
        if missing.len() == expected {
            Ok(SchemaStatus::NotInitialized)
        } else if missing.is_empty() {
            Ok(SchemaStatus::Current)
        } else {
            Ok(SchemaStatus::Incomplete { missing })
        }
    }
}

/// Status of the database schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaStatus {
    /// None of the expected objects exist
    NotInitialized,

    /// Every expected object exists
    Current,

    /// Some objects are missing
    Incomplete { missing: Vec<SchemaObject> },
}

impl std::fmt::Display for SchemaStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaStatus::NotInitialized => write!(f, "not initialized"),
            SchemaStatus::Current => write!(f, "current"),
            SchemaStatus::Incomplete { missing } => {
                let names: Vec<&str> = missing.iter().map(|o| o.name.as_str()).collect();
                write!(f, "incomplete (missing: {})", names.join(", "))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    fn create_test_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute("PRAGMA foreign_keys=ON", []).unwrap();
        conn
    }

    #[test]
    fn test_schema_not_initialized() {
        let conn = create_test_db();
        let manager = SchemaManager::new(&conn);

        assert_eq!(
            manager.check_status().unwrap(),
            SchemaStatus::NotInitialized
        );
    }

    #[test]
    fn test_bootstrap_creates_everything() {
        let conn = create_test_db();
        let manager = SchemaManager::new(&conn);

        manager.bootstrap().unwrap();

        assert_eq!(manager.check_status().unwrap(), SchemaStatus::Current);
        let mut expected = SchemaDefinitions::expected_objects();
        expected.sort();
        assert_eq!(manager.objects().unwrap(), expected);
    }

    #[test]
    fn test_bootstrap_discards_existing_rows() {
        let conn = create_test_db();
        let manager = SchemaManager::new(&conn);

        manager.bootstrap().unwrap();
        conn.execute("INSERT INTO parents (name) VALUES ('p')", [])
            .unwrap();
        conn.execute("INSERT INTO children (parent_id, name) VALUES (1, 'c')", [])
            .unwrap();
        conn.execute("INSERT INTO users (name) VALUES ('u')", [])
            .unwrap();
        conn.execute("INSERT INTO orders (user_id, item) VALUES (1, 'i')", [])
            .unwrap();

        manager.bootstrap().unwrap();

        for table in ["users", "orders", "logs", "parents", "children"] {
            let count: i64 = conn
                .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                    row.get(0)
                })
                .unwrap();
            assert_eq!(count, 0, "{} should be empty after bootstrap", table);
        }
    }

    #[test]
    fn test_incomplete_schema() {
        let conn = create_test_db();
        let manager = SchemaManager::new(&conn);

        manager.bootstrap().unwrap();
        conn.execute("DROP TRIGGER order_insert", []).unwrap();

        match manager.check_status().unwrap() {
            SchemaStatus::Incomplete { missing } => {
                assert_eq!(missing, vec![SchemaObject::new("trigger", "order_insert")]);
            }
            other => panic!("unexpected status: {:?}", other),
        }
    }

    #[test]
    fn test_schema_reset() {
        let conn = create_test_db();
        let manager = SchemaManager::new(&conn);

        manager.bootstrap().unwrap();
        manager.reset().unwrap();
        assert_eq!(
            manager.check_status().unwrap(),
            SchemaStatus::NotInitialized
        );
    }
}
