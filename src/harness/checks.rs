//! Scenario bodies
//!
//! Each function runs against a connection that already has foreign keys
//! enabled and a bootstrapped schema. Scenarios key their follow-up
//! statements on the rowids their own inserts return, so they do not depend
//! on ids created by other scenarios of the same session.

use std::time::Instant;

use anyhow::{anyhow, bail, ensure, Result};
use rusqlite::{params, OptionalExtension};

use crate::database::{is_constraint_violation, DatabaseConn, SchemaManager};
use crate::harness::ScenarioContext;

/// Marker SQLite prints in a query plan when an index answers the query alone
const COVERING_INDEX_MARKER: &str = "COVERING INDEX";

/// A user id no scenario ever creates
const MISSING_USER_ID: i64 = 99;

fn name_item_rows<P: rusqlite::Params>(
    db: &DatabaseConn,
    sql: &str,
    params: P,
) -> Result<Vec<(String, String)>> {
    let mut stmt = db
        .conn
        .prepare(sql)
        .map_err(|e| anyhow!("Failed to prepare query: {}", e))?;
    let rows = stmt
        .query_map(params, |row| Ok((row.get(0)?, row.get(1)?)))
        .map_err(|e| anyhow!("Failed to run query: {}", e))?;

    let mut result = Vec::new();
    for row in rows {
        result.push(row.map_err(|e| anyhow!("Failed to read row: {}", e))?);
    }
    Ok(result)
}

fn ensure_user_missing(db: &DatabaseConn, user_id: i64) -> Result<()> {
    let existing = db.count("SELECT COUNT(*) FROM users WHERE id = ?1", [user_id])?;
    ensure!(
        existing == 0,
        "user {} exists, cannot exercise the foreign key",
        user_id
    );
    Ok(())
}

pub(crate) fn update_user(ctx: &ScenarioContext<'_>) -> Result<()> {
    let db = ctx.db;

    ctx.step_with("Inserting user", "name: 'Alice'");
    db.insert("INSERT INTO users (name) VALUES (?1)", ["Alice"])?;

    ctx.step_with("Updating user", "renaming 'Alice' to 'Alicia'");
    db.execute_with_params(
        "UPDATE users SET name = ?1 WHERE name = ?2",
        ["Alicia", "Alice"],
    )?;

    ctx.step_with("Checking result", "looking up users named 'Alicia' and 'Alice'");
    let renamed = db.count("SELECT COUNT(*) FROM users WHERE name = ?1", ["Alicia"])?;
    let stale = db.count("SELECT COUNT(*) FROM users WHERE name = ?1", ["Alice"])?;

    ensure!(
        renamed == 1,
        "expected exactly one user named 'Alicia', found {}",
        renamed
    );
    ensure!(stale == 0, "found {} user(s) still named 'Alice'", stale);
    Ok(())
}

pub(crate) fn join_users_orders(ctx: &ScenarioContext<'_>) -> Result<()> {
    let db = ctx.db;

    ctx.step_with("Inserting user", "name: 'Bob'");
    let bob = db.insert("INSERT INTO users (name) VALUES (?1)", ["Bob"])?;

    ctx.step_with("Inserting order", &format!("user id: {}, item: 'Laptop'", bob));
    db.insert(
        "INSERT INTO orders (user_id, item) VALUES (?1, ?2)",
        params![bob, "Laptop"],
    )?;

    ctx.step_with("Reading joined rows", "user_orders where name = 'Bob'");
    let rows = name_item_rows(
        db,
        "SELECT name, item FROM user_orders WHERE name = ?1",
        ["Bob"],
    )?;

    ensure!(
        rows == vec![("Bob".to_string(), "Laptop".to_string())],
        "expected user_orders to join (Bob, Laptop), got {:?}",
        rows
    );
    Ok(())
}

pub(crate) fn view_execution(ctx: &ScenarioContext<'_>) -> Result<()> {
    let db = ctx.db;

    ctx.step_with("Inserting user", "name: 'Charlie'");
    let charlie = db.insert("INSERT INTO users (name) VALUES (?1)", ["Charlie"])?;
    ctx.step_with("Generated user id", &charlie.to_string());

    ctx.step_with(
        "Inserting order",
        &format!("user id: {}, item: 'Smartphone'", charlie),
    );
    db.insert(
        "INSERT INTO orders (user_id, item) VALUES (?1, ?2)",
        params![charlie, "Smartphone"],
    )?;

    ctx.step_with("Querying view", "user_orders where name = 'Charlie'");
    let rows = name_item_rows(
        db,
        "SELECT name, item FROM user_orders WHERE name = ?1",
        ["Charlie"],
    )?;

    ensure!(
        rows == vec![("Charlie".to_string(), "Smartphone".to_string())],
        "expected the view to yield (Charlie, Smartphone), got {:?}",
        rows
    );
    Ok(())
}

pub(crate) fn trigger_execution(ctx: &ScenarioContext<'_>) -> Result<()> {
    let db = ctx.db;

    let logs_before = db.table_count("logs")?;
    ctx.step_with("Counting logs", &format!("{} before insert", logs_before));

    let diana = db.insert("INSERT INTO users (name) VALUES (?1)", ["Diana"])?;
    ctx.step_with(
        "Inserting order",
        &format!("user id: {}, item: 'Keyboard'", diana),
    );
    db.insert(
        "INSERT INTO orders (user_id, item) VALUES (?1, ?2)",
        params![diana, "Keyboard"],
    )?;

    let logs_after = db.table_count("logs")?;
    let orders = db.table_count("orders")?;
    ctx.step_with(
        "Counting logs",
        &format!("{} after insert, {} orders in total", logs_after, orders),
    );

    ensure!(
        logs_after == logs_before + 1,
        "expected the trigger to add one log row, count went from {} to {}",
        logs_before,
        logs_after
    );
    ensure!(
        logs_after == orders,
        "expected one log row per order, found {} logs for {} orders",
        logs_after,
        orders
    );

    let action: String = db
        .conn
        .query_row("SELECT action FROM logs ORDER BY id DESC LIMIT 1", [], |row| {
            row.get(0)
        })
        .map_err(|e| anyhow!("Failed to read latest log: {}", e))?;
    ensure!(
        action == "New order registered",
        "unexpected log action '{}'",
        action
    );
    Ok(())
}

pub(crate) fn foreign_key_constraint(ctx: &ScenarioContext<'_>) -> Result<()> {
    let db = ctx.db;
    ensure_user_missing(db, MISSING_USER_ID)?;
    let orders_before = db.table_count("orders")?;

    ctx.step_with(
        "Inserting order for missing user",
        &format!("user id: {} (does not exist)", MISSING_USER_ID),
    );
    let outcome = db.conn.execute(
        "INSERT INTO orders (user_id, item) VALUES (?1, ?2)",
        params![MISSING_USER_ID, "Phone"],
    );

    match outcome {
        Ok(_) => bail!(
            "insert referencing missing user {} was accepted",
            MISSING_USER_ID
        ),
        Err(e) if is_constraint_violation(&e) => {
            ctx.step_with("Integrity error captured", &e.to_string());
        }
        Err(e) => bail!("expected a constraint violation, got: {}", e),
    }

    let orders_after = db.table_count("orders")?;
    let dangling = db.count(
        "SELECT COUNT(*) FROM orders WHERE user_id = ?1",
        [MISSING_USER_ID],
    )?;
    ensure!(
        orders_after == orders_before && dangling == 0,
        "rejected order was persisted"
    );
    Ok(())
}

pub(crate) fn index_performance(ctx: &ScenarioContext<'_>) -> Result<()> {
    let db = ctx.db;
    let rows = ctx.config.index_rows;
    let progress_every = (rows / 5).max(1);

    ctx.step_with("Inserting test data", &format!("{} rows into test", rows));
    let tx = db.transaction()?;
    {
        let mut stmt = tx
            .prepare_cached("INSERT INTO test (name) VALUES (?1)")
            .map_err(|e| anyhow!("Failed to prepare statement: {}", e))?;
        for i in 1..=rows {
            stmt.execute([format!("User_{}", i)])
                .map_err(|e| anyhow!("Failed to insert test row: {}", e))?;
            if i % progress_every == 0 {
                ctx.step_with("Progress", &format!("{} rows inserted", i));
            }
        }
    }
    tx.commit()
        .map_err(|e| anyhow!("Failed to commit transaction: {}", e))?;

    let target = format!("User_{}", (rows / 2).max(1));
    let indexed_plan = db
        .query_plan(&format!("SELECT * FROM test WHERE name = '{}'", target))?
        .join("; ");
    ctx.step_with("Query plan on indexed column", &indexed_plan);

    let plain_plan = db
        .query_plan(&format!("SELECT * FROM users WHERE name = '{}'", target))?
        .join("; ");
    ctx.step_with("Query plan on non-indexed column", &plain_plan);

    ensure!(
        indexed_plan.contains(COVERING_INDEX_MARKER),
        "lookup on test.name should use the index, plan was: {}",
        indexed_plan
    );
    ensure!(
        !plain_plan.contains(COVERING_INDEX_MARKER),
        "lookup on users.name should not use an index, plan was: {}",
        plain_plan
    );

    let found = db.count("SELECT COUNT(*) FROM test WHERE name = ?1", [&target])?;
    ensure!(found >= 1, "row {} was not found", target);
    Ok(())
}

pub(crate) fn transaction_rollback(ctx: &ScenarioContext<'_>) -> Result<()> {
    let db = ctx.db;
    ensure_user_missing(db, MISSING_USER_ID)?;

    ctx.step_with("Inserting user", "name: 'Marcelo' (committed)");
    db.insert("INSERT INTO users (name) VALUES (?1)", ["Marcelo"])?;

    ctx.step_with(
        "Starting transaction",
        "inserting 'Temporary', then an order for a missing user",
    );
    let tx = db.transaction()?;
    tx.execute("INSERT INTO users (name) VALUES (?1)", ["Temporary"])
        .map_err(|e| anyhow!("Failed to insert inside transaction: {}", e))?;

    let outcome = tx.execute(
        "INSERT INTO orders (user_id, item) VALUES (?1, ?2)",
        params![MISSING_USER_ID, "Monitor"],
    );
    match outcome {
        Ok(_) => bail!("order for missing user was accepted inside the transaction"),
        Err(e) if is_constraint_violation(&e) => {
            ctx.step_with("Integrity error detected", "rolling back");
            tx.rollback()
                .map_err(|e| anyhow!("Failed to roll back transaction: {}", e))?;
        }
        Err(e) => bail!("expected a constraint violation, got: {}", e),
    }

    let marcelo = db.count("SELECT COUNT(*) FROM users WHERE name = ?1", ["Marcelo"])?;
    let temporary = db.count("SELECT COUNT(*) FROM users WHERE name = ?1", ["Temporary"])?;
    let monitors = db.count("SELECT COUNT(*) FROM orders WHERE item = ?1", ["Monitor"])?;
    ctx.step_with(
        "Checking state",
        &format!(
            "Marcelo: {}, Temporary: {}, Monitor orders: {}",
            marcelo, temporary, monitors
        ),
    );

    ensure!(
        marcelo == 1,
        "committed user should survive the rollback, found {}",
        marcelo
    );
    ensure!(temporary == 0, "rolled back insert is still visible");
    ensure!(monitors == 0, "rejected order is still visible");
    Ok(())
}

pub(crate) fn parameterized_query(ctx: &ScenarioContext<'_>) -> Result<()> {
    let db = ctx.db;
    let hostile = "Maria'; DROP TABLE users; --";
    let schema = SchemaManager::new(&db.conn);
    let objects_before = schema.objects()?;

    ctx.step_with("Inserting user with hostile name", hostile);
    db.insert("INSERT INTO users (name) VALUES (?1)", [hostile])?;

    ctx.step("Reading the name back with a bound parameter");
    let fetched: Option<String> = db
        .conn
        .query_row(
            "SELECT name FROM users WHERE name = ?1",
            [hostile],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| anyhow!("Failed to look up user: {}", e))?;

    let users_exists = db.table_exists("users")?;
    let objects_after = schema.objects()?;
    ctx.step_with("users table still exists", &users_exists.to_string());

    ensure!(
        fetched.as_deref() == Some(hostile),
        "expected the name back verbatim, got {:?}",
        fetched
    );
    ensure!(users_exists, "users table was dropped");
    ensure!(
        objects_before == objects_after,
        "schema changed: before {:?}, after {:?}",
        objects_before,
        objects_after
    );
    Ok(())
}

pub(crate) fn like_query(ctx: &ScenarioContext<'_>) -> Result<()> {
    let db = ctx.db;
    let names = ["João Silva", "Maria Silva", "José Souza", "Ana Santos"];

    let tx = db.transaction()?;
    for (i, name) in names.iter().enumerate() {
        ctx.step_with(
            &format!("Inserting user {}/{}", i + 1, names.len()),
            name,
        );
        tx.execute("INSERT INTO users (name) VALUES (?1)", [name])
            .map_err(|e| anyhow!("Failed to insert user: {}", e))?;
    }
    tx.commit()
        .map_err(|e| anyhow!("Failed to commit transaction: {}", e))?;

    let suffix = db.count("SELECT COUNT(*) FROM users WHERE name LIKE ?1", ["%Silva"])?;
    ctx.step_with("Suffix match '%Silva'", &format!("{} user(s)", suffix));
    let substring = db.count("SELECT COUNT(*) FROM users WHERE name LIKE ?1", ["%Sou%"])?;
    ctx.step_with("Substring match '%Sou%'", &format!("{} user(s)", substring));

    ensure!(suffix == 2, "expected 2 users ending in Silva, found {}", suffix);
    ensure!(
        substring == 1,
        "expected 1 user containing 'Sou', found {}",
        substring
    );
    Ok(())
}

pub(crate) fn cascade_delete(ctx: &ScenarioContext<'_>) -> Result<()> {
    let db = ctx.db;

    ctx.step("Inserting parents");
    let first = db.insert("INSERT INTO parents (name) VALUES (?1)", ["Pai1"])?;
    let second = db.insert("INSERT INTO parents (name) VALUES (?1)", ["Pai2"])?;

    ctx.step("Inserting children");
    for (parent, child) in [
        (first, "Filho1"),
        (first, "Filho2"),
        (second, "Filho3"),
        (second, "Filho4"),
    ] {
        db.insert(
            "INSERT INTO children (parent_id, name) VALUES (?1, ?2)",
            params![parent, child],
        )?;
    }

    ctx.step_with("Deleting parent", &format!("Pai1 (id = {})", first));
    db.execute_with_params("DELETE FROM parents WHERE id = ?1", [first])?;

    let orphans = db.count("SELECT COUNT(*) FROM children WHERE parent_id = ?1", [first])?;
    let siblings = db.count("SELECT COUNT(*) FROM children WHERE parent_id = ?1", [second])?;
    ctx.step_with(
        "Counting children",
        &format!("Pai1: {}, Pai2: {}", orphans, siblings),
    );

    ensure!(
        orphans == 0,
        "expected every child of Pai1 to be deleted, {} remain",
        orphans
    );
    ensure!(
        siblings == 2,
        "children of Pai2 should be untouched, found {}",
        siblings
    );
    Ok(())
}

pub(crate) fn batch_insert_performance(ctx: &ScenarioContext<'_>) -> Result<()> {
    let db = ctx.db;
    let rows = ctx.config.batch_rows;
    let progress_every = (rows / 4).max(1);

    ctx.step_with(
        "Timing individual inserts",
        &format!("{} rows, one commit each", rows),
    );
    let start = Instant::now();
    for i in 0..rows {
        db.execute_with_params(
            "INSERT INTO performance_test (value) VALUES (?1)",
            [format!("Value {}", i)],
        )?;
        if i > 0 && i % progress_every == 0 {
            ctx.step_with("Progress", &format!("{}/{} rows inserted", i, rows));
        }
    }
    let individual = start.elapsed();
    let individual_rows = db.table_count("performance_test")?;
    ctx.step_with(
        "Individual inserts done",
        &format!("{:.4} seconds", individual.as_secs_f64()),
    );

    ctx.step("Clearing table");
    db.execute("DELETE FROM performance_test")?;

    ctx.step_with(
        "Timing batched insert",
        &format!("{} rows in one transaction", rows),
    );
    let start = Instant::now();
    let tx = db.transaction()?;
    {
        let mut stmt = tx
            .prepare_cached("INSERT INTO performance_test (value) VALUES (?1)")
            .map_err(|e| anyhow!("Failed to prepare statement: {}", e))?;
        for i in 0..rows {
            stmt.execute([format!("Value {}", i)])
                .map_err(|e| anyhow!("Failed to insert row: {}", e))?;
        }
    }
    tx.commit()
        .map_err(|e| anyhow!("Failed to commit transaction: {}", e))?;
    let batch = start.elapsed();
    let batch_rows = db.table_count("performance_test")?;
    ctx.step_with(
        "Comparing",
        &format!(
            "individual: {:.4}s vs batch: {:.4}s",
            individual.as_secs_f64(),
            batch.as_secs_f64()
        ),
    );

    ensure!(
        individual_rows == u64::from(rows) && batch_rows == u64::from(rows),
        "expected {} rows from each phase, got {} and {}",
        rows,
        individual_rows,
        batch_rows
    );
    ensure!(
        batch < individual,
        "batch insert ({:?}) should be faster than individual inserts ({:?})",
        batch,
        individual
    );
    Ok(())
}
