//! Scenario catalog
//!
//! The fixed set of scenarios the harness knows, the names used to select
//! them, and the menu groups they belong to.

use std::fmt;

use anyhow::Result;
use crate::harness::checks;
use crate::harness::ScenarioContext;

/// A single relational-database behaviour exercised against the schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Scenario {
    UpdateUser,
    JoinUsersOrders,
    ViewExecution,
    TriggerExecution,
    ForeignKeyConstraint,
    IndexPerformance,
    TransactionRollback,
    ParameterizedQuery,
    LikeQuery,
    CascadeDelete,
    BatchInsertPerformance,
}

impl Scenario {
    /// All scenarios in execution order
    pub fn all() -> &'static [Scenario] {
        &[
            Scenario::UpdateUser,
            Scenario::JoinUsersOrders,
            Scenario::ViewExecution,
            Scenario::TriggerExecution,
            Scenario::ForeignKeyConstraint,
            Scenario::IndexPerformance,
            Scenario::TransactionRollback,
            Scenario::ParameterizedQuery,
            Scenario::LikeQuery,
            Scenario::CascadeDelete,
            Scenario::BatchInsertPerformance,
        ]
    }

    /// Selection key; matched exactly
    pub fn name(&self) -> &'static str {
        match self {
            Scenario::UpdateUser => "test_update_user",
            Scenario::JoinUsersOrders => "test_join_users_orders",
            Scenario::ViewExecution => "test_view_execution",
            Scenario::TriggerExecution => "test_trigger_execution",
            Scenario::ForeignKeyConstraint => "test_foreign_key_constraint",
            Scenario::IndexPerformance => "test_index_performance",
            Scenario::TransactionRollback => "test_transaction_rollback",
            Scenario::ParameterizedQuery => "test_parameterized_query",
            Scenario::LikeQuery => "test_like_query",
            Scenario::CascadeDelete => "test_cascade_delete",
            Scenario::BatchInsertPerformance => "test_batch_insert_performance",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Scenario::UpdateUser => "Update a row and read it back by its new value",
            Scenario::JoinUsersOrders => "JOIN users and orders through the user_orders view",
            Scenario::ViewExecution => "Query the user_orders VIEW",
            Scenario::TriggerExecution => "Order inserts fire the logging TRIGGER",
            Scenario::ForeignKeyConstraint => "Foreign key rejects orders for unknown users",
            Scenario::IndexPerformance => "Equality lookups are served by an index",
            Scenario::TransactionRollback => "Rollback discards a failed transaction",
            Scenario::ParameterizedQuery => "Bound parameters neutralise SQL injection",
            Scenario::LikeQuery => "Pattern matching with the LIKE operator",
            Scenario::CascadeDelete => "Deleting a parent cascades to its children",
            Scenario::BatchInsertPerformance => "Batched inserts beat per-row commits",
        }
    }

    pub fn group(&self) -> ScenarioGroup {
        match self {
            Scenario::UpdateUser
            | Scenario::JoinUsersOrders
            | Scenario::ViewExecution
            | Scenario::TriggerExecution
            | Scenario::ForeignKeyConstraint => ScenarioGroup::Basic,
            Scenario::IndexPerformance => ScenarioGroup::Index,
            Scenario::TransactionRollback => ScenarioGroup::Transaction,
            Scenario::ParameterizedQuery => ScenarioGroup::Parameterized,
            Scenario::LikeQuery => ScenarioGroup::Like,
            Scenario::CascadeDelete => ScenarioGroup::Cascade,
            Scenario::BatchInsertPerformance => ScenarioGroup::Batch,
        }
    }

    /// Look a scenario up by its exact name
    pub fn from_name(name: &str) -> Option<Scenario> {
        Scenario::all().iter().copied().find(|s| s.name() == name)
    }

    /// Run the scenario body against an open connection
    pub fn run(&self, ctx: &ScenarioContext<'_>) -> Result<()> {
        match self {
            Scenario::UpdateUser => checks::update_user(ctx),
            Scenario::JoinUsersOrders => checks::join_users_orders(ctx),
            Scenario::ViewExecution => checks::view_execution(ctx),
            Scenario::TriggerExecution => checks::trigger_execution(ctx),
            Scenario::ForeignKeyConstraint => checks::foreign_key_constraint(ctx),
            Scenario::IndexPerformance => checks::index_performance(ctx),
            Scenario::TransactionRollback => checks::transaction_rollback(ctx),
            Scenario::ParameterizedQuery => checks::parameterized_query(ctx),
            Scenario::LikeQuery => checks::like_query(ctx),
            Scenario::CascadeDelete => checks::cascade_delete(ctx),
            Scenario::BatchInsertPerformance => checks::batch_insert_performance(ctx),
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Menu groupings of scenarios
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioGroup {
    Basic,
    Index,
    Transaction,
    Parameterized,
    Like,
    Cascade,
    Batch,
}

impl ScenarioGroup {
    pub fn all() -> &'static [ScenarioGroup] {
        &[
            ScenarioGroup::Basic,
            ScenarioGroup::Index,
            ScenarioGroup::Transaction,
            ScenarioGroup::Parameterized,
            ScenarioGroup::Like,
            ScenarioGroup::Cascade,
            ScenarioGroup::Batch,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            ScenarioGroup::Basic => "basic",
            ScenarioGroup::Index => "index",
            ScenarioGroup::Transaction => "transaction",
            ScenarioGroup::Parameterized => "parameterized",
            ScenarioGroup::Like => "like",
            ScenarioGroup::Cascade => "cascade",
            ScenarioGroup::Batch => "batch",
        }
    }

    /// Key that selects this group in the interactive menu
    pub fn menu_key(&self) -> char {
        match self {
            ScenarioGroup::Basic => '1',
            ScenarioGroup::Index => '2',
            ScenarioGroup::Transaction => '3',
            ScenarioGroup::Parameterized => '4',
            ScenarioGroup::Like => '5',
            ScenarioGroup::Cascade => '6',
            ScenarioGroup::Batch => '7',
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ScenarioGroup::Basic => "Basic tests (Update, JOIN, View, Trigger, Referential integrity)",
            ScenarioGroup::Index => "Index performance tests",
            ScenarioGroup::Transaction => "Transaction and rollback tests",
            ScenarioGroup::Parameterized => "Parameterized query tests",
            ScenarioGroup::Like => "LIKE query tests",
            ScenarioGroup::Cascade => "Cascading delete tests",
            ScenarioGroup::Batch => "Batch insert performance tests",
        }
    }

    /// Longer explanation shown on the manual screen
    pub fn summary(&self) -> &'static str {
        match self {
            ScenarioGroup::Basic => {
                "Runs the update, JOIN, view, trigger and referential integrity scenarios."
            }
            ScenarioGroup::Index => "Checks that an indexed lookup is answered from the index.",
            ScenarioGroup::Transaction => "Checks that a failed transaction can be reverted.",
            ScenarioGroup::Parameterized => {
                "Checks that parameterized queries are immune to SQL injection."
            }
            ScenarioGroup::Like => "Checks pattern searches with the LIKE operator.",
            ScenarioGroup::Cascade => {
                "Checks that cascading deletes keep parent and child tables consistent."
            }
            ScenarioGroup::Batch => "Compares individual inserts with a single batched insert.",
        }
    }

    pub fn scenarios(&self) -> Vec<Scenario> {
        Scenario::all()
            .iter()
            .copied()
            .filter(|s| s.group() == *self)
            .collect()
    }

    pub fn from_menu_key(key: char) -> Option<ScenarioGroup> {
        ScenarioGroup::all()
            .iter()
            .copied()
            .find(|g| g.menu_key() == key)
    }

    pub fn from_name(name: &str) -> Option<ScenarioGroup> {
        let lowered = name.to_lowercase();
        ScenarioGroup::all()
            .iter()
            .copied()
            .find(|g| g.name() == lowered)
    }
}

impl fmt::Display for ScenarioGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
