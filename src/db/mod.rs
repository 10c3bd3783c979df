mod reports;
mod schema;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::{params, Connection};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;

use crate::models::*;

pub(crate) struct Database {
    conn: Connection,
}

impl Database {
    pub(crate) fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")
            .context("Failed to set database pragmas")?;
        let mut db = Self { conn };
        db.migrate().context("Database migration failed")?;
        db.seed_category_types()?;
        db.seed_default_categories()?;
        Ok(db)
    }

    #[cfg(test)]
    pub(crate) fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        let mut db = Self { conn };
        db.migrate()?;
        db.seed_category_types()?;
        db.seed_default_categories()?;
        Ok(db)
    }

    fn migrate(&mut self) -> Result<()> {
        // Check if schema_version table exists
        let has_version_table: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
            [],
            |row| row.get(0),
        )?;

        if !has_version_table {
            // Fresh database - apply full schema
            self.conn.execute_batch(schema::SCHEMA_V1)?;
            self.conn.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                params![schema::CURRENT_VERSION],
            )?;
            return Ok(());
        }

        // Existing database - check version and apply migrations
        let current: i32 = self
            .conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .unwrap_or(0);

        for &(from_version, sql) in schema::MIGRATIONS {
            if current <= from_version {
                self.conn.execute_batch(sql)?;
            }
        }

        if current < schema::CURRENT_VERSION {
            self.conn.execute(
                "UPDATE schema_version SET version = ?1",
                params![schema::CURRENT_VERSION],
            )?;
        }

        Ok(())
    }

    fn seed_category_types(&mut self) -> Result<()> {
        // Fixed ids, so type_id values are stable across databases
        for t in CategoryType::all() {
            self.conn.execute(
                "INSERT OR IGNORE INTO category_types (id, description) VALUES (?1, ?2)",
                params![t.type_id(), t.as_str()],
            )?;
        }
        Ok(())
    }

    fn seed_default_categories(&mut self) -> Result<()> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM categories", [], |row| row.get(0))?;
        if count > 0 {
            return Ok(());
        }

        let defaults = [
            ("Utilities", CategoryType::Expense),
            ("Rent", CategoryType::Expense),
            ("Food", CategoryType::Expense),
            ("Entertainment", CategoryType::Expense),
            ("Education", CategoryType::Expense),
            ("Miscellaneous", CategoryType::Expense),
            ("Medical Expenses", CategoryType::Expense),
            ("Vacation", CategoryType::Expense),
            ("Credit Card", CategoryType::Credit),
            ("Clothes", CategoryType::Expense),
            ("Gifts", CategoryType::Expense),
            ("Insurance", CategoryType::Expense),
            ("Transportation", CategoryType::Expense),
            ("Eating Out", CategoryType::Expense),
            ("Savings", CategoryType::Savings),
            ("Income", CategoryType::Income),
        ];

        let tx = self.conn.transaction()?;
        for (description, category_type) in &defaults {
            tx.execute(
                "INSERT OR IGNORE INTO categories (description, type_id) VALUES (?1, ?2)",
                params![description, category_type.type_id()],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    // ── Categories ────────────────────────────────────────────

    /// Lists categories in insertion (id) order.
    pub(crate) fn get_categories(&self) -> Result<Vec<Category>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, description, type_id FROM categories ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok(Category {
                id: Some(row.get(0)?),
                description: row.get(1)?,
                category_type: CategoryType::from_type_id(row.get(2)?),
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub(crate) fn get_category_by_id(&self, id: i64) -> Result<Option<Category>> {
        let result = self.conn.query_row(
            "SELECT id, description, type_id FROM categories WHERE id = ?1",
            params![id],
            |row| {
                Ok(Category {
                    id: Some(row.get(0)?),
                    description: row.get(1)?,
                    category_type: CategoryType::from_type_id(row.get(2)?),
                })
            },
        );
        match result {
            Ok(c) => Ok(Some(c)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub(crate) fn insert_category(&self, cat: &Category) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO categories (description, type_id) VALUES (?1, ?2)",
            params![cat.description, cat.category_type.type_id()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub(crate) fn update_category(
        &self,
        id: i64,
        description: &str,
        category_type: CategoryType,
    ) -> Result<()> {
        self.conn.execute(
            "UPDATE categories SET description = ?1, type_id = ?2 WHERE id = ?3",
            params![description, category_type.type_id(), id],
        )?;
        Ok(())
    }

    /// Deleting a category that still has expenses fails on the foreign
    /// key constraint.
    pub(crate) fn delete_category(&self, id: i64) -> Result<()> {
        self.conn
            .execute("DELETE FROM categories WHERE id = ?1", params![id])?;
        Ok(())
    }

    // ── Expenses ──────────────────────────────────────────────

    /// Rejects an amount whose sign conflicts with the category's
    /// polarity: Income and Credit categories hold positive amounts,
    /// Expense and Savings hold negative ones. Zero always passes.
    fn check_amount_sign(&self, amount: Decimal, category_id: i64) -> Result<()> {
        let category = self
            .get_category_by_id(category_id)?
            .ok_or_else(|| anyhow::anyhow!("No category with id {category_id}"))?;
        if amount > Decimal::ZERO && !category.category_type.is_positive() {
            anyhow::bail!(
                "Positive amount not allowed in {} category '{}'",
                category.category_type,
                category.description
            );
        }
        if amount < Decimal::ZERO && category.category_type.is_positive() {
            anyhow::bail!(
                "Negative amount not allowed in {} category '{}'",
                category.category_type,
                category.description
            );
        }
        Ok(())
    }

    pub(crate) fn insert_expense(&self, exp: &Expense) -> Result<i64> {
        self.check_amount_sign(exp.amount, exp.category_id)?;
        self.conn.execute(
            "INSERT INTO expenses (date, amount, description, category_id)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                exp.date,
                exp.amount.to_string(),
                exp.description,
                exp.category_id,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub(crate) fn update_expense(
        &self,
        id: i64,
        date: &str,
        category_id: i64,
        amount: Decimal,
        description: &str,
    ) -> Result<()> {
        self.check_amount_sign(amount, category_id)?;
        self.conn.execute(
            "UPDATE expenses SET date = ?1, amount = ?2, description = ?3, category_id = ?4
             WHERE id = ?5",
            params![date, amount.to_string(), description, category_id, id],
        )?;
        Ok(())
    }

    pub(crate) fn delete_expense(&self, id: i64) -> Result<()> {
        self.conn
            .execute("DELETE FROM expenses WHERE id = ?1", params![id])?;
        Ok(())
    }

    /// Lists expenses in insertion (id) order.
    pub(crate) fn get_expenses(&self) -> Result<Vec<Expense>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, date, amount, description, category_id FROM expenses ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            let amount_str: String = row.get(2)?;
            Ok(Expense {
                id: Some(row.get(0)?),
                date: row.get(1)?,
                amount: Decimal::from_str(&amount_str).unwrap_or_default(),
                description: row.get(3)?,
                category_id: row.get(4)?,
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub(crate) fn get_expense_by_id(&self, id: i64) -> Result<Option<Expense>> {
        let result = self.conn.query_row(
            "SELECT id, date, amount, description, category_id FROM expenses WHERE id = ?1",
            params![id],
            |row| {
                let amount_str: String = row.get(2)?;
                Ok(Expense {
                    id: Some(row.get(0)?),
                    date: row.get(1)?,
                    amount: Decimal::from_str(&amount_str).unwrap_or_default(),
                    description: row.get(3)?,
                    category_id: row.get(4)?,
                })
            },
        );
        match result {
            Ok(e) => Ok(Some(e)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    // ── Export ────────────────────────────────────────────────

    /// Writes the filtered budget item projection to a CSV file. Returns
    /// the number of data rows written.
    pub(crate) fn export_to_csv(
        &self,
        path: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        filter_category: bool,
        category_id: i64,
    ) -> Result<usize> {
        let items = self.budget_items(start, end, filter_category, category_id)?;

        let mut writer =
            csv::Writer::from_path(path).with_context(|| format!("Failed to create {path}"))?;
        writer.write_record([
            "expense_id",
            "date",
            "category",
            "description",
            "amount",
            "balance",
        ])?;
        for item in &items {
            writer.write_record([
                item.expense_id.to_string(),
                item.date.clone(),
                item.category.clone(),
                item.short_description.clone(),
                item.amount.to_string(),
                item.balance.to_string(),
            ])?;
        }
        writer.flush()?;
        Ok(items.len())
    }
}

#[cfg(test)]
mod tests;
