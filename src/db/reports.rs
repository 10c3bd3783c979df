//! The reporting queries: a flat, balance-annotated projection of the
//! expense/category join, and its three groupings (by category, by month,
//! and the month-by-category cross-tab).
//!
//! All four operations share one filter signature: inclusive `start`/`end`
//! date bounds (unbounded when `None`), and a category filter that is
//! only consulted when `filter_category` is set. They are pure reads over
//! the store - nothing is cached, and repeating a call against an
//! unchanged database returns an equal result.

use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;

use anyhow::Result;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::Database;
use crate::models::{
    BudgetItem, BudgetItemsByCategory, BudgetItemsByMonth, CategoryCell, CrossTabRecord,
};

// Sentinel bounds standing in for "no limit".
const RANGE_START: &str = "1900-01-01";
const RANGE_END: &str = "2500-01-01";

fn bound(date: Option<NaiveDate>, fallback: &str) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| fallback.to_string())
}

impl Database {
    /// Date-ordered projection of expenses joined with their categories.
    ///
    /// Each item carries a copy of its category's description and a
    /// `balance`: the running sum of `amount` over the whole result set,
    /// so `balance` of the first item equals its own amount. Rows sharing
    /// a date keep the store's insertion order; no secondary sort key is
    /// applied.
    pub(crate) fn budget_items(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        filter_category: bool,
        category_id: i64,
    ) -> Result<Vec<BudgetItem>> {
        let start = bound(start, RANGE_START);
        let end = bound(end, RANGE_END);

        let mut sql = String::from(
            "SELECT e.id, e.date, e.amount, e.description, c.id, c.description
             FROM expenses e
             JOIN categories c ON c.id = e.category_id
             WHERE e.date BETWEEN ?1 AND ?2",
        );
        let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> =
            vec![Box::new(start), Box::new(end)];
        if filter_category {
            sql.push_str(&format!(" AND e.category_id = ?{}", param_values.len() + 1));
            param_values.push(Box::new(category_id));
        }
        sql.push_str(" ORDER BY e.date");

        let params_ref: Vec<&dyn rusqlite::types::ToSql> =
            param_values.iter().map(|p| p.as_ref()).collect();

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_ref.as_slice(), |row| {
            let amount_str: String = row.get(2)?;
            Ok(BudgetItem {
                expense_id: row.get(0)?,
                date: row.get(1)?,
                amount: Decimal::from_str(&amount_str).unwrap_or_default(),
                short_description: row.get(3)?,
                category_id: row.get(4)?,
                category: row.get(5)?,
                balance: Decimal::ZERO,
            })
        })?;
        let mut items = rows.collect::<std::result::Result<Vec<_>, _>>()?;

        let mut balance = Decimal::ZERO;
        for item in &mut items {
            balance += item.amount;
            item.balance = balance;
        }
        Ok(items)
    }

    /// Groups the projection by category description, groups ordered by
    /// description ascending.
    ///
    /// The grouping key is the description, not the category id - two
    /// categories sharing a description would collapse into one group.
    /// Items inside a group keep the chronological order and the global
    /// balances of [`Database::budget_items`]; each group's `total` comes
    /// from its own SUM aggregate under the same join and filters, not
    /// from adding up the projected items.
    pub(crate) fn budget_items_by_category(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        filter_category: bool,
        category_id: i64,
    ) -> Result<Vec<BudgetItemsByCategory>> {
        let items = self.budget_items(start, end, filter_category, category_id)?;

        let mut grouped: BTreeMap<String, Vec<BudgetItem>> = BTreeMap::new();
        for item in items {
            grouped.entry(item.category.clone()).or_default().push(item);
        }

        let totals = self.category_totals(start, end, filter_category, category_id)?;

        Ok(grouped
            .into_iter()
            .map(|(category, details)| {
                let total = totals.get(&category).copied().unwrap_or_default();
                BudgetItemsByCategory {
                    category,
                    details,
                    total,
                }
            })
            .collect())
    }

    fn category_totals(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        filter_category: bool,
        category_id: i64,
    ) -> Result<HashMap<String, Decimal>> {
        let start = bound(start, RANGE_START);
        let end = bound(end, RANGE_END);

        let mut sql = String::from(
            "SELECT c.description, CAST(SUM(e.amount) AS TEXT)
             FROM expenses e
             JOIN categories c ON c.id = e.category_id
             WHERE e.date BETWEEN ?1 AND ?2",
        );
        let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> =
            vec![Box::new(start), Box::new(end)];
        if filter_category {
            sql.push_str(&format!(" AND e.category_id = ?{}", param_values.len() + 1));
            param_values.push(Box::new(category_id));
        }
        sql.push_str(" GROUP BY c.description");

        let params_ref: Vec<&dyn rusqlite::types::ToSql> =
            param_values.iter().map(|p| p.as_ref()).collect();

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_ref.as_slice(), |row| {
            let description: String = row.get(0)?;
            let total_str: String = row.get(1)?;
            Ok((description, Decimal::from_str(&total_str).unwrap_or_default()))
        })?;
        Ok(rows
            .collect::<std::result::Result<Vec<_>, _>>()?
            .into_iter()
            .collect())
    }

    /// Groups the projection by calendar month, emitted in the order each
    /// month first appears - chronological, since the projection is date
    /// sorted. The group key is rendered as `yyyy/MM`.
    ///
    /// Each month's `total` comes from an independent aggregate over that
    /// month intersected with the requested bounds, so a range starting
    /// or ending mid-month yields a partial-month total, consistent with
    /// the rows actually included.
    pub(crate) fn budget_items_by_month(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        filter_category: bool,
        category_id: i64,
    ) -> Result<Vec<BudgetItemsByMonth>> {
        let items = self.budget_items(start, end, filter_category, category_id)?;

        // Months are contiguous runs of the date-sorted projection.
        let mut groups: Vec<(String, Vec<BudgetItem>)> = Vec::new();
        for item in items {
            let key = item.date[..7].to_string();
            match groups.last_mut() {
                Some((last, details)) if *last == key => details.push(item),
                _ => groups.push((key, vec![item])),
            }
        }

        let mut summary = Vec::with_capacity(groups.len());
        for (key, details) in groups {
            let total = self.month_total(&key, start, end, filter_category, category_id)?;
            summary.push(BudgetItemsByMonth {
                month: format!("{}/{}", &key[..4], &key[5..7]),
                details,
                total,
            });
        }
        Ok(summary)
    }

    fn month_total(
        &self,
        month: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        filter_category: bool,
        category_id: i64,
    ) -> Result<Decimal> {
        // Dates are zero-padded text, so "-31" covers the last day of any
        // month. A month with no matching rows sums to NULL, read as zero.
        let mut sql = String::from(
            "SELECT CAST(COALESCE(SUM(amount), 0) AS TEXT) FROM expenses
             WHERE date BETWEEN ?1 AND ?2",
        );
        let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = vec![
            Box::new(format!("{month}-01")),
            Box::new(format!("{month}-31")),
        ];
        if let Some(s) = start {
            sql.push_str(&format!(" AND date >= ?{}", param_values.len() + 1));
            param_values.push(Box::new(s.format("%Y-%m-%d").to_string()));
        }
        if let Some(e) = end {
            sql.push_str(&format!(" AND date <= ?{}", param_values.len() + 1));
            param_values.push(Box::new(e.format("%Y-%m-%d").to_string()));
        }
        if filter_category {
            sql.push_str(&format!(" AND category_id = ?{}", param_values.len() + 1));
            param_values.push(Box::new(category_id));
        }

        let params_ref: Vec<&dyn rusqlite::types::ToSql> =
            param_values.iter().map(|p| p.as_ref()).collect();

        let total: String = self
            .conn
            .query_row(&sql, params_ref.as_slice(), |row| row.get(0))?;
        Ok(Decimal::from_str(&total).unwrap_or_default())
    }

    /// Cross-tab of the month groups: one `Month` record per month whose
    /// details are re-grouped by category description (ascending),
    /// followed by one `Totals` record carrying each category's grand
    /// total across all returned months.
    ///
    /// Cell totals sum the cell's own items - the sub-group already is
    /// the exact filtered set. The `Totals` record lists categories in
    /// category-store order, skipping any that never contributed.
    pub(crate) fn budget_by_category_and_month(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        filter_category: bool,
        category_id: i64,
    ) -> Result<Vec<CrossTabRecord>> {
        let months = self.budget_items_by_month(start, end, filter_category, category_id)?;

        let mut summary = Vec::with_capacity(months.len() + 1);
        let mut totals_per_category: HashMap<String, Decimal> = HashMap::new();

        for month_group in months {
            let mut by_category: BTreeMap<String, Vec<BudgetItem>> = BTreeMap::new();
            for item in month_group.details {
                by_category
                    .entry(item.category.clone())
                    .or_default()
                    .push(item);
            }

            let mut cells = Vec::with_capacity(by_category.len());
            for (category, details) in by_category {
                let total: Decimal = details.iter().map(|i| i.amount).sum();
                *totals_per_category.entry(category.clone()).or_default() += total;
                cells.push(CategoryCell {
                    category,
                    total,
                    details,
                });
            }

            summary.push(CrossTabRecord::Month {
                month: month_group.month,
                total: month_group.total,
                categories: cells,
            });
        }

        let categories = self
            .get_categories()?
            .into_iter()
            .filter_map(|c| {
                totals_per_category
                    .get(&c.description)
                    .map(|total| (c.description, *total))
            })
            .collect();
        summary.push(CrossTabRecord::Totals { categories });

        Ok(summary)
    }
}
