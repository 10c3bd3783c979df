use rust_decimal::Decimal;

/// One expense joined with its category, flattened into a self-contained
/// snapshot. Built fresh on every query; the copied category description
/// and amounts are not updated if the source rows change afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetItem {
    pub category_id: i64,
    pub expense_id: i64,
    pub date: String,
    /// Copy of the category's description at query time.
    pub category: String,
    /// The expense's description.
    pub short_description: String,
    pub amount: Decimal,
    /// Running sum of `amount` over the whole chronologically ordered
    /// result set this item came from, not just its group.
    pub balance: Decimal,
}

/// Budget items sharing one category description.
///
/// Grouping is by description, not category id.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetItemsByCategory {
    pub category: String,
    pub details: Vec<BudgetItem>,
    pub total: Decimal,
}

/// Budget items sharing one calendar month.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetItemsByMonth {
    /// Formatted as `yyyy/MM`.
    pub month: String,
    pub details: Vec<BudgetItem>,
    pub total: Decimal,
}

/// One category's slice of a cross-tab month: its subtotal and the items
/// behind it.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryCell {
    pub category: String,
    pub total: Decimal,
    pub details: Vec<BudgetItem>,
}

/// A row of the month-by-category cross-tab. Regular months carry their
/// own total and per-category cells (sorted by description); the final
/// `Totals` row carries grand totals per category, in category-store
/// order. A category with no items in range gets no entry anywhere - a
/// missing cell means "never contributed", not zero.
#[derive(Debug, Clone, PartialEq)]
pub enum CrossTabRecord {
    Month {
        month: String,
        total: Decimal,
        categories: Vec<CategoryCell>,
    },
    Totals {
        categories: Vec<(String, Decimal)>,
    },
}

impl CrossTabRecord {
    /// Looks up a category's total in either row variant.
    pub fn category_total(&self, description: &str) -> Option<Decimal> {
        match self {
            CrossTabRecord::Month { categories, .. } => categories
                .iter()
                .find(|cell| cell.category == description)
                .map(|cell| cell.total),
            CrossTabRecord::Totals { categories } => categories
                .iter()
                .find(|(category, _)| category == description)
                .map(|(_, total)| *total),
        }
    }
}
