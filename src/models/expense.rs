use rust_decimal::Decimal;

/// One dated, categorized amount. Dates are stored as `YYYY-MM-DD` text so
/// lexicographic comparison matches chronological order.
#[derive(Debug, Clone, PartialEq)]
pub struct Expense {
    pub id: Option<i64>,
    pub date: String,
    pub amount: Decimal,
    pub description: String,
    pub category_id: i64,
}

impl Expense {
    pub fn new(date: String, category_id: i64, amount: Decimal, description: String) -> Self {
        Self {
            id: None,
            date,
            amount,
            description,
            category_id,
        }
    }
}
