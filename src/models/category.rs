/// Classification of a category, which decides the sign its amounts must
/// carry: money coming in (Income, Credit) is positive, money going out
/// (Expense, Savings) is negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryType {
    Income,
    Expense,
    Credit,
    Savings,
}

impl CategoryType {
    pub fn all() -> &'static [CategoryType] {
        &[
            CategoryType::Income,
            CategoryType::Expense,
            CategoryType::Credit,
            CategoryType::Savings,
        ]
    }

    /// Row id in the category_types table.
    pub fn type_id(&self) -> i64 {
        match self {
            CategoryType::Income => 1,
            CategoryType::Expense => 2,
            CategoryType::Credit => 3,
            CategoryType::Savings => 4,
        }
    }

    /// Unknown ids map to Expense.
    pub fn from_type_id(id: i64) -> CategoryType {
        match id {
            1 => CategoryType::Income,
            3 => CategoryType::Credit,
            4 => CategoryType::Savings,
            _ => CategoryType::Expense,
        }
    }

    pub fn parse(s: &str) -> Option<CategoryType> {
        match s.to_lowercase().as_str() {
            "income" => Some(CategoryType::Income),
            "expense" => Some(CategoryType::Expense),
            "credit" => Some(CategoryType::Credit),
            "savings" => Some(CategoryType::Savings),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryType::Income => "Income",
            CategoryType::Expense => "Expense",
            CategoryType::Credit => "Credit",
            CategoryType::Savings => "Savings",
        }
    }

    /// True for types whose amounts are money in (positive), false for
    /// types whose amounts are money out (negative).
    pub fn is_positive(&self) -> bool {
        matches!(self, CategoryType::Income | CategoryType::Credit)
    }
}

impl std::fmt::Display for CategoryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub id: Option<i64>,
    pub description: String,
    pub category_type: CategoryType,
}

impl Category {
    pub fn new(description: String, category_type: CategoryType) -> Self {
        Self {
            id: None,
            description,
            category_type,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description)
    }
}
