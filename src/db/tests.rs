#![allow(clippy::unwrap_used)]

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::*;
use crate::models::{Category, CategoryType, Expense};

// ── Seeding ───────────────────────────────────────────────────

#[test]
fn test_default_categories_seeded() {
    let db = Database::open_in_memory().unwrap();
    let cats = db.get_categories().unwrap();
    assert_eq!(cats.len(), 16);
    assert_eq!(cats[0].description, "Utilities");
    assert_eq!(cats[15].description, "Income");
    assert_eq!(cats[15].category_type, CategoryType::Income);
    // Listing is insertion order, so ids line up with position
    assert_eq!(cats[8].id, Some(9));
    assert_eq!(cats[8].description, "Credit Card");
    assert_eq!(cats[8].category_type, CategoryType::Credit);
    assert_eq!(cats[9].description, "Clothes");
    assert_eq!(cats[14].category_type, CategoryType::Savings);
}

#[test]
fn test_category_types_seeded() {
    let db = Database::open_in_memory().unwrap();
    let count: i64 = db
        .conn
        .query_row("SELECT COUNT(*) FROM category_types", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 4);
    let desc: String = db
        .conn
        .query_row(
            "SELECT description FROM category_types WHERE id = 3",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(desc, "Credit");
}

#[test]
fn test_reopen_keeps_existing_data() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("budget.db");
    {
        let db = Database::open(&path).unwrap();
        db.insert_category(&Category::new("Bananas".into(), CategoryType::Expense))
            .unwrap();
        db.insert_expense(&Expense::new("2024-01-15".into(), 1, dec!(-30.00), "hydro".into()))
            .unwrap();
    }

    let db = Database::open(&path).unwrap();
    let cats = db.get_categories().unwrap();
    // Defaults are not reseeded on top of existing data
    assert_eq!(cats.len(), 17);
    assert!(cats.iter().any(|c| c.description == "Bananas"));
    assert_eq!(db.get_expenses().unwrap().len(), 1);
}

// ── Category CRUD ─────────────────────────────────────────────

#[test]
fn test_category_crud() {
    let db = Database::open_in_memory().unwrap();
    let id = db
        .insert_category(&Category::new("Bananas".into(), CategoryType::Expense))
        .unwrap();

    let fetched = db.get_category_by_id(id).unwrap().unwrap();
    assert_eq!(fetched.description, "Bananas");
    assert_eq!(fetched.category_type, CategoryType::Expense);

    db.update_category(id, "Fruit", CategoryType::Expense).unwrap();
    assert_eq!(
        db.get_category_by_id(id).unwrap().unwrap().description,
        "Fruit"
    );

    db.delete_category(id).unwrap();
    assert!(db.get_category_by_id(id).unwrap().is_none());
}

#[test]
fn test_category_by_id_not_found() {
    let db = Database::open_in_memory().unwrap();
    assert!(db.get_category_by_id(99999).unwrap().is_none());
}

#[test]
fn test_duplicate_category_description_rejected() {
    let db = Database::open_in_memory().unwrap();
    // "Food" is one of the defaults
    let result = db.insert_category(&Category::new("Food".into(), CategoryType::Expense));
    assert!(result.is_err());
}

#[test]
fn test_delete_category_with_expenses_fails() {
    let db = Database::open_in_memory().unwrap();
    db.insert_expense(&Expense::new("2024-01-15".into(), 1, dec!(-30.00), "hydro".into()))
        .unwrap();
    assert!(db.delete_category(1).is_err());
}

// ── Expense CRUD ──────────────────────────────────────────────

#[test]
fn test_expense_crud() {
    let db = Database::open_in_memory().unwrap();
    // Category 3 = Food (Expense)
    let id = db
        .insert_expense(&Expense::new(
            "2024-01-15".into(),
            3,
            dec!(-12.50),
            "groceries".into(),
        ))
        .unwrap();

    let fetched = db.get_expense_by_id(id).unwrap().unwrap();
    assert_eq!(fetched.date, "2024-01-15");
    assert_eq!(fetched.amount, dec!(-12.50));
    assert_eq!(fetched.category_id, 3);
    assert_eq!(fetched.description, "groceries");

    db.update_expense(id, "2024-01-16", 3, dec!(-14.00), "more groceries")
        .unwrap();
    let updated = db.get_expense_by_id(id).unwrap().unwrap();
    assert_eq!(updated.date, "2024-01-16");
    assert_eq!(updated.amount, dec!(-14.00));
    assert_eq!(updated.description, "more groceries");

    db.delete_expense(id).unwrap();
    assert!(db.get_expense_by_id(id).unwrap().is_none());
}

#[test]
fn test_expense_by_id_not_found() {
    let db = Database::open_in_memory().unwrap();
    assert!(db.get_expense_by_id(99999).unwrap().is_none());
}

#[test]
fn test_expenses_listed_in_insertion_order() {
    let db = Database::open_in_memory().unwrap();
    db.insert_expense(&Expense::new("2024-03-01".into(), 3, dec!(-3), "c".into()))
        .unwrap();
    db.insert_expense(&Expense::new("2024-01-01".into(), 3, dec!(-1), "a".into()))
        .unwrap();
    db.insert_expense(&Expense::new("2024-02-01".into(), 3, dec!(-2), "b".into()))
        .unwrap();

    let descs: Vec<String> = db
        .get_expenses()
        .unwrap()
        .into_iter()
        .map(|e| e.description)
        .collect();
    assert_eq!(descs, vec!["c", "a", "b"]);
}

#[test]
fn test_expense_sign_must_match_category() {
    let db = Database::open_in_memory().unwrap();
    // Income (16) holds positive amounts only
    assert!(db
        .insert_expense(&Expense::new("2024-01-01".into(), 16, dec!(1000), "pay".into()))
        .is_ok());
    assert!(db
        .insert_expense(&Expense::new("2024-01-01".into(), 16, dec!(-5), "oops".into()))
        .is_err());
    // Food (3, Expense) holds negative amounts only
    assert!(db
        .insert_expense(&Expense::new("2024-01-01".into(), 3, dec!(20), "refund".into()))
        .is_err());
    // Zero passes anywhere
    assert!(db
        .insert_expense(&Expense::new("2024-01-01".into(), 3, Decimal::ZERO, "free".into()))
        .is_ok());
}

#[test]
fn test_expense_unknown_category_rejected() {
    let db = Database::open_in_memory().unwrap();
    let result = db.insert_expense(&Expense::new("2024-01-01".into(), 999, dec!(-5), "x".into()));
    assert!(result.is_err());
}

#[test]
fn test_update_expense_checks_sign_against_new_category() {
    let db = Database::open_in_memory().unwrap();
    let id = db
        .insert_expense(&Expense::new("2024-01-15".into(), 3, dec!(-20), "dinner".into()))
        .unwrap();
    // Moving a negative amount into Income must be rejected
    assert!(db.update_expense(id, "2024-01-15", 16, dec!(-20), "dinner").is_err());
    // Unchanged row is still intact
    assert_eq!(db.get_expense_by_id(id).unwrap().unwrap().category_id, 3);
}

// ── Export ────────────────────────────────────────────────────

#[test]
fn test_export_to_csv() {
    let db = Database::open_in_memory().unwrap();
    db.insert_expense(&Expense::new(
        "2024-01-15".into(),
        3,
        dec!(-12.50),
        "groceries".into(),
    ))
    .unwrap();
    db.insert_expense(&Expense::new("2024-01-20".into(), 16, dec!(1000), "pay".into()))
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.csv");
    let count = db
        .export_to_csv(path.to_str().unwrap(), None, None, false, 0)
        .unwrap();
    assert_eq!(count, 2);

    let contents = std::fs::read_to_string(&path).unwrap();
    let mut lines = contents.lines();
    assert_eq!(
        lines.next().unwrap(),
        "expense_id,date,category,description,amount,balance"
    );
    assert!(contents.contains("groceries"));
    assert!(contents.contains("Income"));
    // Final balance column reflects the running sum
    assert!(contents.contains("987.50"));
}

#[test]
fn test_export_respects_filters() {
    let db = Database::open_in_memory().unwrap();
    db.insert_expense(&Expense::new("2024-01-15".into(), 3, dec!(-12.50), "a".into()))
        .unwrap();
    db.insert_expense(&Expense::new("2024-02-15".into(), 3, dec!(-1), "b".into()))
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.csv");
    let count = db
        .export_to_csv(
            path.to_str().unwrap(),
            Some(chrono::NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()),
            None,
            false,
            0,
        )
        .unwrap();
    assert_eq!(count, 1);
}
