use anyhow::{Context, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::db::Database;
use crate::models::{BudgetItem, Category, CategoryType, CrossTabRecord, Expense};

pub(crate) fn as_cli(args: &[String], db: &Database) -> Result<()> {
    match args[1].as_str() {
        "items" | "i" => cli_items(&args[2..], db),
        "by-category" | "bc" => cli_by_category(&args[2..], db),
        "by-month" | "bm" => cli_by_month(&args[2..], db),
        "crosstab" | "ct" => cli_crosstab(&args[2..], db),
        "categories" => cli_categories(db),
        "add-category" => cli_add_category(&args[2..], db),
        "edit-category" => cli_edit_category(&args[2..], db),
        "delete-category" => cli_delete_category(&args[2..], db),
        "expenses" => cli_expenses(db),
        "add-expense" => cli_add_expense(&args[2..], db),
        "edit-expense" => cli_edit_expense(&args[2..], db),
        "delete-expense" => cli_delete_expense(&args[2..], db),
        "export" => cli_export(&args[2..], db),
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        "--version" | "-V" | "version" => {
            println!("homebudget {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        other => {
            print_usage();
            anyhow::bail!("Unknown command: {other}");
        }
    }
}

pub(crate) fn print_usage() {
    println!("HomeBudget — categorized expense tracking with month/category reports");
    println!();
    println!("Usage: homebudget <command>");
    println!();
    println!("Report commands (all accept --from/--to/--category):");
    println!("  items                         Flat list with running balance");
    println!("  by-category                   Group by category, with subtotals");
    println!("  by-month                      Group by calendar month, with subtotals");
    println!("  crosstab                      Month x category table plus grand totals");
    println!("    --details                   Show the items behind each crosstab cell");
    println!("    --from <YYYY-MM-DD>         Earliest date included");
    println!("    --to <YYYY-MM-DD>           Latest date included");
    println!("    --category <id>             Only this category");
    println!();
    println!("Data commands:");
    println!("  categories                    List categories");
    println!("  add-category <desc> <type>    Create a category (Income/Expense/Credit/Savings)");
    println!("  edit-category <id> <desc> <type>");
    println!("  delete-category <id>          Remove a category (must have no expenses)");
    println!("  expenses                      List expenses as entered");
    println!("  add-expense <date> <cat-id> <amount> <desc>");
    println!("  edit-expense <id> <date> <cat-id> <amount> <desc>");
    println!("  delete-expense <id>           Remove an expense");
    println!("  export [path]                 Write budget items to CSV (accepts report flags)");
    println!();
    println!("  --help, -h                    Show this help");
    println!("  --version, -V                 Show version");
}

// ── Shared flag parsing ──────────────────────────────────────

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a String> {
    args.windows(2).find(|w| w[0] == flag).map(|w| &w[1])
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .with_context(|| format!("Invalid date: {raw} (expected YYYY-MM-DD)"))
}

fn parse_id(raw: &str, what: &str) -> Result<i64> {
    raw.parse()
        .with_context(|| format!("Invalid {what} id: {raw}"))
}

fn parse_filter(args: &[String]) -> Result<(Option<NaiveDate>, Option<NaiveDate>, bool, i64)> {
    let start = flag_value(args, "--from").map(|d| parse_date(d)).transpose()?;
    let end = flag_value(args, "--to").map(|d| parse_date(d)).transpose()?;
    let (filter_category, category_id) = match flag_value(args, "--category") {
        Some(raw) => (
            true,
            raw.parse::<i64>()
                .with_context(|| format!("Invalid category id: {raw}"))?,
        ),
        None => (false, 0),
    };
    Ok((start, end, filter_category, category_id))
}

// ── Report commands ──────────────────────────────────────────

fn print_item(item: &BudgetItem, indent: &str) {
    println!(
        "{indent}{:<12} {:<16} {:<24} {:>10} {:>12}",
        item.date, item.category, item.short_description, item.amount, item.balance
    );
}

fn cli_items(args: &[String], db: &Database) -> Result<()> {
    let (start, end, filter_category, category_id) = parse_filter(args)?;
    let items = db.budget_items(start, end, filter_category, category_id)?;
    if items.is_empty() {
        println!("No budget items in range");
        return Ok(());
    }

    println!(
        "{:<12} {:<16} {:<24} {:>10} {:>12}",
        "Date", "Category", "Description", "Amount", "Balance"
    );
    println!("{}", "─".repeat(78));
    for item in &items {
        print_item(item, "");
    }
    Ok(())
}

fn cli_by_category(args: &[String], db: &Database) -> Result<()> {
    let (start, end, filter_category, category_id) = parse_filter(args)?;
    let groups = db.budget_items_by_category(start, end, filter_category, category_id)?;
    if groups.is_empty() {
        println!("No budget items in range");
        return Ok(());
    }

    for group in &groups {
        println!("{} (total {})", group.category, group.total);
        for item in &group.details {
            print_item(item, "  ");
        }
        println!();
    }
    Ok(())
}

fn cli_by_month(args: &[String], db: &Database) -> Result<()> {
    let (start, end, filter_category, category_id) = parse_filter(args)?;
    let groups = db.budget_items_by_month(start, end, filter_category, category_id)?;
    if groups.is_empty() {
        println!("No budget items in range");
        return Ok(());
    }

    for group in &groups {
        println!("{} (total {})", group.month, group.total);
        for item in &group.details {
            print_item(item, "  ");
        }
        println!();
    }
    Ok(())
}

fn cli_crosstab(args: &[String], db: &Database) -> Result<()> {
    let (start, end, filter_category, category_id) = parse_filter(args)?;
    let records = db.budget_by_category_and_month(start, end, filter_category, category_id)?;

    if args.iter().any(|a| a == "--details") {
        return crosstab_details(&records);
    }

    // Column set comes from the trailing totals record: every category
    // that contributed in any month
    let columns: Vec<String> = match records.last() {
        Some(CrossTabRecord::Totals { categories }) => {
            categories.iter().map(|(c, _)| c.clone()).collect()
        }
        _ => Vec::new(),
    };
    if columns.is_empty() {
        println!("No budget items in range");
        return Ok(());
    }

    print!("{:<8} {:>10}", "Month", "Total");
    for column in &columns {
        print!(" {column:>14}");
    }
    println!();
    println!("{}", "─".repeat(19 + 15 * columns.len()));

    for record in &records {
        match record {
            CrossTabRecord::Month { month, total, .. } => {
                print!("{month:<8} {total:>10}");
            }
            CrossTabRecord::Totals { .. } => {
                print!("{:<8} {:>10}", "TOTALS", "");
            }
        }
        // A category with no items that month prints blank, not zero
        for column in &columns {
            match record.category_total(column) {
                Some(total) => print!(" {total:>14}"),
                None => print!(" {:>14}", ""),
            }
        }
        println!();
    }
    Ok(())
}

fn crosstab_details(records: &[CrossTabRecord]) -> Result<()> {
    for record in records {
        match record {
            CrossTabRecord::Month {
                month,
                total,
                categories,
            } => {
                println!("Month: {month} (total {total})");
                for cell in categories {
                    println!("  {} (total {})", cell.category, cell.total);
                    for item in &cell.details {
                        print_item(item, "    ");
                    }
                }
                println!();
            }
            CrossTabRecord::Totals { categories } => {
                println!("TOTALS");
                for (category, total) in categories {
                    println!("  {category:<24} {total:>10}");
                }
            }
        }
    }
    Ok(())
}

// ── Data commands ────────────────────────────────────────────

fn cli_categories(db: &Database) -> Result<()> {
    let cats = db.get_categories()?;
    println!("{:<4} {:<24} Type", "ID", "Description");
    println!("{}", "─".repeat(40));
    for cat in &cats {
        println!(
            "{:<4} {:<24} {}",
            cat.id.unwrap_or(0),
            cat.description,
            cat.category_type
        );
    }
    Ok(())
}

fn cli_add_category(args: &[String], db: &Database) -> Result<()> {
    if args.len() < 2 {
        anyhow::bail!("Usage: homebudget add-category <description> <type>");
    }
    let category_type = CategoryType::parse(&args[1]).ok_or_else(|| {
        let valid: Vec<&str> = CategoryType::all().iter().map(|t| t.as_str()).collect();
        anyhow::anyhow!(
            "Invalid category type: {} (expected one of {})",
            args[1],
            valid.join(", ")
        )
    })?;

    let id = db.insert_category(&Category::new(args[0].clone(), category_type))?;
    println!("Added category {id}: {} ({category_type})", args[0]);
    Ok(())
}

fn cli_edit_category(args: &[String], db: &Database) -> Result<()> {
    if args.len() < 3 {
        anyhow::bail!("Usage: homebudget edit-category <id> <description> <type>");
    }
    let id = parse_id(&args[0], "category")?;
    if db.get_category_by_id(id)?.is_none() {
        anyhow::bail!("No category with id {id}");
    }
    let category_type = CategoryType::parse(&args[2]).ok_or_else(|| {
        let valid: Vec<&str> = CategoryType::all().iter().map(|t| t.as_str()).collect();
        anyhow::anyhow!(
            "Invalid category type: {} (expected one of {})",
            args[2],
            valid.join(", ")
        )
    })?;

    db.update_category(id, &args[1], category_type)?;
    println!("Updated category {id}");
    Ok(())
}

fn cli_delete_category(args: &[String], db: &Database) -> Result<()> {
    let raw = args
        .first()
        .ok_or_else(|| anyhow::anyhow!("Usage: homebudget delete-category <id>"))?;
    let id = parse_id(raw, "category")?;
    if db.get_category_by_id(id)?.is_none() {
        anyhow::bail!("No category with id {id}");
    }
    db.delete_category(id)
        .context("Failed to delete category (does it still have expenses?)")?;
    println!("Deleted category {id}");
    Ok(())
}

fn cli_expenses(db: &Database) -> Result<()> {
    let expenses = db.get_expenses()?;
    if expenses.is_empty() {
        println!("No expenses");
        return Ok(());
    }

    println!(
        "{:<4} {:<12} {:<8} {:<28} {:>10}",
        "ID", "Date", "Cat", "Description", "Amount"
    );
    println!("{}", "─".repeat(66));
    for exp in &expenses {
        println!(
            "{:<4} {:<12} {:<8} {:<28} {:>10}",
            exp.id.unwrap_or(0),
            exp.date,
            exp.category_id,
            exp.description,
            exp.amount
        );
    }
    Ok(())
}

fn cli_add_expense(args: &[String], db: &Database) -> Result<()> {
    if args.len() < 4 {
        anyhow::bail!("Usage: homebudget add-expense <YYYY-MM-DD> <category-id> <amount> <description>");
    }
    let date = parse_date(&args[0])?;
    let category_id = parse_id(&args[1], "category")?;
    let amount = Decimal::from_str(&args[2])
        .with_context(|| format!("Invalid amount: {}", args[2]))?;
    let description = args[3..].join(" ");

    let id = db.insert_expense(&Expense::new(
        date.format("%Y-%m-%d").to_string(),
        category_id,
        amount,
        description,
    ))?;
    println!("Added expense {id}");
    Ok(())
}

fn cli_edit_expense(args: &[String], db: &Database) -> Result<()> {
    if args.len() < 5 {
        anyhow::bail!(
            "Usage: homebudget edit-expense <id> <YYYY-MM-DD> <category-id> <amount> <description>"
        );
    }
    let id = parse_id(&args[0], "expense")?;
    if db.get_expense_by_id(id)?.is_none() {
        anyhow::bail!("No expense with id {id}");
    }
    let date = parse_date(&args[1])?;
    let category_id = parse_id(&args[2], "category")?;
    let amount = Decimal::from_str(&args[3])
        .with_context(|| format!("Invalid amount: {}", args[3]))?;
    let description = args[4..].join(" ");

    db.update_expense(
        id,
        &date.format("%Y-%m-%d").to_string(),
        category_id,
        amount,
        &description,
    )?;
    println!("Updated expense {id}");
    Ok(())
}

fn cli_delete_expense(args: &[String], db: &Database) -> Result<()> {
    let raw = args
        .first()
        .ok_or_else(|| anyhow::anyhow!("Usage: homebudget delete-expense <id>"))?;
    let id = parse_id(raw, "expense")?;
    if db.get_expense_by_id(id)?.is_none() {
        anyhow::bail!("No expense with id {id}");
    }
    db.delete_expense(id)?;
    println!("Deleted expense {id}");
    Ok(())
}

fn cli_export(args: &[String], db: &Database) -> Result<()> {
    let (start, end, filter_category, category_id) = parse_filter(args)?;
    let output_path = args
        .first()
        .filter(|a| !a.starts_with('-'))
        .map(|a| shellexpand(a))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            format!("{home}/homebudget-export.csv")
        });

    let count = db.export_to_csv(&output_path, start, end, filter_category, category_id)?;
    if count == 0 {
        println!("No budget items in range");
    } else {
        println!("Exported {count} budget items to {output_path}");
    }
    Ok(())
}

fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        format!("{home}/{rest}")
    } else {
        path.to_string()
    }
}
