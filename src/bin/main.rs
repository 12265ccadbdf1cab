// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

use chrono::NaiveDate;
use clap::Parser;
use cost_ledger_rs::{
    AccountId, CategoryId, CategoryKind, LedgerCoordinator, LedgerError, LogNotifier, Logged,
    UserId, summary,
};
use csv::{ReaderBuilder, Trim, Writer};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

/// Cost Ledger - Bulk-load seed CSV files
///
/// Reads users, accounts, categories, and dated operations from a CSV file,
/// loads them through the transactional coordinator, and writes per-account
/// balances and totals to stdout. This is the explicit seeding/backfill
/// mode; operations are immutable once loaded.
#[derive(Parser, Debug)]
#[command(name = "cost-ledger-rs")]
#[command(about = "Bulk-loads ledger seed CSVs and reports account balances", long_about = None)]
struct Args {
    /// Path to CSV file with seed rows
    ///
    /// Expected format: type,user,name,kind,account,category,amount,date,email,balance
    /// Example: cargo run -- seed.csv > accounts.csv
    #[arg(value_name = "FILE")]
    input: PathBuf,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let file = match File::open(&args.input) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Error opening file '{}': {}", args.input.display(), e);
            process::exit(1);
        }
    };

    let ledger = match load_seed(BufReader::new(file)) {
        Ok(ledger) => ledger,
        Err(e) => {
            eprintln!("Error loading seed file: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = write_report(ledger.inner(), std::io::stdout()) {
        eprintln!("Error writing output: {}", e);
        process::exit(1);
    }
}

/// Raw CSV record matching the seed format.
///
/// Fields: `type, user, name, kind, account, category, amount, date, email, balance`.
/// The `user`/`account`/`category` columns carry file-local reference ids;
/// the loader maps them to store-allocated ids.
#[derive(Debug, Deserialize)]
struct SeedRecord {
    #[serde(rename = "type")]
    row_type: String,
    #[serde(deserialize_with = "csv::invalid_option", default)]
    user: Option<u64>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    kind: Option<String>,
    #[serde(deserialize_with = "csv::invalid_option", default)]
    account: Option<u64>,
    #[serde(deserialize_with = "csv::invalid_option", default)]
    category: Option<u64>,
    #[serde(deserialize_with = "csv::invalid_option", default)]
    amount: Option<Decimal>,
    #[serde(deserialize_with = "csv::invalid_option", default)]
    date: Option<NaiveDate>,
    #[serde(default)]
    email: Option<String>,
    #[serde(deserialize_with = "csv::invalid_option", default)]
    balance: Option<Decimal>,
}

/// A structurally complete seed row. Business validation (balance present
/// and non-negative, category kind parsable, amount positive) happens when
/// the row is applied, so rejections carry the proper ledger error.
#[derive(Debug)]
enum SeedRow {
    User {
        local: u64,
        name: String,
        email: String,
    },
    Account {
        user: u64,
        local: u64,
        name: String,
        balance: Option<Decimal>,
    },
    Category {
        user: u64,
        local: u64,
        name: String,
        kind: Option<String>,
    },
    Operation {
        account: u64,
        category: u64,
        amount: Option<Decimal>,
        date: Option<NaiveDate>,
    },
}

impl SeedRecord {
    /// Converts a CSV record into a seed row.
    ///
    /// Returns `None` for unknown row types or missing reference columns.
    fn into_row(self) -> Option<SeedRow> {
        match self.row_type.to_lowercase().as_str() {
            "user" => Some(SeedRow::User {
                local: self.user?,
                name: self.name?,
                email: self.email.unwrap_or_default(),
            }),
            "account" => Some(SeedRow::Account {
                user: self.user?,
                local: self.account?,
                name: self.name?,
                balance: self.balance,
            }),
            "category" => Some(SeedRow::Category {
                user: self.user?,
                local: self.category?,
                name: self.name?,
                kind: self.kind,
            }),
            "operation" => Some(SeedRow::Operation {
                account: self.account?,
                category: self.category?,
                amount: self.amount,
                date: self.date,
            }),
            _ => None,
        }
    }
}

/// Maps file-local reference ids to store-allocated ids while loading.
struct SeedLoader {
    ledger: Logged,
    users: HashMap<u64, UserId>,
    accounts: HashMap<u64, AccountId>,
    categories: HashMap<u64, CategoryId>,
}

impl SeedLoader {
    fn new(ledger: Logged) -> Self {
        Self {
            ledger,
            users: HashMap::new(),
            accounts: HashMap::new(),
            categories: HashMap::new(),
        }
    }

    fn apply(&mut self, row: SeedRow) -> Result<(), LedgerError> {
        match row {
            SeedRow::User { local, name, email } => {
                let user = self.ledger.inner().roster().register(&name, &email);
                self.users.insert(local, user.id);
                Ok(())
            }
            SeedRow::Account {
                user,
                local,
                name,
                balance,
            } => {
                // An absent balance is an error, never coerced to zero.
                let balance = balance.ok_or(LedgerError::InvalidBalance)?;
                let user_id = *self.users.get(&user).ok_or(LedgerError::UserNotFound)?;
                let account = self
                    .ledger
                    .inner()
                    .directory()
                    .open_account(user_id, &name, balance)?;
                self.accounts.insert(local, account.id());
                Ok(())
            }
            SeedRow::Category {
                user,
                local,
                name,
                kind,
            } => {
                let kind: CategoryKind =
                    kind.ok_or(LedgerError::MissingCategoryType)?.parse()?;
                let user_id = *self.users.get(&user).ok_or(LedgerError::UserNotFound)?;
                let category = self
                    .ledger
                    .inner()
                    .registry()
                    .define(user_id, &name, kind)?;
                self.categories.insert(local, category.id);
                Ok(())
            }
            SeedRow::Operation {
                account,
                category,
                amount,
                date,
            } => {
                let amount = amount.ok_or(LedgerError::InvalidAmount)?;
                let account_id = *self
                    .accounts
                    .get(&account)
                    .ok_or(LedgerError::AccountNotFound)?;
                let category_id = *self
                    .categories
                    .get(&category)
                    .ok_or(LedgerError::CategoryNotFound)?;
                match date {
                    Some(date) => {
                        self.ledger
                            .backfill_operation(account_id, category_id, amount, date)?
                    }
                    None => self.ledger.record_operation(account_id, category_id, amount)?,
                };
                Ok(())
            }
        }
    }
}

/// Loads seed rows from a CSV reader into a fresh in-memory ledger.
///
/// Streaming parse; malformed rows and rejected rows are skipped with a
/// diagnostic so one bad line never aborts a bulk load.
///
/// # CSV Format
///
/// Expected columns: `type, user, name, kind, account, category, amount, date, email, balance`
///
/// ```csv
/// type,user,name,kind,account,category,amount,date,email,balance
/// user,1,Alice,,,,,,alice@example.com,
/// account,1,Wallet,,1,,,,,1000.00
/// category,1,Groceries,EXPENSE,,1,,,,
/// operation,,,,1,1,99.90,2024-05-14,,
/// ```
///
/// # Errors
///
/// Returns a CSV error if the reader fails or the CSV structure is invalid.
pub fn load_seed<R: Read>(reader: R) -> Result<Logged, csv::Error> {
    let ledger = Logged::new(Arc::new(LedgerCoordinator::in_memory(Arc::new(
        LogNotifier,
    ))));
    let mut loader = SeedLoader::new(ledger);

    let mut rdr = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true) // Allow short rows; unused columns stay empty
        .has_headers(true)
        .from_reader(reader);

    for result in rdr.deserialize::<SeedRecord>() {
        match result {
            Ok(record) => {
                let Some(row) = record.into_row() else {
                    tracing::debug!("skipping incomplete seed row");
                    continue;
                };
                if let Err(error) = loader.apply(row) {
                    tracing::debug!(%error, "skipping rejected seed row");
                }
            }
            Err(error) => {
                tracing::debug!(%error, "skipping malformed seed row");
                continue;
            }
        }
    }

    Ok(loader.ledger)
}

/// One output row per account.
#[derive(Debug, Serialize)]
struct AccountReport {
    account: AccountId,
    user: UserId,
    name: String,
    balance: Decimal,
    operations: usize,
    total_expense: Decimal,
    total_income: Decimal,
}

/// Write per-account balances and totals to a CSV writer.
///
/// Columns: `account, user, name, balance, operations, total_expense, total_income`,
/// in arbitrary account order.
///
/// # Errors
///
/// Returns a CSV error if writing fails.
pub fn write_report<W: Write>(ledger: &LedgerCoordinator, writer: W) -> Result<(), csv::Error> {
    let mut wtr = Writer::from_writer(writer);

    for account in ledger.directory().accounts() {
        let operations = ledger.journal().find_by_account(account.id());
        let views = match ledger.resolve(&operations) {
            Ok(views) => views,
            Err(error) => {
                tracing::warn!(account = %account.id(), %error, "unresolvable operations");
                Vec::new()
            }
        };
        let totals = summary::summarize(&views);
        wtr.serialize(AccountReport {
            account: account.id(),
            user: account.user_id(),
            name: account.name().to_owned(),
            balance: account.balance().round_dp(2),
            operations: totals.count,
            total_expense: totals.total_expense.round_dp(2),
            total_income: totals.total_income.round_dp(2),
        })?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Cursor;

    const HEADER: &str = "type,user,name,kind,account,category,amount,date,email,balance\n";

    fn load(body: &str) -> Logged {
        let csv = format!("{HEADER}{body}");
        load_seed(Cursor::new(csv)).unwrap()
    }

    fn only_account_balance(ledger: &Logged) -> Decimal {
        let accounts = ledger.inner().directory().accounts();
        assert_eq!(accounts.len(), 1);
        accounts[0].balance()
    }

    #[test]
    fn loads_user_account_category_operation() {
        let ledger = load(
            "user,1,Alice,,,,,,alice@example.com,\n\
             account,1,Wallet,,1,,,,,1000.00\n\
             category,1,Groceries,EXPENSE,,1,,,,\n\
             operation,,,,1,1,99.90,2024-05-14,,\n",
        );

        assert_eq!(only_account_balance(&ledger), dec!(900.10));
        assert_eq!(ledger.inner().journal().len(), 1);
    }

    #[test]
    fn income_operation_increases_balance() {
        let ledger = load(
            "user,1,Alice,,,,,,,\n\
             account,1,Wallet,,1,,,,,100.00\n\
             category,1,Salary,INCOME,,1,,,,\n\
             operation,,,,1,1,250.00,2024-05-01,,\n",
        );

        assert_eq!(only_account_balance(&ledger), dec!(350.00));
    }

    #[test]
    fn operation_without_date_is_recorded_today() {
        let ledger = load(
            "user,1,Alice,,,,,,,\n\
             account,1,Wallet,,1,,,,,100.00\n\
             category,1,Salary,INCOME,,1,,,,\n\
             operation,,,,1,1,50.00,,,\n",
        );

        let today = chrono::Local::now().date_naive();
        assert_eq!(ledger.inner().journal().find_by_date(today).len(), 1);
    }

    #[test]
    fn account_without_balance_is_rejected() {
        let ledger = load(
            "user,1,Alice,,,,,,,\n\
             account,1,Wallet,,1,,,,,\n",
        );

        assert!(ledger.inner().directory().accounts().is_empty());
    }

    #[test]
    fn category_without_kind_is_rejected() {
        let ledger = load(
            "user,1,Alice,,,,,,,\n\
             category,1,Mystery,,,1,,,,\n",
        );

        let user = &ledger.inner().roster().all()[0];
        assert!(
            ledger
                .inner()
                .registry()
                .list_categories(user.id)
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn overspending_operation_is_skipped_without_effect() {
        let ledger = load(
            "user,1,Alice,,,,,,,\n\
             account,1,Wallet,,1,,,,,1000.00\n\
             category,1,Rent,EXPENSE,,1,,,,\n\
             operation,,,,1,1,1500.00,2024-05-14,,\n",
        );

        assert_eq!(only_account_balance(&ledger), dec!(1000.00));
        assert!(ledger.inner().journal().is_empty());
    }

    #[test]
    fn skips_malformed_rows() {
        let ledger = load(
            "user,1,Alice,,,,,,,\n\
             bogus,row,data,,,,,,,\n\
             account,1,Wallet,,1,,,,,10.00\n",
        );

        assert_eq!(ledger.inner().directory().accounts().len(), 1);
    }

    #[test]
    fn report_contains_header_and_totals() {
        let ledger = load(
            "user,1,Alice,,,,,,,\n\
             account,1,Wallet,,1,,,,,1000.00\n\
             category,1,Groceries,EXPENSE,,1,,,,\n\
             category,1,Salary,INCOME,,2,,,,\n\
             operation,,,,1,1,100.00,2024-05-14,,\n\
             operation,,,,1,2,300.00,2024-05-15,,\n",
        );

        let mut output = Vec::new();
        write_report(ledger.inner(), &mut output).unwrap();
        let output = String::from_utf8(output).unwrap();

        assert!(output
            .contains("account,user,name,balance,operations,total_expense,total_income"));
        assert!(output.contains("Wallet"));
        assert!(output.contains("1200.00")); // 1000 - 100 + 300
        assert!(output.contains("100.00"));
        assert!(output.contains("300.00"));
    }
}
