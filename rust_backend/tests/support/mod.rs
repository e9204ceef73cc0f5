//! Shared helpers for integration tests.
#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashSet;
use std::sync::Mutex;

use trsm_data::db::LocalRepository;
use trsm_data::models::{Table, TableName, Value};

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily modified.
///
/// Restores variables on unwind and serializes access to the process
/// environment, since tests run in parallel.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

/// Every database-related variable, cleared.
pub const CLEAR_DB_ENV: &[(&str, Option<&str>)] = &[
    ("DB_SERVER", None),
    ("DB_NAME", None),
    ("DB_USER", None),
    ("DB_PASS", None),
    ("DB_PORT", None),
    ("DB_ENCRYPT", None),
    ("DB_TRUST_CERT", None),
    ("DB_AUTH_METHOD", None),
    ("DB_ALLOW_DEFAULTS", None),
    ("AZURE_ACCESS_TOKEN", None),
    ("REPOSITORY_TYPE", None),
];

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
    date(y, m, d).and_hms_opt(h, 0, 0).unwrap()
}

fn table(columns: &[&str], rows: Vec<Vec<Value>>) -> Table {
    let mut table = Table::new(columns.iter().copied());
    for row in rows {
        table.push_row(row).unwrap();
    }
    table
}

/// Three packed orders in January 2023 plus one in March.
pub fn orders() -> Table {
    let row = |id: i64, created: NaiveDateTime| -> Vec<Value> {
        vec![
            id.into(),
            100.into(),
            7.into(),
            created.into(),
            created.date().into(),
            date(2023, 2, 15).into(),
            Value::Null,
            2.into(),
        ]
    };
    table(
        &[
            "OrderId",
            "CustomerId",
            "SalesRepId",
            "CreatedAt_order",
            "DateOrdered",
            "DateExpected",
            "ShipDate",
            "ShippingMethodRequested",
        ],
        vec![
            row(1, at(2023, 1, 3, 9)),
            row(2, at(2023, 1, 12, 14)),
            row(3, at(2023, 1, 30, 16)),
            row(4, at(2023, 3, 2, 10)),
        ],
    )
}

/// Order lines created in January 2023, with a `CreatedAt` column for range filtering.
pub fn order_lines() -> Table {
    let row = |id: i64, order: i64, created: NaiveDateTime| -> Vec<Value> {
        vec![
            id.into(),
            order.into(),
            500.into(),
            3.into(),
            4.into(),
            Value::Decimal("12.50".into()),
            Value::Decimal("8.00".into()),
            Value::Null,
            created.into(),
        ]
    };
    table(
        &[
            "OrderLineId",
            "OrderId",
            "ProductId",
            "ShipperId",
            "QuantityShipped",
            "SalePrice",
            "UnitCost",
            "DateShipped",
            "CreatedAt",
        ],
        vec![
            row(10, 1, at(2023, 1, 3, 9)),
            row(11, 2, at(2023, 1, 12, 14)),
            row(12, 4, at(2023, 3, 2, 10)),
        ],
    )
}

/// Packs for the March order line only.
pub fn packs() -> Table {
    table(
        &["PickedForOrderLine", "WeightLb", "ItemCount", "DeliveryDate"],
        vec![vec![
            12.into(),
            Value::Decimal("22.4".into()),
            4.into(),
            at(2023, 3, 6, 11).into(),
        ]],
    )
}

pub fn lookups() -> Vec<(TableName, Table)> {
    vec![
        (
            TableName::Customers,
            table(
                &["CustomerId", "CustomerName", "RegionId", "IsRetail"],
                vec![
                    vec![100.into(), "Harbor Foods".into(), 1.into(), true.into()],
                    vec![101.into(), "Elm Deli".into(), 2.into(), false.into()],
                ],
            ),
        ),
        (
            TableName::Products,
            table(
                &[
                    "ProductId",
                    "SKU",
                    "ProductName",
                    "UnitOfBillingId",
                    "SupplierId",
                    "ProductListPrice",
                    "CostPrice",
                ],
                vec![vec![
                    500.into(),
                    "SAL-001".into(),
                    "Atlantic Salmon".into(),
                    3.into(),
                    9.into(),
                    Value::Decimal("14.00".into()),
                    Value::Decimal("8.00".into()),
                ]],
            ),
        ),
        (
            TableName::Regions,
            table(
                &["RegionId", "RegionName"],
                vec![
                    vec![1.into(), "North".into()],
                    vec![2.into(), "South".into()],
                ],
            ),
        ),
        (
            TableName::Shippers,
            table(&["ShipperId", "Carrier"], vec![vec![3.into(), "UPS".into()]]),
        ),
        (
            TableName::ShippingMethods,
            table(
                &["SMId", "ShippingMethodName"],
                vec![
                    vec![1.into(), "Ground".into()],
                    vec![2.into(), "Overnight".into()],
                ],
            ),
        ),
        (
            TableName::Suppliers,
            table(&["SupplierId", "SupplierName"], vec![vec![9.into(), "Nordic Catch".into()]]),
        ),
    ]
}

/// A local repository holding the whole fixture database.
pub fn fixture_repo() -> LocalRepository {
    let repo = LocalRepository::new();
    repo.set_dated_table(TableName::Orders, orders(), "CreatedAt_order");
    repo.set_dated_table(TableName::OrderLines, order_lines(), "CreatedAt");
    repo.set_linked_table(
        TableName::Packs,
        packs(),
        "PickedForOrderLine",
        TableName::OrderLines,
        "OrderLineId",
    );
    for (name, table) in lookups() {
        repo.set_table(name, table);
    }
    repo
}
