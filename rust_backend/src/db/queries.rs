//! The fixed query catalog.
//!
//! Dated queries take `@P1` (start) and `@P2` (end) as SQL `date` parameters.
//! Column aliases are part of the contract with the dashboard and must not
//! change.

use crate::models::TableName;

/// One named query of the batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableQuery {
    pub name: TableName,
    pub sql: &'static str,
    /// Whether `@P1`/`@P2` must be bound.
    pub dated: bool,
    /// Result columns in select-list order.
    pub columns: &'static [&'static str],
}

const ORDERS: TableQuery = TableQuery {
    name: TableName::Orders,
    sql: r#"
        SELECT OrderId, CustomerId, SalesRepId,
               CreatedAt AS CreatedAt_order, DateOrdered,
               DateExpected, DateShipped AS ShipDate,
               ShippingMethodRequested
          FROM dbo.Orders
         WHERE OrderStatus = 'packed'
           AND CreatedAt BETWEEN @P1 AND @P2
    "#,
    dated: true,
    columns: &[
        "OrderId",
        "CustomerId",
        "SalesRepId",
        "CreatedAt_order",
        "DateOrdered",
        "DateExpected",
        "ShipDate",
        "ShippingMethodRequested",
    ],
};

const ORDER_LINES: TableQuery = TableQuery {
    name: TableName::OrderLines,
    sql: r#"
        SELECT OrderLineId, OrderId, ProductId, ShipperId,
               QuantityShipped, Price AS SalePrice,
               CostPrice AS UnitCost, DateShipped
          FROM dbo.OrderLines
         WHERE CreatedAt BETWEEN @P1 AND @P2
    "#,
    dated: true,
    columns: &[
        "OrderLineId",
        "OrderId",
        "ProductId",
        "ShipperId",
        "QuantityShipped",
        "SalePrice",
        "UnitCost",
        "DateShipped",
    ],
};

const CUSTOMERS: TableQuery = TableQuery {
    name: TableName::Customers,
    sql: r#"
        SELECT CustomerId, Name AS CustomerName, RegionId, IsRetail
          FROM dbo.Customers
    "#,
    dated: false,
    columns: &["CustomerId", "CustomerName", "RegionId", "IsRetail"],
};

const PRODUCTS: TableQuery = TableQuery {
    name: TableName::Products,
    sql: r#"
        SELECT ProductId, SKU, Description AS ProductName,
               UnitOfBillingId, SupplierId,
               ListPrice AS ProductListPrice, CostPrice
          FROM dbo.Products
    "#,
    dated: false,
    columns: &[
        "ProductId",
        "SKU",
        "ProductName",
        "UnitOfBillingId",
        "SupplierId",
        "ProductListPrice",
        "CostPrice",
    ],
};

const REGIONS: TableQuery = TableQuery {
    name: TableName::Regions,
    sql: r#"
        SELECT RegionId, Name AS RegionName
          FROM dbo.Regions
    "#,
    dated: false,
    columns: &["RegionId", "RegionName"],
};

const SHIPPERS: TableQuery = TableQuery {
    name: TableName::Shippers,
    sql: r#"
        SELECT ShipperId, Name AS Carrier
          FROM dbo.Shippers
    "#,
    dated: false,
    columns: &["ShipperId", "Carrier"],
};

const SHIPPING_METHODS: TableQuery = TableQuery {
    name: TableName::ShippingMethods,
    sql: r#"
        SELECT ShippingMethodId AS SMId, Name AS ShippingMethodName
          FROM dbo.ShippingMethods
    "#,
    dated: false,
    columns: &["SMId", "ShippingMethodName"],
};

const SUPPLIERS: TableQuery = TableQuery {
    name: TableName::Suppliers,
    sql: r#"
        SELECT SupplierId, Name AS SupplierName
          FROM dbo.Suppliers
    "#,
    dated: false,
    columns: &["SupplierId", "SupplierName"],
};

const PACKS: TableQuery = TableQuery {
    name: TableName::Packs,
    sql: r#"
        WITH ol AS (
            SELECT OrderLineId
              FROM dbo.OrderLines
             WHERE CreatedAt BETWEEN @P1 AND @P2
        )
        SELECT p.PickedForOrderLine, p.WeightLb, p.ItemCount,
               p.ShippedAt AS DeliveryDate
          FROM dbo.Packs p
          JOIN ol ON p.PickedForOrderLine = ol.OrderLineId
    "#,
    dated: true,
    columns: &["PickedForOrderLine", "WeightLb", "ItemCount", "DeliveryDate"],
};

static CATALOG: [TableQuery; 9] = [
    ORDERS,
    ORDER_LINES,
    CUSTOMERS,
    PRODUCTS,
    REGIONS,
    SHIPPERS,
    SHIPPING_METHODS,
    SUPPLIERS,
    PACKS,
];

/// All nine queries in load order (same order as [`TableName::ALL`]).
pub fn catalog() -> &'static [TableQuery] {
    &CATALOG
}

/// Catalog entry for `name`.
pub fn query_for(name: TableName) -> &'static TableQuery {
    // CATALOG is laid out in TableName::ALL order
    &CATALOG[name as usize]
}
