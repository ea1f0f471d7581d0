use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    /// Cumulative units ordered
    pub orders: i64,
    pub created_at: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreateProduct {
    /// Storefront product id (matches `productId` in checkout line items)
    pub id: String,
    pub name: String,
}
