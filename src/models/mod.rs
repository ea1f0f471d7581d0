mod amount;
mod checkout;
mod order;
mod product;
mod user;

pub use amount::*;
pub use checkout::*;
pub use order::*;
pub use product::*;
pub use user::*;
