pub mod bills;
pub mod customers;
pub mod products;
pub mod reports;
