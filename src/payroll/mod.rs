pub mod accrual;
pub mod amount;
pub mod calendar;
pub mod error;
