pub mod analytics;
pub mod checkout;
pub mod queue;
pub mod rush;
