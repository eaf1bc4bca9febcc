pub mod complaint;
pub mod menu;
pub mod order;
