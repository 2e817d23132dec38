pub mod account;
pub mod validation;
pub mod valuation;

pub use account::{Account, Fill, Side, DEFAULT_STARTING_BALANCE};
pub use validation::*;
pub use valuation::*;

pub type Result<T> = std::result::Result<T, TradeError>;
