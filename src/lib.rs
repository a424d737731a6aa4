mod calendar;
mod category;
mod schedule;
mod store;

use rust_decimal::Decimal;

pub use calendar::{days_in_month, is_leap_year, next_month_start};
pub use category::{CategoryError, SavingsCategory};
pub use schedule::{
    compute_schedule, InvalidInputError, MonthlyGoal, ScheduleResult, SchedulingRequest,
};
pub use store::{Action, SavingsStore, StoreError};

// This represents the number of decimal places that a currency can validly express.
// @todo Support the full range of currency precisions specified in ISO 4217.
const CURRENCY_PRECISION: u32 = 2;

// The largest scheduling drift that is left in place rather than folded into the final
// month. This is one unit of the smallest currency denomination (e.g. 1 cent).
fn reconciliation_tolerance() -> Decimal {
    Decimal::new(1, CURRENCY_PRECISION)
}
