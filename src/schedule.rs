use crate::{calendar, reconciliation_tolerance, CURRENCY_PRECISION};
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use log::{debug, error, trace};
use rust_decimal::{prelude::FromPrimitive, Decimal};
use thiserror::Error;

/// A request to spread a savings target over the calendar months between two dates
#[derive(Clone, Debug, PartialEq)]
pub struct SchedulingRequest {
    pub creation_date: NaiveDate,
    pub target_date: NaiveDate,
    pub total_target: Decimal,
    pub current_saved: Decimal,
}

/// The portion of the savings target allocated to one calendar month
#[derive(Clone, Debug, PartialEq)]
pub struct MonthlyGoal {
    pub year: i32,
    pub month0: u32, // January = 0, December = 11
    pub days_in_period: u32,
    pub savings_goal: Decimal,
}

/// A complete, reconciled savings plan
#[derive(Clone, Debug, PartialEq)]
pub struct ScheduleResult {
    pub total_days: i64,
    pub daily_savings: Decimal,
    pub monthly_goals: Vec<MonthlyGoal>,
    pub total_calculated_savings: Decimal,
}

#[derive(Error, Debug, Eq, PartialEq)]
pub enum InvalidInputError {
    #[error("the creation date {0} must be earlier than the target date {1}")]
    NonChronological(NaiveDate, NaiveDate),
    #[error("the target amount must be greater than zero, got {0}")]
    NonPositiveTarget(Decimal),
    #[error("the amount already saved cannot be negative, got {0}")]
    NegativeSaved(Decimal),
    #[error("the amount already saved ({0}) must be less than the target amount ({1})")]
    SavedExceedsTarget(Decimal, Decimal), // saved, target
    #[error("the {0} amount is not a finite number")]
    NonFiniteAmount(&'static str),
    #[error("the target amount {0} is too large to schedule")]
    AmountTooLarge(Decimal),
}

impl SchedulingRequest {
    /// Create a request for a new goal with nothing saved yet
    pub fn new(creation_date: NaiveDate, target_date: NaiveDate, total_target: Decimal) -> Self {
        SchedulingRequest {
            creation_date,
            target_date,
            total_target,
            current_saved: Decimal::ZERO,
        }
    }

    pub fn with_current_saved(mut self, current_saved: Decimal) -> Self {
        self.current_saved = current_saved;
        self
    }

    /// Create a request from floating point amounts, as typically entered by a user.
    pub fn from_f64(
        creation_date: NaiveDate,
        target_date: NaiveDate,
        total_target: f64,
        current_saved: f64,
    ) -> Result<Self, InvalidInputError> {
        let total_target = Decimal::from_f64(total_target)
            .ok_or(InvalidInputError::NonFiniteAmount("target"))?;
        let current_saved = Decimal::from_f64(current_saved)
            .ok_or(InvalidInputError::NonFiniteAmount("saved"))?;

        Ok(SchedulingRequest::new(creation_date, target_date, total_target)
            .with_current_saved(current_saved))
    }

    /// Create a request from timestamps. Any time of day is discarded, so the day count
    /// is always a whole number of calendar days.
    pub fn from_datetimes(
        creation: NaiveDateTime,
        target: NaiveDateTime,
        total_target: Decimal,
    ) -> Self {
        SchedulingRequest::new(creation.date(), target.date(), total_target)
    }

    /// The amount still to be saved
    pub fn remaining(&self) -> Decimal {
        self.total_target - self.current_saved
    }

    pub fn validate(&self) -> Result<(), InvalidInputError> {
        if self.creation_date >= self.target_date {
            error!(
                "creation date {} is not before target date {}",
                self.creation_date, self.target_date
            );
            return Err(InvalidInputError::NonChronological(
                self.creation_date,
                self.target_date,
            ));
        }

        if self.total_target <= Decimal::ZERO {
            error!("target amount {} is not positive", self.total_target);
            return Err(InvalidInputError::NonPositiveTarget(self.total_target));
        }

        // Monthly goals can briefly total just under twice the remaining amount before
        // reconciliation, so leave that much headroom.
        if self.total_target > Decimal::MAX / Decimal::from(4) {
            error!("target amount {} exceeds the schedulable range", self.total_target);
            return Err(InvalidInputError::AmountTooLarge(self.total_target));
        }

        if self.current_saved < Decimal::ZERO {
            error!("saved amount {} is negative", self.current_saved);
            return Err(InvalidInputError::NegativeSaved(self.current_saved));
        }

        if self.current_saved >= self.total_target {
            error!(
                "saved amount {} already meets target {}",
                self.current_saved, self.total_target
            );
            return Err(InvalidInputError::SavedExceedsTarget(
                self.current_saved,
                self.total_target,
            ));
        }

        Ok(())
    }
}

impl MonthlyGoal {
    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month0.checked_add(1)?, 1)
    }

    /// The goal rounded to currency precision. This is for display only; the schedule
    /// itself is never rounded.
    pub fn rounded_goal(&self) -> Decimal {
        self.savings_goal.round_dp(CURRENCY_PRECISION)
    }
}

impl ScheduleResult {
    /// Sum of every monthly goal
    pub fn scheduled_total(&self) -> Decimal {
        self.monthly_goals.iter().map(|g| g.savings_goal).sum()
    }

    pub fn goal_for(&self, year: i32, month0: u32) -> Option<&MonthlyGoal> {
        self.monthly_goals
            .iter()
            .find(|g| g.year == year && g.month0 == month0)
    }

    /// The contribution required in the first month of the plan
    pub fn current_contribution(&self) -> Option<Decimal> {
        self.monthly_goals.first().map(|g| g.savings_goal)
    }
}

/// Partition the amount still to be saved into calendar-month installments.
///
/// Every day between the creation and target dates contributes `daily_savings`, and each
/// month receives the contribution for the days it covers. Rounding drift is then
/// absorbed by the final month so that the plan sums to the remaining amount.
pub fn compute_schedule(request: &SchedulingRequest) -> Result<ScheduleResult, InvalidInputError> {
    request.validate()?;

    let creation = request.creation_date;
    let target = request.target_date;

    let total_days = (target - creation).num_days().max(1);
    let remaining = request.remaining();
    let daily_savings = remaining / Decimal::from(total_days);

    debug!(
        "scheduling {} over {} days ({} - {}) at {} per day",
        remaining, total_days, creation, target, daily_savings
    );

    let mut monthly_goals = Vec::new();
    let mut cursor = creation;

    while cursor < target {
        let year = cursor.year();
        let month0 = cursor.month0();
        let days_in_month = match calendar::days_in_month(year, month0) {
            Some(days) => days,
            None => break,
        };

        let start_day = if is_same_month(cursor, creation) {
            creation.day()
        } else {
            1
        };
        let end_day = if is_same_month(cursor, target) {
            target.day()
        } else {
            days_in_month
        };

        // Note we add a day here as we are calculating length, not difference
        let days_in_period = (end_day + 1).saturating_sub(start_day);

        if days_in_period > 0 {
            let savings_goal = Decimal::from(days_in_period) * daily_savings;

            trace!(
                "{}-{:02}: days {} - {} ({} days) = {}",
                year,
                month0 + 1,
                start_day,
                end_day,
                days_in_period,
                savings_goal
            );

            monthly_goals.push(MonthlyGoal {
                year,
                month0,
                days_in_period,
                savings_goal,
            });
        } else {
            trace!("{}-{:02}: no days in period - skip", year, month0 + 1);
        }

        cursor = match calendar::next_month_start(cursor) {
            Some(next) => next,
            None => break,
        };
    }

    reconcile(&mut monthly_goals, remaining);

    Ok(ScheduleResult {
        total_days,
        daily_savings,
        monthly_goals,
        total_calculated_savings: remaining,
    })
}

// Push any difference between the scheduled and required amounts onto the last goal,
// provided it is larger than the smallest currency unit.
fn reconcile(goals: &mut [MonthlyGoal], remaining: Decimal) {
    let scheduled: Decimal = goals.iter().map(|g| g.savings_goal).sum();
    let difference = remaining - scheduled;

    if difference.abs() <= reconciliation_tolerance() {
        debug!("schedule totals {}, within tolerance of {}", scheduled, remaining);
        return;
    }

    if let Some(last) = goals.last_mut() {
        debug!(
            "schedule totals {} rather than {} - adjust {}-{:02} by {}",
            scheduled,
            remaining,
            last.year,
            last.month0 + 1,
            difference
        );
        last.savings_goal += difference;
    }
}

fn is_same_month(a: NaiveDate, b: NaiveDate) -> bool {
    a.year() == b.year() && a.month0() == b.month0()
}
