use crate::schedule::{compute_schedule, InvalidInputError, ScheduleResult, SchedulingRequest};
use chrono::{Datelike, NaiveDate};
use log::{debug, error};
use rust_decimal::Decimal;
use thiserror::Error;

/// A savings category: a named goal and the monthly plan for reaching it.
///
/// The plan is calculated when the category is created, and can be recalculated later
/// with `reschedule` once deposits and withdrawals have moved the balance.
#[derive(Clone, Debug, PartialEq)]
pub struct SavingsCategory {
    name: String,
    creation_date: NaiveDate,
    target_date: NaiveDate,
    target: Decimal,
    saved: Decimal,
    // `None` once the target has been met
    schedule: Option<ScheduleResult>,
}

#[derive(Error, Debug, Eq, PartialEq)]
pub enum CategoryError {
    #[error("could not schedule savings")]
    Schedule(#[from] InvalidInputError),
    #[error("amounts must be greater than zero, got {0}")]
    NonPositiveAmount(Decimal),
    #[error("cannot withdraw {0} when only {1} has been saved")]
    InsufficientSavings(Decimal, Decimal), // requested, saved
    #[error("depositing {0} would exceed the largest representable balance")]
    AmountTooLarge(Decimal),
}

impl SavingsCategory {
    pub fn new<S: Into<String>>(name: S, request: SchedulingRequest) -> Result<Self, CategoryError> {
        let schedule = compute_schedule(&request)?;

        Ok(SavingsCategory {
            name: name.into(),
            creation_date: request.creation_date,
            target_date: request.target_date,
            target: request.total_target,
            saved: request.current_saved,
            schedule: Some(schedule),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target(&self) -> Decimal {
        self.target
    }

    pub fn saved(&self) -> Decimal {
        self.saved
    }

    pub fn target_date(&self) -> NaiveDate {
        self.target_date
    }

    pub fn schedule(&self) -> Option<&ScheduleResult> {
        self.schedule.as_ref()
    }

    /// The amount still required, never less than zero
    pub fn remaining(&self) -> Decimal {
        (self.target - self.saved).max(Decimal::ZERO)
    }

    /// Fraction of the target saved so far, between 0 and 1
    pub fn progress(&self) -> Decimal {
        (self.saved / self.target).min(Decimal::ONE)
    }

    pub fn is_complete(&self) -> bool {
        self.saved >= self.target
    }

    /// The contribution required this month.
    ///
    /// This is the first month of the plan. Without a plan, fall back to spreading the
    /// remaining amount evenly across the months the goal spans. Nothing is required
    /// once the target has been met, even if the plan predates the final deposit.
    pub fn monthly_contribution(&self) -> Decimal {
        if self.is_complete() {
            return Decimal::ZERO;
        }

        match self.schedule.as_ref().and_then(|s| s.current_contribution()) {
            Some(contribution) => contribution,
            None => self.remaining() / Decimal::from(self.months_spanned()),
        }
    }

    pub fn deposit(&mut self, amount: Decimal) -> Result<(), CategoryError> {
        if amount <= Decimal::ZERO {
            error!("rejecting deposit of {} into '{}'", amount, self.name);
            return Err(CategoryError::NonPositiveAmount(amount));
        }

        self.saved = match self.saved.checked_add(amount) {
            Some(saved) => saved,
            None => {
                error!(
                    "deposit of {} into '{}' overflows the saved balance {}",
                    amount, self.name, self.saved
                );
                return Err(CategoryError::AmountTooLarge(amount));
            }
        };
        debug!("deposited {} into '{}', saved {}", amount, self.name, self.saved);

        Ok(())
    }

    pub fn withdraw(&mut self, amount: Decimal) -> Result<(), CategoryError> {
        if amount <= Decimal::ZERO {
            error!("rejecting withdrawal of {} from '{}'", amount, self.name);
            return Err(CategoryError::NonPositiveAmount(amount));
        }

        if amount > self.saved {
            error!(
                "cannot withdraw {} from '{}' with {} saved",
                amount, self.name, self.saved
            );
            return Err(CategoryError::InsufficientSavings(amount, self.saved));
        }

        self.saved -= amount;
        debug!("withdrew {} from '{}', saved {}", amount, self.name, self.saved);

        Ok(())
    }

    /// Recalculate the plan from `today` for the amount still required. A category that
    /// has met its target no longer has a plan.
    pub fn reschedule(&mut self, today: NaiveDate) -> Result<(), CategoryError> {
        if self.is_complete() {
            debug!("'{}' has met its target - clear schedule", self.name);
            self.schedule = None;
            return Ok(());
        }

        let request = SchedulingRequest::new(today, self.target_date, self.target)
            .with_current_saved(self.saved);
        self.schedule = Some(compute_schedule(&request)?);

        Ok(())
    }

    // Count calendar months from creation to target, inclusive
    fn months_spanned(&self) -> u32 {
        let start = self.creation_date.year() * 12 + self.creation_date.month0() as i32;
        let end = self.target_date.year() * 12 + self.target_date.month0() as i32;
        (end - start + 1).max(1) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn holiday() -> SavingsCategory {
        let request = SchedulingRequest::new(ymd(2025, 1, 15), ymd(2025, 3, 1), dec!(450));
        SavingsCategory::new("Holiday", request).unwrap()
    }

    #[test]
    fn new_category_invalid_request() {
        let request = SchedulingRequest::new(ymd(2025, 1, 15), ymd(2025, 3, 1), dec!(-5));
        assert_eq!(
            SavingsCategory::new("Holiday", request).err(),
            Some(CategoryError::Schedule(InvalidInputError::NonPositiveTarget(
                dec!(-5)
            )))
        );
    }

    #[test]
    fn monthly_contribution_first_goal() {
        let category = holiday();
        assert_eq!(category.monthly_contribution(), dec!(170));
        assert_eq!(category.remaining(), dec!(450));
        assert_eq!(category.progress(), dec!(0));
    }

    #[test]
    fn monthly_contribution_without_schedule() {
        let mut category = holiday();
        category.schedule = None;

        // January, February and March
        assert_eq!(category.monthly_contribution(), dec!(150));
    }

    #[test]
    fn deposit_and_withdraw() {
        let mut category = holiday();
        category.deposit(dec!(90)).unwrap();
        assert_eq!(category.saved(), dec!(90));
        assert_eq!(category.progress(), dec!(0.2));

        category.withdraw(dec!(40)).unwrap();
        assert_eq!(category.saved(), dec!(50));
    }

    #[test]
    fn deposit_non_positive() {
        let mut category = holiday();
        assert_eq!(
            category.deposit(dec!(0)).err(),
            Some(CategoryError::NonPositiveAmount(dec!(0)))
        );
        assert_eq!(category.saved(), dec!(0));
    }

    #[test]
    fn deposit_overflow() {
        let mut category = holiday();
        category.deposit(Decimal::MAX).unwrap();
        assert_eq!(
            category.deposit(Decimal::MAX).err(),
            Some(CategoryError::AmountTooLarge(Decimal::MAX))
        );
        assert_eq!(category.saved(), Decimal::MAX);
    }

    #[test]
    fn monthly_contribution_after_target_met() {
        let mut category = holiday();
        category.deposit(dec!(450)).unwrap();

        assert!(category.is_complete());
        assert!(category.schedule().is_some());
        assert_eq!(category.monthly_contribution(), dec!(0));
    }

    #[test]
    fn withdraw_insufficient() {
        let mut category = holiday();
        category.deposit(dec!(10)).unwrap();
        assert_eq!(
            category.withdraw(dec!(11)).err(),
            Some(CategoryError::InsufficientSavings(dec!(11), dec!(10)))
        );
        assert_eq!(category.saved(), dec!(10));
    }

    #[test]
    fn reschedule_after_deposit() {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut category = holiday();
        category.deposit(dec!(140)).unwrap();
        category.reschedule(ymd(2025, 2, 1)).unwrap();

        let schedule = category.schedule().unwrap();
        assert_eq!(schedule.total_days, 28);
        assert_eq!(schedule.total_calculated_savings, dec!(310));
        assert_eq!(category.monthly_contribution().round_dp(2), dec!(310));
    }

    #[test]
    fn reschedule_complete() {
        let mut category = holiday();
        category.deposit(dec!(500)).unwrap();
        category.reschedule(ymd(2025, 2, 1)).unwrap();

        assert!(category.is_complete());
        assert_eq!(category.schedule(), None);
        assert_eq!(category.progress(), dec!(1));
        assert_eq!(category.monthly_contribution(), dec!(0));
    }

    #[test]
    fn reschedule_past_target() {
        let mut category = holiday();
        let result = category.reschedule(ymd(2025, 3, 1));
        assert_eq!(
            result.err(),
            Some(CategoryError::Schedule(InvalidInputError::NonChronological(
                ymd(2025, 3, 1),
                ymd(2025, 3, 1)
            )))
        );
        assert!(category.schedule().is_some());
    }
}
