use crate::{
    category::{CategoryError, SavingsCategory},
    schedule::SchedulingRequest,
};
use chrono::NaiveDate;
use log::{debug, error};
use rust_decimal::Decimal;
use thiserror::Error;

/// An update to the savings categories
#[derive(Clone, Debug)]
pub enum Action {
    Create { name: String, request: SchedulingRequest },
    Deposit { name: String, amount: Decimal },
    Withdraw { name: String, amount: Decimal },
    Reschedule { name: String, today: NaiveDate },
    Remove { name: String },
}

/// Holds every savings category. All changes go through `apply`, so a failed action
/// never leaves a category half updated.
#[derive(Debug, Default)]
pub struct SavingsStore {
    categories: Vec<SavingsCategory>,
}

#[derive(Error, Debug, PartialEq)]
pub enum StoreError {
    #[error("a savings category named '{0}' already exists")]
    DuplicateCategory(String),
    #[error("there is no savings category named '{0}'")]
    UnknownCategory(String),
    #[error("could not update savings category")]
    Category(#[from] CategoryError),
}

impl SavingsStore {
    pub fn new() -> Self {
        SavingsStore::default()
    }

    pub fn apply(&mut self, action: Action) -> Result<(), StoreError> {
        debug!("applying {:?}", action);

        match action {
            Action::Create { name, request } => {
                if self.get(&name).is_some() {
                    error!("savings category '{}' already exists", name);
                    return Err(StoreError::DuplicateCategory(name));
                }

                let category = SavingsCategory::new(name, request)?;
                self.categories.push(category);
            }
            Action::Deposit { name, amount } => self.get_mut(&name)?.deposit(amount)?,
            Action::Withdraw { name, amount } => self.get_mut(&name)?.withdraw(amount)?,
            Action::Reschedule { name, today } => self.get_mut(&name)?.reschedule(today)?,
            Action::Remove { name } => {
                let index = self.index_of(&name)?;
                self.categories.remove(index);
            }
        }

        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&SavingsCategory> {
        self.categories.iter().find(|c| c.name() == name)
    }

    /// Categories in the order they were created
    pub fn categories(&self) -> &[SavingsCategory] {
        &self.categories
    }

    /// Total required across every category this month
    pub fn total_monthly_contribution(&self) -> Decimal {
        self.categories
            .iter()
            .map(|c| c.monthly_contribution())
            .sum()
    }

    fn get_mut(&mut self, name: &str) -> Result<&mut SavingsCategory, StoreError> {
        let index = self.index_of(name)?;
        Ok(&mut self.categories[index])
    }

    fn index_of(&self, name: &str) -> Result<usize, StoreError> {
        self.categories
            .iter()
            .position(|c| c.name() == name)
            .ok_or_else(|| {
                error!("no savings category named '{}'", name);
                StoreError::UnknownCategory(name.to_owned())
            })
    }
}
