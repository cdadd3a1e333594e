//! Gathered resources and population.

use crate::block::ResourceKind;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("not enough {kind}: need {needed}, have {available}")]
    Insufficient {
        kind: ResourceKind,
        needed: u32,
        available: u32,
    },
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ResourceLedger {
    amounts: BTreeMap<ResourceKind, u32>,
    population: u32,
}

impl ResourceLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn credit(&mut self, kind: ResourceKind, amount: u32) {
        let slot = self.amounts.entry(kind).or_insert(0);
        *slot = slot.saturating_add(amount);
    }

    #[must_use]
    pub fn amount(&self, kind: ResourceKind) -> u32 {
        self.amounts.get(&kind).copied().unwrap_or(0)
    }

    /// Check a cost without spending it.
    ///
    /// # Errors
    /// `LedgerError::Insufficient` for the first resource (in `ResourceKind`
    /// order) that falls short.
    pub fn can_afford(&self, cost: &BTreeMap<ResourceKind, u32>) -> Result<(), LedgerError> {
        for (&kind, &needed) in cost {
            let available = self.amount(kind);
            if available < needed {
                return Err(LedgerError::Insufficient { kind, needed, available });
            }
        }
        Ok(())
    }

    /// Spend a whole cost or nothing.
    ///
    /// # Errors
    /// Same as `can_afford`; the ledger is unchanged on error.
    pub fn try_spend(&mut self, cost: &BTreeMap<ResourceKind, u32>) -> Result<(), LedgerError> {
        self.can_afford(cost)?;
        for (kind, needed) in cost {
            if let Some(slot) = self.amounts.get_mut(kind) {
                *slot -= needed;
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn population(&self) -> u32 {
        self.population
    }

    pub fn add_population(&mut self, bonus: u32) {
        self.population = self.population.saturating_add(bonus);
    }

    /// Non-zero balances in `ResourceKind` order.
    pub fn iter(&self) -> impl Iterator<Item = (ResourceKind, u32)> + '_ {
        self.amounts.iter().filter(|(_, v)| **v > 0).map(|(k, v)| (*k, *v))
    }

    pub fn clear(&mut self) {
        self.amounts.clear();
        self.population = 0;
    }
}
