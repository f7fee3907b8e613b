use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

/// Smallest stake the bet book accepts.
pub const MIN_STAKE: u64 = 10;

/// Key of a single bet: (bettor name, horse name).
pub type BetKey = (String, String);

/// A single stake as read from a bet sheet.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Bet {
    pub bettor: String,
    pub horse: String,
    pub amount: u64,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BetError {
    #[error("bettor name must not be empty")]
    EmptyBettor,
    #[error("{bettor} already has a bet on {horse}")]
    DuplicateBet { bettor: String, horse: String },
    #[error("bettor name {0} is already taken")]
    BettorTaken(String),
    #[error("stake of {amount} is below the minimum of {min}")]
    BelowMinimum { amount: u64, min: u64 },
}

/// compute_payouts splits the total pool among the bets on the winner in proportion to their
/// stake against the total stake on the winner. Every payout is rounded down, so the sum never
/// exceeds the pool. Nobody is paid if no stake backs the winner.
///
/// Sums and payouts are u128: a single payout can exceed the largest stake.
pub fn compute_payouts(winner: &str, bets: &BTreeMap<BetKey, u64>) -> BTreeMap<String, u128> {
    let total_pool: u128 = bets.values().map(|&amount| amount as u128).sum();
    let winning_total: u128 = bets
        .iter()
        .filter(|((_, horse), _)| horse == winner)
        .map(|(_, &amount)| amount as u128)
        .sum();

    let mut payouts = BTreeMap::new();
    if winning_total == 0 {
        return payouts;
    }

    // amount * pool / winning_total = amount * q + amount * r / winning_total
    let q = total_pool / winning_total;
    let r = total_pool % winning_total;

    for ((bettor, horse), &amount) in bets.iter() {
        if horse == winner {
            let payout = amount as u128 * q + mul_div_floor(amount, r, winning_total);
            payouts.insert(bettor.to_owned(), payout);
        }
    }

    payouts
}

/// floor(a * b / c) for b < c without forming the product. The result is at most a.
fn mul_div_floor(a: u64, b: u128, c: u128) -> u128 {
    let mut quot: u128 = 0;
    let mut rem: u128 = 0;

    // binary long multiplication of b by the bits of a, reduced modulo c after every step
    for bit in (0..u64::BITS).rev() {
        quot <<= 1;
        if rem >= c - rem {
            rem -= c - rem;
            quot += 1;
        } else {
            rem <<= 1;
        }

        if (a >> bit) & 1 == 1 {
            if rem >= c - b {
                rem -= c - b;
                quot += 1;
            } else {
                rem += b;
            }
        }
    }

    quot
}

/// What happens to the pool if nobody backed the winner.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UnbackedPolicy {
    /// Nothing is paid out, the pool stays with the house
    Retain,
    /// Every bettor gets the stake back
    Refund,
}

impl Default for UnbackedPolicy {
    fn default() -> Self {
        UnbackedPolicy::Retain
    }
}

/// Settlement holds the payouts of a finished race together with the pool accounting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settlement {
    pub winner: Option<String>,
    pub pool: u128,
    pub payouts: BTreeMap<String, u128>,
    pub paid_out: u128,
    /// Part of the pool that is not paid out (rounding loss or unbacked winner)
    pub retained: u128,
    pub refunded: bool,
}

impl Settlement {
    pub fn print(&self) {
        match &self.winner {
            Some(winner) => println!("RESULT: Payouts for {} (pool {})", winner, self.pool),
            None => println!("RESULT: No winner (pool {})", self.pool),
        }
        if self.refunded {
            println!("INFO: Nobody backed the winner, all stakes are refunded");
        }
        if self.payouts.is_empty() {
            println!("No payouts.");
        }
        for (bettor, amount) in self.payouts.iter() {
            println!("{} won ${}", bettor, amount);
        }
        if self.retained > 0 {
            println!("Retained by the house: ${}", self.retained);
        }
    }
}

/// BetBook is the bet set of one race. Keys are unique, bettor names may only be used once and
/// stakes must reach the minimum.
#[derive(Debug, Clone)]
pub struct BetBook {
    min_stake: u64,
    bets: BTreeMap<BetKey, u64>,
    bettors: BTreeSet<String>,
}

impl Default for BetBook {
    fn default() -> Self {
        BetBook::new(MIN_STAKE)
    }
}

impl BetBook {
    pub fn new(min_stake: u64) -> BetBook {
        BetBook {
            min_stake,
            bets: BTreeMap::new(),
            bettors: BTreeSet::new(),
        }
    }

    pub fn place(&mut self, bettor: &str, horse: &str, amount: u64) -> Result<(), BetError> {
        let bettor = bettor.trim();
        if bettor.is_empty() {
            return Err(BetError::EmptyBettor);
        }
        if amount < self.min_stake {
            return Err(BetError::BelowMinimum {
                amount,
                min: self.min_stake,
            });
        }

        let key = (bettor.to_owned(), horse.to_owned());
        if self.bets.contains_key(&key) {
            return Err(BetError::DuplicateBet {
                bettor: key.0,
                horse: key.1,
            });
        }
        if self.bettors.contains(bettor) {
            return Err(BetError::BettorTaken(bettor.to_owned()));
        }

        self.bettors.insert(bettor.to_owned());
        self.bets.insert(key, amount);
        Ok(())
    }

    /// Places all bets or none.
    pub fn place_all(&mut self, bets: &[Bet]) -> Result<(), BetError> {
        let mut book = self.clone();
        for bet in bets.iter() {
            book.place(&bet.bettor, &bet.horse, bet.amount)?;
        }
        *self = book;
        Ok(())
    }

    pub fn bets(&self) -> &BTreeMap<BetKey, u64> {
        &self.bets
    }

    pub fn len(&self) -> usize {
        self.bets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bets.is_empty()
    }

    pub fn total_pool(&self) -> u128 {
        self.bets.values().map(|&amount| amount as u128).sum()
    }

    pub fn totals_per_horse(&self) -> BTreeMap<String, u128> {
        let mut totals = BTreeMap::new();
        for ((_, horse), &amount) in self.bets.iter() {
            *totals.entry(horse.to_owned()).or_insert(0) += amount as u128;
        }
        totals
    }

    pub fn clear(&mut self) {
        self.bets.clear();
        self.bettors.clear();
    }

    pub fn payouts(&self, winner: &str) -> BTreeMap<String, u128> {
        compute_payouts(winner, &self.bets)
    }
}

/// settle computes the payouts for the given race outcome and accounts for the part of the pool
/// that is not paid out.
pub fn settle(winner: Option<&str>, book: &BetBook, policy: UnbackedPolicy) -> Settlement {
    let pool = book.total_pool();
    let mut payouts = match winner {
        Some(winner) => book.payouts(winner),
        None => BTreeMap::new(),
    };

    let backed = winner
        .map(|w| book.totals_per_horse().get(w).copied().unwrap_or(0) > 0)
        .unwrap_or(false);
    let refunded = !backed && policy == UnbackedPolicy::Refund && !book.is_empty();

    if refunded {
        payouts.clear();
        for ((bettor, _), amount) in book.bets().iter() {
            payouts.insert(bettor.to_owned(), *amount as u128);
        }
    }

    let paid_out: u128 = payouts.values().sum();

    Settlement {
        winner: winner.map(String::from),
        pool,
        payouts,
        paid_out,
        retained: pool - paid_out,
        refunded,
    }
}
