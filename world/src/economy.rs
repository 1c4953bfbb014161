//! Per-player accounts and coin accounting.

use std::{
    collections::{BTreeMap, BTreeSet},
    time::Duration,
};

use wave_defence_core::{Coins, PlayerId, PlayerSnapshot, Rules, TowerId};

/// Account held by a player for the lifetime of their session.
#[derive(Clone, Debug)]
pub(crate) struct PlayerAccount {
    pub(crate) id: PlayerId,
    pub(crate) health: u32,
    coins: Coins,
    total_spent: Coins,
    total_earned: Coins,
    pub(crate) kills: u32,
    pub(crate) highest_wave: u32,
    pub(crate) last_placement: Option<Duration>,
    pub(crate) towers: BTreeSet<TowerId>,
}

impl PlayerAccount {
    fn open(id: PlayerId, rules: &Rules) -> Self {
        Self {
            id,
            health: rules.starting_health,
            coins: rules.starting_coins,
            total_spent: Coins::ZERO,
            total_earned: Coins::ZERO,
            kills: 0,
            highest_wave: 0,
            last_placement: None,
            towers: BTreeSet::new(),
        }
    }

    pub(crate) fn credit(&mut self, amount: Coins) {
        self.coins = self.coins.saturating_add(amount);
    }

    /// Removes `amount` from the balance; an overdraft leaves the balance untouched.
    pub(crate) fn debit(&mut self, amount: Coins) -> bool {
        match self.coins.checked_sub(amount) {
            Some(remaining) => {
                self.coins = remaining;
                true
            }
            None => false,
        }
    }

    pub(crate) fn record_spend(&mut self, amount: Coins) {
        self.total_spent = self.total_spent.saturating_add(amount);
    }

    pub(crate) fn record_earn(&mut self, amount: Coins) {
        self.total_earned = self.total_earned.saturating_add(amount);
    }

    pub(crate) fn coins(&self) -> Coins {
        self.coins
    }

    pub(crate) fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            id: self.id,
            health: self.health,
            coins: self.coins,
            total_spent: self.total_spent,
            total_earned: self.total_earned,
            kills: self.kills,
            highest_wave: self.highest_wave,
            towers: self.towers.iter().copied().collect(),
        }
    }
}

/// Ledger holding every active player account.
///
/// Each account is touched independently; no operation moves coins between
/// two players.
#[derive(Debug, Default)]
pub(crate) struct EconomyLedger {
    accounts: BTreeMap<PlayerId, PlayerAccount>,
}

impl EconomyLedger {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Opens an account, returning `false` if the player already has one.
    pub(crate) fn open(&mut self, player: PlayerId, rules: &Rules) -> bool {
        if self.accounts.contains_key(&player) {
            return false;
        }
        let _ = self
            .accounts
            .insert(player, PlayerAccount::open(player, rules));
        true
    }

    pub(crate) fn close(&mut self, player: PlayerId) -> Option<PlayerAccount> {
        self.accounts.remove(&player)
    }

    pub(crate) fn account(&self, player: PlayerId) -> Option<&PlayerAccount> {
        self.accounts.get(&player)
    }

    pub(crate) fn account_mut(&mut self, player: PlayerId) -> Option<&mut PlayerAccount> {
        self.accounts.get_mut(&player)
    }

    pub(crate) fn accounts(&self) -> impl Iterator<Item = &PlayerAccount> {
        self.accounts.values()
    }

    pub(crate) fn accounts_mut(&mut self) -> impl Iterator<Item = &mut PlayerAccount> {
        self.accounts.values_mut()
    }

    /// Debits `amount` and records it as spent, or changes nothing.
    pub(crate) fn charge(&mut self, player: PlayerId, amount: Coins) -> bool {
        let Some(account) = self.accounts.get_mut(&player) else {
            return false;
        };
        if !account.debit(amount) {
            return false;
        }
        account.record_spend(amount);
        true
    }

    /// Credits `amount` and records it as earned.
    pub(crate) fn reward(&mut self, player: PlayerId, amount: Coins) -> bool {
        let Some(account) = self.accounts.get_mut(&player) else {
            return false;
        };
        account.credit(amount);
        account.record_earn(amount);
        true
    }
}
