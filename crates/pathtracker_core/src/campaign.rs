use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{CoreError, CoreErrorCode};

/// Storage key for a campaign: trimmed, lower-cased, one path segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CampaignName(String);

impl CampaignName {
    pub fn new(raw: &str) -> Result<Self, CoreError> {
        let name = raw.trim().to_lowercase();
        let invalid = |reason: &str| {
            CoreError::new(
                CoreErrorCode::InvalidCampaignName,
                format!("invalid campaign name '{}': {reason}", raw.trim()),
            )
        };

        if name.is_empty() {
            return Err(invalid("name is empty"));
        }
        if name.starts_with('.') {
            return Err(invalid("name cannot start with '.'"));
        }
        if name.contains(['/', '\\']) {
            return Err(invalid("name cannot contain path separators"));
        }
        if name.chars().any(char::is_control) {
            return Err(invalid("name cannot contain control characters"));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CampaignName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One unit of treasure. `value` is `None` for unappraised loot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LootItem {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
}

impl LootItem {
    pub fn new(name: impl Into<String>, value: Option<f64>) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    /// What the party gets when selling this item: half its value.
    pub fn sell_value(&self) -> f64 {
        self.value.map_or(0.0, |v| v / 2.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XpReward {
    pub value: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl XpReward {
    pub fn new(value: u64, description: Option<String>) -> Self {
        Self { value, description }
    }
}

/// What a cash out removed from the campaign.
#[derive(Debug, Clone, PartialEq)]
pub struct Liquidation {
    /// Sold items, highest value first.
    pub sold: Vec<LootItem>,
    pub money: f64,
    pub total: f64,
    pub unsold_remaining: usize,
}

/// A loot change would push the sell value past what an `f64` can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("total sell value would no longer be finite")]
pub struct LootOverflow;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Award {
    pub rewards: Vec<XpReward>,
    pub total: u64,
}

/// The loot and XP state of one campaign.
///
/// `loot_total` and `xp_total` are cached aggregates refreshed after every
/// mutation, so they always equal `money + sum(value / 2)` and
/// `sum(reward.value)` respectively.
#[derive(Debug, Clone, PartialEq)]
pub struct Campaign {
    items: Vec<LootItem>,
    money: f64,
    rewards: Vec<XpReward>,
    loot_total: f64,
    xp_total: u64,
}

impl Default for Campaign {
    fn default() -> Self {
        Self::new(Vec::new(), 0.0, Vec::new())
    }
}

impl Campaign {
    pub fn new(items: Vec<LootItem>, money: f64, rewards: Vec<XpReward>) -> Self {
        let mut campaign = Self {
            items,
            money,
            rewards,
            loot_total: 0.0,
            xp_total: 0,
        };
        campaign.refresh_loot_total();
        campaign.refresh_xp_total();
        campaign
    }

    pub fn items(&self) -> &[LootItem] {
        &self.items
    }

    pub fn money(&self) -> f64 {
        self.money
    }

    pub fn rewards(&self) -> &[XpReward] {
        &self.rewards
    }

    pub fn loot_total(&self) -> f64 {
        self.loot_total
    }

    pub fn xp_total(&self) -> u64 {
        self.xp_total
    }

    /// Items ordered by descending value; unvalued items sort as zero and
    /// ties keep insertion order.
    pub fn loot_by_value(&self) -> Vec<&LootItem> {
        let mut sorted: Vec<&LootItem> = self.items.iter().collect();
        sorted.sort_by(|a, b| by_value_desc(a, b));
        sorted
    }

    /// Appends `quantity` copies of `item`. Nothing changes when the new
    /// total would not be finite.
    pub fn add_items(&mut self, item: &LootItem, quantity: u64) -> Result<(), LootOverflow> {
        let added = item.sell_value() * quantity as f64;
        checked_total(self.loot_total + added)?;
        let count = usize::try_from(quantity).map_err(|_| LootOverflow)?;
        self.items.extend(std::iter::repeat_n(item.clone(), count));
        self.refresh_loot_total();
        Ok(())
    }

    pub fn add_money(&mut self, amount: f64) -> Result<(), LootOverflow> {
        let money = checked_total(self.money + amount)?;
        checked_total(self.loot_total + amount)?;
        self.money = money;
        self.refresh_loot_total();
        Ok(())
    }

    pub fn add_rewards(&mut self, reward: &XpReward, quantity: u64) {
        for _ in 0..quantity {
            self.rewards.push(reward.clone());
        }
        self.refresh_xp_total();
    }

    /// Sets the value of every item named exactly `name`; returns how many
    /// items changed. Nothing changes when the new total would not be finite.
    pub fn set_item_values(&mut self, name: &str, value: f64) -> Result<usize, LootOverflow> {
        let replaced = value / 2.0;
        let total = self.money
            + self
                .items
                .iter()
                .map(|item| {
                    if item.name == name {
                        replaced
                    } else {
                        item.sell_value()
                    }
                })
                .sum::<f64>();
        checked_total(total)?;

        let mut count = 0;
        for item in self.items.iter_mut().filter(|item| item.name == name) {
            item.value = Some(value);
            count += 1;
        }
        self.refresh_loot_total();
        Ok(count)
    }

    /// Sells every valued item along with the loose money.
    pub fn liquidate(&mut self) -> Liquidation {
        let (mut sold, kept): (Vec<LootItem>, Vec<LootItem>) = std::mem::take(&mut self.items)
            .into_iter()
            .partition(|item| item.value.is_some());
        sold.sort_by(by_value_desc);

        let liquidation = Liquidation {
            sold,
            money: self.money,
            total: self.loot_total,
            unsold_remaining: kept.len(),
        };

        self.items = kept;
        self.money = 0.0;
        self.refresh_loot_total();
        liquidation
    }

    pub fn award(&mut self) -> Award {
        let award = Award {
            rewards: std::mem::take(&mut self.rewards),
            total: self.xp_total,
        };
        self.refresh_xp_total();
        award
    }

    fn refresh_loot_total(&mut self) {
        self.loot_total = self.money + self.items.iter().map(LootItem::sell_value).sum::<f64>();
    }

    fn refresh_xp_total(&mut self) {
        self.xp_total = self
            .rewards
            .iter()
            .fold(0u64, |total, reward| total.saturating_add(reward.value));
    }
}

fn checked_total(total: f64) -> Result<f64, LootOverflow> {
    if total.is_finite() {
        Ok(total)
    } else {
        Err(LootOverflow)
    }
}

fn by_value_desc(a: &LootItem, b: &LootItem) -> Ordering {
    let a = a.value.unwrap_or(0.0);
    let b = b.value.unwrap_or(0.0);
    b.total_cmp(&a)
}
