use log::debug;

use crate::action::{Action, Issue, Rejection};
use crate::campaign::{Award, Campaign, Liquidation, LootItem, XpReward};
use crate::command::ParseError;
use crate::error::CoreError;

/// Structured result of one command, rendered by the front end.
#[derive(Debug, Clone, PartialEq)]
pub enum Report {
    LootAdded {
        name: String,
        quantity: u64,
        loot_total: f64,
    },
    XpAdded {
        amount: u64,
        xp_total: u64,
    },
    MoneyAdded {
        amount: f64,
        loot_total: f64,
    },
    LootListing {
        warnings: Vec<Issue>,
        items: Vec<LootItem>,
        money: f64,
        loot_total: f64,
    },
    XpListing {
        warnings: Vec<Issue>,
        rewards: Vec<XpReward>,
        xp_total: u64,
    },
    CashedOut {
        liquidation: Liquidation,
        share: f64,
    },
    XpAwarded {
        award: Award,
        share: f64,
    },
    ValuesSet {
        count: usize,
        loot_total: f64,
    },
    Saved,
    SaveFailed(CoreError),
    Rejected(Rejection),
    UnknownCommand(String),
    ParseFailed(ParseError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Report(Report),
    /// The caller owns persistence and should save now.
    Save,
    Quit,
}

/// Apply one action to the campaign.
pub fn dispatch(action: Action, campaign: &mut Campaign) -> Outcome {
    debug!("dispatching {action:?}");

    let report = match action {
        Action::Quit => return Outcome::Quit,
        Action::Save => return Outcome::Save,
        Action::AddLoot { item, quantity } => match campaign.add_items(&item, quantity) {
            Ok(()) => Report::LootAdded {
                name: item.name,
                quantity,
                loot_total: campaign.loot_total(),
            },
            Err(_) => too_large("add item"),
        },
        Action::AddXp { reward, quantity } => {
            campaign.add_rewards(&reward, quantity);
            Report::XpAdded {
                amount: reward.value.saturating_mul(quantity),
                xp_total: campaign.xp_total(),
            }
        }
        Action::AddMoney { amount } => match campaign.add_money(amount) {
            Ok(()) => Report::MoneyAdded {
                amount,
                loot_total: campaign.loot_total(),
            },
            Err(_) => too_large("add money"),
        },
        Action::ListLoot { warnings } => Report::LootListing {
            warnings,
            items: campaign.loot_by_value().into_iter().cloned().collect(),
            money: campaign.money(),
            loot_total: campaign.loot_total(),
        },
        Action::ListXp { warnings } => Report::XpListing {
            warnings,
            rewards: campaign.rewards().to_vec(),
            xp_total: campaign.xp_total(),
        },
        Action::CashOut { pcs } => {
            let liquidation = campaign.liquidate();
            let share = liquidation.total / pcs as f64;
            Report::CashedOut { liquidation, share }
        }
        Action::AwardXp { pcs } => {
            let award = campaign.award();
            let share = award.total as f64 / pcs as f64;
            Report::XpAwarded { award, share }
        }
        Action::SetLootValue { name, value } => match campaign.set_item_values(&name, value) {
            Ok(count) => Report::ValuesSet {
                count,
                loot_total: campaign.loot_total(),
            },
            Err(_) => too_large("set value(s)"),
        },
    };
    Outcome::Report(report)
}

fn too_large(attempted: &'static str) -> Report {
    debug!("{attempted} refused: loot total would overflow");
    Report::Rejected(Rejection::new(vec![Issue::TotalTooLarge], attempted))
}
