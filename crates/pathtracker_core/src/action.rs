//! Validation of raw commands into typed actions.
//!
//! Every flag of a command is inspected before deciding whether the command
//! can run, so a single invocation can report several problems at once.
//! When a flag is repeated, each occurrence is validated and the last valid
//! one wins.

use thiserror::Error;

use crate::campaign::{LootItem, XpReward};
use crate::command::{Flag, RawCommand};
use crate::numeric::{parse_amount, parse_count};

/// Upper bound for `-q` on `addLoot` and `addXP`; every unit is stored as
/// its own entry.
pub const MAX_QUANTITY: u64 = 10_000;

/// A validated command, ready to dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Quit,
    Save,
    AddLoot { item: LootItem, quantity: u64 },
    AddXp { reward: XpReward, quantity: u64 },
    AddMoney { amount: f64 },
    ListLoot { warnings: Vec<Issue> },
    ListXp { warnings: Vec<Issue> },
    CashOut { pcs: u64 },
    AwardXp { pcs: u64 },
    SetLootValue { name: String, value: f64 },
}

/// A single validation problem, displayed verbatim to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Issue {
    #[error(
        "Unexpected number of arguments. Please specify exactly one {expected} and any relevant flags."
    )]
    WrongArgCount { expected: &'static str },
    #[error("XP value must be a positive integer")]
    InvalidXpValue,
    #[error("Monetary value must be a positive number.")]
    InvalidMoneyValue,
    #[error("The -{flag} flag expects exactly one argument for {what}.")]
    FlagArity { flag: String, what: &'static str },
    #[error("The -{flag} flag expects a positive number.")]
    FlagNotNumber { flag: String },
    #[error("The -{flag} flag expects a positive integer.")]
    FlagNotInteger { flag: String },
    #[error("The -{flag} flag cannot exceed {max}.")]
    QuantityTooLarge { flag: String, max: u64 },
    #[error("Monetary value is too large.")]
    AmountTooLarge,
    #[error("That would make the total sell value too large to track.")]
    TotalTooLarge,
    #[error("Unknown flag: -{flag}.")]
    UnknownFlag { flag: String },
    #[error("{command} takes no arguments, only optional flags.")]
    UnexpectedArgs { command: &'static str },
    #[error("setLootValue takes exactly two arguments: item name and value.")]
    SetValueArity,
    #[error("The second argument must be a positive numeric value.")]
    SetValueNotNumber,
    #[error("setLootValue doesn't take any flags.")]
    SetValueFlags,
}

/// Why a command was not run, with every issue found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub issues: Vec<Issue>,
    attempted: &'static str,
}

impl Rejection {
    pub(crate) fn new(issues: Vec<Issue>, attempted: &'static str) -> Self {
        Self { issues, attempted }
    }

    /// The closing line printed after the individual issues.
    pub fn summary(&self) -> String {
        format!(
            "Could not {} due to one or more errors. Please try again.",
            self.attempted
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    Unknown(String),
    Rejected(Rejection),
}

impl Action {
    pub fn from_raw(raw: &RawCommand) -> Result<Self, ResolveError> {
        match raw.name.as_str() {
            "quit" | "exit" | "q" => Ok(Self::Quit),
            "save" => Ok(Self::Save),
            "addLoot" => resolve_add_loot(raw),
            "addXP" => resolve_add_xp(raw),
            "addMoney" => resolve_add_money(raw),
            "listLoot" => Ok(Self::ListLoot {
                warnings: stray_args(raw, "listLoot"),
            }),
            "listXP" => Ok(Self::ListXp {
                warnings: stray_args(raw, "listXP"),
            }),
            "cashOut" => resolve_split(raw, "cashOut", "cash out").map(|pcs| Self::CashOut { pcs }),
            "awardXP" => resolve_split(raw, "awardXP", "award XP").map(|pcs| Self::AwardXp { pcs }),
            "setLootValue" => resolve_set_loot_value(raw),
            other => Err(ResolveError::Unknown(other.to_string())),
        }
    }
}

fn finish(
    action: Action,
    issues: Vec<Issue>,
    attempted: &'static str,
) -> Result<Action, ResolveError> {
    if issues.is_empty() {
        Ok(action)
    } else {
        Err(ResolveError::Rejected(Rejection::new(issues, attempted)))
    }
}

fn resolve_add_loot(raw: &RawCommand) -> Result<Action, ResolveError> {
    let mut issues = Vec::new();
    if raw.args.len() != 1 {
        issues.push(Issue::WrongArgCount { expected: "item" });
    }

    let mut value = None;
    let mut quantity = 1;
    for flag in &raw.flags {
        match flag.id.as_str() {
            "v" => {
                if let Some(v) = flag_amount(flag, "item value", &mut issues) {
                    value = Some(v);
                }
            }
            "q" => {
                if let Some(q) = flag_quantity(flag, &mut issues) {
                    quantity = q;
                }
            }
            _ => issues.push(unknown_flag(flag)),
        }
    }

    let name = raw.args.first().cloned().unwrap_or_default();
    finish(
        Action::AddLoot {
            item: LootItem::new(name, value),
            quantity,
        },
        issues,
        "add item",
    )
}

fn resolve_add_xp(raw: &RawCommand) -> Result<Action, ResolveError> {
    let mut issues = Vec::new();
    let mut value = 0;
    match raw.args.as_slice() {
        [arg] => match parse_count(arg) {
            Ok(v) => value = v,
            Err(_) => issues.push(Issue::InvalidXpValue),
        },
        _ => issues.push(Issue::WrongArgCount {
            expected: "XP value",
        }),
    }

    let mut description = None;
    let mut quantity = 1;
    for flag in &raw.flags {
        match flag.id.as_str() {
            "d" => match flag.single_arg() {
                Some(text) => description = Some(text.to_string()),
                None => issues.push(Issue::FlagArity {
                    flag: flag.id.clone(),
                    what: "XP source description",
                }),
            },
            "q" => {
                if let Some(q) = flag_quantity(flag, &mut issues) {
                    quantity = q;
                }
            }
            _ => issues.push(unknown_flag(flag)),
        }
    }

    finish(
        Action::AddXp {
            reward: XpReward::new(value, description),
            quantity,
        },
        issues,
        "add XP",
    )
}

fn resolve_add_money(raw: &RawCommand) -> Result<Action, ResolveError> {
    let mut issues = Vec::new();
    let mut amount = 0.0;
    match raw.args.as_slice() {
        [arg] => match parse_amount(arg) {
            Ok(v) => amount = v,
            Err(_) => issues.push(Issue::InvalidMoneyValue),
        },
        _ => issues.push(Issue::WrongArgCount {
            expected: "monetary value",
        }),
    }

    let mut multiplier = 1;
    for flag in &raw.flags {
        match flag.id.as_str() {
            "q" => {
                if let Some(q) = flag_count(flag, "item quantity", &mut issues) {
                    multiplier = q;
                }
            }
            _ => issues.push(unknown_flag(flag)),
        }
    }

    let amount = amount * multiplier as f64;
    if !amount.is_finite() {
        issues.push(Issue::AmountTooLarge);
    }
    finish(Action::AddMoney { amount }, issues, "add money")
}

/// Shared validation for `cashOut` and `awardXP`: no positional arguments
/// and an optional `-n` party size.
fn resolve_split(
    raw: &RawCommand,
    command: &'static str,
    attempted: &'static str,
) -> Result<u64, ResolveError> {
    let mut issues = stray_args(raw, command);

    let mut pcs = 1;
    for flag in &raw.flags {
        match flag.id.as_str() {
            "n" => match flag_count(flag, "number of PCs", &mut issues) {
                Some(0) => issues.push(Issue::FlagNotInteger {
                    flag: flag.id.clone(),
                }),
                Some(n) => pcs = n,
                None => {}
            },
            _ => issues.push(unknown_flag(flag)),
        }
    }

    if issues.is_empty() {
        Ok(pcs)
    } else {
        Err(ResolveError::Rejected(Rejection::new(issues, attempted)))
    }
}

fn resolve_set_loot_value(raw: &RawCommand) -> Result<Action, ResolveError> {
    let mut issues = Vec::new();
    let mut value = 0.0;
    match raw.args.as_slice() {
        [_, text] => match parse_amount(text) {
            Ok(v) => value = v,
            Err(_) => issues.push(Issue::SetValueNotNumber),
        },
        _ => issues.push(Issue::SetValueArity),
    }
    if !raw.flags.is_empty() {
        issues.push(Issue::SetValueFlags);
    }

    let name = raw.args.first().cloned().unwrap_or_default();
    finish(Action::SetLootValue { name, value }, issues, "set value(s)")
}

fn stray_args(raw: &RawCommand, command: &'static str) -> Vec<Issue> {
    if raw.args.is_empty() {
        Vec::new()
    } else {
        vec![Issue::UnexpectedArgs { command }]
    }
}

fn unknown_flag(flag: &Flag) -> Issue {
    Issue::UnknownFlag {
        flag: flag.id.clone(),
    }
}

fn flag_amount(flag: &Flag, what: &'static str, issues: &mut Vec<Issue>) -> Option<f64> {
    let Some(text) = flag.single_arg() else {
        issues.push(Issue::FlagArity {
            flag: flag.id.clone(),
            what,
        });
        return None;
    };
    match parse_amount(text) {
        Ok(v) => Some(v),
        Err(_) => {
            issues.push(Issue::FlagNotNumber {
                flag: flag.id.clone(),
            });
            None
        }
    }
}

fn flag_count(flag: &Flag, what: &'static str, issues: &mut Vec<Issue>) -> Option<u64> {
    let Some(text) = flag.single_arg() else {
        issues.push(Issue::FlagArity {
            flag: flag.id.clone(),
            what,
        });
        return None;
    };
    match parse_count(text) {
        Ok(v) => Some(v),
        Err(_) => {
            issues.push(Issue::FlagNotInteger {
                flag: flag.id.clone(),
            });
            None
        }
    }
}

fn flag_quantity(flag: &Flag, issues: &mut Vec<Issue>) -> Option<u64> {
    let quantity = flag_count(flag, "item quantity", issues)?;
    if quantity > MAX_QUANTITY {
        issues.push(Issue::QuantityTooLarge {
            flag: flag.id.clone(),
            max: MAX_QUANTITY,
        });
        return None;
    }
    Some(quantity)
}
