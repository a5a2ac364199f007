use pathtracker_core::{Campaign, Issue, LootItem, Report, XpReward};
use serde_json::{Map as JsonMap, Value as JsonValue};

const NO_DESCRIPTION: &str = "no description included";

// ---------------------------------------------------------------------------
// Text output
// ---------------------------------------------------------------------------

/// Lines printed for a report, without the blank line that follows every
/// executed command.
pub fn render_text(report: &Report) -> Vec<String> {
    let mut out = Vec::new();

    match report {
        Report::LootAdded {
            name,
            quantity,
            loot_total,
        } => out.push(format!(
            "Added {quantity}x {name} to loot. Total sell value is now {}.",
            format_number(*loot_total)
        )),
        Report::XpAdded { amount, xp_total } => {
            out.push(format!("Added {amount} XP. Total XP is now {xp_total}."));
        }
        Report::MoneyAdded { amount, loot_total } => out.push(format!(
            "Added {} gp to loot. Total sell value is now {}.",
            format_number(*amount),
            format_number(*loot_total)
        )),
        Report::LootListing {
            warnings,
            items,
            money,
            loot_total,
        } => {
            push_issues(&mut out, warnings);
            out.extend(items.iter().map(loot_line));
            push_loot_summary(&mut out, *money, *loot_total);
        }
        Report::XpListing {
            warnings,
            rewards,
            xp_total,
        } => {
            push_issues(&mut out, warnings);
            out.extend(rewards.iter().map(reward_line));
            out.push(String::new());
            out.push(format!("Total: {xp_total} XP"));
        }
        Report::CashedOut { liquidation, share } => {
            out.extend(liquidation.sold.iter().map(loot_line));
            push_loot_summary(&mut out, liquidation.money, liquidation.total);
            out.push(String::new());
            out.push(format!("Each PC receives {} gp.", format_number(*share)));
            if liquidation.unsold_remaining > 0 {
                out.push("Some items had no value and could not be sold.".to_string());
            }
        }
        Report::XpAwarded { award, share } => {
            out.extend(award.rewards.iter().map(reward_line));
            out.push(String::new());
            out.push(format!("Total: {} XP", award.total));
            out.push(String::new());
            out.push(format!("Each PC receives {} XP.", format_number(*share)));
        }
        Report::ValuesSet { count, loot_total } => out.push(format!(
            "Successfully set value for {count} item(s). Total sell value updated to {} gp.",
            format_number(*loot_total)
        )),
        Report::Saved => {
            out.push("Saving data...".to_string());
            out.push("All data saved.".to_string());
        }
        Report::SaveFailed(err) => out.push(format!("Could not save data: {}", err.message)),
        Report::Rejected(rejection) => {
            push_issues(&mut out, &rejection.issues);
            out.push(rejection.summary());
        }
        Report::UnknownCommand(name) => out.push(format!("Unknown command: {name}")),
        Report::ParseFailed(err) => out.push(err.to_string()),
    }

    out
}

/// Lines printed once a campaign has been loaded.
pub fn render_load_summary(campaign: &Campaign) -> Vec<String> {
    vec![
        format!(
            "Loot loaded. Total sell value is currently {} gp.",
            format_number(campaign.loot_total())
        ),
        format!(
            "XP loaded. Total XP is currently {}.",
            campaign.xp_total()
        ),
    ]
}

/// Shortest decimal form that round-trips: `150`, `75.5`, `0.25`.
pub fn format_number(value: f64) -> String {
    format!("{value}")
}

fn push_issues(out: &mut Vec<String>, issues: &[Issue]) {
    out.extend(issues.iter().map(Issue::to_string));
}

fn push_loot_summary(out: &mut Vec<String>, money: f64, total: f64) {
    out.push(String::new());
    out.push(format!("Money: {} gp", format_number(money)));
    out.push(format!("Total value: {} gp", format_number(total)));
}

fn loot_line(item: &LootItem) -> String {
    match item.value {
        Some(value) => format!("{}: {} gp", item.name, format_number(value)),
        None => item.name.clone(),
    }
}

fn reward_line(reward: &XpReward) -> String {
    format!(
        "{} XP ({})",
        reward.value,
        reward.description.as_deref().unwrap_or(NO_DESCRIPTION)
    )
}

// ---------------------------------------------------------------------------
// JSON output
// ---------------------------------------------------------------------------

/// One JSON object per report, tagged with a `kind` key.
pub fn render_json(report: &Report) -> JsonValue {
    let mut out = JsonMap::new();

    match report {
        Report::LootAdded {
            name,
            quantity,
            loot_total,
        } => {
            insert_kind(&mut out, "loot_added");
            out.insert("name".to_string(), JsonValue::String(name.clone()));
            out.insert("quantity".to_string(), JsonValue::from(*quantity));
            out.insert("loot_total".to_string(), JsonValue::from(*loot_total));
        }
        Report::XpAdded { amount, xp_total } => {
            insert_kind(&mut out, "xp_added");
            out.insert("amount".to_string(), JsonValue::from(*amount));
            out.insert("xp_total".to_string(), JsonValue::from(*xp_total));
        }
        Report::MoneyAdded { amount, loot_total } => {
            insert_kind(&mut out, "money_added");
            out.insert("amount".to_string(), JsonValue::from(*amount));
            out.insert("loot_total".to_string(), JsonValue::from(*loot_total));
        }
        Report::LootListing {
            warnings,
            items,
            money,
            loot_total,
        } => {
            insert_kind(&mut out, "loot_listing");
            out.insert("warnings".to_string(), issues_to_json(warnings));
            out.insert("items".to_string(), items_to_json(items));
            out.insert("money".to_string(), JsonValue::from(*money));
            out.insert("loot_total".to_string(), JsonValue::from(*loot_total));
        }
        Report::XpListing {
            warnings,
            rewards,
            xp_total,
        } => {
            insert_kind(&mut out, "xp_listing");
            out.insert("warnings".to_string(), issues_to_json(warnings));
            out.insert("rewards".to_string(), rewards_to_json(rewards));
            out.insert("xp_total".to_string(), JsonValue::from(*xp_total));
        }
        Report::CashedOut { liquidation, share } => {
            insert_kind(&mut out, "cashed_out");
            out.insert("sold".to_string(), items_to_json(&liquidation.sold));
            out.insert("money".to_string(), JsonValue::from(liquidation.money));
            out.insert("total".to_string(), JsonValue::from(liquidation.total));
            out.insert("share".to_string(), JsonValue::from(*share));
            out.insert(
                "unsold_remaining".to_string(),
                JsonValue::from(liquidation.unsold_remaining),
            );
        }
        Report::XpAwarded { award, share } => {
            insert_kind(&mut out, "xp_awarded");
            out.insert("rewards".to_string(), rewards_to_json(&award.rewards));
            out.insert("total".to_string(), JsonValue::from(award.total));
            out.insert("share".to_string(), JsonValue::from(*share));
        }
        Report::ValuesSet { count, loot_total } => {
            insert_kind(&mut out, "values_set");
            out.insert("count".to_string(), JsonValue::from(*count));
            out.insert("loot_total".to_string(), JsonValue::from(*loot_total));
        }
        Report::Saved => insert_kind(&mut out, "saved"),
        Report::SaveFailed(err) => {
            insert_kind(&mut out, "save_failed");
            out.insert("error".to_string(), JsonValue::String(err.message.clone()));
        }
        Report::Rejected(rejection) => {
            insert_kind(&mut out, "rejected");
            out.insert("issues".to_string(), issues_to_json(&rejection.issues));
            out.insert("summary".to_string(), JsonValue::String(rejection.summary()));
        }
        Report::UnknownCommand(name) => {
            insert_kind(&mut out, "unknown_command");
            out.insert("command".to_string(), JsonValue::String(name.clone()));
        }
        Report::ParseFailed(err) => {
            insert_kind(&mut out, "parse_failed");
            out.insert("error".to_string(), JsonValue::String(err.to_string()));
        }
    }

    JsonValue::Object(out)
}

fn insert_kind(out: &mut JsonMap<String, JsonValue>, kind: &str) {
    out.insert("kind".to_string(), JsonValue::String(kind.to_string()));
}

fn issues_to_json(issues: &[Issue]) -> JsonValue {
    JsonValue::Array(
        issues
            .iter()
            .map(|issue| JsonValue::String(issue.to_string()))
            .collect(),
    )
}

fn items_to_json(items: &[LootItem]) -> JsonValue {
    JsonValue::Array(
        items
            .iter()
            .map(|item| {
                let mut obj = JsonMap::new();
                obj.insert("name".to_string(), JsonValue::String(item.name.clone()));
                obj.insert(
                    "value".to_string(),
                    item.value.map_or(JsonValue::Null, JsonValue::from),
                );
                JsonValue::Object(obj)
            })
            .collect(),
    )
}

fn rewards_to_json(rewards: &[XpReward]) -> JsonValue {
    JsonValue::Array(
        rewards
            .iter()
            .map(|reward| {
                let mut obj = JsonMap::new();
                obj.insert("value".to_string(), JsonValue::from(reward.value));
                obj.insert(
                    "description".to_string(),
                    reward
                        .description
                        .clone()
                        .map_or(JsonValue::Null, JsonValue::String),
                );
                JsonValue::Object(obj)
            })
            .collect(),
    )
}
