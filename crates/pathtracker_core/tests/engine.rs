use pathtracker_core::{
    Action, Campaign, CampaignName, Issue, LootItem, MAX_QUANTITY, MemoryStore, Outcome, Report,
    ResolveError, Session, Step, XpReward, dispatch, parse_line,
};

fn session() -> Session<MemoryStore> {
    let name = CampaignName::new("test").expect("valid campaign name");
    Session::open(MemoryStore::new(), name).expect("memory store always loads")
}

fn run(session: &mut Session<MemoryStore>, line: &str) -> Report {
    match session.execute(line) {
        Step::Continue(Some(report)) => report,
        other => panic!("expected a report for {line:?}, got {other:?}"),
    }
}

fn resolve(line: &str) -> Result<Action, ResolveError> {
    let raw = parse_line(line)
        .expect("line should parse")
        .expect("line should not be blank");
    Action::from_raw(&raw)
}

fn rejected_issues(report: Report) -> Vec<Issue> {
    match report {
        Report::Rejected(rejection) => rejection.issues,
        other => panic!("expected a rejection, got {other:?}"),
    }
}

fn expected_loot_total(campaign: &Campaign) -> f64 {
    campaign.money()
        + campaign
            .items()
            .iter()
            .filter_map(|item| item.value)
            .map(|v| v / 2.0)
            .sum::<f64>()
}

fn expected_xp_total(campaign: &Campaign) -> u64 {
    campaign.rewards().iter().map(|r| r.value).sum()
}

#[test]
fn add_loot_with_value_and_quantity_creates_independent_records() {
    let mut s = session();
    let report = run(&mut s, r#"addLoot "Longsword of Doom" -v 150 -q 2"#);

    assert_eq!(
        report,
        Report::LootAdded {
            name: "Longsword of Doom".into(),
            quantity: 2,
            loot_total: 150.0,
        }
    );
    assert_eq!(
        s.campaign().items(),
        &[
            LootItem::new("Longsword of Doom", Some(150.0)),
            LootItem::new("Longsword of Doom", Some(150.0)),
        ]
    );
    assert_eq!(s.campaign().loot_total(), 150.0);
}

#[test]
fn add_loot_without_value_leaves_total_unchanged() {
    let mut s = session();
    run(&mut s, "addLoot Torch -q 3");

    assert_eq!(s.campaign().items().len(), 3);
    assert!(s.campaign().items().iter().all(|i| i.value.is_none()));
    assert_eq!(s.campaign().loot_total(), 0.0);
}

#[test]
fn loot_total_tracks_every_mutation() {
    let mut s = session();
    let lines = [
        "addLoot Gem -v 100",
        "addMoney 12.5",
        "addLoot Torch",
        "addLoot Potion -v 50 -q 4",
        "addMoney 3 -q 2",
        "setLootValue Torch 8",
        "addLoot Rope -v 1",
        "setLootValue Gem 0",
    ];
    for line in lines {
        run(&mut s, line);
        assert_eq!(
            s.campaign().loot_total(),
            expected_loot_total(s.campaign()),
            "after {line:?}"
        );
    }
    assert_eq!(s.campaign().money(), 18.5);
}

#[test]
fn xp_total_tracks_every_mutation() {
    let mut s = session();
    for line in ["addXP 100", "addXP 25 -q 4", "addXP 0", "addXP 7 -d trap"] {
        run(&mut s, line);
        assert_eq!(
            s.campaign().xp_total(),
            expected_xp_total(s.campaign()),
            "after {line:?}"
        );
    }
    assert_eq!(s.campaign().xp_total(), 207);
}

#[test]
fn add_xp_with_description_and_quantity() {
    let mut s = session();
    let report = run(&mut s, r#"addXP 50 -d "goblin ambush" -q 3"#);

    assert_eq!(
        report,
        Report::XpAdded {
            amount: 150,
            xp_total: 150,
        }
    );
    let expected = XpReward::new(50, Some("goblin ambush".into()));
    assert_eq!(s.campaign().rewards(), &[expected.clone(), expected.clone(), expected]);
}

#[test]
fn add_money_quantity_scales_a_single_amount() {
    let mut s = session();
    let report = run(&mut s, "addMoney 2.5 -q 4");

    assert_eq!(
        report,
        Report::MoneyAdded {
            amount: 10.0,
            loot_total: 10.0,
        }
    );
    assert_eq!(s.campaign().money(), 10.0);
    assert!(s.campaign().items().is_empty());
}

#[test]
fn invalid_flag_value_aborts_the_whole_add() {
    let mut s = session();
    let issues = rejected_issues(run(&mut s, "addLoot Gem -v lots -q 2"));

    assert_eq!(issues, vec![Issue::FlagNotNumber { flag: "v".into() }]);
    assert!(s.campaign().items().is_empty());
    assert_eq!(s.campaign().loot_total(), 0.0);
}

#[test]
fn every_flag_problem_is_reported_at_once() {
    let issues = match resolve("addLoot Gem -v -q x -z 1") {
        Err(ResolveError::Rejected(rejection)) => {
            assert_eq!(
                rejection.summary(),
                "Could not add item due to one or more errors. Please try again."
            );
            rejection.issues
        }
        other => panic!("expected a rejection, got {other:?}"),
    };

    assert_eq!(
        issues,
        vec![
            Issue::FlagArity {
                flag: "v".into(),
                what: "item value",
            },
            Issue::FlagNotInteger { flag: "q".into() },
            Issue::UnknownFlag { flag: "z".into() },
        ]
    );
}

#[test]
fn add_loot_requires_exactly_one_name() {
    let mut s = session();
    assert_eq!(
        rejected_issues(run(&mut s, "addLoot")),
        vec![Issue::WrongArgCount { expected: "item" }]
    );
    assert_eq!(
        rejected_issues(run(&mut s, "addLoot Long sword")),
        vec![Issue::WrongArgCount { expected: "item" }]
    );
    assert!(s.campaign().items().is_empty());
}

#[test]
fn add_xp_rejects_non_integer_values() {
    let mut s = session();
    assert_eq!(
        rejected_issues(run(&mut s, "addXP 12.5")),
        vec![Issue::InvalidXpValue]
    );
    assert_eq!(
        rejected_issues(run(&mut s, r#"addXP 10 -d one two"#)),
        vec![Issue::FlagArity {
            flag: "d".into(),
            what: "XP source description",
        }]
    );
    assert!(s.campaign().rewards().is_empty());
}

#[test]
fn add_money_rejects_bad_amounts_and_flags() {
    let mut s = session();
    assert_eq!(
        rejected_issues(run(&mut s, "addMoney ten")),
        vec![Issue::InvalidMoneyValue]
    );
    assert_eq!(
        rejected_issues(run(&mut s, "addMoney 10 -v 3")),
        vec![Issue::UnknownFlag { flag: "v".into() }]
    );
    assert_eq!(s.campaign().money(), 0.0);
}

#[test]
fn negative_looking_numbers_become_flags() {
    let mut s = session();
    assert_eq!(
        rejected_issues(run(&mut s, "addMoney -5")),
        vec![
            Issue::WrongArgCount {
                expected: "monetary value",
            },
            Issue::UnknownFlag { flag: "5".into() },
        ]
    );
    assert_eq!(
        rejected_issues(run(&mut s, r#"addXP "-5""#)),
        vec![
            Issue::WrongArgCount {
                expected: "XP value",
            },
            Issue::UnknownFlag { flag: "5".into() },
        ]
    );
}

#[test]
fn repeated_flags_use_the_last_valid_occurrence() {
    let mut s = session();
    run(&mut s, "addLoot Gem -v 10 -v 30");
    assert_eq!(s.campaign().items()[0].value, Some(30.0));
}

#[test]
fn list_loot_sorts_by_value_and_warns_on_args() {
    let mut s = session();
    run(&mut s, "addLoot Torch");
    run(&mut s, "addLoot Dagger -v 2");
    run(&mut s, "addLoot Crown -v 500");
    run(&mut s, "addLoot Coin -v 2");
    run(&mut s, "addMoney 4");

    match run(&mut s, "listLoot everything") {
        Report::LootListing {
            warnings,
            items,
            money,
            loot_total,
        } => {
            assert_eq!(
                warnings,
                vec![Issue::UnexpectedArgs {
                    command: "listLoot"
                }]
            );
            let names: Vec<&str> = items.iter().map(|i| i.name.as_str()).collect();
            assert_eq!(names, vec!["Crown", "Dagger", "Coin", "Torch"]);
            assert_eq!(money, 4.0);
            assert_eq!(loot_total, 256.0);
        }
        other => panic!("expected a loot listing, got {other:?}"),
    }
}

#[test]
fn list_xp_keeps_storage_order() {
    let mut s = session();
    run(&mut s, "addXP 10 -d rats");
    run(&mut s, "addXP 400");
    run(&mut s, "addXP 20 -d bandits");

    match run(&mut s, "listXP") {
        Report::XpListing {
            warnings,
            rewards,
            xp_total,
        } => {
            assert!(warnings.is_empty());
            let values: Vec<u64> = rewards.iter().map(|r| r.value).collect();
            assert_eq!(values, vec![10, 400, 20]);
            assert_eq!(xp_total, 430);
        }
        other => panic!("expected an XP listing, got {other:?}"),
    }
}

#[test]
fn cash_out_sells_valued_items_and_keeps_unvalued_ones() {
    let mut s = session();
    run(&mut s, "addLoot Gem -v 100");
    run(&mut s, "addLoot Torch");
    run(&mut s, "addLoot Ring -v 300");
    run(&mut s, "addMoney 50");

    match run(&mut s, "cashOut -n 4") {
        Report::CashedOut { liquidation, share } => {
            let sold: Vec<&str> = liquidation.sold.iter().map(|i| i.name.as_str()).collect();
            assert_eq!(sold, vec!["Ring", "Gem"]);
            assert_eq!(liquidation.money, 50.0);
            assert_eq!(liquidation.total, 250.0);
            assert_eq!(liquidation.unsold_remaining, 1);
            assert_eq!(share, 62.5);
        }
        other => panic!("expected a cash out, got {other:?}"),
    }

    match run(&mut s, "listLoot") {
        Report::LootListing {
            items,
            money,
            loot_total,
            ..
        } => {
            assert_eq!(items, vec![LootItem::new("Torch", None)]);
            assert_eq!(money, 0.0);
            assert_eq!(loot_total, 0.0);
        }
        other => panic!("expected a loot listing, got {other:?}"),
    }
}

#[test]
fn cash_out_rejects_positional_args_and_zero_pcs() {
    let mut s = session();
    run(&mut s, "addMoney 10");

    assert_eq!(
        rejected_issues(run(&mut s, "cashOut now")),
        vec![Issue::UnexpectedArgs { command: "cashOut" }]
    );
    assert_eq!(
        rejected_issues(run(&mut s, "cashOut -n 0")),
        vec![Issue::FlagNotInteger { flag: "n".into() }]
    );
    assert_eq!(s.campaign().money(), 10.0);
}

#[test]
fn award_xp_splits_and_clears_the_log() {
    let mut s = session();
    run(&mut s, "addXP 100 -q 3");

    match run(&mut s, "awardXP -n 4") {
        Report::XpAwarded { award, share } => {
            assert_eq!(award.rewards.len(), 3);
            assert_eq!(award.total, 300);
            assert_eq!(share, 75.0);
        }
        other => panic!("expected an XP award, got {other:?}"),
    }

    match run(&mut s, "listXP") {
        Report::XpListing {
            rewards, xp_total, ..
        } => {
            assert!(rewards.is_empty());
            assert_eq!(xp_total, 0);
        }
        other => panic!("expected an XP listing, got {other:?}"),
    }
}

#[test]
fn set_loot_value_updates_every_matching_item() {
    let mut s = session();
    run(&mut s, "addLoot Torch -v 4");
    run(&mut s, "addLoot Torch -v 6");
    run(&mut s, "addLoot Torch");
    run(&mut s, "addLoot Gem -v 20");
    let before = s.campaign().loot_total();

    let report = run(&mut s, "setLootValue Torch 0");

    assert_eq!(
        report,
        Report::ValuesSet {
            count: 3,
            loot_total: before - (4.0 + 6.0) / 2.0,
        }
    );
    let torches: Vec<Option<f64>> = s
        .campaign()
        .items()
        .iter()
        .filter(|i| i.name == "Torch")
        .map(|i| i.value)
        .collect();
    assert_eq!(torches, vec![Some(0.0); 3]);
}

#[test]
fn set_loot_value_with_no_match_reports_zero() {
    let mut s = session();
    run(&mut s, "addLoot Gem -v 20");
    assert_eq!(
        run(&mut s, r#"setLootValue "gem" 5"#),
        Report::ValuesSet {
            count: 0,
            loot_total: 10.0,
        }
    );
}

#[test]
fn set_loot_value_validates_args_and_flags() {
    let mut s = session();
    assert_eq!(
        rejected_issues(run(&mut s, "setLootValue Torch")),
        vec![Issue::SetValueArity]
    );
    assert_eq!(
        rejected_issues(run(&mut s, "setLootValue Torch cheap -v 1")),
        vec![Issue::SetValueNotNumber, Issue::SetValueFlags]
    );
}

#[test]
fn parse_errors_do_not_touch_state() {
    let mut s = session();
    let report = run(&mut s, r#"addLoot "Gem -v 10"#);
    assert!(matches!(report, Report::ParseFailed(_)));
    assert!(s.campaign().items().is_empty());
}

#[test]
fn unknown_and_blank_lines() {
    let mut s = session();
    assert_eq!(
        run(&mut s, "addloot Gem"),
        Report::UnknownCommand("addloot".into())
    );
    assert_eq!(s.execute("   "), Step::Continue(None));
}

#[test]
fn quit_aliases_end_the_session() {
    let mut s = session();
    for line in ["quit", "exit", "q", "q now -f"] {
        assert_eq!(s.execute(line), Step::Quit);
    }
}

#[test]
fn save_writes_through_the_store() {
    let mut s = session();
    run(&mut s, "addLoot Gem -v 10");
    assert_eq!(run(&mut s, "save"), Report::Saved);

    let name = CampaignName::new("test").expect("valid campaign name");
    let saved = s.store().saved(&name).expect("campaign should be saved");
    assert_eq!(saved.items(), s.campaign().items());
}

#[test]
fn dispatch_reports_save_and_quit_to_the_caller() {
    let mut campaign = Campaign::default();
    assert_eq!(dispatch(Action::Save, &mut campaign), Outcome::Save);
    assert_eq!(dispatch(Action::Quit, &mut campaign), Outcome::Quit);
}

/// `10^308` written out in digits; finite, but ten of them are not.
fn near_max() -> String {
    format!("1{}", "0".repeat(308))
}

#[test]
fn scaled_money_that_overflows_is_rejected() {
    let mut s = session();
    let line = format!("addMoney {} -q 10", near_max());

    assert_eq!(rejected_issues(run(&mut s, &line)), vec![Issue::AmountTooLarge]);
    assert_eq!(s.campaign().money(), 0.0);
    assert_eq!(s.campaign().loot_total(), 0.0);
}

#[test]
fn money_total_never_becomes_infinite() {
    let mut s = session();
    let line = format!("addMoney {}", near_max());
    run(&mut s, &line);
    let before = s.campaign().clone();

    assert_eq!(rejected_issues(run(&mut s, &line)), vec![Issue::TotalTooLarge]);
    assert_eq!(s.campaign(), &before);
    assert!(s.campaign().loot_total().is_finite());
}

#[test]
fn loot_that_would_overflow_the_total_is_not_added() {
    let mut s = session();
    let line = format!("addLoot Gem -v {} -q 4", near_max());

    match run(&mut s, &line) {
        Report::Rejected(rejection) => {
            assert_eq!(rejection.issues, vec![Issue::TotalTooLarge]);
            assert_eq!(
                rejection.summary(),
                "Could not add item due to one or more errors. Please try again."
            );
        }
        other => panic!("expected a rejection, got {other:?}"),
    }
    assert!(s.campaign().items().is_empty());
}

#[test]
fn set_loot_value_that_would_overflow_leaves_values_alone() {
    let mut s = session();
    run(&mut s, "addLoot Gem -v 10 -q 4");
    let line = format!("setLootValue Gem {}", near_max());

    assert_eq!(rejected_issues(run(&mut s, &line)), vec![Issue::TotalTooLarge]);
    assert!(s.campaign().items().iter().all(|item| item.value == Some(10.0)));
    assert_eq!(s.campaign().loot_total(), 20.0);
}

#[test]
fn quantity_is_capped() {
    let mut s = session();
    let line = format!("addLoot Torch -q {}", u64::MAX);
    assert_eq!(
        rejected_issues(run(&mut s, &line)),
        vec![Issue::QuantityTooLarge {
            flag: "q".into(),
            max: MAX_QUANTITY,
        }]
    );
    assert_eq!(
        rejected_issues(run(&mut s, "addXP 5 -q 10001")),
        vec![Issue::QuantityTooLarge {
            flag: "q".into(),
            max: MAX_QUANTITY,
        }]
    );
    assert!(s.campaign().items().is_empty());
    assert!(s.campaign().rewards().is_empty());

    run(&mut s, &format!("addLoot Torch -q {MAX_QUANTITY}"));
    assert_eq!(s.campaign().items().len() as u64, MAX_QUANTITY);
}

#[test]
fn campaign_refuses_non_finite_money_directly() {
    let mut campaign = Campaign::default();
    campaign.add_money(f64::MAX).expect("finite total");
    assert!(campaign.add_money(f64::MAX).is_err());
    assert_eq!(campaign.money(), f64::MAX);
}
