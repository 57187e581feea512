mod common;

use common::{close, peso_month, setup_app};
use finanzapp::{
    core::{conversion::round_cents, CategoryDraft, EntryDraft, EstimateDraft},
    domain::{Amounted, EntryRemoval, Flow},
};

#[test]
fn create_record_and_reprice_month() {
    let app = setup_app();
    app.create_month(2024, 3, peso_month(1000.0))
        .expect("create month");

    let month = app.month(2024, 3).expect("read").expect("month exists");
    assert!(month.incomes().is_empty());
    assert!(month.expenses().is_empty());
    assert_eq!(month.income_est, 500.0);

    let placement = app
        .add_entry(
            2024,
            3,
            Flow::Income,
            None,
            EntryDraft::local("Sueldo", 100_000.0, "2024-03-01"),
        )
        .expect("add income");
    let month = app.month(2024, 3).unwrap().unwrap();
    let income = month.category(Flow::Income, &placement.category_id).unwrap();
    assert_eq!(round_cents(income.amount_usd()), 100.0);

    app.apply_rate(2024, 3, 1200.0).expect("apply rate");

    let month = app.month(2024, 3).unwrap().unwrap();
    let income = month.category(Flow::Income, &placement.category_id).unwrap();
    assert_eq!(income.amount_local(), 100_000.0);
    assert_eq!(round_cents(income.amount_usd()), 83.33);
}

#[test]
fn invalid_input_changes_nothing() {
    let app = setup_app();
    app.create_month(2024, 3, peso_month(1000.0)).unwrap();
    let before = app.month(2024, 3).unwrap();

    let err = app.apply_rate(2024, 3, 0.0).expect_err("zero rate");
    assert!(err.is_validation());
    let err = app
        .add_entry(2024, 3, Flow::Expense, None, EntryDraft::local("", 10.0, "2024-03-01"))
        .expect_err("blank description");
    assert!(err.is_validation());
    assert!(app.month(2024, 13).is_err());
    assert!(app.create_month(2024, 3, peso_month(-5.0)).is_err());

    assert_eq!(app.month(2024, 3).unwrap(), before);
}

#[test]
fn duplicate_create_is_rejected_with_reason() {
    let app = setup_app();
    app.create_month(2024, 3, peso_month(1000.0)).unwrap();

    let err = app
        .create_month(2024, 3, peso_month(900.0))
        .expect_err("month already exists");
    assert!(err.is_validation());
    assert!(err.user_message().contains("2024-03"));
    assert_eq!(app.month(2024, 3).unwrap().unwrap().rate().value(), 1000.0);
}

#[test]
fn legacy_value_survives_itemizing_and_last_entry_removes_category() {
    let app = setup_app();
    app.create_month(2024, 5, peso_month(500.0)).unwrap();

    let category_id = app
        .add_category(
            2024,
            5,
            Flow::Expense,
            CategoryDraft {
                description: "Servicios".into(),
                amount_local: 10_000.0,
                date: None,
            },
        )
        .unwrap();
    let placement = app
        .add_entry(
            2024,
            5,
            Flow::Expense,
            Some(&category_id),
            EntryDraft::local("Luz", 2_500.0, "2024-05-10"),
        )
        .unwrap();
    assert!(!placement.new_category);

    let month = app.month(2024, 5).unwrap().unwrap();
    let category = month.category(Flow::Expense, &category_id).unwrap();
    assert_eq!(category.amount_local(), 12_500.0);
    assert!(close(category.amount_usd(), 25.0));
    let legacy = &category.sub_entries().unwrap()[0];
    assert_eq!(legacy.id.as_str(), format!("legacy-{category_id}"));
    assert_eq!(legacy.date, "");

    let legacy_id = legacy.id.clone();
    assert_eq!(
        app.remove_entry(2024, 5, Flow::Expense, &category_id, &legacy_id)
            .unwrap(),
        EntryRemoval::CategoryKept { remaining: 1 }
    );
    assert_eq!(
        app.remove_entry(2024, 5, Flow::Expense, &category_id, &placement.entry_id)
            .unwrap(),
        EntryRemoval::CategoryRemoved
    );
    assert!(app.month(2024, 5).unwrap().unwrap().expenses().is_empty());
}

#[test]
fn estimates_balance_and_yearly_trend() {
    let app = setup_app();
    app.create_month(2024, 1, peso_month(100.0)).unwrap();
    app.create_month(2024, 2, peso_month(100.0)).unwrap();

    let items = app
        .submit_estimate(
            2024,
            1,
            &[
                EstimateDraft::new("Alquiler", "120"),
                EstimateDraft::new("", "50"),
                EstimateDraft::new("Comida", "40"),
            ],
        )
        .unwrap();
    assert_eq!(items.len(), 2);
    assert!(app.set_expense_estimate(2024, 1, "10").is_err());

    app.add_entry(2024, 1, Flow::Income, None, EntryDraft::local("Sueldo", 30_000.0, "2024-01-05"))
        .unwrap();
    app.add_entry(2024, 1, Flow::Expense, None, EntryDraft::usd("Alquiler", 120.0, "2024-01-06"))
        .unwrap();
    app.add_entry(2024, 2, Flow::Income, None, EntryDraft::local("Sueldo", 30_000.0, "2024-02-05"))
        .unwrap();

    let balance = app.month_balance(2024, 1).unwrap();
    assert_eq!(balance.expense_est, 160.0);
    assert_eq!(balance.real_income_usd, 300.0);
    assert_eq!(balance.real_expense_local, 12_000.0);
    assert_eq!(balance.balance_usd, 180.0);

    let trend = app.year_trend(2024).unwrap();
    assert_eq!(trend.monthly[1].income, 300.0);
    assert_eq!(trend.accumulated[1].balance, 480.0);
    assert_eq!(trend.accumulated[11].balance, 480.0);

    assert_eq!(app.years().unwrap(), vec![2024]);
    assert_eq!(app.months(2024).unwrap(), vec![2, 1]);
    let (latest, _) = app.latest_month().unwrap().expect("latest month");
    assert_eq!((latest.year(), latest.month()), (2024, 2));
}

#[test]
fn currency_lookup_falls_back_to_suggestions() {
    let app = setup_app();
    let found = app.find_currencies("ars");
    assert_eq!(found[0].code, "ARS");
    let fuzzy = app.find_currencies("Pezo");
    assert!(fuzzy.iter().all(|c| c.name.starts_with("Peso")));
    assert!(!fuzzy.is_empty());
}
