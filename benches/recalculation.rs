use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use finanzapp::{
    core::{BudgetRepository, MemoryStore, RateService, SummaryService},
    domain::{
        BudgetMonth, Currency, ExchangeRate, FinanceDocument, Flow, MonthKey, SubEntry,
        TransactionCategory,
    },
};

fn build_sample_month(categories: usize, entries_per_category: usize) -> BudgetMonth {
    let rate = ExchangeRate::new(1000.0).expect("rate");
    let mut month = BudgetMonth::new(Currency::new("Peso", "ARS"), rate, 0.0, 0.0, Vec::new());

    for idx in 0..categories {
        let flow = if idx % 4 == 0 { Flow::Income } else { Flow::Expense };
        if idx % 5 == 0 {
            month.upsert_category(
                flow,
                TransactionCategory::simple(format!("Simple {idx}"), 1_000.0 * idx as f64, rate, None),
            );
            continue;
        }
        let first = SubEntry::new("Entry 0", 1_500.0, rate, "2024-03-01");
        let mut category = TransactionCategory::itemized(format!("Category {idx}"), first);
        for entry in 1..entries_per_category {
            let local = 100.0 + (entry % 50) as f64 * 37.5;
            category.upsert_entry(SubEntry::new(format!("Entry {entry}"), local, rate, "2024-03-02"));
        }
        month.upsert_category(flow, category);
    }
    month
}

fn bench_rate_change(c: &mut Criterion) {
    let month = build_sample_month(200, 50);

    c.bench_function("apply_rate_10k_entries", |b| {
        b.iter_batched(
            || month.clone(),
            |mut month| {
                RateService::apply(&mut month, black_box(1234.5)).expect("apply rate");
                black_box(month);
            },
            BatchSize::LargeInput,
        )
    });
}

fn bench_year_trend(c: &mut Criterion) {
    let mut document = FinanceDocument::new();
    for number in 1..=12 {
        let key = MonthKey::new(2024, number).expect("key");
        document.insert(key, build_sample_month(40, 20));
    }

    c.bench_function("year_trend_12_months", |b| {
        b.iter(|| black_box(SummaryService::year_trend(&document, 2024)))
    });
}

fn bench_repository_round_trip(c: &mut Criterion) {
    let repo = BudgetRepository::new(MemoryStore::new());
    let key = MonthKey::new(2024, 3).expect("key");
    repo.save_month(key, &build_sample_month(100, 20)).expect("seed");

    c.bench_function("update_month_rate_2k_entries", |b| {
        let mut rate = 1000.0;
        b.iter(|| {
            rate += 1.0;
            repo.update_month(key, |month| RateService::apply(month, rate))
                .expect("update month");
        })
    });
}

criterion_group!(
    benches,
    bench_rate_change,
    bench_year_trend,
    bench_repository_round_trip
);
criterion_main!(benches);
