use analytics::{select_periods, SkipReason};
use chrono::NaiveDate;
use core_types::{FinancialStatement, FiscalPeriod, PeriodType, QuarterIndex};
use proptest::prelude::*;
use rust_decimal::Decimal;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Calendar-aligned quarter ending on the last day of its third month.
fn quarter(year: i32, q: u8) -> FinancialStatement {
    let end = match q {
        1 => date(year, 3, 31),
        2 => date(year, 6, 30),
        3 => date(year, 9, 30),
        _ => date(year, 12, 31),
    };
    let mut s = FinancialStatement::new(
        "ABC.L",
        FiscalPeriod::Quarter(QuarterIndex::new(year, q).unwrap()),
        end,
    );
    s.net_income = Some(Decimal::from(q));
    s
}

fn fiscal_year(year: i32) -> FinancialStatement {
    FinancialStatement::new("ABC.L", FiscalPeriod::FiscalYear(year), date(year, 12, 31))
}

#[test]
fn no_quarters_leaves_quarter_slots_empty() {
    let statements = vec![fiscal_year(2023)];
    let selected = select_periods(&statements);

    assert!(selected.latest_quarter.is_none());
    assert!(selected.previous_quarter.is_none());
    assert!(selected.trailing_quarters.is_none());
    assert_eq!(selected.latest_fiscal_year, Some(&statements[0]));
}

#[test]
fn single_quarter_has_no_previous_or_window() {
    let statements = vec![quarter(2023, 4)];
    let selected = select_periods(&statements);

    assert_eq!(selected.latest_quarter, Some(&statements[0]));
    assert!(selected.previous_quarter.is_none());
    assert!(selected.trailing_quarters.is_none());
}

#[test]
fn quarters_are_ordered_by_end_date_regardless_of_input_order() {
    let statements = vec![quarter(2023, 2), quarter(2023, 4), quarter(2023, 1), quarter(2023, 3)];
    let selected = select_periods(&statements);

    assert_eq!(selected.latest_quarter.unwrap().period_end, date(2023, 12, 31));
    assert_eq!(selected.previous_quarter.unwrap().period_end, date(2023, 9, 30));

    let window = selected.trailing_quarters.unwrap();
    let ends: Vec<NaiveDate> = window.iter().map(|s| s.period_end).collect();
    assert_eq!(
        ends,
        vec![date(2023, 12, 31), date(2023, 9, 30), date(2023, 6, 30), date(2023, 3, 31)]
    );
}

#[test]
fn four_quarters_with_a_gap_have_no_window() {
    // Q3 2023 is missing, so the four newest quarters are not consecutive.
    let statements = vec![quarter(2024, 1), quarter(2023, 4), quarter(2023, 2), quarter(2023, 1)];
    let selected = select_periods(&statements);

    assert!(selected.latest_quarter.is_some());
    assert!(selected.trailing_quarters.is_none());
}

#[test]
fn only_the_newest_four_quarters_form_the_window() {
    let statements = vec![
        quarter(2022, 4),
        quarter(2023, 1),
        quarter(2023, 2),
        quarter(2023, 3),
        quarter(2023, 4),
    ];
    let selected = select_periods(&statements);
    let window = selected.trailing_quarters.unwrap();
    assert_eq!(window[3].period_end, date(2023, 3, 31));
}

#[test]
fn unclassifiable_statements_are_skipped_and_recorded() {
    let odd = FinancialStatement::new("ABC.L", FiscalPeriod::Unclassifiable("H1".into()), date(2024, 6, 30));
    let statements = vec![quarter(2023, 4), odd];
    let selected = select_periods(&statements);

    assert_eq!(selected.latest_quarter.unwrap().period_end, date(2023, 12, 31));
    assert_eq!(selected.skipped.len(), 1);
    assert_eq!(
        selected.skipped[0].reason,
        SkipReason::Unclassifiable { label: "H1".into() }
    );
}

#[test]
fn duplicate_periods_exclude_every_copy() {
    let mut restated = quarter(2023, 4);
    restated.net_income = Some(Decimal::from(99));
    let statements = vec![quarter(2023, 4), restated, quarter(2023, 3)];
    let selected = select_periods(&statements);

    assert_eq!(selected.latest_quarter.unwrap().period_end, date(2023, 9, 30));
    assert!(selected.previous_quarter.is_none());
    assert_eq!(selected.skipped.len(), 2);
    assert!(selected.skipped.iter().all(|s| s.reason
        == SkipReason::DuplicatePeriod {
            period_type: PeriodType::Quarter,
            period_end: date(2023, 12, 31),
        }));
}

#[test]
fn quarter_and_fiscal_year_sharing_an_end_date_are_not_duplicates() {
    let statements = vec![quarter(2023, 4), fiscal_year(2023), fiscal_year(2022)];
    let selected = select_periods(&statements);

    assert!(selected.skipped.is_empty());
    assert_eq!(selected.latest_quarter, Some(&statements[0]));
    assert_eq!(selected.latest_fiscal_year, Some(&statements[1]));
}

#[test]
fn input_is_left_untouched() {
    let statements = vec![quarter(2023, 1), quarter(2023, 3), quarter(2023, 2)];
    let before = statements.clone();
    let _ = select_periods(&statements);
    assert_eq!(statements, before);
}

fn arb_quarter_run() -> impl Strategy<Value = Vec<FinancialStatement>> {
    // A run of consecutive quarters starting anywhere between 2015 and 2024.
    (2015i32..2025, 1u8..=4, 0usize..9).prop_map(|(year, q, len)| {
        let mut index = QuarterIndex::new(year, q).unwrap();
        let mut run = Vec::with_capacity(len);
        for _ in 0..len {
            run.push(quarter(index.fiscal_year, index.quarter));
            let Some(previous) = index.previous() else { break };
            index = previous;
        }
        run
    })
}

proptest! {
    #[test]
    fn selection_ignores_input_order(run in arb_quarter_run().prop_flat_map(|v| Just(v).prop_shuffle())) {
        let mut sorted = run.clone();
        sorted.sort_by(|a, b| b.period_end.cmp(&a.period_end));

        let from_shuffled = select_periods(&run);
        let from_sorted = select_periods(&sorted);

        prop_assert_eq!(from_shuffled.latest_quarter, from_sorted.latest_quarter);
        prop_assert_eq!(from_shuffled.previous_quarter, from_sorted.previous_quarter);
        prop_assert_eq!(from_shuffled.trailing_quarters, from_sorted.trailing_quarters);
    }

    #[test]
    fn consecutive_runs_have_a_window_iff_four_or_more(run in arb_quarter_run()) {
        let selected = select_periods(&run);
        prop_assert_eq!(selected.trailing_quarters.is_some(), run.len() >= 4);
        prop_assert_eq!(selected.previous_quarter.is_some(), run.len() >= 2);
    }
}
