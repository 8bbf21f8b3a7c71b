use bizdesk::api::{Currency, CurrencyRef, Invoice, InvoiceType, PaymentStatus, SymbolPosition};
use bizdesk::report::{
    date_range_for, filter_invoices, monthly_series, sum_by_currency, AmountField, Card, Period,
    ReportAggregator, ReportView, PROFORMA_PLACEHOLDER,
};
use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;

fn utc() -> FixedOffset {
    FixedOffset::east_opt(0).unwrap()
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
}

fn invoice(
    id: &str,
    (y, m, d): (i32, u32, u32),
    status: PaymentStatus,
    kind: InvoiceType,
    currency: &str,
    paid: i64,
    total: i64,
) -> Invoice {
    Invoice {
        id: id.to_string(),
        date: Utc.with_ymd_and_hms(y, m, d, 9, 30, 0).unwrap(),
        payment_status: status,
        invoice_type: kind,
        currency: CurrencyRef::Id(currency.to_string()),
        paid_amount: Decimal::from(paid),
        total: Decimal::from(total),
        created_by: Some("u1".to_string()),
    }
}

fn paid_at(id: &str, date: DateTime<Utc>, amount: i64) -> Invoice {
    Invoice {
        date,
        ..invoice(
            id,
            (2024, 1, 1),
            PaymentStatus::Paid,
            InvoiceType::Standard,
            "a",
            amount,
            amount,
        )
    }
}

fn at_millis(y: i32, m: u32, d: u32, (h, min, sec, milli): (u32, u32, u32, u32)) -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_milli_opt(h, min, sec, milli)
        .unwrap()
        .and_utc()
}

fn currency(id: &str, symbol: &str, position: SymbolPosition) -> Currency {
    Currency {
        id: id.to_string(),
        name: id.to_uppercase(),
        symbol: symbol.to_string(),
        symbol_position: position,
        active: true,
        created_by: Some("u1".to_string()),
    }
}

fn fixtures() -> (Vec<Invoice>, Vec<Currency>) {
    use InvoiceType::*;
    use PaymentStatus::*;

    let invoices = vec![
        invoice("1", (2024, 1, 5), Paid, Standard, "a", 100, 100),
        invoice("2", (2024, 2, 10), Paid, Standard, "b", 50, 50),
        invoice("3", (2024, 4, 2), Unpaid, Standard, "a", 10, 70),
        invoice("4", (2024, 4, 3), Paid, Proforma, "a", 500, 500),
        invoice("5", (2024, 4, 4), Unpaid, Proforma, "a", 0, 300),
        invoice("6", (2024, 5, 20), Unpaid, Standard, "a", 0, 25),
    ];
    let currencies = vec![
        currency("a", "€", SymbolPosition::After),
        currency("b", "$", SymbolPosition::Before),
    ];
    (invoices, currencies)
}

#[test]
fn selected_currency_drives_totals_and_series() {
    let (invoices, currencies) = fixtures();
    let aggregator = ReportAggregator::new(today(), utc());
    let view = ReportView::default().with_currency(Some("a".to_string()));

    let result = aggregator.aggregate(&view, &invoices, &currencies);

    let mut expected = [Decimal::ZERO; 12];
    expected[0] = Decimal::from(100);
    assert_eq!(result.monthly_series, expected);
    assert_eq!(result.total_paid, "100.00€");
    // Unpaid sums the invoice total, not the amount collected so far
    assert_eq!(result.total_unpaid, "95.00€");
}

#[test]
fn no_currency_mixes_series_and_hides_totals() {
    let (invoices, currencies) = fixtures();
    let aggregator = ReportAggregator::new(today(), utc());

    let result = aggregator.aggregate(&ReportView::default(), &invoices, &currencies);

    assert_eq!(result.monthly_series[0], Decimal::from(100));
    assert_eq!(result.monthly_series[1], Decimal::from(50));
    assert_eq!(result.monthly_series[3], Decimal::ZERO);
    assert_eq!(result.total_paid, "00.00");
    assert_eq!(result.total_unpaid, "00.00");
    assert_eq!(result.paid_by_currency.len(), 2);
}

#[test]
fn proforma_invoices_never_count() {
    let (invoices, _) = fixtures();
    let range = date_range_for(Period::ThisYear, today());

    for status in [PaymentStatus::Paid, PaymentStatus::Unpaid] {
        let kept = filter_invoices(&invoices, status, &range, &utc());
        assert!(kept.iter().all(|inv| inv.invoice_type == InvoiceType::Standard));
    }

    let unpaid = filter_invoices(&invoices, PaymentStatus::Unpaid, &range, &utc());
    let totals = sum_by_currency(&unpaid, AmountField::Total);
    assert_eq!(totals.get("a"), Some(&Decimal::from(95)));
}

#[test]
fn cards_keep_independent_periods() {
    let (invoices, currencies) = fixtures();
    let aggregator = ReportAggregator::new(today(), utc());
    let view = ReportView::default()
        .with_currency(Some("a".to_string()))
        .with_period(Card::Unpaid, Period::LastMonth);

    let result = aggregator.aggregate(&view, &invoices, &currencies);

    assert_eq!(view.period(Card::Paid), Period::ThisYear);
    assert_eq!(result.total_paid, "100.00€");
    assert_eq!(result.total_unpaid, "25.00€");
    assert_eq!(result.cards[1].period_label, "Last Month");
    assert_eq!(result.cards[2].amount, PROFORMA_PLACEHOLDER);
}

#[test]
fn reselecting_a_period_is_idempotent() {
    let (invoices, currencies) = fixtures();
    let aggregator = ReportAggregator::new(today(), utc());
    let base = ReportView::default().with_currency(Some("b".to_string()));

    let once = base.with_period(Card::Paid, Period::LastYear);
    let twice = once.with_period(Card::Paid, Period::LastYear);

    assert_eq!(once, twice);
    assert_eq!(
        aggregator.aggregate(&once, &invoices, &currencies),
        aggregator.aggregate(&twice, &invoices, &currencies)
    );
    // The original view is untouched
    assert_eq!(base.period(Card::Paid), Period::ThisYear);
}

#[test]
fn sums_stay_non_negative() {
    let (invoices, _) = fixtures();
    let range = date_range_for(Period::ThisYear, today());
    for (status, field) in [
        (PaymentStatus::Paid, AmountField::PaidAmount),
        (PaymentStatus::Unpaid, AmountField::Total),
    ] {
        let kept = filter_invoices(&invoices, status, &range, &utc());
        assert!(sum_by_currency(&kept, field)
            .values()
            .all(|v| *v >= Decimal::ZERO));
    }
}

#[test]
fn local_offset_moves_invoice_across_day_boundary() {
    let late = Invoice {
        date: Utc.with_ymd_and_hms(2024, 6, 13, 23, 30, 0).unwrap(),
        ..invoice(
            "late",
            (2024, 6, 13),
            PaymentStatus::Paid,
            InvoiceType::Standard,
            "a",
            10,
            10,
        )
    };
    let invoices = vec![late];
    let yesterday = date_range_for(Period::Yesterday, today());

    let in_utc = filter_invoices(&invoices, PaymentStatus::Paid, &yesterday, &utc());
    assert!(in_utc.is_empty());

    // At UTC+2 the invoice was issued on the 14th
    let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
    let kept = filter_invoices(&invoices, PaymentStatus::Paid, &yesterday, &plus_two);
    assert_eq!(kept.len(), 1);
    let series = monthly_series(&kept, None, &yesterday, &plus_two);
    assert_eq!(series[5], Decimal::from(10));
}

#[test]
fn yesterday_includes_its_last_millisecond_only() {
    let invoices = vec![
        paid_at("before", at_millis(2024, 6, 13, (23, 59, 59, 999)), 1),
        paid_at("first", at_millis(2024, 6, 14, (0, 0, 0, 0)), 10),
        paid_at("last", at_millis(2024, 6, 14, (23, 59, 59, 999)), 100),
        paid_at("today", at_millis(2024, 6, 15, (0, 0, 0, 0)), 1000),
    ];
    let (_, currencies) = fixtures();
    let aggregator = ReportAggregator::new(today(), utc());
    let view = ReportView::default()
        .with_currency(Some("a".to_string()))
        .with_period(Card::Paid, Period::Yesterday);

    let result = aggregator.aggregate(&view, &invoices, &currencies);

    assert_eq!(result.total_paid, "110.00€");
    assert_eq!(result.monthly_series[5], Decimal::from(110));
    assert_eq!(result.cards[0].period_label, "Yesterday");
}

#[test]
fn last_week_runs_sunday_to_saturday() {
    // 2024-06-15 is a Saturday: last week is 2 June (Sun) to 8 June (Sat)
    let invoices = vec![
        paid_at("sat-before", at_millis(2024, 6, 1, (23, 59, 59, 999)), 1),
        paid_at("sunday", at_millis(2024, 6, 2, (0, 0, 0, 0)), 10),
        paid_at("saturday", at_millis(2024, 6, 8, (23, 59, 59, 999)), 100),
        paid_at("this-week", at_millis(2024, 6, 9, (0, 0, 0, 0)), 1000),
    ];
    let (_, currencies) = fixtures();
    let aggregator = ReportAggregator::new(today(), utc());
    let view = ReportView::default()
        .with_currency(Some("a".to_string()))
        .with_period(Card::Paid, Period::LastWeek);

    let result = aggregator.aggregate(&view, &invoices, &currencies);

    assert_eq!(result.total_paid, "110.00€");
    assert_eq!(result.cards[0].period_label, "Last Week");
}

#[test]
fn all_time_is_labelled_but_covers_the_current_year() {
    let (invoices, currencies) = fixtures();
    let mut older = invoices.clone();
    older.push(invoice(
        "old",
        (2023, 12, 31),
        PaymentStatus::Paid,
        InvoiceType::Standard,
        "a",
        700,
        700,
    ));
    let aggregator = ReportAggregator::new(today(), utc());
    let base = ReportView::default().with_currency(Some("a".to_string()));
    let all = base
        .with_period(Card::Paid, Period::All)
        .with_period(Card::Unpaid, Period::All);

    let result = aggregator.aggregate(&all, &older, &currencies);
    let this_year = aggregator.aggregate(&base, &invoices, &currencies);

    assert_eq!(result.cards[0].period_label, "All Time");
    assert_eq!(result.cards[1].period_label, "All Time");
    assert_eq!(result.total_paid, this_year.total_paid);
    assert_eq!(result.total_unpaid, this_year.total_unpaid);
    assert_eq!(result.monthly_series, this_year.monthly_series);
}

#[test]
fn proforma_card_is_titled_in_french() {
    let (invoices, currencies) = fixtures();
    let result = ReportAggregator::new(today(), utc()).aggregate(
        &ReportView::default(),
        &invoices,
        &currencies,
    );

    let titles: Vec<_> = result.cards.iter().map(|c| c.title).collect();
    assert_eq!(titles, ["Paid Invoice", "Unpaid Invoice", "Facture Proforma"]);
    assert_eq!(result.cards[2].amount, PROFORMA_PLACEHOLDER);
}
