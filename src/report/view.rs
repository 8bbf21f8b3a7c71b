use chrono::{Local, NaiveDate, TimeZone};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

use super::aggregate::{
    display_total, filter_invoices, monthly_series, sum_by_currency, AmountField,
};
use super::period::{date_range_for, Period};
use crate::api::{Currency, Invoice, PaymentStatus};

/// Proforma totals are not computed yet; the card always shows this
pub const PROFORMA_PLACEHOLDER: &str = "00.00 €";

pub const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Card {
    Paid,
    Unpaid,
    Proforma,
}

impl Card {
    pub const ALL: [Card; 3] = [Card::Paid, Card::Unpaid, Card::Proforma];

    pub fn title(self) -> &'static str {
        match self {
            Card::Paid => "Paid Invoice",
            Card::Unpaid => "Unpaid Invoice",
            Card::Proforma => "Facture Proforma",
        }
    }
}

/// Selection state of the report screen: one period per card and the
/// selected currency. Updates return a new value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportView {
    paid_period: Period,
    unpaid_period: Period,
    proforma_period: Period,
    currency: Option<String>,
}

impl ReportView {
    pub fn period(&self, card: Card) -> Period {
        match card {
            Card::Paid => self.paid_period,
            Card::Unpaid => self.unpaid_period,
            Card::Proforma => self.proforma_period,
        }
    }

    pub fn currency(&self) -> Option<&str> {
        self.currency.as_deref()
    }

    #[must_use]
    pub fn with_period(&self, card: Card, period: Period) -> Self {
        let mut next = self.clone();
        match card {
            Card::Paid => next.paid_period = period,
            Card::Unpaid => next.unpaid_period = period,
            Card::Proforma => next.proforma_period = period,
        }
        next
    }

    #[must_use]
    pub fn with_currency(&self, currency_id: Option<String>) -> Self {
        Self {
            currency: currency_id,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardView {
    pub card: Card,
    pub title: &'static str,
    pub period: Period,
    pub period_label: &'static str,
    pub amount: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregationResult {
    pub monthly_series: [Decimal; 12],
    pub total_paid: String,
    pub total_unpaid: String,
    pub paid_by_currency: BTreeMap<String, Decimal>,
    pub unpaid_by_currency: BTreeMap<String, Decimal>,
    pub cards: Vec<CardView>,
}

/// Resolves periods against a fixed "today" in a time zone.
///
/// Each invoice is placed by the offset in force at its own timestamp, so
/// a report run in summer still buckets winter invoices correctly.
#[derive(Debug, Clone)]
pub struct ReportAggregator<Tz: TimeZone = Local> {
    today: NaiveDate,
    tz: Tz,
}

impl ReportAggregator<Local> {
    /// Uses the system clock and time zone
    pub fn local_now() -> Self {
        Self::new(Local::now().date_naive(), Local)
    }
}

impl<Tz: TimeZone> ReportAggregator<Tz> {
    pub fn new(today: NaiveDate, tz: Tz) -> Self {
        Self { today, tz }
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Recompute every total and the paid series from the full invoice set
    pub fn aggregate(
        &self,
        view: &ReportView,
        invoices: &[Invoice],
        currencies: &[Currency],
    ) -> AggregationResult {
        let paid_range = date_range_for(view.period(Card::Paid), self.today);
        let unpaid_range = date_range_for(view.period(Card::Unpaid), self.today);

        let paid = filter_invoices(invoices, PaymentStatus::Paid, &paid_range, &self.tz);
        let unpaid = filter_invoices(invoices, PaymentStatus::Unpaid, &unpaid_range, &self.tz);

        let paid_by_currency =
            sum_by_currency(&paid, AmountField::for_status(PaymentStatus::Paid));
        let unpaid_by_currency =
            sum_by_currency(&unpaid, AmountField::for_status(PaymentStatus::Unpaid));

        let series = monthly_series(&paid, view.currency(), &paid_range, &self.tz);

        let total_paid = display_total(view.currency(), currencies, &paid_by_currency);
        let total_unpaid = display_total(view.currency(), currencies, &unpaid_by_currency);

        let cards = Card::ALL
            .iter()
            .map(|&card| {
                let period = view.period(card);
                let amount = match card {
                    Card::Paid => total_paid.clone(),
                    Card::Unpaid => total_unpaid.clone(),
                    Card::Proforma => PROFORMA_PLACEHOLDER.to_string(),
                };
                CardView {
                    card,
                    title: card.title(),
                    period,
                    period_label: period.label(),
                    amount,
                }
            })
            .collect();

        AggregationResult {
            monthly_series: series,
            total_paid,
            total_unpaid,
            paid_by_currency,
            unpaid_by_currency,
            cards,
        }
    }
}
