use chrono::{Datelike, NaiveDateTime, TimeZone};
use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::BTreeMap;

use super::period::DateRange;
use crate::api::{Currency, Invoice, InvoiceType, PaymentStatus, SymbolPosition};

/// Shown in place of a total when no currency is selected
pub const NO_CURRENCY_PLACEHOLDER: &str = "00.00";

/// Which invoice amount a total is built from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountField {
    PaidAmount,
    Total,
}

impl AmountField {
    /// Paid invoices count what was collected, unpaid ones the full amount owed.
    pub fn for_status(status: PaymentStatus) -> Self {
        match status {
            PaymentStatus::Unpaid => AmountField::Total,
            _ => AmountField::PaidAmount,
        }
    }

    pub fn of(self, invoice: &Invoice) -> Decimal {
        match self {
            AmountField::PaidAmount => invoice.paid_amount,
            AmountField::Total => invoice.total,
        }
    }
}

/// The invoice timestamp as wall-clock time in `tz`, using the offset in
/// force at that instant
pub fn local_time<Tz: TimeZone>(invoice: &Invoice, tz: &Tz) -> NaiveDateTime {
    invoice.date.with_timezone(tz).naive_local()
}

/// Standard invoices with the given status whose local date falls in `range`
pub fn filter_invoices<'a, Tz: TimeZone>(
    invoices: &'a [Invoice],
    status: PaymentStatus,
    range: &DateRange,
    tz: &Tz,
) -> Vec<&'a Invoice> {
    invoices
        .iter()
        .filter(|inv| inv.invoice_type == InvoiceType::Standard)
        .filter(|inv| inv.payment_status == status)
        .filter(|inv| range.contains(local_time(inv, tz)))
        .collect()
}

pub fn sum_by_currency(invoices: &[&Invoice], field: AmountField) -> BTreeMap<String, Decimal> {
    let mut totals = BTreeMap::new();
    for invoice in invoices {
        *totals
            .entry(invoice.currency_id().to_string())
            .or_insert(Decimal::ZERO) += field.of(invoice);
    }
    totals
}

/// Paid amounts bucketed by calendar month (index 0 is January).
///
/// Without a currency filter every currency lands in the same buckets,
/// unconverted.
pub fn monthly_series<Tz: TimeZone>(
    invoices: &[&Invoice],
    currency_filter: Option<&str>,
    range: &DateRange,
    tz: &Tz,
) -> [Decimal; 12] {
    let mut series = [Decimal::ZERO; 12];
    for invoice in invoices {
        if currency_filter.is_some_and(|id| invoice.currency_id() != id) {
            continue;
        }
        let at = local_time(invoice, tz);
        if range.contains(at) {
            series[at.month0() as usize] += invoice.paid_amount;
        }
    }
    series
}

/// Two decimals, midpoints rounded away from zero
pub fn format_decimal(amount: Decimal) -> String {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded.to_string()
}

pub fn format_amount(currency: &Currency, amount: Decimal) -> String {
    match currency.symbol_position {
        SymbolPosition::Before => format!("{}{}", currency.symbol, format_decimal(amount)),
        SymbolPosition::After => format!("{}{}", format_decimal(amount), currency.symbol),
        SymbolPosition::Other => currency.symbol.clone(),
    }
}

/// Display string for a card total under the current currency selection.
///
/// No selection shows the placeholder; a selection missing from `currencies`
/// shows nothing.
pub fn display_total(
    selected: Option<&str>,
    currencies: &[Currency],
    totals: &BTreeMap<String, Decimal>,
) -> String {
    let Some(id) = selected else {
        return NO_CURRENCY_PLACEHOLDER.to_string();
    };
    match currencies.iter().find(|c| c.id == id) {
        Some(currency) => {
            let amount = totals.get(id).copied().unwrap_or(Decimal::ZERO);
            format_amount(currency, amount)
        }
        None => String::new(),
    }
}
