mod aggregate;
mod period;
mod view;

pub use aggregate::{
    display_total, filter_invoices, format_amount, format_decimal, local_time, monthly_series,
    sum_by_currency, AmountField, NO_CURRENCY_PLACEHOLDER,
};
pub use period::{date_range_for, DateRange, Period};
pub use view::{
    AggregationResult, Card, CardView, ReportAggregator, ReportView, MONTH_LABELS,
    PROFORMA_PLACEHOLDER,
};
