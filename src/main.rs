use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::convert::Infallible;
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use bizdesk::api::{ApiClient, Category, Company, Currency, SymbolPosition};
use bizdesk::catalog::{build_product, ProductForm};
use bizdesk::config::{
    clear_token, config_dir, init_config_dir, load_config, load_token, save_token, Config,
};
use bizdesk::contacts::{company_name, owned_by, paginate, prepare_update, search, PersonChanges};
use bizdesk::error::{BizError, Result};
use bizdesk::report::{
    format_amount, format_decimal, AggregationResult, Card, Period, ReportAggregator, ReportView,
    MONTH_LABELS,
};
use bizdesk::session::decode_claims;

#[derive(Parser)]
#[command(name = "bizdesk")]
#[command(version, about = "Invoicing and CRM command-line client", long_about = None)]
struct Cli {
    /// Path to config directory (default: ~/.bizdesk or XDG config)
    #[arg(short = 'C', long, global = true)]
    config_dir: Option<PathBuf>,

    /// Log requests and decisions to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize config directory with a template config.toml
    Init,

    /// Store the bearer token used for API requests
    Login {
        /// Token as issued by the API (header.payload.signature)
        #[arg(long)]
        token: String,
    },

    /// Remove the stored token
    Logout,

    /// Show the user id read from the stored token
    Whoami,

    /// List your contacts
    People {
        /// Case-insensitive filter on name, company, country, phone or email
        #[arg(short, long)]
        search: Option<String>,

        /// Page number (1-based)
        #[arg(short, long, default_value_t = 1)]
        page: usize,
    },

    /// Edit a contact; only the given fields change
    EditPerson {
        /// Person id
        id: String,

        #[arg(long)]
        first_name: Option<String>,

        #[arg(long)]
        last_name: Option<String>,

        /// Company id or name
        #[arg(long)]
        company: Option<String>,

        #[arg(long)]
        country: Option<String>,

        #[arg(long)]
        phone: Option<String>,

        #[arg(long)]
        email: Option<String>,
    },

    /// Delete a contact
    DeletePerson {
        /// Person id
        id: String,
    },

    /// List your companies
    Companies,

    /// List your products
    Products,

    /// Add a product
    AddProduct {
        #[arg(long)]
        name: String,

        /// Category id or name
        #[arg(long)]
        category: String,

        /// Currency id or name
        #[arg(long)]
        currency: String,

        /// Unit price (e.g., 12.50)
        #[arg(long)]
        price: String,

        #[arg(long, default_value = "")]
        description: String,

        #[arg(long, default_value = "")]
        reference: String,
    },

    /// List your product categories
    Categories,

    /// List your currencies
    Currencies {
        /// Include inactive currencies
        #[arg(long)]
        all: bool,
    },

    /// Show paid/unpaid totals and the monthly paid series
    Report {
        /// Period of the paid card (yesterday, lastWeek, lastMonth, lastYear, thisYear, all)
        #[arg(long, value_parser = parse_period, default_value = "thisYear")]
        paid_period: Period,

        /// Period of the unpaid card
        #[arg(long, value_parser = parse_period, default_value = "thisYear")]
        unpaid_period: Period,

        /// Period of the proforma card
        #[arg(long, value_parser = parse_period, default_value = "thisYear")]
        proforma_period: Period,

        /// Currency id or name (default: [report] currency from config.toml)
        #[arg(long)]
        currency: Option<String>,

        /// Resolve periods relative to this date instead of today (YYYY-MM-DD)
        #[arg(long)]
        as_of: Option<String>,

        /// Print the aggregation as JSON
        #[arg(long)]
        json: bool,
    },
}

fn parse_period(value: &str) -> std::result::Result<Period, Infallible> {
    Ok(Period::parse_lenient(value))
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default_directive = if verbose { "bizdesk=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    // Determine config directory
    let cfg_dir = match cli.config_dir {
        Some(p) => p,
        None => config_dir()?,
    };

    match cli.command {
        Commands::Init => cmd_init(&cfg_dir),
        Commands::Login { token } => cmd_login(&cfg_dir, &token),
        Commands::Logout => cmd_logout(&cfg_dir),
        Commands::Whoami => cmd_whoami(&cfg_dir),
        Commands::People { search, page } => cmd_people(&cfg_dir, search.as_deref(), page),
        Commands::EditPerson {
            id,
            first_name,
            last_name,
            company,
            country,
            phone,
            email,
        } => cmd_edit_person(
            &cfg_dir,
            &id,
            PersonChanges {
                first_name,
                last_name,
                company,
                country,
                phone,
                email,
            },
        ),
        Commands::DeletePerson { id } => cmd_delete_person(&cfg_dir, &id),
        Commands::Companies => cmd_companies(&cfg_dir),
        Commands::Products => cmd_products(&cfg_dir),
        Commands::AddProduct {
            name,
            category,
            currency,
            price,
            description,
            reference,
        } => cmd_add_product(
            &cfg_dir,
            ProductForm {
                name,
                category,
                currency,
                price,
                description,
                reference,
            },
        ),
        Commands::Categories => cmd_categories(&cfg_dir),
        Commands::Currencies { all } => cmd_currencies(&cfg_dir, all),
        Commands::Report {
            paid_period,
            unpaid_period,
            proforma_period,
            currency,
            as_of,
            json,
        } => {
            let view = ReportView::default()
                .with_period(Card::Paid, paid_period)
                .with_period(Card::Unpaid, unpaid_period)
                .with_period(Card::Proforma, proforma_period);
            cmd_report(&cfg_dir, view, currency, as_of, json)
        }
    }
}

/// Loaded config, API client and the user id claimed by the stored token
struct Context {
    config: Config,
    client: ApiClient,
    user_id: String,
}

fn connect(cfg_dir: &Path) -> Result<Context> {
    let config = load_config(cfg_dir)?;
    let token = load_token(cfg_dir)?.ok_or(BizError::NotLoggedIn)?;
    let claims = decode_claims(&token)?;
    let client = ApiClient::new(&config.api, Some(token));

    Ok(Context {
        config,
        client,
        user_id: claims.admin_id,
    })
}

/// Initialize config directory with template files
fn cmd_init(cfg_dir: &Path) -> Result<()> {
    init_config_dir(cfg_dir)?;

    println!("Initialized bizdesk config at: {}", cfg_dir.display());
    println!();
    println!("Next steps:");
    println!(
        "  1. Point to your API:  $EDITOR {}/config.toml",
        cfg_dir.display()
    );
    println!("  2. Store your token:   bizdesk login --token <TOKEN>");

    Ok(())
}

fn cmd_login(cfg_dir: &Path, token: &str) -> Result<()> {
    let claims = decode_claims(token)?;
    save_token(cfg_dir, token)?;
    println!("Logged in as {}", claims.admin_id);
    Ok(())
}

fn cmd_logout(cfg_dir: &Path) -> Result<()> {
    if clear_token(cfg_dir)? {
        println!("Logged out");
    } else {
        println!("No stored token");
    }
    Ok(())
}

fn cmd_whoami(cfg_dir: &Path) -> Result<()> {
    let token = load_token(cfg_dir)?.ok_or(BizError::NotLoggedIn)?;
    let claims = decode_claims(&token)?;

    println!("User ID:  {}", claims.admin_id);
    if let Some(exp) = claims.expires_at {
        let expires = chrono::DateTime::from_timestamp(exp, 0)
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| exp.to_string());
        println!("Expires:  {expires}");
    }
    println!("Claims are read from the stored token without signature verification.");
    Ok(())
}

// Table row structs for tabled
#[derive(Tabled)]
struct PersonRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "FIRST NAME")]
    first_name: String,
    #[tabled(rename = "LAST NAME")]
    last_name: String,
    #[tabled(rename = "COMPANY")]
    company: String,
    #[tabled(rename = "COUNTRY")]
    country: String,
    #[tabled(rename = "PHONE")]
    phone: String,
    #[tabled(rename = "EMAIL")]
    email: String,
}

#[derive(Tabled)]
struct NamedRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "NAME")]
    name: String,
}

#[derive(Tabled)]
struct ProductRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "CATEGORY")]
    category: String,
    #[tabled(rename = "PRICE")]
    price: String,
    #[tabled(rename = "REFERENCE")]
    reference: String,
}

#[derive(Tabled)]
struct CurrencyRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "SYMBOL")]
    symbol: String,
    #[tabled(rename = "POSITION")]
    position: String,
    #[tabled(rename = "ACTIVE")]
    active: String,
}

#[derive(Tabled)]
struct CardRow {
    #[tabled(rename = "CARD")]
    title: String,
    #[tabled(rename = "PERIOD")]
    period: String,
    #[tabled(rename = "AMOUNT")]
    amount: String,
}

#[derive(Tabled)]
struct MonthRow {
    #[tabled(rename = "MONTH")]
    month: String,
    #[tabled(rename = "PAID")]
    paid: String,
    #[tabled(rename = "")]
    bar: String,
}

fn print_table<T: Tabled>(rows: Vec<T>) {
    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");
}

/// Companies for name lookups; a failed fetch is logged and treated as none
fn companies_or_empty(ctx: &Context) -> Vec<Company> {
    ctx.client.companies().unwrap_or_else(|e| {
        warn!(error = %e, "failed to fetch companies");
        Vec::new()
    })
}

fn categories_or_none(ctx: &Context) -> Option<Vec<Category>> {
    ctx.client
        .categories(&ctx.user_id)
        .map_err(|e| warn!(error = %e, "failed to fetch categories"))
        .ok()
}

fn currencies_or_none(ctx: &Context) -> Option<Vec<Currency>> {
    ctx.client
        .currencies(&ctx.user_id)
        .map_err(|e| warn!(error = %e, "failed to fetch currencies"))
        .ok()
}

fn find_currency<'a>(currencies: &'a [Currency], reference: &str) -> Option<&'a Currency> {
    currencies
        .iter()
        .find(|c| c.id == reference || c.name.eq_ignore_ascii_case(reference))
}

/// List contacts created by the current user
fn cmd_people(cfg_dir: &Path, query: Option<&str>, page: usize) -> Result<()> {
    let ctx = connect(cfg_dir)?;

    let people: Vec<_> = ctx
        .client
        .people(&ctx.user_id)?
        .into_iter()
        .filter(|p| owned_by(p.created_by.as_deref(), &ctx.user_id))
        .collect();
    let companies = companies_or_empty(&ctx);

    let matches = search(&people, &companies, query.unwrap_or(""));
    if matches.is_empty() {
        println!("No contacts found.");
        return Ok(());
    }

    let shown = paginate(&matches, page, ctx.config.people.per_page);
    let rows: Vec<PersonRow> = shown
        .items
        .iter()
        .map(|p| PersonRow {
            id: p.id.clone(),
            first_name: p.first_name.clone(),
            last_name: p.last_name.clone(),
            company: company_name(&companies, p.company.as_deref())
                .unwrap_or("-")
                .to_string(),
            country: p.country.clone(),
            phone: p.phone.clone(),
            email: p.email.clone(),
        })
        .collect();

    if rows.is_empty() {
        println!("No contacts on page {}.", shown.page);
    } else {
        print_table(rows);
    }
    println!(
        "Page {} of {} ({} contacts)",
        shown.page, shown.total_pages, shown.total_items
    );

    Ok(())
}

/// Edit a contact, validating only what changed
fn cmd_edit_person(cfg_dir: &Path, id: &str, mut changes: PersonChanges) -> Result<()> {
    let ctx = connect(cfg_dir)?;

    let people: Vec<_> = ctx
        .client
        .people(&ctx.user_id)?
        .into_iter()
        .filter(|p| owned_by(p.created_by.as_deref(), &ctx.user_id))
        .collect();
    let person = people
        .iter()
        .find(|p| p.id == id)
        .ok_or_else(|| BizError::PersonNotFound(id.to_string()))?;

    if let Some(reference) = changes.company.take() {
        let companies: Vec<_> = ctx
            .client
            .companies()?
            .into_iter()
            .filter(|c| owned_by(c.created_by.as_deref(), &ctx.user_id))
            .collect();
        let company = companies
            .iter()
            .find(|c| c.id == reference || c.name.eq_ignore_ascii_case(&reference))
            .ok_or(BizError::CompanyNotFound(reference))?;
        changes.company = Some(company.id.clone());
    }

    let update = prepare_update(person, changes, || Ok(people.clone()))?;
    ctx.client.update_person(id, &update)?;

    println!("Person updated successfully");
    println!("  Name:   {} {}", update.first_name, update.last_name);
    println!("  Phone:  {}", update.phone);
    println!("  Email:  {}", update.email);

    Ok(())
}

fn cmd_delete_person(cfg_dir: &Path, id: &str) -> Result<()> {
    let ctx = connect(cfg_dir)?;
    ctx.client.delete_person(id)?;
    println!("Person deleted successfully");
    Ok(())
}

fn cmd_companies(cfg_dir: &Path) -> Result<()> {
    let ctx = connect(cfg_dir)?;

    let rows: Vec<NamedRow> = ctx
        .client
        .companies()?
        .into_iter()
        .filter(|c| owned_by(c.created_by.as_deref(), &ctx.user_id))
        .map(|c| NamedRow {
            id: c.id,
            name: c.name,
        })
        .collect();

    if rows.is_empty() {
        println!("No companies found.");
        return Ok(());
    }
    print_table(rows);
    Ok(())
}

fn cmd_products(cfg_dir: &Path) -> Result<()> {
    let ctx = connect(cfg_dir)?;

    let products: Vec<_> = ctx
        .client
        .products()?
        .into_iter()
        .filter(|p| owned_by(p.created_by.as_deref(), &ctx.user_id))
        .collect();
    if products.is_empty() {
        println!("No products found.");
        return Ok(());
    }

    let categories = categories_or_none(&ctx).unwrap_or_default();
    let currencies = currencies_or_none(&ctx).unwrap_or_default();

    let rows: Vec<ProductRow> = products
        .into_iter()
        .map(|p| {
            let category = p
                .product_category
                .as_deref()
                .and_then(|id| categories.iter().find(|c| c.id == id))
                .map(|c| c.name.clone())
                .unwrap_or_else(|| "-".to_string());
            let price = match p.currency.as_deref().and_then(|id| find_currency(&currencies, id)) {
                Some(currency) => format_amount(currency, p.price),
                None => format_decimal(p.price),
            };
            ProductRow {
                id: p.id,
                name: p.name,
                category,
                price,
                reference: p.reference,
            }
        })
        .collect();

    print_table(rows);
    Ok(())
}

fn cmd_add_product(cfg_dir: &Path, mut form: ProductForm) -> Result<()> {
    let ctx = connect(cfg_dir)?;

    if let Some(currencies) = currencies_or_none(&ctx) {
        let currency = find_currency(&currencies, &form.currency)
            .ok_or_else(|| BizError::CurrencyNotFound(form.currency.clone()))?;
        form.currency = currency.id.clone();
    }

    let categories = categories_or_none(&ctx);
    let product = build_product(form, categories.as_deref(), &ctx.user_id)?;
    ctx.client.add_product(&product)?;

    println!("Product added successfully");
    println!("  Name:   {}", product.name);
    println!("  Price:  {}", format_decimal(product.price));

    Ok(())
}

fn cmd_categories(cfg_dir: &Path) -> Result<()> {
    let ctx = connect(cfg_dir)?;

    let rows: Vec<NamedRow> = ctx
        .client
        .categories(&ctx.user_id)?
        .into_iter()
        .map(|c| NamedRow {
            id: c.id,
            name: c.name,
        })
        .collect();

    if rows.is_empty() {
        println!("No categories found.");
        return Ok(());
    }
    print_table(rows);
    Ok(())
}

fn cmd_currencies(cfg_dir: &Path, include_inactive: bool) -> Result<()> {
    let ctx = connect(cfg_dir)?;

    let rows: Vec<CurrencyRow> = ctx
        .client
        .currencies(&ctx.user_id)?
        .into_iter()
        .filter(|c| include_inactive || c.active)
        .map(|c| CurrencyRow {
            id: c.id,
            name: c.name,
            position: match c.symbol_position {
                SymbolPosition::Before => "before",
                SymbolPosition::After => "after",
                SymbolPosition::Other => "-",
            }
            .to_string(),
            symbol: c.symbol,
            active: if c.active { "yes" } else { "no" }.to_string(),
        })
        .collect();

    if rows.is_empty() {
        println!("No currencies found.");
        return Ok(());
    }
    print_table(rows);
    Ok(())
}

/// Aggregate invoices for the report cards and the monthly paid series
fn cmd_report(
    cfg_dir: &Path,
    view: ReportView,
    currency: Option<String>,
    as_of: Option<String>,
    json: bool,
) -> Result<()> {
    let ctx = connect(cfg_dir)?;

    let aggregator = match as_of {
        Some(s) => {
            let today = NaiveDate::parse_from_str(&s, "%Y-%m-%d")
                .map_err(|_| BizError::InvalidDate(s.clone()))?;
            ReportAggregator::new(today, Local)
        }
        None => ReportAggregator::local_now(),
    };

    // Fetch failures leave the report empty rather than aborting
    let fetched_currencies = currencies_or_none(&ctx);
    let currencies: Vec<Currency> = fetched_currencies
        .as_deref()
        .unwrap_or_default()
        .iter()
        .filter(|c| c.active)
        .cloned()
        .collect();
    let invoices = ctx.client.invoices(&ctx.user_id).unwrap_or_else(|e| {
        warn!(error = %e, "failed to fetch invoices");
        Vec::new()
    });

    let selected = match currency.or_else(|| ctx.config.report.currency.clone()) {
        Some(reference) => match find_currency(&currencies, &reference) {
            Some(c) => Some(c.id.clone()),
            None if fetched_currencies.is_some() => {
                return Err(BizError::CurrencyNotFound(reference))
            }
            None => Some(reference),
        },
        None => None,
    };
    let view = view.with_currency(selected);

    let result = aggregator.aggregate(&view, &invoices, &currencies);

    if json {
        let out = serde_json::to_string_pretty(&result).map_err(BizError::Encode)?;
        println!("{out}");
        return Ok(());
    }

    println!("Report as of {}", aggregator.today());
    match view.currency().and_then(|id| currencies.iter().find(|c| c.id == id)) {
        Some(c) => println!("Currency: {} ({})", c.name, c.symbol),
        None => println!("Currency: none selected"),
    }
    println!();
    print_report(&result);

    Ok(())
}

fn print_report(result: &AggregationResult) {
    let cards: Vec<CardRow> = result
        .cards
        .iter()
        .map(|card| CardRow {
            title: card.title.to_string(),
            period: card.period_label.to_string(),
            amount: card.amount.clone(),
        })
        .collect();
    print_table(cards);

    let max = result
        .monthly_series
        .iter()
        .copied()
        .max()
        .unwrap_or(Decimal::ZERO);
    let months: Vec<MonthRow> = MONTH_LABELS
        .iter()
        .zip(result.monthly_series.iter())
        .map(|(label, value)| MonthRow {
            month: label.to_string(),
            paid: format_decimal(*value),
            bar: "█".repeat(bar_width(*value, max)),
        })
        .collect();
    println!();
    print_table(months);
}

const BAR_WIDTH: u32 = 30;

fn bar_width(value: Decimal, max: Decimal) -> usize {
    if max <= Decimal::ZERO || value <= Decimal::ZERO {
        return 0;
    }
    (value * Decimal::from(BAR_WIDTH) / max)
        .round()
        .to_usize()
        .unwrap_or(0)
}
