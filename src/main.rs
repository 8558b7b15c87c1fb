use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};
use tracing_subscriber::EnvFilter;

use paintquote::catalogue::{Catalogue, LookupOutcome, PriceLookup};
use paintquote::chat::run_chat;
use paintquote::config::{
    config_dir, ensure_config_dir, init_config_dir, load_catalogue, load_config, load_draft,
    save_draft, Config, Draft,
};
use paintquote::error::{QuoteError, Result};
use paintquote::export::{export_csv, generate_pdf, to_json};
use paintquote::money::{format_amount, format_percent};
use paintquote::quote::{QuoteSnapshot, Quotation};
use paintquote::repl::run_session;
use paintquote::search::SearchIndex;

#[derive(Parser)]
#[command(name = "paintquote")]
#[command(version, about = "Paint catalogue search and quotation builder", long_about = None)]
struct Cli {
    /// Path to config directory (default: ~/.paintquote or XDG config)
    #[arg(short = 'C', long, global = true)]
    config_dir: Option<PathBuf>,

    /// Log debug output to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize config directory with a config file and sample catalogue
    Init,

    /// Suggest products whose name or description contains the query
    Search {
        query: String,

        /// Maximum number of suggestions (default: search_limit from config)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show product details and pack prices
    Show {
        /// Product code or name
        product: String,
    },

    /// Look up the price of a product pack size
    Price {
        /// Product code
        code: String,

        /// Pack size label, e.g. "18 Ltr (Drum)"
        size: Option<String>,

        /// Print the lookup result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Add a line item to the quotation
    Add {
        /// Product code or name
        product: String,

        /// Pack size label
        #[arg(short, long)]
        pack: String,

        /// Number of packs
        #[arg(short, long, default_value_t = 1, allow_negative_numbers = true)]
        qty: i64,

        /// Discount percentage (0-100)
        #[arg(short, long, default_value = "0", allow_negative_numbers = true)]
        discount: Decimal,
    },

    /// Remove a line item by its number from 'list'
    Remove {
        line: usize,
    },

    /// Change quantity and/or discount of a line item
    Set {
        /// Line number from 'list'
        line: usize,

        #[arg(short, long, allow_negative_numbers = true)]
        qty: Option<i64>,

        #[arg(short, long, allow_negative_numbers = true)]
        discount: Option<Decimal>,
    },

    /// Show the current quotation with totals
    List,

    /// Remove all line items and customer details
    Clear,

    /// Set customer details printed on the quotation
    Customer {
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        phone: Option<String>,

        #[arg(long)]
        notes: Option<String>,

        /// Quotation date (YYYY-MM-DD, default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Export the quotation (PDF by default)
    Export {
        /// Write line items as CSV
        #[arg(long, value_name = "PATH")]
        csv: Option<PathBuf>,

        /// Print the quotation snapshot as JSON
        #[arg(long)]
        json: bool,

        /// Render a PDF (default path: output_dir/quotation-YYYYMMDD.pdf)
        #[arg(long, value_name = "PATH", num_args = 0..=1)]
        pdf: Option<Option<PathBuf>>,

        /// Open generated PDF with system default viewer
        #[arg(long)]
        open: bool,
    },

    /// Build a quotation through interactive prompts
    Interactive,

    /// Ask about products ("Tell me about <name>") or prices
    /// ("How much is <code> in <size>?")
    Chat,

    /// Check the catalogue files for integrity errors
    Validate,

    /// Show configuration, catalogue and quotation status
    Status,
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
    let default = if verbose { "paintquote=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
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
        Commands::Search { query, limit } => cmd_search(&cfg_dir, &query, limit),
        Commands::Show { product } => cmd_show(&cfg_dir, &product),
        Commands::Price { code, size, json } => cmd_price(&cfg_dir, &code, size.as_deref(), json),
        Commands::Add {
            product,
            pack,
            qty,
            discount,
        } => cmd_add(&cfg_dir, &product, &pack, qty, discount),
        Commands::Remove { line } => cmd_remove(&cfg_dir, line),
        Commands::Set { line, qty, discount } => cmd_set(&cfg_dir, line, qty, discount),
        Commands::List => cmd_list(&cfg_dir),
        Commands::Clear => cmd_clear(&cfg_dir),
        Commands::Customer {
            name,
            phone,
            notes,
            date,
        } => cmd_customer(&cfg_dir, name, phone, notes, date),
        Commands::Export {
            csv,
            json,
            pdf,
            open,
        } => cmd_export(&cfg_dir, csv, json, pdf, open),
        Commands::Interactive => cmd_interactive(&cfg_dir),
        Commands::Chat => cmd_chat(&cfg_dir),
        Commands::Validate => cmd_validate(&cfg_dir),
        Commands::Status => cmd_status(&cfg_dir),
    }
}

/// Config, catalogue and the draft quotation for one command.
struct Workspace {
    dir: PathBuf,
    config: Config,
    catalogue: Catalogue,
}

impl Workspace {
    fn open(cfg_dir: &Path) -> Result<Self> {
        ensure_config_dir(cfg_dir)?;
        let config = load_config(cfg_dir)?;
        let catalogue = load_catalogue(cfg_dir, &config)?;
        Ok(Self {
            dir: cfg_dir.to_path_buf(),
            config,
            catalogue,
        })
    }

    fn quotation(&self) -> Result<Quotation> {
        let vat_rate = self.config.vat_rate()?;
        load_draft(&self.dir)?.to_quotation(&self.catalogue, vat_rate)
    }

    fn save(&self, quote: &Quotation) -> Result<()> {
        save_draft(&self.dir, &Draft::from_quotation(quote))
    }

    fn currency(&self) -> &str {
        self.catalogue.currency()
    }
}

/// Initialize config directory with template files
fn cmd_init(cfg_dir: &Path) -> Result<()> {
    init_config_dir(cfg_dir)?;

    println!("Initialized paintquote config at: {}", cfg_dir.display());
    println!();
    println!("Next steps:");
    println!(
        "  1. Point the catalogue at your data:  $EDITOR {}/config.toml",
        cfg_dir.display()
    );
    println!("  2. Find a product:                    paintquote search <name>");
    println!("  3. Add it to the quotation:           paintquote add <code> --pack <size> --qty <n>");

    Ok(())
}

// Table row structs for tabled
#[derive(Tabled)]
struct SuggestionRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "CODE")]
    code: String,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "CATEGORY")]
    category: String,
    #[tabled(rename = "PACKS")]
    packs: usize,
}

#[derive(Tabled)]
struct PackRow {
    #[tabled(rename = "PACK")]
    pack: String,
    #[tabled(rename = "PRICE")]
    price: String,
}

#[derive(Tabled)]
struct LineRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "CODE")]
    code: String,
    #[tabled(rename = "PRODUCT")]
    product: String,
    #[tabled(rename = "PACK")]
    pack: String,
    #[tabled(rename = "QTY")]
    quantity: u32,
    #[tabled(rename = "UNIT PRICE")]
    unit_price: String,
    #[tabled(rename = "DISC %")]
    discount: String,
    #[tabled(rename = "LINE NET")]
    line_net: String,
}

/// Suggest products for a query
fn cmd_search(cfg_dir: &Path, query: &str, limit: Option<usize>) -> Result<()> {
    let ws = Workspace::open(cfg_dir)?;
    let limit = limit.unwrap_or(ws.config.quote.search_limit);
    let index = SearchIndex::new(&ws.catalogue);
    let matches = index.suggest(query, limit);

    if matches.is_empty() {
        println!("No products matched '{}'.", query.trim());
        return Ok(());
    }

    let rows: Vec<SuggestionRow> = matches
        .iter()
        .enumerate()
        .map(|(idx, p)| SuggestionRow {
            index: idx + 1,
            code: p.code.clone(),
            name: p.name.clone(),
            category: p.category.clone(),
            packs: p.packs.len(),
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");
    Ok(())
}

/// Show a single product
fn cmd_show(cfg_dir: &Path, query: &str) -> Result<()> {
    let ws = Workspace::open(cfg_dir)?;
    let product = ws.catalogue.resolve(query)?;

    println!("{} [{}]", product.name, product.code);
    match &product.subcategory {
        Some(sub) => println!("Category: {} / {}", product.category, sub),
        None => println!("Category: {}", product.category),
    }
    println!("{}", product.summary());
    println!();

    let rows: Vec<PackRow> = product
        .packs
        .iter()
        .map(|p| PackRow {
            pack: p.label.clone(),
            price: format_amount(p.unit_price, ws.currency()),
        })
        .collect();
    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");
    Ok(())
}

/// Price lookup for a code and pack size
fn cmd_price(cfg_dir: &Path, code: &str, size: Option<&str>, json: bool) -> Result<()> {
    let ws = Workspace::open(cfg_dir)?;
    let lookup = PriceLookup::resolve(&ws.catalogue, code, size.unwrap_or(""));

    if json {
        let text = serde_json::to_string_pretty(&lookup).map_err(|e| {
            QuoteError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
        })?;
        println!("{text}");
        return Ok(());
    }

    match lookup.outcome {
        LookupOutcome::Found {
            product_code,
            product_name,
            size,
            price,
        } => {
            println!(
                "{} [{}] {}: {}",
                product_name,
                product_code,
                size,
                format_amount(price, &lookup.currency)
            );
            Ok(())
        }
        LookupOutcome::MissingFields { available_sizes, .. } => {
            println!("Available sizes for {}:", lookup.requested_code);
            for size in available_sizes {
                println!("  {size}");
            }
            Ok(())
        }
        LookupOutcome::UnknownPack {
            product_code,
            available_sizes,
            ..
        } => Err(QuoteError::UnknownPackSize {
            product: product_code,
            pack: lookup.requested_size,
            available: available_sizes.join(", "),
        }),
        LookupOutcome::UnknownCode => Err(QuoteError::ProductNotFound(lookup.requested_code)),
    }
}

/// Add a line item
fn cmd_add(cfg_dir: &Path, query: &str, pack: &str, qty: i64, discount: Decimal) -> Result<()> {
    let ws = Workspace::open(cfg_dir)?;
    let mut quote = ws.quotation()?;
    let product = ws.catalogue.resolve(query)?;

    let idx = quote.add_line(product, pack, qty, discount)?;
    ws.save(&quote)?;

    let line = &quote.lines()[idx];
    println!(
        "Added line {}: {} ({}) x {} at {} less {}%",
        idx + 1,
        line.product_name(),
        line.pack_label(),
        line.quantity(),
        format_amount(line.unit_price(), ws.currency()),
        format_percent(line.discount_percent())
    );
    println!("  Line net: {}", format_amount(line.line_net(), ws.currency()));
    println!(
        "  Quotation total: {}",
        format_amount(quote.compute_totals().grand_total, ws.currency())
    );
    Ok(())
}

/// Map a 1-based line number from the CLI onto the quotation. Errors report
/// the number the user typed.
fn at_line<T>(number: usize, op: impl FnOnce(usize) -> Result<T>) -> Result<T> {
    op(number.wrapping_sub(1)).map_err(|e| e.with_line(number))
}

/// Remove a line item
fn cmd_remove(cfg_dir: &Path, number: usize) -> Result<()> {
    let ws = Workspace::open(cfg_dir)?;
    let mut quote = ws.quotation()?;
    let removed = at_line(number, |idx| quote.remove_line(idx))?;
    ws.save(&quote)?;

    println!(
        "Removed line {}: {} ({})",
        number,
        removed.product_name(),
        removed.pack_label()
    );
    println!(
        "  Quotation total: {}",
        format_amount(quote.compute_totals().grand_total, ws.currency())
    );
    Ok(())
}

/// Update quantity and/or discount of a line item
fn cmd_set(cfg_dir: &Path, number: usize, qty: Option<i64>, discount: Option<Decimal>) -> Result<()> {
    let ws = Workspace::open(cfg_dir)?;
    let mut quote = ws.quotation()?;

    if let Some(q) = qty {
        at_line(number, |idx| quote.update_quantity(idx, q))?;
    }
    if let Some(d) = discount {
        at_line(number, |idx| quote.update_discount(idx, d))?;
    }
    // validate the line number even when nothing changes
    let line = at_line(number, |idx| {
        quote
            .lines()
            .get(idx)
            .ok_or(QuoteError::IndexOutOfRange { index: idx, len: quote.len() })
    })?;

    println!(
        "Line {}: {} ({}) x {} less {}% -> {}",
        number,
        line.product_name(),
        line.pack_label(),
        line.quantity(),
        format_percent(line.discount_percent()),
        format_amount(line.line_net(), ws.currency())
    );
    ws.save(&quote)?;
    Ok(())
}

/// Show the quotation
fn cmd_list(cfg_dir: &Path) -> Result<()> {
    let ws = Workspace::open(cfg_dir)?;
    let quote = ws.quotation()?;
    let currency = ws.currency();

    if let Some(name) = &quote.customer.name {
        println!("Customer: {name}");
    }
    if let Some(date) = quote.customer.date {
        println!("Date:     {date}");
    }

    if quote.is_empty() {
        println!("No line items yet. Use 'paintquote add' to add one.");
        return Ok(());
    }

    let rows: Vec<LineRow> = quote
        .lines()
        .iter()
        .enumerate()
        .map(|(idx, line)| LineRow {
            index: idx + 1,
            code: line.product_code().to_string(),
            product: line.product_name().to_string(),
            pack: line.pack_label().to_string(),
            quantity: line.quantity(),
            unit_price: format_amount(line.unit_price(), currency),
            discount: format_percent(line.discount_percent()),
            line_net: format_amount(line.line_net(), currency),
        })
        .collect();
    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");

    let totals = quote.compute_totals();
    println!();
    println!("Subtotal:   {}", format_amount(totals.subtotal, currency));
    println!("Discount:   {}", format_amount(totals.total_discount, currency));
    println!("Net:        {}", format_amount(totals.net_before_vat, currency));
    println!(
        "VAT ({}):   {}",
        quote.vat_rate(),
        format_amount(totals.vat_amount, currency)
    );
    println!("Total:      {}", format_amount(totals.grand_total, currency));
    Ok(())
}

/// Discard the draft quotation
fn cmd_clear(cfg_dir: &Path) -> Result<()> {
    ensure_config_dir(cfg_dir)?;
    save_draft(cfg_dir, &Draft::default())?;
    println!("Cleared quotation.");
    Ok(())
}

/// Set customer details
fn cmd_customer(
    cfg_dir: &Path,
    name: Option<String>,
    phone: Option<String>,
    notes: Option<String>,
    date: Option<NaiveDate>,
) -> Result<()> {
    ensure_config_dir(cfg_dir)?;
    let mut draft = load_draft(cfg_dir)?;

    let changed = name.is_some() || phone.is_some() || notes.is_some() || date.is_some();
    if let Some(v) = name {
        draft.customer.name = Some(v);
    }
    if let Some(v) = phone {
        draft.customer.phone = Some(v);
    }
    if let Some(v) = notes {
        draft.customer.notes = Some(v);
    }
    if date.is_some() {
        draft.customer.date = date;
    }
    if changed {
        save_draft(cfg_dir, &draft)?;
    }

    let c = &draft.customer;
    println!("Customer: {}", c.name.as_deref().unwrap_or("-"));
    println!("Phone:    {}", c.phone.as_deref().unwrap_or("-"));
    println!("Notes:    {}", c.notes.as_deref().unwrap_or("-"));
    println!(
        "Date:     {}",
        c.date.map(|d| d.to_string()).unwrap_or_else(|| "today".to_string())
    );
    Ok(())
}

/// Export the quotation as CSV, JSON and/or PDF
fn cmd_export(
    cfg_dir: &Path,
    csv: Option<PathBuf>,
    json: bool,
    pdf: Option<Option<PathBuf>>,
    open: bool,
) -> Result<()> {
    let ws = Workspace::open(cfg_dir)?;
    let quote = ws.quotation()?;
    if quote.is_empty() {
        return Err(QuoteError::EmptyQuotation);
    }

    let date = quote
        .customer
        .date
        .unwrap_or_else(|| Local::now().date_naive());
    let snapshot = QuoteSnapshot::new(&quote, ws.currency(), date);

    // PDF is the default when no format is requested
    let pdf = match (&csv, json, pdf) {
        (None, false, None) => Some(None),
        (_, _, pdf) => pdf,
    };

    if let Some(path) = &csv {
        export_csv(&snapshot, path)?;
        println!("Saved CSV: {}", path.display());
    }
    if json {
        println!("{}", to_json(&snapshot)?);
    }
    if let Some(path) = pdf {
        let path = path.unwrap_or_else(|| {
            ws.config
                .output_dir(&ws.dir)
                .join(format!("quotation-{}.pdf", date.format("%Y%m%d")))
        });
        generate_pdf(&snapshot, &path)?;
        println!("Saved PDF: {}", path.display());
        if open {
            open_path(&path)?;
        }
    }
    Ok(())
}

fn open_path(pdf_path: &Path) -> Result<()> {
    // Open with system default viewer
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(pdf_path).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(pdf_path).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", ""])
            .arg(pdf_path)
            .spawn()?;
    }
    Ok(())
}

/// Interactive quotation builder on stdin/stdout
fn cmd_interactive(cfg_dir: &Path) -> Result<()> {
    let ws = Workspace::open(cfg_dir)?;
    let mut quote = ws.quotation()?;

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let added = run_session(
        &ws.catalogue,
        &mut quote,
        ws.config.quote.search_limit,
        stdin.lock(),
        stdout.lock(),
    )?;

    if added > 0 {
        ws.save(&quote)?;
    }
    Ok(())
}

/// Product assistant on stdin/stdout
fn cmd_chat(cfg_dir: &Path) -> Result<()> {
    let ws = Workspace::open(cfg_dir)?;
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    run_chat(&ws.catalogue, stdin.lock(), stdout.lock())
}

/// Check catalogue integrity
fn cmd_validate(cfg_dir: &Path) -> Result<()> {
    let ws = Workspace::open(cfg_dir)?;
    ws.config.vat_rate()?;
    let cat = &ws.catalogue;

    println!(
        "Catalogue OK: {} products, {} pack sizes",
        cat.len(),
        cat.pack_count()
    );
    println!("  Currency:       {}", cat.currency());
    if let Some(date) = cat.effective_date() {
        println!("  Effective date: {date}");
    }
    Ok(())
}

/// Show status
fn cmd_status(cfg_dir: &Path) -> Result<()> {
    let ws = Workspace::open(cfg_dir)?;
    let quote = ws.quotation()?;

    println!("Paintquote Status");
    println!("{}", "-".repeat(50));
    println!("Config directory: {}", ws.dir.display());
    println!("Products file:    {}", ws.config.products_path(&ws.dir).display());
    println!("Prices file:      {}", ws.config.prices_path(&ws.dir).display());
    println!("Products:         {}", ws.catalogue.len());
    println!("VAT rate:         {}", quote.vat_rate());
    println!("Quotation lines:  {}", quote.len());
    println!(
        "Quotation total:  {}",
        format_amount(quote.compute_totals().grand_total, ws.currency())
    );
    Ok(())
}
