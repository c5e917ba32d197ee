use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

use crate::analytics;
use crate::basket::{self, BasketParams, RuleMetric};
use crate::config::{AppPaths, Settings, STORE_ENV};
use crate::entry::{EntryDraft, SaleField};
use crate::filter::{ChannelFilter, SaleFilter, Search};
use crate::items::sum_item_amounts;
use crate::models::flag_code;
use crate::sheet::{parse_date, SheetFile};
use crate::store::Ledger;
use crate::ui::util::{format_amount, format_measure, truncate};

pub(crate) fn as_cli(args: &[String], settings: &Settings, paths: &AppPaths) -> Result<()> {
    let rest = &args[2..];
    match args[1].as_str() {
        "list" | "ls" => cli_list(rest, &mut super::open_ledger(settings, paths)?),
        "summary" | "s" => cli_summary(rest, &mut super::open_ledger(settings, paths)?),
        "channels" => cli_channels(rest, &mut super::open_ledger(settings, paths)?),
        "items" => cli_items(rest, &mut super::open_ledger(settings, paths)?),
        "item" => cli_item(rest, &mut super::open_ledger(settings, paths)?),
        "rules" => cli_rules(rest, settings, &mut super::open_ledger(settings, paths)?),
        "add" => cli_add(rest, settings, &mut super::open_ledger(settings, paths)?),
        "import" => cli_import(rest, &mut super::open_ledger(settings, paths)?),
        "export" => cli_export(rest, &mut super::open_ledger(settings, paths)?),
        "config" => cli_config(rest, settings, paths),
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        "--version" | "-V" | "version" => {
            println!("shoptui {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        other => {
            print_usage();
            anyhow::bail!("Unknown command: {other}");
        }
    }
}

fn print_usage() {
    println!("ShopTUI: sales ledger and basket analysis for a small shop");
    println!();
    println!("Usage: shoptui [command]");
    println!();
    println!("Commands:");
    println!("  (none)                        Launch interactive TUI");
    println!("  list                          Print sales (newest last)");
    println!("  summary                       Summary statistics of the numeric columns");
    println!("  channels                      Sales and totals per channel");
    println!("  items                         Quantity sold per item");
    println!("  item <name...>                Metrics and channel split for one item");
    println!("  rules                         Association rules between items");
    println!("    --min-support <0-1>         Minimum itemset support (default from settings)");
    println!("    --metric <name>             support, confidence, lift, leverage, conviction");
    println!("    --min-threshold <n>         Minimum value of the metric");
    println!("  add --channel <name> [...]    Append a sale");
    println!("    --date <YYYY-MM-DD> --amount <n> --shipping <n> --paid-by <n> --income <n>");
    println!("    --ad --rent --item \"<qty> <name>\" (repeatable)");
    println!("  import <file.csv>             Append the rows of a sheet file");
    println!("  export <file.csv>             Write the (filtered) rows to a sheet file");
    println!("  config [init]                 Show effective settings, or write the defaults");
    println!("  --help, -h                    Show this help");
    println!("  --version, -V                 Show version");
    println!();
    println!("Filters for list, summary, channels, items, item, rules and export:");
    println!("  --from <YYYY-MM-DD>  --to <YYYY-MM-DD>  --channel <name>  --search <regex>");
    println!();
    println!("Environment: {STORE_ENV}=<path> selects the store (.csv for a sheet file).");
}

// ── Flag parsing ─────────────────────────────────────────────

pub(crate) fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

/// Arguments that are neither flags nor a flag's value, in order.
fn positionals(args: &[String]) -> Vec<&str> {
    let mut found = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg.starts_with("--") {
            if !matches!(arg.as_str(), "--ad" | "--rent") {
                iter.next();
            }
            continue;
        }
        found.push(arg.as_str());
    }
    found
}

pub(crate) fn positional(args: &[String]) -> Option<&str> {
    positionals(args).into_iter().next()
}

/// All positional words joined by single spaces.
pub(crate) fn positional_words(args: &[String]) -> Option<String> {
    let words = positionals(args);
    (!words.is_empty()).then(|| words.join(" "))
}

pub(crate) fn parse_filter(args: &[String]) -> Result<SaleFilter> {
    let start = flag_value(args, "--from")
        .map(|d| parse_date(d).with_context(|| format!("Invalid --from date: {d}")))
        .transpose()?;
    let end = flag_value(args, "--to")
        .map(|d| parse_date(d).with_context(|| format!("Invalid --to date: {d}")))
        .transpose()?;
    if let (Some(s), Some(e)) = (start, end) {
        if s > e {
            anyhow::bail!("--from {s} is after --to {e}");
        }
    }
    Ok(SaleFilter {
        start,
        end,
        channel: flag_value(args, "--channel").map_or(ChannelFilter::All, ChannelFilter::parse),
        search: flag_value(args, "--search")
            .filter(|q| !q.trim().is_empty())
            .map(Search::new),
    })
}

/// Settings-provided parameters with any command-line overrides applied.
pub(crate) fn parse_basket_params(args: &[String], settings: &Settings) -> Result<BasketParams> {
    let mut params = settings.basket_params()?;
    if let Some(v) = flag_value(args, "--min-support") {
        let support: f64 = v
            .parse()
            .with_context(|| format!("Invalid --min-support: {v}"))?;
        if !(support > 0.0 && support <= 1.0) {
            return Err(basket::BasketError::InvalidSupport(support).into());
        }
        params.min_support = support;
    }
    if let Some(v) = flag_value(args, "--metric") {
        params.metric = v.parse::<RuleMetric>()?;
    }
    if let Some(v) = flag_value(args, "--min-threshold") {
        params.min_threshold = v
            .parse()
            .with_context(|| format!("Invalid --min-threshold: {v}"))?;
    }
    Ok(params)
}

/// Fill a draft from `add` flags. Items are taken from every `--item`.
pub(crate) fn parse_draft(args: &[String], ledger: &Ledger, settings: &Settings) -> Result<EntryDraft> {
    let today = chrono::Local::now().date_naive();
    let mut draft = EntryDraft::new(ledger.sales(), today, &settings.default_channel);

    const VALUE_FLAGS: [(&str, SaleField); 7] = [
        ("--job", SaleField::JobId),
        ("--date", SaleField::Date),
        ("--channel", SaleField::Channel),
        ("--amount", SaleField::Amount),
        ("--shipping", SaleField::Shipping),
        ("--paid-by", SaleField::PaidBy),
        ("--income", SaleField::OperatorIncome),
    ];
    for (flag, field) in VALUE_FLAGS {
        if let Some(value) = flag_value(args, flag) {
            draft.set(field, value)?;
        }
    }
    draft.ad = has_flag(args, "--ad");
    draft.rent = has_flag(args, "--rent");

    for w in args.windows(2).filter(|w| w[0] == "--item") {
        draft.add_item_text(&w[1])?;
    }
    Ok(draft)
}

// ── Commands ─────────────────────────────────────────────────

fn cli_list(args: &[String], ledger: &mut Ledger) -> Result<()> {
    let filter = parse_filter(args)?;
    let selection = filter.apply(ledger.sales());
    if selection.is_empty() {
        println!("No results found.");
        return Ok(());
    }

    println!(
        "{:>6} {:<10} {:<10} {:<2} {:<4} {:>10} {:>9} {:>10} {:>9} {:>9}  Items",
        "Job #", "Date", "Channel", "Ad", "Rent", "Amount", "Shipping", "Total", "Paid By", "Income"
    );
    println!("{}", "─".repeat(100));
    for sale in selection.rows() {
        println!(
            "{:>6} {:<10} {:<10} {:<2} {:<4} {:>10} {:>9} {:>10} {:>9} {:>9}  {}",
            sale.job_id,
            sale.date.format("%Y-%m-%d"),
            truncate(&sale.channel, 10),
            flag_code(sale.ad),
            flag_code(sale.rent),
            format_amount(sale.amount),
            format_amount(sale.shipping),
            format_amount(sale.total_amount),
            format_amount(sale.paid_by),
            format_amount(sale.operator_income),
            sale.item_text,
        );
    }
    println!();
    println!("{} of {} rows", selection.len(), ledger.sales().len());
    Ok(())
}

fn cli_summary(args: &[String], ledger: &mut Ledger) -> Result<()> {
    let filter = parse_filter(args)?;
    let selection = filter.apply(ledger.sales());
    let Some(stats) = analytics::describe(selection.rows()) else {
        println!("No data available for the selected filters.");
        return Ok(());
    };

    println!("ShopTUI summary ({} rows)", selection.len());
    println!("{}", "─".repeat(100));
    print!("{:<6}", "");
    for s in &stats {
        print!(" {:>15}", s.column);
    }
    println!();

    let rows: [(&str, fn(&analytics::ColumnStats) -> String); 8] = [
        ("count", |s| s.count.to_string()),
        ("mean", |s| format!("{:.2}", s.mean)),
        ("std", |s| s.std.map_or_else(|| "-".into(), |v| format!("{v:.2}"))),
        ("min", |s| format!("{:.2}", s.min)),
        ("25%", |s| format!("{:.2}", s.q25)),
        ("50%", |s| format!("{:.2}", s.median)),
        ("75%", |s| format!("{:.2}", s.q75)),
        ("max", |s| format!("{:.2}", s.max)),
    ];
    for (label, cell) in rows {
        print!("{label:<6}");
        for s in &stats {
            print!(" {:>15}", cell(s));
        }
        println!();
    }

    let months = analytics::monthly_totals(selection.rows());
    if !months.is_empty() {
        println!();
        println!("Total amount per month:");
        for (month, total) in &months {
            println!("  {month:<10} {:>12}", format_amount(*total));
        }
    }
    Ok(())
}

fn cli_channels(args: &[String], ledger: &mut Ledger) -> Result<()> {
    let filter = parse_filter(args)?;
    let selection = filter.apply(ledger.sales());
    if selection.is_empty() {
        println!("No data available for the selected filters.");
        return Ok(());
    }

    println!("{:<16} {:>6} {:>14}", "Channel", "Sales", "Total Amount");
    println!("{}", "─".repeat(38));
    for channel in analytics::channels(ledger.sales()) {
        let rows: Vec<_> = selection
            .rows()
            .iter()
            .filter(|s| s.channel == channel)
            .collect();
        if rows.is_empty() {
            continue;
        }
        let total: rust_decimal::Decimal = rows.iter().map(|s| s.total_amount).sum();
        println!(
            "{:<16} {:>6} {:>14}",
            truncate(&channel, 16),
            rows.len(),
            format_amount(total)
        );
    }
    Ok(())
}

fn cli_items(args: &[String], ledger: &mut Ledger) -> Result<()> {
    let filter = parse_filter(args)?;
    let selection = filter.apply(ledger.sales());
    let totals = sum_item_amounts(selection.rows().iter().map(|s| s.item_text.as_str()));
    if totals.is_empty() {
        println!("No items recorded in the selected rows.");
        return Ok(());
    }

    println!("{:<28} {:>8}", "Item", "Sold");
    println!("{}", "─".repeat(37));
    for (name, qty) in totals.ranked() {
        println!("{:<28} {:>8}", truncate(name, 28), qty);
    }
    println!("{}", "─".repeat(37));
    println!("{:<28} {:>8}", "Total", totals.grand_total());
    if totals.skipped() > 0 {
        eprintln!("Warning: {} malformed item segment(s) skipped", totals.skipped());
    }
    Ok(())
}

/// Item names may span several words: `shoptui item tote bag`.
pub(crate) fn item_name(args: &[String]) -> Result<String> {
    let Some(name) = positional_words(args) else {
        anyhow::bail!("Usage: shoptui item <name> [--from ..] [--to ..]");
    };
    Ok(crate::models::normalize_name(&name))
}

fn cli_item(args: &[String], ledger: &mut Ledger) -> Result<()> {
    let name = item_name(args)?;
    let filter = parse_filter(args)?;
    let selection = filter.apply(ledger.sales());

    let metrics = analytics::item_metrics(selection.rows(), &name);
    if metrics.customers == 0 {
        println!("No sales of '{name}' in the selected rows");
        return Ok(());
    }

    println!("Item: {name}");
    println!("{}", "─".repeat(40));
    println!("  Items sold:  {}", metrics.items_sold);
    println!("  Customers:   {}", metrics.customers);
    if let Some(percent) = metrics.ad_percent() {
        println!(
            "  Ad sales:    {} ({percent:.1}%)",
            metrics.ad_sales
        );
        println!(
            "  Organic:     {} ({:.1}%)",
            metrics.organic_sales,
            100.0 - percent
        );
    }
    println!();
    println!("By channel:");
    for (channel, count) in analytics::item_channel_distribution(selection.rows(), &name) {
        println!("  {channel:<16} {count:>6}");
    }
    Ok(())
}

fn cli_rules(args: &[String], settings: &Settings, ledger: &mut Ledger) -> Result<()> {
    let filter = parse_filter(args)?;
    let params = parse_basket_params(args, settings)?;
    let selection = filter.apply(ledger.sales());
    if selection.is_empty() {
        println!("No data available for the selected filters.");
        return Ok(());
    }

    let rules = basket::analyze(selection.rows(), &params)?;
    if rules.is_empty() {
        println!("No significant rules found with the selected parameters.");
        return Ok(());
    }

    println!(
        "{} rules (support >= {}, {} >= {})",
        rules.len(),
        params.min_support,
        params.metric,
        params.min_threshold
    );
    println!(
        "{:<28} {:<28} {:>9} {:>10} {:>9} {:>9} {:>10}",
        "Antecedents", "Consequents", "Support", "Confidence", "Lift", "Leverage", "Conviction"
    );
    println!("{}", "─".repeat(110));
    for rule in &rules {
        println!(
            "{:<28} {:<28} {:>9} {:>10} {:>9} {:>9} {:>10}",
            truncate(&rule.antecedents_label(), 28),
            truncate(&rule.consequents_label(), 28),
            format_measure(Some(rule.support)),
            format_measure(Some(rule.confidence)),
            format_measure(Some(rule.lift)),
            format_measure(Some(rule.leverage)),
            format_measure(rule.conviction),
        );
    }
    Ok(())
}

fn cli_add(args: &[String], settings: &Settings, ledger: &mut Ledger) -> Result<()> {
    let draft = parse_draft(args, ledger, settings)?;
    let sale = draft.build()?;
    let job_id = sale.job_id;
    let summary = format!(
        "job #{job_id} on {} via {}: {} [{}]",
        sale.date.format("%Y-%m-%d"),
        sale.channel,
        format_amount(sale.total_amount),
        sale.item_text
    );
    ledger.append(sale)?;
    println!("Added {summary}");
    Ok(())
}

fn cli_import(args: &[String], ledger: &mut Ledger) -> Result<()> {
    let Some(file_path) = positional(args) else {
        anyhow::bail!("Usage: shoptui import <file.csv>");
    };
    let expanded = shellexpand(file_path);
    let path = Path::new(&expanded);
    if !path.exists() {
        anyhow::bail!("File not found: {file_path}");
    }

    let rows = SheetFile::new(path).read()?;
    if rows.is_empty() {
        println!("No rows in {file_path}");
        return Ok(());
    }
    let count = ledger.append_all(rows)?;
    info!(count, file = %path.display(), "Imported sheet");
    println!("Imported {count} rows into {}", ledger.location());
    Ok(())
}

fn cli_export(args: &[String], ledger: &mut Ledger) -> Result<()> {
    let filter = parse_filter(args)?;
    let output_path = positional(args)
        .map(shellexpand)
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            format!("{home}/shoptui-export.csv")
        });

    let rows: Vec<_> = filter.apply(ledger.sales()).rows().iter().map(|s| (*s).clone()).collect();
    if rows.is_empty() {
        println!("No rows to export");
        return Ok(());
    }
    SheetFile::new(Path::new(&output_path)).write(&rows)?;
    println!("Exported {} rows to {output_path}", rows.len());
    Ok(())
}

fn cli_config(args: &[String], settings: &Settings, paths: &AppPaths) -> Result<()> {
    let settings_file = paths.settings_file();
    if args.first().map(String::as_str) == Some("init") {
        if settings_file.exists() {
            anyhow::bail!("Settings file already exists: {}", settings_file.display());
        }
        Settings::default().save_to(&settings_file)?;
        println!("Wrote {}", settings_file.display());
        return Ok(());
    }

    println!("Settings file:  {}", settings_file.display());
    println!("Data directory: {}", paths.data_dir.display());
    println!("Store:          {}", settings.resolved_store(paths).display());
    println!("Log file:       {}", paths.data_dir.join(crate::logging::LOG_FILE).display());
    println!();
    println!("{}", serde_json::to_string_pretty(settings)?);
    Ok(())
}

pub(crate) fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        format!("{home}/{rest}")
    } else {
        path.to_string()
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
