//! Interactive customer browser.
//!
//! Reads one command per line from stdin:
//!
//! ```text
//! n          next page
//! p          previous page
//! g <page>   go to page
//! /<text>    search by exact name (debounced); `/` alone clears
//! s <id>     show a customer
//! d <id>     delete a customer
//! r          refresh
//! q          quit
//! ```

use tokio::io::{AsyncBufReadExt, BufReader};

use customers_client::{CustomerBrowser, CustomerClient, Debouncer, SEARCH_DEBOUNCE};
use customers_core::CustomerId;

/// A parsed browser command.
#[derive(Debug, Clone, PartialEq, Eq)]
enum BrowseCommand {
    Next,
    Previous,
    Page(u32),
    Search(String),
    Select(CustomerId),
    Delete(CustomerId),
    Refresh,
    Help,
    Quit,
    Unknown(String),
}

fn parse_command(line: &str) -> BrowseCommand {
    let line = line.trim();
    if let Some(text) = line.strip_prefix('/') {
        return BrowseCommand::Search(text.trim().to_owned());
    }

    let (head, arg) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(h, a)| (h, a.trim()));

    match (head, arg) {
        ("n", "") => BrowseCommand::Next,
        ("p", "") => BrowseCommand::Previous,
        ("r", "") => BrowseCommand::Refresh,
        ("q", "") => BrowseCommand::Quit,
        ("h" | "?", "") => BrowseCommand::Help,
        ("g", page) => page
            .parse()
            .map_or_else(|_| BrowseCommand::Unknown(line.to_owned()), BrowseCommand::Page),
        ("s", id) => id
            .parse()
            .map_or_else(|_| BrowseCommand::Unknown(line.to_owned()), BrowseCommand::Select),
        ("d", id) => id
            .parse()
            .map_or_else(|_| BrowseCommand::Unknown(line.to_owned()), BrowseCommand::Delete),
        _ => BrowseCommand::Unknown(line.to_owned()),
    }
}

#[allow(clippy::print_stdout)]
fn render(browser: &CustomerBrowser) {
    println!();
    for customer in browser.customers() {
        println!(
            "{:>6}  {:<28}  {:<32}  {}",
            customer.id.as_i32(),
            customer.name,
            customer.email.as_str(),
            customer.country
        );
    }
    if browser.customers().is_empty() {
        println!("  (no customers)");
    }

    let query = browser.query();
    let filter = query
        .name
        .as_ref()
        .map_or_else(String::new, |slug| format!("  name={slug}"));
    println!(
        "page {}/{}  total {}{filter}",
        query.page,
        browser.pages(),
        browser.total()
    );

    if let Some(customer) = browser.selected() {
        match serde_json::to_string_pretty(customer) {
            Ok(text) => println!("{text}"),
            Err(e) => tracing::warn!(error = %e, "Failed to render customer"),
        }
    }
    if let Some(error) = browser.last_error() {
        println!("error: {error}");
    }
}

#[allow(clippy::print_stdout)]
fn print_help() {
    println!(
        "n next | p previous | g <page> | /<name> search | s <id> show | d <id> delete | r refresh | q quit"
    );
}

/// Run the interactive browser until `q` or end of input.
///
/// Request failures are shown and the session continues.
///
/// # Errors
///
/// Returns an error if the first page cannot be loaded or stdin fails.
pub async fn run(api_url: &str, size: u32) -> Result<(), Box<dyn std::error::Error>> {
    let client = CustomerClient::new(api_url)?;
    let mut browser = CustomerBrowser::new(client, size);
    browser.refresh().await?;
    render(&browser);
    print_help();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut debouncer = Debouncer::new(SEARCH_DEBOUNCE);

    // Failures are recorded on the browser and rendered, so results are
    // only inspected for their effect on the view.
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_command(&line) {
                    BrowseCommand::Quit => break,
                    BrowseCommand::Next => {
                        let _ = browser.next_page().await;
                    }
                    BrowseCommand::Previous => {
                        let _ = browser.previous_page().await;
                    }
                    BrowseCommand::Page(page) => {
                        let _ = browser.go_to_page(page).await;
                    }
                    BrowseCommand::Search(text) => {
                        debouncer.push(text);
                        continue;
                    }
                    BrowseCommand::Select(id) => {
                        let _ = browser.select(id).await;
                    }
                    BrowseCommand::Delete(id) => {
                        let _ = browser.delete(id).await;
                    }
                    BrowseCommand::Refresh => {
                        let _ = browser.refresh().await;
                    }
                    BrowseCommand::Help => {
                        print_help();
                        continue;
                    }
                    BrowseCommand::Unknown(input) => {
                        tracing::warn!(input = %input, "Unknown command");
                        print_help();
                        continue;
                    }
                }
            }
            Some(text) = debouncer.next() => {
                browser.clear_selection();
                let _ = browser.search(&text).await;
            }
        }
        render(&browser);
    }

    Ok(())
}
