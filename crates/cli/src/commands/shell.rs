//! Interactive ordering session.
//!
//! Reads one command per line from stdin. The session keeps a cart and a view
//! state; the catalog snapshot comes from the shared [`CatalogStore`] and is
//! picked up again before each command, so a reload after the cache TTL
//! reprices the cart automatically.

use std::fmt::Write as _;
use std::sync::Arc;

use parts_order_cli::render::{
    render_cart, render_checkout, render_page, render_reconcile, render_status,
};
use parts_order_cli::{CatalogStore, OrderConfig};
use parts_order_core::{CatalogLoad, Product, Session, ViewState};
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, instrument};

use super::emit;

const HELP: &str = "\
Commands:
  search TEXT        filter by name or origin
  clear-search       show everything again
  page N | next | prev | first | last
  per-page N         products per page (5, 10, 15, 20 or any positive number)
  add ITEM           add one (ITEM is a number on this page or a product name)
  remove ITEM        remove one
  set ITEM QTY       set the quantity, 0 removes it
  cart               show the cart and total
  review             show the order message without sending
  send               prepare the order link and start a new order
  new                empty the cart and clear the search
  reload             fetch the catalog again
  help | quit
Press enter to show the current page again.
";

/// Product reference typed by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Target {
    /// One-based number on the current page.
    Position(usize),
    Name(String),
}

impl Target {
    /// Digits are a page position; anything else, or a quoted string, is a name.
    fn parse(s: &str) -> Self {
        let s = s.trim();
        if let Some(quoted) = s.strip_prefix('"').and_then(|r| r.strip_suffix('"')) {
            return Self::Name(quoted.to_owned());
        }
        s.parse()
            .map_or_else(|_| Self::Name(s.to_owned()), Self::Position)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Show,
    Search(String),
    ClearSearch,
    Page(usize),
    Next,
    Prev,
    First,
    Last,
    PerPage(usize),
    Add(Target),
    Remove(Target),
    Set(Target, u32),
    Cart,
    Review,
    Send,
    New,
    Reload,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
enum CommandError {
    #[error("unknown command {0:?}, type help for a list")]
    Unknown(String),
    #[error("{0} needs an argument")]
    MissingArgument(&'static str),
    #[error("not a number: {0:?}")]
    InvalidNumber(String),
}

fn number<T: std::str::FromStr>(s: &str) -> Result<T, CommandError> {
    s.trim()
        .parse()
        .map_err(|_| CommandError::InvalidNumber(s.trim().to_owned()))
}

fn parse_command(line: &str) -> Result<Command, CommandError> {
    let line = line.trim();
    let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();
    let require = |name: &'static str| {
        if rest.is_empty() {
            Err(CommandError::MissingArgument(name))
        } else {
            Ok(rest)
        }
    };

    let command = match word.to_lowercase().as_str() {
        "" | "list" | "ls" => Command::Show,
        "search" | "s" => Command::Search(require("search")?.to_owned()),
        "clear-search" | "clear" => Command::ClearSearch,
        "page" | "p" => Command::Page(number(require("page")?)?),
        "next" | "n" => Command::Next,
        "prev" | "previous" => Command::Prev,
        "first" => Command::First,
        "last" => Command::Last,
        "per-page" => Command::PerPage(number(require("per-page")?)?),
        "add" | "+" => Command::Add(Target::parse(require("add")?)),
        "remove" | "rm" | "-" => Command::Remove(Target::parse(require("remove")?)),
        "set" => {
            let args = require("set")?;
            let (target, quantity) = args
                .rsplit_once(char::is_whitespace)
                .ok_or(CommandError::MissingArgument("set"))?;
            Command::Set(Target::parse(target), number(quantity)?)
        }
        "cart" => Command::Cart,
        "review" => Command::Review,
        "send" => Command::Send,
        "new" => Command::New,
        "reload" => Command::Reload,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(CommandError::Unknown(other.to_owned())),
    };
    Ok(command)
}

enum Outcome {
    Continue(String),
    Quit,
}

struct Shell<'a> {
    config: &'a OrderConfig,
    store: &'a CatalogStore,
    session: Session,
    load: Arc<CatalogLoad>,
}

impl<'a> Shell<'a> {
    async fn new(config: &'a OrderConfig, store: &'a CatalogStore) -> Self {
        Self {
            config,
            store,
            session: Session::new(ViewState::new(config.items_per_page)),
            load: store.current().await,
        }
    }

    fn currency(&self) -> &str {
        &self.config.metadata.currency
    }

    /// Pick up a newer snapshot if the store has one and reprice the cart.
    async fn sync_catalog(&mut self) -> Option<String> {
        let latest = self.store.current().await;
        if Arc::ptr_eq(&latest, &self.load) {
            return None;
        }
        // Failures are not cached; only report the first one
        if !latest.is_available() && !self.load.is_available() {
            self.load = latest;
            return None;
        }
        self.adopt(latest)
    }

    fn adopt(&mut self, load: Arc<CatalogLoad>) -> Option<String> {
        self.load = load;
        if !self.load.is_available() {
            return Some(render_status(self.load.status()));
        }
        let report = self.session.reconcile(self.load.catalog());
        render_reconcile(&report, &self.config.metadata.currency)
    }

    fn page(&mut self) -> String {
        let load = Arc::clone(&self.load);
        if let Some(failure) = load.failure() {
            return format!(
                "Catalog unavailable: {}\nType reload to try again.\n",
                failure.reason
            );
        }
        let view = self.session.view(load.catalog());
        render_page(
            &view,
            self.session.cart(),
            self.session.view_state().search(),
            self.currency(),
        )
    }

    fn total_pages(&mut self) -> usize {
        let load = Arc::clone(&self.load);
        self.session.view(load.catalog()).total_pages
    }

    fn resolve(&mut self, target: &Target) -> Result<Product, String> {
        let load = Arc::clone(&self.load);
        match target {
            Target::Position(n) => {
                let view = self.session.view(load.catalog());
                n.checked_sub(1)
                    .and_then(|i| view.products().nth(i))
                    .cloned()
                    .ok_or_else(|| format!("No product number {n} on this page."))
            }
            Target::Name(name) => load
                .catalog()
                .find(name)
                .cloned()
                .ok_or_else(|| format!("Unknown product: {name}")),
        }
    }

    fn in_cart(&self, name: &str) -> String {
        format!("{name}: {} in cart\n", self.session.cart().quantity(name))
    }

    async fn execute(&mut self, command: Command) -> Outcome {
        let text = match command {
            Command::Show => self.page(),
            Command::Search(term) => {
                self.session.view_state_mut().set_search(&term);
                self.page()
            }
            Command::ClearSearch => {
                self.session.view_state_mut().set_search("");
                self.page()
            }
            Command::Page(n) => {
                self.session.view_state_mut().set_page(n.saturating_sub(1));
                self.page()
            }
            Command::Next => {
                let total = self.total_pages();
                self.session.view_state_mut().next_page(total);
                self.page()
            }
            Command::Prev => {
                self.session.view_state_mut().prev_page();
                self.page()
            }
            Command::First => {
                self.session.view_state_mut().first_page();
                self.page()
            }
            Command::Last => {
                let total = self.total_pages();
                self.session.view_state_mut().last_page(total);
                self.page()
            }
            Command::PerPage(n) => match self.session.view_state_mut().set_per_page(n) {
                Ok(_) => self.page(),
                Err(e) => format!("{e}\n"),
            },
            Command::Add(target) => match self.resolve(&target) {
                Ok(product) => {
                    self.session.increment(&product);
                    self.in_cart(product.name.as_str())
                }
                Err(message) => message + "\n",
            },
            Command::Remove(target) => {
                // Stale entries can still be removed by name
                let name = match (self.resolve(&target), target) {
                    (Ok(product), _) => product.name.into_inner(),
                    (Err(_), Target::Name(name)) => name,
                    (Err(message), Target::Position(_)) => return Outcome::Continue(message + "\n"),
                };
                self.session.decrement(&name);
                self.in_cart(&name)
            }
            Command::Set(target, quantity) => match self.resolve(&target) {
                Ok(product) => {
                    self.session.cart_mut().set_quantity(&product, quantity);
                    self.in_cart(product.name.as_str())
                }
                Err(message) => message + "\n",
            },
            Command::Cart => {
                let totals = self.session.totals(self.load.catalog());
                render_cart(&totals, self.currency())
            }
            Command::Review => self.checkout(false),
            Command::Send => self.checkout(true),
            Command::New => {
                self.session.new_order();
                let mut text = "Started a new order.\n".to_owned();
                text.push_str(&self.page());
                text
            }
            Command::Reload => {
                let latest = self.store.refresh().await;
                let mut text = self.adopt(latest).unwrap_or_default();
                if self.load.is_available() {
                    let _ = writeln!(text, "Catalog reloaded: {} products.", self.load.catalog().len());
                }
                text
            }
            Command::Help => HELP.to_owned(),
            Command::Quit => return Outcome::Quit,
        };
        Outcome::Continue(text)
    }

    #[instrument(skip(self))]
    fn checkout(&mut self, send: bool) -> String {
        let load = Arc::clone(&self.load);
        match self
            .session
            .checkout(&load, &self.config.destination, &self.config.metadata)
        {
            Ok(checkout) => {
                let mut text = render_checkout(&checkout, self.currency());
                if send {
                    info!(items = checkout.totals.item_count, "order handed off");
                    self.session.complete();
                    text.push_str("Open the link above to send the order. Started a new order.\n");
                }
                text
            }
            Err(e) => format!("Cannot prepare the order: {e}\n"),
        }
    }
}

/// Run the interactive session until `quit` or end of input.
///
/// # Errors
///
/// Returns an error only if stdin or stdout fail.
pub async fn run(
    config: &OrderConfig,
    store: &CatalogStore,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut shell = Shell::new(config, store).await;
    emit("Type help for a list of commands.\n")?;
    emit(&shell.page())?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        emit("> ")?;
        let Some(line) = lines.next_line().await? else {
            break;
        };

        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(e) => {
                emit(&format!("{e}\n"))?;
                continue;
            }
        };

        if let Some(notice) = shell.sync_catalog().await {
            emit(&notice)?;
        }
        match shell.execute(command).await {
            Outcome::Continue(text) => emit(&text)?,
            Outcome::Quit => break,
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::PathBuf;

    use serde_json::{Value, json};

    use super::*;

    /// Catalog file in the temp directory, removed on drop.
    struct Sheet(PathBuf);

    impl Sheet {
        fn new(rows: &Value) -> Self {
            let path = std::env::temp_dir()
                .join(format!("parts-order-shell-{}.json", uuid::Uuid::new_v4()));
            let sheet = Self(path);
            sheet.write(rows);
            sheet
        }

        fn write(&self, rows: &Value) {
            std::fs::write(&self.0, rows.to_string()).unwrap();
        }
    }

    impl Drop for Sheet {
        fn drop(&mut self) {
            let _ = std::fs::remove_file(&self.0);
        }
    }

    fn parts(count: usize, price: u32) -> Value {
        Value::Array(
            (1..=count)
                .map(|i| json!({"name": format!("Part {i:02}"), "origin": "Egypt", "price": price}))
                .collect(),
        )
    }

    fn config(sheet: &Sheet) -> OrderConfig {
        let source = sheet.0.display().to_string();
        OrderConfig::from_vars(|key| match key {
            "PARTS_ORDER_CATALOG_SOURCE" => Some(source.clone()),
            "PARTS_ORDER_WHATSAPP_NUMBER" => Some("+20 100 123 4567".to_owned()),
            "PARTS_ORDER_ITEMS_PER_PAGE" => Some("5".to_owned()),
            "PARTS_ORDER_CURRENCY" => Some("EGP".to_owned()),
            _ => None,
        })
        .unwrap()
    }

    async fn run_line(shell: &mut Shell<'_>, line: &str) -> String {
        match shell.execute(parse_command(line).unwrap()).await {
            Outcome::Continue(text) => text,
            Outcome::Quit => panic!("{line:?} quit the shell"),
        }
    }

    #[tokio::test]
    async fn test_execute_add_by_position_and_name() {
        let sheet = Sheet::new(&parts(12, 10));
        let config = config(&sheet);
        let store = CatalogStore::from_config(&config);
        let mut shell = Shell::new(&config, &store).await;

        assert_eq!(run_line(&mut shell, "add 2").await, "Part 02: 1 in cart\n");
        assert_eq!(run_line(&mut shell, "add Part 11").await, "Part 11: 1 in cart\n");
        assert_eq!(run_line(&mut shell, "+ 2").await, "Part 02: 2 in cart\n");
        assert_eq!(
            run_line(&mut shell, "add 9").await,
            "No product number 9 on this page.\n"
        );
        assert_eq!(
            run_line(&mut shell, "add Part 99").await,
            "Unknown product: Part 99\n"
        );
        assert_eq!(shell.session.cart().len(), 2);
        assert!(matches!(
            shell.execute(Command::Quit).await,
            Outcome::Quit
        ));
    }

    #[tokio::test]
    async fn test_page_and_last_are_clamped() {
        let sheet = Sheet::new(&parts(12, 10));
        let config = config(&sheet);
        let store = CatalogStore::from_config(&config);
        let mut shell = Shell::new(&config, &store).await;

        let text = run_line(&mut shell, "page 99").await;
        assert!(text.contains("Page 3 of 3 (12 items)"));
        assert!(text.contains("Part 11") && !text.contains("Part 10"));
        assert_eq!(shell.session.view_state().page(), 2);

        run_line(&mut shell, "first").await;
        assert_eq!(shell.session.view_state().page(), 0);
        let text = run_line(&mut shell, "last").await;
        assert!(text.contains("Page 3 of 3"));
        run_line(&mut shell, "next").await;
        assert_eq!(shell.session.view_state().page(), 2);

        // Page 0 is read as the first page
        run_line(&mut shell, "page 0").await;
        assert_eq!(shell.session.view_state().page(), 0);
    }

    #[tokio::test]
    async fn test_sync_catalog_reprices_cart() {
        let sheet = Sheet::new(&parts(3, 10));
        let config = config(&sheet);
        let store = CatalogStore::from_config(&config);
        let mut shell = Shell::new(&config, &store).await;
        run_line(&mut shell, "add Part 01").await;
        run_line(&mut shell, "add Part 01").await;

        assert_eq!(shell.sync_catalog().await, None);

        sheet.write(&parts(3, 12));
        store.refresh().await;
        assert_eq!(
            shell.sync_catalog().await.as_deref(),
            Some("Price changed: Part 01 10 → 12 EGP\n")
        );
        assert_eq!(shell.sync_catalog().await, None);

        let cart = run_line(&mut shell, "cart").await;
        assert!(cart.ends_with("Items: 2  Total: 24 EGP\n"));
    }

    #[tokio::test]
    async fn test_sync_catalog_reports_first_failure_only() {
        let sheet = Sheet::new(&parts(3, 10));
        let config = config(&sheet);
        let store = CatalogStore::from_config(&config);
        let mut shell = Shell::new(&config, &store).await;

        sheet.write(&json!("not rows"));
        store.refresh().await;
        let notice = shell.sync_catalog().await.unwrap();
        assert!(notice.starts_with("Catalog unavailable:"));

        // Every call reloads and fails again, but only the first is reported
        assert_eq!(shell.sync_catalog().await, None);
        assert_eq!(shell.sync_catalog().await, None);
        assert!(run_line(&mut shell, "").await.ends_with("Type reload to try again.\n"));

        sheet.write(&parts(3, 10));
        shell.sync_catalog().await;
        assert!(shell.load.is_available());
        assert!(run_line(&mut shell, "").await.contains("Part 01"));
    }

    #[tokio::test]
    async fn test_remove_stale_item_by_name() {
        let sheet = Sheet::new(&parts(3, 10));
        let config = config(&sheet);
        let store = CatalogStore::from_config(&config);
        let mut shell = Shell::new(&config, &store).await;
        run_line(&mut shell, "add Part 03").await;

        sheet.write(&parts(2, 10));
        store.refresh().await;
        assert_eq!(
            shell.sync_catalog().await.as_deref(),
            Some("No longer available: Part 03\n")
        );
        assert_eq!(shell.session.cart().quantity("Part 03"), 1);

        assert_eq!(run_line(&mut shell, "add Part 03").await, "Unknown product: Part 03\n");
        assert_eq!(run_line(&mut shell, "remove Part 03").await, "Part 03: 0 in cart\n");
        assert!(shell.session.cart().is_empty());
    }

    #[tokio::test]
    async fn test_review_keeps_cart_and_send_clears_it() {
        let sheet = Sheet::new(&parts(12, 10));
        let config = config(&sheet);
        let store = CatalogStore::from_config(&config);
        let mut shell = Shell::new(&config, &store).await;
        run_line(&mut shell, "set Part 04 3").await;
        run_line(&mut shell, "per-page 10").await;
        run_line(&mut shell, "search part 0").await;

        let review = run_line(&mut shell, "review").await;
        assert!(review.contains("- Part 04: 3 × 10 = 30"));
        assert!(review.contains("Send: https://wa.me/201001234567?text="));
        assert_eq!(shell.session.cart().quantity("Part 04"), 3);

        let sent = run_line(&mut shell, "send").await;
        assert!(sent.contains("Send: https://wa.me/201001234567?text="));
        assert!(sent.ends_with("Started a new order.\n"));
        assert!(shell.session.cart().is_empty());
        assert_eq!(shell.session.view_state().search(), "");
        assert_eq!(shell.session.view_state().per_page().get(), 5);

        assert!(
            run_line(&mut shell, "send")
                .await
                .starts_with("Cannot prepare the order:")
        );
    }

    #[test]
    fn test_parse_navigation() {
        assert_eq!(parse_command("").unwrap(), Command::Show);
        assert_eq!(parse_command("next").unwrap(), Command::Next);
        assert_eq!(parse_command("  PREV ").unwrap(), Command::Prev);
        assert_eq!(parse_command("page 3").unwrap(), Command::Page(3));
        assert_eq!(parse_command("per-page 20").unwrap(), Command::PerPage(20));
        assert_eq!(
            parse_command("search  bosch plug ").unwrap(),
            Command::Search("bosch plug".to_owned())
        );
    }

    #[test]
    fn test_parse_cart_commands() {
        assert_eq!(
            parse_command("add 2").unwrap(),
            Command::Add(Target::Position(2))
        );
        assert_eq!(
            parse_command("add Filter A").unwrap(),
            Command::Add(Target::Name("Filter A".to_owned()))
        );
        assert_eq!(
            parse_command("rm \"90919\"").unwrap(),
            Command::Remove(Target::Name("90919".to_owned()))
        );
        assert_eq!(
            parse_command("set Filter A 4").unwrap(),
            Command::Set(Target::Name("Filter A".to_owned()), 4)
        );
        assert_eq!(
            parse_command("set 1 0").unwrap(),
            Command::Set(Target::Position(1), 0)
        );
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            parse_command("frobnicate"),
            Err(CommandError::Unknown("frobnicate".to_owned()))
        );
        assert_eq!(
            parse_command("search"),
            Err(CommandError::MissingArgument("search"))
        );
        assert_eq!(
            parse_command("set 3"),
            Err(CommandError::MissingArgument("set"))
        );
        assert_eq!(
            parse_command("page two"),
            Err(CommandError::InvalidNumber("two".to_owned()))
        );
        assert_eq!(
            parse_command("set Filter A -1"),
            Err(CommandError::InvalidNumber("-1".to_owned()))
        );
    }
}
