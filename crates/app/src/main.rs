use std::{error::Error, io::Write};

use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand, ValueEnum};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    style::Print,
    terminal,
    terminal::ClearType,
};
use engine::{
    Engine, Frequency, Identity, MoneyCents, Session, Transaction, TransactionKind,
};
use migration::MigratorTrait;
use sea_orm::Database;

mod settings;

#[derive(Parser, Debug)]
#[command(name = "gruzzolo")]
#[command(about = "Personal ledger with recurring income/expense entries")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`); falls
    /// back to the `sqlite.path` setting.
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// The user to act as. Every command except `register` prompts for the
    /// password and logs in first.
    #[arg(long, short)]
    username: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a new user (prompts for the password twice).
    Register,
    /// Record an income entry.
    Income(EntryArgs),
    /// Record an expense entry.
    Expense(EntryArgs),
    /// List entries, oldest first.
    List(ListArgs),
    /// Show the balance plus income/expense totals.
    Balance,
    /// Manage recurring rules.
    Rule(RuleArgs),
    /// Manage categories.
    Categories(CategoriesArgs),
    /// Delete every entry of the user.
    Clear(ClearArgs),
}

#[derive(Args, Debug)]
struct EntryArgs {
    /// Amount in major units, e.g. `12.50`.
    #[arg(long)]
    amount: String,
    #[arg(long)]
    category: String,
    /// Calendar date (YYYY-MM-DD); defaults to today.
    #[arg(long)]
    date: Option<NaiveDate>,
    #[arg(long)]
    note: Option<String>,
}

#[derive(Args, Debug)]
struct ListArgs {
    /// Restrict the listing to one category.
    #[arg(long)]
    category: Option<String>,
    /// Emit JSON instead of the plain listing.
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct RuleArgs {
    #[command(subcommand)]
    command: RuleCommand,
}

#[derive(Subcommand, Debug)]
enum RuleCommand {
    /// Create a recurring rule.
    Add(RuleAddArgs),
    /// List the user's rules.
    List,
}

#[derive(Args, Debug)]
struct RuleAddArgs {
    #[arg(long, value_enum)]
    kind: KindArg,
    #[arg(long, value_enum)]
    frequency: FrequencyArg,
    /// Amount in major units, e.g. `20`.
    #[arg(long)]
    amount: String,
    #[arg(long)]
    category: String,
    /// Anchor date the schedule counts from; defaults to today, meaning the
    /// first occurrence lands one period from now.
    #[arg(long)]
    starting: Option<NaiveDate>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum KindArg {
    Income,
    Expense,
}

impl From<KindArg> for TransactionKind {
    fn from(value: KindArg) -> Self {
        match value {
            KindArg::Income => TransactionKind::Income,
            KindArg::Expense => TransactionKind::Expense,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum FrequencyArg {
    Weekly,
    Monthly,
}

impl From<FrequencyArg> for Frequency {
    fn from(value: FrequencyArg) -> Self {
        match value {
            FrequencyArg::Weekly => Frequency::Weekly,
            FrequencyArg::Monthly => Frequency::Monthly,
        }
    }
}

#[derive(Args, Debug)]
struct CategoriesArgs {
    #[command(subcommand)]
    command: CategoriesCommand,
}

#[derive(Subcommand, Debug)]
enum CategoriesCommand {
    /// List the user's categories.
    List,
    /// Register a new category.
    Add {
        #[arg(long)]
        name: String,
    },
}

#[derive(Args, Debug)]
struct ClearArgs {
    /// Skip the confirmation prompt.
    #[arg(long)]
    yes: bool,
}

struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> Result<Self, Box<dyn Error + Send + Sync>> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn prompt_password(prompt: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
    let _raw = RawModeGuard::enter()?;

    let mut out = std::io::stderr();
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(prompt)
    )?;
    out.flush()?;

    let mut buf = String::new();
    loop {
        let Event::Key(KeyEvent {
            code, modifiers, ..
        }) = event::read()?
        else {
            continue;
        };

        match code {
            KeyCode::Enter => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                break;
            }
            KeyCode::Backspace => {
                if buf.pop().is_some() {
                    execute!(out, cursor::MoveLeft(1), Print(" "), cursor::MoveLeft(1))?;
                    out.flush()?;
                }
            }
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                return Err("interrupted".into());
            }
            KeyCode::Char(ch) if !modifiers.contains(KeyModifiers::CONTROL) => {
                buf.push(ch);
                execute!(out, Print("*"))?;
                out.flush()?;
            }
            _ => {}
        }
    }

    Ok(buf)
}

fn prompt_password_twice() -> Result<String, Box<dyn Error + Send + Sync>> {
    let mut out = std::io::stderr();
    for _ in 0..3 {
        let p1 = prompt_password("Password: ")?;
        if p1.is_empty() {
            execute!(
                out,
                cursor::MoveToColumn(0),
                terminal::Clear(ClearType::CurrentLine),
                Print("Password must not be empty.\r\n")
            )?;
            continue;
        }

        let p2 = prompt_password("Confirm password: ")?;
        if p1 == p2 {
            return Ok(p1);
        }

        execute!(
            out,
            cursor::MoveToColumn(0),
            terminal::Clear(ClearType::CurrentLine),
            Print("Passwords do not match. Try again.\r\n")
        )?;
    }

    Err("too many attempts".into())
}

fn confirm(question: &str) -> Result<bool, Box<dyn Error + Send + Sync>> {
    eprint!("{question} [y/N] ");
    std::io::stderr().flush()?;
    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

fn print_entry(tx: &Transaction) {
    let sign = match tx.kind {
        TransactionKind::Income => '+',
        TransactionKind::Expense => '-',
    };
    let note = tx.note.as_deref().unwrap_or("");
    println!(
        "{}  {sign}{:>12}  {:<16} {note}",
        tx.occurred_on, tx.amount.to_string(), tx.category
    );
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn Error + Send + Sync>> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "gruzzolo={level},engine={level}",
            level = settings.app.level
        ))
        .with_writer(std::io::stderr)
        .init();

    let database_url = cli
        .database_url
        .clone()
        .unwrap_or_else(|| format!("sqlite:{}?mode=rwc", settings.sqlite.path));

    let db = Database::connect(&database_url).await?;
    migration::Migrator::up(&db, None).await?;
    tracing::debug!(url = %database_url, "database ready");
    let engine = Engine::builder().database(db).build().await?;

    let Cli {
        username, command, ..
    } = cli;

    let mut session = Session::new();
    if !matches!(command, Command::Register) {
        let password = prompt_password("Password: ")?;
        session.login(engine.authenticate(&username, &password).await?);

        // Catch up pending recurring rules before any read, so listings and
        // balances are always current.
        let today = Local::now().date_naive();
        let materialized = engine.catch_up(session.identity()?, today).await?;
        if materialized > 0 {
            println!("materialized {materialized} recurring entries");
        }
    }

    match command {
        Command::Register => {
            let password = prompt_password_twice()?;
            engine.register(&username, &password).await?;
            println!("created user: {username}");
        }
        Command::Income(args) => {
            add_entry(&engine, session.identity()?, TransactionKind::Income, args).await?;
        }
        Command::Expense(args) => {
            add_entry(&engine, session.identity()?, TransactionKind::Expense, args).await?;
        }
        Command::List(args) => {
            let entries = engine
                .list(session.identity()?, args.category.as_deref())
                .await?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else if entries.is_empty() {
                println!("no entries");
            } else {
                for entry in &entries {
                    print_entry(entry);
                }
            }
        }
        Command::Balance => {
            let totals = engine.statistics(session.identity()?).await?;
            println!("balance:  {}", totals.balance);
            println!("income:   {}", totals.income);
            println!("expenses: {}", totals.expenses);
        }
        Command::Rule(RuleArgs {
            command: RuleCommand::Add(args),
        }) => {
            let amount: MoneyCents = args.amount.parse()?;
            let starting = args.starting.unwrap_or_else(|| Local::now().date_naive());
            let rule = engine
                .add_rule(
                    session.identity()?,
                    args.kind.into(),
                    args.frequency.into(),
                    amount,
                    &args.category,
                    starting,
                )
                .await?;
            println!(
                "created {} {} rule: {} {} (anchored {})",
                rule.frequency.as_str(),
                rule.kind.as_str(),
                rule.amount,
                rule.category,
                rule.last_materialized
            );
        }
        Command::Rule(RuleArgs {
            command: RuleCommand::List,
        }) => {
            let rules = engine.list_rules(session.identity()?).await?;
            if rules.is_empty() {
                println!("no rules");
            }
            for rule in &rules {
                println!(
                    "{}  {:<8} {:<8} {:>12}  {:<16} last materialized {}",
                    rule.id,
                    rule.kind.as_str(),
                    rule.frequency.as_str(),
                    rule.amount.to_string(),
                    rule.category,
                    rule.last_materialized
                );
            }
        }
        Command::Categories(CategoriesArgs {
            command: CategoriesCommand::List,
        }) => {
            for category in engine.list_categories(session.identity()?).await? {
                let marker = if category.builtin { "*" } else { " " };
                println!("{marker} {}", category.name);
            }
        }
        Command::Categories(CategoriesArgs {
            command: CategoriesCommand::Add { name },
        }) => {
            let canonical = engine.add_category(session.identity()?, &name).await?;
            println!("category: {canonical}");
        }
        Command::Clear(args) => {
            let identity = session.identity()?;
            if !args.yes
                && !confirm(&format!(
                    "Delete ALL entries for {}?",
                    identity.username()
                ))?
            {
                println!("aborted");
                return Ok(());
            }
            let removed = engine.clear(identity).await?;
            println!("removed {removed} entries");
        }
    }

    session.logout();
    Ok(())
}

async fn add_entry(
    engine: &Engine,
    identity: &Identity,
    kind: TransactionKind,
    args: EntryArgs,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let amount: MoneyCents = args.amount.parse()?;
    let date = args.date.unwrap_or_else(|| Local::now().date_naive());
    let entry = engine
        .append(
            identity,
            kind,
            date,
            amount,
            &args.category,
            args.note.as_deref(),
        )
        .await?;
    print_entry(&entry);
    Ok(())
}
