use std::{error::Error, io::Write};

use clap::{Args, Parser, Subcommand};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    style::Print,
    terminal,
    terminal::ClearType,
};
use engine::{Engine, Money, NewCar, RegisterUserCmd, TopUpCmd};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Parser, Debug)]
#[command(name = "rental_admin")]
#[command(about = "Admin utilities for the car rental service (bootstrap cars/users)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./rental.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Car(Car),
    User(User),
}

#[derive(Args, Debug)]
struct Car {
    #[command(subcommand)]
    command: CarCommand,
}

#[derive(Subcommand, Debug)]
enum CarCommand {
    Create(CarCreateArgs),
    List(CarListArgs),
}

#[derive(Args, Debug)]
struct CarCreateArgs {
    #[arg(long)]
    name: String,
    #[arg(long, default_value = "")]
    category: String,
    /// Daily rate as a decimal, e.g. `350000` or `99.50`.
    #[arg(long, value_parser = parse_money)]
    price_per_day: Money,
}

#[derive(Args, Debug)]
struct CarListArgs {
    /// Only list cars that can be rented.
    #[arg(long)]
    available: bool,
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    Create(UserCreateArgs),
    TopUp(UserTopUpArgs),
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
}

#[derive(Args, Debug)]
struct UserTopUpArgs {
    #[arg(long)]
    email: String,
    /// Amount to credit as a decimal, e.g. `200.00`.
    #[arg(long, value_parser = parse_money)]
    amount: Money,
}

fn parse_money(raw: &str) -> Result<Money, String> {
    raw.parse::<Money>().map_err(|err| err.to_string())
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
        if p1.chars().count() < MIN_PASSWORD_LEN {
            execute!(
                out,
                cursor::MoveToColumn(0),
                terminal::Clear(ClearType::CurrentLine),
                Print(format!(
                    "Password must be at least {MIN_PASSWORD_LEN} characters.\r\n"
                ))
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

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;
    let engine = Engine::builder().database(db).build().await?;

    match cli.command {
        Command::Car(Car {
            command: CarCommand::Create(args),
        }) => {
            let car = engine
                .create_car(NewCar::new(args.name, args.category, args.price_per_day)?)
                .await?;
            println!(
                "created car: {} \"{}\" at {}/day",
                car.id, car.name, car.price_per_day
            );
        }
        Command::Car(Car {
            command: CarCommand::List(args),
        }) => {
            for car in engine.cars(args.available).await? {
                println!(
                    "{:>5}  {:<24} {:<12} {:>12}  {}",
                    car.id,
                    car.name,
                    car.category,
                    car.price_per_day,
                    car.status.as_str()
                );
            }
        }
        Command::User(User {
            command: UserCommand::Create(args),
        }) => {
            let password = prompt_password_twice()?;
            let user = engine
                .register_user(RegisterUserCmd::new(args.name, args.email, password))
                .await?;
            println!("created user: {} <{}>", user.id, user.email);
        }
        Command::User(User {
            command: UserCommand::TopUp(args),
        }) => {
            let user = engine.user_by_email(&args.email).await?;
            let user = engine.top_up(TopUpCmd::new(user.id, args.amount)).await?;
            println!("balance of {}: {}", user.email, user.balance);
        }
    }

    Ok(())
}
