use clap::{Arg, ArgAction, ArgMatches, Command}; // Builder API for the operator CLI
use log::{error, info};
use rpassword::read_password; // Reads the password without echoing it
use std::error::Error;
use std::path::Path;
use std::process;

use modelkit::auth::{configure_password_hasher, PasswordHasher, DEFAULT_HASHER};
use modelkit::utils::logging::initialize_logging;
use modelkit::utils::time::{format_timestamp, hash_timestamp, now};
use modelkit::{HashGenerator, Settings, SETTINGS_FILE};

fn cli() -> Command {
    Command::new("modelkit")
        .about("Operator tools for hashed identifiers and stored passwords")
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_name("FILE")
                .help("Settings file (defaults to modelkit.json)"),
        )
        .subcommand(
            Command::new("make-password")
                .about("Hash a password read from the terminal with the configured iterations"),
        )
        .subcommand(
            Command::new("check-password")
                .about("Check a password against an encoded hash")
                .arg(
                    Arg::new("encoded")
                        .help("Stored hash, e.g. pbkdf2_sha256$320000$salt$digest")
                        .required(true),
                ),
        )
        .subcommand(
            Command::new("generate-hash")
                .about("Generate an opaque record hash")
                .arg(
                    Arg::new("type")
                        .long("type")
                        .value_name("TABLE")
                        .help("Entity type tag")
                        .required(true),
                )
                .arg(
                    Arg::new("secret")
                        .long("secret")
                        .value_name("SECRET")
                        .help("Per-entity hash secret")
                        .required(true),
                )
                .arg(
                    Arg::new("no-datetime")
                        .long("no-datetime")
                        .action(ArgAction::SetTrue)
                        .help("Leave the current time out of the inputs"),
                )
                .arg(
                    Arg::new("values")
                        .help("Field values, in declaration order")
                        .num_args(0..),
                ),
        )
}

fn required<'a>(matches: &'a ArgMatches, name: &str) -> Result<&'a str, Box<dyn Error>> {
    matches
        .get_one::<String>(name)
        .map(String::as_str)
        .ok_or_else(|| format!("missing argument: {}", name).into())
}

fn prompt_password(prompt: &str) -> Result<String, Box<dyn Error>> {
    println!("{}", prompt);
    Ok(read_password()?)
}

fn run(matches: &ArgMatches) -> Result<(), Box<dyn Error>> {
    let config = matches
        .get_one::<String>("config")
        .map(String::as_str)
        .unwrap_or(SETTINGS_FILE);
    let settings = Settings::load_or_default(Path::new(config))?;

    if let Err(e) = initialize_logging(&settings) {
        eprintln!("Warning: failed to initialize logging: {}", e);
    }
    configure_password_hasher(&settings);
    let hasher = &DEFAULT_HASHER;

    match matches.subcommand() {
        Some(("make-password", _)) => {
            let raw = prompt_password("Enter password:")?;
            let confirm = prompt_password("Confirm password:")?;
            if raw != confirm {
                return Err("passwords do not match".into());
            }
            println!("{}", hasher.hash(&raw));
            info!(
                "Generated password hash ({} iterations)",
                settings.password_iterations
            );
        }
        Some(("check-password", sub)) => {
            let encoded = required(sub, "encoded")?;
            let raw = prompt_password("Enter password:")?;
            let check = hasher.verify(&raw, encoded);

            println!("Match: {}", if check.matched { "yes" } else { "no" });
            if let Some(upgraded) = check.upgraded {
                println!("Hash uses outdated parameters; replacement:");
                println!("{}", upgraded);
            }
        }
        Some(("generate-hash", sub)) => {
            let type_tag = required(sub, "type")?;
            let secret = required(sub, "secret")?;
            let mut values: Vec<String> = sub
                .get_many::<String>("values")
                .map(|values| values.cloned().collect())
                .unwrap_or_default();

            let instant = now();
            if !sub.get_flag("no-datetime") {
                values.push(hash_timestamp(&instant));
            }

            let token = HashGenerator::generate(type_tag, secret, &values)?;
            println!("{}", token);
            println!("Generated at {}", format_timestamp(&instant));
        }
        _ => {}
    }
    Ok(())
}

fn main() {
    let matches = cli().get_matches();
    if let Err(e) = run(&matches) {
        error!("{}", e);
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
