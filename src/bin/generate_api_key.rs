//! CLI tool to generate API keys.
//!
//! Prints a new key id, the hashed secret to store in the Key Store and
//! the bearer token to hand to the developer.
//!
//! Usage:
//!   GENERAL_SECRET_KEY=... cargo run --bin generate-api-key

use std::env;

use secrecy::{ExposeSecret, SecretString};

use minikit_gateway_lib::auth::generate_api_key;

fn main() {
    dotenvy::dotenv().ok();

    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--help" | "-h" => {
                print_usage();
                return;
            }
            _ => {
                eprintln!("Unknown argument: {}", arg);
                print_usage();
                std::process::exit(1);
            }
        }
    }

    let general_secret_key = match env::var("GENERAL_SECRET_KEY") {
        Ok(key) if !key.is_empty() => SecretString::from(key),
        _ => {
            eprintln!("Error: GENERAL_SECRET_KEY must be set");
            std::process::exit(1);
        }
    };

    let key = match generate_api_key(&general_secret_key) {
        Ok(key) => key,
        Err(e) => {
            eprintln!("Error generating key: {}", e);
            std::process::exit(1);
        }
    };

    println!();
    println!("════════════════════════════════════════════════════════════════");
    println!("  API Key Generated");
    println!("════════════════════════════════════════════════════════════════");
    println!();
    println!("  ID:             {}", key.id);
    println!("  Hashed secret:  {}", key.hashed_secret);
    println!();
    println!("  Token:          {}", key.token.expose_secret());
    println!();
    println!("  Store the ID and hashed secret in the Key Store.");
    println!("  ⚠️  Save the token! It cannot be retrieved later.");
    println!("════════════════════════════════════════════════════════════════");
    println!();
}

fn print_usage() {
    eprintln!();
    eprintln!("Usage: generate-api-key");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  GENERAL_SECRET_KEY  HMAC key the gateway verifies secrets with (required)");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --help, -h          Show this help");
    eprintln!();
}
