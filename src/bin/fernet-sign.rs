//! Encrypt and sign standard input, printing the token.

use std::io::{self, Write as _};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use fernet::{FernetError, Key, TokenWriter};

#[derive(Parser)]
#[command(
    name = "fernet-sign",
    about = "Encrypt and sign standard input and print the resulting token",
    long_about = "Fernet-sign encrypts and signs its input and prints the resulting token.\n\
                  It uses the key in environment variable ENV."
)]
struct Cli {
    /// Environment variable holding the encoded key
    #[arg(value_name = "ENV")]
    env: String,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();
    // usage errors exit with status 2
    let cli = Cli::parse();

    if let Err(e) = run(&cli.env) {
        eprintln!("fernet: {e}");
        std::process::exit(1);
    }
}

fn run(env: &str) -> Result<(), FernetError> {
    let key = Key::decode(&std::env::var(env).unwrap_or_default())?;

    let mut writer = TokenWriter::new(io::stdout().lock(), key);
    io::copy(&mut io::stdin().lock(), &mut writer)?;
    writer.finish()?;

    let mut stdout = writer.into_inner();
    stdout.write_all(b"\n")?;
    stdout.flush()?;
    Ok(())
}
