//! Print a freshly generated Fernet key.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use fernet::Key;

#[derive(Parser)]
#[command(name = "fernet-keygen", about = "Generate a random Fernet key")]
struct Cli {}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
    let _cli = Cli::parse();

    match Key::generate() {
        Ok(key) => println!("{}", key.encode()),
        Err(e) => {
            eprintln!("fernet: {e}");
            std::process::exit(1);
        }
    }
}
