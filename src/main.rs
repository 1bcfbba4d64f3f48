//! vocabpub binary entry point.

fn main() -> anyhow::Result<()> {
    // A missing .env file is fine
    dotenvy::dotenv().ok();
    vocab_publisher::cli::run()
}
