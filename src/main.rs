fn main() {
    if let Err(e) = coinspark_metadata::cli::run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
