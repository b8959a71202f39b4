fn main() {
    if let Err(e) = studiolo::cli::main() {
        eprintln!("❌ Error: {e}");
        std::process::exit(1);
    }
}
