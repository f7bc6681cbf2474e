fn main() {
    if let Err(err) = logmatch::run() {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}
