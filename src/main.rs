fn main() {
    if let Err(error) = shotput::run() {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}
