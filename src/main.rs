fn main() {
    if let Err(err) = ownership_chart::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
