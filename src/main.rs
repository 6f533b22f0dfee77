fn main() {
    if let Err(err) = hiring_ledger::run() {
        let response = hiring_ledger::response::from_anyhow(&err);
        eprintln!("{}", response.body);
        std::process::exit(if response.is_client_error() { 2 } else { 1 });
    }
}
