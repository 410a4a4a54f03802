fn main() {
    if let Err(err) = a11yscan::cli::run() {
        a11yscan::ui::eprintln_error(&err);
        std::process::exit(a11yscan::exit::exit_code(&err));
    }
}
