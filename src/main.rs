use std::process;

fn main() {
    if let Err(err) = annotkit::init_logging() {
        eprintln!("{err:#}");
    }

    if let Err(err) = annotkit::cli::run(std::env::args_os()) {
        eprintln!("Error: {err:#}");
        process::exit(1);
    }
}
