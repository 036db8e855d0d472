use osrt::output as out;

mod app;
mod logging;

fn main() {
    let args = osrt::cli::parse();
    let code = match app::run(args) {
        Ok(code) => code,
        Err(e) => {
            out::print_error(&format!("{e:#}"));
            1
        }
    };
    std::process::exit(code);
}
