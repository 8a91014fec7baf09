//! Binary entrypoint for fontgrid (made by FontLab https://www.fontlab.com/)

fn main() {
    if let Err(err) = fontgrid_cli::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
