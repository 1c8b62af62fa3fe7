//! WallSpan - spans Unsplash photos across every connected display.

fn main() {
    if let Err(err) = wallspan_lib::cli::run() {
        eprintln!("wallspan: {err}");
        std::process::exit(1);
    }
}
