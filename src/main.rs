use std::io::Read;

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "register-guard",
    about = "Score chat responses against a persona speech register",
    version
)]
struct Cli {
    /// File paths to score (reads stdin if none provided)
    files: Vec<String>,

    /// Exit nonzero when any score falls below this threshold
    #[arg(long)]
    min_score: Option<f64>,
}

fn main() {
    let cli = Cli::parse();
    let mut below_threshold = false;

    if cli.files.is_empty() {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .expect("Failed to read stdin");
        let report = register_guard::measure("", &text);
        if cli.min_score.is_some_and(|min| report.score < min) {
            below_threshold = true;
        }
        println!("{}", serde_json::to_string_pretty(&report).unwrap());
    } else {
        for path in &cli.files {
            let text = std::fs::read_to_string(path).unwrap_or_else(|e| {
                eprintln!("Error reading {path}: {e}");
                std::process::exit(1);
            });
            let report = register_guard::measure("", &text);
            if cli.min_score.is_some_and(|min| report.score < min) {
                below_threshold = true;
            }
            println!("{}", serde_json::to_string_pretty(&report).unwrap());
        }
    }

    if below_threshold {
        std::process::exit(2);
    }
}
