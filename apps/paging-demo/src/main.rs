use clap::Parser;
use paging_demo::{run, DemoOptions};

fn main() -> anyhow::Result<()> {
    #[cfg(feature = "logging")]
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let options = DemoOptions::parse();

    println!("=== Paging Demo ===");
    println!(
        "{} rows, pages of {}, answers after {} frames, {} rows on screen",
        options.items, options.window, options.latency, options.viewport
    );
    println!();

    let report = run(&options, |frame, lines| {
        println!("--- frame {frame} ---");
        for line in lines {
            println!("{line}");
        }
    })?;

    println!();
    println!(
        "Redrew {} of {} frames; {} pages fetched, {} rows cached.",
        report.renders, report.frames, report.pages_served, report.rows_cached
    );
    Ok(())
}
