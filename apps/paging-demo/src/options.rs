//! Command-line options.

use clap::Parser;

/// Scrolls a viewport over a remote catalog that answers after a delay.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "paging-demo", version, about, long_about = None)]
pub struct DemoOptions {
    /// Number of rows in the remote catalog
    #[arg(long, default_value_t = 200)]
    pub items: usize,

    /// Rows requested per page
    #[arg(long, default_value_t = 16)]
    pub window: usize,

    /// Frames the catalog takes to answer a request
    #[arg(long, default_value_t = 2)]
    pub latency: u32,

    /// Rows visible at once
    #[arg(long, default_value_t = 8)]
    pub viewport: usize,

    /// Frames to simulate before stopping
    #[arg(long, default_value_t = 60)]
    pub frames: u32,
}

impl Default for DemoOptions {
    fn default() -> Self {
        Self {
            items: 200,
            window: 16,
            latency: 2,
            viewport: 8,
            frames: 60,
        }
    }
}

impl DemoOptions {
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(self.viewport > 0, "--viewport must be at least 1");
        anyhow::ensure!(
            self.viewport <= self.items.max(1),
            "--viewport ({}) exceeds --items ({})",
            self.viewport,
            self.items
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_parser() {
        let parsed = DemoOptions::parse_from(["paging-demo"]);
        assert_eq!(parsed, DemoOptions::default());
    }

    #[test]
    fn flags_override_defaults() {
        let parsed = DemoOptions::parse_from([
            "paging-demo",
            "--items",
            "40",
            "--window",
            "4",
            "--latency",
            "0",
            "--viewport",
            "5",
        ]);
        assert_eq!(parsed.items, 40);
        assert_eq!(parsed.window, 4);
        assert_eq!(parsed.latency, 0);
        assert_eq!(parsed.viewport, 5);
        assert!(parsed.validate().is_ok());
    }

    #[test]
    fn empty_viewport_is_rejected() {
        let options = DemoOptions {
            viewport: 0,
            ..DemoOptions::default()
        };
        assert!(options.validate().is_err());
    }
}
