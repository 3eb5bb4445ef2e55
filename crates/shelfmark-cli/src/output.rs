//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use shelfmark_core::{Collection, Entry};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Check if output is in quiet mode
    pub fn is_quiet(&self) -> bool {
        matches!(self.format, OutputFormat::Quiet)
    }

    /// Check if output is in JSON mode
    pub fn is_json(&self) -> bool {
        matches!(self.format, OutputFormat::Json)
    }

    /// Print a success message (suppressed in quiet/JSON mode)
    pub fn success(&self, msg: &str) {
        if matches!(self.format, OutputFormat::Human) {
            println!("{}", msg);
        }
    }

    /// Print an informational message (suppressed in quiet/JSON mode)
    pub fn message(&self, msg: &str) {
        if matches!(self.format, OutputFormat::Human) {
            println!("{}", msg);
        }
    }

    /// Print a single entry
    pub fn print_entry(&self, entry: &Entry) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:      {}", entry.id);
                if let Some(ref media) = entry.media {
                    println!("Title:   {}", media.title);
                    println!("Type:    {}", media.media_type);
                    if let Some(year) = media.year {
                        println!("Year:    {}", year);
                    }
                }
                println!("Status:  {}", entry.status);
                if let Some(rating) = entry.rating {
                    println!("Rating:  {}", rating);
                }
                if let Some(ref review) = entry.review_md {
                    println!("Review:  {}", review);
                }
                println!("Updated: {}", entry.updated_at.format("%Y-%m-%d %H:%M"));
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(entry).unwrap());
            }
            OutputFormat::Quiet => {
                println!("{}", entry.id);
            }
        }
    }

    /// Print a list of entries
    pub fn print_entries(&self, entries: &[Entry]) {
        match self.format {
            OutputFormat::Human => {
                if entries.is_empty() {
                    println!("No entries found.");
                    return;
                }
                for entry in entries {
                    let title = entry
                        .media
                        .as_ref()
                        .map(|m| m.title.as_str())
                        .unwrap_or("(unknown)");
                    let media_type = entry
                        .media
                        .as_ref()
                        .map(|m| m.media_type.to_string())
                        .unwrap_or_default();
                    let rating = entry
                        .rating
                        .map(|r| format!(" {}/10", r))
                        .unwrap_or_default();
                    println!(
                        "{} | {:5} | {:11} | {}{}",
                        &entry.id.to_string()[..8],
                        media_type,
                        entry.status.to_string(),
                        truncate(title, 45),
                        rating
                    );
                }
                println!("\n{} entr{}", entries.len(), plural_y(entries.len()));
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(entries).unwrap());
            }
            OutputFormat::Quiet => {
                for entry in entries {
                    println!("{}", entry.id);
                }
            }
        }
    }

    /// Print a list of collections
    pub fn print_collections(&self, collections: &[Collection]) {
        match self.format {
            OutputFormat::Human => {
                if collections.is_empty() {
                    println!("No collections found.");
                    return;
                }
                for collection in collections {
                    let visibility = if collection.is_public {
                        "public"
                    } else {
                        "private"
                    };
                    println!(
                        "{} | {:7} | {}",
                        &collection.id.to_string()[..8],
                        visibility,
                        truncate(&collection.title, 50)
                    );
                }
                println!("\n{} collection(s)", collections.len());
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(collections).unwrap());
            }
            OutputFormat::Quiet => {
                for collection in collections {
                    println!("{}", collection.id);
                }
            }
        }
    }
}

/// Truncate a string to a maximum length, appending an ellipsis
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}

fn plural_y(count: usize) -> &'static str {
    if count == 1 {
        "y"
    } else {
        "ies"
    }
}
