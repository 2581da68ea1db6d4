// ABOUTME: CLI for reading and creating syndication feeds with syndic-feed.
// ABOUTME: Exposes read (fetch/parse/route) and create (normalize/generate) subcommands.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use syndic_feed::{create, read, CreateOptions, ReadOptions};

/// Read or create RSS/Atom feeds.
#[derive(Parser, Debug)]
#[command(name = "syndic-cli")]
#[command(about = "Read and create syndication feeds", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch a feed from a URL or file and print the parsed result as JSON.
    Read {
        /// Feed URL (http/https) or local file path.
        source: String,

        /// Fetch timeout in seconds.
        #[arg(long, default_value_t = 30)]
        timeout: u64,

        /// User-Agent header for HTTP fetches.
        #[arg(long)]
        user_agent: Option<String>,

        /// Keep at most this many items.
        #[arg(long)]
        max_items: Option<usize>,

        /// Print only the channel metadata (no items key).
        #[arg(long, default_value_t = false)]
        metadata: bool,

        /// Print only the item sequence.
        #[arg(long, default_value_t = false)]
        items: bool,

        /// Print the raw fetched XML instead of JSON.
        #[arg(long, default_value_t = false)]
        xml: bool,

        /// Also save the raw fetched XML to this file.
        #[arg(long)]
        output_file: Option<PathBuf>,

        /// Replace the output file if it already exists.
        #[arg(long, default_value_t = false)]
        overwrite: bool,

        /// Output compact JSON instead of pretty.
        #[arg(long, default_value_t = false)]
        compact: bool,
    },

    /// Generate feed XML from channel properties and item data.
    Create {
        /// Channel properties as a JSON object.
        #[arg(long)]
        properties: Option<String>,

        /// Item records as a JSON array.
        #[arg(long)]
        data: Option<String>,

        /// Pre-assembled feed structure (channel fields plus nested items),
        /// used instead of --properties/--data.
        #[arg(long)]
        structure: Option<String>,

        /// Canonical-to-source field name mapping as a JSON object.
        #[arg(long)]
        column_map: Option<String>,

        /// Output grammar: rss_2.0 (default) or atom_1.0.
        #[arg(long, default_value = "rss_2.0")]
        feed_type: String,

        /// Escape XML special characters in element text.
        #[arg(long, default_value_t = false)]
        escape_chars: bool,

        /// Write the generated XML to this file.
        #[arg(long)]
        output_file: Option<PathBuf>,

        /// Replace the output file if it already exists.
        #[arg(long, default_value_t = false)]
        overwrite: bool,
    },
}

fn main() -> Result<()> {
    match Args::parse().command {
        Command::Read {
            source,
            timeout,
            user_agent,
            max_items,
            metadata,
            items,
            xml,
            output_file,
            overwrite,
            compact,
        } => {
            let mut opts = ReadOptions::new(source).timeout(Duration::from_secs(timeout));
            if let Some(ua) = user_agent {
                opts = opts.user_agent(ua);
            }
            if let Some(max) = max_items {
                opts = opts.max_items(max);
            }
            // Default to the full structure unless a narrower view was asked for.
            opts = match (metadata, items, xml) {
                (false, false, false) => opts.result(),
                _ => {
                    if metadata {
                        opts = opts.metadata();
                    }
                    if items {
                        opts = opts.items();
                    }
                    if xml {
                        opts = opts.xml();
                    }
                    opts
                }
            };
            if let Some(path) = output_file {
                opts = opts.output_file(path, overwrite);
            }

            let output = read(&opts, None).context("feed read failed")?;

            if let Some(raw) = output.xml {
                println!("{raw}");
                return Ok(());
            }
            let value = output
                .result
                .or(output.metadata)
                .or(output.items)
                .unwrap_or_else(|| json!({}));
            if compact {
                println!("{}", serde_json::to_string(&value)?);
            } else {
                println!("{}", serde_json::to_string_pretty(&value)?);
            }
        }

        Command::Create {
            properties,
            data,
            structure,
            column_map,
            feed_type,
            escape_chars,
            output_file,
            overwrite,
        } => {
            if structure.is_none() && properties.is_none() && data.is_none() {
                bail!("create requires --properties and --data, or --structure");
            }

            let opts = CreateOptions {
                properties: parse_json_arg(properties, "--properties")?,
                data: parse_json_arg(data, "--data")?,
                name: parse_json_arg(structure, "--structure")?,
                column_map: match parse_json_arg(column_map, "--column-map")? {
                    Some(v) => Some(serde_json::from_value(v).context("invalid --column-map")?),
                    None => None,
                },
                feed_type: feed_type.parse()?,
                escape_chars,
                output_file,
                overwrite,
            };

            let xml = create(&opts).context("feed create failed")?;
            println!("{xml}");
        }
    }

    Ok(())
}

fn parse_json_arg(arg: Option<String>, flag: &str) -> Result<Option<serde_json::Value>> {
    arg.map(|raw| serde_json::from_str(&raw).with_context(|| format!("invalid JSON for {flag}")))
        .transpose()
}
