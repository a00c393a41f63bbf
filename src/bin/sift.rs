use std::{error::Error, fs, path::PathBuf, time::Duration};

use clap::{Parser, Subcommand};
use sift::{
    AttrValue, ClientConfig, Endpoint, ExcerptOptions, MatchLayout, SearchClient, SearchResult,
    query::{Filter, MatchMode, QueryRequest, SortMode},
};

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Daemon address: `host[:port]`, `/path/to.sock` or `unix:///path/to.sock`
    #[arg(short, long, global = true, default_value = "localhost:9312")]
    server: Endpoint,
    /// Connect timeout in milliseconds
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,
    /// Keep duplicate document ids in search results
    #[arg(long, global = true)]
    array: bool,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Debug, Subcommand)]
enum Cmd {
    /// Run one or more queries in a single batch
    Search {
        /// Query text; repeat for a batch
        #[arg(required = true)]
        queries: Vec<String>,
        #[arg(short, long, default_value = "*")]
        index: String,
        #[arg(long, default_value_t = 0)]
        offset: u32,
        #[arg(short, long, default_value_t = 20)]
        limit: u32,
        /// Use the extended query syntax
        #[arg(short = 'e', long)]
        extended: bool,
        /// Sort by attribute, descending
        #[arg(long)]
        sort_desc: Option<String>,
        /// `attr=v1,v2,...` value filter; repeatable
        #[arg(short, long = "filter")]
        filters: Vec<String>,
    },
    /// Show how a query is tokenized
    Keywords {
        query: String,
        #[arg(short, long)]
        index: String,
        /// Include per-keyword document and hit counts
        #[arg(long)]
        hits: bool,
    },
    /// Build highlighted snippets for documents read from files
    Excerpts {
        words: String,
        #[arg(short, long)]
        index: String,
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Print daemon status counters
    Status,
    /// Flush updated attributes to disk
    Flush,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let cli = Cli::parse();
    let config = ClientConfig {
        endpoint: cli.server,
        connect_timeout: cli.timeout_ms.map(Duration::from_millis),
        layout: if cli.array {
            MatchLayout::List
        } else {
            MatchLayout::ById
        },
    };
    let mut client = SearchClient::new(config);

    match cli.command {
        Cmd::Search {
            queries,
            index,
            offset,
            limit,
            extended,
            sort_desc,
            filters,
        } => {
            let filters = filters
                .iter()
                .map(|f| parse_filter(f))
                .collect::<Result<Vec<_>, _>>()?;

            for text in &queries {
                let mut request = QueryRequest::new(text.as_str());
                request.set_index(index.as_str()).set_limits(offset, limit, 0, 0)?;
                if extended {
                    request.set_match_mode(MatchMode::Extended2);
                }
                if let Some(attr) = &sort_desc {
                    request.set_sort_mode(SortMode::AttrDesc, attr.as_str())?;
                }
                for filter in &filters {
                    request.add_filter(filter.clone())?;
                }
                client.add_query(&request);
            }

            let results = client.run_queries()?;
            if let Some(warning) = client.last_warning() {
                eprintln!("warning: {warning}");
            }
            for (text, result) in queries.iter().zip(&results) {
                print_result(text, result);
            }
        }
        Cmd::Keywords { query, index, hits } => {
            for keyword in client.build_keywords(&query, &index, hits)? {
                match keyword.stats {
                    Some(stats) => println!(
                        "{} -> {} (docs={}, hits={})",
                        keyword.tokenized, keyword.normalized, stats.docs, stats.hits
                    ),
                    None => println!("{} -> {}", keyword.tokenized, keyword.normalized),
                }
            }
        }
        Cmd::Excerpts {
            words,
            index,
            files,
        } => {
            let docs = files.iter().map(fs::read).collect::<Result<Vec<_>, _>>()?;
            let snippets =
                client.build_excerpts(&docs, &index, &words, &ExcerptOptions::default())?;
            for (file, snippet) in files.iter().zip(snippets) {
                println!("{}: {}", file.display(), String::from_utf8_lossy(&snippet));
            }
        }
        Cmd::Status => {
            for row in client.status()? {
                println!("{}", row.join("\t"));
            }
        }
        Cmd::Flush => {
            let tag = client.flush_attributes()?;
            println!("flush tag {tag}");
        }
    }

    Ok(())
}

fn parse_filter(s: &str) -> Result<Filter, String> {
    let (attr, values) = s
        .split_once('=')
        .ok_or_else(|| format!("filter '{s}' must look like attr=v1,v2"))?;
    let values = values
        .split(',')
        .map(|v| v.trim().parse::<i64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("filter '{s}': {e}"))?;
    let filter = Filter::values(attr, values, false);
    filter.validate().map_err(|e| e.to_string())?;
    Ok(filter)
}

fn print_result(query: &str, result: &SearchResult) {
    println!("query '{query}':");
    if let Some(error) = &result.error {
        println!("  error: {error}");
        return;
    }
    if let Some(warning) = &result.warning {
        println!("  warning: {warning}");
    }

    println!(
        "  {} of {} matches in {:.3} sec",
        result.total, result.total_found, result.time
    );
    for (word, stats) in &result.words {
        println!("  '{word}': {} documents, {} hits", stats.docs, stats.hits);
    }

    for (n, m) in result.matches.iter().enumerate() {
        let attrs = m
            .attrs
            .iter()
            .map(|(name, value)| format!("{name}={}", display_value(value)))
            .collect::<Vec<_>>()
            .join(", ");
        println!("  {}. doc_id={}, weight={}, {attrs}", n + 1, m.id, m.weight);
    }
}

fn display_value(value: &AttrValue) -> String {
    let join = |items: Vec<String>| format!("({})", items.join(","));
    match value {
        AttrValue::Uint(v) => v.to_string(),
        AttrValue::Bigint(v) => v.to_string(),
        AttrValue::Float(v) => v.to_string(),
        AttrValue::String(v) => String::from_utf8_lossy(v).into_owned(),
        AttrValue::Multi(vs) => join(vs.iter().map(u32::to_string).collect()),
        AttrValue::Multi64(vs) => join(vs.iter().map(i64::to_string).collect()),
    }
}
