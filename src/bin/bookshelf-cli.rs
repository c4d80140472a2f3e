use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Url;
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "bookshelf-cli")]
#[command(about = "Client for the match-router demo server", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Say hello, optionally to someone
    Hello { name: Option<String> },
    /// List all books
    List,
    /// Add a book
    Add { title: String, year: i32 },
    /// Show one book
    Get { id: u64 },
    /// Delete a book
    Remove { id: u64 },
    /// Server health
    Health,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.as_str();

    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    match cli.command {
        Commands::Hello { name } => {
            let url = match name {
                Some(name) => endpoint(base, &["hello", &name])?,
                None => endpoint(base, &["hello"])?,
            };
            let res = client.get(url).send().await?;
            print_text(res).await?;
        }
        Commands::List => {
            let res = client.get(endpoint(base, &["books"])?)
                .headers(headers)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Add { title, year } => {
            let res = client.post(endpoint(base, &["books"])?)
                .headers(headers)
                .json(&json!({ "title": title, "year": year }))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Get { id } => {
            let res = client.get(endpoint(base, &["books", &id.to_string()])?)
                .headers(headers)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Remove { id } => {
            let res = client
                .delete(endpoint(base, &["books", &id.to_string()])?)
                .send()
                .await?;
            if res.status().is_success() {
                println!("Deleted book {id}");
            } else {
                print_text(res).await?;
            }
        }
        Commands::Health => {
            let res = client.get(endpoint(base, &["health"])?).send().await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

/// Append percent-encoded path segments to the server URL.
fn endpoint(base: &str, segments: &[&str]) -> Result<Url, Box<dyn std::error::Error>> {
    let mut url = Url::parse(base)?;
    url.path_segments_mut()
        .map_err(|_| format!("cannot use {base} as a base URL"))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

async fn print_text(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;
    if status.is_success() {
        println!("{text}");
    } else {
        eprintln!("Error: server returned status {status}");
        eprintln!("Response: {text}");
    }
    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: server returned status {status}");
        if let Ok(text) = res.text().await {
            eprintln!("Response: {text}");
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
