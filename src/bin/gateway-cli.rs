use clap::{Parser, Subcommand};
use reqwest::Method;
use std::io::Write;

#[derive(Parser)]
#[command(name = "gateway-cli")]
#[command(about = "Invoke functions through the gateway", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://127.0.0.1:8080")]
    gateway: String,

    /// Basic auth user.
    #[arg(short, long, requires = "password")]
    user: Option<String>,

    /// Basic auth password.
    #[arg(short, long, requires = "user")]
    password: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Invoke a function and print its response body
    Invoke {
        /// Function name
        name: String,

        /// Extra path appended after /function/{name}/
        #[arg(long, default_value = "")]
        path: String,

        /// HTTP method
        #[arg(short = 'X', long, default_value = "POST")]
        method: String,

        /// Request body
        #[arg(short, long)]
        data: Option<String>,

        /// Content-Type of the request body
        #[arg(long)]
        content_type: Option<String>,
    },
    /// Check the gateway health endpoint
    Health,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let gateway = cli.gateway.trim_end_matches('/');

    let request = match cli.command {
        Commands::Invoke {
            name,
            path,
            method,
            data,
            content_type,
        } => {
            let method = Method::from_bytes(method.to_uppercase().as_bytes())?;
            let url = if path.is_empty() {
                format!("{}/function/{}", gateway, name)
            } else {
                format!("{}/function/{}/{}", gateway, name, path.trim_start_matches('/'))
            };

            let mut request = client.request(method, url);
            if let Some(content_type) = content_type {
                request = request.header(reqwest::header::CONTENT_TYPE, content_type);
            }
            if let Some(data) = data {
                request = request.body(data);
            }
            request
        }
        Commands::Health => client.get(format!("{}/healthz", gateway)),
    };

    let request = match (cli.user, cli.password) {
        (Some(user), password) => request.basic_auth(user, password),
        _ => request,
    };

    let res = request.send().await?;
    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let internal = res.headers().contains_key("x-openfaas-internal");
    let body = res.bytes().await?;

    if !status.is_success() {
        let origin = if internal { "gateway" } else { "function" };
        eprintln!("Error: {} returned status {}", origin, status);
    }

    std::io::stdout().write_all(&body)?;
    if !status.is_success() {
        std::process::exit(1);
    }
    Ok(())
}
