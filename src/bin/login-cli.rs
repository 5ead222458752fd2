use clap::{Args, Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "login-cli")]
#[command(about = "Command-line client for the login service", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://127.0.0.1:5000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a username/password pair
    Login(CredentialArgs),
    /// Try to register a username
    Register(CredentialArgs),
    /// Check that the service is up
    Health,
}

#[derive(Args)]
struct CredentialArgs {
    #[arg(short, long)]
    username: Option<String>,

    #[arg(short, long)]
    password: Option<String>,
}

impl CredentialArgs {
    /// Absent flags are left out of the body entirely.
    fn body(&self) -> Value {
        let mut body = json!({});
        if let Some(username) = &self.username {
            body["username"] = json!(username);
        }
        if let Some(password) = &self.password {
            body["password"] = json!(password);
        }
        body
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let res = match &cli.command {
        Commands::Login(creds) => {
            client
                .post(format!("{base}/api/login"))
                .json(&creds.body())
                .send()
                .await?
        }
        Commands::Register(creds) => {
            client
                .post(format!("{base}/api/register"))
                .json(&creds.body())
                .send()
                .await?
        }
        Commands::Health => client.get(format!("{base}/health")).send().await?,
    };

    if !print_response(res).await? {
        std::process::exit(1);
    }
    Ok(())
}

/// Print status and body; returns whether the status was a success.
async fn print_response(res: reqwest::Response) -> Result<bool, Box<dyn std::error::Error>> {
    let status = res.status();
    println!("HTTP {}", status);

    let text = res.text().await?;
    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }

    Ok(status.is_success())
}
