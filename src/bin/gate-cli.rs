use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Serialize;
use url::Url;

use tenant_gate::auth::{AuthState, PasswordHasher, Role};
use tenant_gate::config::{load_config, GateConfig};
use tenant_gate::routing::{Evaluation, GateRequest, GateRouter};

#[derive(Parser)]
#[command(name = "gate-cli")]
#[command(about = "Operator tooling for the tenant gate", long_about = None)]
struct Cli {
    /// Gate configuration file. Defaults apply when omitted.
    #[arg(short, long, global = true, env = "TENANT_GATE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the stored hash for a plaintext password
    HashPassword {
        plain: String,
    },
    /// Dry-run the gate for a URL and print the decision as JSON
    Decide {
        #[arg(short, long)]
        url: String,
        /// Treat the caller as signed in with this role (user|interviewer)
        #[arg(short, long)]
        role: Option<Role>,
        /// Treat the caller as signed in without a role
        #[arg(long, conflicts_with = "role")]
        signed_in: bool,
    },
}

#[derive(Serialize)]
struct DecideOutput<'a> {
    url: &'a str,
    gated: bool,
    auth: AuthState,
    #[serde(flatten)]
    evaluation: Option<Evaluation>,
}

/// Evaluate `url` the way the gate middleware would.
fn dry_run<'a>(router: &GateRouter, url: &'a str, auth: AuthState) -> Result<DecideOutput<'a>, url::ParseError> {
    let request = GateRequest::from_url(&Url::parse(url)?);
    let gated = router.is_gated(&request.path);
    let evaluation = gated.then(|| router.evaluate(&request, &auth));
    Ok(DecideOutput {
        url,
        gated,
        auth,
        evaluation,
    })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => GateConfig::default(),
    };

    match cli.command {
        Commands::HashPassword { plain } => {
            let hasher = PasswordHasher::new(&config.auth.password_secret);
            println!("{}", hasher.hash(&plain));
        }
        Commands::Decide { url, role, signed_in } => {
            let auth = match role {
                Some(role) => AuthState::signed_in(Some(role)),
                None if signed_in => AuthState::signed_in(None),
                None => AuthState::anonymous(),
            };
            let router = GateRouter::new(&config.tenancy.root_domain);
            let output = dry_run(&router, &url, auth)?;
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
