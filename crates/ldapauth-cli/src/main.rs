//! Command-line front end for the directory agent.
//!
//! Exit code 0 means the operation succeeded (a valid login, a completed
//! write, an entry found); anything else is non-zero.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use ldapauth_agent::{DirectoryAgent, DirectoryConfig, DirectoryEndpoint, DistinguishedName};
use ldapauth_core::BindCredentials;
use std::collections::HashMap;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "ldapauth", about = "Authenticate and manage directory users", version)]
struct Cli {
    /// Directory server host.
    #[arg(long, env = "LDAPAUTH_HOST")]
    host: String,

    /// Directory server port.
    #[arg(long, env = "LDAPAUTH_PORT", default_value_t = ldapauth_agent::DEFAULT_PORT)]
    port: u16,

    /// Connect over TLS (ldaps).
    #[arg(long, env = "LDAPAUTH_TLS")]
    tls: bool,

    /// Base DN under which user entries live.
    #[arg(long, env = "LDAPAUTH_BASE_DN")]
    base_dn: Option<String>,

    /// DN to bind as for administrative operations.
    #[arg(long, env = "LDAPAUTH_BIND_DN")]
    bind_dn: Option<String>,

    /// Password for the administrative bind DN; prompted when omitted.
    #[arg(long, env = "LDAPAUTH_BIND_PASSWORD", hide_env_values = true)]
    bind_password: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Verify a user's credentials.
    Authenticate {
        /// User identifier.
        uid: String,
        /// Password; prompted when omitted.
        #[arg(long)]
        password: Option<String>,
    },
    /// Create a user entry.
    Add {
        /// User identifier.
        uid: String,
        /// Password for the new entry; prompted when omitted.
        #[arg(long)]
        password: Option<String>,
        /// Surname; defaults to the uid.
        #[arg(long)]
        sn: Option<String>,
        /// Common name; defaults to the uid.
        #[arg(long)]
        cn: Option<String>,
    },
    /// Print a user's attributes as JSON.
    Get {
        /// User identifier.
        uid: String,
    },
    /// Change a user's password.
    SetPassword {
        /// User identifier.
        uid: String,
        /// New password; prompted when omitted.
        #[arg(long)]
        password: Option<String>,
    },
    /// Remove a user entry.
    Delete {
        /// User identifier.
        uid: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<bool> {
    let agent = build_agent(&cli)?;

    match cli.command {
        Command::Authenticate { uid, password } => {
            let password = secret(password, "Password: ")?;
            let ok = agent.authenticate_user(&uid, &password).await?;
            println!(
                "{}",
                if ok {
                    "authentication successful"
                } else {
                    "authentication failed"
                }
            );
            Ok(ok)
        }
        Command::Add { uid, password, sn, cn } => {
            let password = secret(password, "Password: ")?;
            let mut extra = HashMap::new();
            if let Some(sn) = sn {
                extra.insert("sn".to_string(), vec![sn]);
            }
            if let Some(cn) = cn {
                extra.insert("cn".to_string(), vec![cn]);
            }
            let extra = if extra.is_empty() { None } else { Some(&extra) };
            let ok = agent.add_user(&uid, &password, extra).await?;
            println!("{}", if ok { "user created" } else { "failed to create user" });
            Ok(ok)
        }
        Command::Get { uid } => match agent.get_user(&uid).await? {
            Some(entry) => {
                println!("{}", serde_json::to_string_pretty(&entry)?);
                Ok(true)
            }
            None => {
                println!("user not found");
                Ok(false)
            }
        },
        Command::SetPassword { uid, password } => {
            let password = secret(password, "New password: ")?;
            let attributes = HashMap::from([("userPassword".to_string(), password)]);
            let ok = agent.update_user(&uid, &attributes).await?;
            println!("{}", if ok { "password updated" } else { "failed to update password" });
            Ok(ok)
        }
        Command::Delete { uid } => {
            let ok = agent.delete_user(&uid).await?;
            println!("{}", if ok { "user deleted" } else { "failed to delete user" });
            Ok(ok)
        }
    }
}

fn build_agent(cli: &Cli) -> Result<DirectoryAgent> {
    let endpoint = DirectoryEndpoint::new(cli.host.clone(), cli.port)?.with_tls(cli.tls);
    let mut config = DirectoryConfig::new(endpoint);

    if let Some(base_dn) = &cli.base_dn {
        config = config.with_base_dn(DistinguishedName::parse(base_dn)?);
    }

    match (&cli.bind_dn, &cli.bind_password) {
        (Some(bind_dn), Some(password)) => {
            config =
                config.with_admin_credentials(BindCredentials::new(bind_dn.clone(), password.clone()));
        }
        (Some(bind_dn), None) => {
            let password = rpassword::prompt_password(format!("Password for {bind_dn}: "))
                .context("failed to read bind password")?;
            config = config.with_admin_credentials(BindCredentials::new(bind_dn.clone(), password));
        }
        (None, Some(_)) => bail!("--bind-password requires --bind-dn"),
        (None, None) => {}
    }

    Ok(DirectoryAgent::new(config))
}

fn secret(provided: Option<String>, prompt: &str) -> Result<String> {
    match provided {
        Some(secret) => Ok(secret),
        None => rpassword::prompt_password(prompt).context("failed to read password"),
    }
}
