//! CLI commands

use anyhow::{Context, Result, bail};
use clap::Subcommand;
use corretaje_core::{CompanyAssociation, User};
use corretaje_http::ApiClient;
use corretaje_session::guards::{self, Decision};
use corretaje_session::{
    FileStorage, SessionConfig, SessionService, StaticIdentityProvider,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::Settings;

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in and store the session
    Login {
        #[arg(long, env = "CORRETAJE_EMAIL")]
        email: String,

        #[arg(long, env = "CORRETAJE_PASSWORD", hide_env_values = true)]
        password: String,

        /// Identity provider token (overrides `auth.identity_token`)
        #[arg(long, env = "CORRETAJE_ID_TOKEN", hide_env_values = true)]
        id_token: Option<String>,
    },

    /// Choose the company to work under
    SelectCompany {
        /// Company id as listed by `companies`
        company_id: String,
    },

    /// List companies awaiting a choice
    Companies {
        #[arg(long)]
        json: bool,
    },

    /// Show the current session
    Status {
        #[arg(long)]
        json: bool,
    },

    /// Evaluate the route guards for a path
    Check {
        /// Navigation target, e.g. `/admin/companies`
        path: String,
    },

    /// Sign out and remove the stored session
    Logout,
}

impl Commands {
    pub async fn execute(self, settings: &Settings) -> Result<()> {
        match self {
            Commands::Login {
                email,
                password,
                id_token,
            } => login(settings, &email, &password, id_token).await,
            Commands::SelectCompany { company_id } => select_company(settings, &company_id).await,
            Commands::Companies { json } => companies(settings, json),
            Commands::Status { json } => status(settings, json),
            Commands::Check { path } => check(settings, &path),
            Commands::Logout => {
                open_session(settings, None)?.logout();
                println!("Signed out");
                Ok(())
            }
        }
    }
}

fn open_session(settings: &Settings, id_token: Option<String>) -> Result<SessionService> {
    let session_file = settings.session_file();
    debug!("Using session file {}", session_file.display());
    let storage = FileStorage::open(&session_file)
        .with_context(|| format!("Failed to open session file {}", session_file.display()))?;

    let client = ApiClient::builder()
        .api_host(settings.api.host.clone())
        .timeout(Duration::from_secs(settings.api.timeout_secs))
        .build()
        .context("Failed to build API client")?;

    let identity = StaticIdentityProvider::new(
        id_token
            .or_else(|| settings.auth.identity_token.clone())
            .unwrap_or_default(),
    );

    let session = SessionService::new(Arc::new(client), Arc::new(identity), Arc::new(storage))
        .with_config(SessionConfig::with_session_window_secs(
            settings.auth.session_window_secs,
        ));
    session.restore_session();
    Ok(session)
}

async fn login(
    settings: &Settings,
    email: &str,
    password: &str,
    id_token: Option<String>,
) -> Result<()> {
    let session = open_session(settings, id_token)?;
    let outcome = session.login(email, password).await?;
    info!(%email, "Login complete");

    let user = session
        .current_user()
        .context("Session was not stored after login")?;
    println!("Signed in as {}", describe_user(&user));

    if outcome.needs_selection {
        println!("Select a company to continue:");
        print_companies(&session.pending_companies());
        println!("Run `corretaje select-company <id>`");
    } else {
        println!("Continue at {}", guards::landing_route(&user));
    }
    Ok(())
}

async fn select_company(settings: &Settings, company_id: &str) -> Result<()> {
    let session = open_session(settings, None)?;
    if !session.is_authenticated() {
        bail!("Not signed in; run `corretaje login` first");
    }

    let user = session.select_company(company_id).await?;
    println!("Working as {}", describe_user(&user));
    println!("Continue at {}", guards::post_selection_route(&user));
    Ok(())
}

fn companies(settings: &Settings, as_json: bool) -> Result<()> {
    let session = open_session(settings, None)?;
    let pending = session.pending_companies();

    if as_json {
        println!("{}", serde_json::to_string_pretty(&pending)?);
    } else if pending.is_empty() {
        println!("No companies awaiting selection");
    } else {
        print_companies(&pending);
    }
    Ok(())
}

fn status(settings: &Settings, as_json: bool) -> Result<()> {
    let session = open_session(settings, None)?;
    let snapshot = session.snapshot();

    if as_json {
        let report = json!({
            "authenticated": snapshot.is_authenticated(),
            "needsCompanySelection": snapshot.needs_company_selection(),
            "user": snapshot.user,
            "pendingCompanies": snapshot.pending_companies,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    match &snapshot.user {
        None => println!("Not signed in"),
        Some(user) => {
            println!("Signed in as {}", describe_user(user));
            if let Some(company_id) = &user.company_id {
                println!("Company: {company_id}");
            }
            if let Some(office_id) = &user.office_id {
                println!("Office: {office_id}");
            }
            if snapshot.needs_company_selection() {
                println!(
                    "Company selection pending ({} available)",
                    snapshot.pending_companies.len()
                );
            }
        }
    }
    Ok(())
}

fn check(settings: &Settings, path: &str) -> Result<()> {
    let session = open_session(settings, None)?;
    match guards::evaluate(&session.snapshot(), path) {
        Decision::Allow => println!("allow {path}"),
        Decision::Redirect(to) => println!("redirect {path} -> {to}"),
    }
    Ok(())
}

fn describe_user(user: &User) -> String {
    let mut description = user.email.clone();
    if let Some(name) = &user.name {
        description = format!("{name} <{description}>");
    }
    if user.is_super_admin {
        description.push_str(" (super admin)");
    } else if let Some(role) = &user.role {
        description.push_str(&format!(" ({role})"));
    }
    description
}

fn print_companies(companies: &[CompanyAssociation]) {
    for association in companies {
        match &association.office {
            Some(office) => println!(
                "  {:<12} {} / {}",
                association.company.id, association.company.name, office.name
            ),
            None => println!(
                "  {:<12} {}",
                association.company.id, association.company.name
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_user() {
        let mut user = User {
            uid: "u-1".into(),
            email: "ana@corretaje.test".into(),
            role: Some("Agente".into()),
            is_super_admin: false,
            company_id: None,
            office_id: None,
            entity_id: None,
            name: Some("Ana".into()),
            requires_company_selection: false,
        };
        assert_eq!(describe_user(&user), "Ana <ana@corretaje.test> (Agente)");

        user.name = None;
        user.is_super_admin = true;
        assert_eq!(describe_user(&user), "ana@corretaje.test (super admin)");
    }
}
