use clap::Args;
use serde_json::json;

use crate::auth::{generate_jwt, Claims, PRIVILEGE_SPACE_MANAGE};
use crate::cli::OutputFormat;
use crate::config;

#[derive(Args)]
pub struct TokenArgs {
    #[arg(long, default_value = "elastic", help = "Username placed in the token subject")]
    pub user: String,

    #[arg(long = "privilege", help = "Privilege to grant (repeatable); defaults to space:manage")]
    pub privileges: Vec<String>,

    #[arg(long, help = "Token lifetime in hours (defaults to SECURITY_JWT_EXPIRY_HOURS)")]
    pub hours: Option<u64>,
}

pub fn handle(args: TokenArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let security = &config::config().security;

    let privileges = if args.privileges.is_empty() {
        vec![PRIVILEGE_SPACE_MANAGE.to_string()]
    } else {
        args.privileges
    };
    let hours = args.hours.unwrap_or(security.jwt_expiry_hours);

    let claims = Claims::new(args.user, privileges, hours)?;
    let token = generate_jwt(&claims, security)?;

    match output_format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "token": token,
                "user": claims.sub,
                "privileges": claims.privileges,
                "expires_at": claims.exp,
            }))?
        ),
        OutputFormat::Text => println!("{}", token),
    }
    Ok(())
}
