use clap::Args;
use umutoza_app::{
    auth::{AuthService, AuthSettings, DEFAULT_TOKEN_TTL, PgAuthService},
    database,
};
use zeroize::Zeroizing;

#[derive(Debug, Args)]
pub(crate) struct CreateAdminArgs {
    /// Login name for the new admin
    #[arg(long)]
    username: String,

    /// Password for the new admin
    #[arg(long, env = "ADMIN_PASSWORD", hide_env_values = true)]
    password: String,

    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    /// Secret mixed into stored admin session hashes
    #[arg(long, env = "AUTH_TOKEN_PEPPER", hide_env_values = true)]
    token_pepper: String,
}

pub(crate) async fn run(args: CreateAdminArgs) -> Result<(), String> {
    let pool = database::connect(&args.database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    let password = Zeroizing::new(args.password);

    let service = PgAuthService::new(
        pool,
        AuthSettings {
            pepper: Zeroizing::new(args.token_pepper),
            token_ttl: DEFAULT_TOKEN_TTL,
        },
    );

    let admin = service
        .create_admin(&args.username, &password)
        .await
        .map_err(|error| format!("failed to create admin: {error}"))?;

    println!("admin_uuid: {}", admin.uuid);
    println!("username: {}", admin.username);

    Ok(())
}
