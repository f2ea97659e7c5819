use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use taskman_core::models::{CreateUser, Role};
use taskman_core::seed::{DEFAULT_ADMIN_EMAIL, DEFAULT_ADMIN_PASSWORD};
use taskman_core::token::{DEFAULT_TOKEN_TTL_MINUTES, ttl_from_minutes};
use taskman_core::{AdminAccount, PasswordHasher, TokenService, UserService, seed_defaults, seed_demo};
use taskman_db::{Backend, Database, DatabaseConfig};

#[derive(Parser)]
#[command(name = "taskman", version, about = "Taskman administration tool")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate,

    /// Insert the admin account, default statuses and labels
    Seed {
        /// Also insert demo users and tasks
        #[arg(long, default_value_t = false)]
        demo: bool,

        #[arg(long, env = "ADMIN_EMAIL", default_value = DEFAULT_ADMIN_EMAIL)]
        admin_email: String,

        #[arg(long, env = "ADMIN_PASSWORD", default_value = DEFAULT_ADMIN_PASSWORD, hide_env_values = true)]
        admin_password: String,
    },

    /// Create a user account
    CreateUser {
        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,

        #[arg(long)]
        first_name: Option<String>,

        #[arg(long)]
        last_name: Option<String>,

        /// Grant the administrator role
        #[arg(long, default_value_t = false)]
        admin: bool,
    },

    /// Print an access token for an existing user
    Token {
        #[arg(long)]
        email: String,

        #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
        jwt_secret: String,

        /// Token lifetime in minutes
        #[arg(long, env = "JWT_TTL_MINUTES", default_value_t = DEFAULT_TOKEN_TTL_MINUTES)]
        ttl_minutes: i64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("taskman=info".parse()?))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let db = connect_db().await?;

    match cli.command {
        Commands::Migrate => {
            db.migrate().await?;
            println!("Migrations applied");
        }
        Commands::Seed {
            demo,
            admin_email,
            admin_password,
        } => {
            db.migrate().await?;
            let admin = AdminAccount {
                email: admin_email,
                password: admin_password,
            };
            cmd_seed(Backend::Postgres(db), &admin, demo).await?;
        }
        Commands::CreateUser {
            email,
            password,
            first_name,
            last_name,
            admin,
        } => {
            let role = if admin { Role::Admin } else { Role::User };
            let input = CreateUser {
                first_name,
                last_name,
                ..CreateUser::new(email, password).with_role(role)
            };
            let user = UserService::new(Backend::Postgres(db), PasswordHasher::new())
                .create(input)
                .await?;
            println!("Created user {} <{}> ({})", user.id, user.email, user.role);
        }
        Commands::Token {
            email,
            jwt_secret,
            ttl_minutes,
        } => {
            let tokens = TokenService::new(jwt_secret.as_bytes(), ttl_from_minutes(ttl_minutes)?)?;
            let user = UserService::new(Backend::Postgres(db), PasswordHasher::new())
                .find_by_email(&email)
                .await?;
            println!("{}", tokens.issue(&user)?);
        }
    }

    Ok(())
}

/// Connect to PostgreSQL using DATABASE_URL.
async fn connect_db() -> Result<Database> {
    let config = DatabaseConfig::from_env().context("The taskman CLI works on PostgreSQL only")?;
    let db = Database::connect(&config)
        .await
        .context("Failed to connect to database")?;
    Ok(db)
}

async fn cmd_seed(store: Backend, admin: &AdminAccount, demo: bool) -> Result<()> {
    let hasher = PasswordHasher::new();

    let report = seed_defaults(&store, &hasher, admin).await?;
    println!(
        "Defaults: {} user(s), {} status(es), {} label(s) added",
        report.users, report.statuses, report.labels
    );

    if demo {
        let report = seed_demo(&store, &hasher).await?;
        println!(
            "Demo data: {} user(s), {} task(s) added",
            report.users, report.tasks
        );
    }

    Ok(())
}
