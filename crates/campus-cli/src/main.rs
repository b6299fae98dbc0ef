//! campus CLI, a terminal client for the learning-management backend.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "campus", version, about = "Learning-management client")]
struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a starter config file
    Init {
        /// Overwrite an existing campus.toml
        #[arg(long)]
        force: bool,
    },

    /// Log in and store the session
    Login {
        #[arg(long)]
        username: String,

        #[arg(long)]
        password: String,
    },

    /// Create an account
    Register {
        #[arg(long)]
        firstname: String,

        #[arg(long)]
        lastname: String,

        #[arg(long)]
        username: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,

        /// Role to register as (default: learner)
        #[arg(long)]
        role: Option<String>,
    },

    /// Request a password reset link
    ResetPassword {
        #[arg(long)]
        email: String,
    },

    /// Forget the stored session
    Logout,

    /// Show the stored session
    Whoami,

    /// List available courses
    Courses,

    /// Enroll in a course and study it interactively
    Learn {
        /// Course id
        #[arg(long)]
        course: i64,

        /// Name printed on the certificate (default: your username)
        #[arg(long)]
        name: Option<String>,
    },

    /// Open a dashboard route (default: the one for your role)
    Dashboard {
        /// Route path, e.g. /dashboard/admin
        path: Option<String>,
    },

    /// Administrator tools
    Admin {
        #[command(subcommand)]
        action: commands::admin::AdminAction,
    },

    /// Lecturer module catalogue
    Lecturer {
        #[command(subcommand)]
        action: commands::lecturer::LecturerAction,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("campus=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.config.as_deref();

    let result = match cli.command {
        Commands::Init { force } => commands::init::execute(force),
        Commands::Login { username, password } => {
            commands::auth::login(config, &username, &password).await
        }
        Commands::Register {
            firstname,
            lastname,
            username,
            email,
            password,
            role,
        } => {
            commands::auth::register(
                config,
                commands::auth::RegisterArgs {
                    firstname,
                    lastname,
                    username,
                    email,
                    password,
                    role,
                },
            )
            .await
        }
        Commands::ResetPassword { email } => commands::auth::reset_password(config, &email).await,
        Commands::Logout => commands::auth::logout(config),
        Commands::Whoami => commands::auth::whoami(config),
        Commands::Courses => commands::courses::execute(config).await,
        Commands::Learn { course, name } => commands::learn::execute(config, course, name).await,
        Commands::Dashboard { path } => commands::dashboard::execute(config, path).await,
        Commands::Admin { action } => commands::admin::execute(config, action).await,
        Commands::Lecturer { action } => commands::lecturer::execute(config, action).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
