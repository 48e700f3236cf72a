//! `chirp` — command-line front end for the Chirp client.
//!
//! Every run is a fresh process with an empty cookie jar, so commands that
//! need a session log in first when `--email`/`--password` are given and
//! otherwise try to restore one.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{Arc, Mutex, PoisonError};

use chirp::prelude::*;
use clap::{Parser, Subcommand};

/// Chirp command-line client.
#[derive(Parser, Debug)]
#[command(name = "chirp", about = "Chirp micro-blog client")]
struct Cli {
    /// Backend origin.
    #[arg(long, global = true, env = chirp::API_URL_ENV)]
    base_url: Option<String>,

    /// Log in with this email before running the command.
    #[arg(long, global = true, env = "CHIRP_EMAIL")]
    email: Option<String>,

    /// Password for `--email`.
    #[arg(long, global = true, env = "CHIRP_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show who is logged in.
    Whoami,

    /// Log in (uses --email / --password).
    Login,

    /// Create an account.
    Register {
        #[arg(long)]
        username: String,
    },

    /// End the session.
    Logout,

    /// Change username and/or email.
    UpdateProfile {
        #[arg(long)]
        username: Option<String>,
        #[arg(long = "new-email")]
        new_email: Option<String>,
    },

    /// Upload a new avatar (png, jpeg or webp, up to 5 MiB).
    UploadAvatar { file: PathBuf },

    /// Show a user's public profile.
    Profile { user_id: String },
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Chirp(#[from] ChirpError),

    #[error("{}", .0.user_message())]
    Api(#[from] ApiError),

    #[error("can't read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0} requires --email and --password")]
    MissingCredentials(&'static str),

    #[error("not logged in")]
    NotLoggedIn,
}

/// Prints navigations instead of rendering pages.
struct StderrNavigator {
    path: Mutex<String>,
}

impl StderrNavigator {
    fn new(route: Route) -> Self {
        Self {
            path: Mutex::new(route.path().to_string()),
        }
    }

    fn set(&self, route: Route) {
        *self.path.lock().unwrap_or_else(PoisonError::into_inner) = route.path().to_string();
    }
}

impl Navigator for StderrNavigator {
    fn current_path(&self) -> String {
        self.path.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn navigate(&self, route: Route) {
        eprintln!("→ {route}");
        self.set(route);
    }

    fn hard_redirect(&self, route: Route) {
        eprintln!("⟳ session ended, back to {route}");
        self.set(route);
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    chirp::init_tracing();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = ClientConfig::from_env()?;
    if let Some(url) = &cli.base_url {
        config = config.with_base_url(url);
    }
    tracing::debug!(command = ?cli.command, base_url = %config.base_url, "starting");

    let credentials = match (cli.email, cli.password) {
        (Some(email), Some(password)) => Some(LoginPayload { email, password }),
        _ => None,
    };

    // Start on the login page when we're about to log in, so no restore
    // round trip is made.
    let start = match (&cli.command, &credentials) {
        (Command::Register { .. }, _) => Route::Register,
        (_, Some(_)) => Route::Login,
        _ => Route::Home,
    };
    let client = ChirpClient::connect(config, Arc::new(StderrNavigator::new(start)))?;
    let session = client.session();

    match cli.command {
        Command::Register { username } => {
            let login = credentials.ok_or(CliError::MissingCredentials("register"))?;
            let user = session
                .register(&RegisterPayload {
                    username,
                    email: login.email,
                    password: login.password,
                })
                .await?;
            println!("created account {} ({})", user.username, user.id);
            return Ok(());
        }
        Command::Login if credentials.is_none() => {
            return Err(CliError::MissingCredentials("login"));
        }
        _ => {}
    }

    match &credentials {
        Some(login) => {
            session.login(login).await?;
        }
        None => {
            session.restore_session().await;
        }
    }

    match cli.command {
        Command::Whoami | Command::Login => {
            let user = session.current_user().ok_or(CliError::NotLoggedIn)?;
            print_user(&user);
        }
        Command::Logout => {
            session.logout().await;
            println!("logged out");
        }
        Command::UpdateProfile {
            username,
            new_email,
        } => {
            let current = session.current_user().ok_or(CliError::NotLoggedIn)?;
            let update = ProfileUpdate::diff(&current, username.as_deref(), new_email.as_deref())?;
            let user = session.update_profile(&update).await?;
            print_user(&user);
        }
        Command::UploadAvatar { file } => {
            if !session.is_authenticated() {
                return Err(CliError::NotLoggedIn);
            }
            let bytes = tokio::fs::read(&file).await.map_err(|source| CliError::Read {
                path: file.clone(),
                source,
            })?;
            let file_name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let upload = AvatarUpload::from_file_name(file_name, bytes)?;
            let user = session.update_avatar(&upload).await?;
            print_user(&user);
        }
        Command::Profile { user_id } => {
            let user = client.api().public_profile(&UserId::new(user_id)).await?;
            print_user(&user);
        }
        Command::Register { .. } => {}
    }

    Ok(())
}

fn print_user(user: &User) {
    println!("{} <{}>", user.username, user.email);
    println!("  id:      {}", user.id);
    println!("  joined:  {}", user.created_at);
    if let Some(avatar) = &user.avatar {
        println!("  avatar:  {avatar}");
    }
}
