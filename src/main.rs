//! Command-line front end for the ERP master-data forms.

use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use erp_forms::api::{AuthApi, RequestClient};
use erp_forms::auth::SessionContext;
use erp_forms::config::Config;
use erp_forms::db::{self, SessionRepository};
use erp_forms::errors::ClientError;
use erp_forms::forms::{EventForm, Interaction, ResourceForm};
use erp_forms::models::{City, Committee, Event, EventType, Program, RecordId, Resource};

#[derive(Parser, Debug)]
#[command(name = "erp-forms", about = "Manage College ERP master data")]
struct Cli {
    /// Answer yes to every confirmation
    #[arg(long, global = true)]
    yes: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check the password and request an OTP
    Login {
        #[arg(long)]
        user_id: String,
        #[arg(long)]
        password: String,
    },
    /// Exchange the emailed OTP for a session
    VerifyOtp {
        #[arg(long)]
        user_id: String,
        #[arg(long)]
        otp: String,
    },
    /// Email a fresh login OTP
    ResendOtp {
        #[arg(long)]
        user_id: String,
    },
    /// Email a password reset OTP
    RequestPasswordReset {
        #[arg(long)]
        user_id: String,
    },
    /// Check a password reset OTP
    VerifyResetOtp {
        #[arg(long)]
        user_id: String,
        #[arg(long)]
        otp: String,
    },
    /// Set a new password with a reset OTP
    ResetPassword {
        #[arg(long)]
        user_id: String,
        #[arg(long)]
        otp: String,
        #[arg(long)]
        new_password: String,
    },
    Logout,
    List {
        resource: ResourceKind,
    },
    Create {
        resource: ResourceKind,
        /// Draft fields as a JSON object with upper-case keys
        #[arg(long)]
        json: String,
    },
    Update {
        resource: ResourceKind,
        id: RecordId,
        /// Fields to change as a JSON object with upper-case keys
        #[arg(long)]
        json: String,
    },
    Delete {
        resource: ResourceKind,
        #[arg(required = true)]
        ids: Vec<RecordId>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ResourceKind {
    Committees,
    Events,
    EventTypes,
    Programs,
    Cities,
}

enum Action {
    List,
    Create(String),
    Update(RecordId, String),
    Delete(Vec<RecordId>),
}

/// Prompts on the terminal.
struct ConsoleInteraction {
    assume_yes: bool,
}

impl Interaction for ConsoleInteraction {
    fn confirm(&self, message: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        print!("{} [y/N] ", message);
        io::stdout().flush().ok();

        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
    }

    fn alert(&self, message: &str) {
        println!("{}", message);
    }

    fn redirect_to_login(&self) {
        eprintln!("Not logged in. Run `erp-forms login` and `erp-forms verify-otp` first.");
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), ClientError> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    tracing::debug!("Backend: {}", config.api_base_url);
    tracing::debug!("Session store: {:?}", config.session_db_path);

    let pool = db::init_database(&config.session_db_path).await?;
    let session = SessionContext::restore(SessionRepository::new(pool)).await?;
    let client = RequestClient::from_config(&config, session)?;
    let ui: Arc<dyn Interaction> = Arc::new(ConsoleInteraction {
        assume_yes: cli.yes,
    });

    let (resource, action) = match cli.command {
        Command::Login { user_id, password } => {
            let challenge = AuthApi::new(client).login(&user_id, &password).await?;
            println!("{}", challenge.message);
            return Ok(());
        }
        Command::VerifyOtp { user_id, otp } => {
            let user = AuthApi::new(client).verify_otp(&user_id, &otp).await?;
            println!("Logged in as {} ({})", user.username, user.user_id);
            return Ok(());
        }
        Command::ResendOtp { user_id } => {
            let challenge = AuthApi::new(client).resend_otp(&user_id).await?;
            println!("{}", challenge.message);
            return Ok(());
        }
        Command::RequestPasswordReset { user_id } => {
            let notice = AuthApi::new(client).request_password_reset(&user_id).await?;
            println!("{}", notice.message);
            return Ok(());
        }
        Command::VerifyResetOtp { user_id, otp } => {
            if AuthApi::new(client).verify_reset_otp(&user_id, &otp).await? {
                println!("OTP verified, run `erp-forms reset-password` next");
            }
            return Ok(());
        }
        Command::ResetPassword {
            user_id,
            otp,
            new_password,
        } => {
            let notice = AuthApi::new(client)
                .reset_password(&user_id, &otp, &new_password)
                .await?;
            println!("{}", notice.message);
            return Ok(());
        }
        Command::Logout => {
            AuthApi::new(client).logout().await;
            println!("Logged out");
            return Ok(());
        }
        Command::List { resource } => (resource, Action::List),
        Command::Create { resource, json } => (resource, Action::Create(json)),
        Command::Update { resource, id, json } => (resource, Action::Update(id, json)),
        Command::Delete { resource, ids } => (resource, Action::Delete(ids)),
    };

    match (resource, action) {
        (ResourceKind::Events, Action::List) => list_events(client, ui).await,
        (ResourceKind::Committees, action) => run_form::<Committee>(client, ui, action).await,
        (ResourceKind::Events, action) => run_form::<Event>(client, ui, action).await,
        (ResourceKind::EventTypes, action) => run_form::<EventType>(client, ui, action).await,
        (ResourceKind::Programs, action) => run_form::<Program>(client, ui, action).await,
        (ResourceKind::Cities, action) => run_form::<City>(client, ui, action).await,
    }
}

async fn run_form<R>(
    client: RequestClient,
    ui: Arc<dyn Interaction>,
    action: Action,
) -> Result<(), ClientError>
where
    R: Resource + Serialize,
{
    let mut form = ResourceForm::<R>::new(client, ui);

    match action {
        Action::List => {
            form.activate_view().await?;
            println!("{}", serde_json::to_string_pretty(form.records())?);
        }
        Action::Create(json) => {
            form.set_draft(serde_json::from_str(&json)?);
            let created = form.submit().await?;
            println!("{}", serde_json::to_string_pretty(&created)?);
        }
        Action::Update(id, json) => {
            form.refresh().await?;
            form.begin_edit(id)?;
            let draft = overlay(form.draft(), &json)?;
            form.set_draft(draft);
            let updated = form.submit().await?;
            println!("{}", serde_json::to_string_pretty(&updated)?);
        }
        Action::Delete(ids) => {
            if let [id] = ids.as_slice() {
                form.delete(*id).await?;
            } else {
                for id in ids {
                    form.toggle_selected(id);
                }
                form.delete_selected().await?;
            }
        }
    }

    Ok(())
}

/// Print events with their type and organizer resolved.
async fn list_events(client: RequestClient, ui: Arc<dyn Interaction>) -> Result<(), ClientError> {
    let mut events = EventForm::new(client, ui);
    events.load().await?;

    for event in events.form().records() {
        println!(
            "{}\t{}\t{} to {}\t{}\t{}",
            event.record_id,
            event.event_name,
            event.event_start_dt,
            event.event_end_dt,
            events.event_type_label(event).unwrap_or_else(|| "-".to_string()),
            events.organizer_name(event).unwrap_or("-"),
        );
    }
    Ok(())
}

/// Apply the keys of a JSON object on top of an existing draft.
fn overlay<D>(draft: &D, json: &str) -> Result<D, ClientError>
where
    D: Serialize + serde::de::DeserializeOwned,
{
    let mut value = serde_json::to_value(draft)?;
    let changes: serde_json::Value = serde_json::from_str(json)?;

    match (value.as_object_mut(), changes) {
        (Some(fields), serde_json::Value::Object(changes)) => fields.extend(changes),
        _ => {
            return Err(ClientError::Decode(
                "--json must be a JSON object".to_string(),
            ))
        }
    }

    Ok(serde_json::from_value(value)?)
}
