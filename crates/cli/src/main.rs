use api_shared::{DashboardPatient, PatientListParams};
use chrono::Utc;
use clap::{Parser, Subcommand};
use medicard_core::constants::DEFAULT_DATABASE_URL;
use medicard_core::models::NewUser;
use medicard_core::repositories::{PatientService, UserService};
use medicard_core::{
    CoreConfig, DashboardService, Database, MedicardError, PageRequest, PatientListQuery, Role,
};
use medicard_types::{EmailAddress, NonEmptyText};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "medicard")]
#[command(about = "MEDICARD hospital management CLI")]
struct Cli {
    /// Store location; falls back to `DATABASE_URL`
    #[arg(long, global = true)]
    database_url: Option<String>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending schema migrations
    Migrate,
    /// Create a user account
    CreateUser {
        username: String,
        email: String,
        password: String,
        /// Admin, Doctor, Resident, Nurse, LabTech, Radiologist, Pharmacist or User
        #[arg(long, default_value = "User")]
        role: Role,
    },
    /// Activate or deactivate a user account
    SetActive {
        username: String,
        #[arg(action = clap::ArgAction::Set)]
        active: bool,
    },
    /// List patients ordered by name
    ListPatients {
        /// Substring of MRN, first name or last name
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        page: Option<i64>,
        #[arg(long)]
        per_page: Option<i64>,
    },
    /// Print the dashboard patient list as seen by a user
    Dashboard {
        /// Username whose consults and orders drive the indicators
        username: String,
        #[arg(long)]
        unit: Option<String>,
        /// e.g. new_admission_24
        #[arg(long)]
        status: Option<String>,
        /// name_asc or location_asc
        #[arg(long)]
        sort_by: Option<String>,
        #[arg(long)]
        page: Option<i64>,
        #[arg(long)]
        limit: Option<i64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "medicard=warn".into()),
        )
        .init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("Use 'medicard --help' for commands");
        return Ok(());
    };

    let database_url = cli
        .database_url
        .or_else(|| std::env::var("DATABASE_URL").ok())
        .unwrap_or_else(|| DEFAULT_DATABASE_URL.into());
    let db = Database::connect(&database_url).await?;

    match command {
        Commands::Migrate => {
            db.run_migrations().await?;
            println!("Migrations applied to {}", database_url);
        }
        Commands::CreateUser {
            username,
            email,
            password,
            role,
        } => {
            let new = NewUser {
                username: NonEmptyText::new(&username).map_err(MedicardError::from)?,
                email: EmailAddress::parse(&email).map_err(MedicardError::from)?,
                password,
                role: Some(role),
            };
            let user = UserService::new(db).register(new, Utc::now()).await?;
            println!("Created user {} ({}) with ID {}", user.username, user.role, user.id);
        }
        Commands::SetActive { username, active } => {
            let users = UserService::new(db);
            let user = users.get_by_username(&username).await?;
            let user = users.set_active(user.id, active).await?;
            println!(
                "User {} is now {}",
                user.username,
                if user.is_active { "active" } else { "inactive" }
            );
        }
        Commands::ListPatients {
            search,
            page,
            per_page,
        } => {
            let request = PageRequest::new(page, per_page)?;
            let page = PatientService::new(db)
                .list(search.as_deref(), request)
                .await?;
            if page.items.is_empty() {
                println!("No patients found.");
            }
            for patient in &page.items {
                println!(
                    "{}  {}, {}  DOB {}  Bed {}",
                    patient.mrn,
                    patient.last_name,
                    patient.first_name,
                    patient.dob,
                    patient.location_bed.as_deref().unwrap_or("-")
                );
            }
            let p = page.pagination();
            println!(
                "Page {} of {} ({} patients)",
                p.current_page, p.total_pages, p.total_items
            );
        }
        Commands::Dashboard {
            username,
            unit,
            status,
            sort_by,
            page,
            limit,
        } => {
            let cfg = Arc::new(CoreConfig::from_env_values(
                std::env::var("JWT_SECRET_KEY").ok(),
                std::env::var("JWT_ACCESS_TOKEN_EXPIRES").ok(),
                std::env::var("MEDICARD_INDICATOR_WINDOW_HOURS").ok(),
            )?);
            let viewer = UserService::new(db.clone())
                .get_by_username(&username)
                .await?;
            let query = PatientListQuery::from_params(&PatientListParams {
                unit,
                status,
                sort_by,
                page,
                limit,
            })?;
            let res = DashboardService::new(db, cfg)
                .patient_list(viewer.id, &query, Utc::now())
                .await?;
            for patient in &res.patients {
                println!("{}", dashboard_line(patient));
            }
            let p = res.pagination;
            println!(
                "Page {} of {} ({} patients)",
                p.current_page, p.total_pages, p.total_items
            );
        }
    }

    Ok(())
}

/// One roster row with its raised indicators, e.g. `MRN-100  Ada Lovelace  ICU-1  [LAB CONSULT]`.
fn dashboard_line(patient: &DashboardPatient) -> String {
    let s = patient.status_indicators;
    let flags: Vec<&str> = [
        (s.has_critical_lab, "LAB"),
        (s.has_critical_imaging, "IMAGING"),
        (s.has_unread_consult, "CONSULT"),
        (s.has_pending_orders, "ORDERS"),
        (s.has_abnormal_vitals, "VITALS"),
    ]
    .into_iter()
    .filter_map(|(raised, label)| raised.then_some(label))
    .collect();

    format!(
        "{}  {}  {}  [{}]",
        patient.mrn,
        patient.name,
        patient.location_bed.as_deref().unwrap_or("-"),
        flags.join(" ")
    )
}
