//! gradedesk - command-line front end
//!
//! Each invocation is one page session: the session guard runs, the view
//! model is initialized, one action is performed and the status line plus
//! the relevant panel are printed.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use gradedesk_common::api::{ApiClient, FileUpload, HttpTransport};
use gradedesk_common::config::{CliOverrides, ClientConfig, ENV_API_URL, ENV_DATA_FOLDER};
use gradedesk_common::{CredentialStore, SessionGuard};
use gradedesk_ui::capture::{CameraDevice, StillImageCamera, UnavailableCamera, UploadSlot};
use gradedesk_ui::panels::VaultPanel;
use gradedesk_ui::workbench::{Draft, WorkbenchMode};
use gradedesk_ui::{session, ActionResult, App, View};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for gradedesk
#[derive(Parser, Debug)]
#[command(name = "gradedesk")]
#[command(about = "Assignment workbench and grader client")]
#[command(version)]
struct Cli {
    /// Base URL of the grading API
    #[arg(long, env = ENV_API_URL)]
    api_url: Option<String>,

    /// Folder holding the stored credential
    #[arg(long, env = ENV_DATA_FOLDER)]
    data_folder: Option<PathBuf>,

    /// Config file (defaults to the platform config dir)
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in and store the access token
    Login(Credentials),
    /// Create an account
    Register(Credentials),
    /// Remove the stored access token
    Logout,
    /// Generate questions and answers from a source file
    Generate {
        #[arg(long)]
        source: PathBuf,
        #[command(flatten)]
        draft: DraftOut,
    },
    /// Refine a draft with feedback
    Refine {
        #[arg(long)]
        draft: PathBuf,
        #[arg(long, default_value = "")]
        feedback: String,
    },
    /// Save a draft as an assignment
    Save {
        #[arg(long)]
        draft: PathBuf,
        #[arg(long)]
        name: String,
    },
    /// Generate answers for an uploaded question paper
    UploadGenerate {
        #[command(flatten)]
        question_paper: ImageInput,
        #[arg(long)]
        source_material: Option<PathBuf>,
        #[command(flatten)]
        draft: DraftOut,
    },
    /// Refine answers for an uploaded question paper
    UploadRefine {
        #[arg(long)]
        draft: PathBuf,
        #[command(flatten)]
        question_paper: ImageInput,
        #[arg(long)]
        feedback: String,
        #[arg(long)]
        source_material: Option<PathBuf>,
    },
    /// Save uploaded-paper answers as an assignment
    UploadSave {
        #[arg(long)]
        draft: PathBuf,
        #[arg(long)]
        name: String,
    },
    /// Upload a question paper and optional reference answers
    UploadBoth {
        #[arg(long)]
        name: String,
        #[command(flatten)]
        question_paper: ImageInput,
        #[arg(long)]
        reference_answers: Option<PathBuf>,
    },
    /// Grade a student answer sheet
    Grade {
        #[arg(long)]
        assignment: String,
        #[command(flatten)]
        sheet: ImageInput,
        #[arg(long)]
        class_id: Option<i64>,
        #[arg(long)]
        student_id: Option<i64>,
        #[arg(long)]
        remarks: Option<String>,
    },
    /// Manage classes and rosters
    #[command(subcommand)]
    Classes(ClassesCommand),
    /// Show or edit the profile
    #[command(subcommand)]
    Profile(ProfileCommand),
    /// Show the password-protected dashboard
    Vault {
        #[arg(long, env = "GRADEDESK_PASSWORD", hide_env_values = true)]
        password: String,
    },
}

#[derive(Args, Debug)]
struct Credentials {
    #[arg(long)]
    email: String,
    #[arg(long, env = "GRADEDESK_PASSWORD", hide_env_values = true)]
    password: String,
}

#[derive(Args, Debug)]
struct DraftOut {
    /// Write the resulting draft to this JSON file
    #[arg(long = "draft-out")]
    path: Option<PathBuf>,
}

/// An image given as a file or captured from a still-image camera
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct ImageInput {
    /// Image or PDF file to upload
    #[arg(long)]
    file: Option<PathBuf>,
    /// Capture through the camera backed by this image
    #[arg(long)]
    camera: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum ClassesCommand {
    List,
    Create {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        section: String,
    },
    Students {
        #[arg(long)]
        class_id: i64,
    },
    /// Add students from lines of `name, email, roll_number`
    AddStudents {
        #[arg(long)]
        class_id: i64,
        #[arg(long)]
        file: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
enum ProfileCommand {
    Show,
    Set {
        #[arg(long)]
        full_name: Option<String>,
        #[arg(long)]
        class_name: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config = ClientConfig::resolve(&CliOverrides {
        api_base_url: cli.api_url.clone(),
        data_folder: cli.data_folder.clone(),
        config_file: cli.config.clone(),
    });

    // Logs go to stderr; stdout carries the rendered output
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "gradedesk={0},gradedesk_ui={0},gradedesk_common={0}",
                    config.log_level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!(
        "Starting {} v{}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );
    info!("API: {}", config.api_base_url);

    let store = Arc::new(
        CredentialStore::open(config.credential_path())
            .context("Failed to open credential store")?,
    );

    match cli.command {
        Command::Login(creds) => {
            let api = bare_client(&config, Arc::clone(&store))?;
            return Ok(report(
                session::login(&api, store, &creds.email, &creds.password)
                    .await
                    .map(|_| "Logged in.".to_string()),
            ));
        }
        Command::Register(creds) => {
            let api = bare_client(&config, Arc::clone(&store))?;
            return Ok(report(
                session::register(&api, &creds.email, &creds.password)
                    .await
                    .map(|account| {
                        format!("Registered {}. Run `gradedesk login` next.", account.email)
                    }),
            ));
        }
        command => {
            // Guard runs before any request
            let session = match SessionGuard::enforce(Arc::clone(&store)) {
                Ok(session) => session,
                Err(redirect) => {
                    eprintln!("{}", redirect);
                    return Ok(ExitCode::from(2));
                }
            };

            let camera = camera_for(&command);
            let app = App::connect(session, &config.api_base_url, camera)?;
            app.initialize().await;

            let result = run(&app, command).await;
            let status = app.status();
            match &result {
                Err(e) if !status.is_error() => eprintln!("error: {}", e),
                _ => println!("{}", status),
            }
            if app.navigation() == gradedesk_ui::Navigation::Login {
                eprintln!("Run `gradedesk login` to sign in again.");
            }
            Ok(if result.is_ok() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
    }
}

fn bare_client(config: &ClientConfig, store: Arc<CredentialStore>) -> Result<ApiClient> {
    let transport = HttpTransport::new(&config.api_base_url, store)?;
    Ok(ApiClient::new(Arc::new(transport)))
}

fn report(result: ActionResult<String>) -> ExitCode {
    match result {
        Ok(message) => {
            println!("{}", message);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Pick the camera device for the command's `--camera` image, if any
fn camera_for(command: &Command) -> Arc<dyn CameraDevice> {
    let input = match command {
        Command::UploadGenerate { question_paper, .. }
        | Command::UploadRefine { question_paper, .. }
        | Command::UploadBoth { question_paper, .. } => question_paper,
        Command::Grade { sheet, .. } => sheet,
        _ => return Arc::new(UnavailableCamera),
    };
    match &input.camera {
        Some(path) => Arc::new(StillImageCamera::new(path)),
        None => Arc::new(UnavailableCamera),
    }
}

/// Fill `slot` from a file or a camera capture
fn attach_image(app: &App, slot: UploadSlot, input: &ImageInput) -> ActionResult<()> {
    if let Some(path) = &input.file {
        app.choose_file(slot, app.read_upload(path)?);
    } else {
        app.start_capture(slot)?;
        app.capture()?;
    }
    Ok(())
}

fn read_optional(app: &App, path: Option<&PathBuf>) -> ActionResult<Option<FileUpload>> {
    path.map(|path| app.read_upload(path)).transpose()
}

fn read_draft(path: &Path) -> gradedesk_common::Result<Draft> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

fn write_draft(path: &Path, draft: &Draft) -> gradedesk_common::Result<()> {
    let json = serde_json::to_string_pretty(draft)?;
    std::fs::write(path, json)?;
    Ok(())
}

fn load_draft(app: &App, path: &Path) -> ActionResult<()> {
    match read_draft(path) {
        Ok(draft) => {
            app.edit_workbench(|wb| wb.draft = draft);
            Ok(())
        }
        Err(e) => app.report_failure(&format!("Could not load draft {}", path.display()), e.into()),
    }
}

fn store_draft(app: &App, path: Option<&Path>) -> ActionResult<()> {
    let draft = app.with_model(|model| model.workbench.draft.clone());
    match path {
        Some(path) => match write_draft(path, &draft) {
            Ok(()) => info!("Draft written to {}", path.display()),
            Err(e) => {
                return app.report_failure(
                    &format!("Could not write draft {}", path.display()),
                    e.into(),
                )
            }
        },
        None => print_lines(&app.screen().results_lines()),
    }
    Ok(())
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}

async fn run(app: &App, command: Command) -> ActionResult<()> {
    match command {
        Command::Login(_) | Command::Register(_) => Ok(()),
        Command::Logout => app.logout(),

        Command::Generate { source, draft } => {
            app.select_mode(WorkbenchMode::Generate);
            let file = app.read_upload(&source)?;
            app.edit_workbench(|wb| wb.source_file = Some(file));
            app.generate().await?;
            store_draft(app, draft.path.as_deref())
        }
        Command::Refine { draft, feedback } => {
            app.select_mode(WorkbenchMode::Generate);
            load_draft(app, &draft)?;
            app.edit_workbench(|wb| wb.feedback = feedback);
            app.refine().await?;
            store_draft(app, Some(draft.as_path()))
        }
        Command::Save { draft, name } => {
            app.select_mode(WorkbenchMode::Generate);
            load_draft(app, &draft)?;
            app.edit_workbench(|wb| wb.assignment_name = name);
            app.save().await
        }

        Command::UploadGenerate {
            question_paper,
            source_material,
            draft,
        } => {
            app.select_mode(WorkbenchMode::UploadThenGenerate);
            attach_image(app, UploadSlot::QuestionPaper, &question_paper)?;
            let material = read_optional(app, source_material.as_ref())?;
            app.edit_workbench(|wb| wb.source_material = material);
            app.generate().await?;
            store_draft(app, draft.path.as_deref())
        }
        Command::UploadRefine {
            draft,
            question_paper,
            feedback,
            source_material,
        } => {
            app.select_mode(WorkbenchMode::UploadThenGenerate);
            load_draft(app, &draft)?;
            attach_image(app, UploadSlot::QuestionPaper, &question_paper)?;
            let material = read_optional(app, source_material.as_ref())?;
            app.edit_workbench(|wb| {
                wb.source_material = material;
                wb.upload_feedback = feedback;
            });
            app.refine().await?;
            store_draft(app, Some(draft.as_path()))
        }
        Command::UploadSave { draft, name } => {
            app.select_mode(WorkbenchMode::UploadThenGenerate);
            load_draft(app, &draft)?;
            app.edit_workbench(|wb| wb.final_assignment_name = name);
            app.save().await
        }
        Command::UploadBoth {
            name,
            question_paper,
            reference_answers,
        } => {
            app.select_mode(WorkbenchMode::UploadBoth);
            attach_image(app, UploadSlot::QuestionPaperBoth, &question_paper)?;
            if let Some(file) = read_optional(app, reference_answers.as_ref())? {
                app.choose_file(UploadSlot::ReferenceAnswers, file);
            }
            app.edit_workbench(|wb| wb.upload_assignment_name = name);
            app.save().await
        }

        Command::Grade {
            assignment,
            sheet,
            class_id,
            student_id,
            remarks,
        } => {
            app.switch_to(View::Grader).await;
            app.select_assignment(&assignment)?;
            if class_id.is_some() {
                app.select_class(class_id).await?;
                app.select_student(student_id)?;
            }
            if let Some(remarks) = remarks {
                app.set_remarks(&remarks);
            }
            attach_image(app, UploadSlot::StudentSheet, &sheet)?;
            app.submit_grading().await?;
            print_lines(&app.screen().results_lines());
            Ok(())
        }

        Command::Classes(command) => run_classes(app, command).await,

        Command::Profile(ProfileCommand::Show) => {
            app.load_profile().await?;
            print_lines(&app.with_model(|model| model.profile.lines()));
            Ok(())
        }
        Command::Profile(ProfileCommand::Set {
            full_name,
            class_name,
        }) => {
            app.load_profile().await?;
            app.edit_profile(full_name.as_deref(), class_name.as_deref());
            app.save_profile().await?;
            print_lines(&app.with_model(|model| model.profile.lines()));
            Ok(())
        }

        Command::Vault { password } => {
            app.open_vault();
            app.unlock_vault(&password).await?;
            if let VaultPanel::Unlocked(view) = app.vault() {
                print_lines(&view.lines());
            }
            Ok(())
        }
    }
}

async fn run_classes(app: &App, command: ClassesCommand) -> ActionResult<()> {
    match command {
        ClassesCommand::List => {
            app.refresh_classes().await?;
            print_lines(&app.with_model(|model| model.classes.class_lines()));
        }
        ClassesCommand::Create { name, section } => {
            app.create_class(&name, &section).await?;
            print_lines(&app.with_model(|model| model.classes.class_lines()));
        }
        ClassesCommand::Students { class_id } => {
            let lines = app.show_roster(class_id).await?;
            print_lines(&lines);
        }
        ClassesCommand::AddStudents { class_id, file } => {
            let text = match std::fs::read_to_string(&file) {
                Ok(text) => text,
                Err(e) => {
                    return app.report_failure(
                        &format!("Could not read {}", file.display()),
                        gradedesk_common::Error::from(e).into(),
                    )
                }
            };
            let added = app.add_students(class_id, &text).await?;
            if added == 0 {
                warn!("No named students found in {}", file.display());
            }
            print_lines(&app.with_model(|model| model.classes.roster_lines()));
        }
    }
    Ok(())
}
