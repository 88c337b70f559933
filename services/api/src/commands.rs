use crate::infra::{build_workflows, preference_store};
use clap::{Args, ValueEnum};
use std::path::PathBuf;
use steps_intake::config::AppConfig;
use steps_intake::error::AppError;
use steps_intake::preferences::ThemeContext;
use steps_intake::storage::UploadProgress;
use steps_intake::telemetry;
use steps_intake::workflows::cv_submission::{
    ApplicantSubmission, AttachedFile, SubmissionOutcome, SubmissionReport,
};
use steps_intake::workflows::scholarship::{
    estimate, CourseLevel, EnglishLevel, GradeBand, Nationality, ScholarshipEstimate,
    ScholarshipRequest,
};

#[derive(Args, Debug)]
pub(crate) struct SubmitCvArgs {
    /// Applicant full name
    #[arg(long)]
    pub(crate) name: String,
    /// Applicant email address
    #[arg(long)]
    pub(crate) email: String,
    /// Applicant phone number
    #[arg(long)]
    pub(crate) phone: String,
    /// Highest education or qualification
    #[arg(long)]
    pub(crate) education: Option<String>,
    /// Summary of work experience
    #[arg(long)]
    pub(crate) experience: Option<String>,
    /// CV document (PDF, DOC or DOCX, up to 5 MB)
    #[arg(long)]
    pub(crate) file: PathBuf,
}

#[derive(Args, Debug)]
pub(crate) struct ThemeArgs {
    #[arg(value_enum, default_value_t = ThemeAction::Show)]
    pub(crate) action: ThemeAction,
    /// Treat the operating system as preferring dark mode on first use
    #[arg(long)]
    pub(crate) system_dark: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum ThemeAction {
    Show,
    Toggle,
}

#[derive(Args, Debug)]
pub(crate) struct ScholarshipArgs {
    /// uk, eu or international
    #[arg(long, value_parser = parse_nationality)]
    pub(crate) nationality: Nationality,
    /// undergraduate, postgraduate or phd
    #[arg(long, value_parser = parse_course_level)]
    pub(crate) course_level: CourseLevel,
    /// excellent, good, average or below
    #[arg(long, value_parser = parse_grades)]
    pub(crate) grades: GradeBand,
    /// native, advanced, intermediate or basic
    #[arg(long, value_parser = parse_english_level)]
    pub(crate) english_level: EnglishLevel,
    /// Applicant has extracurricular achievements
    #[arg(long)]
    pub(crate) extra_curricular: bool,
}

fn parse_nationality(raw: &str) -> Result<Nationality, String> {
    Nationality::parse(raw).ok_or_else(|| format!("unknown nationality '{raw}'"))
}

fn parse_course_level(raw: &str) -> Result<CourseLevel, String> {
    CourseLevel::parse(raw).ok_or_else(|| format!("unknown course level '{raw}'"))
}

fn parse_grades(raw: &str) -> Result<GradeBand, String> {
    GradeBand::parse(raw).ok_or_else(|| format!("unknown grade band '{raw}'"))
}

fn parse_english_level(raw: &str) -> Result<EnglishLevel, String> {
    EnglishLevel::parse(raw).ok_or_else(|| format!("unknown English level '{raw}'"))
}

/// Prints each distinct percentage on its own line.
struct ConsoleProgress;

impl UploadProgress for ConsoleProgress {
    fn report(&self, percent: u8) {
        println!("  Progress: {percent}%");
    }
}

pub(crate) async fn run_submit_cv(args: SubmitCvArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry, config.environment)?;

    let bytes = tokio::fs::read(&args.file).await?;
    let file_name = args
        .file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let content_type = mime_guess::from_path(&args.file)
        .first_raw()
        .unwrap_or_default();

    let submission = ApplicantSubmission {
        full_name: args.name,
        email: args.email,
        phone: args.phone,
        education: args.education.unwrap_or_default(),
        experience: args.experience.unwrap_or_default(),
        attachment: Some(AttachedFile::new(file_name, content_type, bytes)),
    };

    let workflows = build_workflows(&config)?;
    println!("CV submission ({} storage)", config.storage.mode.label());
    let report = workflows.cv.submit(submission, &ConsoleProgress).await;
    render_submission_report(&report);
    Ok(())
}

fn render_submission_report(report: &SubmissionReport) {
    let trail: Vec<&str> = report.trail.iter().map(|state| state.label()).collect();
    println!("  States: {}", trail.join(" -> "));

    match &report.outcome {
        SubmissionOutcome::Rejected(errors) => {
            println!("  Submission rejected:");
            for field in errors.fields() {
                println!("    {}: {}", field, errors.get(field).unwrap_or_default());
            }
        }
        SubmissionOutcome::Succeeded {
            message,
            advisory,
            delivery,
            receipt,
        } => {
            println!("  {message}");
            if let Some(advisory) = advisory {
                println!("  Note: {advisory}");
            }
            println!("  CV delivery: {}", delivery.label());
            println!("  Relay response: {} {}", receipt.status, receipt.text);
        }
        SubmissionOutcome::Failed { error } => {
            println!("  Submission failed: {error}");
        }
    }

    if let Some(err) = &report.storage_error {
        println!("  Storage fallback reason: {err}");
    }
}

pub(crate) fn run_theme(args: ThemeArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let mut theme = ThemeContext::initialize(preference_store(&config), args.system_dark)?;

    let snapshot = match args.action {
        ThemeAction::Show => theme.snapshot(),
        ThemeAction::Toggle => theme.toggle()?,
    };
    println!(
        "Theme: {} (stored in {})",
        snapshot.name(),
        config.preferences.path.display()
    );
    Ok(())
}

pub(crate) fn run_scholarship_estimate(args: ScholarshipArgs) -> Result<(), AppError> {
    let request = ScholarshipRequest {
        nationality: Some(args.nationality),
        course_level: Some(args.course_level),
        grades: Some(args.grades),
        english_level: Some(args.english_level),
        has_extra_curricular: args.extra_curricular,
    };

    match estimate(&request) {
        Ok(result) => render_estimate(&result),
        Err(errors) => {
            for field in errors.fields() {
                println!("{}: {}", field, errors.get(field).unwrap_or_default());
            }
        }
    }
    Ok(())
}

fn render_estimate(result: &ScholarshipEstimate) {
    println!("Scholarship estimate");
    println!("  Amount: £{}", result.amount);
    println!("  Tuition covered: {}%", result.percentage_covered);
    println!(
        "  Eligible: {}",
        if result.is_eligible { "yes" } else { "no" }
    );
    println!("  Recommended universities:");
    for university in &result.recommended_universities {
        println!("    - {university}");
    }
}
