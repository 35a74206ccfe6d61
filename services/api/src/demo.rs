use crate::infra::{
    demo_directory, CannedCompletion, InMemoryAnalysisRepository, InMemoryLawyerDirectory,
};
use clap::Args;
use legal_expert::config::AppConfig;
use legal_expert::error::AppError;
use legal_expert::telemetry;
use legal_expert::workflows::analysis::{
    AnalysisRepository, AssessmentClient, CaseAnalysisService, CaseAnalysisView, CaseSubmission,
    ModelAssessmentClient,
};
use legal_expert::workflows::directory::{DirectoryImporter, LawyerDirectory};
use legal_expert::workflows::model::MistralClient;
use legal_expert::workflows::{AreaOfLaw, UserId};
use std::path::PathBuf;
use std::sync::Arc;

const DEMO_REPLY: &str = "72,55,40";
const DEMO_PROBLEM: &str = "My landlord has kept my full security deposit for three months \
     after I moved out and will not say why.";

#[derive(Args, Debug)]
pub(crate) struct AnalyzeArgs {
    /// Area of law, e.g. Civil, Criminal, Family, Corporate, Intellectual Property, Tax
    #[arg(long)]
    pub(crate) area: String,
    /// Free-text description of the legal problem
    #[arg(long)]
    pub(crate) problem: String,
    /// Print the stored record as JSON instead of a summary
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Optional directory CSV export used instead of the built-in lawyers
    #[arg(long)]
    pub(crate) directory_csv: Option<PathBuf>,
    /// Area of law for the sample case (defaults to Civil)
    #[arg(long)]
    pub(crate) area: Option<String>,
}

pub(crate) async fn run_analyze(args: AnalyzeArgs) -> Result<(), AppError> {
    let AnalyzeArgs {
        area,
        problem,
        json,
    } = args;

    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let completions = Arc::new(MistralClient::from_config(&config.assessment)?);
    let directory = Arc::new(load_directory(config.directory.seed_csv.clone())?);
    let service = CaseAnalysisService::new(
        Arc::new(ModelAssessmentClient::from_config(
            completions,
            &config.assessment,
        )),
        directory,
        Arc::new(InMemoryAnalysisRepository::default()),
    )
    .with_timeout(config.assessment.timeout);

    let submission = CaseSubmission {
        problem_description: Some(problem),
        area_of_law: Some(area),
    };
    let view = submit(&service, submission).await?;

    if json {
        print_json(&view);
    } else {
        render_analysis(&view);
    }
    Ok(())
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        directory_csv,
        area,
    } = args;

    let imported = directory_csv.is_some();
    let directory = Arc::new(load_directory(directory_csv)?);
    let area = area.unwrap_or_else(|| AreaOfLaw::Civil.label().to_string());

    println!("LegalExpert case analysis demo");
    if imported {
        println!("Directory source: CSV import ({} lawyers)", directory.len());
    } else {
        println!("Directory source: built-in sample ({} lawyers)", directory.len());
    }
    println!("Model reply (canned): {DEMO_REPLY}");

    let service = CaseAnalysisService::new(
        Arc::new(ModelAssessmentClient::new(Arc::new(CannedCompletion::new(
            DEMO_REPLY,
        )))),
        directory,
        Arc::new(InMemoryAnalysisRepository::default()),
    );

    let submission = CaseSubmission {
        problem_description: Some(DEMO_PROBLEM.to_string()),
        area_of_law: Some(area),
    };
    let view = match submit(&service, submission).await {
        Ok(view) => view,
        Err(err) => {
            println!("  Submission rejected: {}", err);
            return Ok(());
        }
    };

    render_analysis(&view);

    println!("\nStored record payload");
    print_json(&view);
    Ok(())
}

async fn submit<A, L, R>(
    service: &CaseAnalysisService<A, L, R>,
    submission: CaseSubmission,
) -> Result<CaseAnalysisView, AppError>
where
    A: AssessmentClient + 'static,
    L: LawyerDirectory + 'static,
    R: AnalysisRepository + 'static,
{
    let user = UserId("cli".to_string());
    Ok(service.submit(&user, submission).await?)
}

fn load_directory(path: Option<PathBuf>) -> Result<InMemoryLawyerDirectory, AppError> {
    let profiles = match path {
        Some(path) => DirectoryImporter::from_path(path)?,
        None => demo_directory(),
    };
    InMemoryLawyerDirectory::seeded(profiles).map_err(|err| {
        AppError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("directory seed rejected: {err}"),
        ))
    })
}

fn render_analysis(view: &CaseAnalysisView) {
    let scores = &view.analysis;
    println!("\nCase {} ({})", view.id.0, view.area_of_law.label());
    println!("Problem: {}", view.problem_description);
    println!(
        "- Risk {}% | Resolution probability {}% | Complexity {}%",
        scores.risk_level, scores.resolution_probability, scores.complexity
    );
    println!("- Estimated duration: {}", scores.time_estimate.label());

    if view.suggested_lawyers.is_empty() {
        println!("\nSuggested lawyers: none available for this area");
    } else {
        println!("\nSuggested lawyers");
        for lawyer in &view.suggested_lawyers {
            println!(
                "- {} ({:.1} stars, {} years) <{}>",
                lawyer.name, lawyer.rating, lawyer.experience, lawyer.email
            );
        }
    }

    println!("\nNext steps");
    for step in &view.steps {
        println!(
            "{}. {} ({})",
            step.step_number, step.description, step.estimated_time
        );
    }

    println!("\nRelevant articles");
    for article in &view.relevant_articles {
        println!(
            "- {} {}: relevance {}%",
            article.article_number, article.title, article.relevance
        );
    }
}

fn print_json(view: &CaseAnalysisView) {
    match serde_json::to_string_pretty(view) {
        Ok(json) => println!("{}", json),
        Err(err) => println!("Payload unavailable: {}", err),
    }
}
