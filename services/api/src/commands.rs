use crate::infra::{build_catalog, register_document, InMemoryResultRepository};
use careercraft::assessment::{
    Answer, AssessmentDocument, AssessmentResult, AssessmentSession, QuestionType, ScoreBand,
    SessionError, SessionOptions,
};
use careercraft::config::AppConfig;
use careercraft::error::AppError;
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug, Default)]
pub(crate) struct TemplateArgs {
    /// Write the template to a file instead of stdout
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct TakeArgs {
    /// Assessment slug or name, e.g. `career-aptitude`
    pub(crate) slug: String,
    /// Authored assessment document to register before starting
    #[arg(long)]
    pub(crate) document: Option<PathBuf>,
    /// JSON array of answers in the order the questions are shown,
    /// e.g. '["very_comfortable", ["lab", "outdoor"], "free text"]'
    #[arg(long, value_parser = parse_answers)]
    pub(crate) answers: AnswerList,
    /// Print the full result as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct AnswerList(pub(crate) Vec<Answer>);

pub(crate) fn parse_answers(raw: &str) -> Result<AnswerList, String> {
    serde_json::from_str(raw)
        .map(AnswerList)
        .map_err(|err| format!("answers must be a JSON array ({err})"))
}

pub(crate) fn run_template(args: TemplateArgs) -> Result<(), AppError> {
    let rendered = AssessmentDocument::template()
        .to_json_pretty()
        .map_err(|err| AppError::Input(err.to_string()))?;

    match args.output {
        Some(path) => {
            std::fs::write(&path, rendered)?;
            println!("Template written to {}", path.display());
        }
        None => println!("{rendered}"),
    }
    Ok(())
}

pub(crate) fn run_take(args: TakeArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let mut catalog = build_catalog(&config.assessment)?;
    if let Some(path) = args.document.as_deref() {
        register_document(&mut catalog, path)?;
    }

    let graph = catalog
        .resolve(&args.slug)
        .map_err(|err| AppError::Input(err.to_string()))?;
    let options = SessionOptions::from(&config.assessment);
    let mut session = AssessmentSession::new(graph, &options);
    let repository = InMemoryResultRepository::default();

    let result = take(&mut session, args.answers.0, &repository)?;

    if args.json {
        let rendered =
            serde_json::to_string_pretty(&result).map_err(|err| AppError::Input(err.to_string()))?;
        println!("{rendered}");
    } else {
        render_result(&result);
    }
    Ok(())
}

/// Feeds `answers` through the session in traversal order and submits at the last question.
pub(crate) fn take(
    session: &mut AssessmentSession,
    answers: Vec<Answer>,
    repository: &InMemoryResultRepository,
) -> Result<AssessmentResult, AppError> {
    let input_error = |err: SessionError| AppError::Input(err.to_string());
    session.start().map_err(input_error)?;

    let total = answers.len();
    for (position, answer) in answers.into_iter().enumerate() {
        if let Some(question) = session.current_question() {
            let label = match question.question_type() {
                QuestionType::TextInput => "text",
                QuestionType::SingleChoice | QuestionType::MultiChoice => "choice",
            };
            println!("[{label}] {}", question.prompt);
        }
        session.answer(answer).map_err(input_error)?;

        if session.is_terminal() {
            if position + 1 < total {
                return Err(AppError::Input(format!(
                    "{} answer(s) left over after the last question",
                    total - position - 1
                )));
            }
            break;
        }
        session.next().map_err(input_error)?;
    }

    if !session.is_terminal() || session.current_answer().is_none() {
        let question = session
            .current_id()
            .map(|id| id.to_string())
            .unwrap_or_default();
        return Err(AppError::Input(format!(
            "ran out of answers at question {question}"
        )));
    }

    session
        .submit(repository)
        .cloned()
        .map_err(input_error)
}

fn render_result(result: &AssessmentResult) {
    println!("\n{} complete", result.assessment_type);
    println!(
        "- Score: {}% ({}) | {} of {} points",
        result.normalized_score,
        ScoreBand::from_score(result.normalized_score).label(),
        result.score.raw,
        result.score.max
    );
    println!("Recommendations:");
    for recommendation in &result.recommendations {
        println!("  - {recommendation}");
    }
}
