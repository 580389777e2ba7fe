//! Interactive health and fitness planner.

use crate::agent::AgentRegistry;
use crate::cli::preflight::{self, Operation};
use crate::cli::{Output, ProfileArgs};
use crate::config::{Prompts, Settings};
use crate::error::AgentDeckError;
use crate::fitness::{
    AnalysisOption, AnalysisRequest, Difficulty, Equipment, FastingPreferences, FitnessSession,
    UserProfile, VideoDuration, VideoSearchRequest,
};
use crate::present::{
    analysis_summary_document, render_analysis, render_analysis_list, render_dietary_plan,
    render_fitness_plan, render_qa_history, render_search_outcome, SUMMARY_FILE_NAME,
    SUMMARY_MIME_TYPE,
};
use anyhow::Result;
use console::style;
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// A line typed at the planner prompt.
#[derive(Debug, PartialEq, Eq)]
enum FitnessInput<'a> {
    Quit,
    Help,
    Profile,
    Plan,
    Ask(&'a str),
    QaHistory,
    Research(&'a str),
    Videos(&'a str),
    Analyze(&'a str),
    Analyses,
    Show(&'a str),
    Remove(&'a str),
    Save(&'a str),
    Model(&'a str),
    Unknown(&'a str),
    Chat(&'a str),
}

fn parse_input(line: &str) -> Option<FitnessInput<'_>> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
        return Some(FitnessInput::Quit);
    }
    let Some(command) = line.strip_prefix('/') else {
        return Some(FitnessInput::Chat(line));
    };

    let (name, rest) = command.split_once(' ').unwrap_or((command, ""));
    let rest = rest.trim();
    Some(match name.to_ascii_lowercase().as_str() {
        "quit" | "exit" => FitnessInput::Quit,
        "help" => FitnessInput::Help,
        "profile" => FitnessInput::Profile,
        "plan" => FitnessInput::Plan,
        "ask" => FitnessInput::Ask(rest),
        "qa" => FitnessInput::QaHistory,
        "research" => FitnessInput::Research(rest),
        "videos" => FitnessInput::Videos(rest),
        "analyze" | "analyse" => FitnessInput::Analyze(rest),
        "analyses" => FitnessInput::Analyses,
        "show" => FitnessInput::Show(rest),
        "remove" => FitnessInput::Remove(rest),
        "save" => FitnessInput::Save(rest),
        "model" => FitnessInput::Model(rest),
        _ => FitnessInput::Unknown(name),
    })
}

/// Parse `topic [| difficulty [| duration [| equipment,...]]]`.
fn parse_video_request(args: &str) -> std::result::Result<VideoSearchRequest, String> {
    let mut parts = args.split('|').map(str::trim);
    let topic = parts.next().unwrap_or_default();
    if topic.is_empty() {
        return Err("Please enter a topic to search for videos".to_string());
    }

    let mut request = VideoSearchRequest::new(topic);
    if let Some(difficulty) = parts.next().filter(|s| !s.is_empty()) {
        request.difficulty = difficulty.parse::<Difficulty>()?;
    }
    if let Some(duration) = parts.next().filter(|s| !s.is_empty()) {
        request.duration = duration.parse::<VideoDuration>()?;
    }
    if let Some(equipment) = parts.next().filter(|s| !s.is_empty()) {
        request.equipment = equipment
            .split(',')
            .filter(|s| !s.trim().is_empty())
            .map(str::parse::<Equipment>)
            .collect::<std::result::Result<_, _>>()?;
    }
    Ok(request)
}

/// Parse `url [| option,... [| question]]`.
fn parse_analysis_request(args: &str) -> std::result::Result<AnalysisRequest, String> {
    let mut parts = args.splitn(3, '|').map(str::trim);
    let url = parts.next().unwrap_or_default();
    if url.is_empty() {
        return Err("Please enter a YouTube URL".to_string());
    }

    let mut request = AnalysisRequest::new(url);
    if let Some(options) = parts.next().filter(|s| !s.is_empty()) {
        let options = options
            .split(',')
            .filter(|s| !s.trim().is_empty())
            .map(str::parse::<AnalysisOption>)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        request = request.with_options(options);
    }
    if let Some(question) = parts.next() {
        request = request.with_question(question);
    }
    Ok(request)
}

/// Parse a 1-based analysis number into an index; empty means the latest.
fn parse_analysis_index(args: &str, len: usize) -> std::result::Result<usize, String> {
    if len == 0 {
        return Err("No analyses yet. Use /analyze URL first.".to_string());
    }
    if args.trim().is_empty() {
        return Ok(len - 1);
    }
    match args.trim().parse::<usize>() {
        Ok(n) if (1..=len).contains(&n) => Ok(n - 1),
        _ => Err(format!("Pick an analysis between 1 and {}", len)),
    }
}

fn print_help() {
    Output::kv("/plan", "generate dietary and fitness plans from your profile");
    Output::kv("/ask QUESTION", "ask about your plans");
    Output::kv("/qa", "show questions asked about your plans");
    Output::kv("/research TOPIC", "research a health or fitness topic");
    Output::kv("/videos TOPIC [| level | length | equipment,...]", "find instructional videos");
    Output::kv("/analyze URL [| option,... | question]", "analyse a YouTube video");
    Output::kv("/analyses, /show N, /remove N", "manage analyses");
    Output::kv("/save [N]", &format!("write an analysis to {}", SUMMARY_FILE_NAME));
    Output::kv("/model NAME", "switch model (starts a new session)");
    Output::kv("/profile", "show your profile");
    Output::kv("TEXT", "chat with the fitness expert");
    Output::kv("exit", "quit");
}

fn print_profile(profile: &UserProfile, fasting: &FastingPreferences) {
    Output::kv("Age", &profile.age.to_string());
    Output::kv("Weight", &format!("{} kg", profile.weight_kg));
    Output::kv("Height", &format!("{} cm", profile.height_cm));
    Output::kv("Sex", profile.sex.label());
    Output::kv("Activity level", profile.activity_level.label());
    Output::kv("Dietary preference", profile.dietary_preference.label());
    Output::kv("Fitness goal", profile.fitness_goal.label());
    Output::kv("Health considerations", &profile.health_conditions_text());
    Output::kv("Fasting", &fasting.schedule_text());
}

async fn build_session(settings: &Settings, model: &str, session_id: &str) -> Result<FitnessSession> {
    let registry = AgentRegistry::fitness(settings, model).await?;
    let prompts = Prompts::load(
        settings.prompts.custom_dir.as_deref(),
        Some(&settings.prompts.variables),
    )?;
    Ok(FitnessSession::new(
        Arc::new(registry),
        session_id,
        prompts,
        &settings.fitness,
    )?)
}

/// Run the interactive fitness planner.
pub async fn run_fitness(model: Option<String>, profile: &ProfileArgs, settings: Settings) -> Result<()> {
    let user = profile.profile();
    let fasting = profile.fasting();
    user.validate()?;
    fasting.validate()?;

    let models = match preflight::check(Operation::Fitness, &settings).await {
        Ok(models) => models,
        Err(e) => {
            Output::error(&format!("{}", e));
            Output::info("Run 'agentdeck doctor' for detailed diagnostics.");
            return Err(e.into());
        }
    };

    let mut model = model.unwrap_or_else(|| settings.model.default_model.clone());
    let session_id = uuid::Uuid::new_v4().to_string();
    info!("Fitness session {} on {} ({} models available)", session_id, model, models.len());

    let mut session = build_session(&settings, &model, &session_id).await?;

    println!("\n{}", style("AI Health & Fitness Planner").bold().cyan());
    println!(
        "{}\n",
        style(format!(
            "Model: {}. Type /plan to start, /help for commands, or 'exit' to quit.",
            model
        ))
        .dim()
    );

    let stdin = io::stdin();
    loop {
        Output::prompt("fitness");

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let Some(input) = parse_input(&line) else {
            continue;
        };

        match input {
            FitnessInput::Quit => {
                Output::info("Goodbye!");
                break;
            }
            FitnessInput::Help => print_help(),
            FitnessInput::Profile => {
                print_profile(&user, &fasting);
                let plans = if session.plans_generated() { "generated" } else { "not generated yet" };
                Output::kv("Plans", plans);
            }
            FitnessInput::Plan => {
                let spinner = Output::spinner("Creating your perfect health and fitness routine...");
                let result = session.generate_plan(&user, &fasting).await;
                spinner.finish_and_clear();
                match result {
                    Ok(report) => {
                        if let Some(plan) = session.dietary_plan() {
                            Output::markdown(&render_dietary_plan(plan));
                        }
                        if let Some(plan) = session.fitness_plan() {
                            Output::markdown(&render_fitness_plan(plan));
                        }
                        if let Some(warning) = report.video_warning {
                            Output::warning(&warning);
                        }
                    }
                    Err(e) => report_error(&e),
                }
            }
            FitnessInput::Ask(question) => {
                let spinner = Output::spinner("Finding the best answer for you...");
                let result = session.ask_plan(question).await;
                spinner.finish_and_clear();
                match result {
                    Ok(pair) => Output::markdown(&pair.answer),
                    Err(e) => report_error(&e),
                }
            }
            FitnessInput::QaHistory => {
                if session.qa_pairs().is_empty() {
                    Output::info("No questions asked yet.");
                } else {
                    Output::markdown(&render_qa_history(session.qa_pairs()));
                }
            }
            FitnessInput::Research(topic) => {
                let spinner = Output::spinner(&format!("Researching {}...", topic));
                let started = Instant::now();
                let result = session.research(topic).await;
                spinner.finish_and_clear();
                match result {
                    Ok(reply) => Output::reply("Research", &reply.content, started.elapsed()),
                    Err(e) => report_error(&e),
                }
            }
            FitnessInput::Videos(args) => match parse_video_request(args) {
                Ok(request) => {
                    let spinner = Output::spinner("Searching for relevant videos...");
                    let result = session.find_videos(&request).await;
                    spinner.finish_and_clear();
                    match result {
                        Ok(outcome) => Output::markdown(&render_search_outcome(&outcome)),
                        Err(e) => report_error(&e),
                    }
                }
                Err(msg) => Output::warning(&msg),
            },
            FitnessInput::Analyze(args) => match parse_analysis_request(args) {
                Ok(request) => {
                    let spinner = Output::spinner("Analyzing video content...");
                    let result = session.analyze_video(&request).await;
                    spinner.finish_and_clear();
                    match result {
                        Ok(analysis) => Output::markdown(&render_analysis(analysis)),
                        Err(e) => report_error(&e),
                    }
                }
                Err(msg) => Output::warning(&msg),
            },
            FitnessInput::Analyses => {
                if session.analyses().is_empty() {
                    Output::info("No analyses yet.");
                } else {
                    Output::markdown(&render_analysis_list(session.analyses()));
                }
            }
            FitnessInput::Show(args) => match parse_analysis_index(args, session.analyses().len()) {
                Ok(index) => Output::markdown(&render_analysis(&session.analyses()[index])),
                Err(msg) => Output::warning(&msg),
            },
            FitnessInput::Remove(args) => match parse_analysis_index(args, session.analyses().len()) {
                Ok(index) => {
                    match session.remove_analysis(index) {
                        Ok(removed) => Output::success(&format!("Removed analysis of {}", removed.url)),
                        Err(e) => report_error(&e),
                    }
                }
                Err(msg) => Output::warning(&msg),
            },
            FitnessInput::Save(args) => match parse_analysis_index(args, session.analyses().len()) {
                Ok(index) => {
                    let path = PathBuf::from(SUMMARY_FILE_NAME);
                    match std::fs::write(&path, analysis_summary_document(&session.analyses()[index])) {
                        Ok(()) => Output::success(&format!(
                            "Saved {} ({})",
                            path.display(),
                            SUMMARY_MIME_TYPE
                        )),
                        Err(e) => Output::error(&format!("Failed to write {}: {}", path.display(), e)),
                    }
                }
                Err(msg) => Output::warning(&msg),
            },
            FitnessInput::Model(name) => {
                if name.is_empty() {
                    Output::kv("Current", &model);
                    for recommended in &settings.model.recommended_models {
                        Output::list_item(recommended);
                    }
                    continue;
                }
                match build_session(&settings, name, &session_id).await {
                    Ok(new_session) => {
                        session = new_session;
                        model = name.to_string();
                        Output::success(&format!("Switched to {}. Plans and chats were reset.", model));
                    }
                    Err(e) => Output::error(&format!("Could not switch model: {}", e)),
                }
            }
            FitnessInput::Unknown(name) => {
                Output::warning(&format!("Unknown command /{}. Type /help.", name));
            }
            FitnessInput::Chat(text) => {
                let spinner = Output::spinner("Thinking...");
                let started = Instant::now();
                let result = session.chat(text).await;
                spinner.finish_and_clear();
                match result {
                    Ok(reply) => Output::reply("Fitness Expert", &reply.content, started.elapsed()),
                    Err(e) => report_error(&e),
                }
            }
        }
    }

    Ok(())
}

fn report_error(err: &AgentDeckError) {
    match err {
        AgentDeckError::PlansNotGenerated => {
            Output::warning("Please generate a plan first with /plan.");
        }
        AgentDeckError::EmptyInput(_) | AgentDeckError::InvalidInput(_) => {
            Output::warning(&format!("{}", err));
        }
        AgentDeckError::ModelUnavailable(_) => {
            Output::error(&format!("{}", err));
            Output::info("Check that Ollama is running and the model is pulled.");
        }
        _ => Output::error(&format!("An error occurred: {}", err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_input() {
        assert_eq!(parse_input("/plan"), Some(FitnessInput::Plan));
        assert_eq!(
            parse_input("/ask How many rest days?"),
            Some(FitnessInput::Ask("How many rest days?"))
        );
        assert_eq!(parse_input("/analyse x"), Some(FitnessInput::Analyze("x")));
        assert_eq!(
            parse_input("is creatine safe?"),
            Some(FitnessInput::Chat("is creatine safe?"))
        );
        assert_eq!(parse_input("/nope"), Some(FitnessInput::Unknown("nope")));
        assert_eq!(parse_input(""), None);
    }

    #[test]
    fn test_video_request_defaults() {
        let request = parse_video_request("squats").unwrap();
        assert_eq!(request, VideoSearchRequest::new("squats"));
    }

    #[test]
    fn test_video_request_full() {
        let request = parse_video_request("kettlebell swings | advanced | short | kettlebells, gym").unwrap();
        assert_eq!(request.topic, "kettlebell swings");
        assert_eq!(request.difficulty, Difficulty::Advanced);
        assert_eq!(request.duration, VideoDuration::Short);
        assert_eq!(request.equipment, vec![Equipment::Kettlebells, Equipment::FullGym]);
    }

    #[test]
    fn test_video_request_errors() {
        assert!(parse_video_request("  ").is_err());
        assert!(parse_video_request("squats | expert").is_err());
    }

    #[test]
    fn test_analysis_request() {
        let request = parse_analysis_request(
            "https://youtu.be/IODxDxX7oi4 | technique, progression | Is my knee angle right?",
        )
        .unwrap();
        assert_eq!(request.url, "https://youtu.be/IODxDxX7oi4");
        assert_eq!(
            request.options,
            vec![AnalysisOption::Technique, AnalysisOption::Progression]
        );
        assert_eq!(request.question.as_deref(), Some("Is my knee angle right?"));

        let bare = parse_analysis_request("https://youtu.be/IODxDxX7oi4").unwrap();
        assert_eq!(bare.effective_options(), vec![AnalysisOption::Summary]);
        assert!(bare.question.is_none());
    }

    #[test]
    fn test_analysis_index() {
        assert!(parse_analysis_index("", 0).is_err());
        assert_eq!(parse_analysis_index("", 3), Ok(2));
        assert_eq!(parse_analysis_index("1", 3), Ok(0));
        assert!(parse_analysis_index("4", 3).is_err());
        assert!(parse_analysis_index("zero", 3).is_err());
    }
}
