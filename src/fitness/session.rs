//! One user's fitness planning session.

use super::options::{AnalysisRequest, VideoSearchRequest};
use super::plan::{DietaryPlan, FitnessPlan, QaPair, VideoAnalysis};
use super::profile::{FastingPreferences, UserProfile};
use super::prompt::PromptBuilder;
use crate::agent::AgentRegistry;
use crate::config::{FitnessSettings, Prompts};
use crate::conversation::{ConversationController, Message, SurfaceId};
use crate::error::{AgentDeckError, Result};
use crate::extract::{
    extract_videos, generic_fallback, has_video_links, search_url, video_id_from_url,
    ExtractRequest, RegexVideoExtractor, ResourceExtractor, VideoResource,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, instrument, warn};

pub const SMART_AGENT: &str = "Smart Fitness Assistant";
pub const VIDEO_AGENT: &str = "YouTube Fitness Analyst";

/// Result of a plan generation.
#[derive(Debug, Clone, Default)]
pub struct PlanReport {
    /// Set when video recommendations fell back to generic search links.
    pub video_warning: Option<String>,
}

/// Result of a video search.
#[derive(Debug, Clone, PartialEq)]
pub enum VideoSearchOutcome {
    Videos(Vec<VideoResource>),
    /// The agent answered without any usable link.
    RawReply(String),
    /// The agent failed; a search-results link is offered instead.
    SearchLink { error: String, link: VideoResource },
}

/// State of the five fitness surfaces for one user.
pub struct FitnessSession {
    controller: ConversationController,
    prompts: PromptBuilder,
    extractor: Box<dyn ResourceExtractor>,
    settings: FitnessSettings,
    dietary_plan: Option<DietaryPlan>,
    fitness_plan: Option<FitnessPlan>,
    qa_pairs: Vec<QaPair>,
    analyses: Vec<VideoAnalysis>,
}

impl FitnessSession {
    /// Bind the surfaces to the registry's fitness agents.
    pub fn new(
        registry: Arc<AgentRegistry>,
        session_id: &str,
        prompts: Prompts,
        settings: &FitnessSettings,
    ) -> Result<Self> {
        let mut controller = ConversationController::new(registry, session_id);
        for surface in [
            SurfaceId::PlanGenerator,
            SurfaceId::ExpertChat,
            SurfaceId::Research,
            SurfaceId::VideoResources,
        ] {
            controller.open(surface, SMART_AGENT)?;
        }
        controller.open(SurfaceId::VideoAnalysis, VIDEO_AGENT)?;

        Ok(Self {
            controller,
            prompts: PromptBuilder::new(prompts),
            extractor: Box::new(RegexVideoExtractor::new()),
            settings: settings.clone(),
            dietary_plan: None,
            fitness_plan: None,
            qa_pairs: Vec::new(),
            analyses: Vec::new(),
        })
    }

    /// Replace the video extractor.
    pub fn with_extractor(mut self, extractor: Box<dyn ResourceExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn controller(&self) -> &ConversationController {
        &self.controller
    }

    pub fn dietary_plan(&self) -> Option<&DietaryPlan> {
        self.dietary_plan.as_ref()
    }

    pub fn fitness_plan(&self) -> Option<&FitnessPlan> {
        self.fitness_plan.as_ref()
    }

    pub fn plans_generated(&self) -> bool {
        self.dietary_plan.is_some() && self.fitness_plan.is_some()
    }

    pub fn qa_pairs(&self) -> &[QaPair] {
        &self.qa_pairs
    }

    pub fn analyses(&self) -> &[VideoAnalysis] {
        &self.analyses
    }

    /// Generate the dietary and fitness plans.
    ///
    /// A dietary or fitness failure aborts and keeps the previous plans; a
    /// video failure only downgrades the recommendations.
    #[instrument(skip_all, fields(goal = %profile.fitness_goal))]
    pub async fn generate_plan(
        &mut self,
        profile: &UserProfile,
        fasting: &FastingPreferences,
    ) -> Result<PlanReport> {
        profile.validate()?;
        fasting.validate()?;

        let meal_plan = self
            .controller
            .ask(SurfaceId::PlanGenerator, &self.prompts.dietary_plan(profile, fasting))
            .await?;
        let routine = self
            .controller
            .ask(SurfaceId::PlanGenerator, &self.prompts.fitness_plan(profile, fasting))
            .await?;

        let goal = profile.fitness_goal.label();
        let mut report = PlanReport::default();
        let videos = match self.plan_video_reply(profile).await {
            Ok(reply) => {
                let request = ExtractRequest::new(goal)
                    .with_counts(self.settings.plan_min_videos, self.settings.plan_max_videos);
                extract_videos(self.extractor.as_ref(), &reply, &request)
            }
            Err(e) => {
                warn!("Video recommendations failed: {}", e);
                report.video_warning = Some(format!(
                    "Could not fetch specific videos ({}). Using general recommendations instead.",
                    e
                ));
                generic_fallback(goal)
            }
        };

        self.dietary_plan = Some(DietaryPlan::new(meal_plan, fasting));
        self.fitness_plan = Some(FitnessPlan::new(
            profile.fitness_goal,
            profile.activity_level,
            routine,
            videos,
        ));
        self.qa_pairs.clear();

        info!("Plans generated");
        Ok(report)
    }

    async fn plan_video_reply(&self, profile: &UserProfile) -> Result<String> {
        let reply = self
            .controller
            .ask(SurfaceId::PlanGenerator, &self.prompts.plan_videos(profile))
            .await?;
        if reply.contains("youtube.com") {
            return Ok(reply);
        }

        info!("No YouTube links in first video reply, retrying with backup query");
        self.controller
            .ask(SurfaceId::PlanGenerator, &self.prompts.plan_videos_backup(profile))
            .await
    }

    /// Answer a question about the generated plans.
    pub async fn ask_plan(&mut self, question: &str) -> Result<&QaPair> {
        let question = question.trim();
        if question.is_empty() {
            return Err(AgentDeckError::EmptyInput("question".to_string()));
        }
        let (Some(dietary), Some(fitness)) = (&self.dietary_plan, &self.fitness_plan) else {
            return Err(AgentDeckError::PlansNotGenerated);
        };

        let prompt = self.prompts.plan_question(dietary, fitness, question);
        let answer = self.controller.ask(SurfaceId::PlanGenerator, &prompt).await?;

        self.qa_pairs.push(QaPair {
            question: question.to_string(),
            answer,
        });
        Ok(&self.qa_pairs[self.qa_pairs.len() - 1])
    }

    /// Expert chat turn.
    pub async fn chat(&mut self, text: &str) -> Result<Message> {
        self.controller.submit(SurfaceId::ExpertChat, text).await
    }

    /// Evidence-based research on `topic`.
    pub async fn research(&mut self, topic: &str) -> Result<Message> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(AgentDeckError::EmptyInput("research topic".to_string()));
        }
        let prompt = self.prompts.research(topic);
        self.controller
            .submit_with_prompt(SurfaceId::Research, topic, &prompt)
            .await
    }

    /// Find instructional videos.
    pub async fn find_videos(&self, request: &VideoSearchRequest) -> Result<VideoSearchOutcome> {
        if request.topic.trim().is_empty() {
            return Err(AgentDeckError::EmptyInput("video topic".to_string()));
        }

        let content = match self.video_search_reply(request).await {
            Ok(content) => content,
            Err(e) => {
                warn!("Video search failed: {}", e);
                let term = request.search_term();
                return Ok(VideoSearchOutcome::SearchLink {
                    error: e.to_string(),
                    link: VideoResource::new(
                        format!("{} - YouTube Search", term),
                        search_url(&term),
                        "Could not retrieve specific videos. Use this link to view search results on YouTube.",
                    ),
                });
            }
        };

        let extract = ExtractRequest::new(&request.topic)
            .with_counts(0, self.settings.search_max_videos)
            .with_window(200, 300);
        let videos = extract_videos(self.extractor.as_ref(), &content, &extract);

        if videos.is_empty() {
            Ok(VideoSearchOutcome::RawReply(content))
        } else {
            Ok(VideoSearchOutcome::Videos(videos))
        }
    }

    async fn video_search_reply(&self, request: &VideoSearchRequest) -> Result<String> {
        let content = self
            .controller
            .ask(SurfaceId::VideoResources, &self.prompts.video_search(request))
            .await?;
        if has_video_links(&content) {
            return Ok(content);
        }

        info!("No video links in search reply, retrying with a simpler query");
        self.controller
            .ask(SurfaceId::VideoResources, &self.prompts.video_search_retry(request))
            .await
    }

    /// Analyse a video with the YouTube analyst and keep the result.
    pub async fn analyze_video(&mut self, request: &AnalysisRequest) -> Result<&VideoAnalysis> {
        let url = request.url.trim();
        if !(url.contains("youtube.com") || url.contains("youtu.be")) {
            return Err(AgentDeckError::InvalidInput(
                "Please enter a valid YouTube URL".to_string(),
            ));
        }

        let prompt = self.prompts.video_analysis(request);
        let content = self.controller.ask(SurfaceId::VideoAnalysis, &prompt).await?;

        self.analyses.push(VideoAnalysis {
            url: url.to_string(),
            video_id: video_id_from_url(url),
            options: request.effective_options(),
            question: request.question.clone(),
            content,
            created_at: Utc::now(),
        });
        Ok(&self.analyses[self.analyses.len() - 1])
    }

    /// Remove the analysis at `index` (0-based).
    pub fn remove_analysis(&mut self, index: usize) -> Result<VideoAnalysis> {
        if index >= self.analyses.len() {
            return Err(AgentDeckError::InvalidInput(format!(
                "No analysis {} (have {})",
                index + 1,
                self.analyses.len()
            )));
        }
        Ok(self.analyses.remove(index))
    }
}
