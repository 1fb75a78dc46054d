use std::sync::Arc;

use quiz_core::model::{
    DailyBundle, DailyCacheKey, DailyMixConfig, DifficultyCounts, DifficultyRatio, Question,
    QuestionPools, UserId,
};
use quiz_core::{compute_mix, select_questions};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use storage::repository::{
    ActivityLogRepository, DailyCacheRepository, ProfileRepository, QuestionRepository, Storage,
};
use tracing::{debug, warn};

use super::activity::selection_record;
use crate::Clock;
use crate::error::DailyQuestionsError;

/// Builds and caches each learner's daily set of questions.
#[derive(Clone)]
pub struct DailyQuestionService {
    clock: Clock,
    config: DailyMixConfig,
    profiles: Arc<dyn ProfileRepository>,
    questions: Arc<dyn QuestionRepository>,
    cache: Arc<dyn DailyCacheRepository>,
    activity: Arc<dyn ActivityLogRepository>,
}

impl DailyQuestionService {
    #[must_use]
    pub fn new(
        clock: Clock,
        profiles: Arc<dyn ProfileRepository>,
        questions: Arc<dyn QuestionRepository>,
        cache: Arc<dyn DailyCacheRepository>,
        activity: Arc<dyn ActivityLogRepository>,
    ) -> Self {
        Self {
            clock,
            config: DailyMixConfig::default(),
            profiles,
            questions,
            cache,
            activity,
        }
    }

    #[must_use]
    pub fn from_storage(clock: Clock, storage: &Storage) -> Self {
        Self::new(
            clock,
            Arc::clone(&storage.profiles),
            Arc::clone(&storage.questions),
            Arc::clone(&storage.daily_cache),
            Arc::clone(&storage.activity),
        )
    }

    #[must_use]
    pub fn with_config(mut self, config: DailyMixConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn config(&self) -> &DailyMixConfig {
        &self.config
    }

    /// Today's bundle for `user_id`, drawn with a freshly seeded generator.
    ///
    /// # Errors
    ///
    /// Returns `DailyQuestionsError::Storage` if a question pool cannot be
    /// fetched and `DailyQuestionsError::Mix` if the configured session size
    /// cannot hold the easy floor.
    pub async fn daily_bundle(&self, user_id: UserId) -> Result<DailyBundle, DailyQuestionsError> {
        let mut rng = StdRng::from_rng(&mut rand::rng());
        self.daily_bundle_with_rng(user_id, &mut rng).await
    }

    /// Today's bundle for `user_id`, drawing from `rng` on a cache miss.
    ///
    /// A cached bundle for the same learner and UTC date is returned as is.
    /// Otherwise the learner's ratio (or the configured default) is turned
    /// into per-band counts, pools are fetched for every band with a positive
    /// count, and the sampled bundle is cached and logged as an activity.
    ///
    /// # Errors
    ///
    /// Returns `DailyQuestionsError::Storage` if a question pool cannot be
    /// fetched and `DailyQuestionsError::Mix` if the configured session size
    /// cannot hold the easy floor.
    pub async fn daily_bundle_with_rng<R>(
        &self,
        user_id: UserId,
        rng: &mut R,
    ) -> Result<DailyBundle, DailyQuestionsError>
    where
        R: Rng + Send + ?Sized,
    {
        let date = self.clock.today();
        let key = DailyCacheKey::new(user_id, date);

        match self.cache.get_bundle(&key).await {
            Ok(Some(bundle)) => {
                debug!(cache_key = %key, "daily bundle served from cache");
                return Ok(bundle);
            }
            Ok(None) => {}
            Err(err) => warn!(cache_key = %key, error = %err, "daily cache read failed, rebuilding"),
        }

        let ratio = self.ratio_for(user_id).await;
        let counts = compute_mix(self.config.session_size(), &ratio)?;
        debug!(
            %user_id,
            easy = counts.easy,
            moderate = counts.moderate,
            difficult = counts.difficult,
            "computed daily mix"
        );

        let pools = self.fetch_pools(&counts).await?;
        if pools.is_empty() {
            warn!(%user_id, "no questions available for the requested bands");
        } else {
            debug!(%user_id, candidates = pools.total_len(), "fetched question pools");
        }

        let selection = select_questions(&counts, &pools, rng);
        if selection.is_underfilled() {
            warn!(
                %user_id,
                requested = selection.requested(),
                selected = selection.len(),
                shortfall = selection.shortfall(),
                filled_from_fallback = selection.filled_from_fallback(),
                "not enough questions to fill the daily bundle"
            );
        } else if selection.filled_from_fallback() > 0 {
            debug!(
                %user_id,
                filled_from_fallback = selection.filled_from_fallback(),
                "short bands topped up from other pools"
            );
        }

        let limit = usize::try_from(self.config.session_size()).unwrap_or(usize::MAX);
        let mut questions = selection.into_items();
        questions.truncate(limit);
        let bundle = DailyBundle {
            date,
            counts,
            questions,
        };

        if let Err(err) = self.cache.put_bundle(&key, &bundle).await {
            warn!(cache_key = %key, error = %err, "failed to cache daily bundle");
        }

        let record = selection_record(user_id, &bundle, self.clock.now());
        if let Err(err) = self.activity.append_activity(&record).await {
            warn!(%user_id, error = %err, "failed to record daily selection");
        }

        Ok(bundle)
    }

    async fn ratio_for(&self, user_id: UserId) -> DifficultyRatio {
        match self.profiles.difficulty_ratio(user_id).await {
            Ok(Some(ratio)) => ratio,
            Ok(None) => self.config.default_ratio(),
            Err(err) => {
                warn!(%user_id, error = %err, "failed to load difficulty ratio, using default");
                self.config.default_ratio()
            }
        }
    }

    async fn fetch_pools(
        &self,
        counts: &DifficultyCounts,
    ) -> Result<QuestionPools<Question>, DailyQuestionsError> {
        let mut pools = QuestionPools::new();
        for band in counts.requested_bands() {
            let pool = self
                .questions
                .questions_by_difficulty(band, self.config.pool_limit())
                .await?;
            pools.insert(band, pool);
        }
        Ok(pools)
    }
}
