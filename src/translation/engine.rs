//! Detect → decide → translate orchestration.

use futures_util::StreamExt;

use super::client::CompletionBackend;
use super::error::{Stage, TranslateError};
use super::generation::RequestGeneration;
use super::language::Lang;
use super::request::CompletionRequest;
use super::rule::{TranslationPlan, plan_translation};
use crate::cache::{CacheManager, InflightCache};
use crate::config::UserPreferences;

/// A finished translation together with the direction that was used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    pub text: String,
    pub plan: TranslationPlan,
}

/// Result of [`Engine::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Translated(Translation),
    /// A newer run started before this one finished; its result was dropped.
    Superseded,
}

/// Runs detection and translation against one set of preferences.
///
/// Identical model calls are de-duplicated in memory and, when a store is
/// attached, cached on disk.
pub struct Engine<B> {
    backend: B,
    prefs: UserPreferences,
    memo: InflightCache,
    store: Option<CacheManager>,
    generations: RequestGeneration,
}

impl<B: CompletionBackend> Engine<B> {
    pub fn new(backend: B, prefs: UserPreferences) -> Self {
        Self {
            backend,
            prefs,
            memo: InflightCache::new(),
            store: None,
            generations: RequestGeneration::new(),
        }
    }

    /// Attaches a persistent cache.
    #[must_use]
    pub fn with_store(mut self, store: CacheManager) -> Self {
        self.store = Some(store);
        self
    }

    pub const fn preferences(&self) -> &UserPreferences {
        &self.prefs
    }

    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// Detects the language of `text` with the small model.
    ///
    /// Any failure, including an empty reply, is returned as
    /// [`TranslateError::Detection`].
    pub async fn detect(&self, text: &str) -> Result<String, TranslateError> {
        ensure_input(text)?;
        let request = CompletionRequest::detect(text, &self.prefs);
        self.complete_cached(&request)
            .await
            .map_err(|e| TranslateError::Detection(Box::new(e)))
    }

    /// Resolves source and target languages.
    ///
    /// An explicit `source` skips detection. When detection fails no plan is
    /// produced, so nothing gets translated.
    pub async fn plan(
        &self,
        text: &str,
        source: &Lang,
        target: &Lang,
    ) -> Result<TranslationPlan, TranslateError> {
        let detected = match source {
            Lang::Named(source) => source.clone(),
            Lang::Auto => self.detect(text).await?,
        };

        let plan = plan_translation(&detected, target, &self.prefs);
        tracing::debug!(
            source = %plan.source,
            target = %plan.target,
            reason = %plan.reason,
            "planned translation"
        );
        Ok(plan)
    }

    /// Translates `text` according to `plan` with the large model.
    pub async fn translate(
        &self,
        text: &str,
        plan: &TranslationPlan,
    ) -> Result<String, TranslateError> {
        ensure_input(text)?;
        let request = CompletionRequest::translate(text, &plan.source, &plan.target, &self.prefs);
        self.complete_cached(&request).await
    }

    /// Streaming variant of [`translate`](Self::translate).
    ///
    /// `on_chunk` receives text as it arrives; a cached result arrives as a
    /// single chunk. Nothing is emitted for a whitespace-only reply. A stream
    /// that fails midway has already emitted its earlier chunks, and its
    /// text is neither memoized nor persisted. Returns the full translation.
    pub async fn translate_streaming<F>(
        &self,
        text: &str,
        plan: &TranslationPlan,
        mut on_chunk: F,
    ) -> Result<String, TranslateError>
    where
        F: FnMut(&str),
    {
        ensure_input(text)?;
        let request = CompletionRequest::translate(text, &plan.source, &plan.target, &self.prefs);
        let key = request.cache_key();

        if let Some(hit) = self.memo.get(&key).or_else(|| self.stored(&request)) {
            on_chunk(&hit);
            self.memo.insert(&key, hit.clone());
            return Ok(hit);
        }

        let mut stream = self
            .backend
            .complete_stream(&request.model, &request.prompt)
            .await?;
        let mut full = String::new();
        let mut started = false;

        // Leading whitespace is held back so an empty reply emits nothing.
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            full.push_str(&chunk);
            if started {
                on_chunk(&chunk);
            } else if !full.trim().is_empty() {
                started = true;
                on_chunk(&full);
            }
        }

        if full.trim().is_empty() {
            return Err(TranslateError::EmptyResponse(Stage::Translation));
        }

        self.memo.insert(&key, full.clone());
        self.persist(&request, &full);
        Ok(full)
    }

    /// Detects, plans and translates in one go.
    ///
    /// Returns [`Outcome::Superseded`] instead of a result (or an error) when
    /// another run started on this engine in the meantime.
    pub async fn run(
        &self,
        text: &str,
        source: &Lang,
        target: &Lang,
    ) -> Result<Outcome, TranslateError> {
        let generation = self.generations.begin();

        let result: Result<Option<Translation>, TranslateError> = async {
            let plan = self.plan(text, source, target).await?;
            if !self.generations.is_current(generation) {
                return Ok(None);
            }
            let text = self.translate(text, &plan).await?;
            Ok::<_, TranslateError>(Some(Translation { text, plan }))
        }
        .await;

        if !self.generations.is_current(generation) {
            tracing::debug!(?generation, "dropping superseded result");
            return Ok(Outcome::Superseded);
        }

        match result {
            Ok(Some(translation)) => Ok(Outcome::Translated(translation)),
            Ok(None) => Ok(Outcome::Superseded),
            Err(e) => Err(e),
        }
    }

    async fn complete_cached(&self, request: &CompletionRequest) -> Result<String, TranslateError> {
        let key = request.cache_key();

        self.memo
            .get_or_try_init(&key, || async {
                if let Some(hit) = self.stored(request) {
                    return Ok(hit);
                }

                let reply = self
                    .backend
                    .complete(&request.model, &request.prompt)
                    .await?
                    .unwrap_or_default();

                let reply = match request.stage {
                    Stage::Detection => reply.trim().to_string(),
                    Stage::Translation => reply,
                };
                if reply.trim().is_empty() {
                    return Err(TranslateError::EmptyResponse(request.stage));
                }

                self.persist(request, &reply);
                Ok::<_, TranslateError>(reply)
            })
            .await
    }

    fn stored(&self, request: &CompletionRequest) -> Option<String> {
        let store = self.store.as_ref()?;
        match store.get(request) {
            Ok(hit) => {
                if hit.is_some() {
                    tracing::debug!(stage = %request.stage, "cache hit");
                }
                hit
            }
            Err(e) => {
                tracing::warn!(error = %e, "cache lookup failed");
                None
            }
        }
    }

    fn persist(&self, request: &CompletionRequest, reply: &str) {
        if let Some(store) = &self.store
            && let Err(e) = store.put(request, reply)
        {
            tracing::warn!(error = %e, "failed to write cache entry");
        }
    }
}

fn ensure_input(text: &str) -> Result<(), TranslateError> {
    if text.trim().is_empty() {
        Err(TranslateError::EmptyInput)
    } else {
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::translation::fixtures::preferences;
    use crate::translation::TextStream;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;
    use tempfile::TempDir;

    type ReplyFn = dyn Fn(&str, &str) -> Result<Option<String>, TranslateError> + Send + Sync;

    /// Records every call; replies are produced by a closure over (model, prompt).
    struct FakeBackend {
        calls: Mutex<Vec<(String, String)>>,
        reply: Box<ReplyFn>,
    }

    impl FakeBackend {
        fn new<F>(reply: F) -> Self
        where
            F: Fn(&str, &str) -> Result<Option<String>, TranslateError> + Send + Sync + 'static,
        {
            Self {
                calls: Mutex::new(Vec::new()),
                reply: Box::new(reply),
            }
        }

        /// Detection answers `detected`; translation answers "translated".
        fn detecting(detected: &'static str) -> Self {
            Self::new(move |model, _| {
                Ok(Some(if model == "small" {
                    detected.to_string()
                } else {
                    "translated".to_string()
                }))
            })
        }

        fn calls(&self) -> Vec<(String, String)> {
            self.calls.lock().unwrap().clone()
        }

        fn calls_to(&self, model: &str) -> Vec<String> {
            self.calls()
                .into_iter()
                .filter(|(m, _)| m == model)
                .map(|(_, prompt)| prompt)
                .collect()
        }
    }

    #[async_trait]
    impl CompletionBackend for FakeBackend {
        async fn complete(
            &self,
            model: &str,
            prompt: &str,
        ) -> Result<Option<String>, TranslateError> {
            self.calls
                .lock()
                .unwrap()
                .push((model.to_string(), prompt.to_string()));
            if prompt.contains("slow") {
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
            (self.reply)(model, prompt)
        }

        /// Streams the reply split at `|`.
        async fn complete_stream(
            &self,
            model: &str,
            prompt: &str,
        ) -> Result<TextStream, TranslateError> {
            let reply = self.complete(model, prompt).await?.unwrap_or_default();
            let chunks: Vec<Result<String, TranslateError>> =
                reply.split('|').map(|c| Ok(c.to_string())).collect();
            Ok(Box::pin(futures_util::stream::iter(chunks)))
        }
    }

    fn engine(backend: FakeBackend) -> Engine<FakeBackend> {
        Engine::new(backend, preferences())
    }

    fn translated(outcome: Outcome) -> Translation {
        match outcome {
            Outcome::Translated(translation) => translation,
            Outcome::Superseded => panic!("expected a translation"),
        }
    }

    #[tokio::test]
    async fn test_primary_language_translates_to_target() {
        let engine = engine(FakeBackend::detecting("Chinese"));

        let result = translated(engine.run("你好", &Lang::Auto, &Lang::Auto).await.unwrap());

        assert_eq!(result.plan.source, "Chinese");
        assert_eq!(result.plan.target, "English");
        assert_eq!(result.text, "translated");

        let prompts = engine.backend().calls_to("large");
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].starts_with("Translate the following Chinese text to English."));
    }

    #[tokio::test]
    async fn test_foreign_language_translates_to_primary() {
        let engine = engine(FakeBackend::detecting("French"));

        let result = translated(engine.run("Bonjour", &Lang::Auto, &Lang::Auto).await.unwrap());

        assert_eq!(result.plan.source, "French");
        assert_eq!(result.plan.target, "Chinese");
        assert!(
            engine.backend().calls_to("large")[0]
                .starts_with("Translate the following French text to Chinese.")
        );
    }

    #[tokio::test]
    async fn test_explicit_target_overrides_rule() {
        let engine = engine(FakeBackend::detecting("Chinese"));

        let result = translated(
            engine
                .run("你好", &Lang::Auto, &Lang::named("Japanese"))
                .await
                .unwrap(),
        );

        assert_eq!(result.plan.source, "Chinese");
        assert_eq!(result.plan.target, "Japanese");
    }

    #[tokio::test]
    async fn test_explicit_source_skips_detection() {
        let engine = engine(FakeBackend::detecting("Chinese"));

        let result = translated(
            engine
                .run("Hallo", &Lang::named("German"), &Lang::Auto)
                .await
                .unwrap(),
        );

        assert_eq!(result.plan.source, "German");
        assert_eq!(result.plan.target, "Chinese");
        assert!(engine.backend().calls_to("small").is_empty());
    }

    #[tokio::test]
    async fn test_detection_failure_skips_translation() {
        let engine = engine(FakeBackend::new(|model, _| {
            if model == "small" {
                Err(TranslateError::Stream("connection reset".to_string()))
            } else {
                Ok(Some("should not be requested".to_string()))
            }
        }));

        let err = engine
            .run("Bonjour", &Lang::Auto, &Lang::Auto)
            .await
            .unwrap_err();

        assert!(matches!(err, TranslateError::Detection(_)));
        assert!(engine.backend().calls_to("large").is_empty());
    }

    #[tokio::test]
    async fn test_empty_detection_reply_is_failure() {
        let engine = engine(FakeBackend::new(|model, _| {
            Ok((model == "large").then(|| "translated".to_string()))
        }));

        let err = engine.detect("Bonjour").await.unwrap_err();
        assert!(matches!(err, TranslateError::Detection(_)));
        assert!(err.to_string().contains("detection"));
    }

    #[tokio::test]
    async fn test_empty_translation_reply_is_failure() {
        let engine = engine(FakeBackend::new(|model, _| {
            Ok(Some(if model == "small" { "French" } else { "  \n" }.to_string()))
        }));

        let err = engine
            .run("Bonjour", &Lang::Auto, &Lang::Auto)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            TranslateError::EmptyResponse(Stage::Translation)
        ));
    }

    #[tokio::test]
    async fn test_detection_reply_is_trimmed_not_normalized() {
        let engine = engine(FakeBackend::detecting(" chinese\n"));

        let detected = engine.detect("你好").await.unwrap();
        assert_eq!(detected, "chinese");

        // Not the exact primary string, so the text is treated as foreign.
        let plan = engine.plan("你好", &Lang::Auto, &Lang::Auto).await.unwrap();
        assert_eq!(plan.target, "Chinese");
    }

    #[tokio::test]
    async fn test_empty_input_makes_no_calls() {
        let engine = engine(FakeBackend::detecting("Chinese"));

        let err = engine
            .run("   \n", &Lang::Auto, &Lang::Auto)
            .await
            .unwrap_err();

        assert!(matches!(err, TranslateError::EmptyInput));
        assert!(engine.backend().calls().is_empty());
    }

    #[tokio::test]
    async fn test_detection_prompt_is_deterministic() {
        let engine = engine(FakeBackend::new(|_, _| {
            Err(TranslateError::Stream("offline".to_string()))
        }));

        let _ = engine.detect("Guten Tag").await;
        let _ = engine.detect("Guten Tag").await;

        let prompts = engine.backend().calls_to("small");
        assert_eq!(prompts.len(), 2);
        assert_eq!(prompts[0], prompts[1]);
    }

    #[tokio::test]
    async fn test_identical_requests_reuse_results() {
        let engine = engine(FakeBackend::detecting("French"));

        for _ in 0..3 {
            engine.run("Bonjour", &Lang::Auto, &Lang::Auto).await.unwrap();
        }

        assert_eq!(engine.backend().calls().len(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_identical_requests_share_one_call() {
        let engine = engine(FakeBackend::detecting("French"));

        let (a, b) = tokio::join!(
            engine.detect("slow Bonjour"),
            engine.detect("slow Bonjour")
        );

        assert_eq!(a.unwrap(), "French");
        assert_eq!(b.unwrap(), "French");
        assert_eq!(engine.backend().calls_to("small").len(), 1);
    }

    #[tokio::test]
    async fn test_different_targets_are_separate_requests() {
        let engine = engine(FakeBackend::detecting("French"));

        engine
            .run("Bonjour", &Lang::Auto, &Lang::named("English"))
            .await
            .unwrap();
        engine
            .run("Bonjour", &Lang::Auto, &Lang::named("Japanese"))
            .await
            .unwrap();

        assert_eq!(engine.backend().calls_to("small").len(), 1);
        assert_eq!(engine.backend().calls_to("large").len(), 2);
    }

    #[tokio::test]
    async fn test_superseded_run_is_dropped() {
        let engine = engine(FakeBackend::detecting("French"));

        let (older, newer) = tokio::join!(
            engine.run("slow Bonjour", &Lang::Auto, &Lang::Auto),
            engine.run("Salut", &Lang::Auto, &Lang::Auto)
        );

        assert_eq!(older.unwrap(), Outcome::Superseded);
        assert!(matches!(newer.unwrap(), Outcome::Translated(_)));
    }

    #[tokio::test]
    async fn test_superseded_failure_is_dropped() {
        let engine = engine(FakeBackend::new(|model, prompt| {
            if prompt.contains("slow") {
                Err(TranslateError::Stream("late failure".to_string()))
            } else {
                Ok(Some(if model == "small" { "French" } else { "ok" }.to_string()))
            }
        }));

        let (older, newer) = tokio::join!(
            engine.run("slow Bonjour", &Lang::Auto, &Lang::Auto),
            engine.run("Salut", &Lang::Auto, &Lang::Auto)
        );

        assert_eq!(older.unwrap(), Outcome::Superseded);
        assert!(matches!(newer.unwrap(), Outcome::Translated(_)));
    }

    #[tokio::test]
    async fn test_streaming_collects_chunks_and_caches() {
        let engine = engine(FakeBackend::detecting("French"));
        let plan = engine.plan("Bonjour", &Lang::Auto, &Lang::Auto).await.unwrap();

        let mut chunks = Vec::new();
        let text = engine
            .translate_streaming("Bonjour", &plan, |c| chunks.push(c.to_string()))
            .await
            .unwrap();
        assert_eq!(text, "translated");
        assert_eq!(chunks, vec!["translated".to_string()]);

        // Second call is served from memory.
        let again = engine.translate("Bonjour", &plan).await.unwrap();
        assert_eq!(again, "translated");
        assert_eq!(engine.backend().calls_to("large").len(), 1);
    }

    #[tokio::test]
    async fn test_streaming_holds_back_leading_whitespace() {
        let engine = engine(FakeBackend::new(|_, _| Ok(Some("  |\n|Hello| world".to_string()))));
        let plan = engine.plan("Bonjour", &Lang::named("French"), &Lang::Auto).await.unwrap();

        let mut chunks = Vec::new();
        let text = engine
            .translate_streaming("Bonjour", &plan, |c| chunks.push(c.to_string()))
            .await
            .unwrap();

        assert_eq!(text, "  \nHello world");
        assert_eq!(chunks, vec!["  \nHello".to_string(), " world".to_string()]);
    }

    #[tokio::test]
    async fn test_streaming_whitespace_reply_emits_nothing() {
        let engine = engine(FakeBackend::new(|_, _| Ok(Some("   |\n  ".to_string()))));
        let plan = engine.plan("Bonjour", &Lang::named("French"), &Lang::Auto).await.unwrap();

        let mut chunks = Vec::new();
        let err = engine
            .translate_streaming("Bonjour", &plan, |c| chunks.push(c.to_string()))
            .await
            .unwrap_err();

        assert!(matches!(err, TranslateError::EmptyResponse(Stage::Translation)));
        assert!(chunks.is_empty());
    }

    #[tokio::test]
    async fn test_streaming_failure_is_not_cached() {
        struct BrokenStream;

        #[async_trait]
        impl CompletionBackend for BrokenStream {
            async fn complete(&self, _: &str, _: &str) -> Result<Option<String>, TranslateError> {
                Ok(Some("unused".to_string()))
            }

            async fn complete_stream(
                &self,
                _: &str,
                _: &str,
            ) -> Result<TextStream, TranslateError> {
                let chunks = vec![
                    Ok("你好".to_string()),
                    Err(TranslateError::Stream("stream ended before completion".to_string())),
                ];
                Ok(Box::pin(futures_util::stream::iter(chunks)))
            }
        }

        let temp_dir = TempDir::new().unwrap();
        let store = CacheManager::open(temp_dir.path().join("completions.db")).unwrap();
        let engine = Engine::new(BrokenStream, preferences()).with_store(store);
        let plan = engine.plan("Bonjour", &Lang::named("French"), &Lang::Auto).await.unwrap();

        let result = engine.translate_streaming("Bonjour", &plan, |_| {}).await;
        assert!(matches!(result, Err(TranslateError::Stream(_))));

        let request = CompletionRequest::translate("Bonjour", &plan.source, &plan.target, &preferences());
        assert!(engine.memo.get(&request.cache_key()).is_none());
        assert!(engine.store.as_ref().unwrap().get(&request).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_persistent_store_survives_new_engine() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("completions.db");

        let first = Engine::new(FakeBackend::detecting("French"), preferences())
            .with_store(CacheManager::open(db_path.clone()).unwrap());
        translated(first.run("Bonjour", &Lang::Auto, &Lang::Auto).await.unwrap());

        let second = Engine::new(FakeBackend::detecting("French"), preferences())
            .with_store(CacheManager::open(db_path).unwrap());
        let result = translated(second.run("Bonjour", &Lang::Auto, &Lang::Auto).await.unwrap());

        assert_eq!(result.text, "translated");
        assert!(second.backend().calls().is_empty());
    }
}
