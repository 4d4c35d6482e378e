use crate::boundary::Advisory;
use crate::config::Options;
use crate::domain::{BumpResult, Commit, Decision};
use crate::error::Result;
use crate::filter::filter_reverted;
use crate::git::{Git2Repository, RawCommitsOptions, Repository, TagOptions};
use crate::parser::{CommitParser, ParserOptions};
use crate::preset::{PresetConfig, PresetRegistry, PresetSource};

/// Recommends a version bump from the commits made since the last release tag
pub struct Recommender<R> {
    repo: R,
    presets: PresetRegistry,
}

impl<R: Repository> Recommender<R> {
    /// Create a recommender over `repo` with the built-in presets
    pub fn new(repo: R) -> Self {
        Recommender {
            repo,
            presets: PresetRegistry::builtin(),
        }
    }

    /// Replace the preset registry used to resolve `Options::preset`
    pub fn with_presets(mut self, presets: PresetRegistry) -> Self {
        self.presets = presets;
        self
    }

    /// Compute a recommendation.
    ///
    /// Runs, in order: preset resolution, tag discovery, commit retrieval and
    /// parsing, revert filtering, the bump policy, and result normalization.
    /// Preset, tag and commit failures are returned as errors. A panic in the
    /// bump policy is not caught.
    pub async fn recommend(
        &self,
        options: Options,
        parser_opts: ParserOptions,
    ) -> Result<BumpResult> {
        let source = match options.preset.as_deref() {
            Some(name) => self.presets.load(name)?,
            None => options
                .config
                .clone()
                .unwrap_or_else(|| PresetSource::Value(PresetConfig::default())),
        };
        let config = source.resolve().await?;
        tracing::debug!(preset = ?options.preset, "resolved preset");

        let what_bump = options.what_bump.clone().or_else(|| config.what_bump());

        let mut parser_opts = config.parser_opts().merge(parser_opts);
        if parser_opts.warn.is_none() {
            parser_opts.warn = Some(options.warn.clone());
        }
        let parser = CommitParser::new(&parser_opts)?;

        let tags = self.repo.semver_tags(&TagOptions {
            package: options.lerna_package.clone(),
        })?;
        let from = tags.into_iter().next();
        tracing::debug!(from = ?from, "commit range start");

        let commits = self.parse_commits(&parser, from, options.path.clone())?;
        tracing::debug!(count = commits.len(), "parsed commits");

        let commits = if options.ignore_reverted {
            filter_reverted(commits)
        } else {
            commits
        };

        if commits.is_empty() {
            tracing::info!("{}", Advisory::NoCommitsSinceLastRelease);
            options.warn.advise(&Advisory::NoCommitsSinceLastRelease);
        }

        let decision = what_bump.and_then(|policy| policy.what_bump(&commits));
        let result = Decision::normalize(decision);
        tracing::debug!(release_type = ?result.release_type, "recommendation ready");

        Ok(result)
    }

    /// Stream raw commits through the parser, collecting the whole range
    fn parse_commits(
        &self,
        parser: &CommitParser,
        from: Option<String>,
        path: Option<String>,
    ) -> Result<Vec<Commit>> {
        let raw_commits = self.repo.raw_commits(&RawCommitsOptions { from, path })?;

        let mut commits = Vec::new();
        for raw in raw_commits {
            if let Some(commit) = parser.parse(&raw?) {
                commits.push(commit);
            }
        }
        Ok(commits)
    }
}

/// Recommend a bump for the repository containing the current directory,
/// using the built-in presets
pub async fn recommended_bump(options: Options, parser_opts: ParserOptions) -> Result<BumpResult> {
    let repo = Git2Repository::open(".")?;
    Recommender::new(repo).recommend(options, parser_opts).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::Warn;
    use crate::domain::{BumpLevel, ReleaseType};
    use crate::error::BumpError;
    use crate::git::MockRepository;
    use crate::preset::RecommendedBumpOpts;
    use std::sync::{Arc, Mutex};

    fn tagged_repo() -> MockRepository {
        let mut repo = MockRepository::new();
        repo.add_commit("a1", "my first commit");
        repo.add_tag("v1.0.0", "a1");
        repo
    }

    fn repo_with_commits(messages: &[&str]) -> MockRepository {
        let mut repo = tagged_repo();
        for (i, message) in messages.iter().enumerate() {
            repo.add_commit(format!("c{}", i), *message);
        }
        repo
    }

    fn capture() -> (Warn, Arc<Mutex<Vec<String>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        (
            Warn::new(move |msg| sink.lock().unwrap().push(msg.to_string())),
            seen,
        )
    }

    #[tokio::test]
    async fn test_no_commits_since_tag_warns_and_returns_empty() {
        let (warn, seen) = capture();
        let options = Options {
            warn,
            ..Options::default()
        };

        let result = Recommender::new(tagged_repo())
            .recommend(options, ParserOptions::default())
            .await
            .unwrap();

        assert!(result.is_empty());
        assert_eq!(
            *seen.lock().unwrap(),
            vec!["No commits since last release".to_string()]
        );
    }

    #[tokio::test]
    async fn test_policy_sees_commits_since_tag_in_order() {
        let seen_subjects = Arc::new(Mutex::new(Vec::<String>::new()));
        let sink = Arc::clone(&seen_subjects);
        let options = Options::default().with_what_bump(move |commits: &[Commit]| {
            let subjects = commits.iter().filter_map(|c| c.subject.clone()).collect();
            *sink.lock().unwrap() = subjects;
            None
        });

        Recommender::new(repo_with_commits(&["fix: one", "feat: two"]))
            .recommend(options, ParserOptions::default())
            .await
            .unwrap();

        assert_eq!(*seen_subjects.lock().unwrap(), vec!["one", "two"]);
    }

    #[tokio::test]
    async fn test_plain_level_is_normalized() {
        let options =
            Options::default().with_what_bump(|_: &[Commit]| Some(Decision::Level(BumpLevel::Major)));
        let result = Recommender::new(tagged_repo())
            .recommend(options, ParserOptions::default())
            .await
            .unwrap();
        assert_eq!(result, BumpResult::with_level(BumpLevel::Major).normalize());
        assert_eq!(result.release_type, Some(ReleaseType::Major));
    }

    #[tokio::test]
    async fn test_caller_what_bump_overrides_preset() {
        let options = Options::default()
            .with_preset("angular")
            .with_what_bump(|_: &[Commit]| Some(Decision::Level(BumpLevel::Patch)));
        let result = Recommender::new(repo_with_commits(&["feat!: breaking\n\nBREAKING CHANGE: x"]))
            .recommend(options, ParserOptions::default())
            .await
            .unwrap();
        assert_eq!(result.level, Some(BumpLevel::Patch));
        assert!(result.reason().is_none());
    }

    #[tokio::test]
    async fn test_preset_policy_is_used() {
        let options = Options::default().with_preset("Angular");
        let result = Recommender::new(repo_with_commits(&["fix: a", "feat(api): b"]))
            .recommend(options, ParserOptions::default())
            .await
            .unwrap();
        assert_eq!(result.release_type, Some(ReleaseType::Minor));
        assert_eq!(
            result.reason(),
            Some("There are 0 BREAKING CHANGES and 1 features")
        );
    }

    #[tokio::test]
    async fn test_unknown_preset_is_an_error() {
        let options = Options::default().with_preset("does-not-exist");
        let err = Recommender::new(tagged_repo())
            .recommend(options, ParserOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, BumpError::PresetNotFound(ref name) if name == "does-not-exist"));
    }

    #[tokio::test]
    async fn test_tag_failure_passes_through() {
        let mut repo = tagged_repo();
        repo.fail_tags_with("no HEAD");
        let err = Recommender::new(repo)
            .recommend(Options::default(), ParserOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, BumpError::Git(_)));
        assert!(err.to_string().contains("no HEAD"));
    }

    #[tokio::test]
    async fn test_commit_failure_passes_through() {
        let mut repo = tagged_repo();
        repo.fail_commits_with("object missing");
        let err = Recommender::new(repo)
            .recommend(Options::default(), ParserOptions::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("object missing"));
    }

    #[tokio::test]
    async fn test_reverted_commits_are_ignored_by_default() {
        let repo = repo_with_commits(&[
            "feat: shiny",
            "Revert \"feat: shiny\"\n\nThis reverts commit c0.",
        ]);
        let (warn, seen) = capture();
        let options = Options {
            warn,
            ..Options::default().with_preset("angular")
        };

        let result = Recommender::new(repo)
            .recommend(options, ParserOptions::default())
            .await
            .unwrap();

        assert_eq!(result.level, Some(BumpLevel::Patch));
        assert!(seen
            .lock()
            .unwrap()
            .contains(&"No commits since last release".to_string()));
    }

    #[tokio::test]
    async fn test_reverted_commits_kept_when_disabled() {
        let repo = repo_with_commits(&[
            "feat: shiny",
            "Revert \"feat: shiny\"\n\nThis reverts commit c0.",
        ]);
        let options = Options::default()
            .with_preset("angular")
            .with_ignore_reverted(false);

        let result = Recommender::new(repo)
            .recommend(options, ParserOptions::default())
            .await
            .unwrap();

        assert_eq!(result.level, Some(BumpLevel::Minor));
    }

    #[tokio::test]
    async fn test_caller_parser_opts_override_preset() {
        let options = Options::default().with_preset("angular");
        let parser_opts = ParserOptions::default()
            .with_header_pattern(r"^\[(\w+)\] (.*)$")
            .with_header_correspondence(["type", "subject"]);

        let result = Recommender::new(repo_with_commits(&["[feat] bracketed"]))
            .recommend(options, parser_opts)
            .await
            .unwrap();

        assert_eq!(result.level, Some(BumpLevel::Minor));
    }

    #[tokio::test]
    async fn test_nested_preset_parser_opts_win_over_top_level() {
        let config = PresetConfig {
            parser_opts: Some(ParserOptions::default().with_header_pattern("^never$")),
            recommended_bump_opts: Some(RecommendedBumpOpts {
                parser_opts: Some(ParserOptions::default()),
                what_bump: Some(Arc::new(|commits: &[Commit]| {
                    commits
                        .iter()
                        .any(|c| c.has_type("feat"))
                        .then_some(Decision::Level(BumpLevel::Minor))
                })),
            }),
        };
        let options = Options::default().with_config(config);

        let result = Recommender::new(repo_with_commits(&["feat: parsed by default pattern"]))
            .recommend(options, ParserOptions::default())
            .await
            .unwrap();

        assert_eq!(result.level, Some(BumpLevel::Minor));
    }

    #[tokio::test]
    async fn test_factory_config_is_awaited() {
        let options = Options::default().with_config(PresetSource::factory(|| async {
            Ok(crate::preset::angular())
        }));
        let result = Recommender::new(repo_with_commits(&["fix: small"]))
            .recommend(options, ParserOptions::default())
            .await
            .unwrap();
        assert_eq!(result.release_type, Some(ReleaseType::Patch));
    }

    #[tokio::test]
    async fn test_parser_warnings_reach_caller_warn() {
        let (warn, seen) = capture();
        let options = Options {
            warn,
            ..Options::default()
        };

        Recommender::new(repo_with_commits(&["not conventional"]))
            .recommend(options, ParserOptions::default())
            .await
            .unwrap();

        assert_eq!(
            *seen.lock().unwrap(),
            vec!["Cannot parse commit header: \"not conventional\"".to_string()]
        );
    }

    #[tokio::test]
    async fn test_lerna_package_scopes_tags() {
        let mut repo = MockRepository::new();
        repo.add_commit("a1", "feat: core thing");
        repo.add_tag("core@1.0.0", "a1");
        repo.add_commit("b2", "fix: later");
        repo.add_tag("v2.0.0", "b2");

        let count = Arc::new(Mutex::new(0));
        let sink = Arc::clone(&count);
        let options = Options::default()
            .with_lerna_package("core")
            .with_what_bump(move |commits: &[Commit]| {
                *sink.lock().unwrap() = commits.len();
                None
            });

        Recommender::new(repo)
            .recommend(options, ParserOptions::default())
            .await
            .unwrap();

        assert_eq!(*count.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_repeated_calls_are_identical() {
        let recommender = Recommender::new(repo_with_commits(&["feat: a", "fix: b"]));
        let first = recommender
            .recommend(Options::default().with_preset("angular"), ParserOptions::default())
            .await
            .unwrap();
        let second = recommender
            .recommend(Options::default().with_preset("angular"), ParserOptions::default())
            .await
            .unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_custom_registry() {
        let mut presets = PresetRegistry::empty();
        presets.register(
            "Mine",
            PresetConfig {
                parser_opts: None,
                recommended_bump_opts: Some(RecommendedBumpOpts {
                    parser_opts: None,
                    what_bump: Some(Arc::new(|_: &[Commit]| {
                        Some(Decision::Result(BumpResult::default().with_field("test", "test")))
                    })),
                }),
            },
        );

        let recommender = Recommender::new(tagged_repo()).with_presets(presets);
        let result = recommender
            .recommend(Options::default().with_preset("MINE"), ParserOptions::default())
            .await
            .unwrap();

        assert_eq!(result, BumpResult::default().with_field("test", "test"));
        assert!(recommender
            .recommend(Options::default().with_preset("angular"), ParserOptions::default())
            .await
            .is_err());
    }
}
