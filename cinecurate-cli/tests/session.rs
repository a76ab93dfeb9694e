use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use cinecurate_cli::{Backend, ScriptedPrompter, Session};
use cinecurate_config::{Config, ConfigLoader, EnvConfig};
use cinecurate_core::{
    CollectionWriter, CommitDecision, DiscoverFilter, DisplayTitle,
    LibraryError, LibrarySearch, ListSource, MetadataCatalog, ProviderError,
    TitleStream, titles_from_vec,
};
use tempfile::tempdir;

#[derive(Debug, Clone, PartialEq)]
struct Movie {
    title: String,
    year: u16,
}

impl DisplayTitle for Movie {
    fn display_title(&self) -> String {
        format!("{} ({})", self.title, self.year)
    }
}

type Created = Arc<Mutex<Vec<(String, Vec<String>)>>>;

#[derive(Clone)]
struct StubLibrary {
    movies: Arc<Vec<Movie>>,
    created: Created,
}

#[async_trait]
impl LibrarySearch for StubLibrary {
    type Item = Movie;

    async fn search(
        &self,
        title: &str,
        year: Option<u16>,
    ) -> Result<Vec<Movie>, LibraryError> {
        let wanted = title.to_lowercase();
        Ok(self
            .movies
            .iter()
            .filter(|m| m.title.to_lowercase() == wanted)
            .filter(|m| year.is_none_or(|y| m.year == y))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl CollectionWriter for StubLibrary {
    async fn create_collection(
        &self,
        name: &str,
        items: &[Movie],
    ) -> Result<(), LibraryError> {
        self.created.lock().expect("created lock").push((
            name.to_string(),
            items.iter().map(|m| m.title.clone()).collect(),
        ));
        Ok(())
    }
}

struct FakeCatalog {
    collections: HashMap<u64, Vec<String>>,
    discover: HashMap<DiscoverFilter, Vec<String>>,
}

#[async_trait]
impl MetadataCatalog for FakeCatalog {
    async fn collection_titles(
        &self,
        collection_id: u64,
    ) -> Result<Vec<String>, ProviderError> {
        self.collections
            .get(&collection_id)
            .cloned()
            .ok_or(ProviderError::NotFound)
    }

    fn discover_titles(&self, filter: DiscoverFilter) -> TitleStream<'_> {
        titles_from_vec(self.discover.get(&filter).cloned().unwrap_or_default())
    }

    async fn search_titles(
        &self,
        _query: &str,
        _limit: usize,
    ) -> Result<Vec<String>, ProviderError> {
        Ok(Vec::new())
    }
}

struct FakeList {
    titles: Vec<String>,
}

impl ListSource for FakeList {
    fn list_titles<'a>(&'a self, _list_url: &'a str) -> TitleStream<'a> {
        titles_from_vec(self.titles.clone())
    }
}

#[derive(Clone, Default)]
struct FakeBackend {
    movies: Arc<Vec<Movie>>,
    created: Created,
    connects: Arc<AtomicUsize>,
    refuse_connect: bool,
    collections: HashMap<u64, Vec<String>>,
    discover: HashMap<DiscoverFilter, Vec<String>>,
    list: Vec<String>,
}

impl FakeBackend {
    fn with_movies(movies: &[(&str, u16)]) -> Self {
        Self {
            movies: Arc::new(
                movies
                    .iter()
                    .map(|(title, year)| Movie {
                        title: title.to_string(),
                        year: *year,
                    })
                    .collect(),
            ),
            ..Default::default()
        }
    }

    fn created(&self) -> Vec<(String, Vec<String>)> {
        self.created.lock().expect("created lock").clone()
    }

    fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Backend for FakeBackend {
    type Library = StubLibrary;

    async fn connect_library(
        &self,
        _config: &Config,
    ) -> Result<StubLibrary, LibraryError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        if self.refuse_connect {
            return Err(LibraryError::Unauthorized);
        }
        Ok(StubLibrary {
            movies: Arc::clone(&self.movies),
            created: Arc::clone(&self.created),
        })
    }

    fn metadata_catalog(
        &self,
        config: &Config,
    ) -> Result<Option<Box<dyn MetadataCatalog>>, ProviderError> {
        if config.tmdb.api_key.is_none() {
            return Ok(None);
        }
        Ok(Some(Box::new(FakeCatalog {
            collections: self.collections.clone(),
            discover: self.discover.clone(),
        })))
    }

    fn list_source(
        &self,
        _config: &Config,
    ) -> Result<Box<dyn ListSource>, ProviderError> {
        Ok(Box::new(FakeList {
            titles: self.list.clone(),
        }))
    }
}

fn config(plex: bool, tmdb: bool) -> Config {
    let env = EnvConfig {
        plex_url: plex.then(|| "http://127.0.0.1:32400".to_string()),
        plex_token: plex.then(|| "plex-token".to_string()),
        tmdb_api_key: tmdb.then(|| "tmdb-key".to_string()),
        ..Default::default()
    };
    ConfigLoader::new("/nonexistent/cinecurate.toml")
        .load_with_env(env)
        .expect("config")
}

async fn run_script(
    backend: FakeBackend,
    config: Config,
    answers: &[&str],
) -> ScriptedPrompter {
    run_script_at(backend, config, PathBuf::from("unused.toml"), answers)
        .await
        .into_prompter()
}

async fn run_script_at(
    backend: FakeBackend,
    config: Config,
    path: PathBuf,
    answers: &[&str],
) -> Session<ScriptedPrompter, FakeBackend> {
    let prompter = ScriptedPrompter::new(answers.iter().copied());
    let mut session =
        Session::new(prompter, backend, config, path).expect("session");
    session.run().await.expect("menu run");
    assert_eq!(session.prompter().remaining(), 0, "unused answers");
    session
}

fn library() -> FakeBackend {
    FakeBackend::with_movies(&[
        ("Inception", 2010),
        ("The Matrix", 1999),
        ("Moonlight", 2016),
        ("Harry Potter and the Philosopher's Stone", 2001),
        ("Star Wars", 1977),
    ])
}

#[tokio::test]
async fn manual_entry_creates_collection() {
    let backend = library();
    let prompter = run_script(
        backend.clone(),
        config(true, false),
        &[
            "1",
            "Faves",
            "Inception (2010)",
            "NonexistentMovieXYZ",
            "The Matrix",
            "",
            "y",
            "6",
        ],
    )
    .await;

    assert_eq!(
        backend.created(),
        vec![(
            "Faves".to_string(),
            vec!["Inception".to_string(), "The Matrix".to_string()]
        )]
    );
    let transcript = prompter.transcript();
    assert!(transcript.contains("Found 2 movies in Plex."));
    assert!(transcript.contains("Couldn't find 1:"));
    assert!(transcript.contains("- NonexistentMovieXYZ"));
    assert!(transcript.contains("1. Inception (2010)"));
    assert!(transcript.contains("Created collection 'Faves' with 2 movies."));
}

#[tokio::test]
async fn declining_leaves_library_untouched() {
    let backend = library();
    let prompter = run_script(
        backend.clone(),
        config(true, false),
        &["1", "Faves", "The Matrix", "", "n", "6"],
    )
    .await;

    assert!(backend.created().is_empty());
    assert!(prompter.transcript().contains("Aborted by user."));
}

#[tokio::test]
async fn zero_matches_skip_confirmation() {
    let backend = library();
    let prompter = run_script(
        backend.clone(),
        config(true, false),
        &["1", "Empty", "Nope", "Also Nope (2001)", "", "6"],
    )
    .await;

    assert!(backend.created().is_empty());
    assert!(
        prompter
            .transcript()
            .contains("No valid matches found; collection not created.")
    );
    assert!(!prompter.prompts().iter().any(|p| p.starts_with("Proceed")));
}

#[tokio::test]
async fn back_at_name_prompt_returns_to_menu() {
    let backend = library();
    run_script(backend.clone(), config(true, false), &["1", "back", "6"]).await;
    assert_eq!(backend.connects(), 0);
}

#[tokio::test]
async fn blank_collection_name_is_asked_again() {
    let backend = library();
    let prompter = run_script(
        backend.clone(),
        config(true, false),
        &["1", "", "Faves", "The Matrix", "", "y", "6"],
    )
    .await;

    assert!(prompter.transcript().contains("Collection name cannot be empty."));
    assert_eq!(backend.created().len(), 1);
}

#[tokio::test]
async fn invalid_menu_option_is_reported() {
    let prompter =
        run_script(library(), config(true, false), &["9", "abc", "6"]).await;
    let invalid = prompter
        .output()
        .iter()
        .filter(|line| {
            *line == "Invalid selection. Please choose a valid menu option (1-6)."
        })
        .count();
    assert_eq!(invalid, 2);
}

#[tokio::test]
async fn missing_plex_credentials_stop_manual_entry() {
    let backend = library();
    let prompter =
        run_script(backend.clone(), config(false, false), &["1", "Faves", "6"])
            .await;

    assert!(
        prompter
            .transcript()
            .contains("Missing or invalid Plex Token or URL.")
    );
    assert_eq!(backend.connects(), 0);
}

#[tokio::test]
async fn franchise_without_tmdb_key_uses_fallback_lists() {
    let backend = library();
    let prompter = run_script(
        backend.clone(),
        config(true, false),
        &["2", "Hogwarts", "harry potter", "HP", "y", "6"],
    )
    .await;

    let transcript = prompter.transcript();
    assert!(transcript.contains(
        "TMDb API key not provided. Using fallback hardcoded titles."
    ));
    assert!(transcript.contains("Unknown option."));
    assert_eq!(
        backend.created(),
        vec![(
            "HP".to_string(),
            vec!["Harry Potter and the Philosopher's Stone".to_string()]
        )]
    );
}

#[tokio::test]
async fn franchise_with_catalog_fetches_collection() {
    let mut backend = library();
    backend.collections.insert(
        10,
        vec![
            "Star Wars (1977)".to_string(),
            "The Empire Strikes Back (1980)".to_string(),
        ],
    );
    let prompter = run_script(
        backend.clone(),
        config(true, true),
        &["2", "STAR WARS", "Saga", "y", "6"],
    )
    .await;

    assert_eq!(
        backend.created(),
        vec![("Saga".to_string(), vec!["Star Wars".to_string()])]
    );
    assert!(prompter.transcript().contains("- The Empire Strikes Back (1980)"));
}

#[tokio::test]
async fn franchise_catalog_error_returns_to_menu() {
    let backend = library();
    let prompter = run_script(
        backend.clone(),
        config(true, true),
        &["2", "Alien", "6"],
    )
    .await;

    assert!(
        prompter
            .transcript()
            .contains("Error retrieving movies from TMDb collection")
    );
    assert_eq!(backend.connects(), 0);
}

#[tokio::test]
async fn studio_uses_discover() {
    let mut backend = library();
    backend.discover.insert(
        DiscoverFilter::Company(41077),
        vec!["Moonlight (2016)".to_string(), "Lady Bird (2017)".to_string()],
    );
    run_script(
        backend.clone(),
        config(true, true),
        &["3", "a24", "Indie", "y", "6"],
    )
    .await;

    assert_eq!(
        backend.created(),
        vec![("Indie".to_string(), vec!["Moonlight".to_string()])]
    );
}

#[tokio::test]
async fn studio_without_results_reports_nothing_found() {
    let backend = library();
    let prompter =
        run_script(backend.clone(), config(true, true), &["3", "MCU", "6"]).await;

    assert!(prompter.transcript().contains("No movies found for that input."));
    assert_eq!(backend.connects(), 0);
}

#[tokio::test]
async fn letterboxd_list_is_deduplicated() {
    let mut backend = library();
    backend.list = vec![
        "Inception".to_string(),
        "Inception".to_string(),
        "The Matrix".to_string(),
    ];
    let prompter = run_script(
        backend.clone(),
        config(true, false),
        &[
            "4",
            "ftp://letterboxd.com/list",
            "https://letterboxd.com/someone/list/faves/",
            "LB",
            "y",
            "6",
        ],
    )
    .await;

    let transcript = prompter.transcript();
    assert!(transcript.contains("Please enter a full http(s) list URL."));
    assert!(transcript.contains("Found 2 titles on the list."));
    assert_eq!(
        backend.created(),
        vec![(
            "LB".to_string(),
            vec!["Inception".to_string(), "The Matrix".to_string()]
        )]
    );
}

#[tokio::test]
async fn dry_run_never_connects() {
    let backend = library();
    let config = Config {
        dry_run: true,
        ..config(false, false)
    };
    let prompter = run_script(
        backend.clone(),
        config,
        &["1", "Test", "Heat", "The Matrix", "", "6"],
    )
    .await;

    let transcript = prompter.transcript();
    assert!(transcript.contains("[DRY RUN]"));
    assert!(transcript.contains("- Would search for 'Heat'"));
    assert_eq!(backend.connects(), 0);
    assert!(backend.created().is_empty());
}

#[tokio::test]
async fn connection_failure_is_reported() {
    let backend = FakeBackend {
        refuse_connect: true,
        ..library()
    };
    let prompter = run_script(
        backend.clone(),
        config(true, false),
        &["1", "Faves", "The Matrix", "", "6"],
    )
    .await;

    assert!(prompter.transcript().contains("Could not connect to Plex"));
    assert!(backend.created().is_empty());
}

#[tokio::test]
async fn credentials_are_saved_and_masked() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("cinecurate.toml");

    let session = run_script_at(
        library(),
        config(false, false),
        path.clone(),
        &[
            "5",
            "1",
            "tok-123456789",
            "2",
            "not a url",
            "2",
            "http://localhost:32400",
            "4",
            "5",
            "6",
        ],
    )
    .await;

    assert_eq!(session.config().plex.token.as_deref(), Some("tok-123456789"));
    assert_eq!(
        session.config().plex.url.as_deref(),
        Some("http://localhost:32400")
    );

    let transcript = session.prompter().transcript();
    assert!(transcript.contains("Invalid Plex URL"));
    assert!(transcript.contains("Plex Token: *********6789"));
    assert!(!transcript.contains("tok-123456789"));

    let reloaded = ConfigLoader::new(&path)
        .load_with_env(EnvConfig::default())
        .expect("reload saved config");
    assert_eq!(reloaded.plex.token.as_deref(), Some("tok-123456789"));
    assert_eq!(reloaded.plex.url.as_deref(), Some("http://localhost:32400"));
}

#[tokio::test]
async fn failed_save_keeps_previous_credentials() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("missing").join("cinecurate.toml");

    let session = run_script_at(
        library(),
        config(false, false),
        path,
        &["5", "3", "new-key", "back", "6"],
    )
    .await;

    assert_eq!(session.config().tmdb.api_key, None);
    assert!(
        session
            .prompter()
            .transcript()
            .contains("Could not save configuration")
    );
}

#[tokio::test]
async fn batch_run_commits_without_prompting() {
    let backend = library();
    let mut session = Session::new(
        ScriptedPrompter::default(),
        backend.clone(),
        config(true, false),
        "unused.toml",
    )
    .expect("session");

    let decision = session
        .run_batch(
            " Batch ",
            vec!["Inception (2010)".to_string(), "Heat (1995)".to_string()],
            true,
        )
        .await
        .expect("batch run");

    assert_eq!(decision, Some(CommitDecision::Commit));
    assert_eq!(
        backend.created(),
        vec![("Batch".to_string(), vec!["Inception".to_string()])]
    );
    assert!(session.prompter().prompts().is_empty());
}

#[tokio::test]
async fn blank_fallback_entries_never_reach_the_library() {
    let dir = tempdir().expect("tempdir");
    let fallback = dir.path().join("fallback.json");
    std::fs::write(
        &fallback,
        r#"{"Franchises": {"Mixed": ["", "The Matrix (1999)", "  "]}}"#,
    )
    .expect("write fallback");

    let mut config = config(true, false);
    config.catalog.fallback_path = Some(fallback);
    let backend = library();
    let prompter = run_script(
        backend.clone(),
        config,
        &["2", "mixed", "Picks", "y", "6"],
    )
    .await;

    assert!(prompter.transcript().contains("Found 1 movies in Plex."));
    assert!(!prompter.transcript().contains("Couldn't find"));
    assert_eq!(
        backend.created(),
        vec![("Picks".to_string(), vec!["The Matrix".to_string()])]
    );
}
