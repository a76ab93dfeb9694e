//! The interactive collection builder.
//!
//! A [`Session`] owns the effective [`Config`] and swaps it for a new value
//! whenever credentials change. Each menu pass gathers a title list from one
//! source, reconciles it against the library, and writes a collection only
//! after the user confirms a non-empty match list.

use std::path::PathBuf;

use anyhow::{Context, Result};
use cinecurate_config::util::mask_secret;
use cinecurate_config::{Config, save_config};
use cinecurate_core::catalog::{
    FallbackData, KNOWN_COLLECTIONS, STUDIOS, collection_id, find_studio,
    pick_case_insensitive,
};
use cinecurate_core::{
    CommitDecision, CommitGate, DisplayTitle, LibrarySearch, MatchResult,
    collect_titles, collect_unique_titles, manual_titles,
    reconcile_with_observer,
};
use tracing::{debug, info};
use url::Url;

use crate::backend::Backend;
use crate::present::{RULE, grid_lines, status_lines};
use crate::prompt::Prompter;

const BACK: &str = "back";
const MISSING_PLEX: &str = "Missing or invalid Plex Token or URL.";
const NO_TMDB_KEY: &str =
    "TMDb API key not provided. Using fallback hardcoded titles.";

type LibraryItem<B> = <<B as Backend>::Library as LibrarySearch>::Item;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuChoice {
    Manual,
    Franchise,
    Studio,
    Letterboxd,
    Credentials,
    Exit,
}

impl MenuChoice {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "1" => Some(Self::Manual),
            "2" => Some(Self::Franchise),
            "3" => Some(Self::Studio),
            "4" => Some(Self::Letterboxd),
            "5" => Some(Self::Credentials),
            "6" => Some(Self::Exit),
            _ => None,
        }
    }
}

/// How a reconciled list gets its go-ahead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Ask,
    Assume(bool),
}

/// A collection name together with the raw titles to put in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionRequest {
    pub name: String,
    pub titles: Vec<String>,
}

pub struct Session<P, B> {
    prompter: P,
    backend: B,
    config: Config,
    config_path: PathBuf,
    fallback: FallbackData,
}

impl<P, B> std::fmt::Debug for Session<P, B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("config_path", &self.config_path)
            .field("dry_run", &self.config.dry_run)
            .finish_non_exhaustive()
    }
}

impl<P, B> Session<P, B>
where
    P: Prompter,
    B: Backend,
{
    pub fn new(
        prompter: P,
        backend: B,
        config: Config,
        config_path: impl Into<PathBuf>,
    ) -> Result<Self> {
        let fallback =
            FallbackData::load(config.catalog.fallback_path.as_deref())
                .context("failed to load fallback collections")?;

        Ok(Self {
            prompter,
            backend,
            config,
            config_path: config_path.into(),
            fallback,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn prompter(&self) -> &P {
        &self.prompter
    }

    pub fn into_prompter(self) -> P {
        self.prompter
    }

    /// Run the main menu until the user exits.
    pub async fn run(&mut self) -> Result<()> {
        loop {
            self.print_menu();
            let answer = self.prompter.input("Select an option")?;

            let Some(choice) = MenuChoice::parse(&answer) else {
                self.say("Invalid selection. Please choose a valid menu option (1-6).");
                continue;
            };
            debug!("Menu choice {:?}", choice);

            let request = match choice {
                MenuChoice::Exit => {
                    self.say("Goodbye!");
                    return Ok(());
                }
                MenuChoice::Credentials => {
                    self.configure_credentials()?;
                    continue;
                }
                MenuChoice::Manual => self.manual_entry()?,
                MenuChoice::Franchise => self.franchise().await?,
                MenuChoice::Studio => self.studio().await?,
                MenuChoice::Letterboxd => self.letterboxd().await?,
            };

            if let Some(request) = request {
                self.build_collection(request, Confirmation::Ask).await?;
            }
        }
    }

    /// One non-interactive pass over `titles`. Without `assume_yes` the
    /// confirmation is still asked.
    pub async fn run_batch(
        &mut self,
        collection: &str,
        titles: Vec<String>,
        assume_yes: bool,
    ) -> Result<Option<CommitDecision>> {
        let confirmation = if assume_yes {
            Confirmation::Assume(true)
        } else {
            Confirmation::Ask
        };
        let request = CollectionRequest {
            name: collection.trim().to_string(),
            titles,
        };
        self.build_collection(request, confirmation).await
    }

    /// Search the library for `request.titles` and, once confirmed, create
    /// the collection. Returns the commit decision, or `None` when the run
    /// stopped before a decision or the write itself failed.
    pub async fn build_collection(
        &mut self,
        request: CollectionRequest,
        confirmation: Confirmation,
    ) -> Result<Option<CommitDecision>> {
        let CollectionRequest { name, titles } = request;

        if titles.is_empty() {
            self.say("No movies found for that input.");
            return Ok(None);
        }

        if self.config.dry_run {
            self.say("[DRY RUN]");
            self.say(&format!(
                "Simulating search in Plex for {} titles...",
                titles.len()
            ));
            for title in &titles {
                self.say(&format!("- Would search for '{title}'"));
            }
            self.say(&format!(
                "Finished. Would create collection '{}' from up to {} movies.",
                name,
                titles.len()
            ));
            return Ok(None);
        }

        if !self.config.plex.is_configured() {
            self.say(MISSING_PLEX);
            return Ok(None);
        }

        let library = match self.backend.connect_library(&self.config).await {
            Ok(library) => library,
            Err(err) => {
                self.say(&format!("Could not connect to Plex: {err}"));
                self.say("Please make sure your Plex Token and URL are correct.");
                return Ok(None);
            }
        };

        let total = titles.len();
        let prompter = &mut self.prompter;
        let mut progress =
            |index: usize, raw: &str, outcome: &MatchResult<LibraryItem<B>>| {
                let mark = if outcome.is_matched() { "✔" } else { "✘" };
                prompter.println(&format!(
                    "[{}/{}] {} {}",
                    index + 1,
                    total,
                    mark,
                    raw
                ));
            };
        let result =
            reconcile_with_observer(&titles, &library, &mut progress).await;

        self.say(&format!("Found {} movies in Plex.", result.found.len()));
        if !result.not_found.is_empty() {
            self.say(&format!("Couldn't find {}:", result.not_found.len()));
            for title in &result.not_found {
                self.say(&format!("- {title}"));
            }
        }
        if !result.failures.is_empty() {
            self.say("Errors during search:");
            for failure in &result.failures {
                self.say(&format!("- {failure}"));
            }
        }

        if result.is_empty_match() {
            self.say("No valid matches found; collection not created.");
            return Ok(Some(CommitDecision::NothingMatched));
        }

        self.say("Movies to add to collection:");
        for (index, item) in result.found.iter().enumerate() {
            self.say(&format!("{}. {}", index + 1, item.display_title()));
        }

        let confirmed = match confirmation {
            Confirmation::Ask => self.prompter.confirm(
                "Proceed to create collection with these movies?",
            )?,
            Confirmation::Assume(answer) => answer,
        };

        match CommitGate::commit(&library, &name, &result.found, confirmed)
            .await
        {
            Ok(CommitDecision::Commit) => {
                self.say(&format!(
                    "Created collection '{}' with {} movies.",
                    name.trim(),
                    result.found.len()
                ));
                Ok(Some(CommitDecision::Commit))
            }
            Ok(CommitDecision::NotConfirmed) => {
                self.say("Aborted by user.");
                Ok(Some(CommitDecision::NotConfirmed))
            }
            Ok(CommitDecision::NothingMatched) => {
                Ok(Some(CommitDecision::NothingMatched))
            }
            Err(err) => {
                self.say(&format!("Failed to create collection: {err}"));
                Ok(None)
            }
        }
    }

    fn manual_entry(&mut self) -> Result<Option<CollectionRequest>> {
        self.say("Type 'back' to return to the main menu.");
        let Some(name) = self.ask_collection_name()? else {
            return Ok(None);
        };
        if !self.config.dry_run && !self.config.plex.is_configured() {
            self.say(MISSING_PLEX);
            return Ok(None);
        }

        self.say("Enter movie titles one per line. Leave a blank line to finish:");
        let mut lines = Vec::new();
        loop {
            let line = self.prompter.input("Title")?;
            if line.trim().is_empty() {
                break;
            }
            lines.push(line);
        }

        Ok(Some(CollectionRequest {
            name,
            titles: manual_titles(lines),
        }))
    }

    async fn franchise(&mut self) -> Result<Option<CollectionRequest>> {
        let catalog = match self.backend.metadata_catalog(&self.config) {
            Ok(catalog) => catalog,
            Err(err) => {
                self.say(&format!("Could not set up TMDb: {err}"));
                return Ok(None);
            }
        };

        let titles = match catalog {
            None => {
                self.say(NO_TMDB_KEY);
                let names: Vec<String> =
                    self.fallback.franchise_names().map(String::from).collect();
                self.show_grid("Available Franchises:", &names, 28);
                let Some(choice) =
                    self.pick("Type the franchise name (or 'back' to return)", &names)?
                else {
                    return Ok(None);
                };
                self.fallback
                    .franchise_titles(&choice)
                    .unwrap_or_default()
            }
            Some(catalog) => {
                let names: Vec<String> = KNOWN_COLLECTIONS
                    .iter()
                    .map(|(name, _)| name.to_string())
                    .collect();
                self.show_grid("Available Collections (TMDb):", &names, 28);
                let Some(choice) = self.pick(
                    "Type the collection name (or 'back' to return)",
                    &names,
                )?
                else {
                    return Ok(None);
                };
                let Some(id) = collection_id(&choice) else {
                    return Ok(None);
                };
                match catalog.collection_titles(id).await {
                    Ok(titles) => titles,
                    Err(err) => {
                        self.say(&format!(
                            "Error retrieving movies from TMDb collection: {err}"
                        ));
                        return Ok(None);
                    }
                }
            }
        };

        self.finish_request(titles)
    }

    async fn studio(&mut self) -> Result<Option<CollectionRequest>> {
        let catalog = match self.backend.metadata_catalog(&self.config) {
            Ok(catalog) => catalog,
            Err(err) => {
                self.say(&format!("Could not set up TMDb: {err}"));
                return Ok(None);
            }
        };

        let titles = match catalog {
            None => {
                self.say(NO_TMDB_KEY);
                let names: Vec<String> =
                    self.fallback.studio_names().map(String::from).collect();
                self.show_grid("Available Studios:", &names, 24);
                let Some(choice) =
                    self.pick("Type the studio name (or 'back' to return)", &names)?
                else {
                    return Ok(None);
                };
                self.fallback
                    .studio_titles(&choice)
                    .unwrap_or_default()
            }
            Some(catalog) => {
                let names: Vec<String> =
                    STUDIOS.iter().map(|studio| studio.display_name()).collect();
                self.show_grid("Available Studios:", &names, 24);
                let Some(choice) =
                    self.pick("Type the studio name (or 'back' to return)", &names)?
                else {
                    return Ok(None);
                };
                let Some(studio) = find_studio(&choice) else {
                    return Ok(None);
                };
                match collect_titles(catalog.discover_titles(studio.filter)).await
                {
                    Ok(titles) => titles,
                    Err(err) => {
                        self.say(&format!(
                            "Error retrieving movies from TMDb discover: {err}"
                        ));
                        return Ok(None);
                    }
                }
            }
        };

        self.finish_request(titles)
    }

    async fn letterboxd(&mut self) -> Result<Option<CollectionRequest>> {
        let Some(list_url) = self.ask_list_url()? else {
            return Ok(None);
        };

        let source = match self.backend.list_source(&self.config) {
            Ok(source) => source,
            Err(err) => {
                self.say(&format!("Could not set up Letterboxd scraper: {err}"));
                return Ok(None);
            }
        };

        let titles =
            match collect_unique_titles(source.list_titles(&list_url)).await {
                Ok(titles) => titles,
                Err(err) => {
                    self.say(&format!("Error reading Letterboxd list: {err}"));
                    return Ok(None);
                }
            };
        info!("Scraped {} titles from {}", titles.len(), list_url);
        if titles.is_empty() {
            self.say("No titles found on that list. It may be empty or private.");
            return Ok(None);
        }
        self.say(&format!("Found {} titles on the list.", titles.len()));

        self.finish_request(titles)
    }

    fn finish_request(
        &mut self,
        titles: Vec<String>,
    ) -> Result<Option<CollectionRequest>> {
        if titles.is_empty() {
            self.say("No movies found for that input.");
            return Ok(None);
        }
        let Some(name) = self.ask_collection_name()? else {
            return Ok(None);
        };
        Ok(Some(CollectionRequest { name, titles }))
    }

    fn ask_collection_name(&mut self) -> Result<Option<String>> {
        loop {
            let name =
                self.prompter.input("Enter a name for your new collection")?;
            let name = name.trim();
            if name.eq_ignore_ascii_case(BACK) {
                return Ok(None);
            }
            if !name.is_empty() {
                return Ok(Some(name.to_string()));
            }
            self.say("Collection name cannot be empty.");
        }
    }

    fn ask_list_url(&mut self) -> Result<Option<String>> {
        loop {
            let answer = self
                .prompter
                .input("Letterboxd list URL (or 'back' to return)")?;
            let answer = answer.trim();
            if answer.eq_ignore_ascii_case(BACK) {
                return Ok(None);
            }
            match Url::parse(answer) {
                Ok(url) if matches!(url.scheme(), "http" | "https") => {
                    return Ok(Some(answer.to_string()));
                }
                _ => self.say("Please enter a full http(s) list URL."),
            }
        }
    }

    /// Keep asking until the answer names one of `choices` or is `back`.
    fn pick(
        &mut self,
        prompt: &str,
        choices: &[String],
    ) -> Result<Option<String>> {
        loop {
            let answer = self.prompter.input(prompt)?;
            if answer.trim().eq_ignore_ascii_case(BACK) {
                return Ok(None);
            }
            if let Some(choice) =
                pick_case_insensitive(&answer, choices.iter().map(String::as_str))
            {
                return Ok(Some(choice.to_string()));
            }
            self.say("Unknown option. Please type one of the listed items, or 'back'.");
        }
    }

    fn configure_credentials(&mut self) -> Result<()> {
        loop {
            self.say("CONFIGURE CREDENTIALS");
            self.say(RULE);
            self.say("1. Set Plex Token");
            self.say("2. Set Plex URL");
            self.say("3. Set TMDb API Key");
            self.say("4. Show current values");
            self.say("5. Return to main menu");

            let choice = self.prompter.input("Select an option")?;
            match choice.trim() {
                "1" => {
                    let token = self.prompter.input("Enter new Plex Token")?;
                    let next = self.config.with_plex_token(Some(token));
                    self.apply_config(next, "Plex Token");
                }
                "2" => {
                    let url = self.prompter.input("Enter new Plex URL")?;
                    let url = url.trim();
                    if !url.is_empty()
                        && let Err(err) = Url::parse(url)
                    {
                        self.say(&format!("Invalid Plex URL: {err}"));
                        continue;
                    }
                    let next = self.config.with_plex_url(Some(url.to_string()));
                    self.apply_config(next, "Plex URL");
                }
                "3" => {
                    let key = self.prompter.input("Enter new TMDb API Key")?;
                    let next = self.config.with_tmdb_api_key(Some(key));
                    self.apply_config(next, "TMDb API Key");
                }
                "4" => self.show_current_values(),
                "5" => return Ok(()),
                other if other.eq_ignore_ascii_case(BACK) => return Ok(()),
                _ => self.say("Invalid choice. Try again."),
            }
        }
    }

    /// Persist `next` and make it the session's config. On a write failure
    /// the previous config stays in effect.
    fn apply_config(&mut self, next: Config, label: &str) {
        match save_config(&self.config_path, &next) {
            Ok(()) => {
                self.config = next;
                self.say(&format!("{label} saved successfully!"));
            }
            Err(err) => {
                self.say(&format!("Could not save configuration: {err}"));
            }
        }
    }

    fn show_current_values(&mut self) {
        let not_set = || "(not set)".to_string();
        let lines = [
            format!(
                "Plex URL: {}",
                self.config.plex.url.clone().unwrap_or_else(not_set)
            ),
            format!(
                "Plex Token: {}",
                self.config
                    .plex
                    .token
                    .as_deref()
                    .map(mask_secret)
                    .unwrap_or_else(not_set)
            ),
            format!("Plex Library: {}", self.config.plex.library),
            format!(
                "TMDb API Key: {}",
                self.config
                    .tmdb
                    .api_key
                    .as_deref()
                    .map(mask_secret)
                    .unwrap_or_else(not_set)
            ),
            format!("Config file: {}", self.config_path.display()),
        ];
        self.say("Current Configuration:");
        for line in &lines {
            self.say(line);
        }
    }

    fn print_menu(&mut self) {
        self.say("Welcome to the Plex Collection Builder!");
        self.say(RULE);
        self.say("Loaded Credentials:");
        for line in status_lines(self.config.credential_status()) {
            self.say(&line);
        }
        if self.config.dry_run {
            self.say("Dry run: Plex will not be modified.");
        }
        self.say("");
        self.say("MAIN MENU:");
        self.say("1. Manual Entry");
        self.say("2. Known Franchise (e.g. Star Wars, Harry Potter)");
        self.say("3. Studio / Keyword (e.g. A24, Pixar)");
        self.say("4. Letterboxd List");
        self.say("5. Configure Credentials (Plex / TMDb)");
        self.say("6. Exit");
    }

    fn show_grid(&mut self, title: &str, names: &[String], width: usize) {
        self.say(title);
        self.say(RULE);
        for line in grid_lines(names, 3, width) {
            self.say(&line);
        }
    }

    fn say(&mut self, line: &str) {
        self.prompter.println(line);
    }
}
