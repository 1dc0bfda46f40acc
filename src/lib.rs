mod cli;
mod fetcher;
mod progress;

pub mod document;
pub mod html;
pub mod loader;
pub mod login;
pub mod model;
pub mod search;
pub mod session;
pub mod theme;
pub mod view;

use std::path::PathBuf;

use anyhow::Context as _;
use tokio_util::sync::CancellationToken;

pub use cli::{Args as CliArgs, LoginMethod, ProgressMode};
pub use fetcher::Fetcher;
pub use progress::{Progress, Resource};

use document::Page;
use loader::{DataLoader, Endpoints};
use login::{LoginForm, SimulatedProvider};
use session::{ClickTarget, PageSession};
use theme::{FileStore, MemoryStore, PreferenceStore};
use view::Effect;

/// Loads the page, replays the requested interactions, writes the resulting
/// document and returns every acknowledgment or navigation it produced.
pub async fn run(args: CliArgs) -> anyhow::Result<Vec<Effect>> {
    use std::io::IsTerminal as _;

    let progress_enabled = match args.progress {
        ProgressMode::Always => true,
        ProgressMode::Never => false,
        ProgressMode::Auto => std::io::stderr().is_terminal(),
    };
    let progress = Progress::new(progress_enabled);
    progress.set_stage("prepare page");

    let shell = match &args.shell {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?
        }
        None => html::page_shell(&html::ShellOptions {
            stylesheet: args.stylesheet.as_deref(),
            layout: args.layout,
            ..html::ShellOptions::default()
        }),
    };
    let store: Box<dyn PreferenceStore> = match &args.state_file {
        Some(path) => Box::new(FileStore::new(path.clone())),
        None => Box::new(MemoryStore::new()),
    };

    let endpoints = Endpoints::new(args.base_url.clone(), args.layout);
    let fetcher = Fetcher::new(&args.user_agent, Some(progress.clone()))?;
    let loader = DataLoader::new(fetcher, endpoints.clone());
    let mut session = PageSession::new(Page::parse(&shell), store, endpoints);

    progress.set_stage("load collections");
    session.load(&loader).await;

    progress.set_stage("replay interactions");
    let effects = replay(&mut session, &args).await;

    progress.set_stage("write page");
    let out_path = args
        .out
        .clone()
        .unwrap_or_else(|| PathBuf::from("index.html"));
    if let Some(parent) = out_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create {}", parent.display()))?;
        }
    }
    let html = session.page().to_html()?;
    std::fs::write(&out_path, html).with_context(|| format!("write {}", out_path.display()))?;

    progress.finish();
    Ok(effects)
}

async fn replay(session: &mut PageSession, args: &CliArgs) -> Vec<Effect> {
    let mut effects = Vec::new();

    if let Some(query) = &args.query {
        session.set_search_text(query);
        if let Some(hits) = session.search_key("Enter") {
            tracing::info!(%query, hits, "searched jobs");
        }
    }

    if args.toggle_theme {
        let theme = session.toggle_theme();
        tracing::info!(theme = theme.as_str(), "theme toggled");
    }

    if let Some(index) = args.click_job {
        match session.click_job(index) {
            Some(effect) => effects.push(effect),
            None => tracing::warn!(index, "no job card at that position"),
        }
    }

    if let Some(index) = args.click_prep {
        match session.click_prep(index, ClickTarget::Card) {
            Some(effect) => effects.push(effect),
            None => tracing::warn!(index, "no prep card at that position"),
        }
    }

    if let Some(method) = args.login {
        session.open_login();
        let effect = match method {
            LoginMethod::User => session.submit_login(&LoginForm::default()),
            LoginMethod::Provider => {
                session
                    .provider_login(&SimulatedProvider::default(), CancellationToken::new())
                    .await
            }
        };
        effects.extend(effect);
    }

    effects
}
