use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use url::Url;

use crate::loader::SiteLayout;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ProgressMode {
    /// Enable progress UI when stderr is a TTY.
    Auto,
    /// Always enable progress UI (even when piped).
    Always,
    /// Never show progress UI.
    Never,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LoginMethod {
    /// Submit the email/password form.
    User,
    /// Use the third-party provider button.
    Provider,
}

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Args {
    /// Site serving the job and prep collections (e.g. `http://localhost:8000/`).
    #[arg(long)]
    pub base_url: Url,

    /// Endpoint layout: `api` (`/api/jobs`) or `static` (`jobs.json` next to the page).
    #[arg(long, value_enum, default_value = "api")]
    pub layout: SiteLayout,

    /// Page HTML to run against. Defaults to the built-in index page.
    #[arg(long)]
    pub shell: Option<PathBuf>,

    /// Stylesheet href linked from the built-in page (ignored with `--shell`).
    #[arg(long)]
    pub stylesheet: Option<String>,

    /// JSON file holding persisted preferences (the theme). In-memory when omitted.
    #[arg(long)]
    pub state_file: Option<PathBuf>,

    /// Type this into the search field and press Enter after loading.
    #[arg(long)]
    pub query: Option<String>,

    /// Click the theme toggle once after loading.
    #[arg(long)]
    pub toggle_theme: bool,

    /// Click the n-th displayed job card (0-based).
    #[arg(long)]
    pub click_job: Option<usize>,

    /// Click the n-th prep card (0-based).
    #[arg(long)]
    pub click_prep: Option<usize>,

    /// Open the login modal and sign in.
    #[arg(long, value_enum)]
    pub login: Option<LoginMethod>,

    /// Where to write the resulting page. Defaults to `index.html`.
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// HTTP User-Agent used for API reads.
    #[arg(long, default_value = "horizon-board/0.1")]
    pub user_agent: String,

    /// Progress display: `auto`, `always`, or `never`.
    #[arg(long, value_enum, default_value = "auto")]
    pub progress: ProgressMode,
}
