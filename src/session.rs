use tokio_util::sync::CancellationToken;

use crate::document::{self, Page};
use crate::html;
use crate::loader::{DataLoader, Endpoints};
use crate::login::{IdentityProvider, LoginEvent, LoginForm, LoginState, SignInError};
use crate::model::{Job, PrepItem};
use crate::search;
use crate::theme::{self, PreferenceStore, Theme};
use crate::view::{self, Effect};

/// Where a click on a prep card landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    Card,
    StartLink,
}

/// State owned by one page view: the document, the last fetched job
/// collection and the login flow. Handlers run to completion one at a time.
pub struct PageSession {
    page: Page,
    store: Box<dyn PreferenceStore>,
    endpoints: Endpoints,
    jobs: Vec<Job>,
    shown_query: String,
    prep: Vec<PrepItem>,
    login: LoginState,
    modal_visible: bool,
    provider_button_html: Option<String>,
}

impl PageSession {
    pub fn new(page: Page, store: Box<dyn PreferenceStore>, endpoints: Endpoints) -> Self {
        for (selector, what) in [
            (document::JOBS_CONTAINER, "job container"),
            (document::PREP_CONTAINER, "prep container"),
            (document::THEME_TOGGLE, "theme toggle"),
            (document::SEARCH_FIELD, "search field"),
            (document::SEARCH_BUTTON, "search button"),
            (document::LOGIN_BUTTON, "login button"),
            (document::LOGIN_MODAL, "login modal"),
            (document::MODAL_CLOSE, "modal close button"),
            (document::LOGIN_FORM, "login form"),
            (document::PROVIDER_BUTTON, "provider login button"),
        ] {
            if !page.has(selector) {
                tracing::warn!(selector, "page has no {what}; related handlers are inert");
            }
        }

        Self {
            page,
            store,
            endpoints,
            jobs: Vec::new(),
            shown_query: String::new(),
            prep: Vec::new(),
            login: LoginState::Closed,
            modal_visible: false,
            provider_button_html: None,
        }
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    /// Last successfully fetched job collection, unfiltered.
    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn login_state(&self) -> &LoginState {
        &self.login
    }

    pub fn modal_visible(&self) -> bool {
        self.modal_visible
    }

    /// Applies the stored theme, then fetches and renders both collections.
    /// The two reads run concurrently and fail independently.
    pub async fn load(&mut self, loader: &DataLoader) {
        theme::apply_stored(&self.page, self.store.as_ref());

        let (jobs, prep) = tokio::join!(loader.load_jobs(), loader.load_prep());

        match jobs {
            Ok(jobs) => self.set_jobs(jobs),
            Err(err) => tracing::error!(error = %format!("{err:#}"), "error fetching jobs"),
        }
        match prep {
            Ok(prep) => self.show_prep(prep),
            Err(err) => {
                tracing::error!(error = %format!("{err:#}"), "error fetching prep materials")
            }
        }
    }

    /// Replaces the job collection and renders it in full.
    pub fn set_jobs(&mut self, jobs: Vec<Job>) {
        tracing::info!(count = jobs.len(), "jobs loaded");
        self.jobs = jobs;
        self.shown_query.clear();
        self.render_jobs(&self.jobs.iter().collect::<Vec<_>>());
    }

    /// Renders prep materials. The collection is kept only so clicks can be
    /// resolved; search never looks at it.
    pub fn show_prep(&mut self, prep: Vec<PrepItem>) {
        tracing::info!(count = prep.len(), "prep materials loaded");
        let cards = view::prep_cards(&prep, &self.endpoints);
        if !self
            .page
            .replace_children(document::PREP_CONTAINER, html::prep_cards(&cards))
        {
            tracing::warn!("no prep container; prep materials not shown");
        }
        self.prep = prep;
    }

    fn render_jobs(&self, jobs: &[&Job]) {
        let cards = view::job_cards(jobs.iter().copied());
        if !self
            .page
            .replace_children(document::JOBS_CONTAINER, html::job_cards(&cards))
        {
            tracing::warn!("no job container; jobs not shown");
        }
    }

    /// Filters the full collection by the live search field and re-renders.
    pub fn search(&mut self) -> usize {
        let query = self
            .page
            .attr(document::SEARCH_FIELD, "value")
            .unwrap_or_default();
        let hits = search::filter_jobs(&self.jobs, &query);
        tracing::debug!(%query, hits = hits.len(), "job search");
        self.render_jobs(&hits);
        let count = hits.len();
        self.shown_query = query;
        count
    }

    /// Key press in the search field; only Enter searches.
    pub fn search_key(&mut self, key: &str) -> Option<usize> {
        (key == "Enter").then(|| self.search())
    }

    pub fn set_search_text(&self, text: &str) {
        if !self.page.set_attr(document::SEARCH_FIELD, "value", text) {
            tracing::warn!("no search field; query ignored");
        }
    }

    pub fn toggle_theme(&mut self) -> Theme {
        theme::toggle(&self.page, self.store.as_mut())
    }

    /// Click on the `index`-th job card currently displayed.
    pub fn click_job(&self, index: usize) -> Option<Effect> {
        let shown = search::filter_jobs(&self.jobs, &self.shown_query);
        let job = shown.get(index)?;
        Some(view::job_card(index, job).on_click)
    }

    pub fn click_prep(&self, index: usize, target: ClickTarget) -> Option<Effect> {
        let item = self.prep.get(index)?;
        let href = self.endpoints.prep_detail_href(&item.id);
        match target {
            ClickTarget::Card => tracing::debug!(%href, "prep card clicked"),
            // The anchor carries the same href and navigates on its own.
            ClickTarget::StartLink => tracing::debug!(%href, "start link followed"),
        }
        Some(Effect::Navigate(href))
    }

    pub fn open_login(&mut self) {
        if self.apply(LoginEvent::Open) {
            self.show_modal(true);
        }
    }

    pub fn close_login(&mut self) {
        if self.apply(LoginEvent::Close) {
            self.show_modal(false);
        }
    }

    /// Window click while the modal is up. Only the backdrop itself closes it.
    pub fn click_backdrop(&mut self, on_overlay: bool) {
        if on_overlay {
            self.close_login();
        }
    }

    pub fn submit_login(&mut self, form: &LoginForm) -> Option<Effect> {
        if !self.apply(LoginEvent::Submit(form.clone())) {
            return None;
        }
        self.signed_in()
    }

    /// Puts the provider button into its busy look. Returns false when the
    /// flow cannot start from the current state.
    pub fn begin_provider_login(&mut self) -> bool {
        if !self.apply(LoginEvent::BeginProvider) {
            return false;
        }
        self.provider_button_html = self
            .page
            .inner_html(document::PROVIDER_BUTTON)
            .unwrap_or_else(|err| {
                tracing::warn!(error = %format!("{err:#}"), "cannot snapshot provider button");
                None
            });
        let p = &self.page;
        p.replace_children(document::PROVIDER_BUTTON, html::provider_pending());
        p.set_attr(document::PROVIDER_BUTTON, "disabled", "disabled");
        p.set_style(document::PROVIDER_BUTTON, "opacity", "0.7");
        p.set_style(document::PROVIDER_BUTTON, "pointer-events", "none");
        true
    }

    pub fn finish_provider_login(&mut self, outcome: Result<String, SignInError>) -> Option<Effect> {
        match outcome {
            Ok(name) => {
                if !self.apply(LoginEvent::ProviderSucceeded(name)) {
                    return None;
                }
                self.signed_in()
            }
            Err(err) => {
                tracing::warn!(error = %err, "provider sign-in did not complete");
                if self.apply(LoginEvent::ProviderFailed) {
                    self.restore_provider_button();
                    // Dismissed while pending: nothing left open.
                    if !self.modal_visible {
                        self.apply(LoginEvent::Close);
                    }
                }
                None
            }
        }
    }

    /// Full provider flow: pending now, authenticated once `provider` answers.
    pub async fn provider_login<P: IdentityProvider>(
        &mut self,
        provider: &P,
        cancel: CancellationToken,
    ) -> Option<Effect> {
        if !self.begin_provider_login() {
            return None;
        }
        let outcome = provider.sign_in(cancel).await;
        self.finish_provider_login(outcome)
    }

    fn apply(&mut self, event: LoginEvent) -> bool {
        match crate::login::transition(&self.login, &event) {
            Some(next) => {
                tracing::debug!(from = ?self.login, to = ?next, "login transition");
                self.login = next;
                true
            }
            None => {
                tracing::debug!(state = ?self.login, ?event, "login event ignored");
                false
            }
        }
    }

    fn show_modal(&mut self, visible: bool) {
        self.modal_visible = visible;
        let p = &self.page;
        if !p.set_style(
            document::LOGIN_MODAL,
            "display",
            if visible { "flex" } else { "none" },
        ) {
            tracing::warn!("no login modal on page");
        }
        p.set_style("body", "overflow", if visible { "hidden" } else { "auto" });
    }

    fn signed_in(&mut self) -> Option<Effect> {
        let LoginState::Authenticated { name } = &self.login else {
            return None;
        };
        let name = name.clone();
        self.show_modal(false);

        let p = &self.page;
        if p.replace_children(document::LOGIN_BUTTON, html::signed_in_badge(&name)) {
            p.set_style(document::LOGIN_BUTTON, "background", "transparent");
            p.set_style(document::LOGIN_BUTTON, "border", "1px solid var(--border-color)");
        } else {
            tracing::warn!("no login button to show the signed-in user");
        }
        self.restore_provider_button();

        tracing::info!(user = %name, "signed in");
        Some(Effect::Acknowledge(format!(
            "Successfully signed in via {name}!"
        )))
    }

    fn restore_provider_button(&mut self) {
        let Some(original) = self.provider_button_html.take() else {
            return;
        };
        let p = &self.page;
        p.replace_children_html(document::PROVIDER_BUTTON, &original);
        p.remove_attr(document::PROVIDER_BUTTON, "disabled");
        p.set_style(document::PROVIDER_BUTTON, "opacity", "1");
        p.set_style(document::PROVIDER_BUTTON, "pointer-events", "auto");
    }
}
