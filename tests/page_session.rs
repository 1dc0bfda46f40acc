use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use horizon_board::document::{self, Page};
use horizon_board::html::{self, ShellOptions};
use horizon_board::loader::{DataLoader, Endpoints, SiteLayout};
use horizon_board::login::{
    IdentityProvider, LoginForm, LoginState, PROVIDER_DELAY, SignInError, SignInFuture,
    SimulatedProvider,
};
use horizon_board::session::{ClickTarget, PageSession};
use horizon_board::theme::MemoryStore;
use horizon_board::view::Effect;
use horizon_board::{Fetcher, ProgressMode};
use httpmock::Method::GET;
use httpmock::MockServer;
use tempfile::tempdir;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::layer::SubscriberExt as _;
use url::Url;

const JOBS: &str = r#"[
  {"id": 1, "title": "Backend Engineer", "company": "Acme", "location": "Remote",
   "salary": "$120k", "type": "Full-time", "posted_date": "2024-01-01",
   "requirements": "Go, SQL, Docker"},
  {"id": 2, "title": "Frontend Developer", "company": "Netflix", "location": "Hyderabad, India",
   "salary": "₹18L - ₹35L", "type": "Contract", "posted_date": "3 days ago",
   "requirements": "Next.js, Tailwind, CSS, Figma"},
  {"id": 3, "title": "Data Scientist", "company": "Meta", "location": "Remote",
   "salary": "$150k - $220k", "type": "Full-time", "posted_date": "1 day ago",
   "requirements": "ML, PyTorch, SQL"}
]"#;

const PREP: &str = r#"[
  {"id": 1, "category": "Aptitude", "title": "Quantitative Mastery",
   "description": "Numerical ability for placements.", "roadmap": ["Percentages"]},
  {"id": 2, "category": "Coding", "title": "Dynamic Programming Essentials",
   "description": "Recursion with storage."},
  {"id": 7, "category": "Unknown", "title": "Misc", "description": "Everything else."}
]"#;

/// Counts ERROR events emitted on the current thread.
struct ErrorCounter(Arc<AtomicUsize>);

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for ErrorCounter {
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        if *event.metadata().level() == tracing::Level::ERROR {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }
}

fn count_errors() -> (Arc<AtomicUsize>, tracing::subscriber::DefaultGuard) {
    let counter = Arc::new(AtomicUsize::new(0));
    let subscriber = tracing_subscriber::registry().with(ErrorCounter(counter.clone()));
    let guard = tracing::subscriber::set_default(subscriber);
    (counter, guard)
}

fn mock_api(server: &MockServer) {
    server.mock(|when, then| {
        when.method(GET).path("/api/jobs");
        then.status(200)
            .header("Content-Type", "application/json")
            .body(JOBS);
    });
    server.mock(|when, then| {
        when.method(GET).path("/api/prep");
        then.status(200)
            .header("Content-Type", "application/json")
            .body(PREP);
    });
}

fn loader_for(server: &MockServer, layout: SiteLayout, base: &str) -> DataLoader {
    let base_url = Url::parse(&server.url(base)).unwrap();
    let fetcher = Fetcher::new("test-agent", None).unwrap();
    DataLoader::new(fetcher, Endpoints::new(base_url, layout))
}

fn session_for(loader: &DataLoader) -> PageSession {
    let shell = html::page_shell(&ShellOptions {
        layout: loader.endpoints().layout(),
        ..ShellOptions::default()
    });
    PageSession::new(
        Page::parse(&shell),
        Box::new(MemoryStore::new()),
        loader.endpoints().clone(),
    )
}

fn offline_session() -> PageSession {
    let shell = html::page_shell(&ShellOptions::default());
    let endpoints = Endpoints::new(Url::parse("http://localhost/").unwrap(), SiteLayout::Api);
    PageSession::new(
        Page::parse(&shell),
        Box::new(MemoryStore::new()),
        endpoints,
    )
}

fn card_titles(page: &Page) -> Vec<String> {
    (0..page.count(document::JOB_CARD))
        .map(|i| {
            let sel = format!("#jobs-container > .job-card:nth-child({}) h3", i + 1);
            page.text(&sel).unwrap_or_default()
        })
        .collect()
}

#[tokio::test]
async fn load_renders_both_collections_in_order() {
    let server = MockServer::start();
    mock_api(&server);
    let loader = loader_for(&server, SiteLayout::Api, "/");
    let mut session = session_for(&loader);

    session.load(&loader).await;

    let page = session.page();
    assert_eq!(page.count(document::JOB_CARD), 3);
    assert_eq!(page.count(document::PREP_CARD), 3);
    assert_eq!(
        card_titles(page),
        ["Backend Engineer", "Frontend Developer", "Data Scientist"]
    );

    let out = page.to_html().unwrap();
    assert!(out.contains("animation-delay: 0ms"));
    assert!(out.contains("animation-delay: 200ms"));
    assert!(out.contains("animation-delay: 300ms"));
    assert!(out.contains("Next.js • Tailwind • CSS"));
    assert!(!out.contains("Figma"));
    assert!(out.contains(r#"class="fas fa-brain""#));
    assert!(out.contains(r#"class="fas fa-code""#));
    assert!(out.contains(r#"class="fas fa-book""#));
    assert!(out.contains(r#"href="/prep/2""#));
    assert_eq!(page.attr("html", "data-theme").as_deref(), Some("dark"));
}

#[tokio::test]
async fn search_always_filters_the_full_collection() {
    let server = MockServer::start();
    mock_api(&server);
    let loader = loader_for(&server, SiteLayout::Api, "/");
    let mut session = session_for(&loader);
    session.load(&loader).await;

    session.set_search_text("SQL");
    assert_eq!(session.search_key("Enter"), Some(2));
    assert_eq!(
        card_titles(session.page()),
        ["Backend Engineer", "Data Scientist"]
    );

    // Not cumulative: "netflix" is outside the previous result set.
    session.set_search_text("netflix");
    assert_eq!(session.search_key("a"), None);
    assert_eq!(session.search(), 1);
    assert_eq!(card_titles(session.page()), ["Frontend Developer"]);

    session.set_search_text("java");
    assert_eq!(session.search(), 0);
    assert_eq!(session.page().count(document::JOB_CARD), 0);

    session.set_search_text("");
    assert_eq!(session.search(), 3);
    assert_eq!(session.jobs().len(), 3);
}

#[tokio::test]
async fn clicks_resolve_against_what_is_displayed() {
    let server = MockServer::start();
    mock_api(&server);
    let loader = loader_for(&server, SiteLayout::Api, "/");
    let mut session = session_for(&loader);
    session.load(&loader).await;

    session.set_search_text("meta");
    session.search();
    assert_eq!(
        session.click_job(0),
        Some(Effect::Acknowledge(
            "Opening details for Data Scientist at Meta".to_string()
        ))
    );
    assert_eq!(session.click_job(1), None);

    assert_eq!(
        session.click_prep(2, ClickTarget::Card),
        Some(Effect::Navigate("/prep/7".to_string()))
    );
    assert_eq!(
        session.click_prep(0, ClickTarget::StartLink),
        Some(Effect::Navigate("/prep/1".to_string()))
    );
    assert_eq!(session.click_prep(3, ClickTarget::Card), None);
}

#[tokio::test]
async fn failed_job_fetch_keeps_previous_content() {
    let good = MockServer::start();
    mock_api(&good);
    let loader = loader_for(&good, SiteLayout::Api, "/");
    let mut session = session_for(&loader);
    session.load(&loader).await;
    let before = session.page().inner_html(document::JOBS_CONTAINER).unwrap();

    let bad = MockServer::start();
    bad.mock(|when, then| {
        when.method(GET).path("/api/jobs");
        then.status(500).body("boom");
    });
    bad.mock(|when, then| {
        when.method(GET).path("/api/prep");
        then.status(200).body(PREP);
    });
    let bad_loader = loader_for(&bad, SiteLayout::Api, "/");

    let (errors, _guard) = count_errors();
    session.load(&bad_loader).await;

    assert_eq!(errors.load(Ordering::SeqCst), 1);
    assert_eq!(
        session.page().inner_html(document::JOBS_CONTAINER).unwrap(),
        before
    );
    assert_eq!(session.jobs().len(), 3);
}

#[tokio::test]
async fn first_load_failure_leaves_empty_state() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/jobs");
        then.status(200)
            .header("Content-Type", "text/html")
            .body("<html>not json</html>");
    });
    server.mock(|when, then| {
        when.method(GET).path("/api/prep");
        then.status(404);
    });
    let loader = loader_for(&server, SiteLayout::Api, "/");
    let mut session = session_for(&loader);

    let (errors, _guard) = count_errors();
    session.load(&loader).await;

    assert_eq!(errors.load(Ordering::SeqCst), 2);
    assert_eq!(session.page().count(document::JOB_CARD), 0);
    assert_eq!(session.page().count(document::PREP_CARD), 0);
    assert!(session.jobs().is_empty());
}

#[tokio::test]
async fn static_layout_reads_flat_files() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/site/jobs.json");
        then.status(200).body(JOBS);
    });
    server.mock(|when, then| {
        when.method(GET).path("/site/prep.json");
        then.status(200).body(PREP);
    });
    let loader = loader_for(&server, SiteLayout::Static, "/site/");
    let mut session = session_for(&loader);
    session.load(&loader).await;

    assert_eq!(session.page().count(document::JOB_CARD), 3);
    let out = session.page().to_html().unwrap();
    assert!(out.contains(r#"href="prep_2.html""#));
    assert!(out.contains(r#"href="practice.html""#));
}

#[test]
fn login_modal_opens_closes_and_signs_in() {
    let mut session = offline_session();
    let modal_display = |s: &PageSession| s.page().style(document::LOGIN_MODAL, "display");

    session.open_login();
    assert_eq!(session.login_state(), &LoginState::Open);
    assert_eq!(modal_display(&session).as_deref(), Some("flex"));
    assert_eq!(
        session.page().style("body", "overflow").as_deref(),
        Some("hidden")
    );

    session.click_backdrop(false);
    assert_eq!(session.login_state(), &LoginState::Open);
    session.click_backdrop(true);
    assert_eq!(session.login_state(), &LoginState::Closed);
    assert_eq!(modal_display(&session).as_deref(), Some("none"));
    assert_eq!(
        session.page().style("body", "overflow").as_deref(),
        Some("auto")
    );

    session.open_login();
    let form = LoginForm {
        email: "nobody@example.com".to_string(),
        password: "definitely-wrong".to_string(),
    };
    assert_eq!(
        session.submit_login(&form),
        Some(Effect::Acknowledge(
            "Successfully signed in via User!".to_string()
        ))
    );
    assert_eq!(
        session.login_state(),
        &LoginState::Authenticated {
            name: "User".to_string()
        }
    );
    assert_eq!(modal_display(&session).as_deref(), Some("none"));
    let badge = session.page().text(document::LOGIN_BUTTON).unwrap();
    assert_eq!(badge.trim(), "User");
    assert_eq!(
        session.page().style(document::LOGIN_BUTTON, "background").as_deref(),
        Some("transparent")
    );

    // No sign-out path: the login affordance stays replaced.
    session.open_login();
    assert!(session.login_state().is_authenticated());
    assert_eq!(modal_display(&session).as_deref(), Some("none"));
}

#[tokio::test(start_paused = true)]
async fn provider_login_is_pending_until_the_delay_elapses() {
    let mut session = offline_session();
    session.open_login();

    assert!(session.begin_provider_login());
    assert_eq!(session.login_state(), &LoginState::Pending);
    let page = session.page();
    assert_eq!(
        page.attr(document::PROVIDER_BUTTON, "disabled").as_deref(),
        Some("disabled")
    );
    assert_eq!(
        page.style(document::PROVIDER_BUTTON, "opacity").as_deref(),
        Some("0.7")
    );
    assert!(
        page.text(document::PROVIDER_BUTTON)
            .unwrap()
            .contains("Connecting to Google...")
    );

    let handle = tokio::spawn(SimulatedProvider::default().sign_in(CancellationToken::new()));
    tokio::time::sleep(PROVIDER_DELAY - Duration::from_millis(1)).await;
    assert!(!handle.is_finished());
    assert_eq!(session.login_state(), &LoginState::Pending);

    tokio::time::sleep(Duration::from_millis(1)).await;
    let outcome = handle.await.unwrap();
    assert_eq!(
        session.finish_provider_login(outcome),
        Some(Effect::Acknowledge(
            "Successfully signed in via Google User!".to_string()
        ))
    );
    assert_eq!(
        session.login_state(),
        &LoginState::Authenticated {
            name: "Google User".to_string()
        }
    );
    assert_eq!(
        session.page().attr(document::PROVIDER_BUTTON, "disabled"),
        None
    );
    // The hidden modal gets its original button back for the next visit.
    let restored = session.page().text(document::PROVIDER_BUTTON).unwrap();
    assert!(restored.contains("Continue with Google"));
    assert!(!restored.contains("Connecting"));
}

#[tokio::test(start_paused = true)]
async fn provider_login_end_to_end_takes_the_fixed_delay() {
    let mut session = offline_session();
    session.open_login();

    let started = tokio::time::Instant::now();
    let effect = session
        .provider_login(&SimulatedProvider::default(), CancellationToken::new())
        .await;
    assert!(started.elapsed() >= PROVIDER_DELAY);
    assert_eq!(
        effect,
        Some(Effect::Acknowledge(
            "Successfully signed in via Google User!".to_string()
        ))
    );
}

struct RejectingProvider;

impl IdentityProvider for RejectingProvider {
    fn sign_in(&self, _cancel: CancellationToken) -> SignInFuture {
        Box::pin(async {
            Err::<String, _>(SignInError::Rejected("account locked".to_string()))
        })
    }
}

#[tokio::test(start_paused = true)]
async fn failed_or_cancelled_provider_login_restores_the_button() {
    let mut session = offline_session();
    let original = session.page().inner_html(document::PROVIDER_BUTTON).unwrap();
    session.open_login();

    let effect = session
        .provider_login(&RejectingProvider, CancellationToken::new())
        .await;
    assert_eq!(effect, None);
    assert_eq!(session.login_state(), &LoginState::Open);
    assert_eq!(
        session.page().inner_html(document::PROVIDER_BUTTON).unwrap(),
        original
    );

    let token = CancellationToken::new();
    token.cancel();
    assert_eq!(
        session.provider_login(&SimulatedProvider::default(), token).await,
        None
    );
    assert_eq!(session.login_state(), &LoginState::Open);
    assert_eq!(
        session.page().attr(document::PROVIDER_BUTTON, "disabled"),
        None
    );
}

#[tokio::test(start_paused = true)]
async fn closing_the_modal_does_not_stop_a_pending_provider_login() {
    let mut session = offline_session();
    session.open_login();
    assert!(session.begin_provider_login());

    session.close_login();
    let page = session.page();
    assert_eq!(
        page.style(document::LOGIN_MODAL, "display").as_deref(),
        Some("none")
    );
    assert_eq!(page.style("body", "overflow").as_deref(), Some("auto"));
    assert_eq!(session.login_state(), &LoginState::Pending);
    assert!(!session.modal_visible());

    // A second dismissal is harmless.
    session.click_backdrop(true);
    assert_eq!(session.login_state(), &LoginState::Pending);

    let outcome = SimulatedProvider::default()
        .sign_in(CancellationToken::new())
        .await;
    assert_eq!(
        session.finish_provider_login(outcome),
        Some(Effect::Acknowledge(
            "Successfully signed in via Google User!".to_string()
        ))
    );
    assert_eq!(
        session.page().text(document::LOGIN_BUTTON).unwrap().trim(),
        "Google User"
    );
}

#[tokio::test(start_paused = true)]
async fn reopening_during_provider_login_shows_the_spinner() {
    let mut session = offline_session();
    session.open_login();
    assert!(session.begin_provider_login());
    session.click_backdrop(true);

    session.open_login();
    assert!(session.modal_visible());
    assert_eq!(session.login_state(), &LoginState::Pending);
    assert!(
        session
            .page()
            .text(document::PROVIDER_BUTTON)
            .unwrap()
            .contains("Connecting to Google...")
    );
}

#[tokio::test(start_paused = true)]
async fn failure_after_dismissal_leaves_the_modal_closed() {
    let mut session = offline_session();
    session.open_login();
    assert!(session.begin_provider_login());
    session.close_login();

    let outcome = RejectingProvider.sign_in(CancellationToken::new()).await;
    assert_eq!(session.finish_provider_login(outcome), None);
    assert_eq!(session.login_state(), &LoginState::Closed);
    assert_eq!(
        session
            .page()
            .style(document::LOGIN_MODAL, "display")
            .as_deref(),
        Some("none")
    );
    assert_eq!(
        session.page().attr(document::PROVIDER_BUTTON, "disabled"),
        None
    );
}

#[tokio::test]
async fn null_text_columns_render_as_empty() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/jobs");
        then.status(200)
            .header("Content-Type", "application/json")
            .body(
                r#"[
  {"id": 1, "title": "Backend Engineer", "company": "Acme", "location": "Remote",
   "salary": null, "type": "Full-time", "posted_date": null, "requirements": null,
   "description": null},
  {"id": 2, "title": "Data Scientist", "company": "Meta", "location": null,
   "salary": "$150k", "type": null, "posted_date": "1 day ago",
   "requirements": "ML, SQL"}
]"#,
            );
    });
    server.mock(|when, then| {
        when.method(GET).path("/api/prep");
        then.status(200)
            .header("Content-Type", "application/json")
            .body(r#"[{"id": 4, "category": "Coding", "title": "Graphs", "description": null}]"#);
    });
    let loader = loader_for(&server, SiteLayout::Api, "/");
    let mut session = session_for(&loader);
    let (errors, _guard) = count_errors();

    session.load(&loader).await;

    assert_eq!(errors.load(Ordering::SeqCst), 0);
    assert_eq!(session.jobs().len(), 2);
    assert_eq!(session.jobs()[0].salary, "");
    assert_eq!(session.page().count(document::JOB_CARD), 2);
    assert_eq!(session.page().count(document::PREP_CARD), 1);
    assert_eq!(
        card_titles(session.page()),
        ["Backend Engineer", "Data Scientist"]
    );
}

#[tokio::test]
async fn partial_page_degrades_instead_of_failing() {
    let server = MockServer::start();
    mock_api(&server);
    let loader = loader_for(&server, SiteLayout::Api, "/");
    let shell = r#"<!DOCTYPE html><html><body><div id="jobs-container"></div></body></html>"#;
    let mut session = PageSession::new(
        Page::parse(shell),
        Box::new(MemoryStore::new()),
        loader.endpoints().clone(),
    );

    session.load(&loader).await;
    assert_eq!(session.page().count(document::JOB_CARD), 3);

    session.toggle_theme();
    assert_eq!(session.search(), 3);
    session.open_login();
    assert_eq!(
        session.submit_login(&LoginForm::default()),
        Some(Effect::Acknowledge(
            "Successfully signed in via User!".to_string()
        ))
    );
    assert_eq!(
        session.click_prep(0, ClickTarget::Card),
        Some(Effect::Navigate("/prep/1".to_string()))
    );
}

#[tokio::test]
async fn run_replays_interactions_and_writes_the_page() {
    let server = MockServer::start();
    mock_api(&server);

    let tmp = tempdir().unwrap();
    let state_file = tmp.path().join("prefs.json");
    let out = tmp.path().join("site/index.html");

    let args = horizon_board::CliArgs {
        base_url: Url::parse(&server.url("/")).unwrap(),
        layout: SiteLayout::Api,
        shell: None,
        stylesheet: Some("style.css".to_string()),
        state_file: Some(state_file.clone()),
        query: Some("sql".to_string()),
        toggle_theme: true,
        click_job: Some(1),
        click_prep: Some(1),
        login: Some(horizon_board::LoginMethod::User),
        out: Some(out.clone()),
        user_agent: "test-agent".to_string(),
        progress: ProgressMode::Never,
    };
    let effects = horizon_board::run(args).await.unwrap();

    assert_eq!(
        effects,
        [
            Effect::Acknowledge("Opening details for Data Scientist at Meta".to_string()),
            Effect::Navigate("/prep/2".to_string()),
            Effect::Acknowledge("Successfully signed in via User!".to_string()),
        ]
    );

    let html = std::fs::read_to_string(&out).unwrap();
    assert!(html.contains(r#"data-theme="light""#));
    assert!(html.contains(r#"href="style.css""#));
    assert!(html.contains(r#"class="fas fa-moon""#));
    assert_eq!(html.matches(r#"class="job-card""#).count(), 2);

    let prefs: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&state_file).unwrap()).unwrap();
    assert_eq!(prefs["theme"], "light");
}

#[tokio::test]
async fn run_uses_a_custom_shell_and_static_layout() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/docs/jobs.json");
        then.status(200).body(JOBS);
    });
    server.mock(|when, then| {
        when.method(GET).path("/docs/prep.json");
        then.status(200).body(PREP);
    });

    let tmp = tempdir().unwrap();
    let shell = tmp.path().join("shell.html");
    std::fs::write(
        &shell,
        r#"<!DOCTYPE html><html><body><div id="prep-container"></div></body></html>"#,
    )
    .unwrap();
    let out = tmp.path().join("out.html");

    let args = horizon_board::CliArgs {
        base_url: Url::parse(&server.url("/docs/")).unwrap(),
        layout: SiteLayout::Static,
        shell: Some(shell),
        stylesheet: None,
        state_file: None,
        query: None,
        toggle_theme: false,
        click_job: Some(0),
        click_prep: Some(2),
        login: None,
        out: Some(out.clone()),
        user_agent: "test-agent".to_string(),
        progress: ProgressMode::Never,
    };
    let effects = horizon_board::run(args).await.unwrap();

    // No job container on this page, but the collection still backs clicks.
    assert_eq!(
        effects,
        [
            Effect::Acknowledge("Opening details for Backend Engineer at Acme".to_string()),
            Effect::Navigate("prep_7.html".to_string()),
        ]
    );
    let html = std::fs::read_to_string(&out).unwrap();
    assert_eq!(html.matches(r#"class="prep-card""#).count(), 3);
    assert!(!html.contains("job-card"));
}
