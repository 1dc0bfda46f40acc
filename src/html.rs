use maud::{DOCTYPE, Markup, html};

use crate::loader::SiteLayout;
use crate::theme::Theme;
use crate::view::{JobCard, PrepCard};

pub struct ShellOptions<'a> {
    pub title: &'a str,
    pub stylesheet: Option<&'a str>,
    pub layout: SiteLayout,
}

impl Default for ShellOptions<'_> {
    fn default() -> Self {
        Self {
            title: "Horizon | Jobs & Placement Prep",
            stylesheet: None,
            layout: SiteLayout::Api,
        }
    }
}

struct NavLinks {
    home: &'static str,
    companies: &'static str,
    practice: &'static str,
}

fn nav_links(layout: SiteLayout) -> NavLinks {
    match layout {
        SiteLayout::Api => NavLinks {
            home: "/",
            companies: "/companies",
            practice: "/practice",
        },
        SiteLayout::Static => NavLinks {
            home: "index.html",
            companies: "companies.html",
            practice: "practice.html",
        },
    }
}

/// Index page before any data arrives: empty containers, closed modal.
pub fn page_shell(opts: &ShellOptions<'_>) -> String {
    let nav = nav_links(opts.layout);
    let markup: Markup = html! {
        (DOCTYPE)
        html lang="en" data-theme=(Theme::default().as_str()) {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (opts.title) }
                @if let Some(href) = opts.stylesheet {
                    link rel="stylesheet" href=(href);
                }
            }
            body {
                nav class="navbar" {
                    a class="logo" href=(nav.home) { "Horizon" }
                    div class="nav-links" {
                        a href=(nav.home) { "Jobs" }
                        a href=(nav.companies) { "Companies" }
                        a href=(nav.practice) { "Practice" }
                    }
                    div class="nav-actions" {
                        button type="button" id="themeToggle" class="theme-toggle" title="Toggle theme" {
                            i class=(Theme::default().icon_class()) {}
                        }
                        button type="button" id="loginBtn" class="btn-primary" { "Sign In" }
                    }
                }
                header class="hero" {
                    h1 { "Find your next role" }
                    div class="search-box" {
                        input type="text" id="job-search" placeholder="Search by title, company or skill";
                        button type="button" id="job-search-btn" class="btn-primary" { "Search" }
                    }
                }
                main {
                    section id="jobs" {
                        h2 { "Latest Openings" }
                        div id="jobs-container" class="jobs-grid" {}
                    }
                    section id="prep" {
                        h2 { "Placement Preparation" }
                        div id="prep-container" class="prep-grid" {}
                    }
                }
                div id="loginModal" class="modal" style="display: none" {
                    div class="modal-content" {
                        span class="close-modal" { "×" }
                        h2 { "Welcome back" }
                        form id="loginForm" {
                            input type="email" name="email" placeholder="Email";
                            input type="password" name="password" placeholder="Password";
                            button type="submit" class="btn-primary" { "Sign In" }
                        }
                        div class="divider" { "or" }
                        button type="button" id="googleLoginBtn" class="btn-google" {
                            i class="fab fa-google" {}
                            " Continue with Google"
                        }
                    }
                }
            }
        }
    };
    markup.into_string()
}

pub fn job_cards(cards: &[JobCard]) -> Markup {
    html! {
        @for card in cards {
            (job_card(card))
        }
    }
}

pub fn job_card(card: &JobCard) -> Markup {
    html! {
        div class="job-card" style=(delay_style(card.delay)) {
            div class="company" { (card.company) }
            h3 { (card.title) }
            div class="job-details" {
                span { i class="fas fa-map-marker-alt" {} " " (card.location) }
                span { i class="fas fa-briefcase" {} " " (card.job_type) }
            }
            p class="requirements" { (card.requirements_preview) }
            div class="job-footer" {
                span class="salary" { (card.salary) }
                span class="posted" { (card.posted) }
            }
        }
    }
}

pub fn prep_cards(cards: &[PrepCard]) -> Markup {
    html! {
        @for card in cards {
            (prep_card(card))
        }
    }
}

pub fn prep_card(card: &PrepCard) -> Markup {
    html! {
        div class="prep-card"
            style=(format!("{}; cursor: pointer", delay_style(card.delay)))
            data-href=(card.href) {
            span class="prep-icon" { i class=(format!("fas {}", card.icon)) {} }
            div class="prep-category" { (card.category) }
            h4 { (card.title) }
            p { (card.description) }
            a href=(card.href) class="btn-outline" { "Start Learning" }
        }
    }
}

/// Login button content once signed in.
pub fn signed_in_badge(name: &str) -> Markup {
    html! {
        i class="fas fa-user-circle" {}
        " " (name)
    }
}

pub fn provider_pending() -> Markup {
    html! {
        i class="fas fa-circle-notch fa-spin" {}
        " Connecting to Google..."
    }
}

fn delay_style(delay: std::time::Duration) -> String {
    format!("animation-delay: {}ms", delay.as_millis())
}
