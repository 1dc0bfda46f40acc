//! Records to card descriptions. Nothing here touches the document; the
//! `html` module turns these into markup and `document::Page` mounts it.

use std::time::Duration;

use crate::loader::Endpoints;
use crate::model::{Job, PrepItem};

const JOB_STAGGER: Duration = Duration::from_millis(100);
const PREP_STAGGER: Duration = Duration::from_millis(150);
const PREVIEW_TOKENS: usize = 3;

/// What a click on a card does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Display-only message, no navigation.
    Acknowledge(String),
    Navigate(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct JobCard {
    pub company: String,
    pub title: String,
    pub location: String,
    pub job_type: String,
    pub requirements_preview: String,
    pub salary: String,
    pub posted: String,
    pub delay: Duration,
    pub on_click: Effect,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrepCard {
    pub icon: &'static str,
    pub category: String,
    pub title: String,
    pub description: String,
    pub href: String,
    pub delay: Duration,
    pub on_click: Effect,
}

pub fn job_cards<'a, I>(jobs: I) -> Vec<JobCard>
where
    I: IntoIterator<Item = &'a Job>,
{
    jobs.into_iter()
        .enumerate()
        .map(|(index, job)| job_card(index, job))
        .collect()
}

pub fn job_card(index: usize, job: &Job) -> JobCard {
    JobCard {
        company: job.company.clone(),
        title: job.title.clone(),
        location: job.location.clone(),
        job_type: job.job_type.clone(),
        requirements_preview: requirements_preview(&job.requirements),
        salary: job.salary.clone(),
        posted: job.posted_date.clone(),
        delay: JOB_STAGGER * index as u32,
        on_click: Effect::Acknowledge(format!(
            "Opening details for {} at {}",
            job.title, job.company
        )),
    }
}

pub fn prep_cards(items: &[PrepItem], endpoints: &Endpoints) -> Vec<PrepCard> {
    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let href = endpoints.prep_detail_href(&item.id);
            PrepCard {
                icon: item.category().icon(),
                category: item.category.clone(),
                title: item.title.clone(),
                description: item.description.clone(),
                on_click: Effect::Navigate(href.clone()),
                href,
                delay: PREP_STAGGER * index as u32,
            }
        })
        .collect()
}

/// First three comma-separated requirements, joined with a bullet.
pub fn requirements_preview(requirements: &str) -> String {
    requirements
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .take(PREVIEW_TOKENS)
        .collect::<Vec<_>>()
        .join(" • ")
}
