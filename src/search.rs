use crate::model::Job;

/// Case-insensitive substring match over title, company and requirements.
///
/// Always a function of `jobs` and `query` alone; an empty query keeps every
/// job in its original order.
pub fn filter_jobs<'a, I>(jobs: I, query: &str) -> Vec<&'a Job>
where
    I: IntoIterator<Item = &'a Job>,
{
    let needle = query.to_lowercase();
    jobs.into_iter()
        .filter(|job| matches(job, &needle))
        .collect()
}

fn matches(job: &Job, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    [&job.title, &job.company, &job.requirements]
        .iter()
        .any(|field| field.to_lowercase().contains(needle))
}
