use serde::{Deserialize, Deserializer};

/// Text columns may come back as `null` for empty database cells; those read
/// as empty strings so one sparse row never drops the collection.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Job {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(deserialize_with = "null_as_empty")]
    pub company: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub location: String,
    #[serde(rename = "type", default, deserialize_with = "null_as_empty")]
    pub job_type: String,
    /// Comma separated, e.g. `"Go, SQL, Docker"`.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub requirements: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub salary: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub posted_date: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PrepItem {
    #[serde(deserialize_with = "opaque_id")]
    pub id: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub category: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
}

impl PrepItem {
    pub fn category(&self) -> PrepCategory {
        PrepCategory::from_label(&self.category)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrepCategory {
    Aptitude,
    Coding,
    Interview,
    Other,
}

impl PrepCategory {
    pub fn from_label(label: &str) -> Self {
        match label {
            "Aptitude" => PrepCategory::Aptitude,
            "Coding" => PrepCategory::Coding,
            "Interview" => PrepCategory::Interview,
            _ => PrepCategory::Other,
        }
    }

    /// Font Awesome glyph; `Other` gets the generic book.
    pub fn icon(self) -> &'static str {
        match self {
            PrepCategory::Aptitude => "fa-brain",
            PrepCategory::Coding => "fa-code",
            PrepCategory::Interview => "fa-comments",
            PrepCategory::Other => "fa-book",
        }
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn opaque_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Int(i64),
        Float(f64),
        Text(String),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Int(n) => n.to_string(),
        RawId::Float(f) => f.to_string(),
        RawId::Text(s) => s,
    })
}
