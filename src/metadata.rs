#[derive(serde::Serialize, Debug, Clone, PartialEq, Eq)]
pub(crate) struct Post {
    pub slug: String,
    pub title: String,
    pub date: chrono::NaiveDate,
    pub summary: String,
    pub tags: Vec<String>,
    #[serde(skip_serializing)]
    pub body: String,
}
