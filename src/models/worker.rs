use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Worker {
    pub id: i64,          // ⇔ workers.id (AUTOINCREMENT, never reused)
    pub name: String,     // ⇔ workers.name
    pub daily_rate: f64,  // ⇔ workers.daily_rate (wage for AM + PM)
}
