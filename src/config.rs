#[derive(Clone)]
pub struct Config {
    pub data_path: String,
    pub incentive_path: String,
    pub snapshot_path: String,
    pub access_path: String,
    pub buckets_path: Option<String>,
    pub poll_secs: u64,
    pub roster: Vec<String>,
    pub periods: Vec<String>,
    pub default_goal: f64,
    pub default_incentive: String,
    pub notify_separator: String,
    pub notify_suffix: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            data_path: std::env::var("DATA_PATH").unwrap_or_else(|_| "./sales_data.json".to_string()),
            incentive_path: std::env::var("INCENTIVE_PATH").unwrap_or_else(|_| "./incentive.json".to_string()),
            snapshot_path: std::env::var("SNAPSHOT_PATH").unwrap_or_else(|_| "./board_snapshot.json".to_string()),
            access_path: std::env::var("ACCESS_PATH").unwrap_or_else(|_| "./access.json".to_string()),
            buckets_path: std::env::var("BUCKETS_PATH").ok(),
            poll_secs: std::env::var("POLL_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(10),
            roster: list_var("ROSTER", &["Rob", "Wayne", "George", "JT", "Keenan", "Payton", "Taylor"]),
            periods: list_var("PERIODS", &["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"]),
            default_goal: std::env::var("DEFAULT_GOAL").ok().and_then(|v| v.parse().ok()).unwrap_or(1000.0),
            default_incentive: std::env::var("DEFAULT_INCENTIVE")
                .unwrap_or_else(|_| "Everyone needs more blades...".to_string()),
            notify_separator: std::env::var("NOTIFY_SEPARATOR").unwrap_or_else(|_| ", ".to_string()),
            notify_suffix: std::env::var("NOTIFY_SUFFIX")
                .unwrap_or_else(|_| " just made more sales!".to_string()),
        }
    }

    /// Seconds until the next poll boundary, so independent pollers land on
    /// the same tick edges.
    pub fn sleep_until_next_tick(&self, now_ts: u64) -> u64 {
        let next = ((now_ts / self.poll_secs) + 1) * self.poll_secs;
        next.saturating_sub(now_ts)
    }
}

fn list_var(key: &str, default: &[&str]) -> Vec<String> {
    match std::env::var(key) {
        Ok(raw) => raw
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        Err(_) => default.iter().map(|s| s.to_string()).collect(),
    }
}

pub fn now_ts() -> u64 {
    chrono::Utc::now().timestamp() as u64
}
