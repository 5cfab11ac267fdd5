use anyhow::Result;
use salesboard::config::{now_ts, Config};
use salesboard::engine::SyncEngine;
use salesboard::logging::{json_log, obj, v_bool, v_num, v_str, Domain};
use tokio::time::{sleep, Duration};

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = Config::from_env();
    let mut engine = SyncEngine::new(cfg.clone())?;

    json_log(
        Domain::System,
        "startup",
        obj(&[
            ("roster", v_num(cfg.roster.len() as f64)),
            ("periods", v_num(cfg.periods.len() as f64)),
            ("poll_secs", v_num(cfg.poll_secs as f64)),
            ("data_path", v_str(&cfg.data_path)),
        ]),
    );

    loop {
        let start = now_ts();
        let outcome = engine.tick();

        json_log(
            Domain::System,
            "tick",
            obj(&[
                ("active", v_bool(outcome.notification.active)),
                ("message", v_str(&outcome.notification.message)),
                ("bars", v_num(outcome.bars.len() as f64)),
                ("grand_total", v_num(outcome.dataset.grand_total())),
                ("snapshot_saved", v_bool(outcome.snapshot_saved)),
            ]),
        );

        let sleep_for = cfg.sleep_until_next_tick(start);
        sleep(Duration::from_secs(sleep_for)).await;
    }
}
