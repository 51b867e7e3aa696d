//! Lifecycle monitor example
//!
//! Loads a monitor configuration from JSON, then uses the global monitor to
//! count live resources, report the long-lived ones and reject a second
//! owner for an address that is already owned.

use std::thread::sleep;
use std::time::Duration;

use anyhow::Result;
use smartptr::{global_monitor, ExclusiveOwner, MonitorConfig, SharedOwner};
use smartptr_examples::init_tracing;
use tracing::{error, info};

const CONFIG: &str = r#"{
    "long_lived_threshold": 25,
    "detect_double_ownership": true
}"#;

fn main() -> Result<()> {
    init_tracing()?;

    let config: MonitorConfig = serde_json::from_str(CONFIG)?;
    let monitor = global_monitor();
    monitor.enable(config);

    let settings = SharedOwner::new(String::from("settings"));
    let readers: Vec<_> = (0..3).map(|_| settings.clone()).collect();
    let buffer = ExclusiveOwner::new(vec![0_u8; 4096]);
    sleep(Duration::from_millis(50));
    let scratch = ExclusiveOwner::new([0_u64; 8]);

    let stats = monitor.stats();
    info!(
        total_live = stats.total_live,
        strings = stats.live_of(std::any::type_name::<String>()),
        oldest_ms = stats.oldest_age.as_millis(),
        "Live resources"
    );
    for report in monitor.long_lived() {
        info!(
            type_name = report.type_name,
            kind = ?report.kind,
            age_ms = report.age.as_millis(),
            "Long-lived resource"
        );
    }

    // SAFETY: the monitor rejects the address before a second owner exists.
    #[allow(unsafe_code)]
    let duplicate = unsafe { ExclusiveOwner::from_raw(buffer.as_ptr().cast_mut()) };
    if let Err(err) = duplicate {
        error!(%err, "Refused to own the buffer twice");
    }

    drop((readers, settings, buffer, scratch));
    info!(total_live = monitor.stats().total_live, "All owners dropped");
    monitor.disable();

    Ok(())
}
