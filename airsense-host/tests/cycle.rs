use airsense_api::WorkStatus;
use airsense_host::settings::Settings;
use airsense_host::{PushTarget, build_controller};

const SETTINGS: &str = r#"
[logger]
level = "debug"

[clock]
utc_offset_hours = 9

[schedule]
cycle_interval_secs = 60

[climate]
model = "Dht22"

[particulate]
validation = "Checksum"

[particulate.source]
type = "Simulated"
corruption_rate = 0.0

[publish]
type = "Log"
path = "/ENV-DATA-LOG"
"#;

fn logged(target: &PushTarget) -> u64 {
    match target {
        PushTarget::Log(push) => push.count(),
        PushTarget::Firebase(_) => panic!("expected log target"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_simulated_cycle_publishes() {
    let settings = Settings::from_toml(SETTINGS).unwrap();
    let mut controller = build_controller(&settings).unwrap();

    assert_eq!(controller.run_cycle().await, WorkStatus::Success);
    assert_eq!(logged(controller.publisher().client()), 1);
    assert_eq!(controller.publisher().path(), "/ENV-DATA-LOG");
}

#[tokio::test(start_paused = true)]
async fn test_failing_climate_publishes_nothing() {
    let settings = Settings::from_toml(&SETTINGS.replace(
        "model = \"Dht22\"",
        "model = \"Dht22\"\nfailure_rate = 1.0",
    ))
    .unwrap();
    let mut controller = build_controller(&settings).unwrap();

    assert_eq!(controller.run_cycle().await, WorkStatus::FailedToSensor);
    assert_eq!(logged(controller.publisher().client()), 0);
}

#[tokio::test(start_paused = true)]
async fn test_damaged_frames_publish_nothing() {
    let settings = Settings::from_toml(
        &SETTINGS.replace("corruption_rate = 0.0", "corruption_rate = 1.0"),
    )
    .unwrap();
    let mut controller = build_controller(&settings).unwrap();

    let status = controller.run_cycle().await;
    assert!(matches!(
        status,
        WorkStatus::FailedToSensor | WorkStatus::Unknown
    ));
    assert_eq!(logged(controller.publisher().client()), 0);
}
