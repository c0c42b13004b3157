//! End-to-end tests: driver + TCP session against a loopback INS

mod integration;

use integration::{closed_port, FakeIns, Reply};
use ins_driver::core::bus::BusEvent;
use ins_driver::core::driver::{Driver, PollOutcome};
use ins_driver::core::fix::GpsFix;
use ins_driver::core::logger::{LogFormat, WireLogger};
use ins_driver::core::protocol::CommandKind;
use ins_driver::core::transport::{DeviceLink, TcpConfig, TcpSession};
use ins_driver::DriverSettings;
use std::time::Duration;
use tokio::sync::mpsc;

fn driver_for(port: u16) -> Driver {
    let session = TcpSession::new(TcpConfig::new("127.0.0.1", port).read_timeout(200));
    Driver::new(Box::new(session), DriverSettings::default())
}

#[tokio::test]
async fn fix_event_sends_manual_position() {
    let ins = FakeIns::start(|_| Reply::None).await;
    let mut driver = driver_for(ins.port);
    let mut responses = driver.subscribe();

    driver.handle_event(BusEvent::Fix(GpsFix::new(12.345678, -98.765432, 10.5)));
    assert_eq!(driver.state().queue.len(), 1);

    let outcome = driver.poll_once().await;
    assert_eq!(
        outcome,
        PollOutcome::Sent {
            command: CommandKind::SetManualFix,
            response: None
        }
    );
    assert!(driver.state().queue.is_empty());
    assert_eq!(driver.state().retries, 0);
    assert!(responses.try_recv().is_err());

    assert_eq!(
        ins.wait_for(1).await,
        vec!["$PIXSE,CONFIG,MANGPS,12.345678,-98.765432,10.500000,0.5,0.5,5.0*7f\r\n".to_string()]
    );
}

#[tokio::test]
async fn gps_status_query_publishes_reply() {
    let ins = FakeIns::start(|frame| {
        if frame.contains("GPSKFM,,") {
            Reply::Bytes(b"$PIXSE,CONFIG,GPSKFM,2*47\r\n")
        } else {
            Reply::None
        }
    })
    .await;
    let mut driver = driver_for(ins.port);
    let mut responses = driver.subscribe();

    driver.handle_event(BusEvent::Command(8));
    let outcome = driver.poll_once().await;

    let published = responses.try_recv().unwrap();
    assert_eq!(published.data, "28");
    assert!(matches!(outcome, PollOutcome::Sent { response: Some(_), .. }));
    assert_eq!(ins.wait_for(1).await, vec!["$PIXSE,CONFIG,GPSKFM,,*59\r\n".to_string()]);
}

#[tokio::test]
async fn unreachable_device_drops_after_budget() {
    let mut driver = driver_for(closed_port().await);
    driver.handle_event(BusEvent::Command(1));

    for attempt in 1..=7 {
        assert_eq!(
            driver.poll_once().await,
            PollOutcome::Retrying {
                command: CommandKind::Reset,
                attempt
            }
        );
    }
    assert_eq!(
        driver.poll_once().await,
        PollOutcome::Dropped {
            command: CommandKind::Reset
        }
    );
    assert!(driver.state().queue.is_empty());
    assert_eq!(driver.state().retries, 0);

    // Loop keeps working afterwards
    assert_eq!(driver.poll_once().await, PollOutcome::Idle);
}

#[tokio::test]
async fn silent_device_times_out_and_retries() {
    let ins = FakeIns::start(|_| Reply::Silent).await;
    let mut driver = driver_for(ins.port);
    let mut responses = driver.subscribe();

    driver.handle_event(BusEvent::Command(9));
    let outcome = tokio::time::timeout(Duration::from_secs(5), driver.poll_once())
        .await
        .expect("read must be bounded");

    assert_eq!(
        outcome,
        PollOutcome::Retrying {
            command: CommandKind::QueryStartMode,
            attempt: 1
        }
    );
    assert_eq!(driver.state().queue.peek_next(), Some(CommandKind::QueryStartMode));
    assert!(responses.try_recv().is_err());
}

#[tokio::test]
async fn malformed_reply_counts_as_failure() {
    let ins = FakeIns::start(|_| Reply::Bytes(b"$PIXSE,CONFIG,GPSKFM,2")).await;
    let mut driver = driver_for(ins.port);

    driver.handle_event(BusEvent::Command(8));
    assert!(matches!(
        driver.poll_once().await,
        PollOutcome::Retrying { attempt: 1, .. }
    ));
}

#[tokio::test]
async fn run_loop_services_fix_before_operator_command() {
    let ins = FakeIns::start(|frame| {
        if frame.contains("START_,,") {
            Reply::Bytes(b"$PIXSE,CONFIG,START_,1*5f\r\n")
        } else {
            Reply::None
        }
    })
    .await;

    let session = TcpSession::new(TcpConfig::new("127.0.0.1", ins.port).read_timeout(200));
    let settings = DriverSettings {
        poll_interval_ms: 20,
        ..DriverSettings::default()
    };
    let driver = Driver::new(Box::new(session), settings);
    let mut responses = driver.subscribe();

    let (tx, rx) = mpsc::channel(5);
    // Queue both before the loop starts so their relative order is fixed
    tx.send(BusEvent::Command(9)).await.unwrap();
    tx.send(BusEvent::Fix(GpsFix::new(1.0, 2.0, 3.0))).await.unwrap();
    tx.send(BusEvent::Command(42)).await.unwrap();
    let handle = tokio::spawn(driver.run(rx));

    let response = tokio::time::timeout(Duration::from_secs(5), responses.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(response.data, "19");

    drop(tx);
    let stats = handle.await.unwrap();
    assert_eq!(stats.rejected, 1);
    assert_eq!(stats.responses, 1);

    let frames = ins.wait_for(2).await;
    assert!(frames.len() >= 2);
    assert!(frames[0].contains("MANGPS,1.000000,2.000000,3.000000"));
    assert!(frames[1].contains("START_,,"));
}

#[tokio::test]
async fn wire_log_records_both_directions() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(format!("wire.{}", LogFormat::Text.extension()));

    let ins = FakeIns::start(|_| Reply::Bytes(b"$PIXSE,CONFIG,GPSKFM,1*44\r\n")).await;
    let session = TcpSession::new(TcpConfig::new("127.0.0.1", ins.port))
        .with_wire_log(WireLogger::shared(&path, LogFormat::Text).unwrap());

    let token = session.send("$PIXSE,CONFIG,GPSKFM,,*59\r\n", true).await.unwrap();
    assert_eq!(token.as_deref(), Some("1"));
    drop(session);

    let log = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = log.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains(" TX $PIXSE,CONFIG,GPSKFM,,*59\\r\\n"));
    assert!(lines[1].contains(" RX $PIXSE,CONFIG,GPSKFM,1*44\\r\\n"));
}

#[tokio::test]
async fn closed_input_still_flushes_queued_command() {
    let ins = FakeIns::start(|_| Reply::None).await;
    let session = TcpSession::new(TcpConfig::new("127.0.0.1", ins.port).read_timeout(200));
    let settings = DriverSettings {
        poll_interval_ms: 20,
        ..DriverSettings::default()
    };
    let driver = Driver::new(Box::new(session), settings);

    let (tx, rx) = mpsc::channel(5);
    tx.send(BusEvent::Command(1)).await.unwrap();
    drop(tx);

    let stats = tokio::time::timeout(Duration::from_secs(5), driver.run(rx))
        .await
        .expect("driver must stop once the queue is empty");
    assert_eq!(stats.sent, 1);
    assert_eq!(
        ins.wait_for(1).await,
        vec!["$PIXSE,CONFIG,RESET_*57\r\n".to_string()]
    );
}
