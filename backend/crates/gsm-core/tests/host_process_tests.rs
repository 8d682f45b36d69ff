#![cfg(unix)]

use gsm_core::{
    DetachedLauncher, LaunchSpec, NixSignaller, ProcessLauncher, ProcessSignaller, ProcessTable,
    ProvisionRequest, Provisioner, ResourceSampler, ShutdownSignal, SignalDelivery, SteamCmdProvisioner,
    SysinfoProcessTable,
};

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{Duration, Instant};

use googletest::assert_that;
use googletest::prelude::{contains, eq, none, some};
use gsm_config::SteamCredentials;
use nix::sys::signal::kill;
use nix::unistd::Pid;
use serial_test::serial;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn request(install_dir: &Path, timeout: Duration) -> ProvisionRequest {
    ProvisionRequest {
        app_id: String::from("2131400"),
        credentials: SteamCredentials::anonymous(),
        install_dir: install_dir.to_path_buf(),
        timeout,
    }
}

fn pid_exists(pid: u32) -> bool {
    kill(Pid::from_raw(pid as i32), None).is_ok()
}

async fn wait_for(mut condition: impl FnMut() -> bool, within: Duration) -> bool {
    let deadline = Instant::now() + within;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    condition()
}

#[tokio::test]
#[serial]
async fn given_tool_exiting_nonzero_when_provision_then_exit_code_and_tail_captured() {
    // Given
    let dir = TempDir::new().unwrap();
    let tool = write_script(
        dir.path(),
        "steamcmd.sh",
        "for n in 1 2 3 4 5; do echo \"line $n\"; done\necho \"args: $*\"\nexit 3",
    );
    let provisioner = SteamCmdProvisioner::new(tool, 3);

    // When
    let outcome = provisioner
        .provision(
            &request(dir.path(), Duration::from_secs(10)),
            CancellationToken::new(),
        )
        .await
        .unwrap();

    // Then
    assert_that!(outcome.exit_code, some(eq(3)));
    assert!(!outcome.timed_out);
    assert!(!outcome.succeeded());
    assert_that!(outcome.output_tail.len(), eq(3));
    let args_line = outcome
        .output_tail
        .iter()
        .find(|line| line.starts_with("args: "))
        .unwrap();
    assert!(args_line.contains("+login anonymous +app_update 2131400 validate +quit"));
}

#[tokio::test]
#[serial]
async fn given_successful_tool_when_provision_then_succeeded() {
    let dir = TempDir::new().unwrap();
    let tool = write_script(dir.path(), "steamcmd.sh", "echo \"Success! App '2131400' fully installed.\"");
    let provisioner = SteamCmdProvisioner::new(tool, 10);

    let outcome = provisioner
        .provision(
            &request(dir.path(), Duration::from_secs(10)),
            CancellationToken::new(),
        )
        .await
        .unwrap();

    assert!(outcome.succeeded());
    assert_that!(
        outcome.output_tail,
        contains(eq("Success! App '2131400' fully installed."))
    );
}

#[tokio::test]
#[serial]
async fn given_non_utf8_output_when_provision_then_output_drained_and_succeeded() {
    // Given
    let dir = TempDir::new().unwrap();
    let tool = write_script(
        dir.path(),
        "steamcmd.sh",
        "printf 'Loading \\377\\376 ok\\n'\nsleep 0.3\nn=1\nwhile [ $n -le 200 ]; do echo \"update $n\"; n=$((n + 1)); done\nexit 0",
    );
    let provisioner = SteamCmdProvisioner::new(tool, 5);

    // When
    let outcome = provisioner
        .provision(
            &request(dir.path(), Duration::from_secs(10)),
            CancellationToken::new(),
        )
        .await
        .unwrap();

    // Then
    assert_that!(outcome.exit_code, some(eq(0)));
    assert!(outcome.succeeded());
    assert_that!(outcome.output_tail.len(), eq(5));
    assert_that!(outcome.output_tail, contains(eq("update 200")));
}

#[tokio::test]
#[serial]
async fn given_hanging_tool_when_timeout_then_killed_and_reaped() {
    // Given
    let dir = TempDir::new().unwrap();
    let tool = write_script(dir.path(), "steamcmd.sh", "echo downloading\nsleep 30");
    let provisioner = SteamCmdProvisioner::new(tool, 10);
    let started = Instant::now();

    // When
    let outcome = provisioner
        .provision(
            &request(dir.path(), Duration::from_secs(1)),
            CancellationToken::new(),
        )
        .await
        .unwrap();

    // Then
    assert!(outcome.timed_out);
    assert_that!(outcome.exit_code, none());
    assert!(!outcome.succeeded());
    assert!(started.elapsed() < Duration::from_secs(10));
    assert!(!pid_exists(outcome.pid.unwrap()));
}

#[tokio::test]
#[serial]
async fn given_cancelled_token_when_provision_then_cancelled_and_killed() {
    // Given
    let dir = TempDir::new().unwrap();
    let tool = write_script(dir.path(), "steamcmd.sh", "sleep 30");
    let provisioner = SteamCmdProvisioner::new(tool, 10);
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        trigger.cancel();
    });

    // When
    let outcome = provisioner
        .provision(&request(dir.path(), Duration::from_secs(30)), cancel)
        .await
        .unwrap();

    // Then
    assert!(outcome.cancelled);
    assert!(!outcome.timed_out);
    assert!(!pid_exists(outcome.pid.unwrap()));
}

#[tokio::test]
#[serial]
async fn given_missing_tool_when_provision_then_spawn_error() {
    let dir = TempDir::new().unwrap();
    let provisioner = SteamCmdProvisioner::new(dir.path().join("nope.sh"), 10);

    let result = provisioner
        .provision(
            &request(dir.path(), Duration::from_secs(1)),
            CancellationToken::new(),
        )
        .await;

    assert!(matches!(result, Err(gsm_core::LifecycleError::Spawn { .. })));
}

#[test]
#[serial]
fn given_unreaped_child_when_term_then_not_alive_and_later_gone() {
    // Given
    let mut child = Command::new("sleep").arg("30").spawn().unwrap();
    let pid = child.id();
    let signaller = NixSignaller::new();
    assert!(signaller.is_alive(pid));

    // When
    let delivery = signaller.send(pid, ShutdownSignal::Graceful);
    std::thread::sleep(Duration::from_millis(200));

    // Then - the zombie left behind does not count as alive
    assert_that!(delivery, eq(&SignalDelivery::Delivered));
    assert!(!signaller.is_alive(pid));
    child.wait().unwrap();
    assert_that!(
        signaller.send(pid, ShutdownSignal::Forced),
        eq(&SignalDelivery::AlreadyGone)
    );
}

#[test]
fn given_init_or_zero_pid_when_send_then_refused() {
    let signaller = NixSignaller::new();

    assert!(matches!(
        signaller.send(1, ShutdownSignal::Forced),
        SignalDelivery::Failed(_)
    ));
    assert!(matches!(
        signaller.send(0, ShutdownSignal::Forced),
        SignalDelivery::Failed(_)
    ));
    assert!(!signaller.is_alive(0));
}

#[tokio::test]
#[serial]
async fn given_detached_launch_when_scanned_then_visible_and_killable() {
    // Given
    let dir = TempDir::new().unwrap();
    let script = write_script(dir.path(), "FakeServer.sh", "exec sleep 30");
    let spec = LaunchSpec {
        executable: script,
        args: vec![String::from("-Port=7777")],
        working_dir: dir.path().to_path_buf(),
    };

    // When
    let pid = DetachedLauncher::new().launch(&spec).unwrap();

    // Then
    let table = SysinfoProcessTable::new();
    let pids: Vec<u32> = table.snapshot().iter().map(|entry| entry.pid).collect();
    assert_that!(pids, contains(eq(&pid)));

    let signaller = NixSignaller::new();
    assert_that!(
        signaller.send(pid, ShutdownSignal::Forced),
        eq(&SignalDelivery::Delivered)
    );
    assert!(wait_for(|| !signaller.is_alive(pid), Duration::from_secs(5)).await);
}

#[test]
fn given_own_pid_when_sample_then_process_and_system_usage_reported() {
    // Given
    let dir = TempDir::new().unwrap();
    let sampler = ResourceSampler::new(Duration::from_millis(100));

    // When
    let snapshot = sampler.sample(std::process::id(), dir.path());

    // Then
    let process = snapshot.process.unwrap();
    assert_that!(process.pid, eq(std::process::id()));
    assert!(process.memory_bytes > 0);
    assert!(snapshot.system.memory_total_bytes >= snapshot.system.memory_used_bytes);
    assert!(snapshot.system.memory_total_bytes > 0);
}

#[test]
fn given_vanished_pid_when_sample_then_no_process_usage() {
    let dir = TempDir::new().unwrap();
    let mut child = Command::new("true").spawn().unwrap();
    let pid = child.id();
    child.wait().unwrap();

    let snapshot = ResourceSampler::new(Duration::from_millis(50)).sample(pid, dir.path());

    assert!(snapshot.process.is_none());
}
