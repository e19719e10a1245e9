mod common;

use std::fs;
use std::io;

use creaturebox_install::install::core::LogLevel;
use creaturebox_install::install::services::DescriptorKind;
use creaturebox_install::install::steps::{crontab, migrate};
use creaturebox_install::install::{
    FailurePoint, InstallLog, InstallationContext, Pipeline, PipelineState, RecordingBackend,
};
use pretty_assertions::assert_eq;

use common::{Workspace, tree_hash};

fn context(ws: &Workspace) -> InstallationContext {
    InstallationContext::new(ws.source(), ws.target())
        .runtime_env(None)
        .port(5000)
        .user("pi")
}

fn quiet_log(ctx: &InstallationContext) -> InstallLog {
    InstallLog::new(ctx.log_file.clone(), Box::new(io::sink()))
}

#[test]
fn complete_install_produces_the_documented_tree() {
    let ws = Workspace::new();
    let ctx = context(&ws);
    let backend = RecordingBackend::new();
    let mut log = quiet_log(&ctx);
    let mut pipeline = Pipeline::standard();

    let summary = pipeline.run(&ctx, &backend, &mut log).unwrap();

    assert_eq!(pipeline.state(), &PipelineState::Complete);
    assert_eq!(summary.completed_steps.len(), 9);

    let target = ws.target();
    assert!(fs::read_dir(target.join("software")).unwrap().next().is_some());
    assert_eq!(fs::read_dir(target.join("photos")).unwrap().count(), 0);
    assert_eq!(fs::read_dir(target.join("photos_backedup")).unwrap().count(), 0);
    assert!(target.join("schedule_settings.csv").is_file());
    assert!(target.join("LICENSE").is_file());
    assert!(fs::symlink_metadata(target.join("TakePhoto.py")).unwrap().file_type().is_symlink());

    let site = backend.descriptor(DescriptorKind::ReverseProxyVhost).unwrap();
    assert!(site.contents.contains("proxy_pass http://127.0.0.1:5000;"));

    let unit = backend.descriptor(DescriptorKind::SupervisorUnit).unwrap();
    let working_dir = format!("WorkingDirectory={}", target.join("web").display());
    assert!(unit.contents.lines().any(|l| l == working_dir));

    let schedule = fs::read_to_string(target.join("crontab.example")).unwrap();
    let tasks = crontab::task_lines(&schedule);
    assert_eq!(tasks.len(), 3);
    let target_str = target.display().to_string();
    assert!(tasks.iter().all(|t| t.contains(&target_str)));

    let script = fs::read_to_string(target.join("software/TakePhoto.py")).unwrap();
    assert!(script.contains(&format!("{target_str}/photos")));
}

#[test]
fn rendered_descriptors_for_a_fixed_target() {
    let ctx = InstallationContext::new("/src", "/opt/example").port(5000);
    let backend = RecordingBackend::new();
    let mut log = quiet_log(&ctx);

    creaturebox_install::install::services::generate(&ctx, &backend, &mut log).unwrap();

    let unit = backend.descriptor(DescriptorKind::SupervisorUnit).unwrap();
    assert!(unit.contents.lines().any(|l| l == "WorkingDirectory=/opt/example/web"));
    let site = backend.descriptor(DescriptorKind::ReverseProxyVhost).unwrap();
    assert!(site.contents.contains("proxy_pass http://127.0.0.1:5000;"));
    let crontab = crontab::render_crontab(&ctx).unwrap();
    let tasks = crontab::task_lines(&crontab);
    assert_eq!(tasks.len(), 3);
    assert!(tasks.iter().all(|t| t.contains("/opt/example")));
}

#[test]
fn missing_schedule_settings_stops_before_the_target_exists() {
    let ws = Workspace::new();
    ws.remove("src/config/schedule_settings.csv");
    let ctx = context(&ws);
    let backend = RecordingBackend::new();
    let mut log = quiet_log(&ctx);
    let mut pipeline = Pipeline::standard();

    let failure = pipeline.run(&ctx, &backend, &mut log).unwrap_err();

    assert_eq!(failure.step, "validate source tree");
    assert_eq!(failure.error.kind(), "RepositoryStructureError");
    assert!(failure.error.to_string().contains("schedule_settings.csv"));
    assert!(!ws.target().exists());
    assert!(backend.actions().is_empty());
    assert!(!log.is_persisted());
    assert!(log.entries().iter().any(|e| e.level == LogLevel::Error));
}

#[test]
fn rerunning_is_safe_and_migration_is_stable() {
    let ws = Workspace::new();
    let ctx = context(&ws);
    let backend = RecordingBackend::new();
    let mut log = quiet_log(&ctx);

    Pipeline::standard().run(&ctx, &backend, &mut log).unwrap();
    let first = tree_hash(&ws.target());

    let report = migrate::migrate(&ctx).unwrap();
    assert!(report.rewritten.is_empty());
    assert_eq!(tree_hash(&ws.target()), first);

    Pipeline::standard().run(&ctx, &backend, &mut quiet_log(&ctx)).unwrap();
    assert_eq!(tree_hash(&ws.target()), first);
    assert_eq!(backend.hosts_content().matches("creaturebox.local").count(), 1);
}

#[test]
fn install_log_is_persisted_under_the_target() {
    let ws = Workspace::new();
    let ctx = context(&ws);
    let backend = RecordingBackend::new();
    let mut log = quiet_log(&ctx);

    Pipeline::standard().run(&ctx, &backend, &mut log).unwrap();

    let persisted = log.read_persisted().unwrap();
    let first = persisted.lines().next().unwrap();
    assert!(first.starts_with('['));
    assert!(first.contains("Installing CreatureBox from"));
    assert!(persisted.contains("Step 1/9: validate source tree"));
    assert!(persisted.contains("Installation complete"));
}

#[test]
fn missing_optional_entry_point_is_not_an_error() {
    let ws = Workspace::new();
    ws.remove("src/software/Attract_Off.py");
    let ctx = context(&ws);

    Pipeline::standard()
        .run(&ctx, &RecordingBackend::new(), &mut quiet_log(&ctx))
        .unwrap();

    let entry_points = [
        "TakePhoto.py",
        "Scheduler.py",
        "Backup_Files.py",
        "Attract_On.py",
        "Attract_Off.py",
    ];
    let links = entry_points
        .iter()
        .filter(|name| fs::symlink_metadata(ws.target().join(name)).is_ok())
        .count();
    assert_eq!(links, 4);
}

#[test]
fn non_pi_host_fails_with_environment_mismatch() {
    let ws = Workspace::new();
    let ctx = context(&ws);
    let backend = RecordingBackend::new().with_host_model(None);
    let mut pipeline = Pipeline::standard();

    let failure = pipeline
        .run(&ctx, &backend, &mut quiet_log(&ctx))
        .unwrap_err();

    assert_eq!(failure.step, "provision dependencies");
    assert_eq!(failure.error.kind(), "EnvironmentMismatchError");
    assert_eq!(
        pipeline.state(),
        &PipelineState::Failed {
            step: "provision dependencies"
        }
    );
}

#[test]
fn unreachable_package_mirror_fails_before_the_target_exists() {
    let ws = Workspace::new();
    let ctx = context(&ws);
    let backend = RecordingBackend::new().failing_at(FailurePoint::PackageIndex);
    let mut pipeline = Pipeline::standard();

    let failure = pipeline
        .run(&ctx, &backend, &mut quiet_log(&ctx))
        .unwrap_err();

    assert_eq!(failure.step, "provision dependencies");
    assert_eq!(failure.error.kind(), "DependencyError");
    assert_eq!(
        pipeline.state(),
        &PipelineState::Failed {
            step: "provision dependencies"
        }
    );
    assert!(!ws.target().exists());
    assert!(backend.actions().is_empty());
}

#[test]
fn hosts_file_failure_fails_the_service_step() {
    let ws = Workspace::new();
    let ctx = context(&ws);
    let backend = RecordingBackend::new().failing_at(FailurePoint::HostsEntry);
    let mut pipeline = Pipeline::standard();

    let failure = pipeline
        .run(&ctx, &backend, &mut quiet_log(&ctx))
        .unwrap_err();

    assert_eq!(failure.step, "install services");
    assert_eq!(failure.error.kind(), "ServiceSetupError");
    assert!(backend.descriptor(DescriptorKind::DiscoveryAdvertisement).is_some());
    assert_eq!(backend.hosts_content(), "127.0.0.1\tlocalhost\n");
    assert!(!ws.target().join("crontab.example").exists());
}
